//! Per feature facades over [`Store`], the surface a front end binds to.

use super::Store;
use crate::{
    github::{client::ClientResult, GitHubApi},
    types::{CommitDetail, CommitSummary, FavouriteCommit, PageCursor, Repo, SortOrder},
};
use tracing::debug;

/// Repository listing and selection.
#[derive(Debug)]
pub struct RepoFeature<'s, C> {
    pub(super) store: &'s Store<C>,
}

impl<C> RepoFeature<'_, C>
where
    C: GitHubApi,
{
    pub fn repos(&self) -> Vec<Repo> {
        self.store.repos()
    }

    pub fn selected_repo(&self) -> Option<Repo> {
        self.store.selected_repo()
    }

    pub fn is_loading(&self) -> bool {
        self.store.is_loading_repos()
    }

    pub fn error(&self) -> Option<String> {
        self.store.error()
    }

    /// Blank usernames are ignored.
    pub async fn fetch_repos(&self, username: &str) -> ClientResult<()> {
        if username.is_empty() {
            return Ok(());
        }
        self.store.fetch_repos(username).await
    }

    pub fn select_repo(&self, repo: Repo) {
        self.store.set_repo(repo)
    }

    /// First repository with exactly this name.
    pub fn find_repo_by_name(&self, name: &str) -> Option<Repo> {
        self.store
            .state()
            .repos
            .iter()
            .find(|x| x.name == name)
            .cloned()
    }

    pub fn clear_error(&self) {
        self.store.clear_error()
    }

    pub fn clear_selected_repo(&self) {
        self.store.clear_selected_repo()
    }
}

/// Commit history and commit details.
#[derive(Debug)]
pub struct CommitFeature<'s, C> {
    pub(super) store: &'s Store<C>,
}

impl<C> CommitFeature<'_, C>
where
    C: GitHubApi,
{
    /// Commits in the current sort order.
    pub fn commits(&self) -> Vec<CommitSummary> {
        self.store.sorted_commits()
    }

    pub fn commit_detail(&self, sha: &str) -> Option<CommitDetail> {
        self.store.commit_detail(sha)
    }

    pub fn is_loading(&self) -> bool {
        self.store.is_loading_commits()
    }

    pub fn is_loading_detail(&self) -> bool {
        self.store.is_loading_commit_detail()
    }

    pub fn current_page(&self) -> u32 {
        self.store.commits_page()
    }

    pub fn cursor(&self) -> PageCursor {
        self.store.commits_cursor()
    }

    pub fn sort_order(&self) -> SortOrder {
        self.store.sort_order()
    }

    /// Blank arguments are ignored.
    pub async fn fetch_commits(&self, username: &str, repo_name: &str, page: u32) -> ClientResult<()> {
        if username.is_empty() || repo_name.is_empty() {
            return Ok(());
        }
        self.store.fetch_commits(username, repo_name, page).await
    }

    /// Blank arguments are ignored.
    pub async fn fetch_commit_detail(
        &self,
        username: &str,
        repo_name: &str,
        sha: &str,
    ) -> ClientResult<()> {
        if username.is_empty() || repo_name.is_empty() || sha.is_empty() {
            return Ok(());
        }
        self.store
            .fetch_commit_detail(username, repo_name, sha)
            .await
    }

    pub fn change_sort_order(&self, order: SortOrder) {
        self.store.set_sort_order(order)
    }

    /// Fetches the page after the last one, nothing once history is exhausted.
    pub async fn load_next_page(&self, username: &str, repo_name: &str) -> ClientResult<()> {
        match self.store.commits_cursor() {
            PageCursor::Next(page) => self.fetch_commits(username, repo_name, page).await,
            PageCursor::Exhausted { last } => {
                debug!(last, "no more commits");
                Ok(())
            }
        }
    }
}

/// Bookmarked commits.
#[derive(Debug)]
pub struct FavouriteFeature<'s, C> {
    pub(super) store: &'s Store<C>,
}

impl<C> FavouriteFeature<'_, C>
where
    C: GitHubApi,
{
    pub fn favourites(&self) -> Vec<FavouriteCommit> {
        self.store.favourites()
    }

    pub fn toggle_favourite(&self, commit: &CommitSummary) {
        self.store.toggle_favourite(commit)
    }

    pub fn remove_favourite(&self, sha: &str) {
        self.store.remove_favourite(sha)
    }

    pub fn is_favourite(&self, sha: &str) -> bool {
        self.store.is_favourite(sha)
    }
}
