//! Application state and the operations that change it.
//!
//! The store is the only writer of its state. Readers get owned copies, so
//! nothing handed out can alias the store's collections.
//!
//! Every async operation returns its own result, and additionally records
//! failures in the shared `error`/`rate_limited` fields for UI binding. Those
//! fields are last write wins across overlapping operations.

mod views;

pub use views::{CommitFeature, FavouriteFeature, RepoFeature};

use crate::{
    github::{client::ClientResult, Error, GitHubApi},
    persist::{FavouritesWriter, DEFAULT_DEBOUNCE, FAVOURITES_KEY},
    storage::Storage,
    types::{
        sort_commits, CommitDetail, CommitSummary, FavouriteCommit, PageCursor, Repo, SortOrder,
    },
};
use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard, PoisonError},
    time::Duration,
};
use tracing::{debug, info};

const UNKNOWN_ERROR: &str = "Unknown error";

#[derive(Debug, Clone, PartialEq)]
pub struct StoreOptions {
    /// Quiet period before favourites are written.
    pub favourites_debounce: Duration,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            favourites_debounce: DEFAULT_DEBOUNCE,
        }
    }
}

#[derive(Debug, Default)]
struct State {
    repos: Vec<Repo>,
    selected_repo: Option<Repo>,
    /// Arrival order across pages, not display order.
    commits: Vec<CommitSummary>,
    commits_cursor: PageCursor,
    commits_sort_order: SortOrder,
    /// Never evicted.
    commit_details: HashMap<String, CommitDetail>,
    /// Most recently added first, unique by sha.
    favourites: Vec<FavouriteCommit>,
    loading_repos: bool,
    loading_commits: bool,
    loading_commit_detail: bool,
    error: Option<String>,
    rate_limited: bool,
}

#[derive(Debug)]
pub struct Store<C> {
    client: C,
    writer: FavouritesWriter,
    state: Mutex<State>,
}

/// Holds a loading flag up for as long as it lives.
struct Loading<'a> {
    state: &'a Mutex<State>,
    flag: fn(&mut State) -> &mut bool,
}

impl<'a> Loading<'a> {
    fn start(state: &'a Mutex<State>, flag: fn(&mut State) -> &mut bool) -> Self {
        *flag(&mut lock(state)) = true;
        Self { state, flag }
    }
}

impl Drop for Loading<'_> {
    fn drop(&mut self) {
        *(self.flag)(&mut lock(self.state)) = false;
    }
}

fn lock(state: &Mutex<State>) -> MutexGuard<'_, State> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<C> Store<C>
where
    C: GitHubApi,
{
    /// Creates the store, loading persisted favourites from `storage`.
    ///
    /// Spawns the favourites writer, so it must be called within a tokio runtime.
    pub fn new(client: C, storage: Storage, options: StoreOptions) -> Self {
        let favourites: Vec<FavouriteCommit> = storage.load(FAVOURITES_KEY, Vec::new());
        info!(count = favourites.len(), "loaded favourites");
        let state = State {
            favourites,
            ..Default::default()
        };
        let writer = FavouritesWriter::spawn(storage, options.favourites_debounce);
        Self {
            client,
            writer,
            state: Mutex::new(state),
        }
    }

    fn state(&self) -> MutexGuard<'_, State> {
        lock(&self.state)
    }

    fn begin(&self, flag: fn(&mut State) -> &mut bool) -> Loading<'_> {
        let loading = Loading::start(&self.state, flag);
        let mut state = self.state();
        state.error = None;
        state.rate_limited = false;
        loading
    }

    fn handle_error(&self, err: &Error) {
        let mut state = self.state();
        if err.is_rate_limited() {
            state.rate_limited = true;
        }
        let message = err.to_string();
        state.error = Some(if message.is_empty() {
            UNKNOWN_ERROR.to_owned()
        } else {
            message
        });
    }

    /// Selects a repository and forgets the commits of the previous one.
    ///
    /// Commit details and favourites are kept, they are not per repository.
    pub fn set_repo(&self, repo: Repo) {
        let mut state = self.state();
        debug!(repo = %repo.name, "selecting repository");
        state.selected_repo = Some(repo);
        state.commits.clear();
        state.commits_cursor = PageCursor::default();
    }

    pub fn clear_selected_repo(&self) {
        self.state().selected_repo = None;
    }

    #[tracing::instrument(skip(self))]
    pub async fn fetch_repos(&self, username: &str) -> ClientResult<()> {
        let _loading = self.begin(|x| &mut x.loading_repos);
        match self.client.list_repos(username).await {
            Ok(repos) => {
                debug!(count = repos.len(), "fetched repositories");
                self.state().repos = repos;
                Ok(())
            }
            Err(err) => {
                self.handle_error(&err);
                Err(err)
            }
        }
    }

    /// Fetches a page of commits. Page 1 replaces the list, later pages append.
    #[tracing::instrument(skip(self))]
    pub async fn fetch_commits(&self, username: &str, repo_name: &str, page: u32) -> ClientResult<()> {
        let _loading = self.begin(|x| &mut x.loading_commits);
        match self.client.list_commits(username, repo_name, page).await {
            Ok(x) => {
                let mut state = self.state();
                if page == 1 {
                    state.commits = x.commits;
                } else {
                    state.commits.extend(x.commits);
                }
                state.commits_cursor = PageCursor::after_fetch(page, x.next_page);
                debug!(total = state.commits.len(), cursor = ?state.commits_cursor, "fetched commits");
                Ok(())
            }
            Err(err) => {
                self.handle_error(&err);
                Err(err)
            }
        }
    }

    /// Fetches a commit's detail unless it is already cached.
    ///
    /// Only completed fetches are cached, two overlapping calls for the same
    /// sha both go upstream and the later response wins.
    #[tracing::instrument(skip(self))]
    pub async fn fetch_commit_detail(
        &self,
        username: &str,
        repo_name: &str,
        sha: &str,
    ) -> ClientResult<()> {
        if self.state().commit_details.contains_key(sha) {
            debug!("commit detail cached");
            return Ok(());
        }
        let _loading = self.begin(|x| &mut x.loading_commit_detail);
        match self.client.get_commit_detail(username, repo_name, sha).await {
            Ok(detail) => {
                self.state().commit_details.insert(sha.to_owned(), detail);
                Ok(())
            }
            Err(err) => {
                self.handle_error(&err);
                Err(err)
            }
        }
    }

    /// Adds the commit to the front of the favourites, or removes it if present.
    pub fn toggle_favourite(&self, commit: &CommitSummary) {
        let mut state = self.state();
        let favourites = &mut state.favourites;
        match favourites.iter().position(|x| x.sha == commit.sha) {
            Some(idx) => {
                favourites.remove(idx);
            }
            None => favourites.insert(0, FavouriteCommit::from(commit)),
        }
        self.writer.schedule(favourites.clone());
    }

    pub fn remove_favourite(&self, sha: &str) {
        let mut state = self.state();
        let favourites = &mut state.favourites;
        if let Some(idx) = favourites.iter().position(|x| x.sha == sha) {
            favourites.remove(idx);
            self.writer.schedule(favourites.clone());
        }
    }

    pub fn is_favourite(&self, sha: &str) -> bool {
        self.state().favourites.iter().any(|x| x.sha == sha)
    }

    /// Commits in the current sort order.
    pub fn sorted_commits(&self) -> Vec<CommitSummary> {
        let state = self.state();
        sort_commits(&state.commits, state.commits_sort_order)
    }

    pub fn set_sort_order(&self, order: SortOrder) {
        self.state().commits_sort_order = order;
    }

    pub fn sort_order(&self) -> SortOrder {
        self.state().commits_sort_order
    }

    pub fn repos(&self) -> Vec<Repo> {
        self.state().repos.clone()
    }

    pub fn selected_repo(&self) -> Option<Repo> {
        self.state().selected_repo.clone()
    }

    /// Commits in arrival order.
    pub fn commits(&self) -> Vec<CommitSummary> {
        self.state().commits.clone()
    }

    pub fn commit_detail(&self, sha: &str) -> Option<CommitDetail> {
        self.state().commit_details.get(sha).cloned()
    }

    pub fn favourites(&self) -> Vec<FavouriteCommit> {
        self.state().favourites.clone()
    }

    /// Next page to fetch, or the last fetched page once history is exhausted.
    ///
    /// Use [`Store::commits_cursor`] to tell the two apart.
    pub fn commits_page(&self) -> u32 {
        self.state().commits_cursor.page()
    }

    pub fn commits_cursor(&self) -> PageCursor {
        self.state().commits_cursor
    }

    pub fn is_loading_repos(&self) -> bool {
        self.state().loading_repos
    }

    pub fn is_loading_commits(&self) -> bool {
        self.state().loading_commits
    }

    pub fn is_loading_commit_detail(&self) -> bool {
        self.state().loading_commit_detail
    }

    pub fn error(&self) -> Option<String> {
        self.state().error.clone()
    }

    pub fn clear_error(&self) {
        self.state().error = None;
    }

    /// Set when the latest failure was upstream quota exhaustion, cleared
    /// when the next operation starts.
    pub fn is_rate_limited(&self) -> bool {
        self.state().rate_limited
    }

    pub fn repo_feature(&self) -> RepoFeature<'_, C> {
        RepoFeature { store: self }
    }

    pub fn commit_feature(&self) -> CommitFeature<'_, C> {
        CommitFeature { store: self }
    }

    pub fn favourite_feature(&self) -> FavouriteFeature<'_, C> {
        FavouriteFeature { store: self }
    }

    /// Writes pending favourites now.
    pub async fn flush(&self) {
        self.writer.flush().await
    }

    /// Writes pending favourites and stops the background writer.
    pub async fn shutdown(self) {
        self.writer.shutdown().await
    }
}
