use super::{error::Error, link};
use crate::{
    mapper,
    types::{CommitDetail, CommitSummary, Repo},
};
use async_trait::async_trait;
use http::{
    header::{ACCEPT, LINK, USER_AGENT},
    HeaderMap, HeaderValue,
};
use reqwest::{Client, ClientBuilder, Response, StatusCode};
use serde_json::Value;
use tracing::debug;
use url::Url;

pub type ClientResult<T> = Result<T, Error>;

pub const DEFAULT_BASE_URL: &str = "https://api.github.com/";

pub const DEFAULT_PER_PAGE: u8 = 20;

const RATE_LIMIT_REMAINING: &str = "x-ratelimit-remaining";

/// One page of a repository's commit history.
#[derive(PartialEq, Clone, Debug)]
pub struct CommitPage {
    pub commits: Vec<CommitSummary>,
    /// `None` when upstream reports no further page.
    pub next_page: Option<u32>,
}

/// Read-only GitHub queries the store depends on.
#[async_trait]
pub trait GitHubApi: Send + Sync {
    /// List public repositories of a user.
    async fn list_repos(&self, username: &str) -> ClientResult<Vec<Repo>>;

    /// List one page of commits of a repository, newest first.
    async fn list_commits(&self, username: &str, repo: &str, page: u32)
        -> ClientResult<CommitPage>;

    /// Get a single commit including its changed files.
    async fn get_commit_detail(
        &self,
        username: &str,
        repo: &str,
        sha: &str,
    ) -> ClientResult<CommitDetail>;
}

/// Anonymous GitHub REST client.
#[derive(Debug, Clone)]
pub struct GhClient {
    base_url: Url,
    http: Client,
    per_page: u8,
}

impl GhClient {
    pub fn new(base_url: impl Into<Option<Url>>, per_page: u8) -> ClientResult<Self> {
        let base_url: Url = base_url
            .into()
            .map(Result::Ok)
            .unwrap_or_else(|| DEFAULT_BASE_URL.parse())?;

        let headers = {
            let mut headers = HeaderMap::new();

            let user_agent = format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
            headers.insert(USER_AGENT, HeaderValue::from_str(&user_agent)?);

            headers.insert(ACCEPT, "application/vnd.github.v3+json".try_into()?);

            headers
        };

        let http = ClientBuilder::new().default_headers(headers).build()?;

        let client = GhClient {
            base_url,
            http,
            per_page,
        };
        debug!(?client);

        Ok(client)
    }

    fn build_url(&self, segments: &[&str]) -> ClientResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// List repositories for a user.
    ///
    /// [GitHub Docs].
    ///
    /// [GitHub Docs]: https://docs.github.com/en/rest/repos/repos#list-repositories-for-a-user
    pub async fn list_user_repositories(&self, username: &str) -> ClientResult<Vec<Repo>> {
        let url = self.build_url(&["users", username, "repos"])?;
        let request = self.http.get(url);
        debug!(?request, "sending request");
        let response = request.send().await?;
        debug!(?response, "received response");
        let response = check_status(response, "repositories", || {
            format!("User '{username}' not found. Please check the username and try again.")
        })?;
        let body: Value = response.json().await?;
        Ok(mapper::map_repos(body))
    }

    /// List commits.
    ///
    /// [GitHub Docs].
    ///
    /// [GitHub Docs]: https://docs.github.com/en/rest/commits/commits#list-commits
    pub async fn list_repository_commits(
        &self,
        username: &str,
        repo: &str,
        page: u32,
        per_page: u8,
    ) -> ClientResult<CommitPage> {
        let url = self.build_url(&["repos", username, repo, "commits"])?;
        let request = self
            .http
            .get(url)
            .query(&[("per_page", per_page.to_string()), ("page", page.to_string())]);
        debug!(?request, "sending request");
        let response = request.send().await?;
        debug!(?response, "received response");
        let response = check_status(response, "commits", || {
            format!("Repository '{username}/{repo}' not found or has no commits.")
        })?;
        let next_page = response
            .headers()
            .get(LINK)
            .and_then(|x| x.to_str().ok())
            .and_then(link::next_page);
        let body: Value = response.json().await?;
        let commits = mapper::map_commits(repo, body);
        debug!(count = commits.len(), ?next_page, "commit page");
        Ok(CommitPage { commits, next_page })
    }

    /// Get a commit.
    ///
    /// [GitHub Docs].
    ///
    /// [GitHub Docs]: https://docs.github.com/en/rest/commits/commits#get-a-commit
    pub async fn get_commit(
        &self,
        username: &str,
        repo: &str,
        sha: &str,
    ) -> ClientResult<CommitDetail> {
        let url = self.build_url(&["repos", username, repo, "commits", sha])?;
        let request = self.http.get(url);
        debug!(?request, "sending request");
        let response = request.send().await?;
        debug!(?response, "received response");
        let response = check_status(response, "commit details", || {
            format!("Commit '{sha}' not found in repository '{username}/{repo}'.")
        })?;
        let body: Value = response.json().await?;
        Ok(mapper::map_commit_detail_body(repo, body))
    }
}

#[async_trait]
impl GitHubApi for GhClient {
    async fn list_repos(&self, username: &str) -> ClientResult<Vec<Repo>> {
        self.list_user_repositories(username).await
    }

    async fn list_commits(
        &self,
        username: &str,
        repo: &str,
        page: u32,
    ) -> ClientResult<CommitPage> {
        self.list_repository_commits(username, repo, page, self.per_page)
            .await
    }

    async fn get_commit_detail(
        &self,
        username: &str,
        repo: &str,
        sha: &str,
    ) -> ClientResult<CommitDetail> {
        self.get_commit(username, repo, sha).await
    }
}

/// Classifies a response before its body is read.
fn check_status(
    response: Response,
    resource: &str,
    not_found: impl FnOnce() -> String,
) -> ClientResult<Response> {
    let status = response.status();
    if status == StatusCode::FORBIDDEN {
        let remaining = response
            .headers()
            .get(RATE_LIMIT_REMAINING)
            .and_then(|x| x.to_str().ok());
        if remaining == Some("0") {
            return Err(Error::RateLimited);
        }
    }
    if status == StatusCode::NOT_FOUND {
        return Err(Error::NotFound(not_found()));
    }
    if !status.is_success() {
        let reason = status.canonical_reason().unwrap_or_else(|| status.as_str());
        return Err(Error::RequestFailed(format!(
            "Failed to fetch {resource}: {reason}"
        )));
    }
    Ok(response)
}
