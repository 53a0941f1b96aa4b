use thiserror::Error;

pub const RATE_LIMIT_MESSAGE: &str = "GitHub API rate limit exceeded. Please try again later.";

#[derive(Error, Debug)]
pub enum Error {
    /// 403 with no remaining quota.
    #[error("{}", RATE_LIMIT_MESSAGE)]
    RateLimited,

    #[error("{0}")]
    NotFound(String),

    /// Any other non-success status.
    #[error("{0}")]
    RequestFailed(String),

    #[error(transparent)]
    Transport(#[from] reqwest::Error),

    #[error(transparent)]
    Url(#[from] url::ParseError),

    #[error(transparent)]
    Header(#[from] http::header::InvalidHeaderValue),
}

impl Error {
    /// Whether the error reports exhausted upstream quota.
    ///
    /// Also recognizes rate limit wording in other failures' messages.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Error::RateLimited) || self.to_string().contains("rate limit")
    }
}
