pub mod client;
pub mod error;
pub mod link;
pub mod responses;

pub use client::{CommitPage, GhClient, GitHubApi};
pub use error::Error;
