//! Browse a GitHub account's repositories and commit history, and bookmark
//! commits locally.
//!
//! [`store::Store`] owns all state and is the entry point: it fetches through
//! a [`github::GitHubApi`] implementation and persists favourites through
//! [`storage::Storage`].

pub mod config;
pub mod display;
pub mod github;
pub mod mapper;
pub mod persist;
pub mod storage;
pub mod store;
pub mod theme;
pub mod types;

pub use github::{GhClient, GitHubApi};
pub use storage::Storage;
pub use store::{Store, StoreOptions};
