//! Defines application domain data types.

use crate::display::parse_display_date;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use thiserror::Error;

// types ------------------------------

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
pub struct Repo {
    pub id: String,
    pub name: String,
    pub description: String,
    pub stars: u64,
    pub forks: u64,
    pub language: String,
    pub url: String,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
pub struct CommitSummary {
    pub sha: String,
    pub author_name: String,
    /// Display formatted, see [`crate::display::format_iso_date`].
    pub date: String,
    pub message: String,
    pub repo_name: String,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
pub struct CommitDetail {
    pub sha: String,
    pub repo_name: String,
    pub author_name: String,
    pub date: String,
    pub message: String,
    pub files: Vec<CommitFileDiff>,
    pub stats: Option<CommitStats>,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
pub struct CommitFileDiff {
    pub filename: String,
    pub additions: u64,
    pub deletions: u64,
    pub changes: u64,
    pub status: FileStatus,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Copy, Clone)]
#[serde(rename_all = "snake_case")]
pub enum FileStatus {
    Added,
    Modified,
    Removed,
    Renamed,
    Copied,
    Changed,
    Unchanged,
    #[serde(other)]
    Unknown,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Copy, Clone)]
pub struct CommitStats {
    pub additions: u64,
    pub deletions: u64,
    pub total: u64,
}

/// Bookmarked commit as persisted. Author and date are left out on purpose.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct FavouriteCommit {
    pub sha: String,
    pub message: String,
    pub repo_name: String,
}

#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum SortOrder {
    Newest,
    Oldest,
}

/// Where commit pagination stands after the latest fetch.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum PageCursor {
    /// Page to request next.
    Next(u32),
    /// Upstream reported no further pages; `last` is the page fetched last.
    Exhausted { last: u32 },
}

// end: types ------------------------------

// FileStatus impls ------------------------------

impl fmt::Display for FileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use FileStatus::*;
        let s = match self {
            Added => "added",
            Modified => "modified",
            Removed => "removed",
            Renamed => "renamed",
            Copied => "copied",
            Changed => "changed",
            Unchanged => "unchanged",
            Unknown => "unknown",
        };
        f.write_str(s)
    }
}

// end: FileStatus impls ------------------------------

// FavouriteCommit impls ------------------------------

impl From<&CommitSummary> for FavouriteCommit {
    fn from(x: &CommitSummary) -> Self {
        Self {
            sha: x.sha.clone(),
            message: x.message.clone(),
            repo_name: x.repo_name.clone(),
        }
    }
}

impl From<&CommitDetail> for CommitSummary {
    fn from(x: &CommitDetail) -> Self {
        Self {
            sha: x.sha.clone(),
            author_name: x.author_name.clone(),
            date: x.date.clone(),
            message: x.message.clone(),
            repo_name: x.repo_name.clone(),
        }
    }
}

// end: FavouriteCommit impls ------------------------------

// SortOrder impls ------------------------------

impl Default for SortOrder {
    fn default() -> Self {
        Self::Newest
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SortOrder::Newest => "newest",
            SortOrder::Oldest => "oldest",
        };
        f.write_str(s)
    }
}

impl FromStr for SortOrder {
    type Err = ParseSortOrderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = match s {
            "newest" => SortOrder::Newest,
            "oldest" => SortOrder::Oldest,
            _ => {
                let err = ParseSortOrderError(format!("unexpected string, was `{}`", s));
                return Err(err);
            }
        };
        Ok(s)
    }
}

#[derive(Debug, Error)]
#[error("{0}")]
pub struct ParseSortOrderError(String /* message */);

// end: SortOrder impls ------------------------------

// PageCursor impls ------------------------------

impl Default for PageCursor {
    fn default() -> Self {
        Self::Next(1)
    }
}

impl PageCursor {
    /// Cursor after fetching `page`, given the upstream's next page if any.
    pub fn after_fetch(page: u32, next_page: Option<u32>) -> Self {
        match next_page {
            Some(x) => Self::Next(x),
            None => Self::Exhausted { last: page },
        }
    }

    /// Next page number, or the last fetched one when exhausted.
    pub fn page(self) -> u32 {
        match self {
            Self::Next(x) => x,
            Self::Exhausted { last } => last,
        }
    }

    pub fn is_exhausted(self) -> bool {
        matches!(self, Self::Exhausted { .. })
    }
}

// end: PageCursor impls ------------------------------

/// Returns a sorted copy of `commits`, never touching the input.
///
/// Sort key is the parsed `date`. The sort is stable, commits whose date does
/// not parse keep their relative order.
pub fn sort_commits(commits: &[CommitSummary], order: SortOrder) -> Vec<CommitSummary> {
    let mut keyed: Vec<_> = commits
        .iter()
        .map(|x| (parse_display_date(&x.date), x))
        .collect();
    keyed.sort_by(|(a, _), (b, _)| match order {
        SortOrder::Newest => b.cmp(a),
        SortOrder::Oldest => a.cmp(b),
    });
    keyed.into_iter().map(|(_, x)| x.clone()).collect()
}
