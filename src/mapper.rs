//! Converts upstream payloads into domain records.
//!
//! All functions are total: missing fields fall back to defaults and a body
//! of the wrong shape maps to an empty list.

use crate::{
    display::format_iso_date,
    github::responses::{GhCommit, GhCommitDetail, GhCommitInfo, GhFile, GhRepository},
    types::{CommitDetail, CommitFileDiff, CommitStats, CommitSummary, FileStatus, Repo},
};
use serde::de::DeserializeOwned;
use serde_json::Value;

pub fn map_repo(raw: GhRepository) -> Repo {
    let id = match raw.id {
        Some(Value::String(x)) => x,
        Some(Value::Null) | None => String::new(),
        Some(x) => x.to_string(),
    };
    Repo {
        id,
        name: raw.name.unwrap_or_else(|| "unknown".to_owned()),
        description: raw.description.unwrap_or_default(),
        stars: raw.stargazers_count.unwrap_or_default(),
        forks: raw.forks_count.unwrap_or_default(),
        language: raw.language.unwrap_or_else(|| "N/A".to_owned()),
        url: raw.html_url.unwrap_or_default(),
    }
}

/// Page responses do not carry the repository name, so it is bound up front.
pub fn map_commit_summary(repo_name: &str) -> impl Fn(GhCommit) -> CommitSummary + '_ {
    move |raw| {
        let (author_name, date, message) = commit_info(raw.commit);
        CommitSummary {
            sha: raw.sha.unwrap_or_default(),
            author_name,
            date,
            message,
            repo_name: repo_name.to_owned(),
        }
    }
}

pub fn map_commit_detail(repo_name: &str, raw: GhCommitDetail) -> CommitDetail {
    let (author_name, date, message) = commit_info(raw.commit);
    let files = match raw.files {
        Some(Value::Array(items)) => items
            .into_iter()
            .filter_map(|x| serde_json::from_value::<GhFile>(x).ok())
            .map(map_file)
            .collect(),
        _ => Vec::new(),
    };
    let stats = raw.stats.map(|x| CommitStats {
        additions: x.additions,
        deletions: x.deletions,
        total: x.total,
    });
    CommitDetail {
        sha: raw.sha.unwrap_or_default(),
        repo_name: repo_name.to_owned(),
        author_name,
        date,
        message,
        files,
        stats,
    }
}

fn map_file(raw: GhFile) -> CommitFileDiff {
    CommitFileDiff {
        filename: raw.filename.unwrap_or_default(),
        additions: raw.additions.unwrap_or_default(),
        deletions: raw.deletions.unwrap_or_default(),
        changes: raw.changes.unwrap_or_default(),
        status: raw.status.unwrap_or(FileStatus::Unknown),
    }
}

/// Maps a repository list body. Anything but a JSON array is an empty list.
pub fn map_repos(body: Value) -> Vec<Repo> {
    lenient_list::<GhRepository>(body)
        .into_iter()
        .map(map_repo)
        .collect()
}

/// Maps a commit list body. Anything but a JSON array is an empty list.
pub fn map_commits(repo_name: &str, body: Value) -> Vec<CommitSummary> {
    lenient_list::<GhCommit>(body)
        .into_iter()
        .map(map_commit_summary(repo_name))
        .collect()
}

/// Maps a commit detail body. A body that is not an object maps as if empty.
pub fn map_commit_detail_body(repo_name: &str, body: Value) -> CommitDetail {
    let raw = serde_json::from_value(body).unwrap_or_default();
    map_commit_detail(repo_name, raw)
}

fn commit_info(info: Option<GhCommitInfo>) -> (String, String, String) {
    let GhCommitInfo { author, message } = info.unwrap_or_default();
    let author = author.unwrap_or_default();
    let author_name = author.name.unwrap_or_else(|| "unknown".to_owned());
    let date = format_iso_date(author.date.as_deref());
    (author_name, date, message.unwrap_or_default())
}

fn lenient_list<T>(body: Value) -> Vec<T>
where
    T: DeserializeOwned + Default,
{
    match body {
        Value::Array(items) => items
            .into_iter()
            .map(|x| serde_json::from_value(x).unwrap_or_default())
            .collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_map_repo() {
        let raw: GhRepository = serde_json::from_value(json!({
            "id": 1296269,
            "name": "Hello-World",
            "description": "This your first repo!",
            "stargazers_count": 80,
            "forks_count": 9,
            "language": "Rust",
            "html_url": "https://github.com/octocat/Hello-World"
        }))
        .unwrap();
        assert_eq!(
            map_repo(raw),
            Repo {
                id: "1296269".to_owned(),
                name: "Hello-World".to_owned(),
                description: "This your first repo!".to_owned(),
                stars: 80,
                forks: 9,
                language: "Rust".to_owned(),
                url: "https://github.com/octocat/Hello-World".to_owned(),
            }
        );
    }

    #[test]
    fn test_map_repo_defaults() {
        let raw: GhRepository = serde_json::from_value(json!({
            "id": 7,
            "description": null,
            "language": null
        }))
        .unwrap();
        let repo = map_repo(raw);
        assert_eq!(repo.id, "7");
        assert_eq!(repo.name, "unknown");
        assert_eq!(repo.description, "");
        assert_eq!(repo.stars, 0);
        assert_eq!(repo.forks, 0);
        assert_eq!(repo.language, "N/A");
        assert_eq!(repo.url, "");
    }

    #[quickcheck_macros::quickcheck]
    fn test_map_repo_language_defaults_when_absent(name: Option<String>, stars: Option<u64>) -> bool {
        let raw = GhRepository {
            name,
            stargazers_count: stars,
            ..Default::default()
        };
        map_repo(raw).language == "N/A"
    }

    #[test]
    fn test_map_repos_tolerates_odd_bodies() {
        assert!(map_repos(json!([])).is_empty());
        assert!(map_repos(json!({"message": "nope"})).is_empty());
        assert!(map_repos(Value::Null).is_empty());

        let repos = map_repos(json!([{"id": 1, "name": "a"}, "b"]));
        assert_eq!(repos.len(), 2);
        assert_eq!(repos[0].name, "a");
        // not an object, every field defaults
        assert_eq!(repos[1].name, "unknown");
        assert_eq!(repos[1].id, "");
    }

    #[test]
    fn test_map_repos_defaults_mistyped_fields_individually() {
        let repos = map_repos(json!([
            {"id": 42, "name": "shub", "language": "Rust", "description": 7, "stargazers_count": "lots"}
        ]));
        assert_eq!(
            repos,
            [Repo {
                id: "42".to_owned(),
                name: "shub".to_owned(),
                description: String::new(),
                stars: 0,
                forks: 0,
                language: "Rust".to_owned(),
                url: String::new(),
            }]
        );
    }

    #[test]
    fn test_map_repo_without_id() {
        let repo = map_repos(json!([{"name": "shub"}])).remove(0);
        assert_eq!(repo.id, "");
        assert_eq!(repo.name, "shub");
    }

    #[test]
    fn test_map_commit_summary() {
        let raw: GhCommit = serde_json::from_value(json!({
            "sha": "6dcb09b",
            "commit": {
                "author": {"name": "Monalisa Octocat", "date": "2011-04-14T16:00:49Z"},
                "message": "Fix all the bugs"
            }
        }))
        .unwrap();
        let summary = map_commit_summary("Hello-World")(raw);
        assert_eq!(
            summary,
            CommitSummary {
                sha: "6dcb09b".to_owned(),
                author_name: "Monalisa Octocat".to_owned(),
                date: "Apr 14, 2011, 4:00 PM".to_owned(),
                message: "Fix all the bugs".to_owned(),
                repo_name: "Hello-World".to_owned(),
            }
        );
    }

    #[test]
    fn test_map_commit_summary_defaults() {
        let raw: GhCommit = serde_json::from_value(json!({"sha": "abc", "commit": {"author": null}})).unwrap();
        let summary = map_commit_summary("r")(raw);
        assert_eq!(summary.author_name, "unknown");
        assert_eq!(summary.date, "");
        assert_eq!(summary.message, "");
        assert_eq!(summary.repo_name, "r");
    }

    #[test]
    fn test_map_commits_non_array_is_empty() {
        assert!(map_commits("r", json!({"message": "Git Repository is empty."})).is_empty());
        assert_eq!(map_commits("r", json!([{"sha": "a"}, {"sha": "b"}])).len(), 2);
    }

    #[test]
    fn test_map_commit_detail() {
        let body = json!({
            "sha": "6dcb09b",
            "commit": {
                "author": {"name": "Monalisa Octocat", "date": "2011-04-14T16:00:49Z"},
                "message": "Fix all the bugs"
            },
            "stats": {"additions": 104, "deletions": 4, "total": 108},
            "files": [
                {"filename": "file1.txt", "additions": 103, "deletions": 2, "changes": 105, "status": "modified"},
                {"filename": "file2.txt", "additions": 1, "deletions": 2, "changes": 3, "status": "renamed"}
            ]
        });
        let detail = map_commit_detail_body("Hello-World", body);
        assert_eq!(detail.sha, "6dcb09b");
        assert_eq!(detail.repo_name, "Hello-World");
        assert_eq!(detail.files.len(), 2);
        assert_eq!(
            detail.files[0],
            CommitFileDiff {
                filename: "file1.txt".to_owned(),
                additions: 103,
                deletions: 2,
                changes: 105,
                status: FileStatus::Modified,
            }
        );
        assert_eq!(detail.files[1].status, FileStatus::Renamed);
        assert_eq!(
            detail.stats,
            Some(CommitStats { additions: 104, deletions: 4, total: 108 })
        );
    }

    #[test]
    fn test_map_commit_detail_without_files() {
        let detail = map_commit_detail_body("r", json!({"sha": "abc"}));
        assert!(detail.files.is_empty());
        assert_eq!(detail.stats, None);

        let detail = map_commit_detail_body("r", json!({"sha": "abc", "files": "garbage"}));
        assert!(detail.files.is_empty());
    }

    #[test]
    fn test_map_commit_detail_partial_file_entries() {
        let detail = map_commit_detail_body(
            "r",
            json!({"files": [
                {"filename": "a.rs", "additions": 1, "deletions": 0, "changes": 1, "status": "added"},
                {"filename": "b.rs", "additions": 2, "deletions": 3, "status": "modified"},
                "garbage"
            ]}),
        );
        assert_eq!(detail.files.len(), 2);
        assert_eq!(detail.files[0].filename, "a.rs");
        assert_eq!(
            detail.files[1],
            CommitFileDiff {
                filename: "b.rs".to_owned(),
                additions: 2,
                deletions: 3,
                changes: 0,
                status: FileStatus::Modified,
            }
        );
    }

    #[test]
    fn test_unrecognized_file_status() {
        let detail = map_commit_detail_body(
            "r",
            json!({"files": [{"filename": "f", "additions": 0, "deletions": 0, "changes": 0, "status": "teleported"}]}),
        );
        assert_eq!(detail.files[0].status, FileStatus::Unknown);
    }
}
