//! Upstream payload shapes.
//!
//! Every field is optional and read on its own: a missing, null or mistyped
//! field becomes `None` without affecting its siblings. Defaulting happens in
//! [`crate::mapper`].

use crate::types::FileStatus;
use serde::{de::DeserializeOwned, Deserialize, Deserializer};
use serde_json::Value;

/// Reads a field as `Some` only when it has the expected type.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(T::deserialize(value).ok())
}

#[derive(Deserialize, PartialEq, Default, Clone, Debug)]
#[serde(default)]
pub struct GhRepository {
    /// Numeric upstream, kept loose so the mapper can coerce whatever arrives.
    pub id: Option<Value>,
    #[serde(deserialize_with = "lenient")]
    pub name: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub description: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub stargazers_count: Option<u64>,
    #[serde(deserialize_with = "lenient")]
    pub forks_count: Option<u64>,
    #[serde(deserialize_with = "lenient")]
    pub language: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub html_url: Option<String>,
}

#[derive(Deserialize, PartialEq, Default, Clone, Debug)]
#[serde(default)]
pub struct GhCommit {
    #[serde(deserialize_with = "lenient")]
    pub sha: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub commit: Option<GhCommitInfo>,
}

#[derive(Deserialize, PartialEq, Default, Clone, Debug)]
#[serde(default)]
pub struct GhCommitInfo {
    #[serde(deserialize_with = "lenient")]
    pub author: Option<GhCommitActor>,
    #[serde(deserialize_with = "lenient")]
    pub message: Option<String>,
}

#[derive(Deserialize, PartialEq, Default, Clone, Debug)]
#[serde(default)]
pub struct GhCommitActor {
    #[serde(deserialize_with = "lenient")]
    pub name: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub email: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub date: Option<String>,
}

#[derive(Deserialize, PartialEq, Default, Clone, Debug)]
#[serde(default)]
pub struct GhCommitDetail {
    #[serde(deserialize_with = "lenient")]
    pub sha: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub commit: Option<GhCommitInfo>,
    /// Left raw, entries are mapped one by one.
    pub files: Option<Value>,
    #[serde(deserialize_with = "lenient")]
    pub stats: Option<GhCommitStats>,
}

#[derive(Deserialize, PartialEq, Default, Clone, Debug)]
#[serde(default)]
pub struct GhFile {
    #[serde(deserialize_with = "lenient")]
    pub filename: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub additions: Option<u64>,
    #[serde(deserialize_with = "lenient")]
    pub deletions: Option<u64>,
    #[serde(deserialize_with = "lenient")]
    pub changes: Option<u64>,
    #[serde(deserialize_with = "lenient")]
    pub status: Option<FileStatus>,
}

#[derive(Deserialize, PartialEq, Copy, Clone, Debug)]
pub struct GhCommitStats {
    pub additions: u64,
    pub deletions: u64,
    pub total: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_mistyped_field_does_not_affect_siblings() {
        let raw: GhRepository = serde_json::from_value(json!({
            "id": 42,
            "name": "shub",
            "description": 7,
            "stargazers_count": "lots",
            "language": "Rust"
        }))
        .unwrap();
        assert_eq!(raw.name.as_deref(), Some("shub"));
        assert_eq!(raw.description, None);
        assert_eq!(raw.stargazers_count, None);
        assert_eq!(raw.language.as_deref(), Some("Rust"));
    }

    #[test]
    fn test_mistyped_nested_object() {
        let raw: GhCommit = serde_json::from_value(json!({
            "sha": "abc",
            "commit": {"author": "Monalisa", "message": "Fix"}
        }))
        .unwrap();
        assert_eq!(raw.sha.as_deref(), Some("abc"));
        let info = raw.commit.unwrap();
        assert_eq!(info.author, None);
        assert_eq!(info.message.as_deref(), Some("Fix"));
    }
}
