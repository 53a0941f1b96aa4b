use crate::github::client::{DEFAULT_BASE_URL, DEFAULT_PER_PAGE};
use anyhow::{Context, Error};
use directories_next::ProjectDirs;
use serde::Deserialize;
use std::{
    env, fs,
    path::{Path, PathBuf},
    time::Duration,
};
use tracing::debug;
use url::Url;

pub const BASE_URL_ENV: &str = "GH_EXPLORER_BASE_URL";
pub const DATABASE_ENV: &str = "GH_EXPLORER_DATABASE";

#[derive(Deserialize, PartialEq, Clone, Debug)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub base_url: Url,
    pub per_page: u8,
    pub favourites_debounce_ms: u64,
    /// Defaults to `explorer.db` in the platform data directory.
    pub database_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_BASE_URL).expect("default base url is valid"),
            per_page: DEFAULT_PER_PAGE,
            favourites_debounce_ms: 300,
            database_path: None,
        }
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "gh-explorer")
}

impl Config {
    /// Default location of the config file.
    pub fn default_path() -> Option<PathBuf> {
        project_dirs().map(|x| x.config_dir().join("config.toml"))
    }

    /// Reads `path`, or the default location when `None`, then applies
    /// environment overrides. A missing file yields defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, Error> {
        let path = path.map(ToOwned::to_owned).or_else(Self::default_path);
        let mut config = match path {
            Some(path) if path.exists() => {
                let text = fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read config at `{}`.", path.display()))?;
                Self::parse(&text)
                    .with_context(|| format!("Invalid config at `{}`.", path.display()))?
            }
            _ => Self::default(),
        };
        config.apply_env(|name| env::var(name).ok())?;
        debug!(?config, "loaded config");
        Ok(config)
    }

    pub fn parse(text: &str) -> Result<Self, Error> {
        let config = toml::from_str(text)?;
        Ok(config)
    }

    fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) -> Result<(), Error> {
        if let Some(x) = var(BASE_URL_ENV) {
            self.base_url = x
                .parse()
                .with_context(|| format!("`{BASE_URL_ENV}` is not a valid url, was `{x}`."))?;
        }
        if let Some(x) = var(DATABASE_ENV) {
            self.database_path = Some(x.into());
        }
        Ok(())
    }

    pub fn favourites_debounce(&self) -> Duration {
        Duration::from_millis(self.favourites_debounce_ms)
    }

    pub fn database_path(&self) -> Option<PathBuf> {
        self.database_path
            .clone()
            .or_else(|| project_dirs().map(|x| x.data_dir().join("explorer.db")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.base_url.as_str(), "https://api.github.com/");
        assert_eq!(config.per_page, 20);
        assert_eq!(config.favourites_debounce(), Duration::from_millis(300));
    }

    #[test]
    fn test_parse() {
        let config = Config::parse(
            r#"
            base_url = "https://ghe.example.com/api/v3/"
            per_page = 50
            database_path = "/tmp/explorer.db"
            "#,
        )
        .unwrap();
        assert_eq!(config.base_url.as_str(), "https://ghe.example.com/api/v3/");
        assert_eq!(config.per_page, 50);
        assert_eq!(config.favourites_debounce_ms, 300);
        assert_eq!(
            config.database_path(),
            Some(PathBuf::from("/tmp/explorer.db"))
        );
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        assert!(Config::parse("colour = true").is_err());
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config
            .apply_env(|name| match name {
                BASE_URL_ENV => Some("http://localhost:8080/".to_owned()),
                DATABASE_ENV => Some("/var/lib/explorer.db".to_owned()),
                _ => None,
            })
            .unwrap();
        assert_eq!(config.base_url.as_str(), "http://localhost:8080/");
        assert_eq!(
            config.database_path,
            Some(PathBuf::from("/var/lib/explorer.db"))
        );

        let err = Config::default()
            .apply_env(|name| (name == BASE_URL_ENV).then(|| "not a url".to_owned()))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "`GH_EXPLORER_BASE_URL` is not a valid url, was `not a url`."
        );
    }

    #[test]
    fn test_file_then_env() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "favourites_debounce_ms = 50").unwrap();
        let text = fs::read_to_string(file.path()).unwrap();
        let mut config = Config::parse(&text).unwrap();
        config
            .apply_env(|name| (name == DATABASE_ENV).then(|| "/tmp/override.db".to_owned()))
            .unwrap();
        assert_eq!(config.favourites_debounce(), Duration::from_millis(50));
        assert_eq!(config.base_url.as_str(), DEFAULT_BASE_URL);
        assert_eq!(
            config.database_path(),
            Some(PathBuf::from("/tmp/override.db"))
        );
    }
}
