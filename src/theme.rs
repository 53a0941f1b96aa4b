//! Colour theme preference.

use crate::storage::Storage;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use thiserror::Error;
use tracing::debug;

pub const THEME_KEY: &str = "github-explorer-theme";

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Copy, Clone)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    /// Follow the system preference.
    Auto,
}

impl Default for Theme {
    fn default() -> Self {
        Theme::Auto
    }
}

impl Theme {
    /// light -> dark -> auto -> light
    pub fn next(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Auto,
            Theme::Auto => Theme::Light,
        }
    }

    /// Resolves `Auto` against the system preference.
    pub fn effective(self, system_prefers_dark: bool) -> Theme {
        match self {
            Theme::Auto if system_prefers_dark => Theme::Dark,
            Theme::Auto => Theme::Light,
            x => x,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
            Theme::Auto => "auto",
        };
        f.write_str(s)
    }
}

impl FromStr for Theme {
    type Err = ParseThemeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            "auto" => Ok(Theme::Auto),
            _ => Err(ParseThemeError(format!(
                "expecting one of `light`, `dark` or `auto`, but was `{}`",
                s
            ))),
        }
    }
}

#[derive(Debug, Error)]
#[error("{0}")]
pub struct ParseThemeError(String /* message */);

/// Theme preference backed by storage, written on every change.
#[derive(Debug)]
pub struct ThemePreference {
    storage: Storage,
    theme: Theme,
}

impl ThemePreference {
    /// Loads the stored theme. Missing or unrecognized values mean `Auto`.
    pub fn load(storage: Storage) -> Self {
        let theme = storage.load(THEME_KEY, Theme::default());
        debug!(%theme, "loaded theme");
        Self { storage, theme }
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
        self.storage.save(THEME_KEY, &theme);
    }

    pub fn toggle_theme(&mut self) -> Theme {
        let next = self.theme.next();
        self.set_theme(next);
        next
    }

    pub fn effective_theme(&self, system_prefers_dark: bool) -> Theme {
        self.theme.effective(system_prefers_dark)
    }
}
