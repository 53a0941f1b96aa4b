use clap::{Parser, Subcommand};
use gh_explorer::theme::Theme;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[clap(author, version, about)]
pub struct Cli {
    /// Config file, defaults to the platform config directory.
    #[clap(long, global = true)]
    pub config: Option<PathBuf>,

    /// Keep favourites and theme in memory only.
    #[clap(long, global = true)]
    pub ephemeral: bool,

    #[clap(subcommand)]
    pub cmd: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print public repositories of a user.
    Repos {
        /// GitHub username.
        username: String,
    },
    /// Print commit history of a repository.
    Commits {
        /// GitHub username.
        username: String,

        /// Repository name.
        repo: String,

        /// Number of pages to fetch.
        #[clap(long, default_value = "1")]
        pages: u32,

        /// Oldest commits first.
        #[clap(long)]
        oldest: bool,
    },
    /// Print a commit and its changed files.
    Show {
        /// GitHub username.
        username: String,

        /// Repository name.
        repo: String,

        /// Commit sha.
        sha: String,
    },
    /// Favourite commits operations.
    Fav {
        #[clap(subcommand)]
        cmd: self::fav::Command,
    },
    /// Theme preference operations.
    Theme {
        #[clap(subcommand)]
        cmd: Option<self::theme::Command>,
    },
}

pub mod fav {
    use super::*;

    #[derive(Subcommand, Debug)]
    pub enum Command {
        /// Print favourite commits.
        Ls {},

        /// Favourite a commit, or unfavourite it if it already is.
        Toggle {
            /// GitHub username.
            username: String,

            /// Repository name.
            repo: String,

            /// Commit sha.
            sha: String,
        },

        /// Unfavourite a commit.
        Rm {
            /// Commit sha.
            sha: String,
        },
    }
}

pub mod theme {
    use super::*;

    #[derive(Subcommand, Debug)]
    pub enum Command {
        /// Print the theme.
        Show {},

        /// Set the theme.
        Set {
            /// One of `light`, `dark` or `auto`.
            theme: Theme,
        },

        /// Switch to the next theme.
        Toggle {},
    }
}

pub fn cmd() -> Cli {
    Cli::parse()
}
