#![deny(rust_2018_idioms)]

use crate::{app::App, cli::*};
use anyhow::Result;
use gh_explorer::{config::Config, github::GhClient, types::SortOrder};
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod app;
mod cli;

async fn run(app: &mut App<GhClient>, cmd: Command) -> Result<()> {
    match cmd {
        Command::Repos { username } => app.list_repositories(&username).await?,
        Command::Commits {
            username,
            repo,
            pages,
            oldest,
        } => {
            let order = if oldest {
                SortOrder::Oldest
            } else {
                SortOrder::Newest
            };
            app.list_commits(&username, &repo, pages, order).await?
        }
        Command::Show {
            username,
            repo,
            sha,
        } => app.show_commit(&username, &repo, &sha).await?,
        Command::Fav { cmd } => {
            use fav::Command::*;
            match cmd {
                Ls {} => app.list_favourites()?,
                Toggle {
                    username,
                    repo,
                    sha,
                } => app.toggle_favourite(&username, &repo, &sha).await?,
                Rm { sha } => app.remove_favourite(&sha),
            }
        }
        Command::Theme { cmd } => {
            use theme::Command::*;
            match cmd.unwrap_or(Show {}) {
                Show {} => app.show_theme(),
                Set { theme } => app.set_theme(theme),
                Toggle {} => app.toggle_theme(),
            }
        }
    };
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();
    let cli = cli::cmd();
    debug!(?cli, "launched");

    let config = Config::load(cli.config.as_deref())?;
    let mut app = App::new(&config, cli.ephemeral)?;

    let result = run(&mut app, cli.cmd).await;
    // favourites are written lazily, make sure the last change lands
    app.shutdown().await;

    debug!("exiting");
    result
}
