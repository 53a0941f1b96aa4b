use anyhow::{Context, Error};
use console::{style, Term};
use gh_explorer::{
    config::Config,
    display::ellipsize,
    github::{client::ClientResult, GhClient, GitHubApi},
    storage::Storage,
    store::{Store, StoreOptions},
    theme::{Theme, ThemePreference},
    types::{CommitSummary, SortOrder},
};
use std::io::Write;
use tabwriter::TabWriter;
use tracing::debug;

const DESCRIPTION_LEN: usize = 50;
const MESSAGE_LEN: usize = 60;

pub struct App<C> {
    store: Store<C>,
    theme: ThemePreference,
}

impl App<GhClient> {
    pub fn new(config: &Config, ephemeral: bool) -> Result<Self, Error> {
        let client = GhClient::new(config.base_url.clone(), config.per_page)?;
        let storage = open_storage(config, ephemeral)?;
        let options = StoreOptions {
            favourites_debounce: config.favourites_debounce(),
        };
        let store = Store::new(client, storage.clone(), options);
        let theme = ThemePreference::load(storage);
        Ok(Self { store, theme })
    }
}

fn open_storage(config: &Config, ephemeral: bool) -> Result<Storage, Error> {
    if ephemeral {
        return Ok(Storage::in_memory());
    }
    let path = config
        .database_path()
        .context("Cannot determine where to keep the database, set `database_path`.")?;
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create `{}`.", dir.display()))?;
    }
    debug!(path = %path.display(), "opening database");
    Storage::open(&path)
        .with_context(|| format!("Failed to open database at `{}`.", path.display()))
}

impl<C> App<C>
where
    C: GitHubApi,
{
    /// Prints the rate limit banner when applicable and converts the failure.
    fn check<T>(&self, result: ClientResult<T>) -> Result<T, Error> {
        result.map_err(|err| {
            if self.store.is_rate_limited() {
                let banner = style("Rate limited by GitHub, wait a while before retrying.")
                    .yellow()
                    .bold();
                eprintln!("{banner}");
            }
            Error::new(err)
        })
    }

    pub async fn list_repositories(&self, username: &str) -> Result<(), Error> {
        let repos = self.store.repo_feature();
        self.check(repos.fetch_repos(username).await)?;

        let mut tw = TabWriter::new(Term::buffered_stdout());
        writeln!(tw, "NAME\tLANGUAGE\tSTARS\tFORKS\tDESCRIPTION")?;
        for repo in repos.repos() {
            writeln!(
                tw,
                "{}\t{}\t{}\t{}\t{}",
                repo.name,
                repo.language,
                repo.stars,
                repo.forks,
                ellipsize(&repo.description, DESCRIPTION_LEN)
            )?;
        }
        tw.flush()?;
        Ok(())
    }

    pub async fn list_commits(
        &self,
        username: &str,
        repo: &str,
        pages: u32,
        order: SortOrder,
    ) -> Result<(), Error> {
        let commits = self.store.commit_feature();
        commits.change_sort_order(order);
        self.check(commits.fetch_commits(username, repo, 1).await)?;
        for _ in 1..pages {
            if commits.cursor().is_exhausted() {
                break;
            }
            self.check(commits.load_next_page(username, repo).await)?;
        }

        let mut stdout = Term::buffered_stdout();
        for commit in commits.commits() {
            self.write_commit_line(&mut stdout, &commit)?;
        }
        if !commits.cursor().is_exhausted() {
            writeln!(
                stdout,
                "{}",
                style(format!("more from page {}", commits.current_page())).dim()
            )?;
        }
        stdout.flush()?;
        Ok(())
    }

    fn write_commit_line(&self, w: &mut impl Write, commit: &CommitSummary) -> Result<(), Error> {
        let mark = if self.store.is_favourite(&commit.sha) {
            "*"
        } else {
            " "
        };
        writeln!(
            w,
            "{mark} {} {:20} {:15} {}",
            style(short_sha(&commit.sha)).yellow(),
            commit.date,
            ellipsize(&commit.author_name, 15),
            ellipsize(&commit.message, MESSAGE_LEN)
        )?;
        Ok(())
    }

    pub async fn show_commit(&self, username: &str, repo: &str, sha: &str) -> Result<(), Error> {
        let commits = self.store.commit_feature();
        self.check(commits.fetch_commit_detail(username, repo, sha).await)?;
        let detail = commits
            .commit_detail(sha)
            .with_context(|| format!("Commit {sha} was not loaded."))?;

        let mut stdout = Term::buffered_stdout();
        writeln!(stdout, "{} {}", style("commit").bold(), style(&detail.sha).yellow())?;
        writeln!(stdout, "Author: {}", detail.author_name)?;
        writeln!(stdout, "Date:   {}", detail.date)?;
        writeln!(stdout)?;
        for line in detail.message.lines() {
            writeln!(stdout, "    {line}")?;
        }
        writeln!(stdout)?;
        stdout.flush()?;

        let mut tw = TabWriter::new(stdout);
        for file in &detail.files {
            writeln!(
                tw,
                "{}\t{}\t{}\t{}",
                file.status,
                style(format!("+{}", file.additions)).green(),
                style(format!("-{}", file.deletions)).red(),
                file.filename
            )?;
        }
        if let Some(stats) = detail.stats {
            writeln!(
                tw,
                "total\t+{}\t-{}\t{} files",
                stats.additions,
                stats.deletions,
                detail.files.len()
            )?;
        }
        tw.flush()?;
        Ok(())
    }

    pub fn list_favourites(&self) -> Result<(), Error> {
        let mut stdout = Term::buffered_stdout();
        for fav in self.store.favourite_feature().favourites() {
            writeln!(
                stdout,
                "{} {:20} {}",
                style(short_sha(&fav.sha)).yellow(),
                fav.repo_name,
                ellipsize(&fav.message, MESSAGE_LEN)
            )?;
        }
        stdout.flush()?;
        Ok(())
    }

    pub async fn toggle_favourite(&self, username: &str, repo: &str, sha: &str) -> Result<(), Error> {
        let commits = self.store.commit_feature();
        self.check(commits.fetch_commit_detail(username, repo, sha).await)?;
        let detail = commits
            .commit_detail(sha)
            .with_context(|| format!("Commit {sha} was not loaded."))?;

        let favourites = self.store.favourite_feature();
        favourites.toggle_favourite(&CommitSummary::from(&detail));
        if favourites.is_favourite(sha) {
            println!("Added {} to favourites.", short_sha(sha));
        } else {
            println!("Removed {} from favourites.", short_sha(sha));
        }
        Ok(())
    }

    pub fn remove_favourite(&self, sha: &str) {
        let favourites = self.store.favourite_feature();
        if favourites.is_favourite(sha) {
            favourites.remove_favourite(sha);
            println!("Removed {} from favourites.", short_sha(sha));
        } else {
            println!("{} is not a favourite.", short_sha(sha));
        }
    }

    pub fn show_theme(&self) {
        println!("{}", self.theme.theme());
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.theme.set_theme(theme);
        println!("{theme}");
    }

    pub fn toggle_theme(&mut self) {
        let theme = self.theme.toggle_theme();
        println!("{theme}");
    }

    /// Persists pending favourites.
    pub async fn shutdown(self) {
        self.store.shutdown().await
    }
}

fn short_sha(sha: &str) -> &str {
    sha.get(..7).unwrap_or(sha)
}
