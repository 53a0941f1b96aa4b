//! Durable key/value storage for small JSON documents.

use rusqlite::{params, OptionalExtension};
use serde::{de::DeserializeOwned, Serialize};
use std::{
    collections::BTreeMap,
    fmt,
    path::Path,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};
use thiserror::Error;
use tracing::{debug, warn};

/// Sql for database migrations.
///
/// All operations must be idempotent.
const MIGRATIONS: &str = "
    CREATE TABLE IF NOT EXISTS kv (
        key TEXT PRIMARY KEY NOT NULL,
        value TEXT NOT NULL
    );
";

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Raw string storage underneath [`Storage`].
pub trait Backend: Send + Sync {
    fn read(&self, key: &str) -> Result<Option<String>, Error>;

    /// Overwrites any previous value.
    fn write(&self, key: &str, value: &str) -> Result<(), Error>;

    fn delete(&self, key: &str) -> Result<(), Error>;

    fn clear(&self) -> Result<(), Error>;
}

/// JSON documents keyed by name.
///
/// Failures never propagate, they are logged and the operation is dropped.
/// Reads fall back to the caller's default.
#[derive(Clone)]
pub struct Storage {
    backend: Arc<dyn Backend>,
}

impl fmt::Debug for Storage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Storage").finish_non_exhaustive()
    }
}

impl Storage {
    pub fn new(backend: impl Backend + 'static) -> Self {
        Self {
            backend: Arc::new(backend),
        }
    }

    /// Opens a SQLite database file, creating it if needed.
    pub fn open(path: &Path) -> Result<Self, Error> {
        Ok(Self::new(SqliteBackend::open(path)?))
    }

    /// Non durable storage, contents are gone with the process.
    pub fn in_memory() -> Self {
        Self::new(MemoryBackend::default())
    }

    #[tracing::instrument(skip(self, value))]
    pub fn save<T>(&self, key: &str, value: &T)
    where
        T: Serialize + ?Sized,
    {
        let result = serde_json::to_string(value)
            .map_err(Error::from)
            .and_then(|x| self.backend.write(key, &x));
        match result {
            Ok(()) => debug!("saved"),
            Err(err) => warn!(%err, "failed to save"),
        }
    }

    #[tracing::instrument(skip(self, default))]
    pub fn load<T>(&self, key: &str, default: T) -> T
    where
        T: DeserializeOwned,
    {
        let raw = match self.backend.read(key) {
            Ok(Some(x)) => x,
            Ok(None) => return default,
            Err(err) => {
                warn!(%err, "failed to read");
                return default;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(x) => x,
            Err(err) => {
                warn!(%err, "stored value is not valid");
                default
            }
        }
    }

    #[tracing::instrument(skip(self))]
    pub fn remove(&self, key: &str) {
        if let Err(err) = self.backend.delete(key) {
            warn!(%err, "failed to remove");
        }
    }

    #[tracing::instrument(skip(self))]
    pub fn clear(&self) {
        if let Err(err) = self.backend.clear() {
            warn!(%err, "failed to clear");
        }
    }
}

pub struct SqliteBackend(Mutex<rusqlite::Connection>);

impl SqliteBackend {
    #[tracing::instrument]
    pub fn open(path: &Path) -> Result<Self, Error> {
        let conn = rusqlite::Connection::open(path)?;
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self, Error> {
        let conn = rusqlite::Connection::open_in_memory()?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: rusqlite::Connection) -> Result<Self, Error> {
        let db = Self(Mutex::new(conn));
        migrate(&db)?;
        Ok(db)
    }

    fn conn(&self) -> MutexGuard<'_, rusqlite::Connection> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Migrates database.
fn migrate(db: &SqliteBackend) -> Result<(), Error> {
    db.conn().execute_batch(MIGRATIONS)?;
    Ok(())
}

impl Backend for SqliteBackend {
    fn read(&self, key: &str) -> Result<Option<String>, Error> {
        let conn = self.conn();
        let mut stmt = conn.prepare_cached("SELECT value FROM kv WHERE key = ?;")?;
        let value = stmt.query_row([key], |x| x.get(0)).optional()?;
        Ok(value)
    }

    fn write(&self, key: &str, value: &str) -> Result<(), Error> {
        self.conn().execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?, ?);",
            params![key, value],
        )?;
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), Error> {
        self.conn().execute("DELETE FROM kv WHERE key = ?;", [key])?;
        Ok(())
    }

    fn clear(&self) -> Result<(), Error> {
        self.conn().execute("DELETE FROM kv;", [])?;
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryBackend(Mutex<BTreeMap<String, String>>);

impl MemoryBackend {
    fn map(&self) -> MutexGuard<'_, BTreeMap<String, String>> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Backend for MemoryBackend {
    fn read(&self, key: &str) -> Result<Option<String>, Error> {
        Ok(self.map().get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<(), Error> {
        self.map().insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), Error> {
        self.map().remove(key);
        Ok(())
    }

    fn clear(&self) -> Result<(), Error> {
        self.map().clear();
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::types::FavouriteCommit;

    fn connect() -> SqliteBackend {
        SqliteBackend::open_in_memory().unwrap()
    }

    fn favourite(sha: &str) -> FavouriteCommit {
        FavouriteCommit {
            sha: sha.to_owned(),
            message: "msg".to_owned(),
            repo_name: "shub".to_owned(),
        }
    }

    #[test]
    fn test_migration_safe_to_run_multiple_time() {
        let db = connect();
        for _ in 0..3 {
            migrate(&db).unwrap();
        }
    }

    #[test]
    fn test_save_overwrites_and_load() {
        let storage = Storage::new(connect());
        storage.save("favourites", &[favourite("a")]);
        storage.save("favourites", &[favourite("b"), favourite("c")]);

        let loaded: Vec<FavouriteCommit> = storage.load("favourites", Vec::new());
        assert_eq!(loaded, [favourite("b"), favourite("c")]);
    }

    #[test]
    fn test_load_falls_back_to_default() {
        let storage = Storage::new(connect());
        let loaded: Vec<FavouriteCommit> = storage.load("favourites", vec![favourite("d")]);
        assert_eq!(loaded, [favourite("d")]);

        // stored but not the expected shape
        storage.save("favourites", "not a list");
        let loaded: Vec<FavouriteCommit> = storage.load("favourites", Vec::new());
        assert!(loaded.is_empty());
    }

    #[test]
    fn test_remove_and_clear() {
        let storage = Storage::in_memory();
        storage.save("a", &1);
        storage.save("b", &2);

        storage.remove("a");
        assert_eq!(storage.load("a", 0), 0);
        assert_eq!(storage.load("b", 0), 2);

        storage.clear();
        assert_eq!(storage.load("b", 0), 0);

        // removing what is not there is fine
        storage.remove("nope");
    }

    #[test]
    fn test_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("explorer.db");

        Storage::open(&path).unwrap().save("theme", "dark");
        let theme: String = Storage::open(&path).unwrap().load("theme", String::new());
        assert_eq!(theme, "dark");
    }

    struct BrokenBackend;

    impl Backend for BrokenBackend {
        fn read(&self, _: &str) -> Result<Option<String>, Error> {
            Err(rusqlite::Error::InvalidQuery.into())
        }

        fn write(&self, _: &str, _: &str) -> Result<(), Error> {
            Err(rusqlite::Error::InvalidQuery.into())
        }

        fn delete(&self, _: &str) -> Result<(), Error> {
            Err(rusqlite::Error::InvalidQuery.into())
        }

        fn clear(&self) -> Result<(), Error> {
            Err(rusqlite::Error::InvalidQuery.into())
        }
    }

    #[test]
    fn test_backend_failures_are_swallowed() {
        let storage = Storage::new(BrokenBackend);
        storage.save("favourites", &[favourite("a")]);
        storage.remove("favourites");
        storage.clear();
        assert_eq!(storage.load("favourites", 7), 7);
    }
}
