//! Debounced persistence of the favourites list.
//!
//! Every mutation hands the whole list to a background task, which writes it
//! once the list has been quiet for the debounce window. A newer list replaces
//! a pending one and restarts the window, so only the latest state is written.

use crate::{storage::Storage, types::FavouriteCommit};
use std::time::Duration;
use tokio::{
    sync::{mpsc, oneshot},
    task::JoinHandle,
    time,
};
use tracing::{debug, trace};

pub const FAVOURITES_KEY: &str = "favourites";

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

#[derive(Debug)]
enum Command {
    Update(Vec<FavouriteCommit>),
    Flush(oneshot::Sender<()>),
}

/// Handle to the writer task.
///
/// Dropping it lets the task write whatever is pending and exit.
#[derive(Debug)]
pub struct FavouritesWriter {
    tx: mpsc::UnboundedSender<Command>,
    task: JoinHandle<()>,
}

impl FavouritesWriter {
    /// Spawns the writer task. Must be called within a tokio runtime.
    pub fn spawn(storage: Storage, window: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(run(storage, window, rx));
        Self { tx, task }
    }

    /// Schedules `favourites` to be written after the debounce window.
    pub fn schedule(&self, favourites: Vec<FavouriteCommit>) {
        if self.tx.send(Command::Update(favourites)).is_err() {
            debug!("favourites writer is gone, dropping update");
        }
    }

    /// Writes any pending list now and waits for it.
    pub async fn flush(&self) {
        let (ack, done) = oneshot::channel();
        if self.tx.send(Command::Flush(ack)).is_ok() {
            done.await.ok();
        }
    }

    /// Flushes and stops the task.
    pub async fn shutdown(self) {
        let Self { tx, task } = self;
        drop(tx);
        task.await.ok();
    }
}

async fn run(
    storage: Storage,
    window: Duration,
    mut rx: mpsc::UnboundedReceiver<Command>,
) {
    let mut pending: Option<Vec<FavouriteCommit>> = None;
    loop {
        let command = if pending.is_some() {
            tokio::select! {
                command = rx.recv() => command,
                _ = time::sleep(window) => {
                    write(&storage, pending.take());
                    continue;
                }
            }
        } else {
            rx.recv().await
        };
        match command {
            Some(Command::Update(x)) => {
                trace!(len = x.len(), "favourites changed");
                pending = Some(x);
            }
            Some(Command::Flush(ack)) => {
                write(&storage, pending.take());
                ack.send(()).ok();
            }
            None => {
                write(&storage, pending.take());
                break;
            }
        }
    }
    debug!("favourites writer stopped");
}

fn write(storage: &Storage, favourites: Option<Vec<FavouriteCommit>>) {
    if let Some(x) = favourites {
        debug!(len = x.len(), "writing favourites");
        storage.save(FAVOURITES_KEY, &x);
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::storage::{Backend, Error};
    use std::sync::{Arc, Mutex};

    /// Backend recording every write it receives.
    #[derive(Clone, Default)]
    pub(crate) struct RecordingBackend {
        pub(crate) writes: Arc<Mutex<Vec<(String, String)>>>,
        pub(crate) seed: Option<(String, String)>,
    }

    impl RecordingBackend {
        pub(crate) fn writes(&self) -> Vec<(String, String)> {
            self.writes.lock().unwrap().clone()
        }
    }

    impl Backend for RecordingBackend {
        fn read(&self, key: &str) -> Result<Option<String>, Error> {
            let seeded = self.seed.as_ref().filter(|(k, _)| k == key);
            Ok(seeded.map(|(_, v)| v.clone()))
        }

        fn write(&self, key: &str, value: &str) -> Result<(), Error> {
            self.writes
                .lock()
                .unwrap()
                .push((key.to_owned(), value.to_owned()));
            Ok(())
        }

        fn delete(&self, _: &str) -> Result<(), Error> {
            Ok(())
        }

        fn clear(&self) -> Result<(), Error> {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{test_support::RecordingBackend, *};

    fn favourite(sha: &str) -> FavouriteCommit {
        FavouriteCommit {
            sha: sha.to_owned(),
            message: format!("commit {sha}"),
            repo_name: "shub".to_owned(),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_rapid_updates_collapse_into_one_write() {
        let backend = RecordingBackend::default();
        let writer = FavouritesWriter::spawn(Storage::new(backend.clone()), DEFAULT_DEBOUNCE);

        writer.schedule(vec![favourite("a")]);
        time::sleep(Duration::from_millis(100)).await;
        writer.schedule(vec![favourite("b"), favourite("a")]);
        time::sleep(Duration::from_millis(100)).await;
        writer.schedule(vec![favourite("b")]);

        // window restarted by every update
        time::sleep(Duration::from_millis(250)).await;
        assert!(backend.writes().is_empty());

        time::sleep(Duration::from_millis(100)).await;
        let writes = backend.writes();
        assert_eq!(writes.len(), 1);
        assert_eq!(writes[0].0, FAVOURITES_KEY);
        let written: Vec<FavouriteCommit> = serde_json::from_str(&writes[0].1).unwrap();
        assert_eq!(written, [favourite("b")]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_flush_writes_pending_immediately() {
        let backend = RecordingBackend::default();
        let writer = FavouritesWriter::spawn(Storage::new(backend.clone()), DEFAULT_DEBOUNCE);

        writer.schedule(vec![favourite("a")]);
        writer.flush().await;
        assert_eq!(backend.writes().len(), 1);

        // nothing pending anymore
        time::sleep(Duration::from_secs(1)).await;
        assert_eq!(backend.writes().len(), 1);

        // flushing with nothing pending writes nothing
        writer.flush().await;
        assert_eq!(backend.writes().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_writes_pending() {
        let backend = RecordingBackend::default();
        let writer = FavouritesWriter::spawn(Storage::new(backend.clone()), DEFAULT_DEBOUNCE);

        writer.schedule(Vec::new());
        writer.shutdown().await;

        assert_eq!(backend.writes(), [(FAVOURITES_KEY.to_owned(), "[]".to_owned())]);
    }
}
