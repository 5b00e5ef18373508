//! Database file watcher for hot reload.
//!
//! # Design Decisions
//! - Watch the parent directory, so a rename over the database file is seen
//! - Reload only once a writer closes the file or a rename lands on it;
//!   truncation and intermediate writes are ignored
//! - A reload that yields no records never replaces a populated snapshot

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use notify::event::{AccessKind, AccessMode, ModifyKind};
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};

use crate::ipdb::store::LookupStore;
use crate::observability::metrics;

/// Watches the CSV source and reloads the store when it changes.
pub struct DatabaseWatcher {
    path: PathBuf,
    store: Arc<LookupStore>,
}

impl DatabaseWatcher {
    pub fn new(path: &Path, store: Arc<LookupStore>) -> Self {
        Self {
            path: path.to_path_buf(),
            store,
        }
    }

    /// Start watching the file in a background thread.
    ///
    /// The returned watcher must be kept alive for as long as reloads are wanted.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let file_name: OsString = self
            .path
            .file_name()
            .ok_or_else(|| notify::Error::generic("IP database path has no file name"))?
            .to_owned();
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let path = self.path.clone();
        let store = self.store;

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    if is_complete_write(&event, &file_name) {
                        reload(&store, &path);
                    }
                }
                Err(e) => tracing::error!(error = %e, "Watch error"),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&dir, RecursiveMode::NonRecursive)?;

        tracing::info!(path = %self.path.display(), "IP database watcher started");
        Ok(watcher)
    }
}

/// Whether `event` means the file named `file_name` holds a finished rewrite.
fn is_complete_write(event: &Event, file_name: &OsStr) -> bool {
    let finished = matches!(
        event.kind,
        EventKind::Access(AccessKind::Close(AccessMode::Write))
            | EventKind::Modify(ModifyKind::Name(_))
    );
    finished
        && event
            .paths
            .iter()
            .any(|p| p.file_name() == Some(file_name))
}

/// Reload `store` from `path`, keeping the active snapshot on failure.
pub fn reload(store: &LookupStore, path: &Path) -> bool {
    tracing::info!(path = %path.display(), "IP database change detected, reloading");
    match store.reload(path) {
        Ok(_) => {
            metrics::record_store_reload(true);
            true
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to reload IP database, keeping current snapshot");
            metrics::record_store_reload(false);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ipdb::IpDatabase;
    use notify::event::{CreateKind, DataChange, RenameMode};
    use std::fs::{self, OpenOptions};
    use std::io::Write;
    use std::time::Instant;

    const SETTLE: Duration = Duration::from_millis(500);

    fn wait_for(mut condition: impl FnMut() -> bool) -> bool {
        let deadline = Instant::now() + Duration::from_secs(5);
        while Instant::now() < deadline {
            if condition() {
                return true;
            }
            std::thread::sleep(Duration::from_millis(50));
        }
        condition()
    }

    #[test]
    fn test_only_finished_writes_trigger_reload() {
        let name = OsStr::new("ipdb.csv");
        let target = PathBuf::from("/data/ipdb.csv");

        let close_write = Event::new(EventKind::Access(AccessKind::Close(AccessMode::Write)))
            .add_path(target.clone());
        let renamed = Event::new(EventKind::Modify(ModifyKind::Name(RenameMode::To)))
            .add_path(target.clone());
        assert!(is_complete_write(&close_write, name));
        assert!(is_complete_write(&renamed, name));

        let truncated = Event::new(EventKind::Modify(ModifyKind::Data(DataChange::Any)))
            .add_path(target.clone());
        let created = Event::new(EventKind::Create(CreateKind::File)).add_path(target);
        assert!(!is_complete_write(&truncated, name));
        assert!(!is_complete_write(&created, name));

        let sibling = Event::new(EventKind::Access(AccessKind::Close(AccessMode::Write)))
            .add_path(PathBuf::from("/data/ipdb.csv.tmp"));
        assert!(!is_complete_write(&sibling, name));
    }

    #[test]
    fn test_reload_swaps_in_new_source() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "1.1.1.1,Sydney,Australia").unwrap();
        let store = LookupStore::open(file.path()).unwrap();

        writeln!(file, "8.8.8.8,Mountain View,United States").unwrap();
        file.flush().unwrap();

        assert!(reload(&store, file.path()));
        assert_eq!(store.len(), 2);
        assert_eq!(store.find("8.8.8.8").unwrap().city, "Mountain View");
    }

    #[test]
    fn test_reload_failure_keeps_snapshot() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "1.1.1.1,Sydney,Australia").unwrap();
        let store = LookupStore::open(file.path()).unwrap();

        let missing = file.path().with_extension("gone");
        assert!(!reload(&store, &missing));
        assert_eq!(store.find("1.1.1.1").unwrap().country, "Australia");
    }

    #[test]
    fn test_watcher_ignores_partial_rewrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ipdb.csv");
        fs::write(
            &path,
            "1.1.1.1,Sydney,Australia\n8.8.8.8,Mountain View,United States\n",
        )
        .unwrap();

        let store = Arc::new(LookupStore::open(&path).unwrap());
        let _watcher = DatabaseWatcher::new(&path, store.clone()).run().unwrap();

        // Truncate and write half a row while the writer still holds the file.
        let mut writer = OpenOptions::new()
            .write(true)
            .truncate(true)
            .open(&path)
            .unwrap();
        writer.write_all(b"1.1.1.1,Syd").unwrap();
        writer.flush().unwrap();
        std::thread::sleep(SETTLE);
        assert_eq!(store.len(), 2);

        // Closing it leaves a file with no complete row.
        drop(writer);
        std::thread::sleep(SETTLE);
        assert_eq!(store.len(), 2);
        assert_eq!(store.find("8.8.8.8").unwrap().city, "Mountain View");

        // Atomic replace through a sibling file.
        let staged = dir.path().join("ipdb.csv.tmp");
        fs::write(&staged, "5.39.0.1,Paris,France\n").unwrap();
        fs::rename(&staged, &path).unwrap();

        assert!(wait_for(|| store.find("5.39.0.1").is_ok()));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_watcher_reloads_on_close_after_write() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ipdb.csv");
        fs::write(&path, "1.1.1.1,Sydney,Australia\n").unwrap();

        let store = Arc::new(LookupStore::open(&path).unwrap());
        let _watcher = DatabaseWatcher::new(&path, store.clone()).run().unwrap();

        fs::write(&path, "1.1.1.1,Sydney,Australia\n77.88.8.8,Moscow,Russia\n").unwrap();

        assert!(wait_for(|| store.find("77.88.8.8").is_ok()));
        assert_eq!(store.len(), 2);
    }
}
