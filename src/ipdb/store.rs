//! CSV-backed lookup store.
//!
//! # Design Decisions
//! - The active mapping is an immutable snapshot behind an `ArcSwap`
//! - A load parses into a fresh map and swaps it in only once the whole
//!   source has been read; a failed load leaves the old snapshot active
//! - Readers never take a lock and always see one complete snapshot
//! - A reload never swaps an empty snapshot over a populated one

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::sync::Arc;

use arc_swap::ArcSwap;
use csv::ReaderBuilder;

use crate::ipdb::types::{LoadError, LocationRecord, LookupError, LookupResult};
use crate::ipdb::IpDatabase;
use crate::observability::metrics;

type Snapshot = HashMap<String, LocationRecord>;

/// In-memory IP → location mapping, loaded from a CSV source.
pub struct LookupStore {
    snapshot: ArcSwap<Snapshot>,
}

impl LookupStore {
    /// Create an empty store. Every lookup misses until a load succeeds.
    pub fn new() -> Self {
        Self {
            snapshot: ArcSwap::from_pointee(HashMap::new()),
        }
    }

    /// Open a store and load it from `path` in one step.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let store = Self::new();
        store.load(path)?;
        Ok(store)
    }

    /// Load the CSV file at `path`, replacing the active snapshot.
    ///
    /// Returns the number of records in the new snapshot.
    pub fn load(&self, path: impl AsRef<Path>) -> Result<usize, LoadError> {
        let path = path.as_ref();
        let count = self.install(read_file(path)?);
        tracing::info!(path = %path.display(), records = count, "IP database loaded");
        Ok(count)
    }

    /// Reload from `path` while serving.
    ///
    /// Like [`load`](Self::load), but a source that yields no records is
    /// rejected with [`LoadError::Empty`] when the active snapshot is populated.
    /// A file caught mid-rewrite (truncated, or holding only a partial row)
    /// therefore never replaces a good snapshot.
    pub fn reload(&self, path: impl AsRef<Path>) -> Result<usize, LoadError> {
        let path = path.as_ref();
        let snapshot = read_file(path)?;
        if snapshot.is_empty() && !self.is_empty() {
            return Err(LoadError::Empty {
                path: path.to_path_buf(),
            });
        }

        let count = self.install(snapshot);
        tracing::info!(path = %path.display(), records = count, "IP database reloaded");
        Ok(count)
    }

    /// Load `ip,city,country` rows from any reader, replacing the active snapshot.
    pub fn load_from_reader<R: Read>(&self, reader: R) -> Result<usize, LoadError> {
        Ok(self.install(parse_records(reader)?))
    }

    fn install(&self, snapshot: Snapshot) -> usize {
        let count = snapshot.len();
        self.snapshot.store(Arc::new(snapshot));
        metrics::record_store_size(count);
        count
    }

    /// The active snapshot, held as one unit.
    #[cfg(test)]
    fn current(&self) -> Arc<Snapshot> {
        self.snapshot.load_full()
    }

    /// Number of records in the active snapshot.
    pub fn len(&self) -> usize {
        self.snapshot.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for LookupStore {
    fn default() -> Self {
        Self::new()
    }
}

impl IpDatabase for LookupStore {
    fn find(&self, ip: &str) -> LookupResult<LocationRecord> {
        self.snapshot
            .load()
            .get(ip)
            .cloned()
            .ok_or_else(|| LookupError::NotFound(ip.to_string()))
    }
}

fn read_file(path: &Path) -> Result<Snapshot, LoadError> {
    let file = File::open(path).map_err(|source| LoadError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    parse_records(BufReader::new(file))
}

/// Parse every row of `reader` into a fresh snapshot.
///
/// Rows with fewer than three fields are skipped; fields past the third are ignored.
/// Duplicate addresses keep the last row seen.
fn parse_records<R: Read>(reader: R) -> Result<Snapshot, LoadError> {
    let mut csv_reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut snapshot = HashMap::new();
    let mut skipped = 0usize;

    for result in csv_reader.records() {
        let row = result?;
        match (row.get(0), row.get(1), row.get(2)) {
            (Some(ip), Some(city), Some(country)) => {
                snapshot.insert(ip.to_string(), LocationRecord::new(city, country));
            }
            _ => skipped += 1,
        }
    }

    if skipped > 0 {
        tracing::debug!(skipped, "Skipped malformed IP database rows");
    }

    Ok(snapshot)
}
