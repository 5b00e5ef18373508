//! IP location database subsystem.
//!
//! # Data Flow
//! ```text
//! CSV file (ip,city,country)
//!     → store.rs (parse into a fresh snapshot)
//!     → atomic swap of the active snapshot
//!     → find() served lock-free from the current snapshot
//!
//! On file change (optional):
//!     watcher.rs detects change
//!     → store.rs reloads
//!     → old snapshot kept if the reload fails
//! ```
//!
//! # Design Decisions
//! - Exact string keys: no CIDR ranges, no address normalization
//! - Rows with fewer than three fields are skipped, not rejected
//! - Load is all-or-nothing

pub mod store;
pub mod types;
pub mod watcher;

pub use store::LookupStore;
pub use types::{LoadError, LocationRecord, LookupError, LookupResult};
pub use watcher::DatabaseWatcher;

/// Read side of an IP location database.
pub trait IpDatabase: Send + Sync {
    /// Look up the location for `ip` by exact string match.
    fn find(&self, ip: &str) -> LookupResult<LocationRecord>;
}
