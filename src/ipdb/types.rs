//! Location records and error definitions.

use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

/// City and country an IP address resolves to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocationRecord {
    pub city: String,
    pub country: String,
}

impl LocationRecord {
    pub fn new(city: impl Into<String>, country: impl Into<String>) -> Self {
        Self {
            city: city.into(),
            country: country.into(),
        }
    }
}

/// Errors raised while loading a database source.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The source file could not be opened.
    #[error("failed to open IP database {path:?}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The source could be opened but not read or parsed to the end.
    #[error("failed to read IP database: {0}")]
    Read(#[from] csv::Error),

    /// A reload produced no records while the active snapshot has some.
    #[error("refusing to replace IP database with empty source {path:?}")]
    Empty { path: PathBuf },
}

/// Errors raised by a lookup.
#[derive(Debug, Error)]
pub enum LookupError {
    /// The address has no entry in the database.
    #[error("IP {0} not found in the database")]
    NotFound(String),

    /// The database could not answer for a reason other than absence.
    #[error("IP database unavailable: {0}")]
    Backend(String),
}

impl LookupError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, LookupError::NotFound(_))
    }
}

/// Result type for lookups.
pub type LookupResult<T> = Result<T, LookupError>;
