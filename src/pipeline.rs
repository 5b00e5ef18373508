//! Request pipeline: parameter check → admission gate → IP database.

use std::sync::Arc;

use crate::ipdb::{IpDatabase, LocationRecord, LookupError};
use crate::security::AdmissionGate;

/// Result of handling one lookup request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupOutcome {
    /// No `ip` was supplied.
    MissingParameter,
    /// The admission gate rejected the request.
    RateLimited,
    /// The address is not in the database.
    LookupMiss,
    /// The database failed for a reason other than absence.
    LookupFailure(String),
    Found { ip: String, record: LocationRecord },
}

impl LookupOutcome {
    /// Label used in logs and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            LookupOutcome::MissingParameter => "missing_parameter",
            LookupOutcome::RateLimited => "rate_limited",
            LookupOutcome::LookupMiss => "lookup_miss",
            LookupOutcome::LookupFailure(_) => "lookup_failure",
            LookupOutcome::Found { .. } => "found",
        }
    }
}

/// Stateless composition of the admission gate and the IP database.
#[derive(Clone)]
pub struct RequestPipeline {
    gate: Arc<AdmissionGate>,
    database: Arc<dyn IpDatabase>,
}

impl RequestPipeline {
    pub fn new(gate: Arc<AdmissionGate>, database: Arc<dyn IpDatabase>) -> Self {
        Self { gate, database }
    }

    pub fn gate(&self) -> &AdmissionGate {
        &self.gate
    }

    pub fn handle(&self, ip: &str) -> LookupOutcome {
        if ip.is_empty() {
            return LookupOutcome::MissingParameter;
        }

        if !self.gate.admit().is_admitted() {
            return LookupOutcome::RateLimited;
        }

        match self.database.find(ip) {
            Ok(record) => LookupOutcome::Found {
                ip: ip.to_string(),
                record,
            },
            Err(LookupError::NotFound(_)) => LookupOutcome::LookupMiss,
            Err(e) => LookupOutcome::LookupFailure(e.to_string()),
        }
    }
}
