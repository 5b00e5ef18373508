//! Admission control.
//!
//! # Data Flow
//! ```text
//! Incoming lookup (ip present):
//!     → rate_limit.rs (global fixed-window check)
//!     → admitted: continue to the IP database
//!     → rejected: 429, database untouched
//! ```
//!
//! # Design Decisions
//! - One process-wide limit, not per client or per route
//! - Rejection is final for the request; nothing is queued or retried

pub mod rate_limit;

pub use rate_limit::{Admission, AdmissionGate};
