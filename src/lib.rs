//! IP to city/country lookup service.

pub mod config;
pub mod http;
pub mod ipdb;
pub mod lifecycle;
pub mod observability;
pub mod pipeline;
pub mod security;

pub use config::AppConfig;
pub use http::HttpServer;
pub use ipdb::{IpDatabase, LocationRecord, LookupStore};
pub use lifecycle::Shutdown;
pub use pipeline::{LookupOutcome, RequestPipeline};
pub use security::AdmissionGate;
