//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! built-in defaults
//!     → optional TOML file (--config)
//!     → environment overrides (PORT, RATE_LIMIT, IP_DB_PATH)
//!     → validation.rs (semantic checks)
//!     → AppConfig (validated, immutable)
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::AppConfig;
pub use schema::{
    DatabaseConfig, ListenerConfig, ObservabilityConfig, RateLimitConfig, TimeoutConfig,
};
pub use validation::ValidationError;
