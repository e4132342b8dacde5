//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → CheckConfig (validated, immutable)
//!     → passed by reference into the fetchers and every check
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; one run uses one config
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use schema::{
    AccountingModel, CheckConfig, ConstructionConfig, CurveType, DiscoveryConfig, LogFormat,
    ObservabilityConfig,
};
