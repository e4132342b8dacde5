//! Blockchain node data API conformance checker library

pub mod checks;
pub mod config;
pub mod fetcher;
pub mod lifecycle;
pub mod observability;
pub mod report;
pub mod resilience;

pub use checks::{run_checks, CheckContext, RunReport, SpecChecker};
pub use config::schema::CheckConfig;
pub use fetcher::{Fetcher, HttpFetcher};
pub use lifecycle::Shutdown;
