//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Checks and the request layer produce:
//!     → logging.rs (structured log events, one span per check)
//!     → metrics.rs (counters and histograms)
//!
//! Consumers:
//!     → stderr (pretty or JSON lines)
//!     → Prometheus text snapshot written after the run
//! ```
//!
//! # Design Decisions
//! - Structured fields instead of formatted strings wherever possible
//! - The run ID is attached to the root span so every event carries it
//! - Metric updates are no-ops until a recorder is installed

pub mod logging;
pub mod metrics;
