//! Resilience subsystem for node requests.
//!
//! # Data Flow
//! ```text
//! Request to node:
//!     → fetcher issues the call (per-request timeout on the HTTP client)
//!     → On failure: retries.rs (is it retriable? budget left?)
//!     → exponential delay with jitter before the next attempt
//! ```
//!
//! # Design Decisions
//! - Retries live entirely in the request layer; checks never retry
//! - Retry budget is bounded by attempt count and total elapsed time
//! - Non-retriable node errors are returned immediately unless forced

pub mod retries;

pub use retries::RetryPolicy;
