//! Node API request layer.
//!
//! # Data Flow
//! ```text
//! CheckConfig (URLs, connection limits, retry budget, timeout)
//!     → client.rs (HttpFetcher: JSON POST per endpoint, connection limit)
//!     → resilience (retry with backoff on retriable failures)
//!     → types.rs (typed responses or FetchError)
//!     → preflight.rs (reachability + validation file before checks start)
//! ```
//!
//! # Design Decisions
//! - Checks depend on the `Fetcher` trait only, never on HTTP details
//! - Online and offline handles are separate instances with separate limits
//! - A failed request is terminal for the caller once retries are exhausted

pub mod client;
pub mod preflight;
pub mod types;

pub use client::{Fetcher, FetcherOptions, HttpFetcher};
pub use types::{FetchError, FetchResult};
