//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Ctrl-C (signals.rs)
//!     → Shutdown::trigger (shutdown.rs)
//!     → every ShutdownSignal observes it
//!     → account discovery stops scanning at the next block boundary
//! ```
//!
//! # Design Decisions
//! - A run is never aborted mid-check; only the long block scan listens
//! - The signal is level-triggered so late subscribers still see it

pub mod shutdown;
pub mod signals;

pub use shutdown::{Shutdown, ShutdownSignal};
