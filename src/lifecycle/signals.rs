//! OS signal handling.

use std::sync::Arc;

use crate::lifecycle::shutdown::Shutdown;

/// Trigger `shutdown` on the first Ctrl-C.
pub fn cancel_on_ctrl_c(shutdown: Arc<Shutdown>) {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::warn!("Interrupt received, cancelling account discovery");
                shutdown.trigger();
            }
            Err(e) => tracing::error!(error = %e, "Unable to listen for Ctrl-C"),
        }
    });
}
