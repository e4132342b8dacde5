//! Conformance checks.
//!
//! # Data Flow
//! ```text
//! runner.rs (build fetchers, preflight)
//!     → run_checks (fixed order, one span per endpoint)
//!         network.rs       /network/status, /network/list, /network/options
//!         account.rs       /account/balance, /account/coins
//!             └─ discovery.rs (backward block scan for a fixture account)
//!         block.rs         /block
//!         error_object.rs  invalid request to every endpoint
//!     → status.rs (per-endpoint requirement statuses + findings)
//!     → RunReport
//! ```
//!
//! # Design Decisions
//! - Each check owns a `Validation` for its endpoint and returns a frozen report
//! - A failing check never stops the ones after it
//! - `/network/list` and `/network/options` go to the offline endpoint, every
//!   other call to the online one

pub mod account;
pub mod block;
pub mod discovery;
pub mod error_object;
pub mod network;
pub mod runner;
pub mod status;
pub mod validators;

#[cfg(test)]
pub(crate) mod mock;

use tracing::Instrument;
use uuid::Uuid;

use crate::config::CheckConfig;
use crate::fetcher::client::Fetcher;
use crate::fetcher::types::NetworkIdentifier;
use crate::lifecycle::ShutdownSignal;

pub use runner::{CheckError, SpecChecker};
pub use status::{Api, EndpointReport, RunReport, Status};

/// Everything a check needs for one run.
pub struct CheckContext<'a> {
    pub online: &'a dyn Fetcher,
    pub offline: &'a dyn Fetcher,
    pub config: &'a CheckConfig,
    pub signal: ShutdownSignal,
}

impl<'a> CheckContext<'a> {
    pub fn new(
        online: &'a dyn Fetcher,
        offline: &'a dyn Fetcher,
        config: &'a CheckConfig,
        signal: ShutdownSignal,
    ) -> Self {
        Self {
            online,
            offline,
            config,
            signal,
        }
    }

    pub fn network(&self) -> &NetworkIdentifier {
        &self.config.network
    }

    /// Discovery block budget; `None` when unbounded.
    pub fn max_blocks(&self) -> Option<u64> {
        match self.config.discovery.max_blocks_scanned {
            0 => None,
            limit => Some(limit),
        }
    }
}

/// Run every check in order and collect the reports.
pub async fn run_checks(ctx: &CheckContext<'_>) -> RunReport {
    let run_id = Uuid::new_v4();
    tracing::info!(%run_id, "Starting conformance checks");

    let mut endpoints = Vec::with_capacity(7);
    endpoints.push(
        network::network_status(ctx)
            .instrument(tracing::info_span!("check", %run_id, api = Api::NetworkStatus.name()))
            .await,
    );
    endpoints.push(
        network::network_list(ctx)
            .instrument(tracing::info_span!("check", %run_id, api = Api::NetworkList.name()))
            .await,
    );
    endpoints.push(
        network::network_options(ctx)
            .instrument(tracing::info_span!("check", %run_id, api = Api::NetworkOptions.name()))
            .await,
    );
    endpoints.push(
        account::account_balance(ctx)
            .instrument(tracing::info_span!("check", %run_id, api = Api::AccountBalance.name()))
            .await,
    );
    endpoints.push(
        account::account_coins(ctx)
            .instrument(tracing::info_span!("check", %run_id, api = Api::AccountCoins.name()))
            .await,
    );
    endpoints.push(
        block::block(ctx)
            .instrument(tracing::info_span!("check", %run_id, api = Api::Block.name()))
            .await,
    );
    endpoints.push(
        error_object::error_object(ctx)
            .instrument(tracing::info_span!("check", %run_id, api = Api::ErrorObject.name()))
            .await,
    );

    let report = RunReport {
        run_id,
        network: ctx.network().clone(),
        endpoints,
    };
    tracing::info!(%run_id, failures = report.failure_count(), "Conformance checks finished");
    report
}
