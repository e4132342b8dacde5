//! Run setup: builds both request handles, initializes the node and runs
//! the checks.

use std::path::Path;
use thiserror::Error;

use crate::checks::status::RunReport;
use crate::checks::{run_checks, CheckContext};
use crate::config::CheckConfig;
use crate::fetcher::preflight::{self, NodeProfile, PreflightError};
use crate::fetcher::{FetchError, FetcherOptions, HttpFetcher};
use crate::lifecycle::ShutdownSignal;

#[derive(Debug, Error)]
pub enum CheckError {
    #[error("construction configuration is required to check the offline endpoint")]
    MissingConstruction,

    #[error("unable to create {role} fetcher: {source}")]
    Fetcher {
        role: &'static str,
        #[source]
        source: FetchError,
    },

    #[error("unable to initialize the node: {0}")]
    Preflight(#[from] PreflightError),
}

/// A configured, initialized conformance run.
pub struct SpecChecker {
    config: CheckConfig,
    online: HttpFetcher,
    offline: HttpFetcher,
    profile: NodeProfile,
}

impl SpecChecker {
    /// Build the online and offline handles and initialize the node.
    pub async fn connect(config: CheckConfig) -> Result<Self, CheckError> {
        let construction = config
            .construction
            .as_ref()
            .ok_or(CheckError::MissingConstruction)?;

        let online = HttpFetcher::new(&config.online_url, FetcherOptions::online(&config))
            .map_err(|source| CheckError::Fetcher { role: "online", source })?;
        let offline = HttpFetcher::new(
            &construction.offline_url,
            FetcherOptions::offline(&config, construction),
        )
        .map_err(|source| CheckError::Fetcher { role: "offline", source })?;
        let accounting_model = construction.accounting_model;

        tracing::info!(
            online = %online.base_url(),
            offline = %offline.base_url(),
            "Initializing node"
        );
        let profile = preflight::initialize(
            &online,
            &config.network,
            config.validation_file.as_deref().map(Path::new),
            Some(accounting_model),
        )
        .await?;

        Ok(Self {
            config,
            online,
            offline,
            profile,
        })
    }

    /// What the node reported during initialization.
    pub fn profile(&self) -> &NodeProfile {
        &self.profile
    }

    pub fn config(&self) -> &CheckConfig {
        &self.config
    }

    /// Run every check. `signal` cancels account discovery.
    pub async fn run(&self, signal: ShutdownSignal) -> RunReport {
        let ctx = CheckContext::new(&self.online, &self.offline, &self.config, signal);
        run_checks(&ctx).await
    }
}
