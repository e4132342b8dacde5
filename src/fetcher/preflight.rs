//! Pre-run initialization of the online handle.
//!
//! Before any check runs, the node must answer `/network/status` and
//! `/network/options` for the configured network, and the optional
//! validation file must load. Any failure aborts the run.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::schema::AccountingModel;
use crate::fetcher::client::Fetcher;
use crate::fetcher::types::{FetchError, NetworkIdentifier, NetworkStatusResponse};

/// Response validation settings read from the validation file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ValidationRules {
    /// The rest of the file is ignored unless set.
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub chain_type: Option<AccountingModel>,
}

impl ValidationRules {
    /// The file's chain type when the rules are enabled and it differs from
    /// the configured accounting model.
    pub fn conflicting_chain_type(&self, configured: AccountingModel) -> Option<AccountingModel> {
        if !self.enabled {
            return None;
        }
        self.chain_type.filter(|chain| *chain != configured)
    }
}

/// What the node reported while initializing.
#[derive(Debug, Clone)]
pub struct NodeProfile {
    pub status: NetworkStatusResponse,
    pub rules: Option<ValidationRules>,
}

#[derive(Debug, Error)]
pub enum PreflightError {
    #[error("unable to fetch network status: {0}")]
    NetworkStatus(#[source] FetchError),

    #[error("unable to fetch network options: {0}")]
    NetworkOptions(#[source] FetchError),

    #[error("unable to load validation file {path:?}: {reason}")]
    ValidationFile { path: PathBuf, reason: String },
}

/// Load the validation file.
pub fn load_validation_rules(path: &Path) -> Result<ValidationRules, PreflightError> {
    let content = std::fs::read_to_string(path).map_err(|e| PreflightError::ValidationFile {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    serde_json::from_str(&content).map_err(|e| PreflightError::ValidationFile {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

/// Confirm the node serves the configured network and load validation rules.
pub async fn initialize(
    fetcher: &dyn Fetcher,
    network: &NetworkIdentifier,
    validation_file: Option<&Path>,
    accounting_model: Option<AccountingModel>,
) -> Result<NodeProfile, PreflightError> {
    let rules = validation_file.map(load_validation_rules).transpose()?;
    match (&rules, accounting_model) {
        (Some(rules), _) if !rules.enabled => {
            tracing::info!("Validation file is disabled, ignoring its rules");
        }
        (Some(rules), Some(model)) => {
            if let Some(chain) = rules.conflicting_chain_type(model) {
                tracing::warn!(
                    configured = ?model,
                    validation_file = ?chain,
                    "Validation file chain type differs from configured accounting model"
                );
            }
        }
        _ => {}
    }

    let status = fetcher
        .network_status(network)
        .await
        .map_err(PreflightError::NetworkStatus)?;
    let options = fetcher
        .network_options(network)
        .await
        .map_err(PreflightError::NetworkOptions)?;

    tracing::info!(
        blockchain = %network.blockchain,
        network = %network.network,
        tip = ?status.current_block_identifier.as_ref().map(|b| b.index),
        rosetta_version = ?options.version.as_ref().map(|v| v.rosetta_version.as_str()),
        "Node initialized"
    );

    Ok(NodeProfile { status, rules })
}
