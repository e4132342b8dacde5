//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for a check run.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::fetcher::types::{Currency, NetworkIdentifier};

/// Root configuration for a conformance run.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CheckConfig {
    /// Network under test.
    pub network: NetworkIdentifier,

    /// Base URL of the node's online data API.
    pub online_url: String,

    /// Maximum concurrent requests against the online endpoint.
    pub max_online_connections: usize,

    /// Per-request timeout in seconds.
    pub http_timeout_secs: u64,

    /// Retries allowed after the first attempt.
    pub max_retries: u32,

    /// Total time budget for retrying one request, in seconds.
    pub retry_elapsed_time_secs: u64,

    /// Retry even errors the node marks as non-retriable.
    pub force_retry: bool,

    /// Optional JSON file with response validation settings.
    pub validation_file: Option<String>,

    /// Construction (offline) endpoint settings. Required for checking.
    pub construction: Option<ConstructionConfig>,

    /// Account discovery limits.
    pub discovery: DiscoveryConfig,

    /// Logging settings.
    pub observability: ObservabilityConfig,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            network: NetworkIdentifier::new("Ethereum", "Ropsten"),
            online_url: "http://localhost:8080".to_string(),
            max_online_connections: 120,
            http_timeout_secs: 10,
            max_retries: 5,
            retry_elapsed_time_secs: 60,
            force_retry: false,
            validation_file: None,
            construction: None,
            discovery: DiscoveryConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

impl CheckConfig {
    /// Whether the chain tracks value as unspent outputs.
    pub fn is_utxo(&self) -> bool {
        self.construction
            .as_ref()
            .is_some_and(|c| c.accounting_model == AccountingModel::Utxo)
    }
}

/// Construction API configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ConstructionConfig {
    /// Base URL of the offline construction endpoint.
    pub offline_url: String,

    /// Maximum concurrent requests against the offline endpoint.
    pub max_offline_connections: usize,

    /// Native currency of the network.
    pub currency: Currency,

    /// Signature curve used by accounts on the network.
    pub curve_type: CurveType,

    /// Account or UTXO based ledger.
    pub accounting_model: AccountingModel,

    /// Smallest balance an account may hold (integer string).
    pub minimum_balance: String,

    /// Largest fee a transfer may pay (integer string).
    pub maximum_fee: String,
}

impl Default for ConstructionConfig {
    fn default() -> Self {
        Self {
            offline_url: "http://localhost:8080".to_string(),
            max_offline_connections: 4,
            currency: Currency::new("ETH", 18),
            curve_type: CurveType::Secp256k1,
            accounting_model: AccountingModel::Account,
            minimum_balance: "0".to_string(),
            maximum_fee: "10000000000000000".to_string(),
        }
    }
}

/// Supported signature curves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CurveType {
    Secp256k1,
    Secp256k1Bip340,
    Secp256r1,
    Edwards25519,
    Tweedle,
    Pallas,
}

/// Ledger accounting model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountingModel {
    Account,
    Utxo,
}

/// Account discovery configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Maximum blocks read while searching for an account (0 = no limit).
    pub max_blocks_scanned: u64,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            max_blocks_scanned: 1000,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Output format for log lines.
    pub log_format: LogFormat,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Pretty,
    Json,
}
