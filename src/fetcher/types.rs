//! Node API data types and request-layer error definitions.
//!
//! Fields the interface marks as required are still modelled as `Option` (or
//! defaulted) so a non-conforming response decodes and its defects can be
//! reported by the checks instead of surfacing as decode failures.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Identifies the blockchain and network under test.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NetworkIdentifier {
    #[serde(default)]
    pub blockchain: String,
    #[serde(default)]
    pub network: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_network_identifier: Option<SubNetworkIdentifier>,
}

impl NetworkIdentifier {
    pub fn new(blockchain: impl Into<String>, network: impl Into<String>) -> Self {
        Self {
            blockchain: blockchain.into(),
            network: network.into(),
            sub_network_identifier: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubNetworkIdentifier {
    #[serde(default)]
    pub network: String,
}

/// Uniquely identifies a block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockIdentifier {
    #[serde(default)]
    pub index: i64,
    #[serde(default)]
    pub hash: String,
}

/// Block query key. Both fields unset means "the current tip".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartialBlockIdentifier {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
}

impl PartialBlockIdentifier {
    pub fn at_index(index: i64) -> Self {
        Self { index: Some(index), hash: None }
    }

    pub fn with_hash(hash: impl Into<String>) -> Self {
        Self { index: None, hash: Some(hash.into()) }
    }

    /// True when neither index nor hash is set.
    pub fn is_tip(&self) -> bool {
        self.index.is_none() && self.hash.is_none()
    }
}

impl std::fmt::Display for PartialBlockIdentifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (&self.index, &self.hash) {
            (Some(i), Some(h)) => write!(f, "index {} hash {}", i, h),
            (Some(i), None) => write!(f, "index {}", i),
            (None, Some(h)) => write!(f, "hash {}", h),
            (None, None) => write!(f, "tip"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransactionIdentifier {
    #[serde(default)]
    pub hash: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OperationIdentifier {
    #[serde(default)]
    pub index: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network_index: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccountIdentifier {
    #[serde(default)]
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_account: Option<SubAccountIdentifier>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

impl AccountIdentifier {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            sub_account: None,
            metadata: None,
        }
    }
}

impl std::fmt::Display for AccountIdentifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.sub_account {
            Some(sub) => write!(f, "{}:{}", self.address, sub.address),
            None => write!(f, "{}", self.address),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubAccountIdentifier {
    #[serde(default)]
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Currency {
    #[serde(default)]
    pub symbol: String,
    #[serde(default)]
    pub decimals: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

impl Currency {
    pub fn new(symbol: impl Into<String>, decimals: i32) -> Self {
        Self {
            symbol: symbol.into(),
            decimals,
            metadata: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Amount {
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub currency: Option<Currency>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CoinIdentifier {
    #[serde(default)]
    pub identifier: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CoinChange {
    pub coin_identifier: CoinIdentifier,
    #[serde(default)]
    pub coin_action: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Coin {
    #[serde(default)]
    pub coin_identifier: Option<CoinIdentifier>,
    #[serde(default)]
    pub amount: Option<Amount>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    #[serde(default)]
    pub operation_identifier: OperationIdentifier,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_operations: Option<Vec<OperationIdentifier>>,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account: Option<AccountIdentifier>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<Amount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coin_change: Option<CoinChange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    #[serde(default)]
    pub transaction_identifier: TransactionIdentifier,
    #[serde(default)]
    pub operations: Vec<Operation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Block {
    #[serde(default)]
    pub block_identifier: BlockIdentifier,
    #[serde(default)]
    pub parent_block_identifier: BlockIdentifier,
    #[serde(default)]
    pub timestamp: i64,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Version {
    #[serde(default)]
    pub rosetta_version: String,
    #[serde(default)]
    pub node_version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub middleware_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OperationStatus {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub successful: bool,
}

/// Error object returned by the node, either in `/network/options` or as the
/// body of a failed request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiError {
    #[serde(default)]
    pub code: Option<i64>,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub retriable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.code {
            Some(code) => write!(f, "code {}: {}", code, self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BalanceExemption {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_account_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<Currency>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exemption_type: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Allow {
    #[serde(default)]
    pub operation_statuses: Vec<OperationStatus>,
    #[serde(default)]
    pub operation_types: Vec<String>,
    #[serde(default)]
    pub errors: Vec<ApiError>,
    #[serde(default)]
    pub historical_balance_lookup: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp_start_index: Option<i64>,
    #[serde(default)]
    pub call_methods: Vec<String>,
    #[serde(default)]
    pub balance_exemptions: Vec<BalanceExemption>,
    #[serde(default)]
    pub mempool_coins: bool,
}

// Requests

fn no_currencies(currencies: &&[Currency]) -> bool {
    currencies.is_empty()
}

#[derive(Debug, Clone, Serialize)]
pub struct MetadataRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NetworkRequest<'a> {
    pub network_identifier: &'a NetworkIdentifier,
}

#[derive(Debug, Clone, Serialize)]
pub struct AccountBalanceRequest<'a> {
    pub network_identifier: &'a NetworkIdentifier,
    pub account_identifier: &'a AccountIdentifier,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_identifier: Option<&'a PartialBlockIdentifier>,
    #[serde(skip_serializing_if = "no_currencies")]
    pub currencies: &'a [Currency],
}

#[derive(Debug, Clone, Serialize)]
pub struct AccountCoinsRequest<'a> {
    pub network_identifier: &'a NetworkIdentifier,
    pub account_identifier: &'a AccountIdentifier,
    pub include_mempool: bool,
    #[serde(skip_serializing_if = "no_currencies")]
    pub currencies: &'a [Currency],
}

#[derive(Debug, Clone, Serialize)]
pub struct BlockRequest<'a> {
    pub network_identifier: &'a NetworkIdentifier,
    pub block_identifier: &'a PartialBlockIdentifier,
}

#[derive(Debug, Clone, Serialize)]
pub struct BlockTransactionRequest<'a> {
    pub network_identifier: &'a NetworkIdentifier,
    pub block_identifier: &'a BlockIdentifier,
    pub transaction_identifier: &'a TransactionIdentifier,
}

// Responses

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NetworkListResponse {
    #[serde(default)]
    pub network_identifiers: Vec<NetworkIdentifier>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NetworkStatusResponse {
    #[serde(default)]
    pub current_block_identifier: Option<BlockIdentifier>,
    #[serde(default)]
    pub current_block_timestamp: Option<i64>,
    #[serde(default)]
    pub genesis_block_identifier: Option<BlockIdentifier>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oldest_block_identifier: Option<BlockIdentifier>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sync_status: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub peers: Option<Vec<Value>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NetworkOptionsResponse {
    #[serde(default)]
    pub version: Option<Version>,
    #[serde(default)]
    pub allow: Option<Allow>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccountBalanceResponse {
    #[serde(default)]
    pub block_identifier: Option<BlockIdentifier>,
    #[serde(default)]
    pub balances: Vec<Amount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccountCoinsResponse {
    #[serde(default)]
    pub block_identifier: Option<BlockIdentifier>,
    #[serde(default)]
    pub coins: Vec<Coin>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BlockResponse {
    #[serde(default)]
    pub block: Option<Block>,
    #[serde(default)]
    pub other_transactions: Vec<TransactionIdentifier>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BlockTransactionResponse {
    pub transaction: Transaction,
}

/// Errors returned by the request layer.
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    /// Connection failed or the request could not be sent.
    #[error("transport error: {0}")]
    Transport(String),

    /// No response within the per-request timeout.
    #[error("request timed out")]
    Timeout,

    /// The node answered with an error object.
    #[error("node returned HTTP {status} with error {error}")]
    Api { status: u16, error: ApiError },

    /// Non-success status without a decodable error object.
    #[error("node returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// Response body did not match the expected shape.
    #[error("unable to decode response: {0}")]
    Decode(String),

    /// Base URL or endpoint path is not a valid URL.
    #[error("invalid URL: {0}")]
    Url(String),
}

impl FetchError {
    /// The error object the node returned, if any.
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            FetchError::Api { error, .. } => Some(error),
            _ => None,
        }
    }

    /// Whether a retry may succeed without the request changing.
    pub fn is_retriable(&self) -> bool {
        match self {
            FetchError::Transport(_) | FetchError::Timeout => true,
            FetchError::Api { error, .. } => error.retriable,
            FetchError::Status { status, .. } => *status >= 500 || *status == 429,
            FetchError::Decode(_) | FetchError::Url(_) => false,
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            FetchError::Timeout
        } else if e.is_decode() {
            FetchError::Decode(e.to_string())
        } else {
            FetchError::Transport(e.to_string())
        }
    }
}

/// Result type for request-layer operations.
pub type FetchResult<T> = Result<T, FetchError>;
