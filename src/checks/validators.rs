//! Field validators.
//!
//! Pure functions over one response field each. A validator never mutates
//! its input and reports the first defect it finds; the calling check maps
//! that defect onto exactly one requirement.

use std::collections::HashSet;
use thiserror::Error;

use crate::fetcher::types::{
    AccountIdentifier, Allow, Amount, ApiError, BalanceExemption, BlockIdentifier, Coin,
    NetworkIdentifier, OperationStatus, Version,
};

/// Earliest accepted block timestamp (year 2000), in milliseconds.
pub const MIN_UNIX_EPOCH_MS: i64 = 946_713_600_000;

/// Latest accepted block timestamp (year 2040), in milliseconds.
pub const MAX_UNIX_EPOCH_MS: i64 = 2_209_017_600_000;

const EXEMPTION_TYPES: [&str; 3] = ["greater_or_equal", "less_or_equal", "dynamic"];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("{0} is missing")]
    Missing(&'static str),

    #[error("{0} is empty")]
    Empty(&'static str),

    #[error("block identifier hash is empty")]
    EmptyBlockHash,

    #[error("block identifier index {0} is negative")]
    NegativeBlockIndex(i64),

    #[error("timestamp {0} is outside [{min}, {max}]", min = MIN_UNIX_EPOCH_MS, max = MAX_UNIX_EPOCH_MS)]
    TimestampOutOfRange(i64),

    #[error("{kind} '{value}' is duplicated")]
    Duplicate { kind: &'static str, value: String },

    #[error("error code {0} is negative")]
    NegativeErrorCode(i64),

    #[error("error code is missing")]
    MissingErrorCode,

    #[error("error message is empty")]
    EmptyErrorMessage,

    #[error("amount value '{0}' is not an integer")]
    InvalidAmountValue(String),

    #[error("currency decimals {0} is negative")]
    NegativeDecimals(i32),

    #[error("balance exemption has neither currency nor sub account address")]
    UnscopedExemption,

    #[error("balance exemption type '{0}' is not supported")]
    InvalidExemptionType(String),
}

pub type FieldResult = Result<(), FieldError>;

pub fn validate_version(version: &str) -> FieldResult {
    if version.is_empty() {
        return Err(FieldError::Empty("version"));
    }
    Ok(())
}

/// Both the API version and the node version must be set.
pub fn validate_versions(version: Option<&Version>) -> FieldResult {
    let version = version.ok_or(FieldError::Missing("version"))?;
    validate_version(&version.rosetta_version)?;
    validate_version(&version.node_version)
}

pub fn validate_block_identifier(block: Option<&BlockIdentifier>) -> FieldResult {
    let block = block.ok_or(FieldError::Missing("block identifier"))?;
    if block.hash.is_empty() {
        return Err(FieldError::EmptyBlockHash);
    }
    if block.index < 0 {
        return Err(FieldError::NegativeBlockIndex(block.index));
    }
    Ok(())
}

pub fn validate_network_identifier(network: &NetworkIdentifier) -> FieldResult {
    if network.blockchain.is_empty() {
        return Err(FieldError::Empty("network identifier blockchain"));
    }
    if network.network.is_empty() {
        return Err(FieldError::Empty("network identifier network"));
    }
    if let Some(sub) = &network.sub_network_identifier {
        if sub.network.is_empty() {
            return Err(FieldError::Empty("sub network identifier network"));
        }
    }
    Ok(())
}

pub fn validate_account_identifier(account: Option<&AccountIdentifier>) -> FieldResult {
    let account = account.ok_or(FieldError::Missing("account identifier"))?;
    if account.address.is_empty() {
        return Err(FieldError::Empty("account identifier address"));
    }
    if let Some(sub) = &account.sub_account {
        if sub.address.is_empty() {
            return Err(FieldError::Empty("sub account address"));
        }
    }
    Ok(())
}

/// Milliseconds since the Unix epoch, within the accepted range.
pub fn validate_timestamp(timestamp: Option<i64>) -> FieldResult {
    let timestamp = timestamp.ok_or(FieldError::Missing("timestamp"))?;
    if !(MIN_UNIX_EPOCH_MS..=MAX_UNIX_EPOCH_MS).contains(&timestamp) {
        return Err(FieldError::TimestampOutOfRange(timestamp));
    }
    Ok(())
}

pub fn validate_amount(amount: Option<&Amount>) -> FieldResult {
    let amount = amount.ok_or(FieldError::Missing("amount"))?;
    if !is_integer(&amount.value) {
        return Err(FieldError::InvalidAmountValue(amount.value.clone()));
    }
    let currency = amount.currency.as_ref().ok_or(FieldError::Missing("currency"))?;
    if currency.symbol.is_empty() {
        return Err(FieldError::Empty("currency symbol"));
    }
    if currency.decimals < 0 {
        return Err(FieldError::NegativeDecimals(currency.decimals));
    }
    Ok(())
}

/// At least one balance, each valid, no currency reported twice.
pub fn validate_balances(balances: &[Amount]) -> FieldResult {
    if balances.is_empty() {
        return Err(FieldError::Empty("balances"));
    }
    let mut seen = HashSet::new();
    for balance in balances {
        validate_amount(Some(balance))?;
        if let Some(currency) = &balance.currency {
            if !seen.insert((currency.symbol.as_str(), currency.decimals)) {
                return Err(FieldError::Duplicate {
                    kind: "balance currency",
                    value: currency.symbol.clone(),
                });
            }
        }
    }
    Ok(())
}

pub fn validate_coins(coins: &[Coin]) -> FieldResult {
    let mut seen = HashSet::new();
    for coin in coins {
        let identifier = coin
            .coin_identifier
            .as_ref()
            .ok_or(FieldError::Missing("coin identifier"))?;
        if identifier.identifier.is_empty() {
            return Err(FieldError::Empty("coin identifier"));
        }
        if !seen.insert(identifier.identifier.as_str()) {
            return Err(FieldError::Duplicate {
                kind: "coin identifier",
                value: identifier.identifier.clone(),
            });
        }
        validate_amount(coin.amount.as_ref())?;
    }
    Ok(())
}

pub fn validate_operation_statuses(statuses: &[OperationStatus]) -> FieldResult {
    if statuses.is_empty() {
        return Err(FieldError::Empty("operation statuses"));
    }
    unique_non_empty(statuses.iter().map(|s| s.status.as_str()), "operation status")
}

pub fn validate_operation_types(types: &[String]) -> FieldResult {
    if types.is_empty() {
        return Err(FieldError::Empty("operation types"));
    }
    unique_non_empty(types.iter().map(String::as_str), "operation type")
}

pub fn validate_call_methods(methods: &[String]) -> FieldResult {
    unique_non_empty(methods.iter().map(String::as_str), "call method")
}

/// Every error in the catalog has a distinct code and a message.
pub fn validate_errors(errors: &[ApiError]) -> FieldResult {
    let mut seen = HashSet::new();
    for error in errors {
        validate_error_code(error)?;
        validate_error_message(error)?;
        if let Some(code) = error.code {
            if !seen.insert(code) {
                return Err(FieldError::Duplicate {
                    kind: "error code",
                    value: code.to_string(),
                });
            }
        }
    }
    Ok(())
}

pub fn validate_balance_exemptions(exemptions: &[BalanceExemption]) -> FieldResult {
    for exemption in exemptions {
        if exemption.currency.is_none() && exemption.sub_account_address.is_none() {
            return Err(FieldError::UnscopedExemption);
        }
        let kind = exemption
            .exemption_type
            .as_deref()
            .ok_or(FieldError::Missing("balance exemption type"))?;
        if !EXEMPTION_TYPES.contains(&kind) {
            return Err(FieldError::InvalidExemptionType(kind.to_string()));
        }
    }
    Ok(())
}

/// Run every catalog validator over the allow object.
pub fn validate_allow(allow: Option<&Allow>) -> Result<(), Vec<FieldError>> {
    let Some(allow) = allow else {
        return Err(vec![FieldError::Missing("allow")]);
    };

    let errors: Vec<FieldError> = [
        validate_operation_statuses(&allow.operation_statuses),
        validate_operation_types(&allow.operation_types),
        validate_errors(&allow.errors),
        validate_call_methods(&allow.call_methods),
        validate_balance_exemptions(&allow.balance_exemptions),
    ]
    .into_iter()
    .filter_map(Result::err)
    .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

pub fn validate_error_code(error: &ApiError) -> FieldResult {
    match error.code {
        None => Err(FieldError::MissingErrorCode),
        Some(code) if code < 0 => Err(FieldError::NegativeErrorCode(code)),
        Some(_) => Ok(()),
    }
}

pub fn validate_error_message(error: &ApiError) -> FieldResult {
    if error.message.is_empty() {
        return Err(FieldError::EmptyErrorMessage);
    }
    Ok(())
}

fn unique_non_empty<'a>(values: impl Iterator<Item = &'a str>, kind: &'static str) -> FieldResult {
    let mut seen = HashSet::new();
    for value in values {
        if value.is_empty() {
            return Err(FieldError::Empty(kind));
        }
        if !seen.insert(value) {
            return Err(FieldError::Duplicate {
                kind,
                value: value.to_string(),
            });
        }
    }
    Ok(())
}

fn is_integer(value: &str) -> bool {
    let digits = value.strip_prefix('-').unwrap_or(value);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}
