//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check the network identifier and currency are usable
//! - Validate value ranges (connection limits and timeouts > 0, URLs parse)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: CheckConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use crate::config::schema::CheckConfig;

/// A single semantic problem with the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a parsed configuration, collecting every error.
pub fn validate_config(config: &CheckConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.network.blockchain.is_empty() {
        errors.push(ValidationError::new("network.blockchain", "must not be empty"));
    }
    if config.network.network.is_empty() {
        errors.push(ValidationError::new("network.network", "must not be empty"));
    }

    check_url("online_url", &config.online_url, &mut errors);

    if config.max_online_connections == 0 {
        errors.push(ValidationError::new("max_online_connections", "must be greater than 0"));
    }
    if config.http_timeout_secs == 0 {
        errors.push(ValidationError::new("http_timeout_secs", "must be greater than 0"));
    }

    if let Some(construction) = &config.construction {
        check_url("construction.offline_url", &construction.offline_url, &mut errors);

        if construction.max_offline_connections == 0 {
            errors.push(ValidationError::new(
                "construction.max_offline_connections",
                "must be greater than 0",
            ));
        }
        if construction.currency.symbol.is_empty() {
            errors.push(ValidationError::new("construction.currency.symbol", "must not be empty"));
        }
        if construction.currency.decimals < 0 {
            errors.push(ValidationError::new("construction.currency.decimals", "must not be negative"));
        }
        if !is_non_negative_integer(&construction.minimum_balance) {
            errors.push(ValidationError::new(
                "construction.minimum_balance",
                format!("'{}' is not a non-negative integer", construction.minimum_balance),
            ));
        }
        if !is_non_negative_integer(&construction.maximum_fee) {
            errors.push(ValidationError::new(
                "construction.maximum_fee",
                format!("'{}' is not a non-negative integer", construction.maximum_fee),
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_url(field: &'static str, value: &str, errors: &mut Vec<ValidationError>) {
    if let Err(e) = url::Url::parse(value) {
        errors.push(ValidationError::new(field, format!("invalid URL '{}': {}", value, e)));
    }
}

fn is_non_negative_integer(value: &str) -> bool {
    !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::ConstructionConfig;

    fn valid_config() -> CheckConfig {
        CheckConfig {
            construction: Some(ConstructionConfig::default()),
            ..CheckConfig::default()
        }
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&valid_config()).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = valid_config();
        config.network.network.clear();
        config.online_url = "not a url".to_string();
        config.http_timeout_secs = 0;
        let construction = config.construction.as_mut().unwrap();
        construction.currency.symbol.clear();
        construction.minimum_balance = "-1000".to_string();
        construction.maximum_fee = "hello".to_string();

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert_eq!(
            fields,
            vec![
                "network.network",
                "online_url",
                "http_timeout_secs",
                "construction.currency.symbol",
                "construction.minimum_balance",
                "construction.maximum_fee",
            ]
        );
    }

    #[test]
    fn test_missing_construction_is_not_a_config_error() {
        assert!(validate_config(&CheckConfig::default()).is_ok());
    }
}
