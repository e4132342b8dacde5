//! Configuration loading from disk.

use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::config::schema::CheckConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Why a configuration could not be loaded.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unable to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("unable to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parse and validate configuration text.
pub fn parse_config(content: &str) -> Result<CheckConfig, ConfigError> {
    let config: CheckConfig = toml::from_str(content)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<CheckConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_missing_file() {
        let err = load_config(Path::new("/nonexistent/check-spec.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_load_from_disk() {
        let path = std::env::temp_dir().join(format!("check-spec-{}.toml", uuid::Uuid::new_v4()));
        fs::write(
            &path,
            "online_url = \"http://127.0.0.1:9000\"\n[network]\nblockchain = \"sweet\"\nnetwork = \"sweeter\"\n",
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        fs::remove_file(&path).unwrap();

        assert_eq!(config.online_url, "http://127.0.0.1:9000");
        assert_eq!(config.network.blockchain, "sweet");
    }

    #[test]
    fn test_invalid_network_rejected() {
        let err = parse_config("[network]\nblockchain = \"?\"\n").unwrap_err();
        match err {
            ConfigError::Validation(errors) => {
                assert_eq!(errors.len(), 1);
                assert_eq!(errors[0].field, "network.network");
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_validation_errors_are_all_reported() {
        let err = parse_config("online_url = \"nope\"\nhttp_timeout_secs = 0\n").unwrap_err();
        let message = err.to_string();
        assert!(message.starts_with("invalid config: online_url"));
        assert!(message.contains("http_timeout_secs: must be greater than 0"));
    }

    #[test]
    fn test_parse_error_display() {
        let err = parse_config("online_url = ").unwrap_err();
        assert!(err.to_string().starts_with("unable to parse config"));
    }
}
