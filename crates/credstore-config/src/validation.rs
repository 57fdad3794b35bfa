// SPDX-FileCopyrightText: 2026 Credstore Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.

use crate::diagnostic::ConfigError;
use crate::model::CredstoreConfig;

/// Log levels accepted in `logging.level`.
pub const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration.
///
/// Collects every problem instead of stopping at the first one.
pub fn validate_config(config: &CredstoreConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    let creds = &config.store.credentials_file;
    let key = &config.store.master_key_file;

    if creds.as_os_str().is_empty() {
        errors.push(ConfigError::Validation {
            message: "store.credentials_file must not be empty".to_string(),
        });
    }

    if key.as_os_str().is_empty() {
        errors.push(ConfigError::Validation {
            message: "store.master_key_file must not be empty".to_string(),
        });
    }

    if !creds.as_os_str().is_empty() && creds == key {
        errors.push(ConfigError::Validation {
            message: format!(
                "store.credentials_file and store.master_key_file both point at `{}`",
                creds.display()
            ),
        });
    }

    let level = config.logging.level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "logging.level `{}` is not one of {}",
                config.logging.level,
                LOG_LEVELS.join(", ")
            ),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(validate_config(&CredstoreConfig::default()).is_ok());
    }

    #[test]
    fn identical_paths_are_rejected() {
        let mut config = CredstoreConfig::default();
        config.store.master_key_file = config.store.credentials_file.clone();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].to_string().contains("both point at"));
    }

    #[test]
    fn all_problems_are_collected() {
        let mut config = CredstoreConfig::default();
        config.store.credentials_file = PathBuf::new();
        config.store.master_key_file = PathBuf::new();
        config.logging.level = "loud".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn log_level_is_case_insensitive() {
        let mut config = CredstoreConfig::default();
        config.logging.level = "DEBUG".to_string();
        assert!(validate_config(&config).is_ok());
    }
}
