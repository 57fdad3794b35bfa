// SPDX-FileCopyrightText: 2026 Credstore Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration for the credstore credentials store.
//!
//! Provides TOML configuration parsing with strict validation (`deny_unknown_fields`),
//! XDG file hierarchy lookup, `CREDSTORE_` environment overrides, and miette
//! diagnostics with typo suggestions.
//!
//! # Usage
//!
//! ```no_run
//! use credstore_config::load_and_validate;
//!
//! let config = load_and_validate(None).expect("config errors");
//! println!("key file: {}", config.store.master_key_file.display());
//! ```

pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod validation;

use std::path::Path;

pub use diagnostic::{render_errors, ConfigError};
pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::{CredstoreConfig, LoggingConfig, StoreConfig};

/// Load configuration and validate it.
///
/// With `explicit = Some(path)` only that file (plus env overrides) is read;
/// otherwise the standard hierarchy is used. Figment failures are converted
/// into diagnostics carrying source spans where possible.
pub fn load_and_validate(explicit: Option<&Path>) -> Result<CredstoreConfig, Vec<ConfigError>> {
    let loaded = match explicit {
        Some(path) => loader::load_config_from_path(path),
        None => loader::load_config(),
    };

    match loaded {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => {
            let sources = match explicit {
                Some(path) => read_sources([path.to_path_buf()]),
                None => read_sources(loader::config_file_hierarchy()),
            };
            Err(diagnostic::figment_to_config_errors(err, &sources))
        }
    }
}

/// Load configuration from a TOML string and validate it.
pub fn load_and_validate_str(toml_content: &str) -> Result<CredstoreConfig, Vec<ConfigError>> {
    match loader::load_config_from_str(toml_content) {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => {
            let sources = vec![("<inline>".to_string(), toml_content.to_string())];
            Err(diagnostic::figment_to_config_errors(err, &sources))
        }
    }
}

/// Read the contents of whichever candidate files exist, keyed by the same
/// absolute path Figment records as the error source.
fn read_sources(paths: impl IntoIterator<Item = std::path::PathBuf>) -> Vec<(String, String)> {
    paths
        .into_iter()
        .filter_map(|path| {
            let content = std::fs::read_to_string(&path).ok()?;
            let absolute = std::path::absolute(&path).unwrap_or(path);
            Some((absolute.display().to_string(), content))
        })
        .collect()
}
