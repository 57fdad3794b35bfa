// SPDX-FileCopyrightText: 2026 Credstore Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs.
//!
//! All structs use `#[serde(deny_unknown_fields)]` so a misspelled key is
//! reported instead of silently falling back to a default path.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Default location of the encrypted credentials file, relative to the project.
pub const DEFAULT_CREDENTIALS_FILE: &str = "resources/credentials.conf.enc";

/// Default location of the master key file, relative to the project.
pub const DEFAULT_MASTER_KEY_FILE: &str = "resources/master.key";

/// Top-level credstore configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CredstoreConfig {
    /// Locations of the credentials file and master key file.
    #[serde(default)]
    pub store: StoreConfig,

    /// Log output settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// The file pair a credentials store operates on.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StoreConfig {
    /// Encrypted credentials file.
    #[serde(default = "default_credentials_file")]
    pub credentials_file: PathBuf,

    /// Master key file.
    #[serde(default = "default_master_key_file")]
    pub master_key_file: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            credentials_file: default_credentials_file(),
            master_key_file: default_master_key_file(),
        }
    }
}

impl StoreConfig {
    /// Resolve relative paths against `project_dir`. Absolute paths are kept.
    pub fn resolve(&self, project_dir: &Path) -> StoreConfig {
        StoreConfig {
            credentials_file: project_dir.join(&self.credentials_file),
            master_key_file: project_dir.join(&self.master_key_file),
        }
    }
}

fn default_credentials_file() -> PathBuf {
    PathBuf::from(DEFAULT_CREDENTIALS_FILE)
}

fn default_master_key_file() -> PathBuf {
    PathBuf::from(DEFAULT_MASTER_KEY_FILE)
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_resources_dir() {
        let config = CredstoreConfig::default();
        assert_eq!(
            config.store.credentials_file,
            PathBuf::from("resources/credentials.conf.enc")
        );
        assert_eq!(config.store.master_key_file, PathBuf::from("resources/master.key"));
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn resolve_joins_relative_paths() {
        let store = StoreConfig::default().resolve(Path::new("/work/project"));
        assert_eq!(
            store.credentials_file,
            PathBuf::from("/work/project/resources/credentials.conf.enc")
        );
        assert_eq!(
            store.master_key_file,
            PathBuf::from("/work/project/resources/master.key")
        );
    }

    #[test]
    fn resolve_keeps_absolute_paths() {
        let store = StoreConfig {
            credentials_file: PathBuf::from("/etc/app/creds.enc"),
            master_key_file: PathBuf::from("keys/master.key"),
        }
        .resolve(Path::new("/work"));
        assert_eq!(store.credentials_file, PathBuf::from("/etc/app/creds.enc"));
        assert_eq!(store.master_key_file, PathBuf::from("/work/keys/master.key"));
    }
}
