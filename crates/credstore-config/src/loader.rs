// SPDX-FileCopyrightText: 2026 Credstore Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Lookup order: `./credstore.toml` > `~/.config/credstore/credstore.toml` >
//! `/etc/credstore/credstore.toml`, with `CREDSTORE_` environment overrides on top.

#![allow(clippy::result_large_err)] // figment::Error is external

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::CredstoreConfig;

/// Name of the configuration file looked up in each directory.
pub const CONFIG_FILE_NAME: &str = "credstore.toml";

/// Prefix for environment variable overrides.
pub const ENV_PREFIX: &str = "CREDSTORE_";

/// System-wide configuration file.
pub fn system_config_path() -> PathBuf {
    PathBuf::from("/etc/credstore").join(CONFIG_FILE_NAME)
}

/// Per-user configuration file under the XDG config directory, if one exists.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("credstore").join(CONFIG_FILE_NAME))
}

/// Candidate configuration files, lowest precedence first.
pub fn config_file_hierarchy() -> Vec<PathBuf> {
    let mut files = vec![system_config_path()];
    if let Some(user) = user_config_path() {
        files.push(user);
    }
    files.push(PathBuf::from(CONFIG_FILE_NAME));
    files
}

/// Load configuration from the standard hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/credstore/credstore.toml`
/// 3. `~/.config/credstore/credstore.toml`
/// 4. `./credstore.toml`
/// 5. `CREDSTORE_*` environment variables
pub fn load_config() -> Result<CredstoreConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from one explicit file plus env var overrides.
///
/// The hierarchy is not consulted. A missing file is an error here, since the
/// caller named it explicitly.
pub fn load_config_from_path(path: &Path) -> Result<CredstoreConfig, figment::Error> {
    if !path.is_file() {
        return Err(format!("configuration file not found: {}", path.display()).into());
    }

    Figment::new()
        .merge(Serialized::defaults(CredstoreConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only (no files, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<CredstoreConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(CredstoreConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Build the Figment used for hierarchical loading (exposed for diagnostics).
pub fn build_figment() -> Figment {
    let mut figment = Figment::new().merge(Serialized::defaults(CredstoreConfig::default()));
    for file in config_file_hierarchy() {
        figment = figment.merge(Toml::file(file));
    }
    figment.merge(env_provider())
}

/// Environment provider with an explicit section mapping.
///
/// `CREDSTORE_STORE_MASTER_KEY_FILE` must land on `store.master_key_file`, so
/// only the section prefix is turned into a dot; `Env::split("_")` would
/// produce `store.master.key.file`.
fn env_provider() -> Env {
    Env::prefixed(ENV_PREFIX).map(|key| {
        key.as_str()
            .to_ascii_lowercase()
            .replacen("store_", "store.", 1)
            .replacen("logging_", "logging.", 1)
            .into()
    })
}
