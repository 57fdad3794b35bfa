// SPDX-FileCopyrightText: 2026 Credstore Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! credstore - manage an encrypted credentials file and its master key.
//!
//! This is the binary entry point.

mod edit;
mod lifecycle;
mod show;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use credstore_config::{CredstoreConfig, StoreConfig};
use credstore_core::CredentialsError;
use credstore_engine::CredentialsStore;
use thiserror::Error;

/// credstore - encrypted credentials for a project.
#[derive(Parser, Debug)]
#[command(name = "credstore", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the standard locations.
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Directory that relative store paths are resolved against.
    #[arg(long, global = true, value_name = "DIR")]
    project_dir: Option<PathBuf>,

    /// Encrypted credentials file (overrides configuration).
    #[arg(long, global = true, value_name = "FILE")]
    credentials_file: Option<PathBuf>,

    /// Master key file (overrides configuration).
    #[arg(long, global = true, value_name = "FILE")]
    master_key_file: Option<PathBuf>,

    /// Log level (overrides configuration).
    #[arg(long, global = true, value_parser = ["trace", "debug", "info", "warn", "error"])]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the decrypted credentials document.
    Show {
        /// Mask every value.
        #[arg(long)]
        redact: bool,
    },
    /// Print the value stored under a dotted key.
    Get {
        /// Dotted key, e.g. `database.password`.
        key: String,
        /// Print this instead of failing when the value is unavailable.
        #[arg(long)]
        default: Option<String>,
    },
    /// Add or replace a value.
    Upsert {
        /// Dotted key, e.g. `database.password`.
        #[arg(long)]
        key: String,
        /// The value. Prompted for (or read from stdin) when omitted.
        #[arg(long)]
        value: Option<String>,
    },
    /// Remove a value.
    Delete {
        /// Dotted key, e.g. `database.password`.
        #[arg(long)]
        key: String,
    },
    /// Create a new master key and an empty credentials file.
    Generate,
    /// Replace the master key and re-encrypt the credentials.
    Rekey,
}

/// Failures surfaced by the command line front end.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Store(#[from] CredentialsError),

    /// The value to store could not be obtained.
    #[error("{0}")]
    Input(String),
}

fn main() {
    let cli = Cli::parse();

    let config = match credstore_config::load_and_validate(cli.config.as_deref()) {
        Ok(config) => config,
        Err(errors) => {
            credstore_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    let log_level = cli
        .log_level
        .clone()
        .unwrap_or_else(|| config.logging.level.to_ascii_lowercase());
    init_tracing(&log_level);

    let store = match resolve_store(&cli, &config) {
        Ok(store) => store,
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Commands::Show { redact } => show::run_show(&store, redact),
        Commands::Get { key, default } => show::run_get(&store, &key, default.as_deref()),
        Commands::Upsert { key, value } => edit::run_upsert(&store, &key, value),
        Commands::Delete { key } => edit::run_delete(&store, &key),
        Commands::Generate => lifecycle::run_generate(&store),
        Commands::Rekey => lifecycle::run_rekey(&store),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

/// Pick the file pair: command line flags win over configuration, and
/// relative paths are joined to the project directory.
fn resolve_store(cli: &Cli, config: &CredstoreConfig) -> Result<CredentialsStore, CliError> {
    let project_dir = match &cli.project_dir {
        Some(dir) => dir.clone(),
        None => std::env::current_dir()
            .map_err(|e| CredentialsError::io(".", e))?,
    };

    let paths = StoreConfig {
        credentials_file: cli
            .credentials_file
            .clone()
            .unwrap_or_else(|| config.store.credentials_file.clone()),
        master_key_file: cli
            .master_key_file
            .clone()
            .unwrap_or_else(|| config.store.master_key_file.clone()),
    };
    Ok(CredentialsStore::from_config(&paths, &project_dir))
}

/// Log to stderr so stdout carries only command output.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("credstore={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_names(false)
        .init();
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn flags_override_configuration() {
        let cli = Cli::parse_from([
            "credstore",
            "--project-dir",
            "/project",
            "--master-key-file",
            "/keys/master.key",
            "show",
        ]);
        let store = resolve_store(&cli, &CredstoreConfig::default()).unwrap();
        assert_eq!(
            store.credentials_file(),
            Path::new("/project/resources/credentials.conf.enc")
        );
        assert_eq!(store.master_key_file(), Path::new("/keys/master.key"));
    }

    #[test]
    fn global_flags_accepted_after_subcommand() {
        let cli = Cli::parse_from(["credstore", "get", "a.b", "--log-level", "debug"]);
        assert_eq!(cli.log_level.as_deref(), Some("debug"));
        assert!(matches!(cli.command, Commands::Get { ref key, .. } if key == "a.b"));
    }

    #[test]
    fn unknown_log_level_is_rejected() {
        assert!(Cli::try_parse_from(["credstore", "--log-level", "loud", "show"]).is_err());
    }
}
