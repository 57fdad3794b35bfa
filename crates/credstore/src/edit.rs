// SPDX-FileCopyrightText: 2026 Credstore Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `credstore upsert` and `credstore delete`.

use std::io::{BufRead, IsTerminal};

use credstore_engine::CredentialsStore;
use secrecy::{ExposeSecret, SecretString};
use zeroize::Zeroizing;

use crate::CliError;

/// Store a value, prompting for it when not given on the command line.
pub fn run_upsert(store: &CredentialsStore, key: &str, value: Option<String>) -> Result<(), CliError> {
    let value = match value {
        Some(value) => SecretString::from(value),
        None => read_value(key)?,
    };
    store.upsert(key, value.expose_secret())?;
    println!("stored `{key}` in {}", store.credentials_file().display());
    Ok(())
}

pub fn run_delete(store: &CredentialsStore, key: &str) -> Result<(), CliError> {
    store.delete(key)?;
    println!("removed `{key}` from {}", store.credentials_file().display());
    Ok(())
}

/// Read a value without echoing it on a terminal, or the first line of
/// stdin when input is piped.
fn read_value(key: &str) -> Result<SecretString, CliError> {
    let stdin = std::io::stdin();
    if stdin.is_terminal() {
        eprint!("Value for `{key}`: ");
        let value = rpassword::read_password()
            .map_err(|e| CliError::Input(format!("failed to read value: {e}")))?;
        non_empty(value)
    } else {
        read_piped(stdin.lock())
    }
}

/// The first line of `reader` without its line ending. The read buffer is
/// wiped on every path out of this function.
fn read_piped(mut reader: impl BufRead) -> Result<SecretString, CliError> {
    let mut line = Zeroizing::new(String::with_capacity(256));
    reader
        .read_line(&mut line)
        .map_err(|e| CliError::Input(format!("failed to read value from stdin: {e}")))?;

    let len = line.trim_end_matches(['\r', '\n']).len();
    line.truncate(len);
    non_empty(std::mem::take(&mut *line))
}

fn non_empty(value: String) -> Result<SecretString, CliError> {
    if value.is_empty() {
        return Err(CliError::Input("empty value not allowed".to_string()));
    }
    Ok(SecretString::from(value))
}
