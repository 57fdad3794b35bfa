// SPDX-FileCopyrightText: 2026 Credstore Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `credstore show` and `credstore get`.

use credstore_engine::CredentialsStore;

use crate::CliError;

/// Print the whole document as TOML, optionally with every value masked.
pub fn run_show(store: &CredentialsStore, redact: bool) -> Result<(), CliError> {
    let tree = store.load()?;
    if tree.is_empty() {
        eprintln!("no credentials stored in {}", store.credentials_file().display());
        return Ok(());
    }

    let tree = if redact { tree.redacted() } else { tree };
    print!("{}", tree.to_toml()?);
    Ok(())
}

/// Print one value.
///
/// Without `default`, a missing file or key is an error. With it, those cases
/// print the default and log a warning naming what was missing. Decryption
/// and parse failures are errors either way.
pub fn run_get(store: &CredentialsStore, key: &str, default: Option<&str>) -> Result<(), CliError> {
    let value = match default {
        None => store.get_string(key)?,
        Some(default) => store.lookup(key)?.or_default_logged(key, default),
    };
    println!("{value}");
    Ok(())
}
