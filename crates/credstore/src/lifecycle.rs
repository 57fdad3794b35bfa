// SPDX-FileCopyrightText: 2026 Credstore Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `credstore generate` and `credstore rekey`.

use credstore_engine::CredentialsStore;

use crate::CliError;

pub fn run_generate(store: &CredentialsStore) -> Result<(), CliError> {
    store.generate()?;
    println!("created master key     {}", store.master_key_file().display());
    println!("created credentials    {}", store.credentials_file().display());
    println!();
    println!("Keep the master key out of version control.");
    Ok(())
}

pub fn run_rekey(store: &CredentialsStore) -> Result<(), CliError> {
    store.rekey()?;
    println!(
        "rotated master key {} and re-encrypted {}",
        store.master_key_file().display(),
        store.credentials_file().display()
    );
    Ok(())
}
