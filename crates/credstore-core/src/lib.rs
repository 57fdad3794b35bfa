// SPDX-FileCopyrightText: 2026 Credstore Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core types for the credstore workspace.
//!
//! This crate provides the error type, the dotted key path used to address
//! values inside a credentials document, and the explicit lookup result used
//! by callers that want to fall back to defaults.

pub mod error;
pub mod lookup;
pub mod path;

// Re-export key items at crate root for ergonomic imports.
pub use error::{CredentialsError, Result};
pub use lookup::{Lookup, NotFoundReason};
pub use path::KeyPath;

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn missing_file_variants_are_classified() {
        let creds = CredentialsError::CredentialsFileMissing {
            path: PathBuf::from("resources/credentials.conf.enc"),
        };
        let key = CredentialsError::KeyFileMissing {
            path: PathBuf::from("resources/master.key"),
        };
        assert!(creds.is_missing_file());
        assert!(key.is_missing_file());
        assert!(!CredentialsError::Decryption.is_missing_file());
    }

    #[test]
    fn io_errors_carry_the_path() {
        let err = CredentialsError::io("/tmp/x", std::io::Error::other("disk full"));
        let msg = err.to_string();
        assert!(msg.contains("/tmp/x"), "{msg}");
        assert!(msg.contains("disk full"), "{msg}");
    }
}
