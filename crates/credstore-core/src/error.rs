// SPDX-FileCopyrightText: 2026 Credstore Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the credstore workspace.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// The primary error type returned by every credentials store operation.
#[derive(Debug, Error)]
pub enum CredentialsError {
    /// The credentials file does not exist where one was required.
    #[error("credentials file not found: {}", path.display())]
    CredentialsFileMissing { path: PathBuf },

    /// The master key file does not exist where one was required.
    #[error("master key file not found: {}", path.display())]
    KeyFileMissing { path: PathBuf },

    /// The master key file exists but its content is not usable key material.
    #[error("invalid master key in {}: {reason}", path.display())]
    KeyFormat { path: PathBuf, reason: String },

    /// The ciphertext failed authentication or is structurally malformed.
    ///
    /// Wrong key and tampering are indistinguishable, so no detail is carried.
    #[error("decryption failed -- wrong master key or corrupted credentials file")]
    Decryption,

    /// The decrypted payload is not a valid configuration document.
    #[error("malformed credentials document: {0}")]
    Parse(String),

    /// `generate` refused to replace an existing file.
    #[error("refusing to overwrite existing file: {}", path.display())]
    AlreadyExists { path: PathBuf },

    /// A dotted key path could not be parsed.
    #[error("invalid key path `{path}`: {reason}")]
    InvalidKeyPath { path: String, reason: String },

    /// The requested key is not present in the credentials document.
    #[error("no value stored under `{key}`")]
    KeyNotFound { key: String },

    /// The requested key holds a table or array rather than a scalar.
    #[error("value under `{key}` is a {found}, not a scalar")]
    NotAString { key: String, found: &'static str },

    /// The cryptographic backend failed (RNG or key setup).
    #[error("crypto backend error: {0}")]
    Crypto(String),

    /// The configured store paths are unusable.
    #[error("configuration error: {0}")]
    Config(String),

    /// Reading, writing, syncing, or renaming a file failed.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl CredentialsError {
    /// Wrap an I/O error with the path it occurred on.
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// True for the two "file absent" variants a caller may choose to tolerate.
    pub fn is_missing_file(&self) -> bool {
        matches!(
            self,
            Self::CredentialsFileMissing { .. } | Self::KeyFileMissing { .. }
        )
    }
}

/// Convenience alias used across the workspace.
pub type Result<T, E = CredentialsError> = std::result::Result<T, E>;
