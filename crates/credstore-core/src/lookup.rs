// SPDX-FileCopyrightText: 2026 Credstore Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Explicit found / not-found results for single-value reads.
//!
//! Callers that want a fallback value (for example a build that should still
//! run on a machine without the master key) inspect the [`NotFoundReason`]
//! and decide for themselves; the store never substitutes defaults.

use std::fmt;

use tracing::warn;

use crate::error::CredentialsError;

/// Why a lookup produced no value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotFoundReason {
    /// The credentials file does not exist.
    CredentialsFileMissing,
    /// The master key file does not exist.
    KeyFileMissing,
    /// Both files exist but the document has no value at the key.
    KeyAbsent,
}

impl fmt::Display for NotFoundReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CredentialsFileMissing => f.write_str("credentials file is missing"),
            Self::KeyFileMissing => f.write_str("master key file is missing"),
            Self::KeyAbsent => f.write_str("key is not present in the credentials file"),
        }
    }
}

/// Result of reading one value from the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    /// The value stored under the key.
    Found(String),
    /// No value, with the reason.
    NotFound(NotFoundReason),
}

impl Lookup {
    /// Classify a store error: the missing-file and missing-key cases become
    /// `NotFound`, anything else (bad key, tampering, I/O) stays an error.
    pub fn from_error(err: CredentialsError) -> Result<Self, CredentialsError> {
        match err {
            CredentialsError::CredentialsFileMissing { .. } => {
                Ok(Self::NotFound(NotFoundReason::CredentialsFileMissing))
            }
            CredentialsError::KeyFileMissing { .. } => {
                Ok(Self::NotFound(NotFoundReason::KeyFileMissing))
            }
            CredentialsError::KeyNotFound { .. } => Ok(Self::NotFound(NotFoundReason::KeyAbsent)),
            other => Err(other),
        }
    }

    /// True when a value was found.
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    /// The found value, if any.
    pub fn found(self) -> Option<String> {
        match self {
            Self::Found(value) => Some(value),
            Self::NotFound(_) => None,
        }
    }

    /// Return the value, or `default` with a warning naming the reason.
    pub fn or_default_logged(self, key: &str, default: impl Into<String>) -> String {
        match self {
            Self::Found(value) => value,
            Self::NotFound(reason) => {
                warn!(key = %key, %reason, "credential unavailable, default returned");
                default.into()
            }
        }
    }
}
