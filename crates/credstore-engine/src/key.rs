// SPDX-FileCopyrightText: 2026 Credstore Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Master key management: generation, loading, persistence, and rotation.
//!
//! The master key file holds printable key text. Surrounding whitespace
//! (such as a trailing newline added by an editor) is ignored. The text is
//! never used as a cipher key directly; HKDF-SHA256 maps it to the 32-byte
//! AES-256-GCM key, so any text of sufficient length works.
//!
//! Rotation goes through a staging file next to the key file (`<key>.next`)
//! so an interrupted rekey can be completed on the next load.

use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};

use credstore_core::{CredentialsError, Result};
use ring::hkdf;
use ring::rand::{SecureRandom, SystemRandom};
use secrecy::{ExposeSecret, SecretString};
use tracing::debug;
use zeroize::Zeroizing;

use crate::atomic::{self, WriteMode};

/// Minimum accepted key text length, in bytes.
pub const MIN_KEY_LEN: usize = 32;

/// Random bytes behind a generated key (rendered as twice as many hex chars).
pub const GENERATED_KEY_BYTES: usize = 32;

/// Suffix of the staging file used during rotation.
pub const PENDING_SUFFIX: &str = ".next";

const HKDF_SALT: &[u8] = b"credstore/master-key/v1";
const HKDF_INFO: &[u8] = b"credstore/aes-256-gcm";

/// The master key: the text stored in the key file plus the cipher key derived from it.
pub struct MasterKey {
    text: SecretString,
    cipher_key: Zeroizing<[u8; 32]>,
}

impl MasterKey {
    /// Build a key from its textual form.
    ///
    /// The text is trimmed of ASCII whitespace and must be at least
    /// [`MIN_KEY_LEN`] bytes long. The error `reason` is suitable for a
    /// [`CredentialsError::KeyFormat`].
    pub fn from_text(text: &str) -> std::result::Result<Self, String> {
        let trimmed = text.trim_matches(|c: char| c.is_ascii_whitespace());
        if trimmed.is_empty() {
            return Err("key file is empty".to_string());
        }
        if trimmed.len() < MIN_KEY_LEN {
            return Err(format!(
                "key is {} bytes, at least {MIN_KEY_LEN} are required",
                trimmed.len()
            ));
        }

        let cipher_key = derive_cipher_key(trimmed.as_bytes()).map_err(|e| e.to_string())?;
        Ok(Self {
            text: SecretString::from(trimmed.to_string()),
            cipher_key,
        })
    }

    /// The key text as written to the key file.
    pub fn expose_text(&self) -> &str {
        self.text.expose_secret()
    }

    /// The derived AES-256-GCM key.
    pub(crate) fn cipher_key(&self) -> &[u8; 32] {
        &self.cipher_key
    }
}

impl fmt::Debug for MasterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MasterKey").field("text", &"[REDACTED]").finish()
    }
}

/// HKDF-SHA256 over the key text.
fn derive_cipher_key(material: &[u8]) -> Result<Zeroizing<[u8; 32]>> {
    let prk = hkdf::Salt::new(hkdf::HKDF_SHA256, HKDF_SALT).extract(material);
    let okm = prk
        .expand(&[HKDF_INFO], hkdf::HKDF_SHA256)
        .map_err(|_| CredentialsError::Crypto("HKDF expansion failed".to_string()))?;

    let mut key = Zeroizing::new([0u8; 32]);
    okm.fill(&mut key[..])
        .map_err(|_| CredentialsError::Crypto("HKDF output length mismatch".to_string()))?;
    Ok(key)
}

/// Generate a fresh random key.
///
/// 32 bytes from the system CSPRNG, hex-encoded into 64 printable characters.
pub fn generate() -> Result<MasterKey> {
    let mut bytes = Zeroizing::new([0u8; GENERATED_KEY_BYTES]);
    SystemRandom::new()
        .fill(&mut bytes[..])
        .map_err(|_| CredentialsError::Crypto("failed to generate random key".to_string()))?;

    let text = Zeroizing::new(hex::encode(&bytes[..]));
    MasterKey::from_text(&text).map_err(CredentialsError::Crypto)
}

/// Read and validate the key stored at `path`.
pub fn load(path: &Path) -> Result<MasterKey> {
    let raw = match std::fs::read(path) {
        Ok(raw) => Zeroizing::new(raw),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(CredentialsError::KeyFileMissing {
                path: path.to_path_buf(),
            });
        }
        Err(e) => return Err(CredentialsError::io(path, e)),
    };

    let key_format = |reason: String| CredentialsError::KeyFormat {
        path: path.to_path_buf(),
        reason,
    };
    let text = std::str::from_utf8(&raw).map_err(|_| key_format("not valid UTF-8".to_string()))?;
    let key = MasterKey::from_text(text).map_err(key_format)?;
    debug!(path = %path.display(), "master key loaded");
    Ok(key)
}

/// Write `key` to `path`, atomically replacing any existing file.
pub fn persist(path: &Path, key: &MasterKey) -> Result<()> {
    atomic::write_file(path, key.expose_text().as_bytes(), WriteMode::Replace, true)
}

/// Write `key` to `path`, failing with [`CredentialsError::AlreadyExists`] if
/// the file is already there.
pub fn persist_new(path: &Path, key: &MasterKey) -> Result<()> {
    atomic::write_file(path, key.expose_text().as_bytes(), WriteMode::CreateNew, true)
}

/// Path of the staging file used while rotating the key at `key_path`.
pub fn pending_path(key_path: &Path) -> PathBuf {
    let mut name = key_path
        .file_name()
        .map(OsString::from)
        .unwrap_or_default();
    name.push(PENDING_SUFFIX);
    key_path.with_file_name(name)
}

/// A freshly generated key written to the staging file but not yet live.
#[derive(Debug)]
pub struct StagedKey {
    key: MasterKey,
    pending: PathBuf,
    target: PathBuf,
}

impl StagedKey {
    /// The staged key, for re-encrypting data before the switch.
    pub fn key(&self) -> &MasterKey {
        &self.key
    }

    /// Path of the staging file.
    pub fn pending_path(&self) -> &Path {
        &self.pending
    }

    /// Atomically move the staged key over the live key file.
    pub fn commit(self) -> Result<MasterKey> {
        commit_pending(&self.pending, &self.target)?;
        Ok(self.key)
    }

    /// Remove the staging file, leaving the live key untouched.
    pub fn discard(self) -> Result<()> {
        remove_pending(&self.pending)
    }
}

/// Generate a new key and write it to the staging file for `key_path`.
///
/// A leftover staging file from an earlier attempt is overwritten.
pub fn stage(key_path: &Path) -> Result<StagedKey> {
    let key = generate()?;
    let pending = pending_path(key_path);
    persist(&pending, &key)?;
    debug!(path = %pending.display(), "new master key staged");
    Ok(StagedKey {
        key,
        pending,
        target: key_path.to_path_buf(),
    })
}

/// Replace the key at `path` with a freshly generated one and return it.
pub fn rotate(path: &Path) -> Result<MasterKey> {
    stage(path)?.commit()
}

/// Rename a staging file over the live key file.
pub(crate) fn commit_pending(pending: &Path, target: &Path) -> Result<()> {
    std::fs::rename(pending, target).map_err(|e| CredentialsError::io(target, e))?;
    atomic::sync_parent(target);
    Ok(())
}

/// Delete a staging file. A file that is already gone is not an error.
pub(crate) fn remove_pending(pending: &Path) -> Result<()> {
    match std::fs::remove_file(pending) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(CredentialsError::io(pending, e)),
    }
}
