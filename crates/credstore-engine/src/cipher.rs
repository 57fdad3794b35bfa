// SPDX-FileCopyrightText: 2026 Credstore Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! AES-256-GCM encoding of the credentials payload.
//!
//! Blob layout, before base64 (standard alphabet, padded):
//!
//! ```text
//! nonce (12 bytes) || ciphertext || tag (16 bytes)
//! ```
//!
//! Every call to [`encrypt`] draws a fresh random nonce from the system
//! CSPRNG. An empty or whitespace-only blob is the legacy representation of
//! an empty document and decrypts to an empty payload under any key.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use credstore_core::{CredentialsError, Result};
use ring::aead::{AES_256_GCM, Aad, LessSafeKey, Nonce, UnboundKey};
use ring::rand::{SecureRandom, SystemRandom};
use zeroize::Zeroizing;

use crate::key::MasterKey;

/// Nonce length in bytes.
pub const NONCE_LEN: usize = 12;

/// Authentication tag length in bytes.
pub const TAG_LEN: usize = 16;

/// The textual content of the credentials file.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CiphertextBlob(String);

impl CiphertextBlob {
    /// Wrap file content, ignoring surrounding whitespace.
    pub fn new(text: &str) -> Self {
        Self(text.trim().to_string())
    }

    /// Interpret raw file bytes. Non-UTF-8 content cannot be base64 and is
    /// reported as [`CredentialsError::Decryption`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        std::str::from_utf8(bytes)
            .map(Self::new)
            .map_err(|_| CredentialsError::Decryption)
    }

    /// The base64 text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True for the legacy empty-document representation.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

fn sealing_key(key: &MasterKey) -> Result<LessSafeKey> {
    let unbound = UnboundKey::new(&AES_256_GCM, key.cipher_key())
        .map_err(|_| CredentialsError::Crypto("failed to create AES-256-GCM key".to_string()))?;
    Ok(LessSafeKey::new(unbound))
}

/// Encrypt `plaintext` under `key`.
pub fn encrypt(plaintext: &[u8], key: &MasterKey) -> Result<CiphertextBlob> {
    let sealing = sealing_key(key)?;

    let mut nonce_bytes = [0u8; NONCE_LEN];
    SystemRandom::new()
        .fill(&mut nonce_bytes)
        .map_err(|_| CredentialsError::Crypto("failed to generate random nonce".to_string()))?;

    let mut in_out = Zeroizing::new(plaintext.to_vec());
    sealing
        .seal_in_place_append_tag(
            Nonce::assume_unique_for_key(nonce_bytes),
            Aad::empty(),
            &mut *in_out,
        )
        .map_err(|_| CredentialsError::Crypto("AES-256-GCM encryption failed".to_string()))?;

    let mut framed = Vec::with_capacity(NONCE_LEN + in_out.len());
    framed.extend_from_slice(&nonce_bytes);
    framed.extend_from_slice(&in_out);
    Ok(CiphertextBlob(STANDARD.encode(framed)))
}

/// Decrypt `blob` with `key`.
///
/// Wrong key, tampering, truncation, and invalid base64 all surface as
/// [`CredentialsError::Decryption`].
pub fn decrypt(blob: &CiphertextBlob, key: &MasterKey) -> Result<Zeroizing<Vec<u8>>> {
    if blob.is_empty() {
        return Ok(Zeroizing::new(Vec::new()));
    }

    let framed = STANDARD
        .decode(blob.as_str())
        .map_err(|_| CredentialsError::Decryption)?;
    if framed.len() < NONCE_LEN + TAG_LEN {
        return Err(CredentialsError::Decryption);
    }

    let (nonce_bytes, sealed) = framed.split_at(NONCE_LEN);
    let nonce = Nonce::try_assume_unique_for_key(nonce_bytes).map_err(|_| CredentialsError::Decryption)?;

    let mut in_out = Zeroizing::new(sealed.to_vec());
    let plaintext = sealing_key(key)?
        .open_in_place(nonce, Aad::empty(), &mut in_out[..])
        .map_err(|_| CredentialsError::Decryption)?;

    Ok(Zeroizing::new(plaintext.to_vec()))
}
