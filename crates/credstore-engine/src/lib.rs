// SPDX-FileCopyrightText: 2026 Credstore Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Encrypted credentials file engine.
//!
//! A credentials store is a pair of files: a base64 AES-256-GCM blob holding a
//! TOML document, and a master key file holding the key text. This crate
//! reads, edits, creates, and rekeys that pair.
//!
//! # Usage
//!
//! ```no_run
//! use credstore_engine::CredentialsStore;
//!
//! let store = CredentialsStore::new(
//!     "resources/credentials.conf.enc",
//!     "resources/master.key",
//! );
//! store.generate()?;
//! store.upsert("database.password", "hunter2")?;
//! assert_eq!(store.get_string("database.password")?, "hunter2");
//! # Ok::<(), credstore_core::CredentialsError>(())
//! ```

mod atomic;
pub mod cipher;
pub mod key;
mod lock;
pub mod redact;
pub mod store;
pub mod tree;

pub use cipher::{CiphertextBlob, decrypt, encrypt};
pub use key::{MasterKey, StagedKey};
pub use redact::mask_secret;
pub use store::{CredentialsStore, delete, generate, get_string, load, rekey, upsert};
pub use tree::ConfigTree;
