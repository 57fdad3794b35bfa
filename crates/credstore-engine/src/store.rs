// SPDX-FileCopyrightText: 2026 Credstore Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The credentials store: load, edit, create, and rekey an encrypted
//! credentials file guarded by a master key file.
//!
//! Every operation takes the process-wide locks for both files for its whole
//! duration, and every write replaces files atomically. A reader therefore
//! never observes a half-written file, and concurrent edits in one process
//! never lose updates.
//!
//! # Rekey recovery
//!
//! Rekey writes the new key to `<key>.next`, replaces the credentials file,
//! then renames the staged key over the key file. If the process stops between
//! the last two steps the credentials are encrypted under the staged key.
//! The next load notices the staging file and finishes the rename.

use std::path::{Path, PathBuf};

use credstore_config::StoreConfig;
use credstore_core::{CredentialsError, KeyPath, Lookup, Result};
use tracing::{debug, info, warn};

use crate::atomic::{self, WriteMode};
use crate::cipher::{self, CiphertextBlob};
use crate::key::{self, MasterKey};
use crate::lock::{self, PathLocks};
use crate::tree::ConfigTree;

/// A credentials file paired with its master key file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialsStore {
    credentials_file: PathBuf,
    master_key_file: PathBuf,
}

impl CredentialsStore {
    pub fn new(credentials_file: impl Into<PathBuf>, master_key_file: impl Into<PathBuf>) -> Self {
        Self {
            credentials_file: credentials_file.into(),
            master_key_file: master_key_file.into(),
        }
    }

    /// Build a store from configuration, resolving relative paths against
    /// `project_dir`.
    pub fn from_config(config: &StoreConfig, project_dir: &Path) -> Self {
        let resolved = config.resolve(project_dir);
        Self::new(resolved.credentials_file, resolved.master_key_file)
    }

    pub fn credentials_file(&self) -> &Path {
        &self.credentials_file
    }

    pub fn master_key_file(&self) -> &Path {
        &self.master_key_file
    }

    /// Decrypt and parse the credentials file.
    pub fn load(&self) -> Result<ConfigTree> {
        let _locks = self.lock()?;
        let (_, tree) = self.load_unlocked()?;
        Ok(tree)
    }

    /// The value at `key` as a string.
    pub fn get_string(&self, key: &str) -> Result<String> {
        let path = KeyPath::parse(key)?;
        self.load()?.get_string(&path)
    }

    /// Like [`get_string`](Self::get_string), but missing files and missing
    /// keys become [`Lookup::NotFound`] instead of errors.
    pub fn lookup(&self, key: &str) -> Result<Lookup> {
        match self.get_string(key) {
            Ok(value) => Ok(Lookup::Found(value)),
            Err(err) => Lookup::from_error(err),
        }
    }

    /// Set `key` to `value`, creating intermediate tables, and save.
    pub fn upsert(&self, key: &str, value: &str) -> Result<()> {
        let path = KeyPath::parse(key)?;
        let _locks = self.lock()?;

        let (master, mut tree) = self.load_unlocked()?;
        let replaced = tree.set(&path, value).is_some();
        self.save(&tree, &master)?;

        debug!(key = %path, replaced, "credential upserted");
        Ok(())
    }

    /// Remove `key` and save. Removing an absent key leaves the file untouched.
    pub fn delete(&self, key: &str) -> Result<()> {
        let path = KeyPath::parse(key)?;
        let _locks = self.lock()?;

        let (master, mut tree) = self.load_unlocked()?;
        if tree.remove(&path).is_none() {
            debug!(key = %path, "credential not present, nothing deleted");
            return Ok(());
        }
        self.save(&tree, &master)?;

        debug!(key = %path, "credential deleted");
        Ok(())
    }

    /// Create a new master key and an empty credentials file.
    ///
    /// Fails with [`CredentialsError::AlreadyExists`] if either file exists;
    /// nothing is overwritten. Missing parent directories are created.
    pub fn generate(&self) -> Result<()> {
        let _locks = self.lock()?;

        for path in [&self.credentials_file, &self.master_key_file] {
            if path.try_exists().map_err(|e| CredentialsError::io(path, e))? {
                return Err(CredentialsError::AlreadyExists { path: path.clone() });
            }
        }
        atomic::ensure_parent(&self.master_key_file)?;
        atomic::ensure_parent(&self.credentials_file)?;

        let master = key::generate()?;
        let blob = cipher::encrypt(ConfigTree::new().to_toml()?.as_bytes(), &master)?;

        key::persist_new(&self.master_key_file, &master)?;
        if let Err(err) = atomic::write_file(
            &self.credentials_file,
            blob.as_str().as_bytes(),
            WriteMode::CreateNew,
            false,
        ) {
            // Do not leave a key without credentials behind.
            if let Err(cleanup) = std::fs::remove_file(&self.master_key_file) {
                warn!(
                    path = %self.master_key_file.display(),
                    error = %cleanup,
                    "could not remove master key after failed generate"
                );
            }
            return Err(err);
        }

        info!(
            credentials = %self.credentials_file.display(),
            master_key = %self.master_key_file.display(),
            "credentials store generated"
        );
        Ok(())
    }

    /// Replace the master key and re-encrypt the credentials under it.
    ///
    /// The document content is unchanged. On failure before the credentials
    /// file is replaced, the old key stays in effect.
    pub fn rekey(&self) -> Result<()> {
        let _locks = self.lock()?;

        let (_, tree) = self.load_unlocked()?;
        let payload = zeroize::Zeroizing::new(tree.to_toml()?);

        let staged = key::stage(&self.master_key_file)?;
        let blob = match cipher::encrypt(payload.as_bytes(), staged.key()) {
            Ok(blob) => blob,
            Err(err) => {
                discard_quietly(staged);
                return Err(err);
            }
        };
        if let Err(err) = self.write_blob(&blob) {
            discard_quietly(staged);
            return Err(err);
        }
        staged.commit()?;

        info!(
            master_key = %self.master_key_file.display(),
            "master key rotated, credentials re-encrypted"
        );
        Ok(())
    }

    fn lock(&self) -> Result<PathLocks> {
        if self.credentials_file == self.master_key_file {
            return Err(CredentialsError::Config(format!(
                "credentials file and master key file are the same path: {}",
                self.credentials_file.display()
            )));
        }
        Ok(lock::lock_paths(&[
            &self.credentials_file,
            &self.master_key_file,
        ]))
    }

    /// Load with the locks already held, completing an interrupted rekey
    /// if one is detected.
    fn load_unlocked(&self) -> Result<(MasterKey, ConfigTree)> {
        let master = key::load(&self.master_key_file)?;
        let blob = self.read_blob()?;

        let pending = key::pending_path(&self.master_key_file);
        let pending_exists = pending
            .try_exists()
            .map_err(|e| CredentialsError::io(&pending, e))?;
        if pending_exists {
            return self.recover(master, &blob, &pending);
        }

        let tree = decode(&blob, &master)?;
        debug!(
            path = %self.credentials_file.display(),
            entries = tree.leaf_paths().len(),
            "credentials loaded"
        );
        Ok((master, tree))
    }

    fn recover(
        &self,
        current: MasterKey,
        blob: &CiphertextBlob,
        pending: &Path,
    ) -> Result<(MasterKey, ConfigTree)> {
        match decode(blob, &current) {
            Ok(tree) => {
                warn!(path = %pending.display(), "removing stale staged master key");
                key::remove_pending(pending)?;
                Ok((current, tree))
            }
            Err(CredentialsError::Decryption) => {
                let Ok(staged) = key::load(pending) else {
                    return Err(CredentialsError::Decryption);
                };
                let tree = decode(blob, &staged)?;
                key::commit_pending(pending, &self.master_key_file)?;
                warn!(
                    path = %self.master_key_file.display(),
                    "completed interrupted master key rotation"
                );
                Ok((staged, tree))
            }
            Err(other) => Err(other),
        }
    }

    fn read_blob(&self) -> Result<CiphertextBlob> {
        match std::fs::read(&self.credentials_file) {
            Ok(raw) => CiphertextBlob::from_bytes(&raw),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(CredentialsError::CredentialsFileMissing {
                    path: self.credentials_file.clone(),
                })
            }
            Err(e) => Err(CredentialsError::io(&self.credentials_file, e)),
        }
    }

    fn save(&self, tree: &ConfigTree, master: &MasterKey) -> Result<()> {
        let payload = zeroize::Zeroizing::new(tree.to_toml()?);
        let blob = cipher::encrypt(payload.as_bytes(), master)?;
        self.write_blob(&blob)
    }

    fn write_blob(&self, blob: &CiphertextBlob) -> Result<()> {
        atomic::write_file(
            &self.credentials_file,
            blob.as_str().as_bytes(),
            WriteMode::Replace,
            false,
        )
    }
}

fn decode(blob: &CiphertextBlob, master: &MasterKey) -> Result<ConfigTree> {
    let plaintext = cipher::decrypt(blob, master)?;
    ConfigTree::from_bytes(&plaintext)
}

fn discard_quietly(staged: key::StagedKey) {
    let pending = staged.pending_path().to_path_buf();
    if let Err(err) = staged.discard() {
        warn!(path = %pending.display(), error = %err, "could not remove staged master key");
    }
}

/// Decrypt and parse the credentials file at `credentials_file`.
pub fn load(credentials_file: &Path, master_key_file: &Path) -> Result<ConfigTree> {
    CredentialsStore::new(credentials_file, master_key_file).load()
}

/// Set `key` to `value` in the credentials file.
pub fn upsert(credentials_file: &Path, master_key_file: &Path, key: &str, value: &str) -> Result<()> {
    CredentialsStore::new(credentials_file, master_key_file).upsert(key, value)
}

/// Remove `key` from the credentials file.
pub fn delete(credentials_file: &Path, master_key_file: &Path, key: &str) -> Result<()> {
    CredentialsStore::new(credentials_file, master_key_file).delete(key)
}

/// Create a new master key and an empty credentials file.
pub fn generate(credentials_file: &Path, master_key_file: &Path) -> Result<()> {
    CredentialsStore::new(credentials_file, master_key_file).generate()
}

/// Rotate the master key and re-encrypt the credentials file.
pub fn rekey(credentials_file: &Path, master_key_file: &Path) -> Result<()> {
    CredentialsStore::new(credentials_file, master_key_file).rekey()
}

/// The value at `key` as a string.
pub fn get_string(credentials_file: &Path, master_key_file: &Path, key: &str) -> Result<String> {
    CredentialsStore::new(credentials_file, master_key_file).get_string(key)
}

#[cfg(test)]
mod tests {
    use tracing_test::traced_test;

    use super::*;

    const FIXTURE_KEY: &str = "thisisnotarealmasterkeybutitwork1234567890123456";

    fn store_in(dir: &Path) -> CredentialsStore {
        CredentialsStore::new(dir.join("credentials.conf.enc"), dir.join("master.key"))
    }

    #[test]
    fn from_config_resolves_relative_paths() {
        let config = StoreConfig::default();
        let store = CredentialsStore::from_config(&config, Path::new("/project"));
        assert_eq!(
            store.credentials_file(),
            Path::new("/project/resources/credentials.conf.enc")
        );
        assert_eq!(store.master_key_file(), Path::new("/project/resources/master.key"));
    }

    #[test]
    fn identical_paths_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("both");
        let store = CredentialsStore::new(&path, &path);
        assert!(matches!(store.generate(), Err(CredentialsError::Config(_))));
    }

    #[test]
    fn legacy_empty_file_loads_as_empty_tree() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());
        std::fs::write(store.master_key_file(), FIXTURE_KEY).unwrap();
        std::fs::write(store.credentials_file(), "").unwrap();

        assert!(store.load().unwrap().is_empty());
        store.upsert("upsert", "value").unwrap();
        assert_eq!(store.get_string("upsert").unwrap(), "value");
    }

    #[test]
    fn stale_staged_key_is_removed() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());
        store.generate().unwrap();
        store.upsert("a", "1").unwrap();

        // Crash after staging but before the credentials were replaced.
        let staged = key::generate().unwrap();
        let pending = key::pending_path(store.master_key_file());
        key::persist(&pending, &staged).unwrap();

        assert_eq!(store.get_string("a").unwrap(), "1");
        assert!(!pending.exists());
    }

    #[test]
    #[traced_test]
    fn interrupted_rotation_is_completed_on_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());
        store.generate().unwrap();
        store.upsert("credentials.one", "1").unwrap();

        // Crash after the credentials were re-encrypted but before the rename.
        let tree = store.load().unwrap();
        let staged = key::stage(store.master_key_file()).unwrap();
        let blob = cipher::encrypt(tree.to_toml().unwrap().as_bytes(), staged.key()).unwrap();
        store.write_blob(&blob).unwrap();
        let new_text = staged.key().expose_text().to_string();
        drop(staged);

        assert_eq!(store.get_string("credentials.one").unwrap(), "1");
        assert!(!key::pending_path(store.master_key_file()).exists());
        assert_eq!(
            std::fs::read_to_string(store.master_key_file()).unwrap(),
            new_text
        );
        assert!(logs_contain("completed interrupted master key rotation"));
    }

    #[test]
    fn unusable_staged_key_does_not_mask_decryption_failure() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());
        store.generate().unwrap();

        let foreign = key::generate().unwrap();
        let blob = cipher::encrypt(b"a = 1", &foreign).unwrap();
        store.write_blob(&blob).unwrap();
        std::fs::write(key::pending_path(store.master_key_file()), "short").unwrap();

        assert!(matches!(store.load(), Err(CredentialsError::Decryption)));
    }

    #[test]
    #[traced_test]
    fn generate_and_rekey_log_without_values() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());
        store.generate().unwrap();
        store.upsert("db.password", "hunter2-hunter2").unwrap();
        store.rekey().unwrap();

        assert!(logs_contain("credentials store generated"));
        assert!(logs_contain("master key rotated"));
        assert!(!logs_contain("hunter2-hunter2"));
    }
}
