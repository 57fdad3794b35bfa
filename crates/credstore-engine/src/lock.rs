// SPDX-FileCopyrightText: 2026 Credstore Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Process-wide mutual exclusion per file path.
//!
//! Every operation on a store holds the locks for both of its files, so two
//! stores sharing a master key file are serialized while stores on unrelated
//! files run in parallel. Locks are taken in sorted path order to rule out
//! lock-order deadlocks. This does not coordinate separate processes.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Condvar, LazyLock, Mutex, PoisonError};

use dashmap::DashMap;

/// One slot per absolute path that is currently locked or waited on.
/// Entries are pruned when their last holder releases them.
static REGISTRY: LazyLock<DashMap<PathBuf, Arc<Slot>>> = LazyLock::new(DashMap::new);

/// A lock that is not tied to a guard lifetime, so the registry can own it
/// through an `Arc` and drop it once unused.
#[derive(Default)]
struct Slot {
    held: Mutex<bool>,
    released: Condvar,
}

impl Slot {
    fn acquire(&self) {
        // The guarded flag is rewritten on every acquire and release, so a
        // poisoned mutex carries no stale state.
        let mut held = self.held.lock().unwrap_or_else(PoisonError::into_inner);
        while *held {
            held = self
                .released
                .wait(held)
                .unwrap_or_else(PoisonError::into_inner);
        }
        *held = true;
    }

    fn release(&self) {
        *self.held.lock().unwrap_or_else(PoisonError::into_inner) = false;
        self.released.notify_one();
    }
}

/// Held locks for a set of paths. Released on drop.
#[must_use = "the locks are released as soon as the guard is dropped"]
pub(crate) struct PathLocks {
    held: Vec<(PathBuf, Arc<Slot>)>,
}

impl Drop for PathLocks {
    fn drop(&mut self) {
        for (key, slot) in self.held.drain(..).rev() {
            slot.release();
            drop(slot);
            // Waiters hold their own clone, so a count of one means only the
            // registry still refers to the slot.
            REGISTRY.remove_if(&key, |_, slot| Arc::strong_count(slot) == 1);
        }
    }
}

/// Block until every path in `paths` is locked by the calling thread.
///
/// Paths are made absolute without touching the filesystem, so a file that
/// does not exist yet can still be locked. Duplicates are locked once.
pub(crate) fn lock_paths<P: AsRef<Path>>(paths: &[P]) -> PathLocks {
    let mut keys: Vec<PathBuf> = paths.iter().map(|p| normalize(p.as_ref())).collect();
    keys.sort();
    keys.dedup();

    let mut locks = PathLocks {
        held: Vec::with_capacity(keys.len()),
    };
    for key in keys {
        let slot = REGISTRY.entry(key.clone()).or_default().value().clone();
        slot.acquire();
        locks.held.push((key, slot));
    }
    locks
}

fn normalize(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}
