//! Pause bookkeeping for in-flight saves.
//!
//! A path is paused immediately before the engine triggers a save on it and
//! unpaused when that save settles; while paused, the filter excludes the
//! path silently so the save notification the engine itself caused cannot
//! re-enter the sync. The single global flag covers the directory-wide
//! flush window.
//!
//! Each orchestrator owns its own registry, so independent workspace roots
//! never interfere.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Default)]
pub struct PauseRegistry {
    paused: Mutex<HashSet<PathBuf>>,
    all_paused: AtomicBool,
}

impl PauseRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `path` as paused. Idempotent.
    pub fn pause(&self, path: &Path) {
        self.paused_set().insert(path.to_path_buf());
    }

    /// Remove `path` from the paused set. No-op when absent.
    pub fn unpause(&self, path: &Path) {
        self.paused_set().remove(path);
    }

    pub fn is_paused(&self, path: &Path) -> bool {
        self.paused_set().contains(path)
    }

    /// Global pause used during a directory-wide flush. Last write wins.
    pub fn set_all_paused(&self, paused: bool) {
        self.all_paused.store(paused, Ordering::SeqCst);
    }

    pub fn is_all_paused(&self) -> bool {
        self.all_paused.load(Ordering::SeqCst)
    }

    /// Registry mutation must never fail, so a poisoned lock is recovered
    /// rather than propagated.
    fn paused_set(&self) -> MutexGuard<'_, HashSet<PathBuf>> {
        self.paused
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
