//! Scripted fakes for the editor and transfer boundaries, shared by the
//! filter and orchestrator tests.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;

use tether_core::SourcePath;

use crate::boundary::{EditorHost, TransferExecutor};
use crate::error::EngineError;
use crate::pause::PauseRegistry;

/// Editor fake: records statuses, prompts, and save calls; replies are
/// scripted up front. Optional gates hold save/save-all open so tests can
/// observe the pause window.
#[derive(Default)]
pub struct MockEditor {
    pub statuses: Mutex<Vec<String>>,
    pub prompts: Mutex<Vec<String>>,
    pub prompt_replies: Mutex<VecDeque<bool>>,
    pub saved_paths: Mutex<Vec<PathBuf>>,
    pub save_results: Mutex<VecDeque<bool>>,
    pub save_gate: Option<Arc<Notify>>,
    pub save_all_calls: AtomicUsize,
    pub save_all_gate: Option<Arc<Notify>>,
    /// When set, `save_all` records whether the registry's global pause
    /// flag was raised at call time.
    pub pause_probe: Mutex<Option<Arc<PauseRegistry>>>,
    pub observed_all_paused: AtomicBool,
}

impl MockEditor {
    pub fn statuses(&self) -> Vec<String> {
        self.statuses.lock().expect("statuses lock").clone()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().expect("prompts lock").clone()
    }

    pub fn script_prompt_replies(&self, replies: impl IntoIterator<Item = bool>) {
        self.prompt_replies
            .lock()
            .expect("replies lock")
            .extend(replies);
    }

    pub fn script_save_results(&self, results: impl IntoIterator<Item = bool>) {
        self.save_results
            .lock()
            .expect("save results lock")
            .extend(results);
    }
}

#[async_trait]
impl EditorHost for MockEditor {
    async fn save(&self, path: &Path) -> bool {
        if let Some(gate) = &self.save_gate {
            gate.notified().await;
        }
        self.saved_paths
            .lock()
            .expect("saved paths lock")
            .push(path.to_path_buf());
        self.save_results
            .lock()
            .expect("save results lock")
            .pop_front()
            .unwrap_or(true)
    }

    async fn save_all(&self) -> bool {
        if let Some(registry) = self.pause_probe.lock().expect("probe lock").as_ref() {
            self.observed_all_paused
                .store(registry.is_all_paused(), Ordering::SeqCst);
        }
        if let Some(gate) = &self.save_all_gate {
            gate.notified().await;
        }
        self.save_all_calls.fetch_add(1, Ordering::SeqCst);
        true
    }

    fn set_status(&self, message: &str) {
        self.statuses
            .lock()
            .expect("statuses lock")
            .push(message.to_owned());
    }

    async fn confirm(&self, message: &str) -> bool {
        self.prompts
            .lock()
            .expect("prompts lock")
            .push(message.to_owned());
        self.prompt_replies
            .lock()
            .expect("replies lock")
            .pop_front()
            .unwrap_or(false)
    }
}

/// Transfer fake: records every batch it is invoked with; outcomes are
/// scripted up front (default success). `drained` resolves immediately.
#[derive(Default)]
pub struct MockExecutor {
    pub calls: Mutex<Vec<Vec<SourcePath>>>,
    pub failures_remaining: AtomicUsize,
}

impl MockExecutor {
    pub fn failing_times(times: usize) -> Self {
        let executor = Self::default();
        executor.failures_remaining.store(times, Ordering::SeqCst);
        executor
    }

    pub fn calls(&self) -> Vec<Vec<SourcePath>> {
        self.calls.lock().expect("calls lock").clone()
    }
}

#[async_trait]
impl TransferExecutor for MockExecutor {
    async fn transfer(&self, sources: &[SourcePath]) -> Result<(), EngineError> {
        self.calls
            .lock()
            .expect("calls lock")
            .push(sources.to_vec());
        let remaining = self.failures_remaining.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failures_remaining
                .store(remaining - 1, Ordering::SeqCst);
            return Err(EngineError::Transfer {
                failed: sources.len(),
                total: sources.len(),
            });
        }
        Ok(())
    }

    async fn drained(&self) {}
}
