//! Sync orchestration: batching, status reporting, and the retry loop.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tether_core::{Document, SourcePath, SyncConfig, Trigger};

use crate::boundary::{EditorHost, TransferExecutor};
use crate::filter::SourceFilter;
use crate::pause::PauseRegistry;

/// Delay before the cosmetic "Done" status so rapid status changes stay
/// readable to a human.
pub const DONE_STATUS_DELAY: Duration = Duration::from_secs(1);

/// Terminal outcome of one orchestration cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The executor reported success.
    Completed,
    /// The transfer failed and the user declined to retry (or quiet mode
    /// accepted the failure without asking).
    FailedAccepted,
    /// Every candidate was filtered out; nothing was transferred.
    NothingToDo,
    /// The global pause flag was up; the request was dropped, not queued.
    Suppressed,
}

/// One orchestrator per workspace root. Instances are independent: each
/// owns its pause registry, so multiple roots can sync side by side.
pub struct SyncOrchestrator {
    root: PathBuf,
    config: Arc<SyncConfig>,
    pauses: Arc<PauseRegistry>,
    filter: SourceFilter,
    editor: Arc<dyn EditorHost>,
    executor: Arc<dyn TransferExecutor>,
}

impl SyncOrchestrator {
    pub fn new(
        root: impl Into<PathBuf>,
        config: Arc<SyncConfig>,
        editor: Arc<dyn EditorHost>,
        executor: Arc<dyn TransferExecutor>,
    ) -> Self {
        let root = root.into();
        let pauses = Arc::new(PauseRegistry::new());
        let filter = SourceFilter::new(
            root.clone(),
            Arc::clone(&config),
            Arc::clone(&pauses),
            Arc::clone(&editor),
        );
        Self {
            root,
            config,
            pauses,
            filter,
            editor,
            executor,
        }
    }

    /// The pause registry owned by this orchestrator.
    pub fn pauses(&self) -> &Arc<PauseRegistry> {
        &self.pauses
    }

    /// Filter a batch of candidate documents and sync whatever survives.
    ///
    /// Empty batches are a silent no-op; requests arriving while the
    /// global pause flag is up are suppressed, not queued.
    pub async fn sync_documents(&self, documents: &[Document], trigger: Trigger) -> SyncOutcome {
        if self.pauses.is_all_paused() {
            tracing::debug!(trigger = trigger.label(), "sync suppressed while all paused");
            return SyncOutcome::Suppressed;
        }

        let batch = self.filter.filter(documents);
        if batch.is_empty() {
            return SyncOutcome::NothingToDo;
        }

        self.spawn_drain_watch();
        self.sync(&batch).await
    }

    /// Sync the whole workspace (`dir == ""`) or a sub-directory.
    ///
    /// With dirty mode on, the global pause flag covers the save-all flush
    /// so no trigger can sync against unflushed edits; a directory sync
    /// has no single document to pause around, so the lock is deliberately
    /// coarse.
    pub async fn sync_directory(&self, dir: &str, trigger: Trigger) -> SyncOutcome {
        if self.config.dirty {
            self.pauses.set_all_paused(true);
            let flushed = self.editor.save_all().await;
            self.pauses.set_all_paused(false);
            if !flushed {
                tracing::warn!("save-all before directory sync did not complete cleanly");
            }
        }

        // Feed the directory through the same filter-then-sync path as a
        // document-triggered sync so every exclusion rule still applies.
        let document = Document::on_disk(self.root.join(dir));
        self.sync_documents(&[document], trigger).await
    }

    /// Run one batch through the executor, looping on user-approved
    /// retries. The retried batch is the original one verbatim; it is not
    /// re-filtered.
    pub async fn sync(&self, batch: &[SourcePath]) -> SyncOutcome {
        debug_assert!(!batch.is_empty(), "empty batches are filtered out earlier");
        let label = pluralize(batch.len(), "item");
        loop {
            self.editor.set_status(&format!("Syncing {label}"));
            match self.executor.transfer(batch).await {
                Ok(()) => {
                    self.editor.set_status(&format!("Completed {label}"));
                    return SyncOutcome::Completed;
                }
                Err(err) => {
                    self.editor.set_status("Failed");
                    tracing::error!(error = %err, "transfer failed");
                    if self.config.quiet {
                        return SyncOutcome::FailedAccepted;
                    }
                    let retry = self
                        .editor
                        .confirm("Failed to sync all sources (see log). Retry?")
                        .await;
                    if !retry {
                        return SyncOutcome::FailedAccepted;
                    }
                }
            }
        }
    }

    /// Watch for the executor's drain signal and surface a delayed "Done"
    /// status once everything queued has finished.
    fn spawn_drain_watch(&self) {
        let executor = Arc::clone(&self.executor);
        let editor = Arc::clone(&self.editor);
        tokio::spawn(async move {
            executor.drained().await;
            tracing::info!("all transfer tasks finished");
            tokio::time::sleep(DONE_STATUS_DELAY).await;
            editor.set_status("Done");
        });
    }
}

fn pluralize(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("1 {noun}")
    } else {
        format!("{count} {noun}s")
    }
}
