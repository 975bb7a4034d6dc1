//! Collaborator boundaries: the host editor and the transfer executor.
//!
//! Both are object-safe async traits so the orchestrator can hold
//! `Arc<dyn …>` and tests can substitute scripted fakes.

use std::path::Path;

use async_trait::async_trait;

use tether_core::SourcePath;

use crate::error::EngineError;

/// The host-editor shell: statuses, prompts, and save operations.
///
/// Save results are plain booleans rather than `Result` on purpose: the
/// engine must run its unpause bookkeeping on *every* save completion,
/// success or failure, and a boolean leaves no early-return path that
/// could skip it.
#[async_trait]
pub trait EditorHost: Send + Sync {
    /// Ask the host to save one document. Resolves when the save settles.
    async fn save(&self, path: &Path) -> bool;

    /// Ask the host to save every open document. Resolves when done.
    async fn save_all(&self) -> bool;

    /// Show a transient status line.
    fn set_status(&self, message: &str);

    /// Blocking yes/no prompt. `true` means the user accepted.
    async fn confirm(&self, message: &str) -> bool;
}

/// The remote-transfer executor, a black box from the engine's side.
#[async_trait]
pub trait TransferExecutor: Send + Sync {
    /// Transfer a batch of workspace-relative sources. Resolves with the
    /// eventual overall success or failure of the batch.
    async fn transfer(&self, sources: &[SourcePath]) -> Result<(), EngineError>;

    /// Resolves when every currently queued transfer has drained. This is
    /// decoupled from any single [`transfer`](TransferExecutor::transfer)
    /// call.
    async fn drained(&self);
}
