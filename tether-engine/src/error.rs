//! Error types for tether-engine.

use thiserror::Error;

/// All errors that can arise from orchestration and transfer execution.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The transfer command could not be spawned at all.
    #[error("failed to spawn transfer command '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// One or more sources in a batch failed to transfer.
    #[error("transfer failed for {failed} of {total} source(s)")]
    Transfer { failed: usize, total: usize },
}
