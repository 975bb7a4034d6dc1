//! # tether-engine
//!
//! Sync orchestration: eligibility filtering, save-before-sync pausing,
//! batching, and the interactive retry loop around a transfer executor.
//!
//! The engine talks to the outside world through two traits: [`EditorHost`]
//! (statuses, prompts, saves) and [`TransferExecutor`] (the actual remote
//! transfer, treated as a black box). Build a [`SyncOrchestrator`] per
//! workspace root; orchestrators are independent and share no state.

pub mod boundary;
pub mod error;
pub mod filter;
pub mod orchestrator;
pub mod pause;
pub mod rsync;
pub mod throttle;

#[cfg(test)]
pub(crate) mod testing;

pub use boundary::{EditorHost, TransferExecutor};
pub use error::EngineError;
pub use filter::SourceFilter;
pub use orchestrator::{SyncOrchestrator, SyncOutcome};
pub use pause::PauseRegistry;
pub use rsync::RsyncExecutor;
pub use throttle::{Throttle, SAVE_BURST_WINDOW};
