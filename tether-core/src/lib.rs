//! Tether core library — domain types, sync configuration, errors.
//!
//! Public API surface:
//! - [`types`] — document snapshots, source paths, trigger tags
//! - [`config`] — [`SyncConfig`] load / init
//! - [`error`] — [`ConfigError`]

pub mod config;
pub mod error;
pub mod types;

pub use config::{InitOutcome, SyncConfig};
pub use error::ConfigError;
pub use types::{Document, SourcePath, Trigger, WORKSPACE_ROOT};
