//! Per-workspace JSON sync configuration.
//!
//! # Storage layout
//!
//! ```text
//! <workspace>/
//!   .tether/
//!     sync-config.json
//! ```
//!
//! The file uses camelCase keys (`onSave`, `host`, …) so a config written
//! by hand reads the same as the editor-side settings it mirrors. The
//! orchestration engine consumes `dirty` and `quiet` (plus `onSave` in the
//! daemon); everything else is passed through to the transfer executor
//! unchanged.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{io_err, ConfigError};

pub const CONFIG_DIR: &str = ".tether";
pub const CONFIG_FILE: &str = "sync-config.json";

/// Immutable snapshot of recognized sync options, loaded once per session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SyncConfig {
    /// Sync automatically on every editor save notification.
    pub on_save: bool,
    /// Remote host (hostname or IP).
    pub host: String,
    /// Destination path on the remote.
    pub dest: String,
    /// Local root to transfer from. Empty means the workspace root.
    pub local: String,
    /// Remote username. Empty means "let ssh decide".
    pub user: String,
    /// Remote ssh port.
    pub port: u16,
    /// Extra flags passed verbatim to the transfer command.
    pub flags: String,
    /// Log transfer command output in full.
    pub verbose: bool,
    /// Report failures via status/log only; never show a blocking prompt.
    pub quiet: bool,
    /// Save dirty documents before syncing instead of skipping them.
    pub dirty: bool,
    /// Exclude patterns handed to the transfer command.
    pub exclude: Vec<String>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            on_save: false,
            host: "localhost".to_owned(),
            dest: "/".to_owned(),
            local: String::new(),
            user: String::new(),
            port: 22,
            flags: String::new(),
            verbose: false,
            quiet: false,
            dirty: false,
            exclude: vec![
                ".tether".to_owned(),
                ".git".to_owned(),
                ".DS_Store".to_owned(),
            ],
        }
    }
}

/// Outcome of [`init`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InitOutcome {
    /// A fresh config file was written.
    Created { path: PathBuf },
    /// A config file was already present; nothing was overwritten.
    AlreadyExists { path: PathBuf },
}

/// `<root>/.tether/` — pure, no I/O.
pub fn config_dir(root: &Path) -> PathBuf {
    root.join(CONFIG_DIR)
}

/// `<root>/.tether/sync-config.json` — pure, no I/O.
pub fn config_path(root: &Path) -> PathBuf {
    config_dir(root).join(CONFIG_FILE)
}

/// Load the sync configuration for a workspace.
///
/// Returns [`ConfigError::NotFound`] if the file is absent and
/// [`ConfigError::Parse`] (with path context) if it is malformed. An empty
/// `local` field falls back to the workspace root.
pub fn load(root: &Path) -> Result<SyncConfig, ConfigError> {
    let path = config_path(root);
    if !path.exists() {
        return Err(ConfigError::NotFound { path });
    }
    let contents = std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
    let mut config: SyncConfig =
        serde_json::from_str(&contents).map_err(|e| ConfigError::Parse { path, source: e })?;
    if config.local.is_empty() {
        config.local = root.to_string_lossy().into_owned();
    }
    Ok(config)
}

/// Scaffold `.tether/sync-config.json` under `root` with defaults.
///
/// Never overwrites an existing config; callers decide how to surface
/// [`InitOutcome::AlreadyExists`].
pub fn init(root: &Path) -> Result<InitOutcome, ConfigError> {
    let dir = config_dir(root);
    if !dir.exists() {
        std::fs::create_dir_all(&dir).map_err(|e| io_err(&dir, e))?;
    }

    let path = config_path(root);
    if path.exists() {
        return Ok(InitOutcome::AlreadyExists { path });
    }

    let config = SyncConfig {
        local: root.to_string_lossy().into_owned(),
        user: std::env::var("USER").unwrap_or_default(),
        ..SyncConfig::default()
    };
    let contents = serde_json::to_string_pretty(&config)?;
    std::fs::write(&path, contents).map_err(|e| io_err(&path, e))?;
    Ok(InitOutcome::Created { path })
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn load_missing_config_is_not_found() {
        let root = TempDir::new().expect("root");
        let err = load(root.path()).expect_err("should be missing");
        assert!(matches!(err, ConfigError::NotFound { .. }));
    }

    #[test]
    fn load_malformed_config_is_parse_error_with_path() {
        let root = TempDir::new().expect("root");
        std::fs::create_dir_all(config_dir(root.path())).expect("mkdir");
        std::fs::write(config_path(root.path()), "{ not json").expect("write");

        let err = load(root.path()).expect_err("should fail to parse");
        match err {
            ConfigError::Parse { path, .. } => {
                assert_eq!(path, config_path(root.path()));
            }
            other => panic!("expected Parse, got {other:?}"),
        }
    }

    #[test]
    fn init_then_load_roundtrips_defaults() {
        let root = TempDir::new().expect("root");
        let outcome = init(root.path()).expect("init");
        assert!(matches!(outcome, InitOutcome::Created { .. }));

        let config = load(root.path()).expect("load");
        assert_eq!(config.host, "localhost");
        assert_eq!(config.port, 22);
        assert!(!config.on_save);
        assert_eq!(config.local, root.path().to_string_lossy());
    }

    #[test]
    fn init_never_overwrites_existing_config() {
        let root = TempDir::new().expect("root");
        init(root.path()).expect("first init");
        std::fs::write(config_path(root.path()), r#"{"host":"kept.example"}"#).expect("write");

        let outcome = init(root.path()).expect("second init");
        assert!(matches!(outcome, InitOutcome::AlreadyExists { .. }));
        let config = load(root.path()).expect("load");
        assert_eq!(config.host, "kept.example");
    }

    #[test]
    fn empty_local_falls_back_to_workspace_root() {
        let root = TempDir::new().expect("root");
        std::fs::create_dir_all(config_dir(root.path())).expect("mkdir");
        std::fs::write(config_path(root.path()), r#"{"host":"h"}"#).expect("write");

        let config = load(root.path()).expect("load");
        assert_eq!(config.local, root.path().to_string_lossy());
    }

    #[test]
    fn camel_case_keys_are_recognized() {
        let config: SyncConfig =
            serde_json::from_str(r#"{"onSave":true,"dirty":true,"quiet":true}"#).expect("parse");
        assert!(config.on_save);
        assert!(config.dirty);
        assert!(config.quiet);
    }
}
