//! Domain types shared by the engine and the editor bridge.
//!
//! All absolute filesystem paths use `PathBuf`; workspace-relative paths
//! handed to the transfer executor use the [`SourcePath`] newtype because
//! they carry the `"./"` root sentinel, which is not a meaningful `Path`.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Sentinel source for the workspace root itself. A naive relative-path
/// computation would yield `""` here, indistinguishable from "no path".
pub const WORKSPACE_ROOT: &str = "./";

// ---------------------------------------------------------------------------
// SourcePath
// ---------------------------------------------------------------------------

/// A workspace-root-relative path eligible for transfer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourcePath(pub String);

impl SourcePath {
    /// The `"./"` sentinel used for whole-workspace sync.
    pub fn workspace_root() -> Self {
        Self(WORKSPACE_ROOT.to_owned())
    }

    pub fn is_workspace_root(&self) -> bool {
        self.0 == WORKSPACE_ROOT
    }
}

impl fmt::Display for SourcePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for SourcePath {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for SourcePath {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Document
// ---------------------------------------------------------------------------

/// Snapshot of a host-editor document at event time.
///
/// The editor owns the document lifecycle; the engine only reads these
/// flags and asks the host to save through the editor boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Absolute filesystem path.
    pub path: PathBuf,
    #[serde(default)]
    pub is_untitled: bool,
    #[serde(default)]
    pub is_dirty: bool,
}

impl Document {
    /// A synthetic document for something already on disk (a directory
    /// sync target): never untitled, never dirty.
    pub fn on_disk(path: PathBuf) -> Self {
        Self {
            path,
            is_untitled: false,
            is_dirty: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Trigger
// ---------------------------------------------------------------------------

/// Why a sync cycle was requested. Carried on every trigger so logs can
/// tell saves the engine forced apart from organic editor events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// An editor "document saved" notification.
    Save,
    /// The "sync open documents" command.
    OpenDocuments,
    /// The "sync whole project" command.
    Project,
    /// The "sync a sub-directory" command.
    Directory,
}

impl Trigger {
    pub fn label(&self) -> &'static str {
        match self {
            Trigger::Save => "save",
            Trigger::OpenDocuments => "open-documents",
            Trigger::Project => "project",
            Trigger::Directory => "directory",
        }
    }
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
