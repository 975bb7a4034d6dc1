//! Source eligibility filtering.
//!
//! Turns a batch of candidate documents into the workspace-relative paths
//! that will actually be transferred, triggering save-before-sync side
//! effects for dirty documents along the way.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tether_core::{Document, SourcePath, SyncConfig};

use crate::boundary::EditorHost;
use crate::pause::PauseRegistry;

/// Outcome of the eligibility rules for one document.
#[derive(Debug, PartialEq, Eq)]
enum Decision {
    /// Transfer as-is.
    Include(SourcePath),
    /// Transfer, but pause the path and trigger a save first so the save
    /// notification the engine causes cannot re-enter the sync.
    IncludeAfterSave(SourcePath),
    /// Routine exclusion; not worth a log line.
    SkipSilently,
    /// Exclusion the user should know about.
    Skip(String),
}

pub struct SourceFilter {
    root: PathBuf,
    config: Arc<SyncConfig>,
    pauses: Arc<PauseRegistry>,
    editor: Arc<dyn EditorHost>,
}

impl SourceFilter {
    pub fn new(
        root: impl Into<PathBuf>,
        config: Arc<SyncConfig>,
        pauses: Arc<PauseRegistry>,
        editor: Arc<dyn EditorHost>,
    ) -> Self {
        Self {
            root: root.into(),
            config,
            pauses,
            editor,
        }
    }

    /// Apply the eligibility rules to each document and collect the batch.
    ///
    /// An empty result means "nothing to do" and must be treated as a
    /// silent no-op by callers, never as an error.
    pub fn filter(&self, documents: &[Document]) -> Vec<SourcePath> {
        let mut sources = Vec::new();
        for document in documents {
            match self.evaluate(document) {
                Decision::Include(source) => sources.push(source),
                Decision::IncludeAfterSave(source) => {
                    self.trigger_save(document);
                    sources.push(source);
                }
                Decision::SkipSilently => {}
                Decision::Skip(reason) => {
                    tracing::warn!(
                        path = %document.path.display(),
                        reason = %reason,
                        "skipping source",
                    );
                }
            }
        }
        sources
    }

    /// The rules run in this exact order; the first match wins.
    fn evaluate(&self, document: &Document) -> Decision {
        if document.is_untitled {
            return Decision::SkipSilently;
        }
        if !document.path.starts_with(&self.root) {
            return Decision::Skip(format!(
                "not in the workspace ({})",
                self.root.display()
            ));
        }
        if !document.path.exists() {
            return Decision::Skip("does not exist".to_owned());
        }
        if self.pauses.is_paused(&document.path) {
            // A save the engine itself triggered is already resolving this
            // document; re-entering here would loop.
            return Decision::SkipSilently;
        }
        if document.is_dirty {
            if self.config.dirty {
                return Decision::IncludeAfterSave(self.relative(&document.path));
            }
            return Decision::Skip(
                "dirty (unsaved) - set `dirty: true` to sync dirty files".to_owned(),
            );
        }
        Decision::Include(self.relative(&document.path))
    }

    /// Pause the path, ask the host to save, and unpause when the save
    /// settles. The unpause runs on every completion, success or failure;
    /// a path left paused would be excluded from syncing forever.
    fn trigger_save(&self, document: &Document) {
        self.pauses.pause(&document.path);
        tracing::info!(
            path = %document.path.display(),
            "saving dirty source before sync",
        );
        let pauses = Arc::clone(&self.pauses);
        let editor = Arc::clone(&self.editor);
        let path = document.path.clone();
        tokio::spawn(async move {
            let saved = editor.save(&path).await;
            if !saved {
                tracing::warn!(path = %path.display(), "save of dirty source failed");
            }
            pauses.unpause(&path);
        });
    }

    /// Map an absolute path to its workspace-relative form; the workspace
    /// root itself becomes the `"./"` sentinel.
    fn relative(&self, path: &Path) -> SourcePath {
        match path.strip_prefix(&self.root) {
            Ok(rel) if rel.as_os_str().is_empty() => SourcePath::workspace_root(),
            Ok(rel) => SourcePath(rel.to_string_lossy().into_owned()),
            // Unreachable after the workspace-containment rule, but the
            // sentinel is still the safest answer for the root itself.
            Err(_) => SourcePath::workspace_root(),
        }
    }
}
