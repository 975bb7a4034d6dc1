//! JSON newline-delimited wire protocol between an editor plugin and the
//! daemon.
//!
//! Editor → daemon messages are tagged by `cmd`; daemon → editor messages
//! by `type`. Prompt, save, and save-all round-trips correlate through the
//! `id` field: the daemon sends a message carrying an id, the editor
//! answers with the matching `*_reply`/`*_done` command.

use std::io::Write;
use std::os::unix::net::UnixStream;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use tether_core::Document;

use crate::error::{io_err, DaemonError};
use crate::paths::socket_path;

/// A document as the editor describes it on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentSpec {
    pub path: PathBuf,
    #[serde(default)]
    pub is_untitled: bool,
    #[serde(default)]
    pub is_dirty: bool,
}

impl From<DocumentSpec> for Document {
    fn from(spec: DocumentSpec) -> Self {
        Document {
            path: spec.path,
            is_untitled: spec.is_untitled,
            is_dirty: spec.is_dirty,
        }
    }
}

/// Editor → daemon.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum EditorRequest {
    /// Session handshake; must precede any sync command.
    Hello { root: PathBuf },
    /// A document-saved notification.
    Saved { document: DocumentSpec },
    /// Sync the given open documents.
    SyncOpen { documents: Vec<DocumentSpec> },
    /// Sync the whole workspace.
    SyncProject,
    /// Sync a sub-directory relative to the workspace root.
    SyncDirectory { dir: String },
    /// Answer to a `prompt` message.
    PromptReply { id: u64, accept: bool },
    /// Answer to a `save` message.
    SaveDone { id: u64, ok: bool },
    /// Answer to a `save_all` message.
    SaveAllDone { id: u64, ok: bool },
    /// Shut the daemon down.
    Stop,
}

/// Daemon → editor.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HostMessage {
    /// Transient status line for the editor to display.
    Status { message: String },
    /// Blocking yes/no prompt; answer with `prompt_reply`.
    Prompt { id: u64, message: String },
    /// Ask the editor to save one document; answer with `save_done`.
    Save { id: u64, path: PathBuf },
    /// Ask the editor to save everything; answer with `save_all_done`.
    SaveAll { id: u64 },
    /// A request could not be handled.
    Error { message: String },
}

/// Ask a running daemon to stop. Used by `tether daemon stop`.
pub fn request_stop(home: &Path) -> Result<(), DaemonError> {
    let socket = socket_path(home);
    if !socket.exists() {
        return Err(DaemonError::NotRunning { socket });
    }

    let mut stream = UnixStream::connect(&socket).map_err(|err| {
        if matches!(
            err.kind(),
            std::io::ErrorKind::NotFound
                | std::io::ErrorKind::ConnectionRefused
                | std::io::ErrorKind::ConnectionReset
        ) {
            DaemonError::NotRunning {
                socket: socket.clone(),
            }
        } else {
            io_err(&socket, err)
        }
    })?;

    let payload = serde_json::to_string(&EditorRequest::Stop)?;
    stream
        .write_all(payload.as_bytes())
        .map_err(|e| io_err(&socket, e))?;
    stream.write_all(b"\n").map_err(|e| io_err(&socket, e))?;
    stream.flush().map_err(|e| io_err(&socket, e))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requests_round_trip_through_their_cmd_tags() {
        let request: EditorRequest =
            serde_json::from_str(r#"{"cmd":"hello","root":"/work"}"#).expect("hello");
        assert!(matches!(request, EditorRequest::Hello { .. }));

        let request: EditorRequest = serde_json::from_str(
            r#"{"cmd":"saved","document":{"path":"/work/a.txt","is_dirty":true}}"#,
        )
        .expect("saved");
        match request {
            EditorRequest::Saved { document } => {
                assert!(document.is_dirty);
                assert!(!document.is_untitled);
            }
            other => panic!("expected Saved, got {other:?}"),
        }

        let request: EditorRequest =
            serde_json::from_str(r#"{"cmd":"sync_directory","dir":"src"}"#).expect("dir");
        assert!(matches!(request, EditorRequest::SyncDirectory { dir } if dir == "src"));

        let request: EditorRequest = serde_json::from_str(r#"{"cmd":"stop"}"#).expect("stop");
        assert!(matches!(request, EditorRequest::Stop));
    }

    #[test]
    fn host_messages_carry_their_type_tag() {
        let encoded = serde_json::to_value(HostMessage::Status {
            message: "Syncing 1 item".to_owned(),
        })
        .expect("encode");
        assert_eq!(encoded["type"], "status");

        let encoded = serde_json::to_value(HostMessage::Save {
            id: 7,
            path: PathBuf::from("/work/a.txt"),
        })
        .expect("encode");
        assert_eq!(encoded["type"], "save");
        assert_eq!(encoded["id"], 7);
    }

    #[test]
    fn document_spec_converts_to_core_document() {
        let spec = DocumentSpec {
            path: PathBuf::from("/work/a.txt"),
            is_untitled: false,
            is_dirty: true,
        };
        let document = Document::from(spec);
        assert_eq!(document.path, PathBuf::from("/work/a.txt"));
        assert!(document.is_dirty);
    }

    #[test]
    fn stop_against_a_missing_socket_is_not_running() {
        let home = tempfile::TempDir::new().expect("home");
        let err = request_stop(home.path()).expect_err("no daemon");
        assert!(matches!(err, DaemonError::NotRunning { .. }));
    }
}
