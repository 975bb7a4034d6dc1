//! The editor boundary, backed by one socket connection.
//!
//! Statuses are fire-and-forget; prompts and saves are request/response
//! pairs correlated by id through a pending map of oneshot senders. A
//! dropped connection resolves every outstanding request to `false`, which
//! the engine treats as "declined" / "save failed" — never as a crash.

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};

use tether_engine::EditorHost;

use crate::protocol::HostMessage;

pub struct SocketEditorHost {
    outbound: mpsc::Sender<HostMessage>,
    pending: Mutex<HashMap<u64, oneshot::Sender<bool>>>,
    next_id: AtomicU64,
}

impl SocketEditorHost {
    pub fn new(outbound: mpsc::Sender<HostMessage>) -> Self {
        Self {
            outbound,
            pending: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Answer an outstanding prompt/save request. Unknown ids are logged
    /// and dropped; the editor may answer a prompt that already timed out
    /// with the connection.
    pub fn resolve(&self, id: u64, answer: bool) {
        let sender = self.pending_map().remove(&id);
        match sender {
            Some(sender) => {
                let _ = sender.send(answer);
            }
            None => tracing::warn!(id, "reply for unknown request id"),
        }
    }

    /// Resolve every outstanding request to `false`. Called when the
    /// connection goes away so suspended sync cycles finish instead of
    /// waiting forever for an answer that cannot arrive.
    pub fn abort_pending(&self) {
        let pending: Vec<_> = self.pending_map().drain().collect();
        for (_, sender) in pending {
            let _ = sender.send(false);
        }
    }

    async fn request(&self, make: impl FnOnce(u64) -> HostMessage) -> bool {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let (tx, rx) = oneshot::channel();
        self.pending_map().insert(id, tx);

        if self.outbound.send(make(id)).await.is_err() {
            self.pending_map().remove(&id);
            return false;
        }
        rx.await.unwrap_or(false)
    }

    fn pending_map(&self) -> std::sync::MutexGuard<'_, HashMap<u64, oneshot::Sender<bool>>> {
        self.pending
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl EditorHost for SocketEditorHost {
    async fn save(&self, path: &Path) -> bool {
        let path = path.to_path_buf();
        self.request(|id| HostMessage::Save { id, path }).await
    }

    async fn save_all(&self) -> bool {
        self.request(|id| HostMessage::SaveAll { id }).await
    }

    fn set_status(&self, message: &str) {
        let message = HostMessage::Status {
            message: message.to_owned(),
        };
        if self.outbound.try_send(message).is_err() {
            tracing::debug!("dropping status for a slow or closed connection");
        }
    }

    async fn confirm(&self, message: &str) -> bool {
        let message = message.to_owned();
        self.request(|id| HostMessage::Prompt { id, message }).await
    }
}
