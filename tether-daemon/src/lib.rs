//! Editor bridge daemon: a Unix-socket JSON-lines server.
//!
//! Each accepted connection is one editor session with its own
//! orchestrator, so multiple workspace roots can sync side by side without
//! sharing any pause state.

mod error;
mod host;
pub mod paths;
pub mod protocol;
mod runtime;

pub use error::DaemonError;
pub use host::SocketEditorHost;
pub use protocol::{request_stop, DocumentSpec, EditorRequest, HostMessage};
pub use runtime::{run, start_blocking};
