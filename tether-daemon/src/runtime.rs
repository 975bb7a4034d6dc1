use std::fs;
use std::io::ErrorKind;
use std::os::unix::net::UnixStream as StdUnixStream;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::unix::OwnedWriteHalf;
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::{broadcast, mpsc};

use tether_core::{config, Document, Trigger};
use tether_engine::{EditorHost, RsyncExecutor, SyncOrchestrator, Throttle, TransferExecutor};

use crate::error::{io_err, DaemonError};
use crate::host::SocketEditorHost;
use crate::paths::{socket_path, tether_root};
use crate::protocol::{EditorRequest, HostMessage};

/// Start the daemon runtime and block the current thread until it exits.
pub fn start_blocking(home: &Path) -> Result<(), DaemonError> {
    init_tracing();
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| io_err("tokio-runtime", e))?;
    runtime.block_on(run(home.to_path_buf()))
}

/// Run the daemon runtime: accept editor connections until stopped.
pub async fn run(home: PathBuf) -> Result<(), DaemonError> {
    let root = tether_root(&home);
    if !root.exists() {
        fs::create_dir_all(&root).map_err(|e| io_err(&root, e))?;
    }

    let socket = socket_path(&home);
    prepare_socket_for_bind(&socket)?;
    let listener = UnixListener::bind(&socket).map_err(|e| io_err(&socket, e))?;
    set_socket_permissions(&socket)?;
    tracing::info!(socket = %socket.display(), "daemon listening");

    let (shutdown_tx, mut shutdown_rx) = broadcast::channel::<()>(16);

    loop {
        tokio::select! {
            _ = shutdown_rx.recv() => break,
            signal = tokio::signal::ctrl_c() => {
                match signal {
                    Ok(()) => {
                        tracing::info!("received ctrl-c, shutting down daemon");
                        break;
                    }
                    Err(err) => {
                        return Err(DaemonError::Protocol(format!(
                            "ctrl-c handler failed: {err}"
                        )));
                    }
                }
            }
            accepted = listener.accept() => {
                let (stream, _) = accepted.map_err(|e| io_err(&socket, e))?;
                let shutdown_tx = shutdown_tx.clone();
                tokio::spawn(async move {
                    if let Err(err) = handle_session(stream, shutdown_tx).await {
                        tracing::error!(error = %err, "editor session error");
                    }
                });
            }
        }
    }

    if socket.exists() {
        let _ = fs::remove_file(&socket);
    }
    Ok(())
}

/// One connected editor. Built on the `hello` handshake; sync commands
/// before the handshake are rejected.
struct Session {
    root: PathBuf,
    on_save: bool,
    orchestrator: Option<Arc<SyncOrchestrator>>,
    throttle: Throttle,
    host: Arc<SocketEditorHost>,
}

impl Session {
    fn open(root: PathBuf, host: Arc<SocketEditorHost>) -> Self {
        let (on_save, orchestrator) = match config::load(&root) {
            Ok(config) => {
                let config = Arc::new(config);
                let executor: Arc<dyn TransferExecutor> =
                    Arc::new(RsyncExecutor::new(Arc::clone(&config)));
                let orchestrator = Arc::new(SyncOrchestrator::new(
                    root.clone(),
                    Arc::clone(&config),
                    Arc::clone(&host) as Arc<dyn EditorHost>,
                    executor,
                ));
                tracing::info!(root = %root.display(), on_save = config.on_save, "session configured");
                (config.on_save, Some(orchestrator))
            }
            Err(err) => {
                tracing::warn!(
                    root = %root.display(),
                    error = %err,
                    "session has no usable sync configuration",
                );
                (false, None)
            }
        };
        Self {
            root,
            on_save,
            orchestrator,
            throttle: Throttle::default(),
            host,
        }
    }

    fn handle(&self, request: EditorRequest) {
        match request {
            EditorRequest::Saved { document } => {
                // Without config there is nothing to do; the original
                // save was an organic editor action, not a command worth
                // prompting over.
                let Some(orchestrator) = &self.orchestrator else {
                    return;
                };
                if !self.on_save {
                    return;
                }
                if !self.throttle.admit() {
                    tracing::debug!(path = %document.path.display(), "save burst trigger dropped");
                    return;
                }
                spawn_sync(
                    Arc::clone(orchestrator),
                    vec![document.into()],
                    Trigger::Save,
                );
            }
            EditorRequest::SyncOpen { documents } => match &self.orchestrator {
                Some(orchestrator) => {
                    let documents: Vec<Document> =
                        documents.into_iter().map(Document::from).collect();
                    spawn_sync(Arc::clone(orchestrator), documents, Trigger::OpenDocuments);
                }
                None => self.offer_init(),
            },
            EditorRequest::SyncProject => match &self.orchestrator {
                Some(orchestrator) => {
                    spawn_sync_directory(Arc::clone(orchestrator), String::new(), Trigger::Project)
                }
                None => self.offer_init(),
            },
            EditorRequest::SyncDirectory { dir } => match &self.orchestrator {
                Some(orchestrator) => {
                    spawn_sync_directory(Arc::clone(orchestrator), dir, Trigger::Directory)
                }
                None => self.offer_init(),
            },
            // Handshake and reply commands are handled by the read loop.
            EditorRequest::Hello { .. }
            | EditorRequest::PromptReply { .. }
            | EditorRequest::SaveDone { .. }
            | EditorRequest::SaveAllDone { .. }
            | EditorRequest::Stop => {}
        }
    }

    /// Surface the missing-configuration prompt for one triggered command
    /// and scaffold a config if the user accepts. The command itself
    /// performs no sync in this state.
    fn offer_init(&self) {
        let host = Arc::clone(&self.host);
        let root = self.root.clone();
        tokio::spawn(async move {
            let message = format!(
                "Cannot find sync configuration for {}. Initialize it?",
                root.display()
            );
            if !host.confirm(&message).await {
                return;
            }
            match config::init(&root) {
                Ok(config::InitOutcome::Created { path }) => {
                    host.set_status(&format!(
                        "Created {}; edit it and reconnect",
                        path.display()
                    ));
                }
                Ok(config::InitOutcome::AlreadyExists { path }) => {
                    host.set_status(&format!(
                        "Configuration already exists at {}; fix it and reconnect",
                        path.display()
                    ));
                }
                Err(err) => {
                    tracing::error!(error = %err, "failed to scaffold sync configuration");
                    host.set_status("Failed to create configuration (see log)");
                }
            }
        });
    }
}

/// Sync cycles run in their own tasks so prompt and save replies arriving
/// on the same connection can still be read while a cycle is suspended.
fn spawn_sync(orchestrator: Arc<SyncOrchestrator>, documents: Vec<Document>, trigger: Trigger) {
    tokio::spawn(async move {
        let outcome = orchestrator.sync_documents(&documents, trigger).await;
        tracing::info!(trigger = trigger.label(), ?outcome, "sync cycle finished");
    });
}

fn spawn_sync_directory(orchestrator: Arc<SyncOrchestrator>, dir: String, trigger: Trigger) {
    tokio::spawn(async move {
        let outcome = orchestrator.sync_directory(&dir, trigger).await;
        tracing::info!(trigger = trigger.label(), dir = %dir, ?outcome, "sync cycle finished");
    });
}

async fn handle_session(
    stream: UnixStream,
    shutdown_tx: broadcast::Sender<()>,
) -> Result<(), DaemonError> {
    let (reader, writer) = stream.into_split();
    let (out_tx, out_rx) = mpsc::channel::<HostMessage>(64);
    tokio::spawn(async move {
        if let Err(err) = write_outbound(writer, out_rx).await {
            tracing::debug!(error = %err, "session writer closed");
        }
    });

    let host = Arc::new(SocketEditorHost::new(out_tx.clone()));
    let mut session: Option<Session> = None;

    let mut lines = BufReader::new(reader).lines();
    while let Some(line) = lines
        .next_line()
        .await
        .map_err(|e| io_err("session socket read", e))?
    {
        if line.trim().is_empty() {
            continue;
        }

        let request: EditorRequest = match serde_json::from_str(&line) {
            Ok(request) => request,
            Err(err) => {
                let _ = out_tx
                    .send(HostMessage::Error {
                        message: format!("invalid request JSON: {err}"),
                    })
                    .await;
                continue;
            }
        };

        match request {
            EditorRequest::Hello { root } => {
                session = Some(Session::open(root, Arc::clone(&host)));
            }
            EditorRequest::PromptReply { id, accept } => host.resolve(id, accept),
            EditorRequest::SaveDone { id, ok } => host.resolve(id, ok),
            EditorRequest::SaveAllDone { id, ok } => host.resolve(id, ok),
            EditorRequest::Stop => {
                let _ = shutdown_tx.send(());
                break;
            }
            other => match &session {
                Some(session) => session.handle(other),
                None => {
                    let _ = out_tx
                        .send(HostMessage::Error {
                            message: "send `hello` with your workspace root first".to_owned(),
                        })
                        .await;
                }
            },
        }
    }

    // Pending prompts and saves can never be answered now; resolve them
    // to "declined" so suspended sync cycles finish instead of leaking.
    host.abort_pending();
    Ok(())
}

async fn write_outbound(
    mut writer: OwnedWriteHalf,
    mut out_rx: mpsc::Receiver<HostMessage>,
) -> Result<(), DaemonError> {
    while let Some(message) = out_rx.recv().await {
        let payload = serde_json::to_string(&message)?;
        writer
            .write_all(payload.as_bytes())
            .await
            .map_err(|e| io_err("session socket write", e))?;
        writer
            .write_all(b"\n")
            .await
            .map_err(|e| io_err("session socket write", e))?;
        writer
            .flush()
            .await
            .map_err(|e| io_err("session socket flush", e))?;
    }
    Ok(())
}

fn prepare_socket_for_bind(socket: &Path) -> Result<(), DaemonError> {
    if !socket.exists() {
        return Ok(());
    }

    match StdUnixStream::connect(socket) {
        Ok(_) => {
            return Err(DaemonError::Protocol(format!(
                "daemon socket already in use: {}",
                socket.display()
            )));
        }
        Err(err) => {
            tracing::warn!(
                socket = %socket.display(),
                error = %err,
                "removing stale daemon socket before bind",
            );
        }
    }

    match fs::remove_file(socket) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
        Err(err) => Err(io_err(socket, err)),
    }
}

fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).with_target(false).try_init();
}

fn set_socket_permissions(path: &Path) -> Result<(), DaemonError> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600)).map_err(|e| io_err(path, e))
}
