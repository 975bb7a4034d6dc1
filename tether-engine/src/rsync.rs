//! Rsync-backed transfer executor.
//!
//! Shells out to `rsync` over ssh, one invocation per source. The engine
//! treats this as a black box: a batch either fully succeeds or fails as a
//! whole, and a separate drain signal fires when every queued transfer
//! (across batches) has finished.

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use tokio::process::Command;
use tokio::sync::Notify;

use tether_core::{SourcePath, SyncConfig};

use crate::boundary::TransferExecutor;
use crate::error::EngineError;

pub struct RsyncExecutor {
    config: Arc<SyncConfig>,
    inflight: Inflight,
}

impl RsyncExecutor {
    pub fn new(config: Arc<SyncConfig>) -> Self {
        Self {
            config,
            inflight: Inflight::default(),
        }
    }

    async fn run_rsync(&self, source: &SourcePath) -> Result<(), EngineError> {
        let args = build_args(&self.config, source);
        tracing::debug!(source = %source, ?args, "invoking rsync");

        let output = Command::new("rsync")
            .args(&args)
            .output()
            .await
            .map_err(|e| EngineError::Spawn {
                command: "rsync".to_owned(),
                source: e,
            })?;

        if self.config.verbose && !output.stdout.is_empty() {
            tracing::info!(
                source = %source,
                output = %String::from_utf8_lossy(&output.stdout),
                "rsync output",
            );
        }

        if !output.status.success() {
            tracing::warn!(
                source = %source,
                status = %output.status,
                stderr = %String::from_utf8_lossy(&output.stderr),
                "rsync exited with failure",
            );
            return Err(EngineError::Transfer {
                failed: 1,
                total: 1,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl TransferExecutor for RsyncExecutor {
    async fn transfer(&self, sources: &[SourcePath]) -> Result<(), EngineError> {
        self.inflight.enter(sources.len());
        let mut failed = 0usize;
        for source in sources {
            let result = self.run_rsync(source).await;
            self.inflight.leave();
            if result.is_err() {
                failed += 1;
            }
        }

        if failed > 0 {
            Err(EngineError::Transfer {
                failed,
                total: sources.len(),
            })
        } else {
            Ok(())
        }
    }

    async fn drained(&self) {
        self.inflight.drained().await;
    }
}

/// Build the rsync argument list for one source.
///
/// The `"./"` sentinel transfers the whole local root; a relative source
/// lands under `<dest>/<parent-of-source>/` so nested paths keep their
/// layout on the remote.
fn build_args(config: &SyncConfig, source: &SourcePath) -> Vec<String> {
    let mut args = vec!["-az".to_owned()];
    if config.verbose {
        args.push("-v".to_owned());
    }
    for pattern in &config.exclude {
        args.push("--exclude".to_owned());
        args.push(pattern.clone());
    }
    args.extend(config.flags.split_whitespace().map(str::to_owned));
    args.push("-e".to_owned());
    args.push(format!("ssh -p {}", config.port));

    let local_root = config.local.trim_end_matches('/');
    let dest_root = config.dest.trim_end_matches('/');

    let (local, remote_dir) = if source.is_workspace_root() {
        (format!("{local_root}/"), format!("{dest_root}/"))
    } else {
        let parent = Path::new(&source.0)
            .parent()
            .map(|p| p.to_string_lossy().into_owned())
            .unwrap_or_default();
        let remote_dir = if parent.is_empty() {
            format!("{dest_root}/")
        } else {
            format!("{dest_root}/{parent}/")
        };
        (format!("{local_root}/{}", source.0), remote_dir)
    };

    let remote = if config.user.is_empty() {
        format!("{}:{remote_dir}", config.host)
    } else {
        format!("{}@{}:{remote_dir}", config.user, config.host)
    };

    args.push(local);
    args.push(remote);
    args
}

/// Count of transfers currently queued or running, with a notification
/// when the count returns to zero.
#[derive(Debug, Default)]
struct Inflight {
    count: Mutex<usize>,
    zero: Notify,
}

impl Inflight {
    fn enter(&self, n: usize) {
        *self.count() += n;
    }

    fn leave(&self) {
        let mut count = self.count();
        *count = count.saturating_sub(1);
        if *count == 0 {
            self.zero.notify_waiters();
        }
    }

    async fn drained(&self) {
        loop {
            // Register before checking so a decrement between the check
            // and the await cannot be missed.
            let notified = self.zero.notified();
            if *self.count() == 0 {
                return;
            }
            notified.await;
        }
    }

    fn count(&self) -> MutexGuard<'_, usize> {
        self.count
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn config() -> SyncConfig {
        SyncConfig {
            host: "remote.example".to_owned(),
            dest: "/srv/site".to_owned(),
            local: "/work/project".to_owned(),
            user: "deploy".to_owned(),
            port: 2222,
            exclude: vec![".git".to_owned()],
            ..SyncConfig::default()
        }
    }

    #[test]
    fn args_for_a_top_level_file() {
        let args = build_args(&config(), &SourcePath::from("a.txt"));
        assert_eq!(args[0], "-az");
        assert!(args.contains(&"--exclude".to_owned()));
        assert!(args.contains(&".git".to_owned()));
        assert!(args.contains(&"ssh -p 2222".to_owned()));
        assert_eq!(args[args.len() - 2], "/work/project/a.txt");
        assert_eq!(args[args.len() - 1], "deploy@remote.example:/srv/site/");
    }

    #[test]
    fn args_for_a_nested_file_keep_the_remote_layout() {
        let args = build_args(&config(), &SourcePath::from("src/deep/main.rs"));
        assert_eq!(args[args.len() - 2], "/work/project/src/deep/main.rs");
        assert_eq!(
            args[args.len() - 1],
            "deploy@remote.example:/srv/site/src/deep/"
        );
    }

    #[test]
    fn args_for_the_workspace_root_sentinel() {
        let args = build_args(&config(), &SourcePath::workspace_root());
        assert_eq!(args[args.len() - 2], "/work/project/");
        assert_eq!(args[args.len() - 1], "deploy@remote.example:/srv/site/");
    }

    #[test]
    fn empty_user_omits_the_at_sign() {
        let mut config = config();
        config.user = String::new();
        let args = build_args(&config, &SourcePath::from("a.txt"));
        assert_eq!(args[args.len() - 1], "remote.example:/srv/site/");
    }

    #[test]
    fn extra_flags_and_verbose_are_passed_through() {
        let mut config = config();
        config.verbose = true;
        config.flags = "--delete --chmod=D755".to_owned();
        let args = build_args(&config, &SourcePath::from("a.txt"));
        assert!(args.contains(&"-v".to_owned()));
        assert!(args.contains(&"--delete".to_owned()));
        assert!(args.contains(&"--chmod=D755".to_owned()));
    }

    #[tokio::test]
    async fn drained_resolves_immediately_when_nothing_is_queued() {
        let inflight = Inflight::default();
        tokio::time::timeout(Duration::from_millis(50), inflight.drained())
            .await
            .expect("drained should resolve with an empty queue");
    }

    #[tokio::test]
    async fn drained_waits_for_the_count_to_return_to_zero() {
        let inflight = Arc::new(Inflight::default());
        inflight.enter(2);

        let waiter = {
            let inflight = Arc::clone(&inflight);
            tokio::spawn(async move { inflight.drained().await })
        };

        inflight.leave();
        assert!(!waiter.is_finished(), "one transfer still queued");

        inflight.leave();
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("drained should resolve once the queue empties")
            .expect("waiter task");
    }
}
