//! `tether sync` — one-shot sync driven from the terminal.
//!
//! The terminal stands in for the editor host: statuses print to stdout
//! and the retry prompt reads a y/N answer from stdin. There are no open
//! documents to save, so the save operations are trivially successful.

use std::io::BufRead;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use clap::Args;
use colored::Colorize;

use tether_core::{config, ConfigError, Trigger};
use tether_engine::{
    EditorHost, RsyncExecutor, SyncOrchestrator, SyncOutcome, TransferExecutor,
};

/// Arguments for `tether sync`.
#[derive(Args, Debug)]
pub struct SyncArgs {
    /// Sub-directory to sync, relative to the workspace root. Omit to
    /// sync the whole workspace.
    pub dir: Option<String>,

    /// Workspace root. Defaults to the current directory.
    #[arg(long, default_value = ".")]
    pub root: PathBuf,
}

impl SyncArgs {
    pub fn run(self) -> Result<()> {
        let root = self
            .root
            .canonicalize()
            .with_context(|| format!("cannot resolve root '{}'", self.root.display()))?;

        let config = match config::load(&root) {
            Ok(config) => Arc::new(config),
            Err(ConfigError::NotFound { path }) => {
                bail!(
                    "no sync configuration at {} — run `tether init` first",
                    path.display()
                );
            }
            Err(err) => return Err(err).context("failed to load sync configuration"),
        };

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .context("failed to build async runtime")?;

        let (dir, trigger) = match self.dir {
            Some(dir) => (dir, Trigger::Directory),
            None => (String::new(), Trigger::Project),
        };

        let editor: Arc<dyn EditorHost> = Arc::new(TerminalHost);
        let executor: Arc<dyn TransferExecutor> = Arc::new(RsyncExecutor::new(Arc::clone(&config)));
        let orchestrator = SyncOrchestrator::new(root, config, editor, executor);

        let outcome = runtime.block_on(orchestrator.sync_directory(&dir, trigger));
        match outcome {
            SyncOutcome::Completed => {
                println!("{} Sync complete", "✓".green());
                Ok(())
            }
            SyncOutcome::NothingToDo => {
                println!("{} Nothing to sync", "·".dimmed());
                Ok(())
            }
            SyncOutcome::FailedAccepted => bail!("sync failed (see output above)"),
            // One-shot runs never race a directory flush.
            SyncOutcome::Suppressed => bail!("sync was suppressed by an in-flight flush"),
        }
    }
}

/// Editor boundary for a terminal run.
struct TerminalHost;

#[async_trait]
impl EditorHost for TerminalHost {
    async fn save(&self, _path: &Path) -> bool {
        true
    }

    async fn save_all(&self) -> bool {
        true
    }

    fn set_status(&self, message: &str) {
        println!("{} {message}", "·".dimmed());
    }

    async fn confirm(&self, message: &str) -> bool {
        let message = message.to_owned();
        let answer = tokio::task::spawn_blocking(move || {
            print!("{} {message} [y/N] ", "?".yellow());
            use std::io::Write;
            let _ = std::io::stdout().flush();
            let mut line = String::new();
            match std::io::stdin().lock().read_line(&mut line) {
                Ok(_) => matches!(line.trim(), "y" | "Y" | "yes"),
                Err(_) => false,
            }
        })
        .await;
        answer.unwrap_or(false)
    }
}
