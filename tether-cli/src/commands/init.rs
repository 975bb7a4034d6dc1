//! `tether init [path]`

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use tether_core::config::{self, InitOutcome};

/// Scaffold a sync configuration for a workspace.
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Workspace root to initialize. Defaults to the current directory.
    #[arg(default_value = ".")]
    pub path: PathBuf,
}

impl InitArgs {
    pub fn run(self) -> Result<()> {
        let root = self
            .path
            .canonicalize()
            .with_context(|| format!("cannot resolve path '{}'", self.path.display()))?;

        match config::init(&root).with_context(|| {
            format!("failed to initialize configuration in '{}'", root.display())
        })? {
            InitOutcome::Created { path } => {
                println!("{} Created {}", "✓".green(), path.display());
                println!("  Edit it to point at your remote, then sync away.");
            }
            InitOutcome::AlreadyExists { path } => {
                println!(
                    "{} Configuration already exists at {}",
                    "!".yellow(),
                    path.display()
                );
            }
        }
        Ok(())
    }
}
