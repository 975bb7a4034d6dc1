//! Tether — keep a workspace mirrored onto a remote host.
//!
//! # Usage
//!
//! ```text
//! tether init [path]
//! tether sync [dir] [--root <path>]
//! tether daemon start|stop
//! ```

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{daemon::DaemonCommand, init::InitArgs, sync::SyncArgs};

#[derive(Parser, Debug)]
#[command(
    name = "tether",
    version,
    about = "Sync an editor workspace to a remote host over rsync",
    long_about = None,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Scaffold .tether/sync-config.json in a workspace.
    Init(InitArgs),

    /// Run one sync of the workspace (or a sub-directory) from the terminal.
    Sync(SyncArgs),

    /// Manage the editor bridge daemon.
    Daemon {
        #[command(subcommand)]
        command: DaemonCommand,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Init(args) => args.run(),
        Commands::Sync(args) => args.run(),
        Commands::Daemon { command } => commands::daemon::run(command),
    }
}
