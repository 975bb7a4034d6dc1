//! `tether daemon start|stop`

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;

#[derive(Subcommand, Debug)]
pub enum DaemonCommand {
    /// Run the editor bridge daemon in the foreground.
    Start,
    /// Ask a running daemon to shut down.
    Stop,
}

pub fn run(command: DaemonCommand) -> Result<()> {
    let home = dirs::home_dir().context("could not determine home directory")?;
    match command {
        DaemonCommand::Start => {
            tether_daemon::start_blocking(&home).context("daemon exited with an error")
        }
        DaemonCommand::Stop => {
            tether_daemon::request_stop(&home).context("failed to stop daemon")?;
            println!("{} Daemon stopping", "✓".green());
            Ok(())
        }
    }
}
