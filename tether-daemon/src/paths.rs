use std::path::{Path, PathBuf};

pub const DAEMON_SOCKET: &str = "daemon.sock";

/// `<home>/.tether/` — daemon runtime state, distinct from the
/// per-workspace `.tether/` config directory.
pub fn tether_root(home: &Path) -> PathBuf {
    home.join(".tether")
}

pub fn socket_path(home: &Path) -> PathBuf {
    tether_root(home).join(DAEMON_SOCKET)
}
