//! Control socket configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Control socket settings shared by the daemon and `notifyctl`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlConfig {
    /// Unix socket path. Defaults to `$XDG_RUNTIME_DIR/notifyd.sock`.
    #[serde(default)]
    pub socket_path: Option<PathBuf>,
    /// Longest accepted request line in bytes.
    #[serde(default = "default_max_request_bytes")]
    pub max_request_bytes: usize,
}

impl ControlConfig {
    /// The socket path to bind or connect to.
    pub fn resolved_socket_path(&self) -> PathBuf {
        self.socket_path.clone().unwrap_or_else(default_socket_path)
    }
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            socket_path: None,
            max_request_bytes: default_max_request_bytes(),
        }
    }
}

/// `$XDG_RUNTIME_DIR/notifyd.sock`, or `/tmp/notifyd.sock` without a runtime dir.
pub fn default_socket_path() -> PathBuf {
    let runtime_dir = std::env::var("XDG_RUNTIME_DIR").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(runtime_dir).join("notifyd.sock")
}

fn default_max_request_bytes() -> usize {
    64 * 1024
}
