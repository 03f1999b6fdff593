// SPDX-License-Identifier: MIT
// Copyright (c) 2026 TGDK Labs

//! Centralized environment variable access and path resolution.

use std::path::{Path, PathBuf};
use std::time::Duration;

/// Bridge version string.
pub const BRIDGE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Host root: `MB_ROOT` override, else the current directory.
pub fn root_dir() -> PathBuf {
    match std::env::var("MB_ROOT") {
        Ok(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => PathBuf::from("."),
    }
}

/// The persisted config file under the host root.
pub fn config_path(root: &Path) -> PathBuf {
    root.join("r6").join("config").join("MirrorBlade.json")
}

/// Optional boot script sitting next to the config file.
pub fn bootscript_path(root: &Path) -> PathBuf {
    root.join("r6").join("config").join("config.json")
}

pub fn logs_dir(root: &Path) -> PathBuf {
    root.join("r6").join("logs")
}

/// Directory for the IPC endpoint:
/// `MB_SOCKET_DIR` > `$XDG_RUNTIME_DIR/mirrorblade` > `/tmp/mirrorblade-$USER`.
pub fn socket_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("MB_SOCKET_DIR") {
        if !dir.is_empty() {
            return PathBuf::from(dir);
        }
    }
    if let Ok(runtime) = std::env::var("XDG_RUNTIME_DIR") {
        if !runtime.is_empty() {
            return PathBuf::from(runtime).join("mirrorblade");
        }
    }
    let user = std::env::var("USER").unwrap_or_else(|_| "default".to_string());
    std::env::temp_dir().join(format!("mirrorblade-{user}"))
}

/// Endpoint path for a pipe name from the config store.
pub fn socket_path(pipe_name: &str) -> PathBuf {
    socket_dir().join(format!("{pipe_name}.sock"))
}

/// Config watcher poll interval (default 250 ms, `MB_POLL_MS` override).
pub fn poll_interval() -> Duration {
    millis_var("MB_POLL_MS", 250)
}

/// Consecutive stable polls before a reload commits (default 4).
pub fn debounce_polls() -> u32 {
    std::env::var("MB_DEBOUNCE_POLLS")
        .ok()
        .and_then(|s| s.parse::<u32>().ok())
        .filter(|&n| n > 0)
        .unwrap_or(4)
}

/// Backoff before retrying a failed endpoint bind (default 500 ms).
pub fn retry_delay() -> Duration {
    millis_var("MB_RETRY_MS", 500)
}

/// Log file size that triggers rotation at startup (default 4 MiB).
pub fn log_rotate_limit() -> u64 {
    std::env::var("MB_LOG_ROTATE_BYTES")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(4 * 1024 * 1024)
}

fn millis_var(name: &str, default_ms: u64) -> Duration {
    std::env::var(name)
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or(Duration::from_millis(default_ms))
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
