// SPDX-License-Identifier: MIT
// Copyright (c) 2026 TGDK Labs

//! Config file persistence: strict load, lenient load, atomic save.

use std::io::Write;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, warn};

use mb_core::ConfigSnapshot;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Read and parse the config file, clamping range-bound fields on ingest.
pub fn load_config(path: &Path) -> Result<ConfigSnapshot, ConfigError> {
    let text = std::fs::read_to_string(path)?;
    let snap: ConfigSnapshot = serde_json::from_str(&text)?;
    Ok(snap.clamped())
}

/// Load for startup: a missing file or a parse failure falls back to
/// defaults (logged at debug and warn respectively).
pub fn load_or_default(path: &Path) -> ConfigSnapshot {
    match load_config(path) {
        Ok(snap) => snap,
        Err(ConfigError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "no config file, using defaults");
            ConfigSnapshot::default()
        }
        Err(e) => {
            warn!(path = %path.display(), "config load failed ({e}), using defaults");
            ConfigSnapshot::default()
        }
    }
}

/// Persist atomically: write `<path>.tmp` with write-through, then rename
/// over the target. The temp file is removed on any failure.
pub fn save_config(path: &Path, snap: &ConfigSnapshot) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let tmp = path.with_extension("json.tmp");
    let result = write_and_rename(&tmp, path, snap);
    if result.is_err() {
        let _ = std::fs::remove_file(&tmp);
    }
    result
}

fn write_and_rename(tmp: &Path, path: &Path, snap: &ConfigSnapshot) -> Result<(), ConfigError> {
    let text = serde_json::to_string_pretty(snap)?;
    let mut file = std::fs::File::create(tmp)?;
    file.write_all(text.as_bytes())?;
    file.write_all(b"\n")?;
    file.sync_all()?;
    drop(file);
    std::fs::rename(tmp, path)?;
    Ok(())
}

#[cfg(test)]
#[path = "persist_tests.rs"]
mod tests;
