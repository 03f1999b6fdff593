// SPDX-License-Identifier: MIT
// Copyright (c) 2026 TGDK Labs

//! Logging setup: leveled file log with startup size rotation and a
//! runtime-reloadable filter.

use std::path::Path;
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::reload;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Registry;

use mb_core::LogLevel;

use crate::sinks::LogSink;

const LOG_FILE: &str = "mirrorblade.log";
const ROTATED_FILE: &str = "mirrorblade.log.1";

/// Runtime handle for the active filter. Cloneable; doubles as the default
/// log sink.
#[derive(Clone)]
pub struct LogController {
    handle: reload::Handle<EnvFilter, Registry>,
}

impl LogController {
    pub fn set_level(&self, level: LogLevel) {
        if let Err(e) = self.handle.reload(filter_for(level)) {
            tracing::warn!("log level reload failed: {e}");
        }
    }
}

impl LogSink for LogController {
    fn set_level(&self, level: LogLevel) {
        LogController::set_level(self, level);
    }
}

/// Keeps the non-blocking writer alive; drop last on shutdown.
pub struct LogGuard {
    _worker: tracing_appender::non_blocking::WorkerGuard,
}

/// Initialize the global subscriber writing to `<dir>/mirrorblade.log`.
///
/// If the live file already exceeds `rotate_limit` bytes it is rotated to
/// `.1` (replacing any previous rotation) before the writer opens. Safe to
/// call when a subscriber is already installed (tests); the returned
/// controller then drives an unused filter.
pub fn init_logging(
    dir: &Path,
    level: LogLevel,
    rotate_limit: u64,
) -> std::io::Result<(LogController, LogGuard)> {
    std::fs::create_dir_all(dir)?;
    let log_path = dir.join(LOG_FILE);
    rotate_if_large(&log_path, dir.join(ROTATED_FILE).as_path(), rotate_limit);

    let file = std::fs::OpenOptions::new().create(true).append(true).open(&log_path)?;
    let (writer, worker) = tracing_appender::non_blocking(file);

    let (filter, handle) = reload::Layer::new(filter_for(level));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true),
        )
        .try_init();

    Ok((LogController { handle }, LogGuard { _worker: worker }))
}

fn filter_for(level: LogLevel) -> EnvFilter {
    EnvFilter::new(level.as_str())
}

fn rotate_if_large(live: &Path, rotated: &Path, limit: u64) {
    let Ok(meta) = std::fs::metadata(live) else {
        return;
    };
    if meta.len() > limit {
        let _ = std::fs::remove_file(rotated);
        let _ = std::fs::rename(live, rotated);
    }
}

#[cfg(test)]
#[path = "logging_tests.rs"]
mod tests;
