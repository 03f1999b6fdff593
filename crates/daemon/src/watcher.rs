// SPDX-License-Identifier: MIT
// Copyright (c) 2026 TGDK Labs

//! Config hot reload: mtime polling with debounce.
//!
//! A change commits only after `debounce_polls` consecutive polls observe
//! the same new timestamp, which rides out editors that write through a
//! temp file and rename.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use mb_core::ConfigStore;

use crate::persist;
use crate::sinks::{apply_runtime, RuntimeSinks};

pub struct WatcherConfig {
    pub path: PathBuf,
    pub poll: Duration,
    pub debounce_polls: u32,
}

/// Spawn the watcher loop; it stops when `cancel` fires.
pub fn spawn_watcher(
    config: WatcherConfig,
    store: Arc<ConfigStore>,
    sinks: RuntimeSinks,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        watch_loop(config, store, sinks, cancel).await;
    })
}

async fn watch_loop(
    config: WatcherConfig,
    store: Arc<ConfigStore>,
    sinks: RuntimeSinks,
    cancel: CancellationToken,
) {
    let mut committed = mtime_of(&config.path);
    let mut pending: Option<(SystemTime, u32)> = None;

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                debug!("config watcher stopped");
                return;
            }
            _ = tokio::time::sleep(config.poll) => {}
        }

        let Some(mtime) = mtime_of(&config.path) else {
            // Missing file: nothing to commit, keep polling.
            pending = None;
            continue;
        };
        if Some(mtime) == committed {
            pending = None;
            continue;
        }

        match &mut pending {
            Some((seen, stable)) if *seen == mtime => {
                *stable += 1;
                if *stable >= config.debounce_polls {
                    commit(&config, &store, &sinks);
                    committed = Some(mtime);
                    pending = None;
                }
            }
            _ => {
                pending = Some((mtime, 1));
            }
        }
    }
}

fn commit(config: &WatcherConfig, store: &ConfigStore, sinks: &RuntimeSinks) {
    match persist::load_config(&config.path) {
        Ok(snap) => {
            let deltas = store.diff(&snap);
            store.apply(&snap);
            apply_runtime(store, sinks);
            if deltas.is_empty() {
                debug!("config file touched, no field changes");
            } else {
                for delta in &deltas {
                    info!(field = delta.field, from = %delta.from, to = %delta.to, "config reloaded");
                }
            }
        }
        Err(e) => {
            // Keep the previous in-memory state.
            warn!("config reload failed, keeping current state: {e}");
        }
    }
}

fn mtime_of(path: &std::path::Path) -> Option<SystemTime> {
    std::fs::metadata(path).and_then(|m| m.modified()).ok()
}

#[cfg(test)]
#[path = "watcher_tests.rs"]
mod tests;
