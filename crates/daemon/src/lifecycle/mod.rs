// SPDX-License-Identifier: MIT
// Copyright (c) 2026 TGDK Labs

//! Orchestrator lifecycle: wire the subsystems up, run, tear them down.
//!
//! Bring-up order is Logger, Config, Registry, Pool, RPC; shutdown runs in
//! reverse with the logger guard dropped last.

mod startup;

use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::info;

use mb_core::ConfigStore;
use mb_pool::{PoolConfig, PoolError, WorkerPool};

use crate::logging::LogGuard;
use crate::ops::OpCtx;
use crate::registry::OpRegistry;
use crate::sinks::RuntimeSinks;

pub use startup::startup;

/// Orchestrator parameters. `sinks` carries whatever the host attaches;
/// the log sink is filled in from the logging controller when absent.
pub struct BridgeConfig {
    pub root: PathBuf,
    pub pool: PoolConfig,
    pub sinks: RuntimeSinks,
    /// Install the global tracing subscriber and file log. Hosts embedding
    /// the bridge next to their own logging turn this off.
    pub init_logging: bool,
}

impl BridgeConfig {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            pool: PoolConfig::default(),
            sinks: RuntimeSinks::new(),
            init_logging: true,
        }
    }
}

#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("io error during startup: {0}")]
    Io(#[from] std::io::Error),

    #[error("worker pool start failed: {0}")]
    Pool(#[from] PoolError),

    #[error("endpoint did not come up at {0}")]
    EndpointTimeout(PathBuf),
}

/// A running bridge.
pub struct DaemonState {
    pub ctx: Arc<OpCtx>,
    pub registry: Arc<OpRegistry>,
    pub store: Arc<ConfigStore>,
    pub pool: Arc<WorkerPool>,
    pub socket_path: PathBuf,
    pub shutdown_requested: Arc<Notify>,
    pub(crate) cancel: CancellationToken,
    pub(crate) server_task: JoinHandle<()>,
    pub(crate) watcher_task: JoinHandle<()>,
    // Dropped last when DaemonState is consumed by `shutdown`.
    pub(crate) log_guard: Option<LogGuard>,
}

/// Block until something requests shutdown (`bridge.shutdown` or a host
/// signal forwarded through `state.shutdown_requested`).
pub async fn run(state: &DaemonState) {
    state.shutdown_requested.notified().await;
    info!("shutdown requested");
}

/// Tear down in reverse bring-up order: RPC, watcher, pool, then logging.
pub async fn shutdown(state: DaemonState) {
    state.cancel.cancel();
    let _ = state.server_task.await;
    let _ = state.watcher_task.await;
    state.pool.stop();
    info!("bridge stopped");
    drop(state.log_guard);
}
