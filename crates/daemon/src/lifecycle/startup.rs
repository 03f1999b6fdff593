// SPDX-License-Identifier: MIT
// Copyright (c) 2026 TGDK Labs

//! Bridge startup wiring.

use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{oneshot, Notify};
use tokio_util::sync::CancellationToken;
use tracing::info;

use mb_core::{
    ConfigStore, FeatureGuards, SampleRing, TelemetryRing,
};
use mb_eval::{
    CompoundTable, FoldingField, HaltonJitter, ImpoundList, RecoverySmoother, VolPhi,
};
use mb_pool::WorkerPool;

use crate::bootscript;
use crate::env;
use crate::logging;
use crate::ops::{register_all, OpCtx};
use crate::persist;
use crate::registry::OpRegistry;
use crate::server::{spawn_server, ServerConfig};
use crate::sinks::apply_runtime;
use crate::watcher::{spawn_watcher, WatcherConfig};

use super::{BridgeConfig, DaemonState, LifecycleError};

/// How long to wait for the endpoint before startup fails. The server task
/// keeps retrying in the background until then.
const ENDPOINT_WAIT: Duration = Duration::from_secs(5);

/// Start the bridge: Logger, Config, Registry, Pool, RPC, in that order.
pub async fn startup(config: BridgeConfig) -> Result<DaemonState, LifecycleError> {
    // 1. Logger
    let mut sinks = config.sinks.clone();
    let mut log_guard = None;
    if config.init_logging {
        let initial_level = persist::load_or_default(&env::config_path(&config.root)).log_level;
        let (controller, guard) =
            logging::init_logging(&env::logs_dir(&config.root), initial_level, env::log_rotate_limit())?;
        log_guard = Some(guard);
        if sinks.log.is_none() {
            sinks.log = Some(Arc::new(controller));
        }
    }

    // 2. Config
    let config_path = env::config_path(&config.root);
    let snapshot = persist::load_or_default(&config_path);
    let store = Arc::new(ConfigStore::from_snapshot(&snapshot));
    let socket_path = env::socket_path(&snapshot.ipc_pipe_name);

    // 3. Registry
    let registry = Arc::new(OpRegistry::new());
    register_all(&registry);

    // 4. Pool
    let pool = Arc::new(WorkerPool::new(config.pool.clone()));
    pool.start()?;

    let shutdown_requested = Arc::new(Notify::new());
    let ctx = Arc::new(OpCtx {
        config: Arc::clone(&store),
        config_path: config_path.clone(),
        registry: Arc::clone(&registry),
        pool: Arc::clone(&pool),
        guards: Arc::new(FeatureGuards::new()),
        telemetry: Arc::new(TelemetryRing::new()),
        scooty: Arc::new(SampleRing::new()),
        fold: Arc::new(FoldingField::new()),
        smoother: Arc::new(RecoverySmoother::default()),
        jitter: Arc::new(HaltonJitter::default()),
        compound: Arc::new(CompoundTable::new()),
        impound: Arc::new(ImpoundList::new()),
        volphi: Arc::new(VolPhi::new()),
        sinks: sinks.clone(),
        shutdown: Arc::clone(&shutdown_requested),
        started_at: Instant::now(),
    });

    // Broadcast the loaded config before anything external connects.
    apply_runtime(&store, &sinks);

    // 5. RPC (and the config watcher alongside it)
    let cancel = CancellationToken::new();
    let (ready_tx, ready_rx) = oneshot::channel();
    let server_task = spawn_server(
        ServerConfig { socket_path: socket_path.clone(), retry_delay: env::retry_delay() },
        Arc::clone(&registry),
        Arc::clone(&ctx),
        cancel.clone(),
        ready_tx,
    );

    let watcher_task = spawn_watcher(
        WatcherConfig {
            path: config_path,
            poll: env::poll_interval(),
            debounce_polls: env::debounce_polls(),
        },
        Arc::clone(&store),
        sinks,
        cancel.clone(),
    );

    if tokio::time::timeout(ENDPOINT_WAIT, ready_rx).await.is_err() {
        cancel.cancel();
        let _ = server_task.await;
        let _ = watcher_task.await;
        pool.stop();
        return Err(LifecycleError::EndpointTimeout(socket_path));
    }

    // Boot script, best-effort, after the endpoint is live.
    let boot_path = env::bootscript_path(&config.root);
    let boot_socket = socket_path.clone();
    tokio::spawn(async move {
        bootscript::inject(&boot_path, &boot_socket).await;
    });

    info!(version = env::BRIDGE_VERSION, "bridge started");
    Ok(DaemonState {
        ctx,
        registry,
        store,
        pool,
        socket_path,
        shutdown_requested,
        cancel,
        server_task,
        watcher_task,
        log_guard,
    })
}
