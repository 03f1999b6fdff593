// SPDX-License-Identifier: MIT
// Copyright (c) 2026 TGDK Labs

//! RPC server: accept one client at a time, serve framed requests.

use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::BufReader;
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use mb_wire::{
    err_envelope, read_line_capped, seal, write_line, ErrorCode, ReadOutcome, MAX_LINE_BYTES,
    PROTOCOL_VERSION,
};

use crate::ops::OpCtx;
use crate::registry::OpRegistry;

/// Operations that stay reachable when `ipc_enabled` goes off while a
/// session is already open, so that session can diagnose and re-enable the
/// bridge. New sessions are refused at accept time (see `accept_loop`).
const ALWAYS_AVAILABLE: &[&str] =
    &["ping", "diag.dump", "ops.capabilities", "bridge.shutdown"];

pub struct ServerConfig {
    pub socket_path: PathBuf,
    pub retry_delay: std::time::Duration,
}

/// Spawn the accept loop. `ready` fires once the endpoint is bound.
pub fn spawn_server(
    config: ServerConfig,
    registry: Arc<OpRegistry>,
    ctx: Arc<OpCtx>,
    cancel: CancellationToken,
    ready: oneshot::Sender<()>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        accept_loop(config, registry, ctx, cancel, ready).await;
    })
}

async fn accept_loop(
    config: ServerConfig,
    registry: Arc<OpRegistry>,
    ctx: Arc<OpCtx>,
    cancel: CancellationToken,
    ready: oneshot::Sender<()>,
) {
    let listener = match bind_with_retry(&config, &cancel).await {
        Some(listener) => listener,
        None => return,
    };
    info!(path = %config.socket_path.display(), "bridge endpoint listening");
    let _ = ready.send(());

    loop {
        let stream = tokio::select! {
            _ = cancel.cancelled() => break,
            accepted = listener.accept() => match accepted {
                Ok((stream, _)) => stream,
                Err(e) => {
                    warn!("accept error: {e}");
                    continue;
                }
            },
        };
        // `ipc_enabled` controls whether new sessions are accepted: a
        // connection arriving while it is off is closed without service.
        // Re-enabling happens through the config file (watcher) or the host.
        if !ctx.config.ipc_enabled() {
            debug!("ipc disabled, refusing new session");
            drop(stream);
            continue;
        }
        debug!("client connected");
        // One active session at a time: the session runs inline and the
        // next accept happens only after it ends.
        run_session(stream, &registry, &ctx, &cancel).await;
        debug!("client session ended");
    }

    drop(listener);
    let _ = std::fs::remove_file(&config.socket_path);
    info!("bridge endpoint closed");
}

/// Bind the endpoint, backing off and retrying on failure until cancelled.
async fn bind_with_retry(
    config: &ServerConfig,
    cancel: &CancellationToken,
) -> Option<UnixListener> {
    loop {
        if let Some(parent) = config.socket_path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        // A stale socket file from a previous run blocks bind.
        if config.socket_path.exists() {
            let _ = std::fs::remove_file(&config.socket_path);
        }
        match UnixListener::bind(&config.socket_path) {
            Ok(listener) => return Some(listener),
            Err(e) => {
                warn!(
                    path = %config.socket_path.display(),
                    "endpoint create failed ({e}), retrying"
                );
                tokio::select! {
                    _ = cancel.cancelled() => return None,
                    _ = tokio::time::sleep(config.retry_delay) => {}
                }
            }
        }
    }
}

async fn run_session(
    stream: UnixStream,
    registry: &OpRegistry,
    ctx: &OpCtx,
    cancel: &CancellationToken,
) {
    let (read_half, mut write_half) = stream.into_split();
    let mut reader = BufReader::new(read_half);

    loop {
        let outcome = tokio::select! {
            _ = cancel.cancelled() => return,
            read = read_line_capped(&mut reader, MAX_LINE_BYTES) => match read {
                Ok(outcome) => outcome,
                Err(e) => {
                    debug!("session read error: {e}");
                    return;
                }
            },
        };

        let line = match outcome {
            ReadOutcome::Line(line) => line,
            ReadOutcome::Eof => return,
            ReadOutcome::Overflow => {
                // Terminated without a reply per the framing contract.
                warn!("request line exceeded {MAX_LINE_BYTES} bytes, dropping session");
                return;
            }
            ReadOutcome::BadUtf8 => {
                warn!("non-UTF-8 request line, dropping session");
                return;
            }
        };

        let reply = handle_line(&line, registry, ctx);
        if let Err(e) = write_line(&mut write_half, &reply).await {
            debug!("session write error: {e}");
            return;
        }
    }
}

/// Validate one request line and dispatch it. Always produces a sealed
/// reply; framing-level failures are handled by the caller.
fn handle_line(line: &str, registry: &OpRegistry, ctx: &OpCtx) -> Value {
    let parsed: Value = match serde_json::from_str(line) {
        Ok(value) => value,
        Err(e) => {
            return seal(
                PROTOCOL_VERSION,
                None,
                err_envelope(ErrorCode::BadJson, e.to_string()),
            )
        }
    };

    let id = parsed.get("id").and_then(Value::as_str).map(str::to_string);
    let id = id.as_deref();

    let version = parsed.get("v").and_then(Value::as_u64);
    if version != Some(u64::from(PROTOCOL_VERSION)) {
        let v = version.and_then(|v| u32::try_from(v).ok()).unwrap_or(PROTOCOL_VERSION);
        return seal(
            v,
            id,
            err_envelope(
                ErrorCode::BadVersion,
                format!("unsupported protocol version (want {PROTOCOL_VERSION})"),
            ),
        );
    }

    let Some(op) = parsed.get("op").and_then(Value::as_str) else {
        return seal(
            PROTOCOL_VERSION,
            id,
            err_envelope(ErrorCode::BadArgs, "missing 'op'"),
        );
    };

    let args = match parsed.get("args") {
        None | Some(Value::Null) => Value::Object(serde_json::Map::new()),
        Some(Value::Object(map)) => Value::Object(map.clone()),
        Some(_) => {
            return seal(
                PROTOCOL_VERSION,
                id,
                err_envelope(ErrorCode::BadArgs, "'args' must be an object"),
            )
        }
    };

    if !ctx.config.ipc_enabled() && !is_always_available(op) {
        return seal(
            PROTOCOL_VERSION,
            id,
            err_envelope(ErrorCode::Unavailable, "ipc disabled by config"),
        );
    }

    let body = registry.dispatch(ctx, op, &args);
    seal(PROTOCOL_VERSION, id, body)
}

fn is_always_available(op: &str) -> bool {
    ALWAYS_AVAILABLE.contains(&op) || op.starts_with("config.")
}

#[cfg(test)]
#[path = "server_tests.rs"]
mod tests;
