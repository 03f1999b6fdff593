// SPDX-License-Identifier: MIT
// Copyright (c) 2026 TGDK Labs

//! Core bridge operations: health, diagnostics, capabilities, guards,
//! pool introspection, and shutdown.

use serde_json::{json, Value};

use mb_pool::Lane;

use crate::registry::{OpError, OpRegistry};

use super::req_str;

pub(super) fn register(registry: &OpRegistry) {
    registry.register("ping", |_ctx, _args| Ok(json!("pong")));

    registry.register("diag.dump", |ctx, _args| {
        let diag = json!({
            "version": crate::env::BRIDGE_VERSION,
            "uptime_secs": ctx.uptime_secs(),
            "ops": ctx.registry.len(),
            "pool": ctx.pool.stats(),
            "config": ctx.config.snapshot(),
            "telemetry_len": ctx.telemetry.len(),
            "guards": ctx.guards.all().into_iter().collect::<std::collections::BTreeMap<_, _>>(),
        });
        let text = serde_json::to_string(&diag)
            .map_err(|e| OpError::exception(e.to_string()))?;
        Ok(json!(text))
    });

    registry.register("ops.capabilities", |ctx, _args| {
        Ok(json!({ "capabilities": ctx.registry.names() }))
    });

    registry.register("bridge.shutdown", |ctx, _args| {
        ctx.shutdown.notify_one();
        Ok(json!({ "stopping": true }))
    });

    registry.register("guard.state", |ctx, args| {
        let name = req_str(args, "name")?;
        let state = ctx.guards.state(name);
        Ok(json!({
            "name": name,
            "enabled": state.enabled,
            "failures": state.failures,
            "threshold": state.fail_threshold,
        }))
    });

    registry.register("guard.reset", |ctx, args| {
        let name = req_str(args, "name")?;
        ctx.guards.set_enabled(name, true);
        Ok(json!({ "name": name, "enabled": true }))
    });

    registry.register("pool.stats", |ctx, _args| {
        serde_json::to_value(ctx.pool.stats()).map_err(|e| OpError::exception(e.to_string()))
    });

    // Probe op: enqueue a no-op on a lane and report acceptance. Useful for
    // checking pool liveness over the wire.
    registry.register("pool.ping", |ctx, args| {
        let lane = match opt_lane(args)? {
            Some(lane) => lane,
            None => Lane::Normal,
        };
        let queued = ctx.pool.enqueue(lane, || {});
        Ok(json!({ "lane": lane.as_str(), "queued": queued }))
    });
}

fn opt_lane(args: &Value) -> Result<Option<Lane>, OpError> {
    let lane = super::opt_str(args, "lane", "")?;
    if lane.is_empty() {
        return Ok(None);
    }
    match lane {
        "high" => Ok(Some(Lane::High)),
        "normal" => Ok(Some(Lane::Normal)),
        "low" => Ok(Some(Lane::Low)),
        "io" => Ok(Some(Lane::Io)),
        other => Err(OpError::bad_args(format!("unknown lane '{other}'"))),
    }
}

#[cfg(test)]
#[path = "core_tests.rs"]
mod tests;
