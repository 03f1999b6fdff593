// SPDX-License-Identifier: MIT
// Copyright (c) 2026 TGDK Labs

//! Stub operations: validate inputs and return structured echoes.
//!
//! These are part of the public surface but never reach a real sink; the
//! echo carries `"applied": false` so callers can tell.

use serde_json::{json, Value};

use crate::registry::{OpError, OpRegistry};

use super::{obj, req_bool, req_f64, req_str};

fn echo(op: &str, args: &Value) -> Value {
    json!({ "op": op, "echo": args, "applied": false })
}

/// Optional positive integer `count`, default 1.
fn opt_count(args: &Value) -> Result<u64, OpError> {
    match obj(args)?.get("count") {
        None | Some(Value::Null) => Ok(1),
        Some(v) => v
            .as_u64()
            .filter(|&n| n >= 1)
            .ok_or_else(|| OpError::bad_args("'count' must be a positive integer")),
    }
}

pub(super) fn register(registry: &OpRegistry) {
    registry.register("traffic.setDensity", |_ctx, args| {
        let density = req_f64(args, "density")?;
        if !(0.0..=10.0).contains(&density) {
            return Err(OpError::bad_args("'density' must be within [0, 10]"));
        }
        Ok(echo("traffic.setDensity", args))
    });

    registry.register("vehicle.spawn", |_ctx, args| {
        req_str(args, "record")?;
        opt_count(args)?;
        Ok(echo("vehicle.spawn", args))
    });

    registry.register("vehicle.despawnAll", |_ctx, args| {
        Ok(echo("vehicle.despawnAll", args))
    });

    registry.register("npc.spawn", |_ctx, args| {
        req_str(args, "record")?;
        opt_count(args)?;
        Ok(echo("npc.spawn", args))
    });

    registry.register("world.setWeather", |_ctx, args| {
        let preset = req_str(args, "preset")?;
        if preset.is_empty() {
            return Err(OpError::bad_args("'preset' must not be empty"));
        }
        Ok(echo("world.setWeather", args))
    });

    registry.register("ui.notify", |_ctx, args| {
        req_str(args, "text")?;
        Ok(echo("ui.notify", args))
    });

    registry.register("time.setScale", |_ctx, args| {
        let scale = req_f64(args, "scale")?;
        if !scale.is_finite() || scale <= 0.0 {
            return Err(OpError::bad_args("'scale' must be a positive number"));
        }
        Ok(echo("time.setScale", args))
    });

    registry.register("time.freeze", |_ctx, args| {
        req_bool(args, "frozen")?;
        Ok(echo("time.freeze", args))
    });
}

#[cfg(test)]
#[path = "stubs_tests.rs"]
mod tests;
