// SPDX-License-Identifier: MIT
// Copyright (c) 2026 TGDK Labs

//! Config, upscaler, and traffic operations.

use serde_json::{json, Value};

use mb_core::LogLevel;

use crate::persist;
use crate::registry::{OpError, OpRegistry};
use crate::sinks::apply_runtime;

use super::{req_bool, req_f64, req_str, OpCtx};

pub(super) fn register(registry: &OpRegistry) {
    registry.register("config.reload", |ctx, _args| {
        let snap = persist::load_config(&ctx.config_path)
            .map_err(|e| OpError::exception(e.to_string()))?;
        ctx.config.apply(&snap);
        apply_runtime(&ctx.config, &ctx.sinks);
        Ok(json!({ "ok": true }))
    });

    registry.register("config.save", |ctx, _args| {
        persist::save_config(&ctx.config_path, &ctx.config.snapshot())
            .map_err(|e| OpError::exception(e.to_string()))?;
        Ok(json!({ "ok": true }))
    });

    registry.register("config.get", |ctx, args| {
        let key = req_str(args, "key")?;
        let value = get_field(ctx, key)?;
        Ok(json!({ "key": key, "value": value }))
    });

    registry.register("config.set", |ctx, args| {
        let key = req_str(args, "key")?;
        let value = super::obj(args)?
            .get("value")
            .ok_or_else(|| OpError::bad_args("missing 'value'"))?;
        let stored = set_field(ctx, key, value)?;
        apply_runtime(&ctx.config, &ctx.sinks);
        Ok(json!({ "set": key, "value": stored }))
    });

    registry.register("upscaler.enable", |ctx, args| {
        let enabled = req_bool(args, "enabled")?;
        ctx.config.set_upscaler_enabled(enabled);
        if let Some(upscaler) = &ctx.sinks.upscaler {
            upscaler.set_enabled(enabled);
        }
        // Full envelope so the wire-level result is the bare boolean.
        Ok(json!({ "ok": true, "result": enabled }))
    });

    registry.register("upscaler.setMode", |ctx, args| {
        let raw = req_str(args, "mode")?;
        let mode = serde_json::from_value(json!(raw))
            .map_err(|_| OpError::bad_args(format!("unknown mode '{raw}'")))?;
        if let Some(upscaler) = &ctx.sinks.upscaler {
            upscaler.set_mode(mode);
        }
        Ok(json!({ "mode": raw }))
    });

    registry.register("upscaler.setParams", |ctx, args| {
        let params = serde_json::from_value(args.clone())
            .map_err(|e| OpError::bad_args(e.to_string()))?;
        if let Some(upscaler) = &ctx.sinks.upscaler {
            upscaler.set_params(params);
        }
        Ok(json!({ "applied": true }))
    });

    registry.register("upscaler.resize", |ctx, args| {
        let params = serde_json::from_value(args.clone())
            .map_err(|e| OpError::bad_args(e.to_string()))?;
        if let Some(upscaler) = &ctx.sinks.upscaler {
            upscaler.resize(params);
        }
        Ok(json!({ "applied": true }))
    });

    registry.register("traffic.mul", |ctx, args| {
        let mult = req_f64(args, "mult")?;
        let stored = ctx.config.set_traffic_boost(mult);
        if let Some(traffic) = &ctx.sinks.traffic {
            traffic.set_multiplier(stored);
        }
        Ok(json!({ "ok": true, "result": stored }))
    });
}

fn get_field(ctx: &OpCtx, key: &str) -> Result<Value, OpError> {
    let snap = ctx.config.snapshot();
    match key {
        "upscaler_enabled" => Ok(json!(snap.upscaler_enabled)),
        "traffic_boost" => Ok(json!(snap.traffic_boost)),
        "ipc_enabled" => Ok(json!(snap.ipc_enabled)),
        "ipc_pipe_name" => Ok(json!(snap.ipc_pipe_name)),
        "log_level" => Ok(json!(snap.log_level.as_str())),
        "version" => Ok(json!(snap.version)),
        other => Err(OpError::bad_args(format!("unknown config key '{other}'"))),
    }
}

/// Apply one typed mutation; returns the stored (possibly clamped) value.
fn set_field(ctx: &OpCtx, key: &str, value: &Value) -> Result<Value, OpError> {
    match key {
        "upscaler_enabled" => {
            let v = as_bool(key, value)?;
            ctx.config.set_upscaler_enabled(v);
            Ok(json!(v))
        }
        "traffic_boost" => {
            let v = value
                .as_f64()
                .ok_or_else(|| OpError::bad_args("'traffic_boost' must be a number"))?;
            Ok(json!(ctx.config.set_traffic_boost(v)))
        }
        "ipc_enabled" => {
            let v = as_bool(key, value)?;
            ctx.config.set_ipc_enabled(v);
            Ok(json!(v))
        }
        "ipc_pipe_name" => {
            let v = value
                .as_str()
                .ok_or_else(|| OpError::bad_args("'ipc_pipe_name' must be a string"))?;
            if v.is_empty() {
                return Err(OpError::bad_args("'ipc_pipe_name' must not be empty"));
            }
            ctx.config.set_ipc_pipe_name(v);
            Ok(json!(v))
        }
        "log_level" => {
            let raw = value
                .as_str()
                .ok_or_else(|| OpError::bad_args("'log_level' must be a string"))?;
            let level: LogLevel = raw
                .parse()
                .map_err(|_| OpError::bad_args(format!("unknown log level '{raw}'")))?;
            ctx.config.set_log_level(level);
            Ok(json!(level.as_str()))
        }
        other => Err(OpError::bad_args(format!("unknown config key '{other}'"))),
    }
}

fn as_bool(key: &str, value: &Value) -> Result<bool, OpError> {
    value
        .as_bool()
        .ok_or_else(|| OpError::bad_args(format!("'{key}' must be a boolean")))
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
