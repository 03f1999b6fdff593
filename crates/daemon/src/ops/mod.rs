// SPDX-License-Identifier: MIT
// Copyright (c) 2026 TGDK Labs

//! Operation handlers and their shared context.

mod config;
mod core;
mod evalops;
mod stubs;

use serde_json::{Map, Value};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Notify;

use mb_core::{
    Clock, ConfigStore, FeatureGuards, SampleRing, SystemClock, TelemetryRing,
};
use mb_eval::{
    CompoundTable, FoldingField, HaltonJitter, ImpoundList, RecoverySmoother, VolPhi,
};
use mb_pool::WorkerPool;

use crate::registry::{OpError, OpRegistry};
use crate::sinks::RuntimeSinks;

/// Everything a handler may touch. Handlers receive `&OpCtx` and must not
/// block beyond bounded work.
pub struct OpCtx {
    pub config: Arc<ConfigStore>,
    pub config_path: PathBuf,
    pub registry: Arc<OpRegistry>,
    pub pool: Arc<WorkerPool>,
    pub guards: Arc<FeatureGuards>,
    pub telemetry: Arc<TelemetryRing>,
    pub scooty: Arc<SampleRing>,
    pub fold: Arc<FoldingField>,
    pub smoother: Arc<RecoverySmoother>,
    pub jitter: Arc<HaltonJitter>,
    pub compound: Arc<CompoundTable>,
    pub impound: Arc<ImpoundList>,
    pub volphi: Arc<VolPhi>,
    pub sinks: RuntimeSinks,
    pub shutdown: Arc<Notify>,
    pub started_at: Instant,
}

impl OpCtx {
    /// Wall-clock timestamp for telemetry events.
    pub fn now_us(&self) -> u64 {
        SystemClock.epoch_us()
    }

    pub fn uptime_secs(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}

/// Install every operation on the registry.
pub fn register_all(registry: &OpRegistry) {
    core::register(registry);
    config::register(registry);
    evalops::register(registry);
    stubs::register(registry);
}

// ---- argument helpers ------------------------------------------------------

fn obj<'a>(args: &'a Value) -> Result<&'a Map<String, Value>, OpError> {
    args.as_object().ok_or_else(|| OpError::bad_args("args must be an object"))
}

fn req_f64(args: &Value, key: &str) -> Result<f64, OpError> {
    obj(args)?
        .get(key)
        .and_then(Value::as_f64)
        .ok_or_else(|| OpError::bad_args(format!("missing or non-numeric '{key}'")))
}

fn opt_f64(args: &Value, key: &str, default: f64) -> Result<f64, OpError> {
    match obj(args)?.get(key) {
        None | Some(Value::Null) => Ok(default),
        Some(v) => v
            .as_f64()
            .ok_or_else(|| OpError::bad_args(format!("'{key}' must be a number"))),
    }
}

fn req_str<'a>(args: &'a Value, key: &str) -> Result<&'a str, OpError> {
    obj(args)?
        .get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| OpError::bad_args(format!("missing or non-string '{key}'")))
}

fn opt_str<'a>(args: &'a Value, key: &str, default: &'a str) -> Result<&'a str, OpError> {
    match obj(args)?.get(key) {
        None | Some(Value::Null) => Ok(default),
        Some(v) => v
            .as_str()
            .ok_or_else(|| OpError::bad_args(format!("'{key}' must be a string"))),
    }
}

fn req_bool(args: &Value, key: &str) -> Result<bool, OpError> {
    obj(args)?
        .get(key)
        .and_then(Value::as_bool)
        .ok_or_else(|| OpError::bad_args(format!("missing or non-boolean '{key}'")))
}

fn opt_bool(args: &Value, key: &str, default: bool) -> Result<bool, OpError> {
    match obj(args)?.get(key) {
        None | Some(Value::Null) => Ok(default),
        Some(v) => v
            .as_bool()
            .ok_or_else(|| OpError::bad_args(format!("'{key}' must be a boolean"))),
    }
}

fn opt_usize(args: &Value, key: &str, default: usize) -> Result<usize, OpError> {
    match obj(args)?.get(key) {
        None | Some(Value::Null) => Ok(default),
        Some(v) => v
            .as_u64()
            .map(|n| n as usize)
            .ok_or_else(|| OpError::bad_args(format!("'{key}' must be a non-negative integer"))),
    }
}
