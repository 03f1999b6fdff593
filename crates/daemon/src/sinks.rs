// SPDX-License-Identifier: MIT
// Copyright (c) 2026 TGDK Labs

//! Runtime sinks: external consumers of configuration state.
//!
//! Every sink is optional; an absent sink is a no-op. `apply_runtime` is
//! idempotent and safe from any thread.

use mb_core::{ConfigStore, LogLevel};
use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;

/// Upscaler quality mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpscalerMode {
    #[default]
    Balanced,
    Quality,
    Performance,
    Ultra,
}

/// Upscaler tuning parameters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
pub struct UpscalerParams {
    pub sharpness: f32,
    pub exposure: f32,
}

/// Output resize request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct ResizeParams {
    pub width: u32,
    pub height: u32,
}

pub trait UpscalerSink: Send + Sync {
    fn set_enabled(&self, enabled: bool);
    fn set_mode(&self, mode: UpscalerMode);
    fn set_params(&self, params: UpscalerParams);
    fn resize(&self, params: ResizeParams);
}

pub trait TrafficSink: Send + Sync {
    fn set_multiplier(&self, mult: f64);
}

pub trait LogSink: Send + Sync {
    fn set_level(&self, level: LogLevel);
}

/// The set of sinks runtime state is broadcast to.
#[derive(Default, Clone)]
pub struct RuntimeSinks {
    pub upscaler: Option<Arc<dyn UpscalerSink>>,
    pub traffic: Option<Arc<dyn TrafficSink>>,
    pub log: Option<Arc<dyn LogSink>>,
}

impl RuntimeSinks {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Push current config values to every attached sink.
pub fn apply_runtime(store: &ConfigStore, sinks: &RuntimeSinks) {
    let snap = store.snapshot();
    if let Some(upscaler) = &sinks.upscaler {
        upscaler.set_enabled(snap.upscaler_enabled);
    }
    if let Some(traffic) = &sinks.traffic {
        traffic.set_multiplier(snap.traffic_boost);
    }
    if let Some(log) = &sinks.log {
        log.set_level(snap.log_level);
    }
    debug!(
        upscaler = snap.upscaler_enabled,
        traffic = snap.traffic_boost,
        level = %snap.log_level,
        "runtime state applied"
    );
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use parking_lot::Mutex;

    /// Records every call for assertions.
    #[derive(Default)]
    pub struct RecordingSinks {
        pub enabled: Mutex<Vec<bool>>,
        pub multipliers: Mutex<Vec<f64>>,
        pub levels: Mutex<Vec<LogLevel>>,
    }

    impl UpscalerSink for RecordingSinks {
        fn set_enabled(&self, enabled: bool) {
            self.enabled.lock().push(enabled);
        }
        fn set_mode(&self, _mode: UpscalerMode) {}
        fn set_params(&self, _params: UpscalerParams) {}
        fn resize(&self, _params: ResizeParams) {}
    }

    impl TrafficSink for RecordingSinks {
        fn set_multiplier(&self, mult: f64) {
            self.multipliers.lock().push(mult);
        }
    }

    impl LogSink for RecordingSinks {
        fn set_level(&self, level: LogLevel) {
            self.levels.lock().push(level);
        }
    }

    /// Sinks wired to one shared recorder.
    pub fn recording() -> (Arc<RecordingSinks>, RuntimeSinks) {
        let recorder = Arc::new(RecordingSinks::default());
        let sinks = RuntimeSinks {
            upscaler: Some(recorder.clone()),
            traffic: Some(recorder.clone()),
            log: Some(recorder.clone()),
        };
        (recorder, sinks)
    }
}

#[cfg(test)]
#[path = "sinks_tests.rs"]
mod tests;
