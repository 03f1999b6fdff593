// SPDX-License-Identifier: MIT
// Copyright (c) 2026 TGDK Labs

//! In-memory runtime configuration with typed atomic fields.
//!
//! Scalar fields are lock-free atomics; the one string field shares a mutex
//! with composite snapshot reads so a reader never observes a torn mixture
//! of fields.

use parking_lot::Mutex;
use serde::{Deserialize, Deserializer, Serialize};
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, AtomicU8, Ordering};

use crate::level::LogLevel;

/// Lower clamp bound for `traffic_boost`.
pub const TRAFFIC_BOOST_MIN: f64 = 0.10;
/// Upper clamp bound for `traffic_boost`.
pub const TRAFFIC_BOOST_MAX: f64 = 50.0;

/// Default IPC endpoint identifier.
pub const DEFAULT_PIPE_NAME: &str = "MirrorBladeBridge-v1";

/// Plain-value snapshot of the whole configuration.
///
/// This is also the persisted JSON shape; unknown fields in the file are
/// ignored on load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigSnapshot {
    #[serde(default)]
    pub upscaler_enabled: bool,
    #[serde(default = "default_traffic_boost")]
    pub traffic_boost: f64,
    #[serde(default = "default_true")]
    pub ipc_enabled: bool,
    #[serde(default = "default_pipe_name")]
    pub ipc_pipe_name: String,
    #[serde(default, deserialize_with = "de_level_lossy")]
    pub log_level: LogLevel,
    #[serde(default = "default_version")]
    pub version: u32,
}

fn default_traffic_boost() -> f64 {
    1.0
}

fn default_true() -> bool {
    true
}

fn default_pipe_name() -> String {
    DEFAULT_PIPE_NAME.to_string()
}

fn default_version() -> u32 {
    1
}

/// File loads tolerate unknown level names by falling back to `info`.
fn de_level_lossy<'de, D>(deserializer: D) -> Result<LogLevel, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Ok(LogLevel::parse_lossy(&raw))
}

impl Default for ConfigSnapshot {
    fn default() -> Self {
        Self {
            upscaler_enabled: false,
            traffic_boost: default_traffic_boost(),
            ipc_enabled: true,
            ipc_pipe_name: default_pipe_name(),
            log_level: LogLevel::default(),
            version: default_version(),
        }
    }
}

impl ConfigSnapshot {
    /// Clamp every range-bound field into its legal domain.
    pub fn clamped(mut self) -> Self {
        self.traffic_boost = clamp_traffic_boost(self.traffic_boost);
        self
    }
}

/// One changed field, for reload logging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigDelta {
    pub field: &'static str,
    pub from: String,
    pub to: String,
}

/// Clamp a traffic boost value into `[TRAFFIC_BOOST_MIN, TRAFFIC_BOOST_MAX]`.
///
/// Non-finite input lands on the lower bound.
pub fn clamp_traffic_boost(v: f64) -> f64 {
    if v.is_finite() {
        v.clamp(TRAFFIC_BOOST_MIN, TRAFFIC_BOOST_MAX)
    } else {
        TRAFFIC_BOOST_MIN
    }
}

/// Shared runtime configuration.
pub struct ConfigStore {
    upscaler_enabled: AtomicBool,
    traffic_boost_bits: AtomicU64,
    ipc_enabled: AtomicBool,
    log_level: AtomicU8,
    version: AtomicU32,
    ipc_pipe_name: Mutex<String>,
}

impl Default for ConfigStore {
    fn default() -> Self {
        Self::from_snapshot(&ConfigSnapshot::default())
    }
}

impl ConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snap: &ConfigSnapshot) -> Self {
        Self {
            upscaler_enabled: AtomicBool::new(snap.upscaler_enabled),
            traffic_boost_bits: AtomicU64::new(clamp_traffic_boost(snap.traffic_boost).to_bits()),
            ipc_enabled: AtomicBool::new(snap.ipc_enabled),
            log_level: AtomicU8::new(snap.log_level.as_u8()),
            version: AtomicU32::new(snap.version),
            ipc_pipe_name: Mutex::new(snap.ipc_pipe_name.clone()),
        }
    }

    pub fn upscaler_enabled(&self) -> bool {
        self.upscaler_enabled.load(Ordering::Acquire)
    }

    pub fn set_upscaler_enabled(&self, enabled: bool) {
        self.upscaler_enabled.store(enabled, Ordering::Release);
    }

    pub fn traffic_boost(&self) -> f64 {
        f64::from_bits(self.traffic_boost_bits.load(Ordering::Acquire))
    }

    /// Store a traffic boost, clamped on ingest. Returns the stored value.
    pub fn set_traffic_boost(&self, v: f64) -> f64 {
        let clamped = clamp_traffic_boost(v);
        self.traffic_boost_bits.store(clamped.to_bits(), Ordering::Release);
        clamped
    }

    pub fn ipc_enabled(&self) -> bool {
        self.ipc_enabled.load(Ordering::Acquire)
    }

    pub fn set_ipc_enabled(&self, enabled: bool) {
        self.ipc_enabled.store(enabled, Ordering::Release);
    }

    pub fn log_level(&self) -> LogLevel {
        LogLevel::from_u8(self.log_level.load(Ordering::Acquire))
    }

    pub fn set_log_level(&self, level: LogLevel) {
        self.log_level.store(level.as_u8(), Ordering::Release);
    }

    pub fn version(&self) -> u32 {
        self.version.load(Ordering::Acquire)
    }

    pub fn ipc_pipe_name(&self) -> String {
        self.ipc_pipe_name.lock().clone()
    }

    pub fn set_ipc_pipe_name(&self, name: impl Into<String>) {
        *self.ipc_pipe_name.lock() = name.into();
    }

    /// Consistent by-value snapshot of every field.
    ///
    /// Taken under the string lock so `apply` cannot interleave.
    pub fn snapshot(&self) -> ConfigSnapshot {
        let pipe = self.ipc_pipe_name.lock();
        ConfigSnapshot {
            upscaler_enabled: self.upscaler_enabled.load(Ordering::Acquire),
            traffic_boost: f64::from_bits(self.traffic_boost_bits.load(Ordering::Acquire)),
            ipc_enabled: self.ipc_enabled.load(Ordering::Acquire),
            ipc_pipe_name: pipe.clone(),
            log_level: LogLevel::from_u8(self.log_level.load(Ordering::Acquire)),
            version: self.version.load(Ordering::Acquire),
        }
    }

    /// Replace every field from a snapshot, clamping on ingest.
    pub fn apply(&self, snap: &ConfigSnapshot) {
        let mut pipe = self.ipc_pipe_name.lock();
        self.upscaler_enabled.store(snap.upscaler_enabled, Ordering::Release);
        self.traffic_boost_bits
            .store(clamp_traffic_boost(snap.traffic_boost).to_bits(), Ordering::Release);
        self.ipc_enabled.store(snap.ipc_enabled, Ordering::Release);
        self.log_level.store(snap.log_level.as_u8(), Ordering::Release);
        self.version.store(snap.version, Ordering::Release);
        *pipe = snap.ipc_pipe_name.clone();
    }

    /// Fields that would change if `next` were applied.
    pub fn diff(&self, next: &ConfigSnapshot) -> Vec<ConfigDelta> {
        let cur = self.snapshot();
        let mut deltas = Vec::new();
        if cur.upscaler_enabled != next.upscaler_enabled {
            deltas.push(ConfigDelta {
                field: "upscaler_enabled",
                from: cur.upscaler_enabled.to_string(),
                to: next.upscaler_enabled.to_string(),
            });
        }
        let next_boost = clamp_traffic_boost(next.traffic_boost);
        if cur.traffic_boost != next_boost {
            deltas.push(ConfigDelta {
                field: "traffic_boost",
                from: cur.traffic_boost.to_string(),
                to: next_boost.to_string(),
            });
        }
        if cur.ipc_enabled != next.ipc_enabled {
            deltas.push(ConfigDelta {
                field: "ipc_enabled",
                from: cur.ipc_enabled.to_string(),
                to: next.ipc_enabled.to_string(),
            });
        }
        if cur.ipc_pipe_name != next.ipc_pipe_name {
            deltas.push(ConfigDelta {
                field: "ipc_pipe_name",
                from: cur.ipc_pipe_name,
                to: next.ipc_pipe_name.clone(),
            });
        }
        if cur.log_level != next.log_level {
            deltas.push(ConfigDelta {
                field: "log_level",
                from: cur.log_level.to_string(),
                to: next.log_level.to_string(),
            });
        }
        if cur.version != next.version {
            deltas.push(ConfigDelta {
                field: "version",
                from: cur.version.to_string(),
                to: next.version.to_string(),
            });
        }
        deltas
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
