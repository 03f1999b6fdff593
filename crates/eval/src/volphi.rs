// SPDX-License-Identifier: MIT
// Copyright (c) 2026 TGDK Labs

//! Volumetric-phi parameters with a staged/live split.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// Live parameter set. Every numeric field is clamped on ingest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolPhiParams {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_one")]
    pub distance_mul: f64,
    #[serde(default = "default_one")]
    pub density_mul: f64,
    #[serde(default)]
    pub horizon_fade: f64,
    #[serde(default = "default_one")]
    pub jitter_strength: f64,
    #[serde(default = "default_blend")]
    pub temporal_blend: f64,
}

fn default_one() -> f64 {
    1.0
}

fn default_blend() -> f64 {
    0.9
}

impl Default for VolPhiParams {
    fn default() -> Self {
        Self {
            enabled: false,
            distance_mul: 1.0,
            density_mul: 1.0,
            horizon_fade: 0.0,
            jitter_strength: 1.0,
            temporal_blend: default_blend(),
        }
    }
}

impl VolPhiParams {
    fn sanitized(mut self) -> Self {
        self.distance_mul = non_negative(self.distance_mul);
        self.density_mul = non_negative(self.density_mul);
        self.horizon_fade = unit(self.horizon_fade);
        self.jitter_strength = non_negative(self.jitter_strength);
        self.temporal_blend = unit(self.temporal_blend);
        self
    }
}

fn non_negative(v: f64) -> f64 {
    if v.is_finite() {
        v.max(0.0)
    } else {
        0.0
    }
}

fn unit(v: f64) -> f64 {
    if v.is_finite() {
        v.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Partial update applied onto the staged parameters.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VolPhiUpdate {
    pub enabled: Option<bool>,
    pub distance_mul: Option<f64>,
    pub density_mul: Option<f64>,
    pub horizon_fade: Option<f64>,
    pub jitter_strength: Option<f64>,
    pub temporal_blend: Option<f64>,
}

struct Inner {
    staged: VolPhiParams,
    live: VolPhiParams,
}

/// Staged/live parameter holder: `configure` stages, `apply` commits,
/// `live` reads the committed set.
pub struct VolPhi {
    inner: Mutex<Inner>,
}

impl Default for VolPhi {
    fn default() -> Self {
        Self {
            inner: Mutex::new(Inner {
                staged: VolPhiParams::default(),
                live: VolPhiParams::default(),
            }),
        }
    }
}

impl VolPhi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge an update into the staged set, clamping on ingest.
    pub fn configure(&self, update: &VolPhiUpdate) {
        let mut inner = self.inner.lock();
        let mut staged = inner.staged.clone();
        if let Some(v) = update.enabled {
            staged.enabled = v;
        }
        if let Some(v) = update.distance_mul {
            staged.distance_mul = v;
        }
        if let Some(v) = update.density_mul {
            staged.density_mul = v;
        }
        if let Some(v) = update.horizon_fade {
            staged.horizon_fade = v;
        }
        if let Some(v) = update.jitter_strength {
            staged.jitter_strength = v;
        }
        if let Some(v) = update.temporal_blend {
            staged.temporal_blend = v;
        }
        inner.staged = staged.sanitized();
    }

    /// Commit the staged parameters.
    pub fn apply(&self) {
        let mut inner = self.inner.lock();
        inner.live = inner.staged.clone();
    }

    pub fn staged(&self) -> VolPhiParams {
        self.inner.lock().staged.clone()
    }

    pub fn live(&self) -> VolPhiParams {
        self.inner.lock().live.clone()
    }
}

#[cfg(test)]
#[path = "volphi_tests.rs"]
mod tests;
