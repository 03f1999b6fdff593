// SPDX-License-Identifier: MIT
// Copyright (c) 2026 TGDK Labs

//! Folding field: named 1-D attractors ("creases") applied in priority order.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use thiserror::Error;

/// Falloff kernel. All kernels satisfy `K(0) = 1` and `K(t) = 0` for `t >= 1`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Kernel {
    Linear,
    #[default]
    Smooth,
    Cosine,
    Hermite,
}

impl Kernel {
    /// Kernel weight at normalized distance `t`.
    pub fn weight(self, t: f64) -> f64 {
        if t >= 1.0 {
            return 0.0;
        }
        let t = t.max(0.0);
        match self {
            Kernel::Linear => 1.0 - t,
            Kernel::Smooth => 1.0 - (3.0 * t * t - 2.0 * t * t * t),
            Kernel::Cosine => 0.5 * (1.0 + (std::f64::consts::PI * t).cos()),
            Kernel::Hermite => {
                let t2 = t * t;
                let t3 = t2 * t;
                1.0 - (6.0 * t3 * t2 - 15.0 * t2 * t2 + 10.0 * t3)
            }
        }
    }

    /// dK/dt at normalized distance `t` (0 outside the support).
    pub fn weight_deriv(self, t: f64) -> f64 {
        if !(0.0..1.0).contains(&t) {
            return 0.0;
        }
        match self {
            Kernel::Linear => -1.0,
            Kernel::Smooth => -(6.0 * t - 6.0 * t * t),
            Kernel::Cosine => -0.5 * std::f64::consts::PI * (std::f64::consts::PI * t).sin(),
            Kernel::Hermite => {
                let t2 = t * t;
                -(30.0 * t2 * t2 - 60.0 * t2 * t + 30.0 * t2)
            }
        }
    }
}

/// One attractor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Crease {
    pub position: f64,
    pub radius: f64,
    #[serde(default = "default_gain")]
    pub gain: f64,
    #[serde(default)]
    pub priority: i32,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_gain() -> f64 {
    1.0
}

fn default_enabled() -> bool {
    true
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum FoldError {
    #[error("crease '{name}' has non-positive radius {radius}")]
    InvalidRadius { name: String, radius: f64 },

    #[error("invalid folding-field config: {0}")]
    BadConfig(String),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct FieldConfig {
    #[serde(default)]
    kernel: Kernel,
    #[serde(default)]
    creases: BTreeMap<String, Crease>,
}

struct Inner {
    kernel: Kernel,
    creases: BTreeMap<String, Crease>,
}

/// Set of named creases evaluated in ascending priority (name tiebreak).
///
/// With no creases, or all disabled, evaluation is the identity.
pub struct FoldingField {
    inner: Mutex<Inner>,
}

impl Default for FoldingField {
    fn default() -> Self {
        Self::new()
    }
}

impl FoldingField {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner { kernel: Kernel::default(), creases: BTreeMap::new() }),
        }
    }

    pub fn set_kernel(&self, kernel: Kernel) {
        self.inner.lock().kernel = kernel;
    }

    pub fn kernel(&self) -> Kernel {
        self.inner.lock().kernel
    }

    /// Insert or replace a crease. The radius must be strictly positive.
    pub fn set_crease(&self, name: &str, crease: Crease) -> Result<(), FoldError> {
        if crease.radius <= 0.0 || !crease.radius.is_finite() {
            return Err(FoldError::InvalidRadius { name: name.to_string(), radius: crease.radius });
        }
        self.inner.lock().creases.insert(name.to_string(), crease);
        Ok(())
    }

    pub fn remove_crease(&self, name: &str) -> bool {
        self.inner.lock().creases.remove(name).is_some()
    }

    pub fn clear(&self) {
        self.inner.lock().creases.clear();
    }

    pub fn crease_count(&self) -> usize {
        self.inner.lock().creases.len()
    }

    /// Apply every enabled crease to `x` in (priority, name) order.
    pub fn evaluate(&self, x: f64) -> f64 {
        let inner = self.inner.lock();
        let mut y = x;
        for (_, crease) in ordered(&inner.creases) {
            let t = (y - crease.position).abs() / crease.radius;
            let w = inner.kernel.weight(t);
            if w > 0.0 {
                y += crease.gain * w * (crease.position - y);
            }
        }
        y
    }

    /// Analytic d(evaluate)/dx via the chain rule across creases.
    pub fn derivative(&self, x: f64) -> f64 {
        let inner = self.inner.lock();
        let mut y = x;
        let mut d = 1.0;
        for (_, crease) in ordered(&inner.creases) {
            let t = (y - crease.position).abs() / crease.radius;
            let w = inner.kernel.weight(t);
            let dw = inner.kernel.weight_deriv(t);
            // dy'/dy = 1 - g*K(t) - g*K'(t)*t  (sign(y-p)*(p-y) = -|y-p|)
            d *= 1.0 - crease.gain * w - crease.gain * dw * t;
            if w > 0.0 {
                y += crease.gain * w * (crease.position - y);
            }
        }
        d
    }

    pub fn evaluate_many(&self, xs: &[f64]) -> Vec<f64> {
        xs.iter().map(|&x| self.evaluate(x)).collect()
    }

    /// Replace kernel and crease set from a JSON config.
    pub fn configure(&self, value: &Value) -> Result<(), FoldError> {
        let config: FieldConfig = serde_json::from_value(value.clone())
            .map_err(|e| FoldError::BadConfig(e.to_string()))?;
        for (name, crease) in &config.creases {
            if crease.radius <= 0.0 || !crease.radius.is_finite() {
                return Err(FoldError::InvalidRadius {
                    name: name.clone(),
                    radius: crease.radius,
                });
            }
        }
        let mut inner = self.inner.lock();
        inner.kernel = config.kernel;
        inner.creases = config.creases;
        Ok(())
    }

    /// JSON snapshot in the same shape `configure` accepts.
    pub fn snapshot(&self) -> Value {
        let inner = self.inner.lock();
        let config =
            FieldConfig { kernel: inner.kernel, creases: inner.creases.clone() };
        serde_json::to_value(config).unwrap_or(Value::Null)
    }
}

/// Creases in ascending (priority, name) order.
fn ordered(creases: &BTreeMap<String, Crease>) -> Vec<(&String, &Crease)> {
    let mut entries: Vec<_> = creases.iter().filter(|(_, c)| c.enabled).collect();
    entries.sort_by(|a, b| a.1.priority.cmp(&b.1.priority).then_with(|| a.0.cmp(b.0)));
    entries
}

#[cfg(test)]
#[path = "fold_tests.rs"]
mod tests;
