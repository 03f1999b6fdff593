// SPDX-License-Identifier: MIT
// Copyright (c) 2026 TGDK Labs

//! Recovery smoother: 1-D spring-damper with hysteresis and jump cooldown.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// Smoother tuning. Every field is clamped to a sane domain on ingest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SmootherParams {
    /// Pass-through when false: output equals input, state tracks input.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Force output and velocity to zero regardless of input.
    #[serde(default)]
    pub abide_emptiness: bool,
    #[serde(default = "default_stiffness")]
    pub stiffness: f64,
    #[serde(default = "default_damping")]
    pub damping: f64,
    /// Inputs within this band of the current output do not move the target.
    #[serde(default)]
    pub hysteresis: f64,
    /// An input jump beyond this distance triggers the cooldown; 0 disables.
    #[serde(default)]
    pub jump_threshold: f64,
    #[serde(default)]
    pub cooldown_secs: f64,
    /// Stiffness multiplier while cooling down.
    #[serde(default = "default_cooldown_scale")]
    pub cooldown_stiffness_scale: f64,
    #[serde(default)]
    pub clamp_min: Option<f64>,
    #[serde(default)]
    pub clamp_max: Option<f64>,
    #[serde(default)]
    pub max_velocity: Option<f64>,
    /// First sample snaps the output instead of springing from zero.
    #[serde(default = "default_true")]
    pub snap_on_first: bool,
}

fn default_true() -> bool {
    true
}

fn default_stiffness() -> f64 {
    40.0
}

fn default_damping() -> f64 {
    12.0
}

fn default_cooldown_scale() -> f64 {
    0.25
}

impl Default for SmootherParams {
    fn default() -> Self {
        Self {
            enabled: true,
            abide_emptiness: false,
            stiffness: default_stiffness(),
            damping: default_damping(),
            hysteresis: 0.0,
            jump_threshold: 0.0,
            cooldown_secs: 0.0,
            cooldown_stiffness_scale: default_cooldown_scale(),
            clamp_min: None,
            clamp_max: None,
            max_velocity: None,
            snap_on_first: true,
        }
    }
}

impl SmootherParams {
    fn sanitized(mut self) -> Self {
        self.stiffness = self.stiffness.max(0.0);
        self.damping = self.damping.max(0.0);
        self.hysteresis = self.hysteresis.max(0.0);
        self.jump_threshold = self.jump_threshold.max(0.0);
        self.cooldown_secs = self.cooldown_secs.max(0.0);
        self.cooldown_stiffness_scale = self.cooldown_stiffness_scale.clamp(0.0, 1.0);
        self
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct State {
    y: f64,
    v: f64,
    primed: bool,
    cooldown_left: f64,
}

/// Spring-damper smoother with interior state.
pub struct RecoverySmoother {
    inner: Mutex<(SmootherParams, State)>,
}

impl Default for RecoverySmoother {
    fn default() -> Self {
        Self::new(SmootherParams::default())
    }
}

impl RecoverySmoother {
    pub fn new(params: SmootherParams) -> Self {
        Self { inner: Mutex::new((params.sanitized(), State::default())) }
    }

    pub fn set_params(&self, params: SmootherParams) {
        self.inner.lock().0 = params.sanitized();
    }

    pub fn params(&self) -> SmootherParams {
        self.inner.lock().0.clone()
    }

    /// Advance one step and return the smoothed output.
    pub fn step(&self, dt: f64, x: f64) -> f64 {
        let mut inner = self.inner.lock();
        let (params, state) = (inner.0.clone(), inner.1);
        let next = advance(&params, state, dt, x);
        inner.1 = next;
        next.y
    }

    /// Simulate one step without committing state.
    pub fn peek_next(&self, dt: f64, x: f64) -> f64 {
        let inner = self.inner.lock();
        advance(&inner.0, inner.1, dt, x).y
    }

    pub fn velocity(&self) -> f64 {
        self.inner.lock().1.v
    }

    /// Drop all interior state; the next sample behaves like the first.
    pub fn reset(&self) {
        self.inner.lock().1 = State::default();
    }
}

/// Pure step function shared by `step` and `peek_next`.
fn advance(params: &SmootherParams, mut state: State, dt: f64, x: f64) -> State {
    if params.abide_emptiness {
        state.y = 0.0;
        state.v = 0.0;
        state.primed = true;
        return state;
    }
    if !params.enabled {
        state.y = x;
        state.v = 0.0;
        state.primed = true;
        return state;
    }

    if !state.primed {
        state.primed = true;
        if params.snap_on_first {
            state.y = clamp_opt(x, params.clamp_min, params.clamp_max);
            state.v = 0.0;
            return state;
        }
    }

    let dt = dt.max(0.0);
    if dt == 0.0 {
        return state;
    }

    if params.jump_threshold > 0.0 && (x - state.y).abs() > params.jump_threshold {
        state.cooldown_left = params.cooldown_secs;
    }

    let stiffness = if state.cooldown_left > 0.0 {
        params.stiffness * params.cooldown_stiffness_scale
    } else {
        params.stiffness
    };

    let target = if (x - state.y).abs() <= params.hysteresis { state.y } else { x };

    let accel = stiffness * (target - state.y) - params.damping * state.v;
    state.v += accel * dt;
    if let Some(cap) = params.max_velocity {
        let cap = cap.abs();
        state.v = state.v.clamp(-cap, cap);
    }
    state.y = clamp_opt(state.y + state.v * dt, params.clamp_min, params.clamp_max);
    state.cooldown_left = (state.cooldown_left - dt).max(0.0);
    state
}

fn clamp_opt(mut v: f64, lo: Option<f64>, hi: Option<f64>) -> f64 {
    if let Some(lo) = lo {
        v = v.max(lo);
    }
    if let Some(hi) = hi {
        v = v.min(hi);
    }
    v
}

#[cfg(test)]
#[path = "recover_tests.rs"]
mod tests;
