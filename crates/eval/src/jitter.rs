// SPDX-License-Identifier: MIT
// Copyright (c) 2026 TGDK Labs

//! Volumetric jitter from the Halton(2,3) low-discrepancy sequence.

use parking_lot::Mutex;

/// Radical inverse of `index` in the given base.
fn radical_inverse(mut index: u64, base: u64) -> f64 {
    let mut result = 0.0;
    let mut fraction = 1.0 / base as f64;
    while index > 0 {
        result += (index % base) as f64 * fraction;
        index /= base;
        fraction /= base as f64;
    }
    result
}

struct Inner {
    index: u64,
    strength: f64,
}

/// Deterministic 2-D jitter source.
///
/// The index starts at 1 so the first sample is never the origin, and
/// advances by exactly one per `advance` call regardless of `dt`.
pub struct HaltonJitter {
    inner: Mutex<Inner>,
}

impl Default for HaltonJitter {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl HaltonJitter {
    pub fn new(strength: f64) -> Self {
        Self { inner: Mutex::new(Inner { index: 1, strength: strength.max(0.0) }) }
    }

    /// Jitter strength multiplier, clamped to be non-negative.
    pub fn set_strength(&self, strength: f64) {
        self.inner.lock().strength = if strength.is_finite() { strength.max(0.0) } else { 0.0 };
    }

    pub fn strength(&self) -> f64 {
        self.inner.lock().strength
    }

    pub fn index(&self) -> u64 {
        self.inner.lock().index
    }

    /// Step the sequence. `dt` is accepted for interface symmetry with the
    /// other evaluators; the advance is always exactly one index.
    pub fn advance(&self, _dt: f64) {
        let mut inner = self.inner.lock();
        inner.index = inner.index.wrapping_add(1);
    }

    /// Centered jitter offsets in `[-0.5, 0.5] * strength`.
    pub fn current_jitter(&self) -> (f64, f64) {
        let inner = self.inner.lock();
        (
            (radical_inverse(inner.index, 2) - 0.5) * inner.strength,
            (radical_inverse(inner.index, 3) - 0.5) * inner.strength,
        )
    }

    pub fn reset(&self) {
        self.inner.lock().index = 1;
    }
}

#[cfg(test)]
#[path = "jitter_tests.rs"]
mod tests;
