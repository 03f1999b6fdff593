// SPDX-License-Identifier: MIT
// Copyright (c) 2026 TGDK Labs

//! Bounded ring of scalar samples with summary statistics.

use parking_lot::Mutex;
use serde::Serialize;
use std::collections::VecDeque;

/// Default sample capacity.
pub const DEFAULT_SAMPLE_LIMIT: usize = 512;

/// Summary over the ring's current contents.
///
/// `stddev` is the population standard deviation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RingStats {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub stddev: f64,
}

impl RingStats {
    fn empty() -> Self {
        Self { count: 0, min: 0.0, max: 0.0, mean: 0.0, stddev: 0.0 }
    }
}

/// Fixed-capacity ring of doubles; oldest evicted on overflow.
pub struct SampleRing {
    inner: Mutex<Inner>,
}

struct Inner {
    samples: VecDeque<f64>,
    limit: usize,
}

impl Default for SampleRing {
    fn default() -> Self {
        Self::with_limit(DEFAULT_SAMPLE_LIMIT)
    }
}

impl SampleRing {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limit(limit: usize) -> Self {
        Self {
            inner: Mutex::new(Inner {
                samples: VecDeque::new(),
                limit: limit.max(1),
            }),
        }
    }

    pub fn push(&self, v: f64) {
        let mut inner = self.inner.lock();
        if inner.samples.len() == inner.limit {
            inner.samples.pop_front();
        }
        inner.samples.push_back(v);
    }

    pub fn len(&self) -> usize {
        self.inner.lock().samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Last `n` samples, oldest first.
    pub fn snapshot(&self, n: usize) -> Vec<f64> {
        let inner = self.inner.lock();
        let skip = inner.samples.len().saturating_sub(n);
        inner.samples.iter().skip(skip).copied().collect()
    }

    pub fn stats(&self) -> RingStats {
        let inner = self.inner.lock();
        if inner.samples.is_empty() {
            return RingStats::empty();
        }
        let count = inner.samples.len();
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        let mut sum = 0.0;
        for &v in &inner.samples {
            min = min.min(v);
            max = max.max(v);
            sum += v;
        }
        let mean = sum / count as f64;
        let var = inner
            .samples
            .iter()
            .map(|&v| (v - mean) * (v - mean))
            .sum::<f64>()
            / count as f64;
        RingStats { count, min, max, mean, stddev: var.sqrt() }
    }
}

#[cfg(test)]
#[path = "ring_tests.rs"]
mod tests;
