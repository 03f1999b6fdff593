// SPDX-License-Identifier: MIT
// Copyright (c) 2026 TGDK Labs

//! Bounded in-memory telemetry event ring.

use parking_lot::Mutex;
use serde::Serialize;
use std::collections::VecDeque;

/// Default event capacity.
pub const DEFAULT_TELEMETRY_LIMIT: usize = 512;

/// One telemetry event.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TelemetryEvent {
    /// Monotonic timestamp in microseconds (caller-assigned).
    pub at_us: u64,
    pub name: String,
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub tag: String,
}

/// Fixed-capacity ring of telemetry events; oldest evicted on overflow.
pub struct TelemetryRing {
    inner: Mutex<Inner>,
}

struct Inner {
    events: VecDeque<TelemetryEvent>,
    limit: usize,
}

impl Default for TelemetryRing {
    fn default() -> Self {
        Self::with_limit(DEFAULT_TELEMETRY_LIMIT)
    }
}

impl TelemetryRing {
    pub fn new() -> Self {
        Self::default()
    }

    /// A zero limit is bumped to 1 so the ring always holds the newest event.
    pub fn with_limit(limit: usize) -> Self {
        Self {
            inner: Mutex::new(Inner {
                events: VecDeque::new(),
                limit: limit.max(1),
            }),
        }
    }

    pub fn push(&self, event: TelemetryEvent) {
        let mut inner = self.inner.lock();
        if inner.events.len() == inner.limit {
            inner.events.pop_front();
        }
        inner.events.push_back(event);
    }

    pub fn len(&self) -> usize {
        self.inner.lock().events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Last `max` events in chronological order.
    pub fn snapshot(&self, max: usize) -> Vec<TelemetryEvent> {
        let inner = self.inner.lock();
        let skip = inner.events.len().saturating_sub(max);
        inner.events.iter().skip(skip).cloned().collect()
    }
}

#[cfg(test)]
#[path = "telemetry_tests.rs"]
mod tests;
