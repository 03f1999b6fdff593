// SPDX-License-Identifier: MIT
// Copyright (c) 2026 TGDK Labs

//! Pool counters exposed to diagnostics.

use serde::Serialize;

use crate::Lane;

/// Counters for one lane.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LaneStats {
    pub enqueued: u64,
    pub executed: u64,
    pub pending: usize,
}

/// Atomic snapshot of the whole pool.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PoolStats {
    pub lanes: [LaneStats; 4],
    /// EWMA of per-task wallclock in microseconds; 0 until the first sample.
    pub ewma_usec: f64,
}

impl PoolStats {
    pub fn lane(&self, lane: Lane) -> &LaneStats {
        &self.lanes[lane.index()]
    }

    pub fn total_enqueued(&self) -> u64 {
        self.lanes.iter().map(|l| l.enqueued).sum()
    }

    pub fn total_executed(&self) -> u64 {
        self.lanes.iter().map(|l| l.executed).sum()
    }

    pub fn total_pending(&self) -> usize {
        self.lanes.iter().map(|l| l.pending).sum()
    }
}
