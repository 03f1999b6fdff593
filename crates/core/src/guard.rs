// SPDX-License-Identifier: MIT
// Copyright (c) 2026 TGDK Labs

//! Per-feature enable flags with auto-disable on repeated failure.

use parking_lot::Mutex;
use serde::Serialize;
use std::collections::HashMap;

/// Failures tolerated before a feature is switched off.
pub const DEFAULT_FAIL_THRESHOLD: u32 = 3;

/// State of one named feature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeatureState {
    pub enabled: bool,
    pub failures: u32,
    pub fail_threshold: u32,
}

impl Default for FeatureState {
    fn default() -> Self {
        Self { enabled: true, failures: 0, fail_threshold: DEFAULT_FAIL_THRESHOLD }
    }
}

/// Result of a guarded execution.
#[derive(Debug, PartialEq, Eq)]
pub enum GuardOutcome<T, E> {
    /// The feature is disabled; the closure did not run.
    Skipped,
    /// The closure ran and succeeded.
    Completed(T),
    /// The closure ran and failed; the failure counter was bumped.
    Failed(E),
}

impl<T, E> GuardOutcome<T, E> {
    pub fn ran(&self) -> bool {
        !matches!(self, Self::Skipped)
    }
}

/// Registry of feature guards, created lazily on first reference.
#[derive(Default)]
pub struct FeatureGuards {
    features: Mutex<HashMap<String, FeatureState>>,
}

impl FeatureGuards {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` if the feature is enabled.
    ///
    /// The enabled check happens under the lock; `f` itself executes outside
    /// it. A failure increments the counter and disables the feature once
    /// the threshold is reached.
    pub fn guarded_run<T, E>(
        &self,
        name: &str,
        f: impl FnOnce() -> Result<T, E>,
    ) -> GuardOutcome<T, E> {
        {
            let mut features = self.features.lock();
            let state = features.entry(name.to_string()).or_default();
            if !state.enabled {
                return GuardOutcome::Skipped;
            }
        }

        match f() {
            Ok(value) => GuardOutcome::Completed(value),
            Err(err) => {
                let mut features = self.features.lock();
                let state = features.entry(name.to_string()).or_default();
                state.failures += 1;
                if state.failures >= state.fail_threshold {
                    state.enabled = false;
                }
                GuardOutcome::Failed(err)
            }
        }
    }

    /// Current state, creating the feature with defaults if unseen.
    pub fn state(&self, name: &str) -> FeatureState {
        self.features.lock().entry(name.to_string()).or_default().clone()
    }

    /// Flip a feature. Re-enabling resets the failure counter.
    pub fn set_enabled(&self, name: &str, enabled: bool) {
        let mut features = self.features.lock();
        let state = features.entry(name.to_string()).or_default();
        state.enabled = enabled;
        if enabled {
            state.failures = 0;
        }
    }

    /// Snapshot of every known feature, sorted by name.
    pub fn all(&self) -> Vec<(String, FeatureState)> {
        let mut entries: Vec<_> = self
            .features
            .lock()
            .iter()
            .map(|(name, state)| (name.clone(), state.clone()))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }
}

#[cfg(test)]
#[path = "guard_tests.rs"]
mod tests;
