// SPDX-License-Identifier: MIT
// Copyright (c) 2026 TGDK Labs

//! Priority lanes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the four priority bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Lane {
    High,
    Normal,
    Low,
    Io,
}

impl Lane {
    /// All lanes in scheduling order (the order weights are declared in).
    pub const ALL: [Lane; 4] = [Lane::High, Lane::Normal, Lane::Low, Lane::Io];

    /// Stable index into per-lane arrays.
    pub fn index(self) -> usize {
        match self {
            Lane::High => 0,
            Lane::Normal => 1,
            Lane::Low => 2,
            Lane::Io => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Lane::High => "high",
            Lane::Normal => "normal",
            Lane::Low => "low",
            Lane::Io => "io",
        }
    }
}

impl fmt::Display for Lane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
#[path = "lane_tests.rs"]
mod tests;
