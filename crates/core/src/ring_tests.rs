// SPDX-License-Identifier: MIT
// Copyright (c) 2026 TGDK Labs

use super::*;

#[test]
fn empty_ring_stats_are_zero() {
    let ring = SampleRing::new();
    assert_eq!(ring.stats(), RingStats { count: 0, min: 0.0, max: 0.0, mean: 0.0, stddev: 0.0 });
}

#[test]
fn stats_over_known_samples() {
    let ring = SampleRing::new();
    for v in [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0] {
        ring.push(v);
    }
    let stats = ring.stats();
    assert_eq!(stats.count, 8);
    assert_eq!(stats.min, 2.0);
    assert_eq!(stats.max, 9.0);
    assert_eq!(stats.mean, 5.0);
    // Classic population-stddev example set.
    assert!((stats.stddev - 2.0).abs() < 1e-12);
}

#[test]
fn overflow_drops_oldest() {
    let ring = SampleRing::with_limit(4);
    for v in 0..8 {
        ring.push(v as f64);
    }
    assert_eq!(ring.snapshot(10), vec![4.0, 5.0, 6.0, 7.0]);
}

#[test]
fn snapshot_is_trailing_and_oldest_first() {
    let ring = SampleRing::new();
    for v in 0..6 {
        ring.push(v as f64);
    }
    assert_eq!(ring.snapshot(3), vec![3.0, 4.0, 5.0]);
    assert_eq!(ring.snapshot(0), Vec::<f64>::new());
}

#[test]
fn single_sample_stats() {
    let ring = SampleRing::new();
    ring.push(3.5);
    let stats = ring.stats();
    assert_eq!(stats.count, 1);
    assert_eq!(stats.min, 3.5);
    assert_eq!(stats.max, 3.5);
    assert_eq!(stats.mean, 3.5);
    assert_eq!(stats.stddev, 0.0);
}
