// SPDX-License-Identifier: MIT
// Copyright (c) 2026 TGDK Labs

use super::*;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc;
use std::time::Duration;

fn single_worker_pool(drain: bool) -> WorkerPool {
    WorkerPool::new(PoolConfig {
        workers: Some(1),
        weights: DEFAULT_WEIGHTS,
        drain_on_stop: drain,
    })
}

/// Block the pool's only worker until the returned sender is dropped or
/// signalled, so queues can be filled deterministically.
fn gate(pool: &WorkerPool) -> mpsc::Sender<()> {
    let (tx, rx) = mpsc::channel::<()>();
    assert!(pool.enqueue(Lane::High, move || {
        let _ = rx.recv();
    }));
    tx
}

#[test]
fn enqueue_rejected_while_stopped() {
    let pool = single_worker_pool(true);
    assert!(!pool.enqueue(Lane::Normal, || {}));
    assert_eq!(pool.stats().total_enqueued(), 0);
}

#[test]
fn start_is_idempotent() {
    let pool = single_worker_pool(true);
    pool.start().unwrap();
    pool.start().unwrap();
    assert!(pool.is_running());
    pool.stop();
}

#[test]
fn stop_is_idempotent() {
    let pool = single_worker_pool(true);
    pool.start().unwrap();
    pool.stop();
    pool.stop();
    assert!(!pool.is_running());
}

#[test]
fn drain_on_stop_executes_everything() {
    let pool = single_worker_pool(true);
    pool.start().unwrap();
    let gate_tx = gate(&pool);

    let counter = Arc::new(AtomicU64::new(0));
    for lane in Lane::ALL {
        for _ in 0..25 {
            let counter = Arc::clone(&counter);
            assert!(pool.enqueue(lane, move || {
                counter.fetch_add(1, Ordering::Relaxed);
            }));
        }
    }
    drop(gate_tx);
    pool.stop();

    assert_eq!(counter.load(Ordering::Relaxed), 100);
    let stats = pool.stats();
    assert_eq!(stats.total_executed(), stats.total_enqueued());
    assert_eq!(stats.total_pending(), 0);
}

#[test]
fn abort_on_stop_discards_pending() {
    let pool = single_worker_pool(false);
    pool.start().unwrap();
    let gate_tx = gate(&pool);

    let counter = Arc::new(AtomicU64::new(0));
    for _ in 0..50 {
        let counter = Arc::clone(&counter);
        assert!(pool.enqueue(Lane::Low, move || {
            counter.fetch_add(1, Ordering::Relaxed);
        }));
    }

    // Release the gate only after stop() has cleared the queues; the worker
    // is still inside the gate task, so nothing else can run.
    let releaser = std::thread::spawn(move || {
        std::thread::sleep(Duration::from_millis(50));
        drop(gate_tx);
    });
    pool.stop();
    releaser.join().unwrap();

    assert_eq!(counter.load(Ordering::Relaxed), 0);
    assert_eq!(pool.stats().total_pending(), 0);
}

#[test]
fn weighted_round_robin_order_with_saturated_lanes() {
    let pool = WorkerPool::new(PoolConfig {
        workers: Some(1),
        weights: [2, 1, 1, 1],
        drain_on_stop: true,
    });
    pool.start().unwrap();
    let gate_tx = gate(&pool);

    let order = Arc::new(parking_lot::Mutex::new(Vec::new()));
    for lane in Lane::ALL {
        for _ in 0..4 {
            let order = Arc::clone(&order);
            assert!(pool.enqueue(lane, move || order.lock().push(lane)));
        }
    }
    drop(gate_tx);
    pool.stop();

    let order = order.lock();
    assert_eq!(order.len(), 16);
    // Cursor starts right after the gate task's High slot, so the first
    // revolution continues H, then N L IO, then wraps to H H N L IO...
    assert_eq!(
        &order[..9],
        &[
            Lane::High,
            Lane::Normal,
            Lane::Low,
            Lane::Io,
            Lane::High,
            Lane::High,
            Lane::Normal,
            Lane::Low,
            Lane::Io,
        ]
    );
}

#[test]
fn fifo_within_a_lane() {
    let pool = single_worker_pool(true);
    pool.start().unwrap();
    let gate_tx = gate(&pool);

    let order = Arc::new(parking_lot::Mutex::new(Vec::new()));
    for n in 0..20 {
        let order = Arc::clone(&order);
        assert!(pool.enqueue(Lane::Normal, move || order.lock().push(n)));
    }
    drop(gate_tx);
    pool.stop();

    let order = order.lock();
    assert_eq!(*order, (0..20).collect::<Vec<_>>());
}

#[test]
fn panicking_task_is_isolated_and_counted() {
    let pool = single_worker_pool(true);
    pool.start().unwrap();

    let counter = Arc::new(AtomicU64::new(0));
    assert!(pool.enqueue(Lane::High, || panic!("deliberate test panic")));
    let after = Arc::clone(&counter);
    assert!(pool.enqueue(Lane::High, move || {
        after.fetch_add(1, Ordering::Relaxed);
    }));
    pool.flush();
    pool.stop();

    assert_eq!(counter.load(Ordering::Relaxed), 1);
    assert_eq!(pool.stats().lane(Lane::High).executed, 2);
}

#[test]
fn flush_waits_for_quiescence() {
    let pool = WorkerPool::new(PoolConfig {
        workers: Some(2),
        weights: DEFAULT_WEIGHTS,
        drain_on_stop: true,
    });
    pool.start().unwrap();

    let counter = Arc::new(AtomicU64::new(0));
    for _ in 0..40 {
        let counter = Arc::clone(&counter);
        assert!(pool.enqueue(Lane::Io, move || {
            std::thread::sleep(Duration::from_millis(1));
            counter.fetch_add(1, Ordering::Relaxed);
        }));
    }
    pool.flush();
    assert_eq!(pool.stats().total_pending(), 0);
    pool.stop();
    assert_eq!(counter.load(Ordering::Relaxed), 40);
}

#[test]
fn flush_returns_immediately_when_stopped() {
    let pool = single_worker_pool(true);
    pool.flush();
}

#[test]
fn ewma_tracks_task_timing() {
    let pool = single_worker_pool(true);
    pool.start().unwrap();
    for _ in 0..5 {
        assert!(pool.enqueue(Lane::Normal, || {
            std::thread::sleep(Duration::from_millis(2));
        }));
    }
    pool.flush();
    pool.stop();
    // Each sample is at least 2ms; the EWMA must be too.
    assert!(pool.stats().ewma_usec >= 2_000.0);
}

#[test]
fn restart_resets_counters() {
    let pool = single_worker_pool(true);
    pool.start().unwrap();
    assert!(pool.enqueue(Lane::High, || {}));
    pool.stop();
    assert_eq!(pool.stats().total_executed(), 1);

    pool.start().unwrap();
    assert_eq!(pool.stats().total_executed(), 0);
    assert_eq!(pool.stats().total_enqueued(), 0);
    assert_eq!(pool.stats().ewma_usec, 0.0);
    pool.stop();
}

#[test]
fn enqueue_rejected_after_stop() {
    let pool = single_worker_pool(true);
    pool.start().unwrap();
    pool.stop();
    assert!(!pool.enqueue(Lane::Io, || {}));
}

#[test]
fn executed_ratios_follow_weights_when_saturated() {
    // Single worker, pre-filled queues sized proportionally to the weights:
    // a full drain then preserves exact weight ratios across revolutions.
    let pool = WorkerPool::new(PoolConfig {
        workers: Some(1),
        weights: DEFAULT_WEIGHTS,
        drain_on_stop: true,
    });
    pool.start().unwrap();
    let gate_tx = gate(&pool);

    for lane in Lane::ALL {
        let per_lane = DEFAULT_WEIGHTS[lane.index()] * 10;
        for _ in 0..per_lane {
            assert!(pool.enqueue(lane, || {}));
        }
    }
    drop(gate_tx);
    pool.stop();

    let stats = pool.stats();
    for lane in Lane::ALL {
        // +1 on High for the gate task.
        let expected = u64::from(DEFAULT_WEIGHTS[lane.index()]) * 10
            + u64::from(lane == Lane::High);
        assert_eq!(stats.lane(lane).executed, expected);
    }
}
