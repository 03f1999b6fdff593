// SPDX-License-Identifier: MIT
// Copyright (c) 2026 TGDK Labs

//! Weighted round-robin worker pool.
//!
//! A fixed schedule vector (each lane repeated by its weight) is consumed
//! cyclically by a cursor; the first non-empty lane within one revolution
//! yields the next task. With all lanes saturated, executed counts converge
//! to the weight ratios.

use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, error};

use crate::{Lane, LaneStats, PoolStats};

/// Default lane weights in `Lane::ALL` order: High, Normal, Low, IO.
pub const DEFAULT_WEIGHTS: [u32; 4] = [8, 4, 1, 2];

const EWMA_ALPHA: f64 = 0.1;

type Task = Box<dyn FnOnce() + Send + 'static>;

/// Pool construction parameters.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Worker thread count; `None` means available parallelism (fallback 4).
    pub workers: Option<usize>,
    /// Per-lane weights in `Lane::ALL` order; values below 1 are raised to 1.
    pub weights: [u32; 4],
    /// Finish pending tasks on `stop()` instead of discarding them.
    pub drain_on_stop: bool,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self { workers: None, weights: DEFAULT_WEIGHTS, drain_on_stop: true }
    }
}

impl PoolConfig {
    fn worker_count(&self) -> usize {
        match self.workers {
            Some(n) => n.max(1),
            None => std::thread::available_parallelism().map(|n| n.get()).unwrap_or(4),
        }
    }

    fn schedule(&self) -> Vec<Lane> {
        let mut schedule = Vec::new();
        for lane in Lane::ALL {
            for _ in 0..self.weights[lane.index()].max(1) {
                schedule.push(lane);
            }
        }
        schedule
    }
}

#[derive(Debug, Error)]
pub enum PoolError {
    #[error("worker thread spawn failed: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("pool is stopping; start() is only valid from the stopped state")]
    Stopping,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunState {
    Stopped,
    Running,
    Stopping,
}

struct Shared {
    queues: [VecDeque<Task>; 4],
    schedule: Vec<Lane>,
    cursor: usize,
    state: RunState,
    enqueued: [u64; 4],
    executed: [u64; 4],
    ewma_usec: Option<f64>,
}

impl Shared {
    fn pending_total(&self) -> usize {
        self.queues.iter().map(|q| q.len()).sum()
    }

    /// Advance the cursor up to one full revolution; pop from the first
    /// non-empty lane encountered.
    fn pop_next(&mut self) -> Option<(Lane, Task)> {
        let len = self.schedule.len();
        for _ in 0..len {
            let lane = self.schedule[self.cursor];
            self.cursor = (self.cursor + 1) % len;
            if let Some(task) = self.queues[lane.index()].pop_front() {
                return Some((lane, task));
            }
        }
        None
    }

    fn observe_sample(&mut self, usec: f64) {
        self.ewma_usec = Some(match self.ewma_usec {
            None => usec,
            Some(prev) => EWMA_ALPHA * usec + (1.0 - EWMA_ALPHA) * prev,
        });
    }
}

struct PoolShared {
    mu: Mutex<Shared>,
    /// Wakes workers on enqueue; all-wakes on stop.
    work: Condvar,
    /// Wakes `flush()` waiters when a completion empties the queues or the
    /// pool leaves the running state.
    idle: Condvar,
}

/// Multi-lane worker pool. See the module docs for scheduling behavior.
pub struct WorkerPool {
    config: PoolConfig,
    shared: Arc<PoolShared>,
    handles: Mutex<Vec<JoinHandle<()>>>,
}

impl WorkerPool {
    pub fn new(config: PoolConfig) -> Self {
        let shared = Shared {
            queues: std::array::from_fn(|_| VecDeque::new()),
            schedule: config.schedule(),
            cursor: 0,
            state: RunState::Stopped,
            enqueued: [0; 4],
            executed: [0; 4],
            ewma_usec: None,
        };
        Self {
            config,
            shared: Arc::new(PoolShared {
                mu: Mutex::new(shared),
                work: Condvar::new(),
                idle: Condvar::new(),
            }),
            handles: Mutex::new(Vec::new()),
        }
    }

    /// Spawn workers and transition to running. Idempotent while running.
    ///
    /// Restarting after `stop()` begins a fresh run: counters, cursor, and
    /// the EWMA are reset.
    pub fn start(&self) -> Result<(), PoolError> {
        {
            let mut shared = self.shared.mu.lock();
            match shared.state {
                RunState::Running => return Ok(()),
                RunState::Stopping => return Err(PoolError::Stopping),
                RunState::Stopped => {}
            }
            shared.schedule = self.config.schedule();
            shared.cursor = 0;
            shared.enqueued = [0; 4];
            shared.executed = [0; 4];
            shared.ewma_usec = None;
            shared.state = RunState::Running;
        }

        let count = self.config.worker_count();
        let mut handles = self.handles.lock();
        for n in 0..count {
            let shared = Arc::clone(&self.shared);
            let handle = std::thread::Builder::new()
                .name(format!("mb-worker-{n}"))
                .spawn(move || worker_loop(&shared));
            match handle {
                Ok(h) => handles.push(h),
                Err(e) => {
                    // Roll back so the failed start leaves a stopped pool.
                    drop(handles);
                    self.abort_start();
                    return Err(PoolError::Spawn(e));
                }
            }
        }
        debug!(workers = count, "worker pool started");
        Ok(())
    }

    fn abort_start(&self) {
        {
            let mut shared = self.shared.mu.lock();
            shared.state = RunState::Stopping;
        }
        self.shared.work.notify_all();
        let mut handles = self.handles.lock();
        for handle in handles.drain(..) {
            let _ = handle.join();
        }
        self.shared.mu.lock().state = RunState::Stopped;
        self.shared.idle.notify_all();
    }

    /// Stop the pool and join every worker. Idempotent.
    ///
    /// With `drain_on_stop` the workers finish all pending tasks first;
    /// otherwise pending tasks are discarded.
    pub fn stop(&self) {
        {
            let mut shared = self.shared.mu.lock();
            if shared.state == RunState::Stopped {
                return;
            }
            shared.state = RunState::Stopping;
            if !self.config.drain_on_stop {
                for queue in &mut shared.queues {
                    queue.clear();
                }
            }
        }
        self.shared.work.notify_all();
        self.shared.idle.notify_all();

        let mut handles = self.handles.lock();
        for handle in handles.drain(..) {
            let _ = handle.join();
        }

        self.shared.mu.lock().state = RunState::Stopped;
        self.shared.idle.notify_all();
        debug!("worker pool stopped");
    }

    /// Block until the pool is not running or every lane is empty.
    ///
    /// Producers may keep enqueuing concurrently; this only observes a
    /// moment of quiescence, it does not fence future work.
    pub fn flush(&self) {
        let mut shared = self.shared.mu.lock();
        loop {
            if shared.state != RunState::Running || shared.pending_total() == 0 {
                return;
            }
            self.shared.idle.wait(&mut shared);
        }
    }

    /// Append a task to a lane. Returns false if the pool is not accepting
    /// work (stopped or stopping); the callable is dropped in that case.
    pub fn enqueue(&self, lane: Lane, task: impl FnOnce() + Send + 'static) -> bool {
        let mut shared = self.shared.mu.lock();
        if shared.state != RunState::Running {
            return false;
        }
        shared.queues[lane.index()].push_back(Box::new(task));
        shared.enqueued[lane.index()] += 1;
        drop(shared);
        self.shared.work.notify_one();
        true
    }

    pub fn stats(&self) -> PoolStats {
        let shared = self.shared.mu.lock();
        let mut stats = PoolStats {
            lanes: [LaneStats::default(); 4],
            ewma_usec: shared.ewma_usec.unwrap_or(0.0),
        };
        for lane in Lane::ALL {
            let i = lane.index();
            stats.lanes[i] = LaneStats {
                enqueued: shared.enqueued[i],
                executed: shared.executed[i],
                pending: shared.queues[i].len(),
            };
        }
        stats
    }

    pub fn is_running(&self) -> bool {
        self.shared.mu.lock().state == RunState::Running
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.stop();
    }
}

fn worker_loop(shared: &PoolShared) {
    let mut guard = shared.mu.lock();
    loop {
        if let Some((lane, task)) = guard.pop_next() {
            drop(guard);
            let usec = run_one(lane, task);
            guard = shared.mu.lock();
            guard.executed[lane.index()] += 1;
            guard.observe_sample(usec);
            if guard.pending_total() == 0 {
                shared.idle.notify_all();
            }
            continue;
        }

        match guard.state {
            RunState::Running => shared.work.wait(&mut guard),
            RunState::Stopping | RunState::Stopped => return,
        }
    }
}

/// Execute one task with timing and panic isolation.
///
/// Returns the wallclock sample in microseconds; panics count as executed.
fn run_one(lane: Lane, task: Task) -> f64 {
    let started = Instant::now();
    let result = catch_unwind(AssertUnwindSafe(task));
    let usec = started.elapsed().as_secs_f64() * 1e6;
    if let Err(payload) = result {
        error!(lane = %lane, "worker task panicked: {}", panic_message(&payload));
    }
    usec
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "<non-string panic payload>".to_string()
    }
}

#[cfg(test)]
#[path = "pool_tests.rs"]
mod tests;
