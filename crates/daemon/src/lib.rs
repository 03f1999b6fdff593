// SPDX-License-Identifier: MIT
// Copyright (c) 2026 TGDK Labs

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! mb-daemon: the MirrorBlade bridge itself.
//!
//! Owns the operation registry, the RPC server over the local endpoint, the
//! config persistence/watcher pair, the runtime sinks, and the orchestrator
//! lifecycle that wires everything together.

pub mod bootscript;
pub mod env;
pub mod lifecycle;
pub mod logging;
pub mod ops;
pub mod persist;
pub mod registry;
pub mod server;
pub mod sinks;
pub mod watcher;

pub use lifecycle::{run, shutdown, startup, BridgeConfig, DaemonState, LifecycleError};
pub use ops::{register_all, OpCtx};
pub use registry::{OpError, OpRegistry};
pub use sinks::{apply_runtime, LogSink, RuntimeSinks, TrafficSink, UpscalerSink};
