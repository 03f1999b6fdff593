// SPDX-License-Identifier: MIT
// Copyright (c) 2026 TGDK Labs

//! Shared fixtures: bridge startup in a temp root with fast intervals.

use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use mb_core::LogLevel;
use mb_daemon::{
    startup, BridgeConfig, DaemonState, LogSink, RuntimeSinks, TrafficSink, UpscalerSink,
};

/// Recording sink shared across the three sink traits.
#[derive(Default)]
pub struct Recorder {
    pub enabled: Mutex<Vec<bool>>,
    pub multipliers: Mutex<Vec<f64>>,
    pub levels: Mutex<Vec<LogLevel>>,
}

impl UpscalerSink for Recorder {
    fn set_enabled(&self, enabled: bool) {
        self.enabled.lock().push(enabled);
    }
    fn set_mode(&self, _mode: mb_daemon::sinks::UpscalerMode) {}
    fn set_params(&self, _params: mb_daemon::sinks::UpscalerParams) {}
    fn resize(&self, _params: mb_daemon::sinks::ResizeParams) {}
}

impl TrafficSink for Recorder {
    fn set_multiplier(&self, mult: f64) {
        self.multipliers.lock().push(mult);
    }
}

impl LogSink for Recorder {
    fn set_level(&self, level: LogLevel) {
        self.levels.lock().push(level);
    }
}

/// A started bridge in a temp root. Socket dir, poll, and debounce env
/// overrides are applied before startup; callers run under `#[serial]`.
pub struct TestBridge {
    pub state: Option<DaemonState>,
    pub recorder: Arc<Recorder>,
    pub root: tempfile::TempDir,
}

impl TestBridge {
    pub async fn start() -> Self {
        Self::start_with(|_| {}).await
    }

    /// `prepare` can seed config/boot files under the root before startup.
    pub async fn start_with(prepare: impl FnOnce(&Path)) -> Self {
        let root = tempfile::tempdir().expect("tempdir");
        std::env::set_var("MB_SOCKET_DIR", root.path().join("sock"));
        std::env::set_var("MB_POLL_MS", "20");
        std::env::set_var("MB_DEBOUNCE_POLLS", "3");

        prepare(root.path());

        let recorder = Arc::new(Recorder::default());
        let mut config = BridgeConfig::new(root.path());
        config.init_logging = false;
        config.sinks = RuntimeSinks {
            upscaler: Some(recorder.clone()),
            traffic: Some(recorder.clone()),
            log: Some(recorder.clone()),
        };

        let state = startup(config).await.expect("bridge startup");
        Self { state: Some(state), recorder, root }
    }

    pub fn socket(&self) -> PathBuf {
        self.state.as_ref().expect("running").socket_path.clone()
    }

    pub fn state(&self) -> &DaemonState {
        self.state.as_ref().expect("running")
    }

    pub fn config_file(&self) -> PathBuf {
        mb_daemon::env::config_path(self.root.path())
    }

    pub async fn stop(mut self) {
        if let Some(state) = self.state.take() {
            mb_daemon::shutdown(state).await;
        }
        std::env::remove_var("MB_SOCKET_DIR");
        std::env::remove_var("MB_POLL_MS");
        std::env::remove_var("MB_DEBOUNCE_POLLS");
    }
}

/// Send raw lines over a fresh connection and collect one reply per line.
pub async fn raw_exchange(socket: &Path, lines: &[&str]) -> Vec<serde_json::Value> {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    let mut stream = tokio::net::UnixStream::connect(socket).await.expect("connect");
    let mut replies = Vec::new();
    for line in lines {
        stream.write_all(line.as_bytes()).await.expect("write");
        stream.write_all(b"\n").await.expect("write");
        stream.flush().await.expect("flush");

        let mut reply = Vec::new();
        let mut byte = [0u8; 1];
        loop {
            let n = stream.read(&mut byte).await.expect("read");
            assert!(n > 0, "server closed mid-reply");
            if byte[0] == b'\n' {
                break;
            }
            reply.push(byte[0]);
        }
        replies.push(serde_json::from_slice(&reply).expect("reply json"));
    }
    replies
}

/// Poll until `check` passes or `deadline` elapses.
pub async fn wait_until(deadline: Duration, mut check: impl FnMut() -> bool) -> bool {
    let start = Instant::now();
    while start.elapsed() < deadline {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    false
}
