// SPDX-License-Identifier: MIT
// Copyright (c) 2026 TGDK Labs

//! Hot-reload scenarios: file edits propagate without any RPC.

use serde_json::json;
use serial_test::serial;
use std::time::Duration;

use mb_core::LogLevel;
use mb_wire::{Client, Request};

use super::support::{wait_until, TestBridge};

fn write_config(bridge: &TestBridge, contents: &str) {
    let path = bridge.config_file();
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, contents).unwrap();
}

#[tokio::test]
#[serial]
async fn file_edit_reaches_the_upscaler_sink() {
    let bridge = TestBridge::start().await;
    assert!(!bridge.state().store.upscaler_enabled());

    write_config(&bridge, r#"{"upscaler_enabled": true, "traffic_boost": 3.0}"#);

    // Spec bound: observed within 2 seconds, with no RPC involved.
    let recorder = bridge.recorder.clone();
    let seen = wait_until(Duration::from_secs(2), || {
        recorder.enabled.lock().contains(&true)
    })
    .await;
    assert!(seen, "upscaler sink never observed the reload");
    assert!(bridge.state().store.upscaler_enabled());
    assert_eq!(bridge.state().store.traffic_boost(), 3.0);
    bridge.stop().await;
}

#[tokio::test]
#[serial]
async fn reload_clamps_and_coerces_fields() {
    let bridge = TestBridge::start().await;
    write_config(
        &bridge,
        r#"{"traffic_boost": 9999.0, "log_level": "extreme", "unknown_field": 1}"#,
    );

    let store = bridge.state().store.clone();
    let seen = wait_until(Duration::from_secs(2), || store.traffic_boost() == 50.0).await;
    assert!(seen);
    assert_eq!(store.log_level(), LogLevel::Info);
    bridge.stop().await;
}

#[tokio::test]
#[serial]
async fn log_level_edit_reaches_the_log_sink() {
    let bridge = TestBridge::start().await;
    write_config(&bridge, r#"{"log_level": "error"}"#);

    let recorder = bridge.recorder.clone();
    let seen = wait_until(Duration::from_secs(2), || {
        recorder.levels.lock().contains(&LogLevel::Error)
    })
    .await;
    assert!(seen);
    bridge.stop().await;
}

#[tokio::test]
#[serial]
async fn config_save_persists_current_state() {
    let bridge = TestBridge::start().await;
    let mut client = Client::connect(&bridge.socket()).await.unwrap();

    let _ = client
        .call(&Request::new("config.set").with_args(json!({"key": "traffic_boost", "value": 7.0})))
        .await
        .unwrap();
    let _ = client.call(&Request::new("config.save")).await.unwrap();

    let text = std::fs::read_to_string(bridge.config_file()).unwrap();
    let saved: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(saved["traffic_boost"], json!(7.0));
    bridge.stop().await;
}
