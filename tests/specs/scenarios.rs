// SPDX-License-Identifier: MIT
// Copyright (c) 2026 TGDK Labs

//! Wire-level end-to-end scenarios.

use serde_json::json;
use serial_test::serial;
use std::time::Duration;

use mb_wire::{Client, ClientError, Request};

use super::support::{raw_exchange, wait_until, TestBridge};

#[tokio::test]
#[serial]
async fn ping_round_trip() {
    let bridge = TestBridge::start().await;
    let replies = raw_exchange(&bridge.socket(), &[r#"{"v":1,"op":"ping"}"#]).await;
    assert_eq!(replies[0], json!({"v": 1, "ok": true, "result": "pong"}));
    bridge.stop().await;
}

#[tokio::test]
#[serial]
async fn versioned_correlation() {
    let bridge = TestBridge::start().await;
    let replies =
        raw_exchange(&bridge.socket(), &[r#"{"v":1,"id":"abc","op":"ping"}"#]).await;
    assert_eq!(replies[0]["id"], json!("abc"));
    assert_eq!(replies[0]["v"], json!(1));
    assert_eq!(replies[0]["ok"], json!(true));
    bridge.stop().await;
}

#[tokio::test]
#[serial]
async fn bad_version_is_rejected() {
    let bridge = TestBridge::start().await;
    let replies = raw_exchange(&bridge.socket(), &[r#"{"v":2,"op":"ping"}"#]).await;
    assert_eq!(replies[0]["ok"], json!(false));
    assert_eq!(replies[0]["error"]["code"], json!("BadVersion"));
    bridge.stop().await;
}

#[tokio::test]
#[serial]
async fn unknown_op_is_rejected() {
    let bridge = TestBridge::start().await;
    let replies = raw_exchange(&bridge.socket(), &[r#"{"v":1,"op":"nope"}"#]).await;
    assert_eq!(replies[0]["ok"], json!(false));
    assert_eq!(replies[0]["error"]["code"], json!("UnknownOp"));
    bridge.stop().await;
}

#[tokio::test]
#[serial]
async fn traffic_mul_clamps_over_the_wire() {
    let bridge = TestBridge::start().await;
    let replies = raw_exchange(
        &bridge.socket(),
        &[r#"{"v":1,"op":"traffic.mul","args":{"mult":100.0}}"#],
    )
    .await;
    assert_eq!(replies[0]["result"], json!(50.0));
    // The traffic sink saw the clamped value too.
    assert!(bridge.recorder.multipliers.lock().contains(&50.0));
    bridge.stop().await;
}

#[tokio::test]
#[serial]
async fn replies_are_ordered_within_a_session() {
    let bridge = TestBridge::start().await;
    let replies = raw_exchange(
        &bridge.socket(),
        &[
            r#"{"v":1,"id":"1","op":"ping"}"#,
            r#"{"v":1,"id":"2","op":"ops.capabilities"}"#,
            r#"{"v":1,"id":"3","op":"ping"}"#,
        ],
    )
    .await;
    let ids: Vec<&str> = replies.iter().map(|r| r["id"].as_str().unwrap()).collect();
    assert_eq!(ids, vec!["1", "2", "3"]);
    bridge.stop().await;
}

#[tokio::test]
#[serial]
async fn compound_chaining_over_loader() {
    let bridge = TestBridge::start().await;
    let mut client = Client::connect(&bridge.socket()).await.unwrap();

    let config = json!({
        "compound": {"entities": [
            {"name": "a", "equation": "2+3"},
            {"name": "b", "equation": "a*4"},
        ]}
    });
    let loaded = client
        .call(&Request::new("loader.load").with_args(json!({"config": config})))
        .await
        .unwrap();
    assert_eq!(loaded["loaded"], json!(2));

    let result = client
        .call(&Request::new("compound.get").with_args(json!({"name": "b"})))
        .await
        .unwrap();
    assert_eq!(result, json!(20.0));
    bridge.stop().await;
}

#[tokio::test]
#[serial]
async fn capabilities_cover_the_public_surface() {
    let bridge = TestBridge::start().await;
    let mut client = Client::connect(&bridge.socket()).await.unwrap();
    let result = client.call(&Request::new("ops.capabilities")).await.unwrap();
    let caps: Vec<&str> = result["capabilities"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap())
        .collect();
    for expected in [
        "ping",
        "diag.dump",
        "config.reload",
        "config.save",
        "config.get",
        "config.set",
        "upscaler.enable",
        "traffic.mul",
        "ops.capabilities",
        "figure8.evalLissajous12",
        "figure8.evalBernoulli",
        "scooty.bump",
        "scooty.samples",
        "scooty.snapshot",
        "telem.push",
        "telem.snapshot",
        "telem.table",
        "loader.load",
        "loader.loadFile",
        "loader.snapshot",
        "compound.get",
        "impound.check",
        "volphi.get",
        "volphi.set",
        "traffic.setDensity",
        "vehicle.spawn",
        "npc.spawn",
        "world.setWeather",
        "ui.notify",
        "time.setScale",
        "time.freeze",
        "bridge.shutdown",
    ] {
        assert!(caps.contains(&expected), "missing op {expected}");
    }
    bridge.stop().await;
}

#[tokio::test]
#[serial]
async fn rpc_error_surfaces_through_client() {
    let bridge = TestBridge::start().await;
    let mut client = Client::connect(&bridge.socket()).await.unwrap();
    let err = client
        .call(&Request::new("traffic.mul"))
        .await
        .unwrap_err();
    match err {
        ClientError::Rpc { code, .. } => assert_eq!(code, "BadArgs"),
        other => panic!("unexpected error: {other}"),
    }
    bridge.stop().await;
}

#[tokio::test]
#[serial]
async fn boot_script_runs_on_startup() {
    let bridge = TestBridge::start_with(|root| {
        let config_dir = root.join("r6").join("config");
        std::fs::create_dir_all(&config_dir).unwrap();
        std::fs::write(
            config_dir.join("config.json"),
            r#"{"onLoad":[
                {"op":"traffic.mul","args":{"mult":2.0}},
                {"op":"upscaler.enable","args":{"enabled":true}},
                {"op":"not.an.op"}
            ]}"#,
        )
        .unwrap();
    })
    .await;

    let store = bridge.state().store.clone();
    let applied = wait_until(Duration::from_secs(3), || {
        store.traffic_boost() == 2.0 && store.upscaler_enabled()
    })
    .await;
    assert!(applied, "boot script did not run");
    bridge.stop().await;
}

#[tokio::test]
#[serial]
async fn disabling_ipc_refuses_new_sessions() {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    let bridge = TestBridge::start().await;

    // Turn IPC off over an open session, then end that session.
    {
        let mut client = Client::connect(&bridge.socket()).await.unwrap();
        let _ = client
            .call(&Request::new("config.set").with_args(json!({"key": "ipc_enabled", "value": false})))
            .await
            .unwrap();
    }

    // A new connection is closed without service: EOF, no reply bytes.
    let mut probe = tokio::net::UnixStream::connect(&bridge.socket()).await.unwrap();
    let _ = probe.write_all(b"{\"v\":1,\"op\":\"ping\"}\n").await;
    let _ = probe.flush().await;
    let mut buf = [0u8; 1];
    let n = tokio::time::timeout(Duration::from_secs(2), probe.read(&mut buf))
        .await
        .expect("bridge served a session while ipc was disabled")
        .unwrap();
    assert_eq!(n, 0, "expected EOF, got reply bytes");

    // Host-side re-enable (the config-file path goes through the watcher).
    bridge.state().store.set_ipc_enabled(true);
    let mut client = Client::connect(&bridge.socket()).await.unwrap();
    assert_eq!(client.call(&Request::new("ping")).await.unwrap(), json!("pong"));
    bridge.stop().await;
}

#[tokio::test]
#[serial]
async fn bridge_shutdown_op_requests_stop() {
    let bridge = TestBridge::start().await;
    let mut client = Client::connect(&bridge.socket()).await.unwrap();
    let result = client.call(&Request::new("bridge.shutdown")).await.unwrap();
    assert_eq!(result["stopping"], json!(true));

    // run() must return promptly once the op has been processed.
    tokio::time::timeout(Duration::from_secs(2), mb_daemon::run(bridge.state()))
        .await
        .expect("run did not observe shutdown");
    bridge.stop().await;
}
