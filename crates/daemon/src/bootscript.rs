// SPDX-License-Identifier: MIT
// Copyright (c) 2026 TGDK Labs

//! Boot script injection: best-effort replay of `onLoad` requests once the
//! endpoint is listening.

use serde_json::Value;
use std::path::Path;
use tracing::{debug, info, warn};

use mb_wire::{Client, Request, PROTOCOL_VERSION};

/// Read `<script_path>` and send each `onLoad` entry as a client. Every
/// failure is logged and ignored; the bridge never fails to start because
/// of a bad boot script.
pub async fn inject(script_path: &Path, socket_path: &Path) {
    let text = match std::fs::read_to_string(script_path) {
        Ok(text) => text,
        Err(_) => {
            debug!(path = %script_path.display(), "no boot script");
            return;
        }
    };
    let parsed: Value = match serde_json::from_str(&text) {
        Ok(parsed) => parsed,
        Err(e) => {
            warn!("boot script is not valid JSON: {e}");
            return;
        }
    };
    let Some(entries) = parsed.get("onLoad").and_then(Value::as_array) else {
        debug!("boot script has no onLoad array");
        return;
    };
    if entries.is_empty() {
        return;
    }

    let mut client = match Client::connect(socket_path).await {
        Ok(client) => client,
        Err(e) => {
            warn!("boot script connect failed: {e}");
            return;
        }
    };

    let mut sent = 0usize;
    for (index, entry) in entries.iter().enumerate() {
        let request = match to_request(entry) {
            Ok(request) => request,
            Err(e) => {
                warn!(index, "boot script entry skipped: {e}");
                continue;
            }
        };
        match client.call_raw(&request).await {
            Ok(reply) => {
                sent += 1;
                if reply.get("ok").and_then(Value::as_bool) == Some(false) {
                    warn!(index, op = request.op, "boot script op rejected: {reply}");
                }
            }
            Err(e) => {
                warn!(index, op = request.op, "boot script op failed: {e}");
                // The session may be gone; later entries would fail too.
                break;
            }
        }
    }
    info!(sent, total = entries.len(), "boot script processed");
}

/// Entries may omit `v`; it defaults to the current protocol version.
fn to_request(entry: &Value) -> Result<Request, String> {
    let mut entry = entry.clone();
    if let Some(map) = entry.as_object_mut() {
        map.entry("v".to_string())
            .or_insert_with(|| serde_json::json!(PROTOCOL_VERSION));
    }
    serde_json::from_value(entry).map_err(|e| e.to_string())
}

#[cfg(test)]
#[path = "bootscript_tests.rs"]
mod tests;
