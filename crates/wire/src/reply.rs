// SPDX-License-Identifier: MIT
// Copyright (c) 2026 TGDK Labs

//! Reply envelopes and error codes.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::fmt;

/// Wire error codes. Serialized with their canonical protocol spelling
/// (`BadJSON`, not `BadJson`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    #[serde(rename = "BadJSON")]
    BadJson,
    BadVersion,
    BadArgs,
    UnknownOp,
    Exception,
    Unavailable,
}

impl ErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::BadJson => "BadJSON",
            ErrorCode::BadVersion => "BadVersion",
            ErrorCode::BadArgs => "BadArgs",
            ErrorCode::UnknownOp => "UnknownOp",
            ErrorCode::Exception => "Exception",
            ErrorCode::Unavailable => "Unavailable",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `{"ok":true,"result":<result>}`
pub fn ok_envelope(result: Value) -> Value {
    json!({ "ok": true, "result": result })
}

/// `{"ok":false,"error":{"code":<code>,"msg":<msg>}}`
pub fn err_envelope(code: ErrorCode, msg: impl Into<String>) -> Value {
    json!({ "ok": false, "error": { "code": code.as_str(), "msg": msg.into() } })
}

/// Attach protocol framing fields to an envelope body.
///
/// The reply always echoes `v`, and `id` when the request carried one. Body
/// fields win no conflicts: `v`/`id` overwrite anything the body set.
pub fn seal(v: u32, id: Option<&str>, body: Value) -> Value {
    let mut map = match body {
        Value::Object(map) => map,
        other => {
            let mut map = Map::new();
            map.insert("ok".to_string(), Value::Bool(true));
            map.insert("result".to_string(), other);
            map
        }
    };
    map.insert("v".to_string(), json!(v));
    if let Some(id) = id {
        map.insert("id".to_string(), Value::String(id.to_string()));
    }
    Value::Object(map)
}

#[cfg(test)]
#[path = "reply_tests.rs"]
mod tests;
