// SPDX-License-Identifier: MIT
// Copyright (c) 2026 TGDK Labs

//! Request frame.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One request line.
///
/// `v` must equal [`crate::PROTOCOL_VERSION`]; `id`, when present, is echoed
/// unchanged in the reply; a missing `args` is treated as `{}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    pub v: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub op: String,
    #[serde(default = "empty_args")]
    pub args: Value,
}

fn empty_args() -> Value {
    Value::Object(serde_json::Map::new())
}

impl Request {
    pub fn new(op: impl Into<String>) -> Self {
        Self { v: crate::PROTOCOL_VERSION, id: None, op: op.into(), args: empty_args() }
    }

    pub fn with_args(mut self, args: Value) -> Self {
        self.args = args;
        self
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}

#[cfg(test)]
#[path = "request_tests.rs"]
mod tests;
