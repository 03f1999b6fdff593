// SPDX-License-Identifier: MIT
// Copyright (c) 2026 TGDK Labs

//! Operation registry: name → handler, with exception containment.

use parking_lot::RwLock;
use serde_json::Value;
use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use thiserror::Error;
use tracing::error;

use mb_wire::{err_envelope, ok_envelope, ErrorCode};

use crate::ops::OpCtx;

/// Failure a handler reports instead of a value.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{code}: {msg}")]
pub struct OpError {
    pub code: ErrorCode,
    pub msg: String,
}

impl OpError {
    pub fn bad_args(msg: impl Into<String>) -> Self {
        Self { code: ErrorCode::BadArgs, msg: msg.into() }
    }

    pub fn exception(msg: impl Into<String>) -> Self {
        Self { code: ErrorCode::Exception, msg: msg.into() }
    }
}

type Handler = Arc<dyn Fn(&OpCtx, &Value) -> Result<Value, OpError> + Send + Sync>;

/// Registered operations keyed by dotted ASCII name (case-sensitive).
#[derive(Default)]
pub struct OpRegistry {
    handlers: RwLock<HashMap<String, Handler>>,
}

impl OpRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a handler.
    pub fn register<F>(&self, name: &str, handler: F)
    where
        F: Fn(&OpCtx, &Value) -> Result<Value, OpError> + Send + Sync + 'static,
    {
        self.handlers.write().insert(name.to_string(), Arc::new(handler));
    }

    pub fn exists(&self, name: &str) -> bool {
        self.handlers.read().contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.handlers.read().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.handlers.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.read().is_empty()
    }

    /// Invoke an operation and produce the reply envelope body.
    ///
    /// The handler is looked up under the read lock and invoked after the
    /// lock is released. A returned object that already carries an `ok`
    /// field passes through unwrapped; anything else is wrapped as
    /// `{ok:true, result}`. Handler errors and panics become error
    /// envelopes and never propagate.
    pub fn dispatch(&self, ctx: &OpCtx, name: &str, args: &Value) -> Value {
        let handler = self.handlers.read().get(name).cloned();
        let Some(handler) = handler else {
            return err_envelope(ErrorCode::UnknownOp, format!("Unknown op: {name}"));
        };

        match catch_unwind(AssertUnwindSafe(|| handler(ctx, args))) {
            Ok(Ok(value)) => {
                if value.as_object().is_some_and(|map| map.contains_key("ok")) {
                    value
                } else {
                    ok_envelope(value)
                }
            }
            Ok(Err(err)) => err_envelope(err.code, err.msg),
            Err(payload) => {
                let msg = panic_message(&payload);
                error!(op = name, "handler panicked: {msg}");
                err_envelope(ErrorCode::Exception, msg)
            }
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "handler panicked".to_string()
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
