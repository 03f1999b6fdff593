// SPDX-License-Identifier: MIT
// Copyright (c) 2026 TGDK Labs

//! Compound entity table: named expressions resolved in declaration order.
//!
//! Each resolved entity is exposed under its own name to every later
//! entity, so configs can chain: `a = 2+3`, `b = a*4`.

use parking_lot::Mutex;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

use crate::expr::{eval_str, Env, EvalError};

#[derive(Debug, Error)]
pub enum CompoundError {
    #[error("invalid compound config: {0}")]
    BadConfig(String),

    #[error("failed to read compound config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("entity '{name}': {source}")]
    Entity {
        name: String,
        #[source]
        source: EvalError,
    },
}

#[derive(Debug, Deserialize)]
struct CompoundConfig {
    #[serde(default)]
    compound: CompoundSection,
}

#[derive(Debug, Default, Deserialize)]
struct CompoundSection {
    #[serde(default)]
    entities: Vec<EntityDef>,
}

#[derive(Debug, Deserialize)]
struct EntityDef {
    name: String,
    equation: String,
}

#[derive(Default)]
struct Inner {
    /// Resolved values in declaration order.
    order: Vec<String>,
    values: HashMap<String, f64>,
}

/// Resolved compound entities. Reloadable; a failing load leaves the
/// previous contents in place.
#[derive(Default)]
pub struct CompoundTable {
    inner: Mutex<Inner>,
}

impl CompoundTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve a `{"compound":{"entities":[{name, equation}, ...]}}` config
    /// against `env` and replace the table's contents.
    pub fn load(&self, config: &Value, env: &Env) -> Result<usize, CompoundError> {
        let config: CompoundConfig = serde_json::from_value(config.clone())
            .map_err(|e| CompoundError::BadConfig(e.to_string()))?;

        let mut working = env.clone();
        let mut order = Vec::with_capacity(config.compound.entities.len());
        let mut values = HashMap::with_capacity(config.compound.entities.len());
        for entity in &config.compound.entities {
            let value = eval_str(&entity.equation, &working).map_err(|source| {
                CompoundError::Entity { name: entity.name.clone(), source }
            })?;
            working.insert(entity.name.clone(), value);
            if !values.contains_key(&entity.name) {
                order.push(entity.name.clone());
            }
            values.insert(entity.name.clone(), value);
        }

        let count = order.len();
        *self.inner.lock() = Inner { order, values };
        Ok(count)
    }

    /// Read a JSON config file and load it.
    pub fn load_file(&self, path: &Path, env: &Env) -> Result<usize, CompoundError> {
        let text = std::fs::read_to_string(path)?;
        let config: Value = serde_json::from_str(&text)
            .map_err(|e| CompoundError::BadConfig(e.to_string()))?;
        self.load(&config, env)
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.inner.lock().values.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `[{"name": ..., "value": ...}]` in declaration order.
    pub fn snapshot(&self) -> Value {
        let inner = self.inner.lock();
        Value::Array(
            inner
                .order
                .iter()
                .map(|name| {
                    serde_json::json!({
                        "name": name,
                        "value": inner.values.get(name).copied().unwrap_or(0.0),
                    })
                })
                .collect(),
        )
    }
}

#[cfg(test)]
#[path = "compound_tests.rs"]
mod tests;
