// SPDX-License-Identifier: MIT
// Copyright (c) 2026 TGDK Labs

//! Impound list: forbidden names by literal match or glob rule.

use parking_lot::Mutex;
use serde_json::Value;
use std::collections::BTreeSet;

/// Match `pattern` against `text` where `*` spans anything (including
/// nothing) and `?` consumes exactly one character. Case-sensitive.
pub fn glob_match(pattern: &str, text: &str) -> bool {
    let pat: Vec<char> = pattern.chars().collect();
    let txt: Vec<char> = text.chars().collect();

    // Two-pointer scan with single-star backtracking.
    let (mut p, mut t) = (0usize, 0usize);
    let mut star: Option<(usize, usize)> = None;
    while t < txt.len() {
        if p < pat.len() && (pat[p] == '?' || pat[p] == txt[t]) {
            p += 1;
            t += 1;
        } else if p < pat.len() && pat[p] == '*' {
            star = Some((p, t));
            p += 1;
        } else if let Some((sp, st)) = star {
            // Let the last star absorb one more character and retry.
            p = sp + 1;
            t = st + 1;
            star = Some((sp, st + 1));
        } else {
            return false;
        }
    }
    while p < pat.len() && pat[p] == '*' {
        p += 1;
    }
    p == pat.len()
}

#[derive(Default)]
struct Inner {
    items: BTreeSet<String>,
    rules: Vec<String>,
}

/// Set of impounded names.
#[derive(Default)]
pub struct ImpoundList {
    inner: Mutex<Inner>,
}

impl ImpoundList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a literal name. Returns false if already present.
    pub fn insert_item(&self, name: &str) -> bool {
        self.inner.lock().items.insert(name.to_string())
    }

    /// Add a glob rule. Duplicate rules are ignored.
    pub fn insert_rule(&self, rule: &str) -> bool {
        let mut inner = self.inner.lock();
        if inner.rules.iter().any(|r| r == rule) {
            return false;
        }
        inner.rules.push(rule.to_string());
        true
    }

    pub fn remove_item(&self, name: &str) -> bool {
        self.inner.lock().items.remove(name)
    }

    pub fn clear(&self) {
        let mut inner = self.inner.lock();
        inner.items.clear();
        inner.rules.clear();
    }

    /// Literal membership OR any rule match.
    pub fn is_impounded(&self, name: &str) -> bool {
        let inner = self.inner.lock();
        inner.items.contains(name) || inner.rules.iter().any(|r| glob_match(r, name))
    }

    pub fn snapshot(&self) -> Value {
        let inner = self.inner.lock();
        serde_json::json!({
            "items": inner.items.iter().collect::<Vec<_>>(),
            "rules": inner.rules,
        })
    }
}

#[cfg(test)]
#[path = "impound_tests.rs"]
mod tests;
