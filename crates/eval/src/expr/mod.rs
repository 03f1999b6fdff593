// SPDX-License-Identifier: MIT
// Copyright (c) 2026 TGDK Labs

//! Compound expression language: tokenize, shunting-yard parse, RPN eval.
//!
//! Grammar: decimal numbers (optional exponent), identifiers
//! (`[A-Za-z_][A-Za-z0-9_.]*`), parentheses, `+ - * / ^` with standard
//! precedence (`^` right-associative, unary minus binds tightest), and the
//! functions `abs/1`, `min/2`, `max/2`, `clamp/3`.

mod error;
mod lexer;
mod parser;
mod token;

use std::collections::HashMap;

pub use error::EvalError;
pub use lexer::tokenize;
pub use parser::{parse, Rpn};
pub use token::{BinOp, Token};

/// Numeric environment identifiers resolve against.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Env(HashMap<String, f64>);

impl Env {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.0.get(name).copied()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: f64) {
        self.0.insert(name.into(), value);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, f64)> for Env {
    fn from_iter<I: IntoIterator<Item = (S, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

/// Tokenize, parse, and evaluate in one step.
pub fn eval_str(input: &str, env: &Env) -> Result<f64, EvalError> {
    parse(tokenize(input)?)?.eval(env)
}
