// SPDX-License-Identifier: MIT
// Copyright (c) 2026 TGDK Labs

//! Error type shared by the lexer, parser, and evaluator.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EvalError {
    #[error("unexpected character '{ch}' at byte {pos}")]
    UnexpectedChar { ch: char, pos: usize },

    #[error("malformed number at byte {pos}")]
    MalformedNumber { pos: usize },

    #[error("empty expression")]
    Empty,

    #[error("unbalanced parentheses")]
    UnbalancedParens,

    #[error("unexpected token near '{0}'")]
    UnexpectedToken(String),

    #[error("unknown function '{0}'")]
    UnknownFunction(String),

    #[error("function '{name}' expects {expected} argument(s), got {got}")]
    BadArity { name: String, expected: u8, got: u8 },

    #[error("unknown identifier '{0}'")]
    UnknownIdent(String),

    #[error("malformed expression")]
    Malformed,
}
