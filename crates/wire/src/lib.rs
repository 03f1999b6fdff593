// SPDX-License-Identifier: MIT
// Copyright (c) 2026 TGDK Labs

//! mb-wire: line protocol for the bridge.
//!
//! Wire format: one UTF-8 JSON value per `\n`-terminated line, at most
//! [`MAX_LINE_BYTES`] payload bytes per line.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

#[cfg(unix)]
mod client;
mod reply;
mod request;
mod wire;

#[cfg(unix)]
pub use client::{Client, ClientError};
pub use reply::{err_envelope, ok_envelope, seal, ErrorCode};
pub use request::Request;
pub use wire::{read_line_capped, write_line, ReadOutcome};

/// Protocol version accepted in the `v` field.
pub const PROTOCOL_VERSION: u32 = 1;

/// Maximum payload bytes in one line, terminator excluded.
pub const MAX_LINE_BYTES: usize = 1_048_576;
