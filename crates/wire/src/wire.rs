// SPDX-License-Identifier: MIT
// Copyright (c) 2026 TGDK Labs

//! Capped newline framing over async streams.

use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

/// Result of reading one framed line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    /// A complete line, terminator stripped (and one trailing `\r` if present).
    Line(String),
    /// Clean end of stream before any byte of a new line.
    Eof,
    /// The payload exceeded the cap; the session must be terminated.
    Overflow,
    /// The line was not valid UTF-8; the session must be terminated.
    BadUtf8,
}

/// Read one `\n`-terminated line of at most `max` payload bytes.
///
/// A line of exactly `max` bytes is accepted; one more byte is an overflow.
/// EOF in the middle of a line is reported as `Eof`.
pub async fn read_line_capped<R>(reader: &mut R, max: usize) -> std::io::Result<ReadOutcome>
where
    R: AsyncBufRead + Unpin,
{
    let mut line: Vec<u8> = Vec::new();
    loop {
        let (consumed, outcome) = {
            let available = reader.fill_buf().await?;
            if available.is_empty() {
                return Ok(ReadOutcome::Eof);
            }
            match available.iter().position(|&b| b == b'\n') {
                Some(pos) => {
                    if line.len() + pos > max {
                        (pos + 1, Some(ReadOutcome::Overflow))
                    } else {
                        line.extend_from_slice(&available[..pos]);
                        (pos + 1, Some(finish_line(std::mem::take(&mut line))))
                    }
                }
                None => {
                    if line.len() + available.len() > max {
                        (available.len(), Some(ReadOutcome::Overflow))
                    } else {
                        line.extend_from_slice(available);
                        (available.len(), None)
                    }
                }
            }
        };
        reader.consume(consumed);
        if let Some(outcome) = outcome {
            return Ok(outcome);
        }
    }
}

fn finish_line(mut line: Vec<u8>) -> ReadOutcome {
    if line.last() == Some(&b'\r') {
        line.pop();
    }
    match String::from_utf8(line) {
        Ok(s) => ReadOutcome::Line(s),
        Err(_) => ReadOutcome::BadUtf8,
    }
}

/// Write one JSON value as a compact line.
pub async fn write_line<W>(writer: &mut W, value: &Value) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let mut bytes = serde_json::to_vec(value)?;
    bytes.push(b'\n');
    writer.write_all(&bytes).await?;
    writer.flush().await
}

#[cfg(test)]
#[path = "wire_tests.rs"]
mod tests;
