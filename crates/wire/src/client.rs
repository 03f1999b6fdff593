// SPDX-License-Identifier: MIT
// Copyright (c) 2026 TGDK Labs

//! One-connection line-protocol client.

use serde_json::Value;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tokio::io::BufReader;
use tokio::net::unix::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::UnixStream;

use crate::{read_line_capped, write_line, ReadOutcome, Request, MAX_LINE_BYTES};

/// Default per-call timeout.
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("connect to {path} failed: {source}")]
    Connect {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("call timed out")]
    Timeout,

    #[error("server closed the connection")]
    Closed,

    #[error("oversized or malformed reply line")]
    BadFrame,

    #[error("malformed reply: {0}")]
    BadReply(String),

    #[error("{code}: {msg}")]
    Rpc { code: String, msg: String },
}

/// Client over a Unix-domain stream endpoint.
pub struct Client {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
    timeout: Duration,
}

impl Client {
    pub async fn connect(path: &Path) -> Result<Self, ClientError> {
        let stream = UnixStream::connect(path).await.map_err(|source| {
            ClientError::Connect { path: path.display().to_string(), source }
        })?;
        let (read_half, write_half) = stream.into_split();
        Ok(Self {
            reader: BufReader::new(read_half),
            writer: write_half,
            timeout: DEFAULT_CALL_TIMEOUT,
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Send one request and read one reply line, returning the full reply
    /// object (including the envelope fields).
    pub async fn call_raw(&mut self, request: &Request) -> Result<Value, ClientError> {
        let request = serde_json::to_value(request)
            .map_err(|e| ClientError::BadReply(e.to_string()))?;
        let timeout = self.timeout;
        let exchange = async {
            write_line(&mut self.writer, &request).await?;
            read_line_capped(&mut self.reader, MAX_LINE_BYTES).await
        };
        let outcome = tokio::time::timeout(timeout, exchange)
            .await
            .map_err(|_| ClientError::Timeout)??;
        match outcome {
            ReadOutcome::Line(line) => {
                serde_json::from_str(&line).map_err(|e| ClientError::BadReply(e.to_string()))
            }
            ReadOutcome::Eof => Err(ClientError::Closed),
            ReadOutcome::Overflow | ReadOutcome::BadUtf8 => Err(ClientError::BadFrame),
        }
    }

    /// Send one request and unwrap the `result`, mapping error envelopes to
    /// [`ClientError::Rpc`].
    pub async fn call(&mut self, request: &Request) -> Result<Value, ClientError> {
        let reply = self.call_raw(request).await?;
        match reply.get("ok").and_then(Value::as_bool) {
            Some(true) => Ok(reply.get("result").cloned().unwrap_or(Value::Null)),
            Some(false) => {
                let error = reply.get("error").cloned().unwrap_or(Value::Null);
                Err(ClientError::Rpc {
                    code: error
                        .get("code")
                        .and_then(Value::as_str)
                        .unwrap_or("Exception")
                        .to_string(),
                    msg: error
                        .get("msg")
                        .and_then(Value::as_str)
                        .unwrap_or("unknown error")
                        .to_string(),
                })
            }
            None => Err(ClientError::BadReply("missing ok field".to_string())),
        }
    }
}
