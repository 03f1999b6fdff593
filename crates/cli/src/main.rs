// SPDX-License-Identifier: MIT
// Copyright (c) 2026 TGDK Labs

//! `mb`: line-protocol client for a running bridge.

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use mb_wire::{Client, ClientError, Request};

#[derive(Parser)]
#[command(name = "mb", about = "MirrorBlade bridge client", version)]
struct Cli {
    /// Endpoint socket path (default: resolved from the config's pipe name)
    #[arg(long, global = true)]
    socket: Option<PathBuf>,

    /// Host root used to resolve the endpoint (default: MB_ROOT or cwd)
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Health check
    Ping,
    /// List registered operations
    Caps,
    /// Invoke one operation
    Call {
        /// Operation name, e.g. traffic.mul
        op: String,
        /// Arguments as a JSON object
        #[arg(long, default_value = "{}")]
        args: String,
        /// Correlation id to attach
        #[arg(long)]
        id: Option<String>,
    },
    /// Read one config field
    Get { key: String },
    /// Write one config field (value parsed as JSON, else as a string)
    Set { key: String, value: String },
    /// Ask the bridge to stop
    Shutdown,
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("mb: {e:#}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let socket = resolve_socket(&cli);
    let mut client = Client::connect(&socket)
        .await
        .with_context(|| format!("is the bridge running? (endpoint {})", socket.display()))?;

    let request = match &cli.command {
        Command::Ping => Request::new("ping"),
        Command::Caps => Request::new("ops.capabilities"),
        Command::Call { op, args, id } => {
            let args: serde_json::Value =
                serde_json::from_str(args).context("--args must be a JSON object")?;
            anyhow::ensure!(args.is_object(), "--args must be a JSON object");
            let mut request = Request::new(op).with_args(args);
            if let Some(id) = id {
                request = request.with_id(id.clone());
            }
            request
        }
        Command::Get { key } => {
            Request::new("config.get").with_args(serde_json::json!({ "key": key }))
        }
        Command::Set { key, value } => {
            let value: serde_json::Value = serde_json::from_str(value)
                .unwrap_or_else(|_| serde_json::Value::String(value.clone()));
            Request::new("config.set")
                .with_args(serde_json::json!({ "key": key, "value": value }))
        }
        Command::Shutdown => Request::new("bridge.shutdown"),
    };

    match client.call(&request).await {
        Ok(result) => {
            println!("{}", serde_json::to_string_pretty(&result)?);
            Ok(())
        }
        Err(ClientError::Rpc { code, msg }) => anyhow::bail!("{code}: {msg}"),
        Err(e) => Err(e.into()),
    }
}

/// `--socket` wins; otherwise read the config under `--root` to find the
/// configured pipe name, falling back to the default name.
fn resolve_socket(cli: &Cli) -> PathBuf {
    if let Some(socket) = &cli.socket {
        return socket.clone();
    }
    let root = cli.root.clone().unwrap_or_else(mb_daemon::env::root_dir);
    let pipe_name =
        mb_daemon::persist::load_or_default(&mb_daemon::env::config_path(&root)).ipc_pipe_name;
    mb_daemon::env::socket_path(&pipe_name)
}
