// SPDX-License-Identifier: MIT
// Copyright (c) 2026 TGDK Labs

//! `mbd`: run the MirrorBlade bridge in the foreground.

use mb_daemon::{run, shutdown, startup, BridgeConfig};

#[tokio::main]
async fn main() {
    let root = parse_root().unwrap_or_else(|| mb_daemon::env::root_dir());

    let state = match startup(BridgeConfig::new(root)).await {
        Ok(state) => state,
        Err(e) => {
            eprintln!("mbd: startup failed: {e}");
            std::process::exit(1);
        }
    };

    eprintln!("mbd: listening on {}", state.socket_path.display());

    tokio::select! {
        _ = run(&state) => {}
        _ = tokio::signal::ctrl_c() => {
            eprintln!("mbd: interrupted");
        }
    }

    shutdown(state).await;
}

/// `--root <path>` (everything else is rejected).
fn parse_root() -> Option<std::path::PathBuf> {
    let mut args = std::env::args().skip(1);
    match args.next().as_deref() {
        None => None,
        Some("--root") => match args.next() {
            Some(path) => Some(std::path::PathBuf::from(path)),
            None => {
                eprintln!("mbd: --root requires a path");
                std::process::exit(2);
            }
        },
        Some(other) => {
            eprintln!("mbd: unknown argument '{other}' (usage: mbd [--root <path>])");
            std::process::exit(2);
        }
    }
}
