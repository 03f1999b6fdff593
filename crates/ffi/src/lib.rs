// SPDX-License-Identifier: MIT
// Copyright (c) 2026 TGDK Labs

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! mb-ffi: C ABI exports for embedding the bridge in a host process.
//!
//! Every returned `char*` is heap-owned and must be released with
//! [`mirrorblade_free_string`]. No export unwinds across the boundary;
//! internal failures surface as `{"ok":false,...}` JSON.

use parking_lot::Mutex;
use std::ffi::{c_char, CStr, CString};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::OnceLock;

use mb_daemon::{shutdown, startup, BridgeConfig, DaemonState};
use mb_wire::{err_envelope, seal, ErrorCode, PROTOCOL_VERSION};

/// The embedded bridge: a daemon state plus the private runtime it runs on.
struct EmbeddedBridge {
    state: Option<DaemonState>,
    runtime: tokio::runtime::Runtime,
}

fn bridge_slot() -> &'static Mutex<Option<EmbeddedBridge>> {
    static SLOT: OnceLock<Mutex<Option<EmbeddedBridge>>> = OnceLock::new();
    SLOT.get_or_init(|| Mutex::new(None))
}

const VERSION_CSTR: &str = concat!(env!("CARGO_PKG_VERSION"), "\0");

/// Static version string; do NOT free.
#[no_mangle]
pub extern "C" fn mirrorblade_version() -> *const c_char {
    VERSION_CSTR.as_ptr().cast()
}

/// Liveness probe for the export table. Always returns 1.
#[no_mangle]
pub extern "C" fn mirrorblade_ping() -> i32 {
    1
}

/// Start the bridge with `<root>` as the host root (NULL = resolve from the
/// environment). Returns false when already initialized or startup fails.
///
/// # Safety
///
/// `root` must be NULL or a valid NUL-terminated string.
#[no_mangle]
pub unsafe extern "C" fn mirrorblade_init(root: *const c_char) -> bool {
    let root = if root.is_null() {
        mb_daemon::env::root_dir()
    } else {
        match CStr::from_ptr(root).to_str() {
            Ok(s) => std::path::PathBuf::from(s),
            Err(_) => return false,
        }
    };

    let result = catch_unwind(AssertUnwindSafe(|| {
        let mut slot = bridge_slot().lock();
        if slot.is_some() {
            return false;
        }
        let Ok(runtime) = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()
        else {
            return false;
        };
        match runtime.block_on(startup(BridgeConfig::new(root))) {
            Ok(state) => {
                *slot = Some(EmbeddedBridge { state: Some(state), runtime });
                true
            }
            Err(_) => false,
        }
    }));
    result.unwrap_or(false)
}

/// Stop the bridge. Returns false when it was not running.
#[no_mangle]
pub extern "C" fn mirrorblade_shutdown() -> bool {
    let result = catch_unwind(AssertUnwindSafe(|| {
        let Some(mut bridge) = bridge_slot().lock().take() else {
            return false;
        };
        if let Some(state) = bridge.state.take() {
            bridge.runtime.block_on(shutdown(state));
        }
        // Dropping the runtime outside the lock would be nicer, but the
        // slot lock is ours alone here.
        drop(bridge);
        true
    }));
    result.unwrap_or(false)
}

/// Dispatch one operation directly (no pipe round-trip) and return the
/// reply envelope as an allocated JSON string.
///
/// # Safety
///
/// `op` must be a valid NUL-terminated string; `args_json` must be NULL or
/// a valid NUL-terminated string. Free the result with
/// [`mirrorblade_free_string`].
#[no_mangle]
pub unsafe extern "C" fn mirrorblade_dispatch_json(
    op: *const c_char,
    args_json: *const c_char,
) -> *mut c_char {
    let result = catch_unwind(AssertUnwindSafe(|| unsafe { dispatch_inner(op, args_json) }));
    let body = result.unwrap_or_else(|_| {
        err_envelope(ErrorCode::Exception, "dispatch panicked").to_string()
    });
    to_owned_cstring(body)
}

/// Release a string returned by this library.
///
/// # Safety
///
/// `ptr` must be NULL or a pointer previously returned by
/// [`mirrorblade_dispatch_json`], passed exactly once.
#[no_mangle]
pub unsafe extern "C" fn mirrorblade_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(CString::from_raw(ptr));
    }
}

unsafe fn dispatch_inner(op: *const c_char, args_json: *const c_char) -> String {
    if op.is_null() {
        return err_envelope(ErrorCode::BadArgs, "null op").to_string();
    }
    let Ok(op) = CStr::from_ptr(op).to_str() else {
        return err_envelope(ErrorCode::BadArgs, "op is not UTF-8").to_string();
    };

    let args = if args_json.is_null() {
        serde_json::Value::Object(serde_json::Map::new())
    } else {
        let Ok(raw) = CStr::from_ptr(args_json).to_str() else {
            return err_envelope(ErrorCode::BadJson, "args are not UTF-8").to_string();
        };
        if raw.trim().is_empty() {
            serde_json::Value::Object(serde_json::Map::new())
        } else {
            match serde_json::from_str(raw) {
                Ok(serde_json::Value::Object(map)) => serde_json::Value::Object(map),
                Ok(_) => return err_envelope(ErrorCode::BadArgs, "args must be an object").to_string(),
                Err(e) => return err_envelope(ErrorCode::BadJson, e.to_string()).to_string(),
            }
        }
    };

    let slot = bridge_slot().lock();
    let Some(bridge) = slot.as_ref() else {
        return err_envelope(ErrorCode::Unavailable, "bridge not initialized").to_string();
    };
    let Some(state) = bridge.state.as_ref() else {
        return err_envelope(ErrorCode::Unavailable, "bridge stopped").to_string();
    };

    let body = state.registry.dispatch(&state.ctx, op, &args);
    seal(PROTOCOL_VERSION, None, body).to_string()
}

/// `to_string` on a JSON value never contains NUL, but be defensive about
/// arbitrary handler output anyway.
fn to_owned_cstring(s: String) -> *mut c_char {
    match CString::new(s) {
        Ok(cstring) => cstring.into_raw(),
        Err(_) => match CString::new(err_envelope(ErrorCode::Exception, "NUL in reply").to_string())
        {
            Ok(fallback) => fallback.into_raw(),
            Err(_) => std::ptr::null_mut(),
        },
    }
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
