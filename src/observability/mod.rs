// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Structured logging for the bridge.
//!
//! Log text comes from small message structs implementing `Display`, grouped
//! by subsystem under [`messages`]:
//!
//! * `messages::module` - loading, compiling and running pipeline modules
//! * `messages::bridge` - invocation lifecycle and caller-level policy
//! * `messages::reconstruct` - typed image reconstruction
//!
//! # Usage
//!
//! ```rust
//! use wasm_interface_bridge::observability::messages::module::ModuleLoaded;
//!
//! let msg = ModuleLoaded {
//!     module_path: "pipelines/median-filter.wasm",
//!     size_bytes: 4096,
//! };
//!
//! tracing::info!("{}", msg);
//! ```

pub mod messages;

use tracing_subscriber::EnvFilter;

/// Install a formatting subscriber filtered by `RUST_LOG`, or by
/// `default_directive` when the variable is unset or invalid.
///
/// Safe to call more than once; only the first call installs a subscriber.
pub fn init_tracing(default_directive: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_tracing_is_idempotent() {
        init_tracing("debug");
        init_tracing("info");
        tracing::debug!("still logging after a second init");
    }
}
