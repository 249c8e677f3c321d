// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod bridge;
mod module;

pub use bridge::{BridgeError, Result};
pub use module::{ModuleError, ModuleResult, WASM_UNSUPPORTED_ENCODING};
