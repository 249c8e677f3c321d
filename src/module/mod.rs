// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The isolated execution module a pipeline runs in.
//!
//! [`PipelineModule`] is the seam the bridge drives: a virtual filesystem plus
//! one callable entry point. [`WasiModule`] implements it on wasmtime with
//! WASI preview 1 and additionally offers the memory transport through
//! [`MemoryIoSession`].

mod detector;
mod engine;
mod loader;
mod memory_io;
mod wasi_module;

#[cfg(test)]
pub(crate) mod stub;

pub use detector::{detect_entry_points, EntryPoints};
pub use engine::create_engine;
pub use loader::load_wasm_bytes;
pub use memory_io::MemoryIoSession;
pub use wasi_module::WasiModule;

use crate::vfs::VirtualFs;
use thiserror::Error;

/// The entry point trapped or failed before it could return a code.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{diagnostic}")]
pub struct ModuleFault {
    pub diagnostic: String,
}

impl ModuleFault {
    pub fn new(diagnostic: impl Into<String>) -> Self {
        Self {
            diagnostic: diagnostic.into(),
        }
    }
}

/// Text a module wrote to stdout and stderr.
///
/// Owned by the bridge, reset before every call and appended to by the
/// module while it runs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapturedStreams {
    stdout: String,
    stderr: String,
}

impl CapturedStreams {
    pub fn reset(&mut self) {
        self.stdout.clear();
        self.stderr.clear();
    }

    /// Append raw output, replacing invalid UTF-8.
    pub fn append(&mut self, stdout: &[u8], stderr: &[u8]) {
        self.stdout.push_str(&String::from_utf8_lossy(stdout));
        self.stderr.push_str(&String::from_utf8_lossy(stderr));
    }

    pub fn stdout(&self) -> &str {
        &self.stdout
    }

    pub fn stderr(&self) -> &str {
        &self.stderr
    }
}

/// A sandboxed program with a virtual filesystem and a `main`-style entry point.
///
/// One instance is one filesystem. Calls on the same instance must not
/// overlap; `&mut self` makes the compiler enforce that.
pub trait PipelineModule: Send {
    fn fs(&self) -> &dyn VirtualFs;

    fn fs_mut(&mut self) -> &mut dyn VirtualFs;

    /// Run the entry point with `args` (the program name is supplied by the
    /// module) and return its exit code.
    ///
    /// Output is appended to `streams` whether or not the call faults.
    fn call_main(&mut self, args: &[String], streams: &mut CapturedStreams) -> Result<i32, ModuleFault>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_streams_append_and_reset() {
        let mut streams = CapturedStreams::default();
        streams.append(b"one\n", b"");
        streams.append(b"two\n", &[0xff, b'!']);
        assert_eq!(streams.stdout(), "one\ntwo\n");
        assert_eq!(streams.stderr(), "\u{fffd}!");

        streams.reset();
        assert!(streams.stdout().is_empty() && streams.stderr().is_empty());
    }
}
