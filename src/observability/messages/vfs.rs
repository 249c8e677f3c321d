// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for transport filesystem events.

use std::fmt::{Display, Formatter};
use std::path::Path;

/// Host scratch directory created for a WASI preopen.
///
/// # Log Level
/// `debug!` - Per-module setup detail
pub struct ScratchCreated<'a> {
    pub root: &'a Path,
}

impl Display for ScratchCreated<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Created scratch filesystem at {}", self.root.display())
    }
}

/// A staged input or produced output could not be removed after a call.
///
/// # Log Level
/// `warn!` - The call result stands; the next call clears output paths again
pub struct CleanupFailed<'a> {
    pub path: &'a str,
    pub error: &'a dyn Display,
}

impl Display for CleanupFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Failed to remove '{}' after the call: {}", self.path, self.error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scratch_created_display() {
        let msg = ScratchCreated {
            root: Path::new("/tmp/wasm-bridge-x1"),
        };
        assert_eq!(msg.to_string(), "Created scratch filesystem at /tmp/wasm-bridge-x1");
    }

    #[test]
    fn test_cleanup_failed_display() {
        let msg = CleanupFailed {
            path: "out/labels.json",
            error: &"permission denied",
        };
        assert_eq!(
            msg.to_string(),
            "Failed to remove 'out/labels.json' after the call: permission denied"
        );
    }
}
