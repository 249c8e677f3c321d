// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for bridge invocations.

use std::fmt::{Display, Formatter};
use std::time::Duration;

/// An invocation is about to write its inputs.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use wasm_interface_bridge::observability::messages::bridge::InvocationStarted;
///
/// let msg = InvocationStarted {
///     transport: "filesystem",
///     input_count: 1,
///     output_count: 2,
/// };
///
/// tracing::info!("{}", msg);
/// ```
pub struct InvocationStarted<'a> {
    pub transport: &'a str,
    pub input_count: usize,
    pub output_count: usize,
}

impl Display for InvocationStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Starting {} invocation with {} input(s) and {} output(s)",
            self.transport, self.input_count, self.output_count
        )
    }
}

/// Inputs were staged for the module.
///
/// # Log Level
/// `debug!` - Detailed execution trace
pub struct InputsStaged {
    pub input_count: usize,
    pub byte_count: usize,
}

impl Display for InputsStaged {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Staged {} input(s), {} bytes",
            self.input_count, self.byte_count
        )
    }
}

/// The entry point returned.
///
/// # Log Level
/// `info!` - Important operational event
pub struct InvocationCompleted {
    pub return_code: i32,
    pub stdout_bytes: usize,
    pub stderr_bytes: usize,
    pub duration: Duration,
}

impl Display for InvocationCompleted {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Invocation completed in {:?} with return code {} (stdout: {} bytes, stderr: {} bytes)",
            self.duration, self.return_code, self.stdout_bytes, self.stderr_bytes
        )
    }
}

/// The entry point trapped or exited abnormally.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct InvocationFaulted<'a> {
    pub diagnostic: &'a str,
    pub stderr: &'a str,
}

impl Display for InvocationFaulted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Invocation faulted: {}", self.diagnostic)?;
        if !self.stderr.is_empty() {
            write!(f, " (stderr: {})", self.stderr.trim_end())?;
        }
        Ok(())
    }
}

/// Outputs were not read because the call failed.
///
/// # Log Level
/// `warn!` - The caller will see the module's stderr instead
pub struct OutputsSkipped {
    pub return_code: i32,
    pub output_count: usize,
}

impl Display for OutputsSkipped {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Skipping {} output(s): module returned {} with diagnostics on stderr",
            self.output_count, self.return_code
        )
    }
}

/// Nonzero return code with empty stderr, accepted as success.
///
/// # Log Level
/// `warn!` - Unusual but not a failure
pub struct NonZeroReturnAccepted {
    pub return_code: i32,
}

impl Display for NonZeroReturnAccepted {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Module returned {} without stderr output; treating the call as successful",
            self.return_code
        )
    }
}

/// The blocking task running a worker call panicked or was cancelled.
///
/// # Log Level
/// `error!` - The module is lost with the task
pub struct WorkerTaskFailed<'a> {
    pub error: &'a dyn Display,
}

impl Display for WorkerTaskFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Pipeline worker task failed: {}", self.error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_faulted_includes_stderr_when_present() {
        let msg = InvocationFaulted {
            diagnostic: "wasm trap: unreachable",
            stderr: "bad input\n",
        };
        assert_eq!(
            msg.to_string(),
            "Invocation faulted: wasm trap: unreachable (stderr: bad input)"
        );

        let quiet = InvocationFaulted {
            diagnostic: "wasm trap: unreachable",
            stderr: "",
        };
        assert_eq!(quiet.to_string(), "Invocation faulted: wasm trap: unreachable");
    }

    #[test]
    fn test_worker_task_failed_display() {
        let msg = WorkerTaskFailed {
            error: &"task 7 panicked",
        };
        assert_eq!(msg.to_string(), "Pipeline worker task failed: task 7 panicked");
    }
}
