// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::errors::{BridgeError, Result};
use crate::interface::{PipelineInput, PipelineOutput, PopulatedOutput};
use crate::module::{CapturedStreams, ModuleFault, PipelineModule, WasiModule};
use crate::observability::messages::bridge::{
    InputsStaged, InvocationCompleted, InvocationFaulted, InvocationStarted, NonZeroReturnAccepted,
    OutputsSkipped,
};
use crate::observability::messages::vfs::CleanupFailed;
use crate::transfer::{self, build_payload, TransferPayload};
use std::time::Instant;

/// One call: the argument vector plus the values crossing the boundary.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PipelineRequest {
    pub args: Vec<String>,
    pub inputs: Vec<PipelineInput>,
    pub outputs: Vec<PipelineOutput>,
}

impl PipelineRequest {
    pub fn new(args: impl Into<Vec<String>>) -> Self {
        Self {
            args: args.into(),
            ..Self::default()
        }
    }

    pub fn with_input(mut self, input: PipelineInput) -> Self {
        self.inputs.push(input);
        self
    }

    pub fn with_output(mut self, output: PipelineOutput) -> Self {
        self.outputs.push(output);
        self
    }
}

/// What the module returned. `outputs[i]` answers `request.outputs[i]`.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineResult {
    pub return_code: i32,
    pub stdout: String,
    pub stderr: String,
    pub outputs: Vec<PopulatedOutput>,
}

/// A nonzero code counts as failure only when the module also wrote to stderr.
fn reports_failure(return_code: i32, stderr: &str) -> bool {
    return_code != 0 && !stderr.is_empty()
}

impl PipelineResult {
    pub fn failed(&self) -> bool {
        reports_failure(self.return_code, &self.stderr)
    }

    /// Turn a failing result into `PipelineFailed` carrying the module's stderr.
    ///
    /// A nonzero code with empty stderr passes: some pipelines return
    /// informational codes.
    pub fn check(self) -> Result<Self> {
        if self.failed() {
            return Err(BridgeError::PipelineFailed {
                return_code: self.return_code,
                stderr: self.stderr,
            });
        }
        Ok(self)
    }
}

/// Drives write-inputs, invoke, read-outputs against one module.
///
/// The bridge owns the module and its captured output streams. Streams are
/// reset at the start of every call, so nothing from an earlier call leaks
/// into the next result.
pub struct Bridge<M: PipelineModule> {
    module: M,
    streams: CapturedStreams,
}

impl<M: PipelineModule> Bridge<M> {
    pub fn new(module: M) -> Self {
        Self {
            module,
            streams: CapturedStreams::default(),
        }
    }

    pub fn module(&self) -> &M {
        &self.module
    }

    pub fn module_mut(&mut self) -> &mut M {
        &mut self.module
    }

    pub fn into_module(self) -> M {
        self.module
    }

    /// Run one call over the filesystem transport.
    ///
    /// Every input is laid out before the first file is written, so an
    /// unsupported input leaves the filesystem untouched. Each requested
    /// output key is cleared before the call, so only files this call
    /// produced are read back. Outputs are read only when the result will
    /// not be reported as a failure. Staged inputs and output files are
    /// removed afterwards, whatever the outcome.
    ///
    /// # Errors
    /// * `UnsupportedKind`, `MissingBuffer` - an input cannot be laid out
    /// * `InvocationFault` - the entry point trapped; carries both streams
    /// * any transfer error while reading an output back
    pub fn run(&mut self, request: PipelineRequest) -> Result<PipelineResult> {
        let started = Instant::now();
        tracing::info!(
            "{}",
            InvocationStarted {
                transport: "filesystem",
                input_count: request.inputs.len(),
                output_count: request.outputs.len(),
            }
        );

        let payloads = request
            .inputs
            .iter()
            .map(build_payload)
            .collect::<Result<Vec<TransferPayload>>>()?;
        let stale = self.output_keys(&request.outputs);
        let fs = self.module.fs_mut();
        for key in &stale {
            fs.remove_all(key)?;
        }

        let outcome = self.stage_and_call(&request, &payloads, started);

        let mut leftovers: Vec<String> = payloads
            .iter()
            .flat_map(|payload| payload.paths().map(str::to_string))
            .collect();
        leftovers.extend(self.output_keys(&request.outputs));
        self.discard(&leftovers);
        outcome
    }

    fn stage_and_call(
        &mut self,
        request: &PipelineRequest,
        payloads: &[TransferPayload],
        started: Instant,
    ) -> Result<PipelineResult> {
        let fs = self.module.fs_mut();
        for payload in payloads {
            payload.write_to(fs)?;
        }
        tracing::debug!(
            "{}",
            InputsStaged {
                input_count: payloads.len(),
                byte_count: payloads
                    .iter()
                    .flat_map(|payload| payload.files())
                    .map(|(_, contents)| contents.len())
                    .sum(),
            }
        );

        self.streams.reset();
        let outcome = self.module.call_main(&request.args, &mut self.streams);
        let return_code = outcome.map_err(|fault| self.fault(fault))?;
        self.completed(return_code, started);

        let mut outputs = Vec::with_capacity(request.outputs.len());
        if self.should_read_outputs(return_code, request.outputs.len()) {
            let fs = self.module.fs();
            for output in &request.outputs {
                let data = transfer::read_output(fs, output)?;
                outputs.push(PopulatedOutput {
                    kind: output.kind,
                    path: output.path.clone(),
                    data,
                });
            }
        }
        Ok(self.result(return_code, outputs))
    }

    fn output_keys(&self, outputs: &[PipelineOutput]) -> Vec<String> {
        let fs = self.module.fs();
        outputs
            .iter()
            .flat_map(|output| transfer::output_keys(fs, output))
            .collect()
    }

    /// Remove per-call files. A failure is logged; the next call clears
    /// its output keys again before invoking.
    fn discard(&mut self, keys: &[String]) {
        let fs = self.module.fs_mut();
        for key in keys {
            if let Err(e) = fs.remove_all(key) {
                tracing::warn!("{}", CleanupFailed { path: key, error: &e });
            }
        }
    }

    fn fault(&self, fault: ModuleFault) -> BridgeError {
        tracing::error!(
            "{}",
            InvocationFaulted {
                diagnostic: &fault.diagnostic,
                stderr: self.streams.stderr(),
            }
        );
        BridgeError::InvocationFault {
            stdout: self.streams.stdout().to_string(),
            stderr: self.streams.stderr().to_string(),
            diagnostic: fault.diagnostic,
        }
    }

    fn completed(&self, return_code: i32, started: Instant) {
        tracing::info!(
            "{}",
            InvocationCompleted {
                return_code,
                stdout_bytes: self.streams.stdout().len(),
                stderr_bytes: self.streams.stderr().len(),
                duration: started.elapsed(),
            }
        );
    }

    fn should_read_outputs(&self, return_code: i32, output_count: usize) -> bool {
        if reports_failure(return_code, self.streams.stderr()) {
            tracing::warn!(
                "{}",
                OutputsSkipped {
                    return_code,
                    output_count,
                }
            );
            return false;
        }
        if return_code != 0 {
            tracing::warn!("{}", NonZeroReturnAccepted { return_code });
        }
        true
    }

    fn result(&self, return_code: i32, outputs: Vec<PopulatedOutput>) -> PipelineResult {
        PipelineResult {
            return_code,
            stdout: self.streams.stdout().to_string(),
            stderr: self.streams.stderr().to_string(),
            outputs,
        }
    }
}

impl Bridge<WasiModule> {
    /// Run one call over the memory transport.
    ///
    /// Input `i` and output `i` are addressed by position; their paths are
    /// carried through but not used for staging. Outputs are copied out only
    /// when the pipeline returns 0.
    pub fn run_memory_io(&mut self, request: PipelineRequest) -> Result<PipelineResult> {
        let started = Instant::now();
        tracing::info!(
            "{}",
            InvocationStarted {
                transport: "memory",
                input_count: request.inputs.len(),
                output_count: request.outputs.len(),
            }
        );
        for input in &request.inputs {
            transfer::memory::check_input(&input.data)?;
        }

        self.streams.reset();
        let mut session = self.module.memory_io_session(&request.args)?;
        if let Err(fault) = session.initialize() {
            session.drain_streams(&mut self.streams);
            return Err(self.fault(fault));
        }

        for (index, input) in request.inputs.iter().enumerate() {
            transfer::memory::write_input(&mut session, index as u32, &input.data)?;
        }
        let return_code = match session.start() {
            Ok(code) => code,
            Err(fault) => {
                session.drain_streams(&mut self.streams);
                return Err(self.fault(fault));
            }
        };

        let output_count = request.outputs.len();
        let mut outputs = Vec::with_capacity(output_count);
        if return_code == 0 {
            for (index, output) in request.outputs.into_iter().enumerate() {
                let data = transfer::memory::read_output(&mut session, index as u32, output.kind)?;
                outputs.push(PopulatedOutput {
                    kind: output.kind,
                    path: output.path,
                    data,
                });
            }
        }

        session.drain_streams(&mut self.streams);
        session.finish(return_code).map_err(|fault| self.fault(fault))?;
        self.completed(return_code, started);
        if return_code != 0 {
            self.should_read_outputs(return_code, output_count);
        }
        Ok(self.result(return_code, outputs))
    }
}
