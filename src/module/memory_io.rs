// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! One instantiation of a pipeline for the memory transport.
//!
//! Sequence: [`initialize`](MemoryIoSession::initialize), stage inputs through
//! [`MemoryInputSink`], [`start`](MemoryIoSession::start), read outputs through
//! [`MemoryOutputSource`] or reconstruct them in place over
//! [`linear_memory`](MemoryIoSession::linear_memory), then
//! [`finish`](MemoryIoSession::finish).

use super::detector::REACTOR_INIT;
use super::wasi_module::{exit_status, Pipes, WasiState};
use super::{CapturedStreams, ModuleFault};
use crate::errors::{BridgeError, ModuleError, ModuleResult, Result};
use crate::reconstruct::LinearMemory;
use crate::transfer::{MemoryAddress, MemoryInputSink, MemoryOutputSource};
use wasmtime::{Instance, Memory, Store, TypedFunc, WasmParams, WasmResults};

/// Every memory-transport call takes the memory index first; pipelines have one memory.
const MEMORY_INDEX: i32 = 0;

pub struct MemoryIoSession {
    store: Store<WasiState>,
    memory: Memory,
    initialize: TypedFunc<(), ()>,
    input_array_alloc: TypedFunc<(i32, i32, i32, i32), i32>,
    input_json_alloc: TypedFunc<(i32, i32, i32), i32>,
    delayed_start: TypedFunc<(), i32>,
    delayed_exit: TypedFunc<i32, ()>,
    output_json_address: TypedFunc<(i32, i32), i32>,
    output_json_size: TypedFunc<(i32, i32), i32>,
    output_array_address: TypedFunc<(i32, i32, i32), i32>,
    output_array_size: TypedFunc<(i32, i32, i32), i32>,
    pipes: Pipes,
}

fn typed<P, R>(store: &mut Store<WasiState>, instance: &Instance, name: &str) -> ModuleResult<TypedFunc<P, R>>
where
    P: WasmParams,
    R: WasmResults,
{
    instance
        .get_typed_func::<P, R>(&mut *store, name)
        .map_err(|e| ModuleError::MissingExport {
            name: name.to_string(),
            reason: format!("{:#}", e),
        })
}

/// A guest call made while staging or collecting data.
fn guest_call<T>(name: &str, outcome: anyhow::Result<T>) -> Result<T> {
    outcome.map_err(|e| BridgeError::Module(ModuleError::MemoryError(format!("{} failed: {:#}", name, e))))
}

fn address(value: i32) -> usize {
    value as u32 as usize
}

fn index(value: u32) -> i32 {
    value as i32
}

impl MemoryIoSession {
    pub(crate) fn new(mut store: Store<WasiState>, instance: Instance, pipes: Pipes) -> ModuleResult<Self> {
        let memory = instance
            .get_memory(&mut store, "memory")
            .ok_or_else(|| ModuleError::MissingExport {
                name: "memory".to_string(),
                reason: "no linear memory export".to_string(),
            })?;
        Ok(Self {
            initialize: typed(&mut store, &instance, REACTOR_INIT)?,
            input_array_alloc: typed(&mut store, &instance, "itk_wasm_input_array_alloc")?,
            input_json_alloc: typed(&mut store, &instance, "itk_wasm_input_json_alloc")?,
            delayed_start: typed(&mut store, &instance, "itk_wasm_delayed_start")?,
            delayed_exit: typed(&mut store, &instance, "itk_wasm_delayed_exit")?,
            output_json_address: typed(&mut store, &instance, "itk_wasm_output_json_address")?,
            output_json_size: typed(&mut store, &instance, "itk_wasm_output_json_size")?,
            output_array_address: typed(&mut store, &instance, "itk_wasm_output_array_address")?,
            output_array_size: typed(&mut store, &instance, "itk_wasm_output_array_size")?,
            memory,
            store,
            pipes,
        })
    }

    /// Run the reactor's `_initialize`.
    pub fn initialize(&mut self) -> std::result::Result<(), ModuleFault> {
        let outcome = self.initialize.call(&mut self.store, ()).map(|()| 0);
        exit_status(REACTOR_INIT, outcome).map(|_| ())
    }

    /// Run the pipeline body over the staged inputs and return its code.
    pub fn start(&mut self) -> std::result::Result<i32, ModuleFault> {
        let outcome = self.delayed_start.call(&mut self.store, ());
        exit_status("itk_wasm_delayed_start", outcome)
    }

    /// Release the pipeline's outputs. Views from [`linear_memory`](Self::linear_memory)
    /// cannot outlive this call.
    pub fn finish(mut self, return_code: i32) -> std::result::Result<(), ModuleFault> {
        let outcome = self.delayed_exit.call(&mut self.store, return_code).map(|()| 0);
        exit_status("itk_wasm_delayed_exit", outcome).map(|_| ())
    }

    /// Guest memory as an address space for zero-copy reconstruction.
    pub fn linear_memory(&self) -> LinearMemory<'_> {
        LinearMemory::new(self.memory.data(&self.store))
    }

    /// Append what the module has written so far.
    pub fn drain_streams(&self, streams: &mut CapturedStreams) {
        self.pipes.drain_into(streams);
    }

    fn read(&self, start: usize, len: usize) -> Result<Vec<u8>> {
        let mut buffer = vec![0u8; len];
        self.memory
            .read(&self.store, start, &mut buffer)
            .map_err(|_| BridgeError::UnresolvedAddress { address: start, len })?;
        Ok(buffer)
    }

    fn write(&mut self, start: usize, bytes: &[u8]) -> Result<()> {
        self.memory
            .write(&mut self.store, start, bytes)
            .map_err(|e| BridgeError::Module(ModuleError::MemoryError(e.to_string())))
    }
}

impl MemoryInputSink for MemoryIoSession {
    fn input_array(&mut self, input: u32, sub_index: u32, bytes: &[u8]) -> Result<MemoryAddress> {
        let outcome = self.input_array_alloc.call(
            &mut self.store,
            (MEMORY_INDEX, index(input), index(sub_index), bytes.len() as i32),
        );
        let start = address(guest_call("itk_wasm_input_array_alloc", outcome)?);
        self.write(start, bytes)?;
        Ok(MemoryAddress(start))
    }

    fn input_json(&mut self, input: u32, json: &[u8]) -> Result<()> {
        let outcome = self
            .input_json_alloc
            .call(&mut self.store, (MEMORY_INDEX, index(input), json.len() as i32));
        let start = address(guest_call("itk_wasm_input_json_alloc", outcome)?);
        self.write(start, json)
    }
}

impl MemoryOutputSource for MemoryIoSession {
    fn output_json(&mut self, output: u32) -> Result<Vec<u8>> {
        let args = (MEMORY_INDEX, index(output));
        let start = guest_call(
            "itk_wasm_output_json_address",
            self.output_json_address.call(&mut self.store, args),
        )?;
        let len = guest_call(
            "itk_wasm_output_json_size",
            self.output_json_size.call(&mut self.store, args),
        )?;
        self.read(address(start), address(len))
    }

    fn output_array(&mut self, output: u32, sub_index: u32) -> Result<Vec<u8>> {
        let args = (MEMORY_INDEX, index(output), index(sub_index));
        let start = guest_call(
            "itk_wasm_output_array_address",
            self.output_array_address.call(&mut self.store, args),
        )?;
        let len = guest_call(
            "itk_wasm_output_array_size",
            self.output_array_size.call(&mut self.store, args),
        )?;
        self.read(address(start), address(len))
    }
}
