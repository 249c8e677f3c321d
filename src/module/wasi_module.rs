// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use super::detector::{detect_entry_points, EntryPoints, COMMAND_ENTRY};
use super::engine::create_engine;
use super::loader::{check_size, load_wasm_bytes};
use super::memory_io::MemoryIoSession;
use super::{CapturedStreams, ModuleFault, PipelineModule};
use crate::config::Config;
use crate::errors::{ModuleError, ModuleResult, Result};
use crate::observability::messages::module::{EntryPointReturned, EntryPointTrapped, ModuleCompiled};
use crate::vfs::{ScratchDirFs, VirtualFs};
use std::path::Path;
use wasmtime::{Engine, Linker, Module, Store, StoreLimits, StoreLimitsBuilder};
use wasmtime_wasi::p1::WasiP1Ctx;
use wasmtime_wasi::p2::pipe::MemoryOutputPipe;
use wasmtime_wasi::{DirPerms, FilePerms, I32Exit, WasiCtxBuilder};

/// Per-call store data.
pub(crate) struct WasiState {
    wasi: WasiP1Ctx,
    limits: StoreLimits,
}

/// Captured stdout/stderr pipes for one store.
pub(crate) struct Pipes {
    stdout: MemoryOutputPipe,
    stderr: MemoryOutputPipe,
}

impl Pipes {
    fn new(capacity: usize) -> Self {
        Self {
            stdout: MemoryOutputPipe::new(capacity),
            stderr: MemoryOutputPipe::new(capacity),
        }
    }

    pub(crate) fn drain_into(&self, streams: &mut CapturedStreams) {
        streams.append(&self.stdout.contents(), &self.stderr.contents());
    }
}

/// A WASI preview 1 pipeline compiled on wasmtime.
///
/// The module's filesystem is a host scratch directory, preopened as `.` in
/// every call. Each call gets a fresh store: new arguments, new pipes and a
/// full fuel budget.
pub struct WasiModule {
    name: String,
    engine: Engine,
    module: Module,
    linker: Linker<WasiState>,
    entry_points: EntryPoints,
    fs: ScratchDirFs,
    program_name: String,
    fuel: u64,
    max_memory_bytes: Option<usize>,
    stream_capacity: usize,
}

impl WasiModule {
    /// Load and compile the binary at `path`.
    pub fn from_file<P: AsRef<Path>>(path: P, config: &Config) -> Result<Self> {
        let path = path.as_ref();
        let bytes = load_wasm_bytes(path, config.wasm.get_max_module_bytes())?;
        Self::from_bytes(&path.display().to_string(), &bytes, config)
    }

    /// Compile an in-memory binary. `name` is used for logging only.
    pub fn from_bytes(name: &str, bytes: &[u8], config: &Config) -> Result<Self> {
        check_size(bytes, config.wasm.get_max_module_bytes())?;
        let entry_points = detect_entry_points(bytes)?;
        let engine = create_engine(&config.wasm)?;
        let module = Module::new(&engine, bytes).map_err(|e| ModuleError::CompileError(format!("{:#}", e)))?;

        let mut linker: Linker<WasiState> = Linker::new(&engine);
        wasmtime_wasi::p1::add_to_linker_sync(&mut linker, |state: &mut WasiState| &mut state.wasi)
            .map_err(|e| ModuleError::InstantiationError(format!("{:#}", e)))?;

        let fuel = config.wasm.fuel.effective();
        tracing::info!(
            "{}",
            ModuleCompiled {
                module_name: name,
                convention: entry_points.describe(),
                fuel,
            }
        );

        Ok(Self {
            name: name.to_string(),
            engine,
            module,
            linker,
            entry_points,
            fs: ScratchDirFs::new()?,
            program_name: config.bridge.program_name.clone(),
            fuel,
            max_memory_bytes: config.wasm.max_memory_bytes,
            stream_capacity: config.bridge.stream_capacity,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn entry_points(&self) -> EntryPoints {
        self.entry_points
    }

    fn new_store(&self, args: &[String], pipes: &Pipes) -> ModuleResult<Store<WasiState>> {
        let mut argv = Vec::with_capacity(args.len() + 1);
        argv.push(self.program_name.as_str());
        argv.extend(args.iter().map(String::as_str));

        let mut builder = WasiCtxBuilder::new();
        builder
            .args(&argv)
            .stdout(pipes.stdout.clone())
            .stderr(pipes.stderr.clone());
        builder
            .preopened_dir(self.fs.root(), ".", DirPerms::all(), FilePerms::all())
            .map_err(|e| ModuleError::InstantiationError(format!("preopen failed: {:#}", e)))?;

        let mut limits = StoreLimitsBuilder::new();
        if let Some(max) = self.max_memory_bytes {
            limits = limits.memory_size(max);
        }

        let mut store = Store::new(
            &self.engine,
            WasiState {
                wasi: builder.build_p1(),
                limits: limits.build(),
            },
        );
        store.limiter(|state| &mut state.limits);
        store
            .set_fuel(self.fuel)
            .map_err(|e| ModuleError::EngineError(format!("{:#}", e)))?;
        Ok(store)
    }

    /// Instantiate the module for the memory transport.
    ///
    /// `_initialize` has not run yet; see [`MemoryIoSession::initialize`].
    pub fn memory_io_session(&mut self, args: &[String]) -> Result<MemoryIoSession> {
        if !self.entry_points.memory_io {
            return Err(ModuleError::MissingExport {
                name: super::detector::REACTOR_INIT.to_string(),
                reason: format!("'{}' does not support the memory transport", self.name),
            }
            .into());
        }
        let pipes = Pipes::new(self.stream_capacity);
        let mut store = self.new_store(args, &pipes)?;
        let instance = self
            .linker
            .instantiate(&mut store, &self.module)
            .map_err(|e| ModuleError::InstantiationError(format!("{:#}", e)))?;
        Ok(MemoryIoSession::new(store, instance, pipes)?)
    }
}

/// Map an entry point's outcome to an exit code, treating `proc_exit` as a normal return.
pub(crate) fn exit_status(entry_point: &str, outcome: anyhow::Result<i32>) -> std::result::Result<i32, ModuleFault> {
    let code = match outcome {
        Ok(code) => code,
        Err(error) => match error.downcast_ref::<I32Exit>() {
            Some(exit) => exit.0,
            None => {
                let trap = format!("{:#}", error);
                tracing::warn!(
                    "{}",
                    EntryPointTrapped {
                        entry_point,
                        trap: &trap,
                    }
                );
                return Err(ModuleFault::new(trap));
            }
        },
    };
    tracing::debug!(
        "{}",
        EntryPointReturned {
            entry_point,
            return_code: code,
        }
    );
    Ok(code)
}

impl PipelineModule for WasiModule {
    fn fs(&self) -> &dyn VirtualFs {
        &self.fs
    }

    fn fs_mut(&mut self) -> &mut dyn VirtualFs {
        &mut self.fs
    }

    fn call_main(&mut self, args: &[String], streams: &mut CapturedStreams) -> std::result::Result<i32, ModuleFault> {
        if !self.entry_points.command {
            return Err(ModuleFault::new(format!(
                "'{}' has no '{}' export; use the memory transport",
                self.name, COMMAND_ENTRY
            )));
        }

        let pipes = Pipes::new(self.stream_capacity);
        let mut store = self
            .new_store(args, &pipes)
            .map_err(|e| ModuleFault::new(e.to_string()))?;

        let outcome = self
            .linker
            .instantiate(&mut store, &self.module)
            .and_then(|instance| instance.get_typed_func::<(), ()>(&mut store, COMMAND_ENTRY))
            .and_then(|start| start.call(&mut store, ()))
            .map(|()| 0);

        pipes.drain_into(streams);
        exit_status(COMMAND_ENTRY, outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STDERR_THEN_EXIT: &str = r#"
(module
  (import "wasi_snapshot_preview1" "fd_write" (func $fd_write (param i32 i32 i32 i32) (result i32)))
  (import "wasi_snapshot_preview1" "proc_exit" (func $proc_exit (param i32)))
  (memory (export "memory") 1)
  (data (i32.const 16) "bad input\n")
  (func (export "_start")
    (i32.store (i32.const 0) (i32.const 16))
    (i32.store (i32.const 4) (i32.const 10))
    (drop (call $fd_write (i32.const 2) (i32.const 0) (i32.const 1) (i32.const 8)))
    (call $proc_exit (i32.const 3))))
"#;

    const UNREACHABLE: &str = r#"
(module
  (memory (export "memory") 1)
  (func (export "_start") unreachable))
"#;

    const SPIN: &str = r#"
(module
  (memory (export "memory") 1)
  (func (export "_start") (loop $forever (br $forever))))
"#;

    fn compile(source: &str, config: &Config) -> WasiModule {
        WasiModule::from_bytes("test.wasm", &wat::parse_str(source).unwrap(), config).unwrap()
    }

    #[test]
    fn test_proc_exit_code_and_stderr() {
        let mut module = compile(STDERR_THEN_EXIT, &Config::default());
        let mut streams = CapturedStreams::default();

        let code = module.call_main(&[], &mut streams).unwrap();
        assert_eq!(code, 3);
        assert_eq!(streams.stderr(), "bad input\n");
        assert!(streams.stdout().is_empty());
    }

    #[test]
    fn test_trap_is_a_fault() {
        let mut module = compile(UNREACHABLE, &Config::default());
        let mut streams = CapturedStreams::default();
        assert!(module.call_main(&[], &mut streams).is_err());
    }

    #[test]
    fn test_fuel_exhaustion_is_a_fault() {
        let mut config = Config::default();
        config.wasm.fuel.default = Some(1_000_000);
        let mut module = compile(SPIN, &config);
        let mut streams = CapturedStreams::default();
        assert!(module.call_main(&[], &mut streams).is_err());
    }

    #[test]
    fn test_reactor_only_module_cannot_call_main() {
        let mut module = compile(crate::module::stub::ECHO_REACTOR_WAT, &Config::default());
        let mut streams = CapturedStreams::default();
        let fault = module.call_main(&[], &mut streams).unwrap_err();
        assert!(fault.diagnostic.contains("memory transport"));
    }

    #[test]
    fn test_oversized_binary_is_rejected() {
        let mut config = Config::default();
        config.wasm.max_module_bytes = Some(8);
        let wasm = wat::parse_str(UNREACHABLE).unwrap();
        let result = WasiModule::from_bytes("big.wasm", &wasm, &config);
        assert!(matches!(
            result,
            Err(crate::errors::BridgeError::Module(ModuleError::ValidationError(_)))
        ));
    }
}
