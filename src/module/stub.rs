// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Stand-in modules for exercising the bridge without compiling a pipeline.

use super::{CapturedStreams, ModuleFault, PipelineModule};
use crate::vfs::{MemFs, VirtualFs};

/// A reactor implementing the memory transport that hands every input back
/// as output `0`: the last JSON descriptor and the last array per sub-index.
///
/// Allocation is a bump heap from 1024, 8-byte aligned. Slots live at the
/// bottom of memory: JSON pointer/size at 0/4, array pointer/size at
/// `16 + 8 * sub_index`.
pub(crate) const ECHO_REACTOR_WAT: &str = r#"
(module
  (memory (export "memory") 1)
  (global $heap (mut i32) (i32.const 1024))
  (func $alloc (param $len i32) (result i32)
    (local $ptr i32)
    (local $end i32)
    (local.set $ptr (global.get $heap))
    (local.set $end (i32.and (i32.add (i32.add (local.get $ptr) (local.get $len)) (i32.const 7)) (i32.const -8)))
    (if (i32.gt_u (local.get $end) (i32.mul (memory.size) (i32.const 65536)))
      (then
        (drop (memory.grow
          (i32.div_u
            (i32.add (i32.sub (local.get $end) (i32.mul (memory.size) (i32.const 65536))) (i32.const 65535))
            (i32.const 65536))))))
    (global.set $heap (local.get $end))
    (local.get $ptr))
  (func $slot (param $sub i32) (result i32)
    (i32.add (i32.const 16) (i32.mul (local.get $sub) (i32.const 8))))
  (func (export "_initialize"))
  (func (export "itk_wasm_input_array_alloc") (param $mem i32) (param $idx i32) (param $sub i32) (param $len i32) (result i32)
    (local $ptr i32)
    (local.set $ptr (call $alloc (local.get $len)))
    (i32.store (call $slot (local.get $sub)) (local.get $ptr))
    (i32.store offset=4 (call $slot (local.get $sub)) (local.get $len))
    (local.get $ptr))
  (func (export "itk_wasm_input_json_alloc") (param $mem i32) (param $idx i32) (param $len i32) (result i32)
    (local $ptr i32)
    (local.set $ptr (call $alloc (local.get $len)))
    (i32.store (i32.const 0) (local.get $ptr))
    (i32.store (i32.const 4) (local.get $len))
    (local.get $ptr))
  (func (export "itk_wasm_delayed_start") (result i32)
    (i32.const 0))
  (func (export "itk_wasm_delayed_exit") (param $code i32))
  (func (export "itk_wasm_output_json_address") (param $mem i32) (param $idx i32) (result i32)
    (i32.load (i32.const 0)))
  (func (export "itk_wasm_output_json_size") (param $mem i32) (param $idx i32) (result i32)
    (i32.load (i32.const 4)))
  (func (export "itk_wasm_output_array_address") (param $mem i32) (param $idx i32) (param $sub i32) (result i32)
    (i32.load (call $slot (local.get $sub))))
  (func (export "itk_wasm_output_array_size") (param $mem i32) (param $idx i32) (param $sub i32) (result i32)
    (i32.load offset=4 (call $slot (local.get $sub)))))
"#;

/// A command module that opens `out.txt` in its preopened root, writes
/// `done`, and exits with 0.
pub(crate) const WRITE_FILE_WAT: &str = r#"
(module
  (import "wasi_snapshot_preview1" "path_open"
    (func $path_open (param i32 i32 i32 i32 i32 i64 i64 i32 i32) (result i32)))
  (import "wasi_snapshot_preview1" "fd_write" (func $fd_write (param i32 i32 i32 i32) (result i32)))
  (memory (export "memory") 1)
  (data (i32.const 64) "out.txt")
  (data (i32.const 80) "done")
  (func (export "_start")
    (drop (call $path_open
      (i32.const 3) (i32.const 0) (i32.const 64) (i32.const 7)
      (i32.const 9) (i64.const 0x1ff) (i64.const 0x1ff) (i32.const 0) (i32.const 0)))
    (i32.store (i32.const 8) (i32.const 80))
    (i32.store (i32.const 12) (i32.const 4))
    (drop (call $fd_write (i32.load (i32.const 0)) (i32.const 8) (i32.const 1) (i32.const 16)))))
"#;

/// A command whose `_start` creates a symbolic link at `link` pointing to
/// `target` inside the preopened directory, then returns.
pub(crate) fn symlink_wat(target: &str, link: &str) -> String {
    format!(
        r#"
(module
  (import "wasi_snapshot_preview1" "path_symlink"
    (func $path_symlink (param i32 i32 i32 i32 i32) (result i32)))
  (memory (export "memory") 1)
  (data (i32.const 64) "{target}")
  (data (i32.const 2048) "{link}")
  (func (export "_start")
    (drop (call $path_symlink
      (i32.const 64) (i32.const {target_len}) (i32.const 3) (i32.const 2048) (i32.const {link_len})))))
"#,
        target = target,
        link = link,
        target_len = target.len(),
        link_len = link.len(),
    )
}

/// Copies whatever sits under each `from` key to the matching `to` key,
/// including sidecar siblings such as `from.data`.
pub(crate) struct EchoModule {
    fs: MemFs,
    copies: Vec<(String, String)>,
    pub(crate) calls: Vec<Vec<String>>,
}

impl EchoModule {
    pub(crate) fn new(copies: &[(&str, &str)]) -> Self {
        Self {
            fs: MemFs::new(),
            copies: copies
                .iter()
                .map(|(from, to)| (from.to_string(), to.to_string()))
                .collect(),
            calls: Vec::new(),
        }
    }

    pub(crate) fn mem_fs(&self) -> &MemFs {
        &self.fs
    }
}

impl PipelineModule for EchoModule {
    fn fs(&self) -> &dyn VirtualFs {
        &self.fs
    }

    fn fs_mut(&mut self) -> &mut dyn VirtualFs {
        &mut self.fs
    }

    fn call_main(&mut self, args: &[String], streams: &mut CapturedStreams) -> Result<i32, ModuleFault> {
        self.calls.push(args.to_vec());
        for (from, to) in &self.copies {
            let keys: Vec<String> = self
                .fs
                .files()
                .filter(|key| *key == from || key.starts_with(&format!("{}.", from)))
                .map(str::to_string)
                .collect();
            for key in keys {
                let contents = self
                    .fs
                    .read_file(&key)
                    .map_err(|e| ModuleFault::new(e.to_string()))?;
                let target = format!("{}{}", to, &key[from.len()..]);
                self.fs
                    .write_file(&target, &contents)
                    .map_err(|e| ModuleFault::new(e.to_string()))?;
            }
        }
        streams.append(format!("echoed {} value(s)\n", self.copies.len()).as_bytes(), b"");
        Ok(0)
    }
}

/// Writes to both streams, then traps.
pub(crate) struct FaultingModule {
    fs: MemFs,
}

impl FaultingModule {
    pub(crate) fn new() -> Self {
        Self { fs: MemFs::new() }
    }
}

impl PipelineModule for FaultingModule {
    fn fs(&self) -> &dyn VirtualFs {
        &self.fs
    }

    fn fs_mut(&mut self) -> &mut dyn VirtualFs {
        &mut self.fs
    }

    fn call_main(&mut self, _args: &[String], streams: &mut CapturedStreams) -> Result<i32, ModuleFault> {
        streams.append(b"reading input\n", b"segmentation fault\n");
        Err(ModuleFault::new("wasm trap: out of bounds memory access"))
    }
}

/// Returns a fixed code with an optional stderr line, writing one file
/// during the call when configured to.
pub(crate) struct ExitCodeModule {
    fs: MemFs,
    code: i32,
    stderr: &'static str,
    output: Option<(&'static str, &'static [u8])>,
}

impl ExitCodeModule {
    pub(crate) fn new(code: i32, stderr: &'static str) -> Self {
        Self {
            fs: MemFs::new(),
            code,
            stderr,
            output: None,
        }
    }

    pub(crate) fn with_output(mut self, path: &'static str, contents: &'static [u8]) -> Self {
        self.output = Some((path, contents));
        self
    }
}

impl PipelineModule for ExitCodeModule {
    fn fs(&self) -> &dyn VirtualFs {
        &self.fs
    }

    fn fs_mut(&mut self) -> &mut dyn VirtualFs {
        &mut self.fs
    }

    fn call_main(&mut self, _args: &[String], streams: &mut CapturedStreams) -> Result<i32, ModuleFault> {
        if let Some((path, contents)) = self.output {
            self.fs
                .write_file(path, contents)
                .map_err(|e| ModuleFault::new(e.to_string()))?;
        }
        streams.append(b"", self.stderr.as_bytes());
        Ok(self.code)
    }
}
