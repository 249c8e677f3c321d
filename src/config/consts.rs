// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

/// Default fuel level for one pipeline invocation (100 million instructions)
pub const DEFAULT_FUEL_LEVEL: u64 = 100_000_000;
/// Minimum allowed fuel level (1 million instructions)
pub const MIN_FUEL_LEVEL: u64 = 1_000_000;
/// Maximum allowed fuel level (500 million instructions) - security limit
pub const MAX_FUEL_LEVEL: u64 = 500_000_000;

/// Largest pipeline binary accepted by default (64 MB)
pub const DEFAULT_MAX_MODULE_BYTES: usize = 64 * 1024 * 1024;

/// `argv[0]` handed to every pipeline
pub const DEFAULT_PROGRAM_NAME: &str = "itk-wasm-pipeline";

/// Bytes captured from each of stdout and stderr per call (1 MB)
pub const DEFAULT_STREAM_CAPACITY: usize = 1024 * 1024;
