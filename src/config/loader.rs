// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::config::consts::{
    DEFAULT_FUEL_LEVEL, DEFAULT_MAX_MODULE_BYTES, DEFAULT_PROGRAM_NAME, DEFAULT_STREAM_CAPACITY,
    MAX_FUEL_LEVEL, MIN_FUEL_LEVEL,
};
use crate::errors::{BridgeError, Result};
use crate::observability::messages::config::FuelClamped;
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Bridge configuration, typically loaded from a YAML file.
///
/// Every section is optional; an empty document yields the defaults.
///
/// # Example
/// ```yaml
/// wasm:
///   fuel:
///     default: 100000000
///     maximum: 500000000
///   max_module_bytes: 67108864
/// bridge:
///   program_name: itk-wasm-pipeline
///   stream_capacity: 1048576
/// ```
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub wasm: WasmConfig,
    #[serde(default)]
    pub bridge: BridgeConfig,
}

/// Resource limits for pipeline modules.
///
/// # Fields
/// * `fuel` - Instruction budget per invocation
/// * `max_module_bytes` - Largest binary accepted (defaults to 64 MB)
/// * `max_memory_bytes` - Cap on guest linear memory growth (unlimited when unset)
#[derive(Debug, Default, Deserialize)]
pub struct WasmConfig {
    #[serde(default)]
    pub fuel: FuelConfig,
    pub max_module_bytes: Option<usize>,
    pub max_memory_bytes: Option<usize>,
}

impl WasmConfig {
    pub fn get_max_module_bytes(&self) -> usize {
        self.max_module_bytes.unwrap_or(DEFAULT_MAX_MODULE_BYTES)
    }
}

/// Fuel consumption configuration for WASM execution.
///
/// Fuel limits prevent infinite loops and resource exhaustion by limiting the number
/// of instructions a pipeline can execute. All values are optional and validated
/// against security bounds.
///
/// # Example
/// ```yaml
/// fuel:
///   default: 100000000   # 100 million instructions
///   minimum: 1000000     # 1 million instructions
///   maximum: 500000000   # 500 million instructions (hard limit)
/// ```
#[derive(Debug, Default, Deserialize)]
pub struct FuelConfig {
    pub default: Option<u64>,
    pub minimum: Option<u64>,
    pub maximum: Option<u64>,
}

impl FuelConfig {
    pub fn get_default(&self) -> u64 {
        self.default.unwrap_or(DEFAULT_FUEL_LEVEL)
    }

    pub fn get_minimum(&self) -> u64 {
        self.minimum.unwrap_or(MIN_FUEL_LEVEL)
    }

    pub fn get_maximum(&self) -> u64 {
        self.maximum.unwrap_or(MAX_FUEL_LEVEL)
    }

    /// Validate and clamp a fuel level to configured bounds.
    ///
    /// # Example
    /// ```
    /// use wasm_interface_bridge::config::FuelConfig;
    ///
    /// let config = FuelConfig::default();
    /// let fuel = config.validate_and_clamp(1_000_000_000); // Too high
    /// assert_eq!(fuel, 500_000_000); // Clamped to maximum
    /// ```
    pub fn validate_and_clamp(&self, requested: u64) -> u64 {
        let min = self.get_minimum();
        let max = self.get_maximum().max(min);
        let fuel = requested.clamp(min, max);
        if fuel != requested {
            tracing::warn!(
                "{}",
                FuelClamped {
                    requested,
                    minimum: min,
                    maximum: max,
                    used: fuel,
                }
            );
        }
        fuel
    }

    /// The configured default, clamped to bounds.
    pub fn effective(&self) -> u64 {
        self.validate_and_clamp(self.get_default())
    }
}

/// Invocation settings.
///
/// # Fields
/// * `program_name` - `argv[0]` for every call
/// * `stream_capacity` - Bytes captured per stdout/stderr per call
#[derive(Debug, Deserialize)]
pub struct BridgeConfig {
    #[serde(default = "default_program_name")]
    pub program_name: String,
    #[serde(default = "default_stream_capacity")]
    pub stream_capacity: usize,
}

fn default_program_name() -> String {
    DEFAULT_PROGRAM_NAME.to_string()
}

fn default_stream_capacity() -> usize {
    DEFAULT_STREAM_CAPACITY
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            program_name: default_program_name(),
            stream_capacity: default_stream_capacity(),
        }
    }
}

/// Load a config from a YAML file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .map_err(|e| BridgeError::Config(format!("cannot read {}: {}", path.display(), e)))?;
    let cfg: Config = serde_yaml::from_str(&content)
        .map_err(|e| BridgeError::Config(format!("invalid {}: {}", path.display(), e)))?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn parse_full_config() {
        let yaml = r#"
wasm:
  fuel:
    default: 2000000
    minimum: 1000000
    maximum: 3000000
  max_module_bytes: 1024
  max_memory_bytes: 65536
bridge:
  program_name: median-filter
  stream_capacity: 4096
"#;
        let cfg: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(cfg.wasm.fuel.effective(), 2_000_000);
        assert_eq!(cfg.wasm.get_max_module_bytes(), 1024);
        assert_eq!(cfg.wasm.max_memory_bytes, Some(65536));
        assert_eq!(cfg.bridge.program_name, "median-filter");
        assert_eq!(cfg.bridge.stream_capacity, 4096);
    }

    #[test]
    fn test_empty_document_uses_defaults() {
        let cfg: Config = serde_yaml::from_str("{}").unwrap();
        assert_eq!(cfg.wasm.fuel.effective(), DEFAULT_FUEL_LEVEL);
        assert_eq!(cfg.wasm.get_max_module_bytes(), DEFAULT_MAX_MODULE_BYTES);
        assert_eq!(cfg.wasm.max_memory_bytes, None);
        assert_eq!(cfg.bridge.program_name, DEFAULT_PROGRAM_NAME);
        assert_eq!(cfg.bridge.stream_capacity, DEFAULT_STREAM_CAPACITY);
    }

    #[test]
    fn test_fuel_clamping() {
        let fuel = FuelConfig::default();
        assert_eq!(fuel.validate_and_clamp(10), MIN_FUEL_LEVEL);
        assert_eq!(fuel.validate_and_clamp(u64::MAX), MAX_FUEL_LEVEL);
        assert_eq!(fuel.validate_and_clamp(5_000_000), 5_000_000);
    }

    #[test]
    fn test_load_config_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "bridge:\n  program_name: threshold").unwrap();

        let cfg = load_config(file.path()).unwrap();
        assert_eq!(cfg.bridge.program_name, "threshold");
        assert_eq!(cfg.wasm.fuel.get_default(), DEFAULT_FUEL_LEVEL);
    }

    #[test]
    fn test_load_config_errors_are_config_errors() {
        assert!(matches!(
            load_config("/nonexistent/bridge.yaml"),
            Err(BridgeError::Config(_))
        ));

        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "wasm: [not, a, map]").unwrap();
        assert!(matches!(load_config(file.path()), Err(BridgeError::Config(_))));
    }
}
