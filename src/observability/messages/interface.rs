// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for data-kind parsing.

use serde_json::Value;
use std::fmt::{Display, Formatter};

/// A metadata array element was not a `[key, value]` pair.
///
/// # Log Level
/// `warn!` - Entry dropped, the rest of the dictionary is kept
pub struct MetadataPairSkipped<'a> {
    pub entry: &'a Value,
}

impl Display for MetadataPairSkipped<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Skipping metadata entry that is not a [key, value] pair: {}",
            self.entry
        )
    }
}

/// A metadata value has no dictionary representation.
///
/// # Log Level
/// `warn!` - Entry dropped, the rest of the dictionary is kept
pub struct MetadataValueSkipped<'a> {
    pub key: &'a str,
    pub value: &'a Value,
}

impl Display for MetadataValueSkipped<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Skipping metadata entry '{}' with unsupported value {}",
            self.key, self.value
        )
    }
}
