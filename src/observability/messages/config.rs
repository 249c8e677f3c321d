// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for configuration events.

use std::fmt::{Display, Formatter};

/// A requested fuel level fell outside the configured bounds.
///
/// # Log Level
/// `warn!` - The clamped value is used instead
pub struct FuelClamped {
    pub requested: u64,
    pub minimum: u64,
    pub maximum: u64,
    pub used: u64,
}

impl Display for FuelClamped {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Requested fuel {} outside [{}, {}], using {}",
            self.requested, self.minimum, self.maximum, self.used
        )
    }
}
