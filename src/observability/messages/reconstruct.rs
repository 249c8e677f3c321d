// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for typed image reconstruction.

use std::fmt::{Display, Formatter};

/// A descriptor failed structural validation.
///
/// # Log Level
/// `debug!` - The error itself is returned to the caller
pub struct ValidationRejected<'a> {
    pub check: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for ValidationRejected<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Descriptor rejected at {} check: {}", self.check, self.error)
    }
}

/// A region was not aligned for its element type and had to be copied.
///
/// # Log Level
/// `debug!` - Detailed execution trace
pub struct UnalignedBufferCopied {
    pub address: usize,
    pub byte_len: usize,
    pub alignment: usize,
}

impl Display for UnalignedBufferCopied {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Copied {} bytes at address {}: not aligned to {} bytes",
            self.byte_len, self.address, self.alignment
        )
    }
}

/// An image was reconstructed.
///
/// # Log Level
/// `debug!` - Detailed execution trace
pub struct ImageReconstructed<'a> {
    pub name: &'a str,
    pub dimension: usize,
    pub pixel_type: &'a str,
    pub component_type: &'a str,
    pub pixels: usize,
    pub borrowed: bool,
}

impl Display for ImageReconstructed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Reconstructed {}D {}<{}> image '{}' with {} pixels ({})",
            self.dimension,
            self.pixel_type,
            self.component_type,
            self.name,
            self.pixels,
            if self.borrowed { "borrowed" } else { "copied" }
        )
    }
}
