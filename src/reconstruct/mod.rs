// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Typed image reconstruction from a descriptor plus encoded addresses.
//!
//! The native path hands over a JSON descriptor whose `direction` and `data`
//! fields are [`MemoryAddress`](crate::transfer::MemoryAddress) strings.
//! [`ImageReconstructor`] checks the descriptor against a compile-time pixel
//! type and dimension and imports the pixels as a view into the supplied
//! [`AddressSpace`], copying only when the region is misaligned.

mod address_space;
mod filter;
mod pixel;
mod typed_image;

pub use address_space::{AddressSpace, HostArena, LinearMemory};
pub use filter::ImageReconstructor;
pub use pixel::{
    ComponentScalar, Complex, CovariantVector, FixedArray, PixelTraits, Point, Rgb, Rgba, Scalar,
    VariableLengthVector, VariableSizeMatrix, Vector,
};
pub use typed_image::TypedImage;

use crate::errors::Result;
use crate::interface::Image;
use crate::transfer::{image_data_bytes, WireImage};
use serde_json::Value;

/// Register `image`'s direction and pixels in `arena` and describe them by address.
pub fn encode_image_descriptor(image: &Image, arena: &mut HostArena) -> Result<String> {
    let data = arena.register(image_data_bytes(image)?);
    let direction = arena.register_values(&image.direction);
    let wire = WireImage::describe(
        image,
        Value::String(direction.encode()),
        Value::String(data.encode()),
    );
    Ok(serde_json::to_string(&wire)?)
}
