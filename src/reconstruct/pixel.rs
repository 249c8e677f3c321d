// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Compile-time pixel descriptions for typed reconstruction.
//!
//! A reconstructor is parameterised by a marker type such as
//! `Vector<f32, 3>`; the marker fixes the component type, the pixel type name
//! and the number of components per pixel the descriptor must declare.

use crate::codec::ComponentType;
use crate::interface::PixelType;
use bytemuck::Pod;
use std::fmt::Debug;
use std::marker::PhantomData;

/// A numeric element type that can back a pixel buffer.
pub trait ComponentScalar: Pod + Debug + PartialEq + Send + Sync + 'static {
    const COMPONENT_TYPE: ComponentType;
}

macro_rules! impl_component_scalar {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl ComponentScalar for $ty {
                const COMPONENT_TYPE: ComponentType = ComponentType::$variant;
            }
        )*
    };
}

impl_component_scalar!(
    u8 => UInt8,
    i8 => Int8,
    u16 => UInt16,
    i16 => Int16,
    u32 => UInt32,
    i32 => Int32,
    u64 => UInt64,
    i64 => Int64,
    f32 => Float32,
    f64 => Float64,
);

pub trait PixelTraits {
    type Component: ComponentScalar;

    const PIXEL_TYPE: PixelType;

    /// Components per pixel; zero when the count is carried by the descriptor.
    const COMPONENTS: usize;
}

macro_rules! pixel_marker {
    ($(#[$doc:meta])* $name:ident, $pixel_type:ident, $components:expr) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
        pub struct $name<T>(PhantomData<T>);

        impl<T: ComponentScalar> PixelTraits for $name<T> {
            type Component = T;
            const PIXEL_TYPE: PixelType = PixelType::$pixel_type;
            const COMPONENTS: usize = $components;
        }
    };
    ($(#[$doc:meta])* $name:ident<N>, $pixel_type:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
        pub struct $name<T, const N: usize>(PhantomData<T>);

        impl<T: ComponentScalar, const N: usize> PixelTraits for $name<T, N> {
            type Component = T;
            const PIXEL_TYPE: PixelType = PixelType::$pixel_type;
            const COMPONENTS: usize = N;
        }
    };
}

pixel_marker!(
    /// One component per pixel.
    Scalar, Scalar, 1
);
pixel_marker!(Rgb, Rgb, 3);
pixel_marker!(Rgba, Rgba, 4);
pixel_marker!(
    /// Real and imaginary parts.
    Complex, Complex, 2
);
pixel_marker!(Vector<N>, Vector);
pixel_marker!(Point<N>, Point);
pixel_marker!(CovariantVector<N>, CovariantVector);
pixel_marker!(FixedArray<N>, FixedArray);
pixel_marker!(
    /// Per-pixel length taken from the descriptor.
    VariableLengthVector, VariableLengthVector, 0
);
pixel_marker!(
    /// Per-pixel element count taken from the descriptor.
    VariableSizeMatrix, VariableSizeMatrix, 0
);
