//! Image processing: the pixel engine.
//!
//! | Operation | Where |
//! |---|---|
//! | **Pixel access** | [`PixelBuffer::get`] / [`PixelBuffer::set`], stride-aware BGR(A) |
//! | **Color transform** | [`transform::apply`] with a channel mask; [`transform::invert`], [`transform::adjust`] |
//! | **Resize** | [`resample::resize`], Catmull-Rom with edge clamping |
//! | **Decode / encode** | [`ImageCodec`] trait, [`RustBackend`] on the `image` crate |
//!
//! The module is split into:
//! - **Pixel**: buffer layout and the `Color`/`Channels` value types
//! - **Calculations**: Pure functions for dimension math (unit testable)
//! - **Transform / Resample**: the two buffer-level algorithms
//! - **Parameters**: Data structures describing single-image operations
//! - **Backend**: [`ImageCodec`] trait + [`RustBackend`]
//! - **Operations**: High-level functions combining parameters + codec

pub mod backend;
mod calculations;
pub mod operations;
mod params;
pub mod pixel;
pub mod resample;
pub mod rust_backend;
pub mod transform;

pub use backend::{CodecError, ImageCodec};
pub use calculations::calculate_fit_dimensions;
pub use operations::{OperationError, process_file};
pub use params::{Operation, ResizeParams};
pub use pixel::{Channels, Color, PixelBuffer, PixelError, PixelFormat, Resolution};
pub use resample::resize;
pub use rust_backend::RustBackend;
