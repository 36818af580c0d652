//! Image codec trait and shared types.
//!
//! The [`ImageCodec`] trait is the boundary between the pixel engine and file
//! formats: it turns a path into a [`PixelBuffer`] and back. Everything above
//! it (transforms, resampling, export orchestration) only ever sees buffers.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), built on the `image`
//! crate. Tests use a recording mock.

use super::pixel::PixelBuffer;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CodecError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to decode {path}: {message}")]
    Decode { path: String, message: String },
    #[error("Failed to encode {path}: {message}")]
    Encode { path: String, message: String },
    #[error("Unsupported image format: {0}")]
    UnsupportedFormat(String),
}

/// Trait for image codecs.
///
/// Implementations must be `Sync`: the exporter shares one codec across its
/// worker threads.
pub trait ImageCodec: Sync {
    /// Read and decode an image file.
    fn decode(&self, path: &Path) -> Result<PixelBuffer, CodecError>;

    /// Encode `buffer` into the format implied by `path`'s extension,
    /// replacing any existing file.
    fn encode(&self, buffer: &PixelBuffer, path: &Path) -> Result<(), CodecError>;
}
