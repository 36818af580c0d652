//! Parameter types for single-image operations.
//!
//! These describe *what* to do to one decoded image, not how to read or write
//! it. The [`operations`](super::operations) module pairs them with a codec.
//!
//! ## Types
//!
//! - [`Operation`]: one of invert, masked invert, brightness adjust, or resize.
//! - [`ResizeParams`]: target size plus the aspect-ratio mode.

use super::pixel::{Channels, PixelBuffer, PixelError};
use super::{resample, transform};

/// Target for a resize.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizeParams {
    pub width: u32,
    pub height: u32,
    /// Treat `width` x `height` as a bounding box and keep the source aspect.
    pub preserve_aspect: bool,
}

/// A whole-image operation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Operation {
    /// Invert the color channels, alpha untouched.
    Invert,
    /// Invert only the given channels.
    InvertChannels(Channels),
    /// Scale the given channels by `scalar`, saturating at 0 and 255.
    Adjust { scalar: f64, channels: Channels },
    Resize(ResizeParams),
}

impl Operation {
    /// Run the operation, consuming the input buffer.
    ///
    /// Color operations work in place and hand the same buffer back; resize
    /// allocates a new one.
    pub fn run(&self, mut buffer: PixelBuffer) -> Result<PixelBuffer, PixelError> {
        match *self {
            Operation::Invert => transform::invert(&mut buffer, Channels::RGB),
            Operation::InvertChannels(channels) => transform::invert(&mut buffer, channels),
            Operation::Adjust { scalar, channels } => {
                transform::adjust(&mut buffer, scalar, channels)
            }
            Operation::Resize(params) => {
                return resample::resize(
                    &buffer,
                    params.width,
                    params.height,
                    params.preserve_aspect,
                );
            }
        }
        Ok(buffer)
    }

    /// Short label for logs and CLI output.
    pub fn describe(&self) -> String {
        match self {
            Operation::Invert => "invert".to_string(),
            Operation::InvertChannels(channels) => format!("invert [{channels}]"),
            Operation::Adjust { scalar, channels } => format!("adjust x{scalar} [{channels}]"),
            Operation::Resize(p) if p.preserve_aspect => {
                format!("resize to fit {}x{}", p.width, p.height)
            }
            Operation::Resize(p) => format!("resize to {}x{}", p.width, p.height),
        }
    }
}
