//! Shared test utilities for the icolib test suite.
//!
//! Buffer builders for the pixel engine and a PNG fixture writer for tests
//! that go through the real codec.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let src = gradient_buffer(16, 16, PixelFormat::Bgra32);
//! let black = solid_buffer(4, 4, PixelFormat::Bgr24, Color::rgb(0, 0, 0));
//! create_test_png(&tmp.path().join("logo.png"), 64, 64, true);
//! ```

use crate::imaging::{Color, PixelBuffer, PixelFormat};
use std::path::Path;

// =========================================================================
// Buffer builders
// =========================================================================

/// Pixel at `(x, y)` of the gradient fixture. Alpha is never zero, so
/// premultiplied filtering round-trips exactly.
pub fn gradient_color(x: u32, y: u32) -> Color {
    Color::argb(
        (255 - (x * 7 + y * 3) % 200) as u8,
        ((x * 255) / 31 % 256) as u8,
        ((y * 255) / 31 % 256) as u8,
        ((x * 13 + y * 29) % 256) as u8,
    )
}

/// A buffer where every pixel differs from its neighbours.
///
/// Built with [`PixelBuffer::new`], so row padding stays zero. For BGR
/// buffers the alpha of [`gradient_color`] is dropped.
pub fn gradient_buffer(width: u32, height: u32, format: PixelFormat) -> PixelBuffer {
    let mut buf = PixelBuffer::new(width, height, format).unwrap();
    for y in 0..height {
        for x in 0..width {
            buf.set(x, y, gradient_color(x, y)).unwrap();
        }
    }
    buf
}

pub fn solid_buffer(width: u32, height: u32, format: PixelFormat, color: Color) -> PixelBuffer {
    let mut buf = PixelBuffer::new(width, height, format).unwrap();
    for y in 0..height {
        for x in 0..width {
            buf.set(x, y, color).unwrap();
        }
    }
    buf
}

// =========================================================================
// File fixtures
// =========================================================================

/// Write a `width` x `height` gradient PNG, RGBA when `alpha` is set.
pub fn create_test_png(path: &Path, width: u32, height: u32, alpha: bool) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    if alpha {
        let img = image::RgbaImage::from_fn(width, height, |x, y| {
            let c = gradient_color(x, y);
            image::Rgba([c.r, c.g, c.b, c.a])
        });
        img.save(path).unwrap();
    } else {
        let img = image::RgbImage::from_fn(width, height, |x, y| {
            let c = gradient_color(x, y);
            image::Rgb([c.r, c.g, c.b])
        });
        img.save(path).unwrap();
    }
}
