//! Pure Rust codec backed by the `image` crate.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (PNG, JPEG, TIFF, WebP, BMP, ICO) | `image::ImageReader` with format sniffing |
//! | Encode | `image::DynamicImage::save_with_format`, format from the output extension |
//!
//! Decoded images with an alpha channel become [`PixelFormat::Bgra32`]
//! buffers; everything else becomes [`PixelFormat::Bgr24`].

use super::backend::{CodecError, ImageCodec};
use super::pixel::{PixelBuffer, PixelFormat};
use image::{DynamicImage, ImageFormat, ImageReader, RgbImage, RgbaImage};
use std::path::Path;

/// Extensions whose encoders and decoders are compiled in.
const FORMAT_CANDIDATES: &[(&str, ImageFormat)] = &[
    ("png", ImageFormat::Png),
    ("jpg", ImageFormat::Jpeg),
    ("jpeg", ImageFormat::Jpeg),
    ("tif", ImageFormat::Tiff),
    ("tiff", ImageFormat::Tiff),
    ("webp", ImageFormat::WebP),
    ("bmp", ImageFormat::Bmp),
    ("ico", ImageFormat::Ico),
];

/// Returns the output extensions this build can encode.
pub fn supported_output_extensions() -> Vec<&'static str> {
    FORMAT_CANDIDATES
        .iter()
        .filter(|(_, fmt)| fmt.writing_enabled())
        .map(|(ext, _)| *ext)
        .collect()
}

/// Codec using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn output_format(path: &Path) -> Result<ImageFormat, CodecError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    FORMAT_CANDIDATES
        .iter()
        .find(|(candidate, fmt)| *candidate == ext && fmt.writing_enabled())
        .map(|(_, fmt)| *fmt)
        .ok_or_else(|| {
            CodecError::UnsupportedFormat(if ext.is_empty() {
                format!("{} has no file extension", path.display())
            } else {
                ext
            })
        })
}

/// Copy a decoded image into a BGR(A) buffer.
fn to_pixel_buffer(img: DynamicImage) -> Result<PixelBuffer, CodecError> {
    let (width, height) = (img.width(), img.height());
    let format = if img.color().has_alpha() {
        PixelFormat::Bgra32
    } else {
        PixelFormat::Bgr24
    };
    let mut buffer = PixelBuffer::new(width, height, format).map_err(|e| CodecError::Decode {
        path: String::new(),
        message: e.to_string(),
    })?;

    match format {
        PixelFormat::Bgra32 => {
            let rgba = img.into_rgba8();
            for (y, src) in rgba.rows().enumerate() {
                let row = buffer.row_mut(y as u32);
                for (dst, px) in row.chunks_exact_mut(4).zip(src) {
                    let [r, g, b, a] = px.0;
                    dst.copy_from_slice(&[b, g, r, a]);
                }
            }
        }
        PixelFormat::Bgr24 => {
            let rgb = img.into_rgb8();
            for (y, src) in rgb.rows().enumerate() {
                let row = buffer.row_mut(y as u32);
                for (dst, px) in row.chunks_exact_mut(3).zip(src) {
                    let [r, g, b] = px.0;
                    dst.copy_from_slice(&[b, g, r]);
                }
            }
        }
    }
    Ok(buffer)
}

/// Copy a BGR(A) buffer into an `image` crate image, dropping row padding.
fn to_dynamic_image(buffer: &PixelBuffer) -> DynamicImage {
    let (width, height) = buffer.dimensions();
    match buffer.format() {
        PixelFormat::Bgra32 => DynamicImage::ImageRgba8(RgbaImage::from_fn(width, height, |x, y| {
            let i = x as usize * 4;
            let px = &buffer.row(y)[i..i + 4];
            image::Rgba([px[2], px[1], px[0], px[3]])
        })),
        PixelFormat::Bgr24 => DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
            let i = x as usize * 3;
            let px = &buffer.row(y)[i..i + 3];
            image::Rgb([px[2], px[1], px[0]])
        })),
    }
}

impl ImageCodec for RustBackend {
    fn decode(&self, path: &Path) -> Result<PixelBuffer, CodecError> {
        let img = ImageReader::open(path)?
            .with_guessed_format()?
            .decode()
            .map_err(|e| CodecError::Decode {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;
        to_pixel_buffer(img).map_err(|e| match e {
            CodecError::Decode { message, .. } => CodecError::Decode {
                path: path.display().to_string(),
                message,
            },
            other => other,
        })
    }

    fn encode(&self, buffer: &PixelBuffer, path: &Path) -> Result<(), CodecError> {
        let format = output_format(path)?;
        let mut img = to_dynamic_image(buffer);
        if format == ImageFormat::Jpeg && img.color().has_alpha() {
            img = DynamicImage::ImageRgb8(img.into_rgb8());
        }
        img.save_with_format(path, format)
            .map_err(|e| match e {
                image::ImageError::IoError(io) => CodecError::Io(io),
                other => CodecError::Encode {
                    path: path.display().to_string(),
                    message: other.to_string(),
                },
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::pixel::Color;
    use crate::test_helpers::{create_test_png, gradient_buffer};

    #[test]
    fn supported_extensions_include_common_icon_formats() {
        let exts = supported_output_extensions();
        for expected in &["png", "jpg", "bmp", "ico"] {
            assert!(exts.contains(expected), "expected {expected} in {exts:?}");
        }
    }

    #[test]
    fn decode_rgba_png_as_bgra() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("src.png");
        create_test_png(&path, 20, 10, true);

        let buf = RustBackend::new().decode(&path).unwrap();
        assert_eq!(buf.dimensions(), (20, 10));
        assert_eq!(buf.format(), PixelFormat::Bgra32);
    }

    #[test]
    fn decode_rgb_png_as_bgr() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("src.png");
        create_test_png(&path, 5, 3, false);

        let buf = RustBackend::new().decode(&path).unwrap();
        assert_eq!(buf.format(), PixelFormat::Bgr24);
        assert_eq!(buf.stride(), 16);
    }

    #[test]
    fn png_roundtrip_keeps_pixels() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("roundtrip.png");
        let original = gradient_buffer(7, 4, PixelFormat::Bgra32);

        let backend = RustBackend::new();
        backend.encode(&original, &path).unwrap();
        let decoded = backend.decode(&path).unwrap();

        for y in 0..4 {
            for x in 0..7 {
                assert_eq!(decoded.get(x, y).unwrap(), original.get(x, y).unwrap());
            }
        }
    }

    #[test]
    fn jpeg_output_drops_alpha() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("out.jpg");
        let buf = gradient_buffer(16, 16, PixelFormat::Bgra32);

        let backend = RustBackend::new();
        backend.encode(&buf, &path).unwrap();
        let decoded = backend.decode(&path).unwrap();
        assert_eq!(decoded.format(), PixelFormat::Bgr24);
        assert_eq!(decoded.get(0, 0).unwrap().a, 255);
    }

    #[test]
    fn decode_nonexistent_file_is_io_error() {
        let result = RustBackend::new().decode(Path::new("/nonexistent/icon.png"));
        assert!(matches!(result, Err(CodecError::Io(_))));
    }

    #[test]
    fn decode_garbage_is_decode_error() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("broken.png");
        std::fs::write(&path, b"definitely not a png").unwrap();

        let result = RustBackend::new().decode(&path);
        assert!(matches!(result, Err(CodecError::Decode { .. })));
    }

    #[test]
    fn encode_unknown_extension_errors() {
        let tmp = tempfile::TempDir::new().unwrap();
        let buf = PixelBuffer::new(2, 2, PixelFormat::Bgr24).unwrap();
        let backend = RustBackend::new();

        assert!(matches!(
            backend.encode(&buf, &tmp.path().join("icon.xyz")),
            Err(CodecError::UnsupportedFormat(ext)) if ext == "xyz"
        ));
        assert!(matches!(
            backend.encode(&buf, &tmp.path().join("icon")),
            Err(CodecError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn encode_overwrites_existing_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("icon.png");
        std::fs::write(&path, b"stale").unwrap();

        let mut buf = PixelBuffer::new(3, 3, PixelFormat::Bgr24).unwrap();
        buf.set(1, 1, Color::rgb(200, 100, 50)).unwrap();
        RustBackend::new().encode(&buf, &path).unwrap();

        let decoded = RustBackend::new().decode(&path).unwrap();
        assert_eq!(decoded.get(1, 1).unwrap(), Color::rgb(200, 100, 50));
    }
}
