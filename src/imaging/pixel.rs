//! Raw pixel storage.
//!
//! A [`PixelBuffer`] owns a row-major byte buffer laid out the way Windows
//! bitmaps are: each pixel is stored as `B, G, R` or `B, G, R, A`, and each
//! row occupies `stride` bytes, which may include padding past the last pixel.
//!
//! ```text
//! row y, pixel x  →  bytes [y·stride + x·bpp, y·stride + x·bpp + bpp)
//! ```
//!
//! Buffers without an alpha channel read back with `a = 255`, and writes to
//! them drop whatever alpha was supplied.

use std::fmt;
use std::ops::{BitOr, BitOrAssign};
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PixelError {
    #[error("invalid dimensions {width}x{height}: both sides must be at least 1")]
    InvalidDimensions { width: u32, height: u32 },
    #[error("pixel ({x}, {y}) is outside the {width}x{height} buffer")]
    OutOfRange {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    },
    #[error("stride {stride} is smaller than one row of pixels ({row_bytes} bytes)")]
    InvalidStride { stride: usize, row_bytes: usize },
    #[error("buffer holds {actual} bytes, expected {expected}")]
    BufferSize { expected: usize, actual: usize },
    #[error("{width}x{height} exceeds the {max} pixel side limit")]
    TooLarge { width: u32, height: u32, max: u32 },
}

/// An ARGB color, one byte per channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub a: u8,
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn argb(a: u8, r: u8, g: u8, b: u8) -> Self {
        Self { a, r, g, b }
    }

    /// Opaque color.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::argb(255, r, g, b)
    }

    /// Applies `f` to all four channels.
    pub fn map_channels(self, f: impl Fn(u8) -> u8) -> Self {
        Self::argb(f(self.a), f(self.r), f(self.g), f(self.b))
    }

    /// Takes the channels in `mask` from `other`, the rest from `self`.
    pub fn merge(self, other: Color, mask: Channels) -> Self {
        let pick = |channel: Channels, ours: u8, theirs: u8| {
            if mask.contains(channel) { theirs } else { ours }
        };
        Self::argb(
            pick(Channels::A, self.a, other.a),
            pick(Channels::R, self.r, other.r),
            pick(Channels::G, self.g, other.g),
            pick(Channels::B, self.b, other.b),
        )
    }
}

/// A subset of `{A, R, G, B}`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Channels(u8);

impl Channels {
    pub const NONE: Channels = Channels(0);
    pub const A: Channels = Channels(0b0001);
    pub const R: Channels = Channels(0b0010);
    pub const G: Channels = Channels(0b0100);
    pub const B: Channels = Channels(0b1000);
    pub const RGB: Channels = Channels(0b1110);
    pub const ARGB: Channels = Channels(0b1111);

    pub fn contains(self, other: Channels) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for Channels {
    type Output = Channels;

    fn bitor(self, rhs: Channels) -> Channels {
        Channels(self.0 | rhs.0)
    }
}

impl BitOrAssign for Channels {
    fn bitor_assign(&mut self, rhs: Channels) {
        self.0 |= rhs.0;
    }
}

impl fmt::Debug for Channels {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Channels({self})")
    }
}

/// Lowercase letters in `argb` order, e.g. `rb`; `none` when empty.
impl fmt::Display for Channels {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("none");
        }
        for (flag, letter) in [
            (Channels::A, 'a'),
            (Channels::R, 'r'),
            (Channels::G, 'g'),
            (Channels::B, 'b'),
        ] {
            if self.contains(flag) {
                write!(f, "{letter}")?;
            }
        }
        Ok(())
    }
}

/// Parses a channel list such as `rgb`, `RB` or `argb`, in any order.
impl FromStr for Channels {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("none") {
            return Ok(Channels::NONE);
        }
        if s.is_empty() {
            return Err("channel list is empty".to_string());
        }
        let mut channels = Channels::NONE;
        for c in s.chars() {
            channels |= match c.to_ascii_lowercase() {
                'a' => Channels::A,
                'r' => Channels::R,
                'g' => Channels::G,
                'b' => Channels::B,
                other => return Err(format!("unknown channel '{other}' (expected a, r, g or b)")),
            };
        }
        Ok(channels)
    }
}

/// Byte layout of a single pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    /// `B, G, R`
    Bgr24,
    /// `B, G, R, A`
    Bgra32,
}

impl PixelFormat {
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            PixelFormat::Bgr24 => 3,
            PixelFormat::Bgra32 => 4,
        }
    }

    pub fn has_alpha(self) -> bool {
        matches!(self, PixelFormat::Bgra32)
    }
}

/// Horizontal and vertical resolution in dots per inch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolution {
    pub horizontal: f32,
    pub vertical: f32,
}

/// An owned, stride-aware pixel buffer.
///
/// Byte-level access is handed out through `&`/`&mut` borrows of the buffer,
/// so exclusive access for a transform lasts exactly as long as the call that
/// holds the mutable borrow.
#[derive(Clone, PartialEq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    stride: usize,
    format: PixelFormat,
    data: Vec<u8>,
    resolution: Option<Resolution>,
}

impl PixelBuffer {
    /// Allocates a zeroed buffer with rows padded to a multiple of 4 bytes.
    pub fn new(width: u32, height: u32, format: PixelFormat) -> Result<Self, PixelError> {
        check_dimensions(width, height)?;
        let stride = padded_stride(width, format);
        Ok(Self {
            width,
            height,
            stride,
            format,
            data: vec![0; stride * height as usize],
            resolution: None,
        })
    }

    /// Wraps existing bytes. `data` must be exactly `stride * height` long.
    pub fn from_raw(
        width: u32,
        height: u32,
        stride: usize,
        format: PixelFormat,
        data: Vec<u8>,
    ) -> Result<Self, PixelError> {
        check_dimensions(width, height)?;
        let row_bytes = width as usize * format.bytes_per_pixel();
        if stride < row_bytes {
            return Err(PixelError::InvalidStride { stride, row_bytes });
        }
        let expected = stride * height as usize;
        if data.len() != expected {
            return Err(PixelError::BufferSize {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            stride,
            format,
            data,
            resolution: None,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    pub fn bytes_per_pixel(&self) -> usize {
        self.format.bytes_per_pixel()
    }

    pub fn resolution(&self) -> Option<Resolution> {
        self.resolution
    }

    pub fn set_resolution(&mut self, resolution: Option<Resolution>) {
        self.resolution = resolution;
    }

    /// The whole backing store, padding included.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    /// Pixel bytes of row `y`, without trailing padding.
    ///
    /// Panics if `y >= height`.
    pub fn row(&self, y: u32) -> &[u8] {
        let start = y as usize * self.stride;
        &self.data[start..start + self.row_bytes()]
    }

    /// Mutable pixel bytes of row `y`, without trailing padding.
    ///
    /// Panics if `y >= height`.
    pub fn row_mut(&mut self, y: u32) -> &mut [u8] {
        let start = y as usize * self.stride;
        let len = self.row_bytes();
        &mut self.data[start..start + len]
    }

    /// Iterates rows top to bottom, padding stripped.
    pub fn rows_mut(&mut self) -> impl Iterator<Item = &mut [u8]> {
        let row_bytes = self.row_bytes();
        self.data
            .chunks_exact_mut(self.stride)
            .map(move |row| &mut row[..row_bytes])
    }

    pub fn get(&self, x: u32, y: u32) -> Result<Color, PixelError> {
        let i = self.offset(x, y)?;
        Ok(read_color(&self.data[i..i + self.bytes_per_pixel()]))
    }

    pub fn set(&mut self, x: u32, y: u32, color: Color) -> Result<(), PixelError> {
        let i = self.offset(x, y)?;
        let bpp = self.bytes_per_pixel();
        write_color(&mut self.data[i..i + bpp], color);
        Ok(())
    }

    fn row_bytes(&self) -> usize {
        self.width as usize * self.bytes_per_pixel()
    }

    fn offset(&self, x: u32, y: u32) -> Result<usize, PixelError> {
        if x >= self.width || y >= self.height {
            return Err(PixelError::OutOfRange {
                x,
                y,
                width: self.width,
                height: self.height,
            });
        }
        Ok(y as usize * self.stride + x as usize * self.bytes_per_pixel())
    }
}

impl fmt::Debug for PixelBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PixelBuffer")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("stride", &self.stride)
            .field("format", &self.format)
            .field("resolution", &self.resolution)
            .finish_non_exhaustive()
    }
}

/// Decodes one pixel from a 3- or 4-byte `B, G, R[, A]` slice.
pub(crate) fn read_color(px: &[u8]) -> Color {
    let a = if px.len() == 4 { px[3] } else { 255 };
    Color::argb(a, px[2], px[1], px[0])
}

/// Encodes one pixel; the alpha byte is only written for 4-byte slices.
pub(crate) fn write_color(px: &mut [u8], color: Color) {
    px[0] = color.b;
    px[1] = color.g;
    px[2] = color.r;
    if px.len() == 4 {
        px[3] = color.a;
    }
}

pub(crate) fn check_dimensions(width: u32, height: u32) -> Result<(), PixelError> {
    if width == 0 || height == 0 {
        return Err(PixelError::InvalidDimensions { width, height });
    }
    Ok(())
}

fn padded_stride(width: u32, format: PixelFormat) -> usize {
    let row_bytes = width as usize * format.bytes_per_pixel();
    (row_bytes + 3) & !3
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rgb_rows_are_padded_to_four_bytes() {
        let buf = PixelBuffer::new(5, 2, PixelFormat::Bgr24).unwrap();
        assert_eq!(buf.stride(), 16);
        assert_eq!(buf.as_bytes().len(), 32);
        assert_eq!(buf.row(1).len(), 15);
    }

    #[test]
    fn bgra_rows_need_no_padding() {
        let buf = PixelBuffer::new(5, 2, PixelFormat::Bgra32).unwrap();
        assert_eq!(buf.stride(), 20);
    }

    #[test]
    fn zero_dimensions_are_rejected() {
        assert_eq!(
            PixelBuffer::new(0, 4, PixelFormat::Bgra32).unwrap_err(),
            PixelError::InvalidDimensions {
                width: 0,
                height: 4
            }
        );
        assert!(PixelBuffer::new(4, 0, PixelFormat::Bgr24).is_err());
    }

    #[test]
    fn set_then_get_bgra() {
        let mut buf = PixelBuffer::new(3, 3, PixelFormat::Bgra32).unwrap();
        let c = Color::argb(128, 10, 20, 30);
        buf.set(2, 1, c).unwrap();
        assert_eq!(buf.get(2, 1).unwrap(), c);
        // Byte order inside the pixel is B, G, R, A
        let i = buf.stride() + 2 * 4;
        assert_eq!(&buf.as_bytes()[i..i + 4], &[30, 20, 10, 128]);
    }

    #[test]
    fn bgr_reads_opaque_and_drops_alpha_on_write() {
        let mut buf = PixelBuffer::new(2, 2, PixelFormat::Bgr24).unwrap();
        buf.set(1, 1, Color::argb(7, 1, 2, 3)).unwrap();
        assert_eq!(buf.get(1, 1).unwrap(), Color::argb(255, 1, 2, 3));
    }

    #[test]
    fn out_of_range_access_fails() {
        let mut buf = PixelBuffer::new(4, 3, PixelFormat::Bgr24).unwrap();
        assert!(matches!(
            buf.get(4, 0),
            Err(PixelError::OutOfRange { x: 4, y: 0, .. })
        ));
        assert!(matches!(
            buf.set(0, 3, Color::rgb(0, 0, 0)),
            Err(PixelError::OutOfRange { x: 0, y: 3, .. })
        ));
    }

    #[test]
    fn from_raw_honours_custom_stride() {
        // 2x2 BGR with 8-byte rows (2 bytes of padding each)
        let data = vec![
            1, 2, 3, 4, 5, 6, 0xEE, 0xEE, //
            7, 8, 9, 10, 11, 12, 0xEE, 0xEE,
        ];
        let buf = PixelBuffer::from_raw(2, 2, 8, PixelFormat::Bgr24, data).unwrap();
        assert_eq!(buf.get(1, 0).unwrap(), Color::rgb(6, 5, 4));
        assert_eq!(buf.get(0, 1).unwrap(), Color::rgb(9, 8, 7));
        assert_eq!(buf.row(1), &[7, 8, 9, 10, 11, 12]);
    }

    #[test]
    fn from_raw_validates_layout() {
        assert!(matches!(
            PixelBuffer::from_raw(4, 1, 8, PixelFormat::Bgr24, vec![0; 8]),
            Err(PixelError::InvalidStride {
                stride: 8,
                row_bytes: 12
            })
        ));
        assert!(matches!(
            PixelBuffer::from_raw(2, 2, 8, PixelFormat::Bgra32, vec![0; 15]),
            Err(PixelError::BufferSize {
                expected: 16,
                actual: 15
            })
        ));
    }

    #[test]
    fn rows_mut_skips_padding() {
        let mut buf = PixelBuffer::new(1, 3, PixelFormat::Bgr24).unwrap();
        for row in buf.rows_mut() {
            row.fill(9);
        }
        for y in 0..3 {
            let start = y * buf.stride();
            assert_eq!(&buf.as_bytes()[start..start + 3], &[9, 9, 9]);
            assert_eq!(buf.as_bytes()[start + 3], 0);
        }
    }

    #[test]
    fn channels_parse_and_display() {
        let rb: Channels = "rb".parse().unwrap();
        assert_eq!(rb, Channels::R | Channels::B);
        assert_eq!(rb.to_string(), "rb");
        assert_eq!("BGRA".parse::<Channels>().unwrap(), Channels::ARGB);
        assert_eq!("none".parse::<Channels>().unwrap(), Channels::NONE);
        assert!("rx".parse::<Channels>().is_err());
        assert!("".parse::<Channels>().is_err());
    }

    #[test]
    fn merge_takes_only_masked_channels() {
        let base = Color::argb(1, 2, 3, 4);
        let other = Color::argb(10, 20, 30, 40);
        assert_eq!(base.merge(other, Channels::R), Color::argb(1, 20, 3, 4));
        assert_eq!(base.merge(other, Channels::ARGB), other);
        assert_eq!(base.merge(other, Channels::NONE), base);
    }
}
