//! Whole-image color transforms.
//!
//! [`apply`] is the single primitive: it maps every pixel through a closure and
//! writes back only the channels named in the mask. [`invert`] and [`adjust`]
//! are the built-in mappings on top of it.

use super::pixel::{Channels, Color, PixelBuffer, read_color, write_color};

/// Maps every pixel in row-major order, keeping unmasked channels as they were.
///
/// Works in place: the buffer is never resized or reallocated. On 3-byte
/// buffers alpha reads as 255 and is never written, whatever the mask says.
pub fn apply(buffer: &mut PixelBuffer, mapping: impl Fn(Color) -> Color, mask: Channels) {
    if mask.is_empty() {
        return;
    }
    let bpp = buffer.bytes_per_pixel();
    for row in buffer.rows_mut() {
        for px in row.chunks_exact_mut(bpp) {
            let current = read_color(px);
            write_color(px, current.merge(mapping(current), mask));
        }
    }
}

/// `channel → 255 - channel` on the masked channels.
pub fn invert(buffer: &mut PixelBuffer, mask: Channels) {
    apply(buffer, |c| c.map_channels(|v| 255 - v), mask);
}

/// `channel → clamp(round(scalar × channel), 0, 255)` on the masked channels.
pub fn adjust(buffer: &mut PixelBuffer, scalar: f64, mask: Channels) {
    apply(
        buffer,
        |c| c.map_channels(|v| clamp_channel(scalar * f64::from(v))),
        mask,
    );
}

/// Rounds to the nearest integer and saturates into `0..=255`.
///
/// NaN maps to 0.
pub fn clamp_channel(value: f64) -> u8 {
    if value.is_nan() {
        return 0;
    }
    value.round().clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::pixel::PixelFormat;
    use crate::test_helpers::gradient_buffer;

    fn single(format: PixelFormat, color: Color) -> PixelBuffer {
        let mut buf = PixelBuffer::new(1, 1, format).unwrap();
        buf.set(0, 0, color).unwrap();
        buf
    }

    #[test]
    fn invert_red_only() {
        let mut buf = single(PixelFormat::Bgra32, Color::argb(255, 10, 20, 30));
        invert(&mut buf, Channels::R);
        assert_eq!(buf.get(0, 0).unwrap(), Color::argb(255, 245, 20, 30));
    }

    #[test]
    fn invert_rgb_preserves_alpha() {
        let mut buf = single(PixelFormat::Bgra32, Color::argb(40, 0, 100, 255));
        invert(&mut buf, Channels::RGB);
        assert_eq!(buf.get(0, 0).unwrap(), Color::argb(40, 255, 155, 0));
    }

    #[test]
    fn invert_twice_restores_every_byte() {
        for format in [PixelFormat::Bgr24, PixelFormat::Bgra32] {
            let original = gradient_buffer(7, 5, format);
            let mut buf = original.clone();
            invert(&mut buf, Channels::RGB);
            assert_ne!(buf, original);
            invert(&mut buf, Channels::RGB);
            assert_eq!(buf, original);
        }
    }

    #[test]
    fn invert_leaves_row_padding_alone() {
        // 3 BGR pixels = 9 bytes, padded to 12
        let mut buf = gradient_buffer(3, 2, PixelFormat::Bgr24);
        let padding_before: Vec<u8> = (0..2)
            .flat_map(|y| buf.as_bytes()[y * 12 + 9..y * 12 + 12].to_vec())
            .collect();
        invert(&mut buf, Channels::ARGB);
        let padding_after: Vec<u8> = (0..2)
            .flat_map(|y| buf.as_bytes()[y * 12 + 9..y * 12 + 12].to_vec())
            .collect();
        assert_eq!(padding_before, padding_after);
    }

    #[test]
    fn adjust_doubles_and_saturates() {
        let mut buf = single(PixelFormat::Bgra32, Color::argb(255, 10, 200, 250));
        adjust(&mut buf, 2.0, Channels::RGB);
        assert_eq!(buf.get(0, 0).unwrap(), Color::argb(255, 20, 255, 255));
    }

    #[test]
    fn adjust_halves_with_rounding() {
        let mut buf = single(PixelFormat::Bgr24, Color::rgb(3, 100, 255));
        adjust(&mut buf, 0.5, Channels::RGB);
        // 1.5 → 2, 50 → 50, 127.5 → 128
        assert_eq!(buf.get(0, 0).unwrap(), Color::rgb(2, 50, 128));
    }

    #[test]
    fn adjust_all_channels_touches_alpha() {
        let mut buf = single(PixelFormat::Bgra32, Color::argb(100, 10, 10, 10));
        adjust(&mut buf, 2.0, Channels::ARGB);
        assert_eq!(buf.get(0, 0).unwrap(), Color::argb(200, 20, 20, 20));
    }

    #[test]
    fn alpha_mask_on_rgb_buffer_is_a_no_op() {
        let original = gradient_buffer(4, 4, PixelFormat::Bgr24);
        let mut buf = original.clone();
        invert(&mut buf, Channels::A);
        assert_eq!(buf, original);
    }

    #[test]
    fn apply_visits_pixels_in_row_major_order() {
        let mut buf = PixelBuffer::new(3, 2, PixelFormat::Bgr24).unwrap();
        let counter = std::cell::Cell::new(0u8);
        apply(
            &mut buf,
            |c| {
                let n = counter.get();
                counter.set(n + 1);
                Color { r: n, ..c }
            },
            Channels::R,
        );
        let reds: Vec<u8> = (0..2)
            .flat_map(|y| (0..3).map(move |x| (x, y)))
            .map(|(x, y)| buf.get(x, y).unwrap().r)
            .collect();
        assert_eq!(reds, vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn clamp_channel_edges() {
        assert_eq!(clamp_channel(-4.0), 0);
        assert_eq!(clamp_channel(255.4), 255);
        assert_eq!(clamp_channel(1e9), 255);
        assert_eq!(clamp_channel(f64::NAN), 0);
        assert_eq!(clamp_channel(0.5), 1);
    }
}
