//! Bicubic resampling.
//!
//! Separable two-pass convolution (horizontal, then vertical) with the
//! Catmull-Rom cubic kernel. When shrinking, the kernel is stretched by the
//! scale factor so every source pixel under a destination pixel contributes,
//! which gives area-weighted averaging instead of aliasing.
//!
//! Edge policy is clamping: a tap that lands outside the source reads the
//! nearest edge pixel. It never wraps or mirrors.
//!
//! For 4-byte buffers the color channels are premultiplied by alpha while
//! filtering, so transparent pixels do not bleed their color into neighbours.
//!
//! Everything runs in a fixed order on `f32`, so the same input always
//! produces the same bytes.

use super::calculations::{calculate_fit_dimensions, scale_ratio};
use super::pixel::{PixelBuffer, PixelError, check_dimensions};

/// Half-width of the Catmull-Rom kernel at scale 1.
const KERNEL_RADIUS: f64 = 2.0;

/// Largest side a resize will produce.
pub const MAX_TARGET_SIDE: u32 = 8192;

/// Resize `source` to `width` x `height`.
///
/// With `preserve_aspect`, the requested size is treated as a bounding box and
/// the output is the largest same-aspect size that fits it (see
/// [`calculate_fit_dimensions`]), so one side may come out smaller than asked.
///
/// The result has the source's pixel format and resolution. A requested side
/// above [`MAX_TARGET_SIDE`] is rejected before anything is allocated.
pub fn resize(
    source: &PixelBuffer,
    width: u32,
    height: u32,
    preserve_aspect: bool,
) -> Result<PixelBuffer, PixelError> {
    check_dimensions(width, height)?;
    if width > MAX_TARGET_SIDE || height > MAX_TARGET_SIDE {
        return Err(PixelError::TooLarge {
            width,
            height,
            max: MAX_TARGET_SIDE,
        });
    }

    let (width, height) = if preserve_aspect {
        calculate_fit_dimensions(source.dimensions(), (width, height))
    } else {
        (width, height)
    };

    let format = source.format();
    let channels = format.bytes_per_pixel();
    let premultiply = format.has_alpha();

    let planes = to_float(source, premultiply);
    let horizontal = contributions(source.width(), width);
    let vertical = contributions(source.height(), height);

    // Pass 1: width changes, height stays at the source's.
    let src_w = source.width() as usize;
    let mut wide = vec![0f32; width as usize * source.height() as usize * channels];
    for y in 0..source.height() as usize {
        let src_row = &planes[y * src_w * channels..(y + 1) * src_w * channels];
        let dst_row = &mut wide[y * width as usize * channels..(y + 1) * width as usize * channels];
        for (x, taps) in horizontal.iter().enumerate() {
            let out = &mut dst_row[x * channels..(x + 1) * channels];
            for &(sx, weight) in taps {
                let px = &src_row[sx * channels..(sx + 1) * channels];
                for c in 0..channels {
                    out[c] += px[c] * weight;
                }
            }
        }
    }

    // Pass 2: height changes.
    let row_len = width as usize * channels;
    let mut result = PixelBuffer::new(width, height, format)?;
    let mut acc = vec![0f32; row_len];
    for (y, taps) in vertical.iter().enumerate() {
        acc.fill(0.0);
        for &(sy, weight) in taps {
            let src_row = &wide[sy * row_len..(sy + 1) * row_len];
            for (a, s) in acc.iter_mut().zip(src_row) {
                *a += s * weight;
            }
        }
        store_row(&acc, result.row_mut(y as u32), channels, premultiply);
    }

    result.set_resolution(source.resolution());
    Ok(result)
}

/// Catmull-Rom cubic (B = 0, C = 0.5).
fn cubic(x: f64) -> f64 {
    let x = x.abs();
    if x < 1.0 {
        1.5 * x * x * x - 2.5 * x * x + 1.0
    } else if x < 2.0 {
        -0.5 * x * x * x + 2.5 * x * x - 4.0 * x + 2.0
    } else {
        0.0
    }
}

/// For each destination index, the clamped source indices and normalised
/// weights that feed it.
fn contributions(source_len: u32, target_len: u32) -> Vec<Vec<(usize, f32)>> {
    let scale = scale_ratio(source_len, target_len);
    let filter_scale = scale.max(1.0);
    let support = KERNEL_RADIUS * filter_scale;
    let last = source_len as i64 - 1;

    (0..target_len)
        .map(|i| {
            let center = (i as f64 + 0.5) * scale - 0.5;
            let left = (center - support).ceil() as i64;
            let right = (center + support).floor() as i64;

            let mut taps: Vec<(usize, f64)> = Vec::with_capacity((right - left + 1) as usize);
            let mut total = 0.0;
            for j in left..=right {
                let weight = cubic((j as f64 - center) / filter_scale);
                if weight == 0.0 {
                    continue;
                }
                total += weight;
                taps.push((j.clamp(0, last) as usize, weight));
            }

            if total == 0.0 {
                // Only reachable through degenerate float input; take the nearest pixel.
                let nearest = center.round().clamp(0.0, last as f64) as usize;
                return vec![(nearest, 1.0)];
            }
            taps.into_iter()
                .map(|(index, weight)| (index, (weight / total) as f32))
                .collect()
        })
        .collect()
}

/// Unpacks `B, G, R[, A]` rows into a dense `f32` array, dropping stride padding.
fn to_float(source: &PixelBuffer, premultiply: bool) -> Vec<f32> {
    let channels = source.bytes_per_pixel();
    let mut out = Vec::with_capacity(source.width() as usize * source.height() as usize * channels);
    for y in 0..source.height() {
        for px in source.row(y).chunks_exact(channels) {
            if premultiply {
                let alpha = f32::from(px[3]) / 255.0;
                out.extend_from_slice(&[
                    f32::from(px[0]) * alpha,
                    f32::from(px[1]) * alpha,
                    f32::from(px[2]) * alpha,
                    f32::from(px[3]),
                ]);
            } else {
                out.extend(px.iter().map(|&v| f32::from(v)));
            }
        }
    }
    out
}

fn store_row(acc: &[f32], row: &mut [u8], channels: usize, premultiplied: bool) {
    for (src, dst) in acc.chunks_exact(channels).zip(row.chunks_exact_mut(channels)) {
        if premultiplied {
            let alpha = src[3].round().clamp(0.0, 255.0);
            dst[3] = alpha as u8;
            if alpha == 0.0 {
                dst[..3].fill(0);
            } else {
                let unpremultiply = 255.0 / alpha;
                for c in 0..3 {
                    dst[c] = to_byte(src[c] * unpremultiply);
                }
            }
        } else {
            for (d, &s) in dst.iter_mut().zip(src) {
                *d = to_byte(s);
            }
        }
    }
}

fn to_byte(v: f32) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}
