//! 8-bit RGB resize reproducing OpenCV's `INTER_LINEAR`.
//!
//! OpenCV resizes 8-bit images in fixed point: 11-bit interpolation weights,
//! an integer horizontal pass and a vertical pass whose rounding depends on
//! whether the vectorized kernel handles the element. An exact 2x downscale
//! on both axes is routed to the 2x2 box average instead.

use image::RgbImage;

const CHANNELS: usize = 3;
const COEF_BITS: u32 = 11;
const COEF_SCALE: f32 = (1 << COEF_BITS) as f32;

/// Source columns and weights for one output column.
#[derive(Debug, Clone, Copy)]
struct ColumnTap {
    left: usize,
    right: usize,
    weights: [i32; 2],
}

/// Source rows and weights for one output row.
#[derive(Debug, Clone, Copy)]
struct RowTap {
    rows: [usize; 2],
    weights: [i32; 2],
}

/// Resizes `image` to `width` x `height`; both must be non-zero.
pub fn resize_linear(image: &RgbImage, width: u32, height: u32) -> RgbImage {
    let (src_w, src_h) = image.dimensions();
    if (src_w, src_h) == (width, height) {
        return image.clone();
    }
    if src_w == 2 * width && src_h == 2 * height {
        return halve(image, width, height);
    }

    let scale_x = 1.0 / (width as f64 / src_w as f64);
    let scale_y = 1.0 / (height as f64 / src_h as f64);
    let columns: Vec<ColumnTap> = (0..width)
        .map(|dx| column_tap(dx, scale_x, src_w as usize))
        .collect();

    let row_len = width as usize * CHANNELS;
    let vector_end = vector_prefix(row_len);
    let src = image.as_raw();
    let src_stride = src_w as usize * CHANNELS;

    let mut out = Vec::with_capacity(row_len * height as usize);
    let mut upper = vec![0i32; row_len];
    let mut lower = vec![0i32; row_len];
    for dy in 0..height {
        let tap = row_tap(dy, scale_y, src_h as usize);
        horizontal(&src[tap.rows[0] * src_stride..], &columns, &mut upper);
        horizontal(&src[tap.rows[1] * src_stride..], &columns, &mut lower);

        let [b0, b1] = tap.weights;
        out.extend(upper.iter().zip(&lower).enumerate().map(|(i, (&h0, &h1))| {
            if i < vector_end {
                vertical_vector(h0, h1, b0, b1)
            } else {
                vertical_scalar(h0, h1, b0, b1)
            }
        }));
    }

    // the buffer length is exactly width * height * 3
    RgbImage::from_raw(width, height, out).unwrap_or_else(|| RgbImage::new(width, height))
}

/// Exact 2x downscale: rounded mean of each 2x2 block.
fn halve(image: &RgbImage, width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        let (sx, sy) = (2 * x, 2 * y);
        let quad = [
            image.get_pixel(sx, sy),
            image.get_pixel(sx + 1, sy),
            image.get_pixel(sx, sy + 1),
            image.get_pixel(sx + 1, sy + 1),
        ];
        let mut pixel = [0u8; CHANNELS];
        for (c, value) in pixel.iter_mut().enumerate() {
            let sum: u32 = quad.iter().map(|p| p[c] as u32).sum();
            *value = ((sum + 2) >> 2) as u8;
        }
        image::Rgb(pixel)
    })
}

/// Source coordinate of an output index, split into its floor and fraction.
fn source_coord(d: u32, scale: f64) -> (i64, f32) {
    let f = ((d as f64 + 0.5) * scale - 0.5) as f32;
    let floor = f.floor();
    (floor as i64, f - floor)
}

fn weights(fraction: f32) -> [i32; 2] {
    [
        ((1.0 - fraction) * COEF_SCALE).round_ties_even() as i32,
        (fraction * COEF_SCALE).round_ties_even() as i32,
    ]
}

fn column_tap(dx: u32, scale: f64, src_w: usize) -> ColumnTap {
    let (mut sx, mut fx) = source_coord(dx, scale);
    let last = src_w as i64 - 1;
    if sx < 0 {
        sx = 0;
        fx = 0.0;
    }
    if sx >= last {
        sx = last;
        fx = 0.0;
    }
    let left = sx as usize;
    ColumnTap {
        left,
        right: (left + 1).min(src_w - 1),
        weights: weights(fx),
    }
}

/// Rows are clamped to the image but the fraction is kept as computed.
fn row_tap(dy: u32, scale: f64, src_h: usize) -> RowTap {
    let (sy, fy) = source_coord(dy, scale);
    let clamp = |row: i64| row.clamp(0, src_h as i64 - 1) as usize;
    RowTap {
        rows: [clamp(sy), clamp(sy + 1)],
        weights: weights(fy),
    }
}

fn horizontal(row: &[u8], columns: &[ColumnTap], out: &mut [i32]) {
    for (tap, dst) in columns.iter().zip(out.chunks_exact_mut(CHANNELS)) {
        let left = &row[tap.left * CHANNELS..];
        let right = &row[tap.right * CHANNELS..];
        for c in 0..CHANNELS {
            dst[c] = left[c] as i32 * tap.weights[0] + right[c] as i32 * tap.weights[1];
        }
    }
}

/// Number of leading row elements handled by the 16- and 8-lane kernels.
fn vector_prefix(row_len: usize) -> usize {
    let mut x = 0;
    while x + 16 <= row_len {
        x += 16;
    }
    while x + 8 < row_len {
        x += 8;
    }
    x
}

/// Vector kernel: inputs are pre-shifted by 4 and each product keeps its high half.
fn vertical_vector(h0: i32, h1: i32, b0: i32, b1: i32) -> u8 {
    let high = |h: i32, b: i32| ((h >> 4) * b) >> 16;
    ((high(h0, b0) + high(h1, b1) + 2) >> 2).clamp(0, 255) as u8
}

fn vertical_scalar(h0: i32, h1: i32, b0: i32, b1: i32) -> u8 {
    let shift = 2 * COEF_BITS;
    ((h0 * b0 + h1 * b1 + (1 << (shift - 1))) >> shift).clamp(0, 255) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn test_exact_halving_averages_blocks() {
        // period-4 stripes: every 2x2 block is uniform
        let img = RgbImage::from_fn(256, 256, |x, _| {
            let v = if x % 4 < 2 { 0 } else { 255 };
            Rgb([v, v, v])
        });

        let out = resize_linear(&img, 128, 128);

        let row: Vec<u8> = (0..8).map(|x| out.get_pixel(x, 64)[0]).collect();
        assert_eq!(row, [0, 255, 0, 255, 0, 255, 0, 255]);
    }

    #[test]
    fn test_halving_rounds_half_up() {
        let img = RgbImage::from_fn(4, 2, |x, y| Rgb([(x + 2 * y) as u8, 1, 3]));

        let out = resize_linear(&img, 2, 1);

        // (0 + 1 + 2 + 3 + 2) >> 2, (1 * 4 + 2) >> 2, (3 * 4 + 2) >> 2
        assert_eq!(out.get_pixel(0, 0), &Rgb([2, 1, 3]));
    }

    #[test]
    fn test_fractional_downscale_uses_fixed_point_weights() {
        let img = RgbImage::from_fn(300, 300, |x, y| {
            let v = (x % 256) as u8;
            Rgb([v, 255 - v, (7 * y % 256) as u8])
        });

        let out = resize_linear(&img, 128, 128);

        // the first column blends source 0 and 1 with weights 672 and 1376
        assert_eq!(out.get_pixel(0, 0), &Rgb([0, 254, 5]));
        assert_eq!(out.get_pixel(1, 0), &Rgb([3, 252, 5]));
        assert_eq!(out.get_pixel(5, 3), &Rgb([12, 243, 54]));
        assert_eq!(out.get_pixel(63, 10), &Rgb([148, 107, 169]));
        // across the wrap from 255 back to 0
        assert_eq!(out.get_pixel(108, 50), &Rgb([254, 1, 57]));
        assert_eq!(out.get_pixel(109, 50), &Rgb([0, 255, 57]));
        assert_eq!(out.get_pixel(110, 50), &Rgb([2, 253, 57]));
        assert_eq!(out.get_pixel(127, 127), &Rgb([42, 213, 40]));
    }

    #[test]
    fn test_upscale_clamps_to_the_border() {
        let img = RgbImage::from_fn(2, 1, |x, _| Rgb([if x == 0 { 10 } else { 200 }, 0, 0]));

        let out = resize_linear(&img, 4, 2);

        // outer columns fall outside the source and copy the edge pixel
        for y in 0..2 {
            let row: Vec<u8> = (0..4).map(|x| out.get_pixel(x, y)[0]).collect();
            assert_eq!(row, [10, 57, 152, 200]);
        }
    }

    #[test]
    fn test_vector_prefix_matches_lane_widths() {
        assert_eq!(vector_prefix(384), 384);
        assert_eq!(vector_prefix(8), 0);
        assert_eq!(vector_prefix(12), 8);
        assert_eq!(vector_prefix(27), 24);
        assert_eq!(vector_prefix(24), 16);
    }
}
