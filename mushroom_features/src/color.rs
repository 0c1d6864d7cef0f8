use image::{GrayImage, Luma, RgbImage};

const HSV_SHIFT: i32 = 12;
const GRAY_SHIFT: u32 = 14;

// 0.299, 0.587 and 0.114 in 14-bit fixed point.
const GRAY_R: u32 = 4899;
const GRAY_G: u32 = 9617;
const GRAY_B: u32 = 1868;

pub const HUE_RANGE: f64 = 180.0;
pub const CHANNEL_RANGE: f64 = 256.0;

/// Fixed-point reciprocal tables used by the 8-bit RGB to HSV conversion.
struct HsvTables {
    sdiv: [i32; 256],
    hdiv: [i32; 256],
}

impl HsvTables {
    fn new() -> Self {
        let mut sdiv = [0; 256];
        let mut hdiv = [0; 256];
        for i in 1..256 {
            sdiv[i] = ((255 << HSV_SHIFT) as f64 / i as f64).round_ties_even() as i32;
            hdiv[i] = ((180 << HSV_SHIFT) as f64 / (6.0 * i as f64)).round_ties_even() as i32;
        }
        Self { sdiv, hdiv }
    }

    fn convert(&self, r: u8, g: u8, b: u8) -> [u8; 3] {
        let (r, g, b) = (r as i32, g as i32, b as i32);
        let v = r.max(g).max(b);
        let diff = v - r.min(g).min(b);

        let s = (diff * self.sdiv[v as usize] + (1 << (HSV_SHIFT - 1))) >> HSV_SHIFT;

        let h = if v == r {
            g - b
        } else if v == g {
            b - r + 2 * diff
        } else {
            r - g + 4 * diff
        };
        let mut h = (h * self.hdiv[diff as usize] + (1 << (HSV_SHIFT - 1))) >> HSV_SHIFT;
        if h < 0 {
            h += HUE_RANGE as i32;
        }

        [h.clamp(0, 255) as u8, s.clamp(0, 255) as u8, v as u8]
    }
}

/// Converts a single RGB pixel to 8-bit HSV, hue in `[0, 180)`.
pub fn rgb_to_hsv(r: u8, g: u8, b: u8) -> [u8; 3] {
    HsvTables::new().convert(r, g, b)
}

/// Luma conversion with the BT.601 weights the training features were computed with.
pub fn to_grayscale(image: &RgbImage) -> GrayImage {
    let mut gray = GrayImage::new(image.width(), image.height());
    for (x, y, pixel) in image.enumerate_pixels() {
        let [r, g, b] = pixel.0;
        let luma = (r as u32 * GRAY_R + g as u32 * GRAY_G + b as u32 * GRAY_B
            + (1 << (GRAY_SHIFT - 1)))
            >> GRAY_SHIFT;
        gray.put_pixel(x, y, Luma([luma.min(255) as u8]));
    }
    gray
}

fn bin_index(value: u8, bins: usize, range: f64) -> Option<usize> {
    let idx = (value as f64 * bins as f64 / range).floor();
    if idx >= 0.0 && (idx as usize) < bins {
        Some(idx as usize)
    } else {
        None
    }
}

/// Joint hue/saturation/value histogram, L2-normalized and flattened hue-major.
pub fn hsv_histogram(image: &RgbImage, bins: [usize; 3]) -> Vec<f64> {
    let tables = HsvTables::new();
    let [h_bins, s_bins, v_bins] = bins;
    let mut counts = vec![0f32; h_bins * s_bins * v_bins];

    for pixel in image.pixels() {
        let [r, g, b] = pixel.0;
        let [h, s, v] = tables.convert(r, g, b);
        let (Some(hi), Some(si), Some(vi)) = (
            bin_index(h, h_bins, HUE_RANGE),
            bin_index(s, s_bins, CHANNEL_RANGE),
            bin_index(v, v_bins, CHANNEL_RANGE),
        ) else {
            continue;
        };
        counts[(hi * s_bins + si) * v_bins + vi] += 1.0;
    }

    let norm = counts
        .iter()
        .map(|&c| (c as f64) * (c as f64))
        .sum::<f64>()
        .sqrt();
    let scale = if norm > f64::EPSILON { 1.0 / norm } else { 0.0 };

    counts
        .into_iter()
        .map(|c| (c as f64 * scale) as f32 as f64)
        .collect()
}
