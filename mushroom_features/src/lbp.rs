use image::GrayImage;
use std::f64::consts::PI;

const HISTOGRAM_EPS: f64 = 1e-7;

fn round5(v: f64) -> f64 {
    (v * 1e5).round() / 1e5
}

/// Bilinear sample where everything outside the image reads as zero.
fn bilinear(pixels: &[f64], rows: usize, cols: usize, r: f64, c: f64) -> f64 {
    let get = |rr: f64, cc: f64| {
        if rr < 0.0 || cc < 0.0 || rr >= rows as f64 || cc >= cols as f64 {
            0.0
        } else {
            pixels[rr as usize * cols + cc as usize]
        }
    };
    let (min_r, max_r) = (r.floor(), r.ceil());
    let (min_c, max_c) = (c.floor(), c.ceil());
    let dr = r - min_r;
    let dc = c - min_c;
    let top = (1.0 - dc) * get(min_r, min_c) + dc * get(min_r, max_c);
    let bottom = (1.0 - dc) * get(max_r, min_c) + dc * get(max_r, max_c);
    (1.0 - dr) * top + dr * bottom
}

/// Rotation-invariant uniform LBP codes, row-major, each in `0..=points + 1`.
///
/// Uniform patterns (at most two bit transitions along the sampled arc) map to
/// their number of set bits; every other pattern maps to `points + 1`.
pub fn uniform_lbp(gray: &GrayImage, points: usize, radius: f64) -> Vec<u8> {
    let (rows, cols) = (gray.height() as usize, gray.width() as usize);
    let pixels: Vec<f64> = gray.pixels().map(|p| p.0[0] as f64).collect();

    let offsets: Vec<(f64, f64)> = (0..points)
        .map(|p| {
            let theta = 2.0 * PI * p as f64 / points as f64;
            (round5(-radius * theta.sin()), round5(radius * theta.cos()))
        })
        .collect();

    let mut codes = Vec::with_capacity(rows * cols);
    let mut bits = vec![false; points];
    for r in 0..rows {
        for c in 0..cols {
            let center = pixels[r * cols + c];
            for (bit, (dr, dc)) in bits.iter_mut().zip(&offsets) {
                let sample = bilinear(&pixels, rows, cols, r as f64 + dr, c as f64 + dc);
                *bit = sample - center >= 0.0;
            }
            let transitions = bits.windows(2).filter(|w| w[0] != w[1]).count();
            let code = if transitions <= 2 {
                bits.iter().filter(|&&b| b).count()
            } else {
                points + 1
            };
            codes.push(code as u8);
        }
    }
    codes
}

/// Uniform codes `0..=points` plus one bin for every non-uniform pattern.
pub fn histogram_len(points: usize) -> usize {
    points + 2
}

/// Histogram of uniform LBP codes over [`histogram_len`] bins, normalized to sum to one.
pub fn lbp_histogram(gray: &GrayImage, points: usize, radius: f64) -> Vec<f64> {
    let mut hist = vec![0f64; histogram_len(points)];
    for code in uniform_lbp(gray, points, radius) {
        hist[code as usize] += 1.0;
    }
    let total: f64 = hist.iter().sum();
    hist.iter_mut().for_each(|v| *v /= total + HISTOGRAM_EPS);
    hist
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    #[test]
    fn test_sample_offsets_at_radius_one() {
        let theta = 2.0 * PI * 4.0 / 8.0;
        assert_eq!(round5(-theta.sin()), 0.0);
        assert_eq!(round5(theta.cos()), -1.0);
        assert_eq!(round5((PI / 4.0).cos()), 0.70711);
    }

    #[test]
    fn test_black_image_is_all_flat_patterns() {
        let gray = GrayImage::new(16, 16);
        let codes = uniform_lbp(&gray, 8, 1.0);

        assert!(codes.iter().all(|&c| c == 8));

        let hist = lbp_histogram(&gray, 8, 1.0);
        assert_eq!(hist.len(), 10);
        assert!((hist[8] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_bright_spot_is_a_local_maximum() {
        let mut gray = GrayImage::from_pixel(5, 5, Luma([10]));
        gray.put_pixel(2, 2, Luma([200]));
        let codes = uniform_lbp(&gray, 8, 1.0);

        // no neighbour reaches the spot: zero bits set
        assert_eq!(codes[2 * 5 + 2], 0);
    }

    #[test]
    fn test_codes_stay_in_range_and_histogram_sums_to_one() {
        let gray = GrayImage::from_fn(40, 30, |x, y| Luma([((x * 31 + y * 17) % 251) as u8]));
        let codes = uniform_lbp(&gray, 8, 1.0);

        assert_eq!(codes.len(), 40 * 30);
        assert!(codes.iter().all(|&c| c <= 9));

        let hist = lbp_histogram(&gray, 8, 1.0);
        assert!((hist.iter().sum::<f64>() - 1.0).abs() < 1e-6);
    }
}
