use image::GrayImage;
use ndarray::Array2;
use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

pub const GLCM_LEVELS: usize = 256;

pub const GLCM_ANGLES: [f64; 4] = [0.0, FRAC_PI_4, FRAC_PI_2, 3.0 * FRAC_PI_4];

/// Number of properties emitted by [`texture_properties`].
pub const GLCM_PROPERTIES: usize = 6;

/// Symmetric, normalized gray-level co-occurrence matrix for one offset.
///
/// The pixel pair is `(r, c)` and `(r + round(sin(angle) * d), c + round(cos(angle) * d))`;
/// pairs falling outside the image are ignored.
pub fn co_occurrence(gray: &GrayImage, distance: u32, angle: f64) -> Array2<f64> {
    let rows = gray.height() as i64;
    let cols = gray.width() as i64;
    let offset_row = (angle.sin() * distance as f64).round() as i64;
    let offset_col = (angle.cos() * distance as f64).round() as i64;

    let mut counts = Array2::<f64>::zeros((GLCM_LEVELS, GLCM_LEVELS));
    for r in 0..rows {
        let row = r + offset_row;
        if row < 0 || row >= rows {
            continue;
        }
        for c in 0..cols {
            let col = c + offset_col;
            if col < 0 || col >= cols {
                continue;
            }
            let i = gray.get_pixel(c as u32, r as u32).0[0] as usize;
            let j = gray.get_pixel(col as u32, row as u32).0[0] as usize;
            counts[[i, j]] += 1.0;
        }
    }

    let mut matrix = &counts + &counts.t();
    let total = matrix.sum();
    if total > 0.0 {
        matrix /= total;
    }
    matrix
}

/// Contrast, dissimilarity, homogeneity, energy, correlation and ASM of one matrix.
fn properties(p: &Array2<f64>) -> [f64; GLCM_PROPERTIES] {
    let mut contrast = 0.0;
    let mut dissimilarity = 0.0;
    let mut homogeneity = 0.0;
    let mut asm = 0.0;
    let mut mean_i = 0.0;
    let mut mean_j = 0.0;

    for ((i, j), &v) in p.indexed_iter() {
        if v == 0.0 {
            continue;
        }
        let d = i as f64 - j as f64;
        contrast += v * d * d;
        dissimilarity += v * d.abs();
        homogeneity += v / (1.0 + d * d);
        asm += v * v;
        mean_i += v * i as f64;
        mean_j += v * j as f64;
    }

    let mut var_i = 0.0;
    let mut var_j = 0.0;
    let mut cov = 0.0;
    for ((i, j), &v) in p.indexed_iter() {
        if v == 0.0 {
            continue;
        }
        let di = i as f64 - mean_i;
        let dj = j as f64 - mean_j;
        var_i += v * di * di;
        var_j += v * dj * dj;
        cov += v * di * dj;
    }
    let (std_i, std_j) = (var_i.sqrt(), var_j.sqrt());
    // A constant marginal has no defined correlation; it counts as perfect.
    let correlation = if std_i < 1e-15 || std_j < 1e-15 {
        1.0
    } else {
        cov / (std_i * std_j)
    };

    [
        contrast,
        dissimilarity,
        homogeneity,
        asm.sqrt(),
        correlation,
        asm,
    ]
}

/// GLCM texture statistics averaged over [`GLCM_ANGLES`].
pub fn texture_properties(gray: &GrayImage, distance: u32) -> [f64; GLCM_PROPERTIES] {
    let mut sums = [0.0; GLCM_PROPERTIES];
    for angle in GLCM_ANGLES {
        let props = properties(&co_occurrence(gray, distance, angle));
        for (sum, value) in sums.iter_mut().zip(props) {
            *sum += value;
        }
    }
    sums.map(|s| s / GLCM_ANGLES.len() as f64)
}
