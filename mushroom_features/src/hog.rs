use crate::error::FeatureError;
use image::GrayImage;
use ndarray::{s, Array2, Array3};

const L2_HYS_EPS: f64 = 1e-5;
const L2_HYS_CLIP: f64 = 0.2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HogParams {
    pub orientations: usize,
    /// Cell edge in pixels.
    pub cell_size: u32,
    /// Block edge in cells.
    pub block_size: usize,
}

impl Default for HogParams {
    fn default() -> Self {
        Self {
            orientations: 9,
            cell_size: 16,
            block_size: 2,
        }
    }
}

impl HogParams {
    fn cells(&self, width: u32, height: u32) -> (usize, usize) {
        (
            (height / self.cell_size) as usize,
            (width / self.cell_size) as usize,
        )
    }

    /// Descriptor length for an image of the given size, `None` when no block fits.
    pub fn descriptor_len(&self, width: u32, height: u32) -> Option<usize> {
        if self.orientations == 0 || self.cell_size == 0 || self.block_size == 0 {
            return None;
        }
        let (cells_row, cells_col) = self.cells(width, height);
        if cells_row < self.block_size || cells_col < self.block_size {
            return None;
        }
        let blocks_row = cells_row - self.block_size + 1;
        let blocks_col = cells_col - self.block_size + 1;
        Some(blocks_row * blocks_col * self.block_size * self.block_size * self.orientations)
    }
}

/// Gradient magnitude and unsigned orientation in degrees, `[0, 180)`.
///
/// Central differences; the outermost rows and columns get a zero gradient
/// along the axis they bound.
fn gradients(gray: &GrayImage) -> (Array2<f64>, Array2<f64>) {
    let (rows, cols) = (gray.height() as usize, gray.width() as usize);
    let px = |r: usize, c: usize| gray.get_pixel(c as u32, r as u32).0[0] as f64;

    let mut magnitude = Array2::<f64>::zeros((rows, cols));
    let mut orientation = Array2::<f64>::zeros((rows, cols));
    for r in 0..rows {
        for c in 0..cols {
            let g_row = if r > 0 && r + 1 < rows {
                px(r + 1, c) - px(r - 1, c)
            } else {
                0.0
            };
            let g_col = if c > 0 && c + 1 < cols {
                px(r, c + 1) - px(r, c - 1)
            } else {
                0.0
            };
            magnitude[[r, c]] = g_row.hypot(g_col);
            orientation[[r, c]] = g_row.atan2(g_col).to_degrees().rem_euclid(180.0);
        }
    }
    (magnitude, orientation)
}

/// Per-cell orientation histograms, each bin the summed magnitude over the cell area.
fn cell_histograms(gray: &GrayImage, params: &HogParams) -> Array3<f64> {
    let (magnitude, orientation) = gradients(gray);
    let (cells_row, cells_col) = params.cells(gray.width(), gray.height());
    let cell = params.cell_size as usize;
    let bin_width = 180.0 / params.orientations as f64;
    let area = (cell * cell) as f64;

    let mut hist = Array3::<f64>::zeros((cells_row, cells_col, params.orientations));
    for cr in 0..cells_row {
        for cc in 0..cells_col {
            for r in cr * cell..(cr + 1) * cell {
                for c in cc * cell..(cc + 1) * cell {
                    let bin = ((orientation[[r, c]] / bin_width) as usize)
                        .min(params.orientations - 1);
                    hist[[cr, cc, bin]] += magnitude[[r, c]];
                }
            }
        }
    }
    hist.mapv_inplace(|v| v / area);
    hist
}

fn l2_hys(block: &mut [f64]) {
    let norm = (block.iter().map(|v| v * v).sum::<f64>() + L2_HYS_EPS * L2_HYS_EPS).sqrt();
    for v in block.iter_mut() {
        *v = (*v / norm).min(L2_HYS_CLIP);
    }
    let norm = (block.iter().map(|v| v * v).sum::<f64>() + L2_HYS_EPS * L2_HYS_EPS).sqrt();
    for v in block.iter_mut() {
        *v /= norm;
    }
}

/// Dense HOG descriptor with overlapping, L2-Hys normalized blocks.
///
/// Flattened as (block row, block col, cell row, cell col, orientation).
pub fn hog_descriptor(gray: &GrayImage, params: &HogParams) -> Result<Vec<f64>, FeatureError> {
    let len = params
        .descriptor_len(gray.width(), gray.height())
        .ok_or(FeatureError::HogGeometry {
            width: gray.width(),
            height: gray.height(),
            cell_size: params.cell_size,
            block_size: params.block_size,
        })?;

    let cells = cell_histograms(gray, params);
    let (cells_row, cells_col, _) = cells.dim();
    let b = params.block_size;

    let mut descriptor = Vec::with_capacity(len);
    for br in 0..=cells_row - b {
        for bc in 0..=cells_col - b {
            let mut block: Vec<f64> = cells
                .slice(s![br..br + b, bc..bc + b, ..])
                .iter()
                .copied()
                .collect();
            l2_hys(&mut block);
            descriptor.extend(block);
        }
    }
    Ok(descriptor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    #[test]
    fn test_descriptor_len_for_pinned_geometry() {
        assert_eq!(HogParams::default().descriptor_len(128, 128), Some(1764));
        assert_eq!(HogParams::default().descriptor_len(16, 16), None);
    }

    #[test]
    fn test_too_small_image_is_rejected() {
        let gray = GrayImage::new(20, 40);
        let result = hog_descriptor(&gray, &HogParams::default());

        assert!(matches!(result, Err(FeatureError::HogGeometry { .. })));
    }

    #[test]
    fn test_flat_image_has_zero_descriptor() {
        let gray = GrayImage::from_pixel(64, 64, Luma([120]));
        let descriptor = hog_descriptor(&gray, &HogParams::default()).unwrap();

        assert_eq!(descriptor.len(), 3 * 3 * 2 * 2 * 9);
        assert!(descriptor.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_horizontal_ramp_fills_only_the_first_bin() {
        let gray = GrayImage::from_fn(64, 64, |x, _| Luma([(x * 3) as u8]));
        let params = HogParams::default();
        let descriptor = hog_descriptor(&gray, &params).unwrap();

        for (i, v) in descriptor.iter().enumerate() {
            if i % params.orientations != 0 {
                assert_eq!(*v, 0.0, "non-zero orientation bin at {}", i);
            }
        }

        let block_len = params.block_size * params.block_size * params.orientations;
        for block in descriptor.chunks(block_len) {
            let norm: f64 = block.iter().map(|v| v * v).sum::<f64>().sqrt();
            assert!((norm - 1.0).abs() < 1e-6);
        }
    }
}
