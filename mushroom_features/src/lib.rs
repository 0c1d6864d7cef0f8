//! Hand-engineered image features for the mushroom classifier.
//!
//! The vector layout is fixed by the trained scaler and scorer: an HSV color
//! histogram, GLCM texture statistics, Hu moments, a HOG descriptor, a uniform
//! LBP histogram and a FAST keypoint summary, concatenated in that order.

pub mod color;
pub mod glcm;
pub mod hog;
pub mod keypoints;
pub mod lbp;
pub mod moments;
pub mod resize;

mod error;

pub use error::FeatureError;
pub use hog::HogParams;

use image::RgbImage;
use std::borrow::Cow;

pub const IMAGE_WIDTH: u32 = 128;
pub const IMAGE_HEIGHT: u32 = 128;

/// Length of the vector produced with [`FeatureConfig::default`].
pub const FEATURE_LEN: usize = 2301;

#[derive(Debug, Clone, PartialEq)]
pub struct FeatureConfig {
    pub image_width: u32,
    pub image_height: u32,
    pub hsv_bins: [usize; 3],
    pub glcm_distance: u32,
    pub hog: HogParams,
    pub lbp_points: usize,
    pub lbp_radius: f64,
    pub fast_threshold: u8,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            image_width: IMAGE_WIDTH,
            image_height: IMAGE_HEIGHT,
            hsv_bins: [8, 8, 8],
            glcm_distance: 5,
            hog: HogParams::default(),
            lbp_points: 8,
            lbp_radius: 1.0,
            fast_threshold: keypoints::DEFAULT_FAST_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FeatureExtractor {
    config: FeatureConfig,
    feature_len: usize,
}

impl FeatureExtractor {
    pub fn new(config: FeatureConfig) -> Result<Self, FeatureError> {
        if config.image_width == 0 || config.image_height == 0 {
            return Err(FeatureError::InvalidConfig(format!(
                "target size {}x{} is empty",
                config.image_width, config.image_height
            )));
        }
        if config.hsv_bins.contains(&0) {
            return Err(FeatureError::InvalidConfig(
                "HSV histogram needs at least one bin per channel".into(),
            ));
        }
        if config.lbp_points == 0 || config.lbp_points > 253 || config.lbp_radius <= 0.0 {
            return Err(FeatureError::InvalidConfig(format!(
                "LBP with {} points at radius {} is not supported",
                config.lbp_points, config.lbp_radius
            )));
        }
        let hog_len = config
            .hog
            .descriptor_len(config.image_width, config.image_height)
            .ok_or(FeatureError::HogGeometry {
                width: config.image_width,
                height: config.image_height,
                cell_size: config.hog.cell_size,
                block_size: config.hog.block_size,
            })?;

        let feature_len = config.hsv_bins.iter().product::<usize>()
            + glcm::GLCM_PROPERTIES
            + moments::HU_MOMENTS
            + hog_len
            + lbp::histogram_len(config.lbp_points)
            + keypoints::SUMMARY_LEN;

        Ok(Self {
            config,
            feature_len,
        })
    }

    pub fn config(&self) -> &FeatureConfig {
        &self.config
    }

    pub fn feature_len(&self) -> usize {
        self.feature_len
    }

    /// Resizes to the target resolution with OpenCV-compatible bilinear
    /// interpolation, borrowing when the size already matches.
    pub fn resize<'a>(&self, image: &'a RgbImage) -> Cow<'a, RgbImage> {
        let (width, height) = (self.config.image_width, self.config.image_height);
        if image.dimensions() == (width, height) {
            Cow::Borrowed(image)
        } else {
            Cow::Owned(resize::resize_linear(image, width, height))
        }
    }

    /// Computes the full feature vector; the output never holds NaN or infinities.
    pub fn extract(&self, image: &RgbImage) -> Result<Vec<f64>, FeatureError> {
        if image.width() == 0 || image.height() == 0 {
            return Err(FeatureError::EmptyImage {
                width: image.width(),
                height: image.height(),
            });
        }
        let image = self.resize(image);
        let gray = color::to_grayscale(&image);
        let config = &self.config;

        let mut features = Vec::with_capacity(self.feature_len);
        features.extend(color::hsv_histogram(&image, config.hsv_bins));
        features.extend(glcm::texture_properties(&gray, config.glcm_distance));
        features.extend(moments::hu_moments(&gray));
        features.extend(hog::hog_descriptor(&gray, &config.hog)?);
        features.extend(lbp::lbp_histogram(
            &gray,
            config.lbp_points,
            config.lbp_radius,
        ));
        features.extend(keypoints::keypoint_summary(&gray, config.fast_threshold));

        if features.len() != self.feature_len {
            return Err(FeatureError::LengthMismatch {
                expected: self.feature_len,
                actual: features.len(),
            });
        }

        let replaced = sanitize(&mut features);
        if replaced > 0 {
            tracing::debug!("Replaced {} non-finite feature values", replaced);
        }

        Ok(features)
    }
}

/// Zeroes every NaN or infinite value, returning how many were replaced.
pub fn sanitize(values: &mut [f64]) -> usize {
    let mut replaced = 0;
    for v in values.iter_mut().filter(|v| !v.is_finite()) {
        *v = 0.0;
        replaced += 1;
    }
    replaced
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;
    use std::f64::consts::FRAC_1_SQRT_2;

    fn extractor() -> FeatureExtractor {
        FeatureExtractor::new(FeatureConfig::default()).unwrap()
    }

    fn mushroom_like(width: u32, height: u32) -> RgbImage {
        RgbImage::from_fn(width, height, |x, y| {
            let dx = x as i64 - width as i64 / 2;
            let dy = y as i64 - height as i64 / 3;
            if dx * dx + dy * dy < (width as i64 / 3).pow(2) {
                Rgb([150 + (x % 40) as u8, 90 + (y % 30) as u8, 40])
            } else {
                Rgb([20 + (y % 60) as u8, 110 + ((x * y) % 50) as u8, 30])
            }
        })
    }

    #[test]
    fn test_default_length_matches_constant() {
        assert_eq!(extractor().feature_len(), FEATURE_LEN);
    }

    #[test]
    fn test_length_is_independent_of_input_size() {
        let extractor = extractor();
        for (w, h) in [(128, 128), (64, 48), (300, 200), (1, 1), (17, 513)] {
            let features = extractor.extract(&mushroom_like(w, h)).unwrap();
            assert_eq!(features.len(), FEATURE_LEN, "input {}x{}", w, h);
        }
    }

    #[test]
    fn test_extraction_is_deterministic() {
        let extractor = extractor();
        let img = mushroom_like(128, 128);

        let a = extractor.extract(&img).unwrap();
        let b = extractor.extract(&img).unwrap();

        let a_bits: Vec<u64> = a.iter().map(|v| v.to_bits()).collect();
        let b_bits: Vec<u64> = b.iter().map(|v| v.to_bits()).collect();
        assert_eq!(a_bits, b_bits);
    }

    #[test]
    fn test_degenerate_images_stay_finite() {
        let extractor = extractor();
        for color in [[0, 0, 0], [255, 255, 255], [120, 60, 200]] {
            let img = RgbImage::from_pixel(128, 128, Rgb(color));
            let features = extractor.extract(&img).unwrap();

            assert!(features.iter().all(|v| v.is_finite()));
            // a flat image has no keypoints
            assert_eq!(&features[FEATURE_LEN - 2..], &[0.0, 0.0]);
        }
    }

    #[test]
    fn test_sub_vectors_are_laid_out_in_order() {
        let extractor = extractor();
        let img = mushroom_like(128, 128);
        let features = extractor.extract(&img).unwrap();
        let gray = color::to_grayscale(&img);

        assert_eq!(&features[..512], &color::hsv_histogram(&img, [8, 8, 8])[..]);
        assert_eq!(&features[512..518], &glcm::texture_properties(&gray, 5)[..]);
        assert_eq!(&features[518..525], &moments::hu_moments(&gray)[..]);
        let hog = hog::hog_descriptor(&gray, &HogParams::default()).unwrap();
        assert_eq!(&features[525..525 + 1764], &hog[..]);
        assert_eq!(&features[2289..2299], &lbp::lbp_histogram(&gray, 8, 1.0)[..]);
        assert_eq!(&features[2299..], &keypoints::keypoint_summary(&gray, 10)[..]);
    }

    fn assert_close(actual: &[f64], expected: &[f64], tolerance: f64) {
        assert_eq!(actual.len(), expected.len());
        for (i, (a, e)) in actual.iter().zip(expected).enumerate() {
            assert!((a - e).abs() <= tolerance, "index {}: {} != {}", i, a, e);
        }
    }

    /// GLCM statistics of a symmetric matrix over levels 0 and 255 with `same`
    /// equal-valued and `cross` mixed pairs per direction.
    fn two_level_glcm(same: f64, cross: f64) -> [f64; 6] {
        let total = 2.0 * (same + cross);
        let (p_same, p_cross) = (same / total, cross / total);
        let asm = 2.0 * p_same * p_same + 2.0 * p_cross * p_cross;
        [
            2.0 * p_cross * 255.0 * 255.0,
            2.0 * p_cross * 255.0,
            2.0 * p_same + 2.0 * p_cross / (1.0 + 255.0 * 255.0),
            asm.sqrt(),
            2.0 * p_same - 2.0 * p_cross,
            asm,
        ]
    }

    #[test]
    fn test_vertical_step_edge_matches_reference_vector() {
        // 256x256 halves to 128x128: black columns 0..64, white columns 64..128
        let img = RgbImage::from_fn(256, 256, |x, _| {
            if x < 128 {
                Rgb([0, 0, 0])
            } else {
                Rgb([255, 255, 255])
            }
        });

        let features = extractor().extract(&img).unwrap();
        assert_eq!(features.len(), FEATURE_LEN);

        // black is bin (0, 0, 0), white is bin (0, 0, 7)
        let mut hsv = vec![0.0; 512];
        hsv[0] = FRAC_1_SQRT_2;
        hsv[7] = FRAC_1_SQRT_2;
        assert_close(&features[..512], &hsv, 1e-6);

        // distance 5: 59 + 59 equal pairs and 5 mixed pairs per row at 0 rad,
        // 60 + 60 and 4 on both diagonals, no mixed pairs vertically
        let angles = [
            two_level_glcm(118.0, 5.0),
            two_level_glcm(120.0, 4.0),
            two_level_glcm(1.0, 0.0),
            two_level_glcm(120.0, 4.0),
        ];
        let glcm: Vec<f64> = (0..6)
            .map(|k| angles.iter().map(|a| a[k]).sum::<f64>() / 4.0)
            .collect();
        assert_close(&features[512..518], &glcm, 1e-9);

        let m00: f64 = 255.0 * 64.0 * 128.0;
        let nu20 = 255.0 * 128.0 * 21840.0 / (m00 * m00);
        let nu02 = 255.0 * 64.0 * 174752.0 / (m00 * m00);
        let hu = [nu20 + nu02, (nu20 - nu02).powi(2), 0.0, 0.0, 0.0, 0.0, 0.0];
        assert_close(&features[518..525], &hu, 1e-12);

        // only columns 63 and 64 carry a gradient, all of it in orientation bin 0
        let mut hog = vec![0.0; 1764];
        for br in 0..7 {
            for bc in 2..=4 {
                for cell_row in 0..2 {
                    for cell_col in 0..2 {
                        if matches!(bc + cell_col, 3 | 4) {
                            let index = (((br * 7 + bc) * 2 + cell_row) * 2 + cell_col) * 9;
                            hog[index] = if bc == 3 { 0.5 } else { FRAC_1_SQRT_2 };
                        }
                    }
                }
            }
        }
        assert_close(&features[525..2289], &hog, 1e-6);

        let lbp_counts = [0.0, 0.0, 0.0, 4.0, 0.0, 376.0, 0.0, 0.0, 16004.0, 0.0];
        let lbp: Vec<f64> = lbp_counts.iter().map(|c| c / (16384.0 + 1e-7)).collect();
        assert_close(&features[2289..2299], &lbp, 1e-12);

        // a straight edge has at most seven contiguous brighter ring pixels
        assert_eq!(&features[2299..], &[0.0, 0.0]);
    }

    #[test]
    fn test_empty_image_is_rejected() {
        let result = extractor().extract(&RgbImage::new(0, 10));

        assert_eq!(
            result,
            Err(FeatureError::EmptyImage {
                width: 0,
                height: 10
            })
        );
    }

    #[test]
    fn test_geometry_that_cannot_hold_a_block_is_rejected() {
        let config = FeatureConfig {
            image_width: 24,
            image_height: 24,
            ..FeatureConfig::default()
        };

        assert!(matches!(
            FeatureExtractor::new(config),
            Err(FeatureError::HogGeometry { .. })
        ));
    }

    #[test]
    fn test_sanitize_zeroes_non_finite_values() {
        let mut values = [1.0, f64::NAN, f64::INFINITY, -2.5, f64::NEG_INFINITY];

        assert_eq!(sanitize(&mut values), 3);
        assert_eq!(values, [1.0, 0.0, 0.0, -2.5, 0.0]);
    }
}
