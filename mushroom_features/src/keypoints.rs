use image::GrayImage;
use imageproc::corners::{corners_fast9, Corner};

pub const DEFAULT_FAST_THRESHOLD: u8 = 10;
/// Values produced by [`keypoint_summary`].
pub const SUMMARY_LEN: usize = 2;

/// FAST-9 corners that beat every corner in their 3x3 neighbourhood.
///
/// Ties suppress both corners.
pub fn fast_keypoints(gray: &GrayImage, threshold: u8) -> Vec<Corner> {
    let corners = corners_fast9(gray, threshold);
    let (width, height) = (gray.width() as i64, gray.height() as i64);

    let mut scores = vec![0f32; (width * height) as usize];
    for corner in &corners {
        scores[(corner.y as i64 * width + corner.x as i64) as usize] = corner.score;
    }

    corners
        .into_iter()
        .filter(|corner| {
            let (x, y) = (corner.x as i64, corner.y as i64);
            (-1..=1).all(|dy| {
                (-1..=1).all(|dx| {
                    let (nx, ny) = (x + dx, y + dy);
                    (dx == 0 && dy == 0)
                        || nx < 0
                        || ny < 0
                        || nx >= width
                        || ny >= height
                        || corner.score > scores[(ny * width + nx) as usize]
                })
            })
        })
        .collect()
}

/// Keypoint count and mean response; `[0, 0]` when nothing is detected.
pub fn keypoint_summary(gray: &GrayImage, threshold: u8) -> [f64; SUMMARY_LEN] {
    let keypoints = fast_keypoints(gray, threshold);
    if keypoints.is_empty() {
        return [0.0, 0.0];
    }
    let total: f64 = keypoints.iter().map(|k| k.score as f64).sum();
    [keypoints.len() as f64, total / keypoints.len() as f64]
}
