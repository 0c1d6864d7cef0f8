use image::GrayImage;

/// Raw spatial moments of an intensity image up to third order.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct RawMoments {
    pub m00: f64,
    pub m10: f64,
    pub m01: f64,
    pub m20: f64,
    pub m11: f64,
    pub m02: f64,
    pub m30: f64,
    pub m21: f64,
    pub m12: f64,
    pub m03: f64,
}

impl RawMoments {
    pub fn from_image(gray: &GrayImage) -> Self {
        let mut m = RawMoments::default();
        for (x, y, pixel) in gray.enumerate_pixels() {
            let v = pixel.0[0] as f64;
            if v == 0.0 {
                continue;
            }
            let (x, y) = (x as f64, y as f64);
            m.m00 += v;
            m.m10 += x * v;
            m.m01 += y * v;
            m.m20 += x * x * v;
            m.m11 += x * y * v;
            m.m02 += y * y * v;
            m.m30 += x * x * x * v;
            m.m21 += x * x * y * v;
            m.m12 += x * y * y * v;
            m.m03 += y * y * y * v;
        }
        m
    }

    /// Scale-normalized central moments `[nu20, nu11, nu02, nu30, nu21, nu12, nu03]`.
    ///
    /// An image without mass has an undefined centroid; every moment is zero then.
    pub fn normalized_central(&self) -> [f64; 7] {
        let (inv_m00, cx, cy) = if self.m00.abs() > f64::EPSILON {
            let inv = 1.0 / self.m00;
            (inv, self.m10 * inv, self.m01 * inv)
        } else {
            (0.0, 0.0, 0.0)
        };

        let mu20 = self.m20 - self.m10 * cx;
        let mu11 = self.m11 - self.m10 * cy;
        let mu02 = self.m02 - self.m01 * cy;
        let mu30 = self.m30 - cx * (3.0 * mu20 + cx * self.m10);
        let mu21 = self.m21 - cx * (2.0 * mu11 + cx * self.m01) - cy * mu20;
        let mu12 = self.m12 - cy * (2.0 * mu11 + cy * self.m10) - cx * mu02;
        let mu03 = self.m03 - cy * (3.0 * mu02 + cy * self.m01);

        let s2 = inv_m00 * inv_m00;
        let s3 = s2 * inv_m00.abs().sqrt();

        [
            mu20 * s2,
            mu11 * s2,
            mu02 * s2,
            mu30 * s3,
            mu21 * s3,
            mu12 * s3,
            mu03 * s3,
        ]
    }
}

pub const HU_MOMENTS: usize = 7;

/// The seven Hu invariant moments of a grayscale intensity image.
pub fn hu_moments(gray: &GrayImage) -> [f64; HU_MOMENTS] {
    let [n20, n11, n02, n30, n21, n12, n03] = RawMoments::from_image(gray).normalized_central();

    let t0 = n30 + n12;
    let t1 = n21 + n03;
    let q0 = t0 * t0;
    let q1 = t1 * t1;
    let n4 = 4.0 * n11;
    let s = n20 + n02;
    let d = n20 - n02;

    let p0 = n30 - 3.0 * n12;
    let p1 = 3.0 * n21 - n03;

    [
        s,
        d * d + n4 * n11,
        p0 * p0 + p1 * p1,
        q0 + q1,
        p0 * t0 * (q0 - 3.0 * q1) + p1 * t1 * (3.0 * q0 - q1),
        d * (q0 - q1) + n4 * t0 * t1,
        p1 * t0 * (q0 - 3.0 * q1) - p0 * t1 * (3.0 * q0 - q1),
    ]
}
