//! Separable Gaussian smoothing of the foreground indicator.
//!
//! Used to "smear" a label mask so that nearby regions fuse into blobs. The
//! kernel is truncated at `3σ` and the borders are zero-padded, which is the
//! right model for a sparse foreground: nothing exists outside the grid.

use super::LabelMask;

/// Normalised 1D Gaussian taps of radius `ceil(3σ)`.
fn gaussian_taps(sigma: f64) -> Vec<f32> {
    let radius = (3.0 * sigma).ceil() as isize;
    let denom = 2.0 * sigma * sigma;
    let taps: Vec<f64> = (-radius..=radius)
        .map(|k| (-(k * k) as f64 / denom).exp())
        .collect();
    let sum: f64 = taps.iter().sum();
    taps.into_iter().map(|t| (t / sum) as f32).collect()
}

/// Convolve `buf` along one axis. `stride` is the element step of that axis
/// and `len` its extent.
fn convolve_axis(buf: &[f32], shape: (usize, usize, usize), axis: usize, taps: &[f32]) -> Vec<f32> {
    let (w, h, d) = shape;
    let (len, stride) = match axis {
        0 => (w, 1),
        1 => (h, w),
        _ => (d, w * h),
    };
    let radius = (taps.len() / 2) as isize;
    let mut out = vec![0.0f32; buf.len()];

    for (i, o) in out.iter_mut().enumerate() {
        let pos = ((i / stride) % len) as isize;
        let mut acc = 0.0f32;
        for (t, &tap) in taps.iter().enumerate() {
            let offset = t as isize - radius;
            let q = pos + offset;
            if q < 0 || q >= len as isize {
                continue;
            }
            let j = (i as isize + offset * stride as isize) as usize;
            acc += tap * buf[j];
        }
        *o = acc;
    }
    out
}

impl LabelMask {
    /// Gaussian-smoothed foreground indicator (`1.0` where the label is nonzero).
    ///
    /// The z axis is smoothed only when the mask has more than one slice.
    /// A non-positive `sigma` returns the indicator unchanged.
    pub fn gaussian_blur(&self, sigma: f64) -> Vec<f32> {
        let mut buf: Vec<f32> = self
            .as_slice()
            .iter()
            .map(|&l| if l != 0 { 1.0 } else { 0.0 })
            .collect();
        if sigma <= 0.0 || buf.is_empty() {
            return buf;
        }

        let taps = gaussian_taps(sigma);
        let shape = self.shape();
        buf = convolve_axis(&buf, shape, 0, &taps);
        buf = convolve_axis(&buf, shape, 1, &taps);
        if self.depth() > 1 {
            buf = convolve_axis(&buf, shape, 2, &taps);
        }
        buf
    }

    /// Binary mask of pixels whose blurred foreground reaches `threshold`
    /// times the blurred maximum.
    pub fn smear(&self, sigma: f64, threshold: f64) -> LabelMask {
        let blurred = self.gaussian_blur(sigma);
        let max = blurred.iter().copied().fold(0.0f32, f32::max);
        let cut = (threshold as f32) * max;
        LabelMask {
            width: self.width(),
            height: self.height(),
            depth: self.depth(),
            data: blurred
                .iter()
                .map(|&v| u32::from(max > 0.0 && v >= cut))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_taps_are_normalised_and_symmetric() {
        let taps = gaussian_taps(2.0);
        assert_eq!(taps.len(), 13);
        let sum: f32 = taps.iter().sum();
        assert!((sum - 1.0).abs() < 1e-5);
        for k in 0..taps.len() / 2 {
            assert_eq!(taps[k], taps[taps.len() - 1 - k]);
        }
    }

    #[test]
    fn test_blur_preserves_mass_away_from_borders() {
        let mut m = LabelMask::new_2d(41, 41);
        m.set(20, 20, 0, 1);
        let b = m.gaussian_blur(3.0);
        let mass: f32 = b.iter().sum();
        assert!((mass - 1.0).abs() < 1e-4);
        let peak = b.iter().copied().fold(0.0f32, f32::max);
        assert_eq!(b[20 * 41 + 20], peak);
    }

    #[test]
    fn test_smear_fuses_near_regions_and_keeps_far_ones_apart() {
        let mut m = LabelMask::new_2d(80, 20);
        m.fill_box(5..8, 8..11, 0..1, 1);
        m.fill_box(12..15, 8..11, 0..1, 2);
        m.fill_box(65..68, 8..11, 0..1, 3);
        let blobs = m.smear(3.0, 0.1).connected_components();
        assert_eq!(blobs.get(6, 9, 0), blobs.get(13, 9, 0));
        assert_ne!(blobs.get(6, 9, 0), blobs.get(66, 9, 0));
        assert_ne!(blobs.get(66, 9, 0), 0);
    }

    #[test]
    fn test_zero_sigma_is_identity_indicator() {
        let m = LabelMask::from_vec(3, 1, 1, vec![0, 4, 0]).unwrap();
        assert_eq!(m.gaussian_blur(0.0), vec![0.0, 1.0, 0.0]);
        assert_eq!(m.smear(0.0, 0.5).as_slice(), &[0, 1, 0]);
    }
}
