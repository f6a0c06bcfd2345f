//! Integer label masks.
//!
//! A [`LabelMask`] is a dense `width × height × depth` grid of `u32` labels in
//! row-major order (`x` fastest, then `y`, then `z`). Label `0` is background;
//! every other value names a region. 2D masks have `depth == 1`.
//!
//! The clustering engine only touches masks through the operations here:
//! per-pixel get/set, histograms, connected-component labeling, consecutive
//! relabeling, masking by a reference, and a long-range Gaussian smear.

mod blur;
mod components;
mod histogram;

pub use histogram::LabelHistogram;

use crate::error::{Error, Result};
use crate::geometry::Point3;
use std::collections::BTreeMap;

/// Dense 3D grid of region labels.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LabelMask {
    width: usize,
    height: usize,
    depth: usize,
    data: Vec<u32>,
}

/// Pixel count and coordinate sum of one label.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RegionMoments {
    pub pixel_count: usize,
    pub coordinate_sum: Point3,
}

impl RegionMoments {
    /// Mean pixel coordinate, or `None` for an empty region.
    pub fn centroid(&self) -> Option<Point3> {
        (self.pixel_count > 0).then(|| self.coordinate_sum / self.pixel_count as f64)
    }
}

impl LabelMask {
    /// A zero-filled 3D mask.
    pub fn new(width: usize, height: usize, depth: usize) -> Self {
        Self {
            width,
            height,
            depth,
            data: vec![0; width * height * depth],
        }
    }

    /// A zero-filled 2D mask.
    pub fn new_2d(width: usize, height: usize) -> Self {
        Self::new(width, height, 1)
    }

    /// Wrap an existing buffer; its length must be `width * height * depth`.
    pub fn from_vec(width: usize, height: usize, depth: usize, data: Vec<u32>) -> Result<Self> {
        if data.len() != width * height * depth {
            return Err(Error::MaskShape {
                expected: (width, height, depth),
                found: (data.len(), 1, 1),
            });
        }
        Ok(Self {
            width,
            height,
            depth,
            data,
        })
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// `(width, height, depth)`.
    #[inline]
    pub fn shape(&self) -> (usize, usize, usize) {
        (self.width, self.height, self.depth)
    }

    #[inline]
    pub fn as_slice(&self) -> &[u32] {
        &self.data
    }

    #[inline]
    fn idx(&self, x: usize, y: usize, z: usize) -> usize {
        assert!(
            x < self.width && y < self.height && z < self.depth,
            "pixel ({x}, {y}, {z}) outside {}x{}x{} mask",
            self.width,
            self.height,
            self.depth
        );
        (z * self.height + y) * self.width + x
    }

    #[inline]
    fn coords(&self, i: usize) -> (usize, usize, usize) {
        let x = i % self.width;
        let y = (i / self.width) % self.height;
        let z = i / (self.width * self.height);
        (x, y, z)
    }

    /// Label at `(x, y, z)`.
    ///
    /// # Panics
    ///
    /// If the coordinate lies outside the mask.
    #[inline]
    pub fn get(&self, x: usize, y: usize, z: usize) -> u32 {
        self.data[self.idx(x, y, z)]
    }

    /// Write `label` at `(x, y, z)`.
    ///
    /// # Panics
    ///
    /// If the coordinate lies outside the mask.
    #[inline]
    pub fn set(&mut self, x: usize, y: usize, z: usize, label: u32) {
        let i = self.idx(x, y, z);
        self.data[i] = label;
    }

    /// Fill an axis-aligned box (half-open ranges) with `label`, clipped to the mask.
    pub fn fill_box(
        &mut self,
        x: std::ops::Range<usize>,
        y: std::ops::Range<usize>,
        z: std::ops::Range<usize>,
        label: u32,
    ) {
        for zz in z.start..z.end.min(self.depth) {
            for yy in y.start..y.end.min(self.height) {
                for xx in x.start..x.end.min(self.width) {
                    self.set(xx, yy, zz, label);
                }
            }
        }
    }

    /// Iterate `(position, label)` over every pixel in storage order.
    pub fn pixels(&self) -> impl Iterator<Item = (Point3, u32)> + '_ {
        self.data.iter().enumerate().map(move |(i, &label)| {
            let (x, y, z) = self.coords(i);
            (Point3::new(x as f64, y as f64, z as f64), label)
        })
    }

    /// Pixel count and coordinate sum for every nonzero label present.
    pub fn region_moments(&self) -> BTreeMap<u32, RegionMoments> {
        let mut out: BTreeMap<u32, RegionMoments> = BTreeMap::new();
        for (pos, label) in self.pixels() {
            if label == 0 {
                continue;
            }
            let m = out.entry(label).or_default();
            m.pixel_count += 1;
            m.coordinate_sum += pos;
        }
        out
    }

    /// Map every nonzero label onto `1..=m`, keeping their relative order.
    ///
    /// Already-consecutive masks are returned unchanged, so the operation is
    /// idempotent.
    pub fn relabel_consecutive(&self) -> LabelMask {
        let lut: BTreeMap<u32, u32> = self
            .histogram()
            .labels()
            .zip(1..)
            .collect();
        self.map_labels(|l| lut.get(&l).copied().unwrap_or(0))
    }

    /// Apply `f` to every label; background stays background.
    pub fn map_labels(&self, mut f: impl FnMut(u32) -> u32) -> LabelMask {
        LabelMask {
            width: self.width,
            height: self.height,
            depth: self.depth,
            data: self
                .data
                .iter()
                .map(|&l| if l == 0 { 0 } else { f(l) })
                .collect(),
        }
    }

    /// Zero every pixel where `reference` is zero.
    pub fn mask_with(&mut self, reference: &LabelMask) -> Result<()> {
        if reference.shape() != self.shape() {
            return Err(Error::MaskShape {
                expected: self.shape(),
                found: reference.shape(),
            });
        }
        for (v, &r) in self.data.iter_mut().zip(&reference.data) {
            if r == 0 {
                *v = 0;
            }
        }
        Ok(())
    }
}
