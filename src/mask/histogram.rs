use super::LabelMask;
use std::collections::BTreeMap;

/// Pixel counts per label value present in a mask, background included.
///
/// Only labels that occur are stored, so sparse label numbering costs nothing.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LabelHistogram {
    counts: BTreeMap<u32, usize>,
}

impl LabelHistogram {
    /// Largest label value present (0 for an all-background mask).
    pub fn max_label(&self) -> u32 {
        self.counts.keys().next_back().copied().unwrap_or(0)
    }

    /// Pixels carrying `label`.
    pub fn count(&self, label: u32) -> usize {
        self.counts.get(&label).copied().unwrap_or(0)
    }

    /// Counts of every label that occurs, in label order.
    pub fn counts(&self) -> &BTreeMap<u32, usize> {
        &self.counts
    }

    /// Running totals in label order: `(l, n)` where `n` is the number of
    /// pixels with label `<= l`.
    pub fn cumulative(&self) -> Vec<(u32, usize)> {
        self.counts
            .iter()
            .scan(0usize, |acc, (&label, &c)| {
                *acc += c;
                Some((label, *acc))
            })
            .collect()
    }

    /// Nonzero labels that occur, in ascending order.
    pub fn labels(&self) -> impl Iterator<Item = u32> + '_ {
        self.counts.keys().copied().filter(|&l| l != 0)
    }

    /// Number of distinct nonzero labels that occur.
    pub fn region_count(&self) -> usize {
        self.labels().count()
    }
}

impl LabelMask {
    /// Count pixels per label value.
    pub fn histogram(&self) -> LabelHistogram {
        let mut counts = BTreeMap::new();
        for &l in self.as_slice() {
            *counts.entry(l).or_insert(0) += 1;
        }
        LabelHistogram { counts }
    }
}
