//! Connected-component labeling.
//!
//! Two passes over the grid with a union-find table of provisional labels:
//! the first pass gives each foreground pixel the smallest label among its
//! already-visited face neighbours (left, up, previous slice) and records
//! equivalences; the second pass resolves every provisional label to its root
//! and numbers the roots `1..=m` in order of first appearance.
//!
//! Connectivity is by faces only: 4-connected in 2D, 6-connected in 3D.

use super::LabelMask;
use crate::util::UnionFind;

impl LabelMask {
    /// Label connected foreground (`!= 0`) regions, ignoring the input label values.
    pub fn connected_components(&self) -> LabelMask {
        let (w, h, d) = self.shape();
        let mut provisional = vec![0usize; self.as_slice().len()];
        // Index 0 is a dummy so provisional label `n` lives at `n`.
        let mut uf = UnionFind::new(1);

        for z in 0..d {
            for y in 0..h {
                for x in 0..w {
                    let i = self.idx(x, y, z);
                    if self.as_slice()[i] == 0 {
                        continue;
                    }
                    let mut neighbours = [0usize; 3];
                    if x > 0 {
                        neighbours[0] = provisional[i - 1];
                    }
                    if y > 0 {
                        neighbours[1] = provisional[i - w];
                    }
                    if z > 0 {
                        neighbours[2] = provisional[i - w * h];
                    }

                    let min = neighbours.iter().copied().filter(|&n| n > 0).min();
                    match min {
                        None => provisional[i] = uf.push(),
                        Some(m) => {
                            provisional[i] = m;
                            for &n in neighbours.iter().filter(|&&n| n > 0 && n != m) {
                                uf.union(m, n);
                            }
                        }
                    }
                }
            }
        }

        let mut final_label = vec![0u32; uf.len()];
        let mut next = 0u32;
        let data = provisional
            .iter()
            .map(|&p| {
                if p == 0 {
                    return 0;
                }
                let root = uf.find(p);
                if final_label[root] == 0 {
                    next += 1;
                    final_label[root] = next;
                }
                final_label[root]
            })
            .collect();

        LabelMask {
            width: w,
            height: h,
            depth: d,
            data,
        }
    }
}
