use regionclust::mask::LabelMask;

/// Offsets of the five regions of a plus-shaped group, `spacing` apart.
fn plus_offsets(spacing: isize) -> [(isize, isize); 5] {
    [
        (0, 0),
        (spacing, 0),
        (-spacing, 0),
        (0, spacing),
        (0, -spacing),
    ]
}

/// Paints five 3x3 regions in a plus shape centred on `(cx, cy)`.
///
/// Labels run from `first_label` to `first_label + 4`. Returns the labels used.
pub fn paint_plus_group(
    mask: &mut LabelMask,
    cx: usize,
    cy: usize,
    spacing: usize,
    first_label: u32,
) -> Vec<u32> {
    assert!(spacing >= 3, "regions would overlap");
    let mut labels = Vec::with_capacity(5);
    for (i, (dx, dy)) in plus_offsets(spacing as isize).iter().enumerate() {
        let x = cx as isize + dx;
        let y = cy as isize + dy;
        assert!(x >= 1 && y >= 1, "group does not fit in the mask");
        let (x, y) = (x as usize, y as usize);
        let label = first_label + i as u32;
        mask.fill_box(x - 1..x + 2, y - 1..y + 2, 0..1, label);
        labels.push(label);
    }
    labels
}

/// 100x100 mask with two plus groups about 70 px apart. Returns the mask and
/// the labels of each group.
pub fn two_separated_groups() -> (LabelMask, Vec<u32>, Vec<u32>) {
    let mut mask = LabelMask::new_2d(100, 100);
    let a = paint_plus_group(&mut mask, 25, 25, 6, 1);
    let b = paint_plus_group(&mut mask, 75, 75, 6, 6);
    (mask, a, b)
}

/// 100x100 mask with one tightly packed plus group.
pub fn single_group() -> (LabelMask, Vec<u32>) {
    let mut mask = LabelMask::new_2d(100, 100);
    let labels = paint_plus_group(&mut mask, 50, 50, 5, 1);
    (mask, labels)
}

/// Same layout as [`two_separated_groups`] with sparse, shuffled labels.
pub fn two_groups_sparse_labels() -> (LabelMask, Vec<u32>, Vec<u32>) {
    let (mask, a, b) = two_separated_groups();
    let remap = |l: u32| 1000 - 37 * l;
    (
        mask.map_labels(remap),
        a.into_iter().map(remap).collect(),
        b.into_iter().map(remap).collect(),
    )
}
