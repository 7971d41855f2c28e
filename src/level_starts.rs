//! Stage 2: extract per-level index ranges into `parents[]`, ported from
//! `level_starts_extractor` (an `ElementwiseTemplate`) in the source.

use crate::number::BoxId;

/// Computes `parent_box_level_starts[nlevels + 1]`: for each level `l`,
/// the first index `i` in `parents` such that `box_levels[parents[i]] >= l`.
///
/// Two-step:
/// 1. For each adjacent pair in `parents`, detect when it straddles a
///    `level_starts` boundary and record the index there.
/// 2. Fix entry `0` to `0`, then sweep from the deepest level down,
///    replacing each not-yet-filled entry (initialized to `len(parents)`)
///    with the minimum of itself and the next entry, so that levels with no
///    parents still produce a non-decreasing sequence.
pub fn parent_box_level_starts<Id: BoxId>(parents: &[Id], box_levels: &[u8], level_starts: &[Id], nlevels: usize) -> Vec<usize> {
    let mut result = vec![parents.len(); nlevels + 1];

    for i in 1..parents.len() {
        let my_box_id = parents[i];
        let prev_box_id = parents[i - 1];

        let my_level = box_levels[my_box_id.as_usize()] as usize;
        let my_level_start = level_starts[my_level].as_usize();

        if prev_box_id.as_usize() < my_level_start && my_level_start <= my_box_id.as_usize() {
            result[my_level] = i;
        }
    }

    // We never inspect index 0 above (no "previous" box to compare against),
    // but index 0 always starts at offset 0 regardless of whether box 0 (=
    // level 0) is a leaf or a parent.
    result[0] = 0;

    let mut prev_start = parents.len();
    for level in (0..nlevels).rev() {
        prev_start = result[level].min(prev_start);
        result[level] = prev_start;
    }

    debug_assert_eq!(result[0], 0);
    debug_assert_eq!(result[nlevels], parents.len());
    debug_assert!(result.windows(2).all(|w| w[0] <= w[1]), "level starts must be non-decreasing");

    result
}
