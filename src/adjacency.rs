//! The adjacency-or-overlap predicate, ported from
//! `is_adjacent_or_overlapping` in the source's `ADJACENCY_TEST_TEMPLATE`.

use crate::number::Coord;
use crate::tree::Tree;
use crate::number::BoxId;

/// Whether two boxes are adjacent or overlapping, given a width-aware
/// "slack" tolerance.
///
/// The extra half-size slack classifies a smaller box sitting flush against
/// a larger neighbor as adjacent despite coordinate round-off. The
/// predicate is symmetric, and the boundary comparison is `<=`: touching
/// boxes count as adjacent.
pub fn is_adjacent_or_overlapping<Id: BoxId, C: Coord, const D: usize>(
    tree: &Tree<Id, C, D>,
    center: &[C; D],
    level: u8,
    other_box_id: Id,
) -> bool {
    let other_center = tree.center(other_box_id);
    let other_level = tree.level(other_box_id);

    let size = tree.level_size(level);
    let other_size = tree.level_size(other_level);

    let two = C::from(2).expect("2 fits in coordinate type");
    let size_sum = (size + other_size) / two;
    let slack = size_sum + tree.level_size(level.max(other_level)) / two;

    let max_dist = center
        .iter()
        .zip(other_center.iter())
        .map(|(&a, &b)| (a - b).abs())
        .fold(C::zero(), C::max);

    max_dist <= slack
}
