//! Stage 3: colleagues, same-level adjacent boxes, ported from
//! `COLLEAGUES_TEMPLATE` in the source.

use crate::adjacency::is_adjacent_or_overlapping;
use crate::error::TraversalError;
use crate::number::{BoxId, Coord};
use crate::ragged::{build_ragged_par, build_ragged_seq, Ragged};
use crate::tree::Tree;
use crate::walk::Walk;

/// Finds the colleagues of a single box: same-level boxes, excluding
/// itself, adjacent to or overlapping it.
///
/// The root (box `0`) always has an empty colleague list. Otherwise this
/// descends from the root, only entering children adjacent to `box_id`, and
/// emits a child as a colleague exactly when it lives one level above the
/// walk's current level and on `box_id`'s own level (and is not `box_id`
/// itself).
fn colleagues_of<Id: BoxId, C: Coord, const D: usize>(
    tree: &Tree<Id, C, D>,
    box_id: Id,
    max_levels: usize,
    mut emit: impl FnMut(Id),
) -> Result<(), TraversalError> {
    if tree.is_root(box_id) {
        return Ok(());
    }

    let level = tree.level(box_id);
    let center = tree.center(box_id);
    let children_per_box = Tree::<Id, C, D>::CHILDREN_PER_BOX;

    let mut walk = Walk::new(Id::from_usize(0), max_levels);
    while walk.continue_walk {
        if let Some(child) = tree.child(walk.box_id, walk.morton_nr) {
            if is_adjacent_or_overlapping(tree, &center, level, child) {
                if walk.level + 1 == level as usize && child != box_id {
                    emit(child);
                } else {
                    walk.push(child)?;
                    continue;
                }
            }
        }
        walk.advance(children_per_box);
    }

    Ok(())
}

/// Builds the colleagues ragged list for every box in the tree
/// (sequential).
pub fn build_colleagues_seq<Id: BoxId, C: Coord, const D: usize>(tree: &Tree<Id, C, D>) -> Result<Ragged<Id>, TraversalError> {
    let max_levels = crate::walk::nlevels_for(tree.nlevels());
    let nboxes = tree.nboxes();

    let mut error = None;
    let ragged = build_ragged_seq::<Id>(
        nboxes,
        |b| {
            let mut count = 0usize;
            let _ = colleagues_of(tree, Id::from_usize(b), max_levels, |_| count += 1);
            count
        },
        |b, push| {
            if let Err(e) = colleagues_of(tree, Id::from_usize(b), max_levels, |c| push(c)) {
                error = Some(e);
            }
        },
    );

    match error {
        Some(e) => Err(e),
        None => {
            log::debug!("colleagues: {} total entries over {} boxes", ragged.lists.len(), nboxes);
            Ok(ragged)
        }
    }
}

/// Parallel counterpart of [`build_colleagues_seq`] (data-parallel over
/// `box_id`).
pub fn build_colleagues_par<Id: BoxId, C: Coord, const D: usize>(tree: &Tree<Id, C, D>) -> Result<Ragged<Id>, TraversalError> {
    let max_levels = crate::walk::nlevels_for(tree.nlevels());
    let nboxes = tree.nboxes();

    // The walk kernel can only fail with `TreeTooDeep`, a configuration bug
    // rather than a per-box condition; running the count pass once
    // sequentially surfaces it before committing to the parallel fill pass.
    for b in 0..nboxes {
        let mut count = 0usize;
        colleagues_of(tree, Id::from_usize(b), max_levels, |_| count += 1)?;
    }

    let ragged = build_ragged_par::<Id>(
        nboxes,
        |b| {
            let mut count = 0usize;
            let _ = colleagues_of(tree, Id::from_usize(b), max_levels, |_| count += 1);
            count
        },
        |b, push| {
            let _ = colleagues_of(tree, Id::from_usize(b), max_levels, |c| push(c));
        },
    );

    log::debug!("colleagues: {} total entries over {} boxes", ragged.lists.len(), nboxes);
    Ok(ragged)
}
