//! Stage 4: List 1, neighbor leaves, ported from `NEIGBHOR_LEAVES_TEMPLATE`
//! in the source (the typo in that macro name is the source's own; ours is
//! spelled correctly since nothing here is code-generated).

use crate::adjacency::is_adjacent_or_overlapping;
use crate::error::TraversalError;
use crate::number::{BoxId, Coord};
use crate::ragged::{build_ragged_par, build_ragged_seq, Ragged};
use crate::tree::Tree;
use crate::walk::Walk;

/// Finds List 1 for a single leaf: every source-bearing box adjacent to the
/// leaf, whether that box is itself a leaf or a source-bearing internal
/// node reached by descending through adjacent subtrees.
fn neighbor_leaves_of<Id: BoxId, C: Coord, const D: usize>(
    tree: &Tree<Id, C, D>,
    leaf_box_id: Id,
    max_levels: usize,
    mut emit: impl FnMut(Id),
) -> Result<(), TraversalError> {
    let level = tree.level(leaf_box_id);
    let center = tree.center(leaf_box_id);
    let children_per_box = Tree::<Id, C, D>::CHILDREN_PER_BOX;

    let mut walk = Walk::new(Id::from_usize(0), max_levels);
    while walk.continue_walk {
        if let Some(child) = tree.child(walk.box_id, walk.morton_nr) {
            if is_adjacent_or_overlapping(tree, &center, level, child) {
                // `child == leaf_box_id` is fine here: a leaf is adjacent to
                // (overlaps) itself.
                if tree.has_sources(child) {
                    emit(child);
                }
                if tree.has_children(child) {
                    walk.push(child)?;
                    continue;
                }
            }
        }
        walk.advance(children_per_box);
    }

    Ok(())
}

/// Builds List 1 for every leaf (sequential). `leaves` is the output of
/// [`crate::leaves_parents::split_leaves_and_parents`].
pub fn build_list1_seq<Id: BoxId, C: Coord, const D: usize>(
    tree: &Tree<Id, C, D>,
    leaves: &[Id],
) -> Result<Ragged<Id>, TraversalError> {
    let max_levels = crate::walk::nlevels_for(tree.nlevels());
    let nleaves = leaves.len();

    let mut error = None;
    let ragged = build_ragged_seq::<Id>(
        nleaves,
        |l| {
            let mut count = 0usize;
            let _ = neighbor_leaves_of(tree, leaves[l], max_levels, |_| count += 1);
            count
        },
        |l, push| {
            if let Err(e) = neighbor_leaves_of(tree, leaves[l], max_levels, |c| push(c)) {
                error = Some(e);
            }
        },
    );

    match error {
        Some(e) => Err(e),
        None => {
            log::debug!("neighbor_leaves: {} total entries over {} leaves", ragged.lists.len(), nleaves);
            Ok(ragged)
        }
    }
}

/// Parallel counterpart of [`build_list1_seq`].
pub fn build_list1_par<Id: BoxId, C: Coord, const D: usize>(
    tree: &Tree<Id, C, D>,
    leaves: &[Id],
) -> Result<Ragged<Id>, TraversalError> {
    let max_levels = crate::walk::nlevels_for(tree.nlevels());
    let nleaves = leaves.len();

    for &leaf in leaves {
        let mut count = 0usize;
        neighbor_leaves_of(tree, leaf, max_levels, |_| count += 1)?;
    }

    let ragged = build_ragged_par::<Id>(
        nleaves,
        |l| {
            let mut count = 0usize;
            let _ = neighbor_leaves_of(tree, leaves[l], max_levels, |_| count += 1);
            count
        },
        |l, push| {
            let _ = neighbor_leaves_of(tree, leaves[l], max_levels, |c| push(c));
        },
    );

    log::debug!("neighbor_leaves: {} total entries over {} leaves", ragged.lists.len(), nleaves);
    Ok(ragged)
}
