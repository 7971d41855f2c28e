//! Stage 4: List 2, separated siblings, ported from `SEP_SIBLINGS_TEMPLATE`
//! in the source.
//!
//! Unlike colleagues and List 1, this stage needs no tree descent: List 2
//! for a box is assembled directly from its parent's colleagues, already
//! computed in stage 3.

use crate::adjacency::is_adjacent_or_overlapping;
use crate::number::{BoxId, Coord};
use crate::ragged::{build_ragged_par, build_ragged_seq, Ragged};
use crate::tree::Tree;

/// Finds List 2 for a single box: among the children of its parent's
/// colleagues, those not adjacent to (and hence well-separated from) this
/// box. The root has no parent and thus an empty List 2.
fn sep_siblings_of<Id: BoxId, C: Coord, const D: usize>(tree: &Tree<Id, C, D>, box_id: Id, colleagues: &Ragged<Id>, mut emit: impl FnMut(Id)) {
    if tree.is_root(box_id) {
        return;
    }

    let level = tree.level(box_id);
    let center = tree.center(box_id);
    let parent = tree.parent(box_id);
    let children_per_box = Tree::<Id, C, D>::CHILDREN_PER_BOX;

    for &colleague in colleagues.get(parent.as_usize()) {
        for morton_nr in 0..children_per_box {
            if let Some(child) = tree.child(colleague, morton_nr) {
                if !is_adjacent_or_overlapping(tree, &center, level, child) {
                    emit(child);
                }
            }
        }
    }
}

/// Builds List 2 for every box (sequential). `colleagues` must be the
/// output of [`crate::colleagues::build_colleagues_seq`] (or its parallel
/// counterpart) for the same tree.
pub fn build_list2_seq<Id: BoxId, C: Coord, const D: usize>(tree: &Tree<Id, C, D>, colleagues: &Ragged<Id>) -> Ragged<Id> {
    let nboxes = tree.nboxes();
    let ragged = build_ragged_seq::<Id>(
        nboxes,
        |b| {
            let mut count = 0usize;
            sep_siblings_of(tree, Id::from_usize(b), colleagues, |_| count += 1);
            count
        },
        |b, push| sep_siblings_of(tree, Id::from_usize(b), colleagues, |c| push(c)),
    );
    log::debug!("sep_siblings: {} total entries over {} boxes", ragged.lists.len(), nboxes);
    ragged
}

/// Parallel counterpart of [`build_list2_seq`].
pub fn build_list2_par<Id: BoxId, C: Coord, const D: usize>(tree: &Tree<Id, C, D>, colleagues: &Ragged<Id>) -> Ragged<Id> {
    let nboxes = tree.nboxes();
    let ragged = build_ragged_par::<Id>(
        nboxes,
        |b| {
            let mut count = 0usize;
            sep_siblings_of(tree, Id::from_usize(b), colleagues, |_| count += 1);
            count
        },
        |b, push| sep_siblings_of(tree, Id::from_usize(b), colleagues, |c| push(c)),
    );
    log::debug!("sep_siblings: {} total entries over {} boxes", ragged.lists.len(), nboxes);
    ragged
}
