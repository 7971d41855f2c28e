//! Stage 1: partition boxes into leaves and parents, ported from
//! `LEAVES_AND_PARENTS_TEMPLATE` in the source.

use crate::number::BoxId;
use crate::tree::Tree;

/// The output of the leaves/parents split: a disjoint partition of
/// `{0, ..., nboxes - 1}` by `HAS_CHILDREN`, each list stable in ascending
/// box-id order.
#[derive(Debug, Clone)]
pub struct LeavesAndParents<Id: BoxId> {
    /// Box ids of childless boxes.
    pub leaves: Vec<Id>,
    /// Box ids of boxes with children.
    pub parents: Vec<Id>,
}

/// Splits every box into `leaves` or `parents` by `HAS_CHILDREN`. This is
/// data-parallel over `box_id`, but the result order must stay stable by
/// `b`, so we keep it a single sequential pass: `Cluster::subtree`/
/// `leaf_indices` traversals elsewhere in this crate family are likewise
/// plain sequential scans rather than `rayon`-parallelized, since the win
/// from parallelizing a single `O(nboxes)` scan is marginal next to the
/// later, genuinely expensive descent-based stages.
pub fn split_leaves_and_parents<Id: BoxId, C: crate::number::Coord, const D: usize>(
    tree: &Tree<Id, C, D>,
) -> LeavesAndParents<Id> {
    let mut leaves = Vec::new();
    let mut parents = Vec::new();

    for box_id in tree.box_ids() {
        if tree.has_children(box_id) {
            parents.push(box_id);
        } else {
            leaves.push(box_id);
        }
    }

    log::debug!("leaves_and_parents: {} leaves, {} parents", leaves.len(), parents.len());

    LeavesAndParents { leaves, parents }
}
