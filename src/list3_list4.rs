//! Stage 4-5: List 3, separated smaller non-siblings, ported from
//! `SEP_SMALLER_NONSIBLINGS_TEMPLATE`, and its transpose into List 4,
//! separated bigger non-siblings, ported from the source's use of
//! `KeyValueSorter` in `FMMTraversalBuilder.__call__`.

use crate::adjacency::is_adjacent_or_overlapping;
use crate::error::TraversalError;
use crate::number::{BoxId, Coord};
use crate::ragged::{build_ragged_par, build_ragged_seq, Ragged};
use crate::tree::Tree;
use crate::walk::Walk;

/// Finds List 3 for a single leaf: boxes smaller than (strictly deeper
/// than) and well-separated from `leaf_box_id`, reached by descending
/// through its colleagues' subtrees.
///
/// A colleague's child that is still adjacent to the leaf is either a
/// leaf itself (already covered by List 1) or has children worth
/// descending into further; a child that is *not* adjacent is emitted and
/// not descended into; its own descendants are smaller still, but their
/// multipole expansion is already fully represented by this coarser box.
fn sep_smaller_nonsiblings_of<Id: BoxId, C: Coord, const D: usize>(
    tree: &Tree<Id, C, D>,
    leaf_box_id: Id,
    colleagues: &Ragged<Id>,
    max_levels: usize,
    mut emit: impl FnMut(Id),
) -> Result<(), TraversalError> {
    let level = tree.level(leaf_box_id);
    let center = tree.center(leaf_box_id);
    let children_per_box = Tree::<Id, C, D>::CHILDREN_PER_BOX;

    for &colleague in colleagues.get(leaf_box_id.as_usize()) {
        if !tree.has_children(colleague) {
            continue;
        }

        let mut walk = Walk::new(colleague, max_levels);
        while walk.continue_walk {
            if let Some(child) = tree.child(walk.box_id, walk.morton_nr) {
                if is_adjacent_or_overlapping(tree, &center, level, child) {
                    if tree.has_children(child) {
                        walk.push(child)?;
                        continue;
                    }
                } else {
                    emit(child);
                }
            }
            walk.advance(children_per_box);
        }
    }

    Ok(())
}

/// Builds List 3 for every leaf (sequential). `colleagues` must be the
/// output of [`crate::colleagues::build_colleagues_seq`] for the same
/// tree.
pub fn build_list3_seq<Id: BoxId, C: Coord, const D: usize>(
    tree: &Tree<Id, C, D>,
    leaves: &[Id],
    colleagues: &Ragged<Id>,
) -> Result<Ragged<Id>, TraversalError> {
    let max_levels = crate::walk::nlevels_for(tree.nlevels());
    let nleaves = leaves.len();

    let mut error = None;
    let ragged = build_ragged_seq::<Id>(
        nleaves,
        |l| {
            let mut count = 0usize;
            let _ = sep_smaller_nonsiblings_of(tree, leaves[l], colleagues, max_levels, |_| count += 1);
            count
        },
        |l, push| {
            if let Err(e) = sep_smaller_nonsiblings_of(tree, leaves[l], colleagues, max_levels, |c| push(c)) {
                error = Some(e);
            }
        },
    );

    match error {
        Some(e) => Err(e),
        None => {
            log::debug!("sep_smaller_nonsiblings: {} total entries over {} leaves", ragged.lists.len(), nleaves);
            Ok(ragged)
        }
    }
}

/// Parallel counterpart of [`build_list3_seq`].
pub fn build_list3_par<Id: BoxId, C: Coord, const D: usize>(
    tree: &Tree<Id, C, D>,
    leaves: &[Id],
    colleagues: &Ragged<Id>,
) -> Result<Ragged<Id>, TraversalError> {
    let max_levels = crate::walk::nlevels_for(tree.nlevels());
    let nleaves = leaves.len();

    for &leaf in leaves {
        let mut count = 0usize;
        sep_smaller_nonsiblings_of(tree, leaf, colleagues, max_levels, |_| count += 1)?;
    }

    let ragged = build_ragged_par::<Id>(
        nleaves,
        |l| {
            let mut count = 0usize;
            let _ = sep_smaller_nonsiblings_of(tree, leaves[l], colleagues, max_levels, |_| count += 1);
            count
        },
        |l, push| {
            let _ = sep_smaller_nonsiblings_of(tree, leaves[l], colleagues, max_levels, |c| push(c));
        },
    );

    log::debug!("sep_smaller_nonsiblings: {} total entries over {} leaves", ragged.lists.len(), nleaves);
    Ok(ragged)
}

/// Transposes List 3 into List 4: List 3 is keyed by leaf and lists the
/// smaller separated boxes that interact with it; List 4 is
/// keyed by box id (entries of List 3 can themselves be internal boxes,
/// not only leaves) and lists the leaves that named this box in their
/// List 3.
///
/// Implemented as a counting-sort bucket transpose rather than a
/// comparison sort, since the key range is exactly `0..nboxes`.
pub fn transpose_to_list4<Id: BoxId>(list3: &Ragged<Id>, leaves: &[Id], nboxes: usize) -> Ragged<Id> {
    let mut counts = vec![0usize; nboxes];
    for &source in &list3.lists {
        counts[source.as_usize()] += 1;
    }

    let mut starts = Vec::with_capacity(nboxes + 1);
    starts.push(0usize);
    for &c in &counts {
        starts.push(starts.last().copied().unwrap() + c);
    }

    let total = starts[nboxes];
    let mut lists = vec![Id::default(); total];
    let mut cursor = starts.clone();

    for (l, &leaf) in leaves.iter().enumerate() {
        for &source in list3.get(l) {
            let b = source.as_usize();
            lists[cursor[b]] = leaf;
            cursor[b] += 1;
        }
    }

    log::debug!("sep_bigger_nonsiblings: {} total entries over {} boxes", lists.len(), nboxes);
    Ragged { starts, lists }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colleagues::build_colleagues_seq;
    use crate::leaves_parents::split_leaves_and_parents;
    use crate::tree::flags;

    /// Three levels of adaptive refinement along one corner: root (0) with
    /// uniform children 1-4; box 1 further split into 5-8; box 5 (the
    /// child of box 1 farthest from box 4, across the root's diagonal)
    /// further split into 9-12. Box 4's colleagues are 1, 2 and 3; only
    /// box 1 has children, so the walk descends through 5-8 and, at box
    /// 5, one level further into 9-12. By that point the boxes are small
    /// enough, and far enough from box 4, to fall outside the adjacency
    /// slack - box 9, 10 and 11 are separated from box 4, while box 12
    /// (the corner of box 5 nearest box 4) still touches it.
    fn adaptive_tree() -> Tree<u32, f64, 2> {
        let nboxes = 13;
        let mut centers = vec![vec![0.0; nboxes]; 2];
        let top_offsets = [[-0.25, -0.25], [0.25, -0.25], [-0.25, 0.25], [0.25, 0.25]];
        for (morton, offset) in top_offsets.iter().enumerate() {
            centers[0][morton + 1] = offset[0];
            centers[1][morton + 1] = offset[1];
        }
        let mid_offsets = [[-0.375, -0.375], [-0.125, -0.375], [-0.375, -0.125], [-0.125, -0.125]];
        for (morton, offset) in mid_offsets.iter().enumerate() {
            centers[0][5 + morton] = offset[0];
            centers[1][5 + morton] = offset[1];
        }
        let deep_offsets = [[-0.4375, -0.4375], [-0.3125, -0.4375], [-0.4375, -0.3125], [-0.3125, -0.3125]];
        for (morton, offset) in deep_offsets.iter().enumerate() {
            centers[0][9 + morton] = offset[0];
            centers[1][9 + morton] = offset[1];
        }

        let mut child_ids = vec![vec![0u32; nboxes]; 4];
        for morton in 0..4 {
            child_ids[morton][0] = (morton + 1) as u32;
            child_ids[morton][1] = (5 + morton) as u32;
            child_ids[morton][5] = (9 + morton) as u32;
        }

        let mut box_levels = vec![0u8; nboxes];
        let mut box_parent_ids = vec![0u32; nboxes];
        let mut box_flags = vec![0u8; nboxes];
        box_flags[0] = flags::HAS_CHILDREN;
        for b in 1..=4usize {
            box_levels[b] = 1;
            box_parent_ids[b] = 0;
            box_flags[b] = flags::HAS_SOURCES | flags::HAS_TARGETS;
        }
        box_flags[1] = flags::HAS_CHILDREN;
        for b in 5..9usize {
            box_levels[b] = 2;
            box_parent_ids[b] = 1;
            box_flags[b] = flags::HAS_SOURCES | flags::HAS_TARGETS;
        }
        box_flags[5] = flags::HAS_CHILDREN;
        for b in 9..13usize {
            box_levels[b] = 3;
            box_parent_ids[b] = 5;
            box_flags[b] = flags::HAS_SOURCES | flags::HAS_TARGETS;
        }

        Tree::new(nboxes, 4, nboxes, 1.0, centers, box_levels, box_parent_ids, child_ids, box_flags, vec![0, 1, 5, 9, 13], true)
    }

    #[test]
    fn deep_corner_boxes_separated_from_diagonal_leaf_via_list3() {
        let tree = adaptive_tree();
        let split = split_leaves_and_parents(&tree);
        let colleagues = build_colleagues_seq(&tree).unwrap();
        let list3 = build_list3_seq(&tree, &split.leaves, &colleagues).unwrap();

        let leaf_index_of_box4 = split.leaves.iter().position(|&b| b == 4).unwrap();
        let mut entries = list3.get(leaf_index_of_box4).to_vec();
        entries.sort_unstable();
        assert_eq!(entries, vec![9, 10, 11], "box 4 should see exactly the three far corner descendants of box 1, not box 12 (still adjacent)");
    }

    #[test]
    fn every_list3_entry_is_separated_and_not_itself_a_colleague() {
        let tree = adaptive_tree();
        let split = split_leaves_and_parents(&tree);
        let colleagues = build_colleagues_seq(&tree).unwrap();
        let list3 = build_list3_seq(&tree, &split.leaves, &colleagues).unwrap();

        for (l, &leaf) in split.leaves.iter().enumerate() {
            let center = tree.center(leaf);
            let level = tree.level(leaf);
            for &entry in list3.get(l) {
                assert!(!is_adjacent_or_overlapping(&tree, &center, level, entry));
                assert!(!colleagues.get(leaf.as_usize()).contains(&entry));
            }
        }
    }

    #[test]
    fn list4_is_the_exact_transpose_of_list3() {
        let tree = adaptive_tree();
        let split = split_leaves_and_parents(&tree);
        let colleagues = build_colleagues_seq(&tree).unwrap();
        let list3 = build_list3_seq(&tree, &split.leaves, &colleagues).unwrap();
        let list4 = transpose_to_list4(&list3, &split.leaves, tree.nboxes());

        for (l, &leaf) in split.leaves.iter().enumerate() {
            for &source in list3.get(l) {
                assert!(list4.get(source.as_usize()).contains(&leaf), "leaf {leaf} -> source {source} must transpose into list4({source}) containing {leaf}");
            }
        }

        let list3_total: usize = list3.lists.len();
        let list4_total: usize = list4.lists.len();
        assert_eq!(list3_total, list4_total);
    }

    #[test]
    fn seq_and_par_agree() {
        let tree = adaptive_tree();
        let split = split_leaves_and_parents(&tree);
        let colleagues = build_colleagues_seq(&tree).unwrap();
        let seq = build_list3_seq(&tree, &split.leaves, &colleagues).unwrap();
        let par = build_list3_par(&tree, &split.leaves, &colleagues).unwrap();
        assert_eq!(seq.starts, par.starts);
        for i in 0..split.leaves.len() {
            let mut s = seq.get(i).to_vec();
            let mut p = par.get(i).to_vec();
            s.sort_unstable();
            p.sort_unstable();
            assert_eq!(s, p);
        }
    }
}
