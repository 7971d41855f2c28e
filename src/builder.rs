//! The top-level entry point, following the 6-stage pipeline of
//! `FMMTraversalBuilder.__call__` in the source: validate, split
//! leaves/parents, colleagues, Lists 1-4, then extract per-level start
//! indices into the parent-box arrays.

use crate::colleagues::{build_colleagues_par, build_colleagues_seq};
use crate::config::TraversalConfig;
use crate::error::TraversalError;
use crate::leaves_parents::split_leaves_and_parents;
use crate::level_starts::parent_box_level_starts;
use crate::list1::{build_list1_par, build_list1_seq};
use crate::list2::{build_list2_par, build_list2_seq};
use crate::list3_list4::{build_list3_par, build_list3_seq, transpose_to_list4};
use crate::number::{BoxId, Coord};
use crate::ragged::Ragged;
use crate::tree::Tree;

/// Everything the traversal builder produces from a tree.
#[derive(Debug, Clone)]
pub struct TraversalInfo<Id: BoxId> {
    /// Box ids with no children, in ascending order.
    pub leaves: Vec<Id>,
    /// Box ids with at least one child, in ascending order.
    pub parents: Vec<Id>,
    /// Colleagues of every box, indexed by box id.
    pub colleagues: Ragged<Id>,
    /// List 1 (neighbor leaves), indexed by position in `leaves`.
    pub neighbor_leaves: Ragged<Id>,
    /// List 2 (separated siblings), indexed by box id.
    pub sep_siblings: Ragged<Id>,
    /// List 3 (separated smaller non-siblings), indexed by position in
    /// `leaves`.
    pub sep_smaller_nonsiblings: Ragged<Id>,
    /// List 4 (separated bigger non-siblings), indexed by box id.
    pub sep_bigger_nonsiblings: Ragged<Id>,
    /// `parent_box_level_starts[nlevels + 1]`: level boundaries within
    /// `parents`.
    pub parent_box_level_starts: Vec<usize>,
}

/// Validates the tree's preconditions (the builder refuses to run on an
/// unpruned tree) and, if they hold, runs every pipeline stage.
pub struct TraversalBuilder {
    config: TraversalConfig,
}

impl TraversalBuilder {
    /// Creates a builder with the given configuration.
    pub fn new(config: TraversalConfig) -> Self {
        Self { config }
    }

    /// The configuration this builder was constructed with.
    pub fn config(&self) -> &TraversalConfig {
        &self.config
    }

    /// Runs the full pipeline sequentially.
    pub fn build_seq<Id: BoxId, C: Coord, const D: usize>(&self, tree: &Tree<Id, C, D>) -> Result<TraversalInfo<Id>, TraversalError> {
        self.validate(tree)?;

        log::debug!("traversal: building sequentially over {} boxes", tree.nboxes());

        let split = split_leaves_and_parents(tree);
        let colleagues = build_colleagues_seq(tree)?;
        let neighbor_leaves = build_list1_seq(tree, &split.leaves)?;
        let sep_siblings = build_list2_seq(tree, &colleagues);
        let sep_smaller_nonsiblings = build_list3_seq(tree, &split.leaves, &colleagues)?;
        let sep_bigger_nonsiblings = transpose_to_list4(&sep_smaller_nonsiblings, &split.leaves, tree.nboxes());
        let parent_box_level_starts = parent_box_level_starts(&split.parents, tree_box_levels(tree), tree.level_starts(), tree.nlevels());

        Ok(TraversalInfo {
            leaves: split.leaves,
            parents: split.parents,
            colleagues,
            neighbor_leaves,
            sep_siblings,
            sep_smaller_nonsiblings,
            sep_bigger_nonsiblings,
            parent_box_level_starts,
        })
    }

    /// Runs the full pipeline with `rayon`-parallel list construction
    /// stages: each stage is data-parallel over box or leaf id.
    pub fn build_par<Id: BoxId, C: Coord, const D: usize>(&self, tree: &Tree<Id, C, D>) -> Result<TraversalInfo<Id>, TraversalError> {
        self.validate(tree)?;

        log::debug!("traversal: building in parallel over {} boxes", tree.nboxes());

        let split = split_leaves_and_parents(tree);
        let colleagues = build_colleagues_par(tree)?;

        // List 3 depends on colleagues; List 1, List 2 and List 3 are
        // otherwise independent of each other. `rayon::join` runs two at a
        // time without spinning up a full thread-pool scope for three.
        let (neighbor_leaves, (sep_siblings, sep_smaller_nonsiblings)): (Result<Ragged<Id>, TraversalError>, (Ragged<Id>, Result<Ragged<Id>, TraversalError>)) = rayon::join(
            || build_list1_par(tree, &split.leaves),
            || rayon::join(|| build_list2_par(tree, &colleagues), || build_list3_par(tree, &split.leaves, &colleagues)),
        );
        let neighbor_leaves = neighbor_leaves?;
        let sep_smaller_nonsiblings = sep_smaller_nonsiblings?;

        let sep_bigger_nonsiblings = transpose_to_list4(&sep_smaller_nonsiblings, &split.leaves, tree.nboxes());
        let parent_box_level_starts = parent_box_level_starts(&split.parents, tree_box_levels(tree), tree.level_starts(), tree.nlevels());

        Ok(TraversalInfo {
            leaves: split.leaves,
            parents: split.parents,
            colleagues,
            neighbor_leaves,
            sep_siblings,
            sep_smaller_nonsiblings,
            sep_bigger_nonsiblings,
            parent_box_level_starts,
        })
    }

    fn validate<Id: BoxId, C: Coord, const D: usize>(&self, tree: &Tree<Id, C, D>) -> Result<(), TraversalError> {
        if !tree.is_pruned() {
            return Err(TraversalError::InvalidInput("tree must be pruned before traversal lists can be built".to_string()));
        }
        Ok(())
    }
}

impl Default for TraversalBuilder {
    fn default() -> Self {
        Self::new(TraversalConfig::default())
    }
}

/// `Tree` doesn't expose `box_levels` as a public slice (only per-box
/// accessors), but [`parent_box_level_starts`] needs to scan it in bulk;
/// reconstruct it once here rather than widen the `Tree` API for a single
/// internal caller.
fn tree_box_levels<Id: BoxId, C: Coord, const D: usize>(tree: &Tree<Id, C, D>) -> &[u8] {
    tree.box_levels_slice()
}
