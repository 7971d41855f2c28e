//! The read-only tree consumed by the traversal builder.
//!
//! Construction of the tree itself (particles -> boxes -> parent/child/level
//! arrays) is out of scope here; this module only describes the shape the
//! builder expects to find, plus the flag bits it reads.

use crate::number::{BoxId, Coord};

/// Bitmask flags carried per box. Exact bit positions are tree-defined; the
/// builder only ever reads these through bitwise AND, mirroring
/// `box_flags_enum` in the source.
pub mod flags {
    /// The box has at least one child.
    pub const HAS_CHILDREN: u8 = 1 << 0;
    /// The box has sources associated with it (directly, not in descendants).
    pub const HAS_SOURCES: u8 = 1 << 1;
    /// The box has targets associated with it.
    pub const HAS_TARGETS: u8 = 1 << 2;
}

/// A pruned, balanced-or-unbalanced spatial tree of boxes in `D`-dimensional
/// space, as produced by an (external) tree-construction stage.
///
/// All arrays are indexed by box id, `0 <= b < nboxes`, except
/// `box_centers` and `box_child_ids`, which are strided by `aligned_nboxes`
/// to mirror the source's GPU-friendly layout.
#[derive(Debug, Clone)]
pub struct Tree<Id: BoxId, C: Coord, const D: usize> {
    nboxes: usize,
    nlevels: usize,
    aligned_nboxes: usize,
    root_extent: C,
    /// `box_centers[axis][aligned_nboxes]`, column-major by axis.
    box_centers: Vec<Vec<C>>,
    box_levels: Vec<u8>,
    box_parent_ids: Vec<Id>,
    /// `box_child_ids[morton][aligned_nboxes]`, `0` meaning "no child".
    box_child_ids: Vec<Vec<Id>>,
    box_flags: Vec<u8>,
    level_starts: Vec<Id>,
    is_pruned: bool,
}

impl<Id: BoxId, C: Coord, const D: usize> Tree<Id, C, D> {
    /// Number of children per box, `2^D`.
    pub const CHILDREN_PER_BOX: usize = 1 << D;

    /// Constructs a tree from its flat arrays.
    ///
    /// # Panics
    ///
    /// If any array's length is inconsistent with `nboxes`/`aligned_nboxes`/
    /// `nlevels`, or `D` is not in `1..=3`. These are considered
    /// caller/construction-stage bugs, not runtime input errors, since the
    /// (out-of-scope) tree builder is responsible for handing over
    /// consistently-shaped arrays; see [`crate::error::TraversalError`] for
    /// the checks the traversal builder itself performs on a well-formed
    /// tree.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        nboxes: usize,
        nlevels: usize,
        aligned_nboxes: usize,
        root_extent: C,
        box_centers: Vec<Vec<C>>,
        box_levels: Vec<u8>,
        box_parent_ids: Vec<Id>,
        box_child_ids: Vec<Vec<Id>>,
        box_flags: Vec<u8>,
        level_starts: Vec<Id>,
        is_pruned: bool,
    ) -> Self {
        assert!((1..=3).contains(&D), "dimensions must be 1, 2, or 3, got {D}");
        assert!(aligned_nboxes >= nboxes, "aligned_nboxes must be >= nboxes");
        assert_eq!(box_centers.len(), D, "expected one row of centers per axis");
        for axis in &box_centers {
            assert_eq!(axis.len(), aligned_nboxes);
        }
        assert_eq!(box_levels.len(), nboxes);
        assert_eq!(box_parent_ids.len(), nboxes);
        assert_eq!(box_child_ids.len(), Self::CHILDREN_PER_BOX);
        for morton in &box_child_ids {
            assert_eq!(morton.len(), aligned_nboxes);
        }
        assert_eq!(box_flags.len(), nboxes);
        assert_eq!(level_starts.len(), nlevels + 1);

        Self {
            nboxes,
            nlevels,
            aligned_nboxes,
            root_extent,
            box_centers,
            box_levels,
            box_parent_ids,
            box_child_ids,
            box_flags,
            level_starts,
            is_pruned,
        }
    }

    /// Total number of boxes.
    pub fn nboxes(&self) -> usize {
        self.nboxes
    }

    /// Number of levels; the root is level 0 and the deepest level is
    /// `nlevels - 1`.
    pub fn nlevels(&self) -> usize {
        self.nlevels
    }

    /// Stride used to index into `box_centers`/`box_child_ids`.
    pub fn aligned_nboxes(&self) -> usize {
        self.aligned_nboxes
    }

    /// Side length of the root box.
    pub fn root_extent(&self) -> C {
        self.root_extent
    }

    /// Whether the tree has no empty trailing boxes. The traversal builder
    /// refuses to run on an unpruned tree.
    pub fn is_pruned(&self) -> bool {
        self.is_pruned
    }

    /// Side length at the given level: `root_extent / 2^level`.
    pub fn level_size(&self, level: u8) -> C {
        self.root_extent / C::from(1u64 << level).expect("level fits in coordinate type")
    }

    /// Level of the given box.
    pub fn level(&self, box_id: Id) -> u8 {
        self.box_levels[box_id.as_usize()]
    }

    /// Center coordinates of the given box, one per axis.
    pub fn center(&self, box_id: Id) -> [C; D] {
        let b = box_id.as_usize();
        let mut center = [C::zero(); D];
        for (axis, slot) in center.iter_mut().enumerate() {
            *slot = self.box_centers[axis][b];
        }
        center
    }

    /// Parent id of the given box. The root is its own parent.
    pub fn parent(&self, box_id: Id) -> Id {
        self.box_parent_ids[box_id.as_usize()]
    }

    /// Whether `box_id` is the root (id `0`).
    pub fn is_root(&self, box_id: Id) -> bool {
        box_id.as_usize() == 0
    }

    /// The child of `box_id` at the given Morton index, or `None` if absent.
    ///
    /// A stored `0` always means "no child": box `0` is the root and never
    /// appears as anyone's child.
    pub fn child(&self, box_id: Id, morton_nr: usize) -> Option<Id> {
        let child = self.box_child_ids[morton_nr][box_id.as_usize()];
        if child.as_usize() == 0 {
            None
        } else {
            Some(child)
        }
    }

    /// Flags for the given box.
    pub fn flags(&self, box_id: Id) -> u8 {
        self.box_flags[box_id.as_usize()]
    }

    /// Whether the box has children.
    pub fn has_children(&self, box_id: Id) -> bool {
        self.flags(box_id) & flags::HAS_CHILDREN != 0
    }

    /// Whether the box carries sources.
    pub fn has_sources(&self, box_id: Id) -> bool {
        self.flags(box_id) & flags::HAS_SOURCES != 0
    }

    /// Whether the box carries targets.
    pub fn has_targets(&self, box_id: Id) -> bool {
        self.flags(box_id) & flags::HAS_TARGETS != 0
    }

    /// First box id at each level, length `nlevels + 1`.
    pub fn level_starts(&self) -> &[Id] {
        &self.level_starts
    }

    /// The full `box_levels` array, indexed by box id.
    pub fn box_levels_slice(&self) -> &[u8] {
        &self.box_levels
    }

    /// Iterates all box ids `0..nboxes`.
    pub fn box_ids(&self) -> impl Iterator<Item = Id> + '_ {
        (0..self.nboxes).map(Id::from_usize)
    }
}
