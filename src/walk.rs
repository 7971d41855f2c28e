//! The stack-based tree-descent walk kernel shared by every list builder,
//! ported from the `walk_init`/`walk_advance`/`walk_push` Mako macros in the
//! source's `TRAVERSAL_PREAMBLE_TEMPLATE`.
//!
//! The source allocates two fixed-size `NLEVELS`-deep arrays per kernel
//! invocation for vectorization/GPU-porting reasons; we use growable `Vec`s
//! sized with `Vec::with_capacity(NLEVELS)`, which behave identically but
//! additionally let us report [`crate::error::TraversalError::TreeTooDeep`]
//! instead of silently overrunning a fixed buffer.

use crate::error::TraversalError;
use crate::number::BoxId;

/// `NLEVELS`, the walk stack's depth budget.
///
/// The source rounds up to a multiple of 10 so that code-generated kernels
/// are stable across trees of similar depth; lacking code generation, we
/// simply add headroom of `K = 2` to permit the pop-from-start-level
/// sentinel.
pub fn nlevels_for(nlevels: usize) -> usize {
    nlevels + 2
}

/// Mutable state of a single depth-first descent:
/// `(walk_level, walk_box_id, walk_morton_nr, continue_walk)` plus the two
/// backing stacks.
pub struct Walk<Id: BoxId> {
    box_stack: Vec<Id>,
    morton_nr_stack: Vec<usize>,
    max_levels: usize,
    start_level: usize,
    /// Current depth of the descent, relative to `start_level`.
    pub level: usize,
    /// The box currently being visited.
    pub box_id: Id,
    /// The Morton index of the next child to visit under `box_id`.
    pub morton_nr: usize,
    /// Whether the walk has more work to do.
    pub continue_walk: bool,
}

impl<Id: BoxId> Walk<Id> {
    /// Starts a new walk at `start_box_id`, with a stack budget of
    /// `max_levels` (see [`nlevels_for`]).
    pub fn new(start_box_id: Id, max_levels: usize) -> Self {
        log::trace!("walk_init: start_box_id={start_box_id:?} max_levels={max_levels}");
        Self {
            box_stack: Vec::with_capacity(max_levels),
            morton_nr_stack: Vec::with_capacity(max_levels),
            max_levels,
            start_level: 0,
            level: 0,
            box_id: start_box_id,
            morton_nr: 0,
            continue_walk: true,
        }
    }

    /// Pushes the current state and descends into `child`.
    ///
    /// # Errors
    ///
    /// Returns [`TraversalError::TreeTooDeep`] if the push would exceed the
    /// configured stack depth. This is a fatal tree-depth configuration
    /// error, not a recoverable per-box condition.
    pub fn push(&mut self, child: Id) -> Result<(), TraversalError> {
        if self.level >= self.max_levels {
            return Err(TraversalError::TreeTooDeep {
                max_levels: self.max_levels,
                needed: self.level + 1,
            });
        }
        log::trace!("walk_push: level={} box_id={:?} morton_nr={}", self.level, self.box_id, self.morton_nr);
        self.box_stack.push(self.box_id);
        self.morton_nr_stack.push(self.morton_nr);
        self.level += 1;
        self.box_id = child;
        self.morton_nr = 0;
        Ok(())
    }

    /// Advances to the next sibling, popping back up the stack (and
    /// possibly terminating the walk) when Morton indices are exhausted at
    /// the current level.
    pub fn advance(&mut self, children_per_box: usize) {
        loop {
            self.morton_nr += 1;
            if self.morton_nr < children_per_box {
                break;
            }

            self.continue_walk = self.level > self.start_level;
            if self.continue_walk {
                self.level -= 1;
                self.box_id = self.box_stack.pop().expect("stack matches walk_level");
                self.morton_nr = self.morton_nr_stack.pop().expect("stack matches walk_level");
                log::trace!("walk_advance: ascend to level={} box_id={:?}", self.level, self.box_id);
            } else {
                log::trace!("walk_advance: done");
                break;
            }
        }
    }
}
