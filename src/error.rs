//! Error types for the traversal builder.
//!
//! Following `core/dataset/arrow_dataset/io.rs`'s approach of returning
//! `Result<_, Box<dyn std::error::Error>>` rather than reaching for a
//! derive-macro error crate, the builder defines a small hand-written error
//! enum and implements `std::error::Error` for it directly.

use std::fmt;

/// Failure modes of [`crate::builder::TraversalBuilder`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraversalError {
    /// A precondition on the input tree was violated: it was not pruned, or
    /// a required flag bit was not set up consistently.
    InvalidInput(String),

    /// The walk kernel's stack would have to grow past `NLEVELS` to
    /// represent the requested descent. This means `NLEVELS` was sized
    /// smaller than `tree.nlevels + 1`, which is a configuration bug.
    TreeTooDeep {
        /// The configured stack depth.
        max_levels: usize,
        /// The depth that would have been required.
        needed: usize,
    },

    /// An output buffer could not be allocated.
    OutOfMemory,
}

impl fmt::Display for TraversalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidInput(msg) => write!(f, "invalid input tree: {msg}"),
            Self::TreeTooDeep { max_levels, needed } => write!(
                f,
                "tree is deeper than the configured walk stack (NLEVELS = {max_levels}, needed at least {needed})"
            ),
            Self::OutOfMemory => write!(f, "failed to allocate traversal output buffers"),
        }
    }
}

impl std::error::Error for TraversalError {}
