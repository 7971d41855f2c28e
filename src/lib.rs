#![warn(missing_docs, clippy::all, clippy::suspicious, clippy::style, clippy::complexity, clippy::perf)]

//! Builds the colleague and interaction lists (Lists 1-4) a fast multipole
//! method needs to evaluate an adaptive, pruned octree (or quadtree, or
//! binary tree): for every box, which same-level boxes are adjacent to it,
//! and for every leaf, which other leaves and out-of-level boxes it must
//! interact with directly, via a local expansion, or via a multipole
//! expansion.
//!
//! The entry point is [`builder::TraversalBuilder`]; it consumes a
//! [`tree::Tree`] and produces a [`builder::TraversalInfo`].

pub mod adjacency;
pub mod builder;
pub mod colleagues;
pub mod config;
pub mod error;
pub mod leaves_parents;
pub mod level_starts;
pub mod list1;
pub mod list2;
pub mod list3_list4;
pub mod number;
pub mod ragged;
pub mod tree;
pub mod walk;

pub use builder::{TraversalBuilder, TraversalInfo};
pub use config::TraversalConfig;
pub use error::TraversalError;
pub use number::{BoxId, Coord};
pub use tree::Tree;
