//! Numeric traits used to keep the builder generic over id width and
//! coordinate precision, the way `core::cluster` keeps `Cluster` generic
//! over `Number` instead of hard-coding `f32`/`f64`/`u32`/`u64`.

use num_traits::{Float, NumCast, PrimInt, Unsigned};

/// A box or leaf id. Implemented for `u32` and `u64`, mirroring the
/// `box_id_dtype` parameter of the source's kernel templates.
pub trait BoxId: PrimInt + Unsigned + Default + std::hash::Hash + Send + Sync + std::fmt::Debug + 'static {
    /// Converts to `usize` for use as an array index.
    fn as_usize(self) -> usize;

    /// Converts a `usize` index back to this id type.
    fn from_usize(value: usize) -> Self;
}

impl BoxId for u32 {
    fn as_usize(self) -> usize {
        self as usize
    }

    fn from_usize(value: usize) -> Self {
        value as Self
    }
}

impl BoxId for u64 {
    fn as_usize(self) -> usize {
        self as usize
    }

    fn from_usize(value: usize) -> Self {
        value as Self
    }
}

/// A coordinate / extent type, i.e. `coord_dtype` in the source. `f32` and
/// `f64` both implement this.
pub trait Coord: Float + NumCast + Send + Sync + std::fmt::Debug + 'static {}

impl Coord for f32 {}
impl Coord for f64 {}
