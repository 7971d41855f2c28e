//! The ragged (list-of-lists) output primitive shared by every
//! list-construction stage, a from-scratch re-implementation of the source's
//! `ListOfListsBuilder` using a two-pass count/scan/fill discipline instead
//! of an OpenCL kernel-generation scheme.

use rayon::prelude::*;

/// A ragged array: `starts[n+1]` offsets into a flat `lists` buffer, with
/// entries for index `i` occupying `lists[starts[i]..starts[i+1]]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ragged<T> {
    /// Exclusive-scan offsets, length `n + 1`. `starts[0] == 0` and
    /// `starts[n] == lists.len()`.
    pub starts: Vec<usize>,
    /// The flattened per-index output, in ascending-index order.
    pub lists: Vec<T>,
}

impl<T> Ragged<T> {
    /// Entries for index `i`.
    pub fn get(&self, i: usize) -> &[T] {
        &self.lists[self.starts[i]..self.starts[i + 1]]
    }
}

/// Builds a ragged array sequentially with a two-pass count-then-fill
/// discipline: first invoke `count(i)` for every `i` in `0..n`,
/// exclusive-scan into `starts`, then invoke `emit(i, push)` for every `i`,
/// where `push` appends into this index's reserved slice.
pub fn build_ragged_seq<T: Clone + Default>(
    n: usize,
    count: impl Fn(usize) -> usize,
    mut emit: impl FnMut(usize, &mut dyn FnMut(T)),
) -> Ragged<T> {
    let mut starts = Vec::with_capacity(n + 1);
    starts.push(0usize);
    for i in 0..n {
        let c = count(i);
        starts.push(starts[i] + c);
    }

    let total = starts[n];
    let mut lists: Vec<T> = vec![T::default(); total];

    for i in 0..n {
        let mut local = starts[i];
        let end = starts[i + 1];
        let mut push = |value: T| {
            assert!(local < end, "emit() produced more entries than count() promised for index {i}");
            lists[local] = value;
            local += 1;
        };
        emit(i, &mut push);
        debug_assert_eq!(local, end, "emit() produced fewer entries than count() promised for index {i}");
    }

    Ragged { starts, lists }
}

/// Parallel counterpart of [`build_ragged_seq`], using `rayon` for both
/// passes, following the `par_partition`/`.par_iter()` convention used
/// throughout this crate family for data-parallel stages.
pub fn build_ragged_par<T: Clone + Default + Send + Sync>(
    n: usize,
    count: impl Fn(usize) -> usize + Sync,
    emit: impl Fn(usize, &mut dyn FnMut(T)) + Sync,
) -> Ragged<T> {
    let counts: Vec<usize> = (0..n).into_par_iter().map(&count).collect();
    let mut starts = Vec::with_capacity(n + 1);
    starts.push(0usize);
    for c in &counts {
        starts.push(starts.last().copied().unwrap() + c);
    }

    let total = starts[n];
    let mut lists: Vec<T> = vec![T::default(); total];

    // Fill each index's reserved, disjoint sub-slice in parallel.
    let slices = split_at_starts(&mut lists, &starts);
    slices
        .into_par_iter()
        .enumerate()
        .for_each(|(i, slot)| {
            let mut local = 0usize;
            let mut push = |value: T| {
                assert!(
                    local < slot.len(),
                    "emit() produced more entries than count() promised for index {i}"
                );
                slot[local] = value;
                local += 1;
            };
            emit(i, &mut push);
            debug_assert_eq!(local, slot.len(), "emit() produced fewer entries than count() promised for index {i}");
        });

    Ragged { starts, lists }
}

/// Splits `lists` into `n` disjoint mutable sub-slices at the offsets in
/// `starts` (length `n + 1`), so that independent rayon tasks can each write
/// their own reserved region without synchronization.
fn split_at_starts<'a, T>(lists: &'a mut [T], starts: &[usize]) -> Vec<&'a mut [T]> {
    let mut slices = Vec::with_capacity(starts.len() - 1);
    let mut rest = lists;
    let mut prev = 0usize;
    for &next in &starts[1..] {
        let (head, tail) = rest.split_at_mut(next - prev);
        slices.push(head);
        rest = tail;
        prev = next;
    }
    slices
}
