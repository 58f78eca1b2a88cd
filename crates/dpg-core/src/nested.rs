//! Nested arrays of containers and their bottom-up release.
//!
//! A nested array is a tree of index levels. Each [`Level`] holds a buffer of
//! optional slots; `None` marks an element that was never constructed. Slots
//! are filled one at a time while a solver sets up its operators, and the
//! whole tree is released in one sweep with [`free_nested`]:
//!
//! ```
//! use dpg_core::container::{Layout, Matrix};
//! use dpg_core::nested::{free_nested, Level, Nested2};
//!
//! let mut ops: Nested2<Matrix<f64>> = Level::new(2).unwrap();
//! let mut inner = Level::new(3).unwrap();
//! inner.set(1, Matrix::zeros(2, 2, Layout::Col).unwrap()).unwrap();
//! ops.set(0, inner).unwrap();
//!
//! let stats = free_nested(&[2, 3], ops).unwrap();
//! assert_eq!(stats.leaves, 1);
//! assert_eq!(stats.skipped, 3);
//! ```
//!
//! The release consumes the root, so releasing twice or touching a released
//! element does not compile.

use core::mem;

use crate::Element;
use crate::container::{Matrix, Multiarray, Vector, VectorArray};
use crate::error::{CoreError, Result};
use crate::linalg::CsrOperator;

/// Deepest supported nesting.
pub const MAX_DEPTH: usize = 5;

/// Counters gathered during a release sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReleaseStats {
    /// Leaf payloads released.
    pub leaves: usize,
    /// Null slots skipped.
    pub skipped: usize,
    /// Index-level buffers released (the root included).
    pub levels: usize,
    /// Heap bytes released.
    pub bytes: usize,
}

/// State threaded through one release sweep.
#[derive(Debug, Default)]
pub struct Sweep {
    stats: ReleaseStats,
    error: Option<CoreError>,
}

impl Sweep {
    fn record(&mut self, err: CoreError) {
        if self.error.is_none() {
            self.error = Some(err);
        }
    }
}

/// Anything that can sit in a nested array.
///
/// Leaf payloads have `DEPTH == 0`; a [`Level`] of `N` has depth
/// `N::DEPTH + 1`.
pub trait Release: Sized {
    const DEPTH: usize;

    /// Heap bytes owned directly by this value (not by its children).
    fn heap_bytes(&self) -> usize;

    /// Release `self` and everything below it. `extents` describes this
    /// level and the ones beneath.
    fn release(self, extents: &[usize], sweep: &mut Sweep);
}

macro_rules! impl_release_leaf {
    ($($ty:ident),*) => {
        $(
            impl<T: Element> Release for $ty<T> {
                const DEPTH: usize = 0;

                fn heap_bytes(&self) -> usize {
                    self.data.capacity() * mem::size_of::<T>()
                }

                fn release(self, _extents: &[usize], sweep: &mut Sweep) {
                    sweep.stats.leaves += 1;
                    sweep.stats.bytes += self.heap_bytes();
                    self.destroy();
                }
            }
        )*
    };
}

impl_release_leaf!(Vector, Matrix, Multiarray);

impl<T: Element> Release for CsrOperator<T> {
    const DEPTH: usize = 0;

    fn heap_bytes(&self) -> usize {
        (self.row_index().len() + self.columns().len()) * mem::size_of::<usize>()
            + self.nnz() * mem::size_of::<T>()
    }

    fn release(self, _extents: &[usize], sweep: &mut Sweep) {
        sweep.stats.leaves += 1;
        sweep.stats.bytes += self.heap_bytes();
        self.destroy();
    }
}

impl<T: Element> Release for VectorArray<T> {
    const DEPTH: usize = 0;

    fn heap_bytes(&self) -> usize {
        self.data.capacity() * mem::size_of::<Vector<T>>()
            + self
                .data
                .iter()
                .map(|v| v.data.capacity() * mem::size_of::<T>())
                .sum::<usize>()
    }

    fn release(self, _extents: &[usize], sweep: &mut Sweep) {
        sweep.stats.leaves += 1;
        sweep.stats.bytes += self.heap_bytes();
        self.destroy();
    }
}

impl<T: Element> Release for Vec<T> {
    const DEPTH: usize = 0;

    fn heap_bytes(&self) -> usize {
        self.capacity() * mem::size_of::<T>()
    }

    fn release(self, _extents: &[usize], sweep: &mut Sweep) {
        sweep.stats.leaves += 1;
        sweep.stats.bytes += self.heap_bytes();
        drop(self);
    }
}

// ======================================================================
// Level
// ======================================================================

/// One index level of a nested array: a buffer of optional elements.
#[derive(Debug, Clone, PartialEq)]
pub struct Level<N> {
    slots: Vec<Option<N>>,
}

/// A nested array with one index level.
pub type Nested1<E> = Level<E>;
/// A nested array with two index levels.
pub type Nested2<E> = Level<Level<E>>;
/// A nested array with three index levels.
pub type Nested3<E> = Level<Level<Level<E>>>;
/// A nested array with four index levels.
pub type Nested4<E> = Level<Level<Level<Level<E>>>>;
/// A nested array with five index levels.
pub type Nested5<E> = Level<Level<Level<Level<Level<E>>>>>;

impl<N> Level<N> {
    /// A level of `len` unconstructed slots.
    pub fn new(len: usize) -> Result<Self> {
        let mut slots = Vec::new();
        slots
            .try_reserve_exact(len)
            .map_err(|e| CoreError::Allocation {
                container: "Level",
                extents: vec![len],
                reason: e.to_string(),
            })?;
        slots.resize_with(len, || None);
        Ok(Self { slots })
    }

    /// A level whose slot `i` is `f(i)`.
    pub fn from_fn<F>(len: usize, f: F) -> Result<Self>
    where
        F: FnMut(usize) -> Option<N>,
    {
        let mut level = Self::new(len)?;
        for (slot, value) in level.slots.iter_mut().zip((0..len).map(f)) {
            *slot = value;
        }
        Ok(level)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    fn index_error(&self, i: usize) -> CoreError {
        CoreError::Index {
            container: "Level",
            index: vec![i],
            extents: vec![self.len()],
        }
    }

    /// Construct slot `i`, returning the element it held before.
    pub fn set(&mut self, i: usize, value: N) -> Result<Option<N>> {
        let err = self.index_error(i);
        let slot = self.slots.get_mut(i).ok_or(err)?;
        Ok(slot.replace(value))
    }

    /// The element in slot `i`, if constructed.
    pub fn get(&self, i: usize) -> Option<&N> {
        self.slots.get(i).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, i: usize) -> Option<&mut N> {
        self.slots.get_mut(i).and_then(Option::as_mut)
    }

    /// Move the element out of slot `i`, leaving it unconstructed.
    pub fn take(&mut self, i: usize) -> Option<N> {
        self.slots.get_mut(i).and_then(Option::take)
    }

    pub fn is_constructed(&self, i: usize) -> bool {
        self.get(i).is_some()
    }

    /// Iterate over the slots; `None` for unconstructed ones.
    pub fn iter(&self) -> impl Iterator<Item = Option<&N>> {
        self.slots.iter().map(Option::as_ref)
    }
}

impl<N: Release> Release for Level<N> {
    const DEPTH: usize = N::DEPTH + 1;

    fn heap_bytes(&self) -> usize {
        self.slots.capacity() * mem::size_of::<Option<N>>()
    }

    fn release(self, extents: &[usize], sweep: &mut Sweep) {
        let (here, below) = match extents.split_first() {
            Some((&e, rest)) => (Some(e), rest),
            None => (None, extents),
        };
        if cfg!(debug_assertions) && here != Some(self.len()) {
            sweep.record(CoreError::invariant(
                "Level",
                format_args!("level holds {} slots, extents say {here:?}", self.len()),
            ));
        }
        let bytes = self.heap_bytes();
        // Children first; the slot buffer itself is freed when the iterator
        // is dropped.
        for slot in self.slots {
            match slot {
                Some(child) => child.release(below, sweep),
                None => sweep.stats.skipped += 1,
            }
        }
        sweep.stats.levels += 1;
        sweep.stats.bytes += bytes;
    }
}

/// Release a nested array bottom-up.
///
/// `extents` lists the length of each index level, outermost first. Null
/// slots are skipped without descending. With `debug_assertions` the extents
/// are checked against the tree; a mismatch is reported as
/// [`CoreError::InvariantViolation`] after the whole tree has been released.
pub fn free_nested<N: Release>(extents: &[usize], root: N) -> Result<ReleaseStats> {
    let mut sweep = Sweep::default();
    if cfg!(debug_assertions) && (extents.len() != N::DEPTH || N::DEPTH > MAX_DEPTH) {
        sweep.record(CoreError::invariant(
            "free_nested",
            format_args!(
                "{} extents for a nested array of depth {} (at most {MAX_DEPTH})",
                extents.len(),
                N::DEPTH
            ),
        ));
    }
    root.release(extents, &mut sweep);
    let stats = sweep.stats;
    tracing::debug!(
        depth = N::DEPTH,
        leaves = stats.leaves,
        skipped = stats.skipped,
        levels = stats.levels,
        bytes = stats.bytes,
        "released nested array"
    );
    match sweep.error {
        Some(err) => Err(err),
        None => Ok(stats),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::Layout;

    fn leaf(k: usize) -> Vector<f64> {
        Vector::filled(2, k as f64).unwrap()
    }

    #[test]
    fn test_depth_constants() {
        assert_eq!(<Vector<f64> as Release>::DEPTH, 0);
        assert_eq!(<Nested3<Vector<f64>> as Release>::DEPTH, 3);
        assert_eq!(<Nested5<Vec<i32>> as Release>::DEPTH, 5);
    }

    #[test]
    fn test_new_level_is_unconstructed() {
        let level: Nested1<Matrix<f64>> = Level::new(4).unwrap();
        assert_eq!(level.len(), 4);
        assert!(level.iter().all(|s| s.is_none()));
        assert!(!level.is_constructed(0));
    }

    #[test]
    fn test_set_get_take() {
        let mut level: Nested1<Vector<f64>> = Level::new(2).unwrap();
        assert!(level.set(0, leaf(1)).unwrap().is_none());
        assert!(level.set(2, leaf(1)).is_err());
        assert_eq!(level.get(0).unwrap()[0], 1.0);
        level.get_mut(0).unwrap()[1] = 5.0;
        let taken = level.take(0).unwrap();
        assert_eq!(taken.as_slice(), &[1.0, 5.0]);
        assert!(!level.is_constructed(0));
        assert!(level.take(7).is_none());
    }

    #[test]
    fn test_three_levels_with_null_leaves() {
        let mut k = 0;
        let root: Nested3<Vector<f64>> = Level::from_fn(2, |_| {
            Level::from_fn(3, |_| {
                Level::from_fn(4, |_| {
                    k += 1;
                    (k % 3 != 0).then(|| leaf(k))
                })
                .ok()
            })
            .ok()
        })
        .unwrap();
        let stats = free_nested(&[2, 3, 4], root).unwrap();
        assert_eq!(stats.leaves + stats.skipped, 24);
        assert_eq!(stats.skipped, 8);
        assert_eq!(stats.leaves, 16);
        assert_eq!(stats.levels, 1 + 2 + 6);
        assert!(stats.bytes >= 16 * 2 * mem::size_of::<f64>());
    }

    #[test]
    fn test_null_inner_level_is_not_descended() {
        let mut root: Nested2<Matrix<f64>> = Level::new(3).unwrap();
        let mut inner = Level::new(1).unwrap();
        inner.set(0, Matrix::zeros(2, 2, Layout::Col).unwrap()).unwrap();
        root.set(1, inner).unwrap();
        let stats = free_nested(&[3, 1], root).unwrap();
        assert_eq!(stats.leaves, 1);
        assert_eq!(stats.skipped, 2);
        assert_eq!(stats.levels, 2);
    }

    #[test]
    fn test_mixed_leaf_kinds() {
        let csr = CsrOperator::new(vec![0, 1], vec![0], vec![1.0]).unwrap();
        let mut a: Nested1<CsrOperator<f64>> = Level::new(2).unwrap();
        a.set(1, csr).unwrap();
        assert_eq!(free_nested(&[2], a).unwrap().leaves, 1);

        let b: Nested1<Multiarray<f64>> =
            Level::from_fn(1, |_| Multiarray::zeros(&[2, 2, 2], Layout::Col).ok()).unwrap();
        assert_eq!(free_nested(&[1], b).unwrap().bytes, 8 * 8 + mem::size_of::<Option<Multiarray<f64>>>());

        let faces = VectorArray::from_flat(&[2], &[1, 2, 3], &[2, 1]).unwrap();
        let c: Nested1<VectorArray<i32>> = Level::from_fn(3, |i| (i == 2).then(|| faces.clone())).unwrap();
        let stats = free_nested(&[3], c).unwrap();
        assert_eq!(stats.leaves, 1);
        assert_eq!(stats.skipped, 2);
    }

    #[test]
    fn test_empty_root() {
        let root: Nested2<Vec<i32>> = Level::new(0).unwrap();
        let stats = free_nested(&[0, 5], root).unwrap();
        assert_eq!(stats, ReleaseStats { levels: 1, ..ReleaseStats::default() });
    }

    #[test]
    #[cfg(debug_assertions)]
    fn test_extent_mismatch_reported_in_debug() {
        let root: Nested2<Vec<i32>> = Level::from_fn(2, |_| Level::new(3).ok()).unwrap();
        let err = free_nested(&[2, 4], root).unwrap_err();
        assert!(matches!(err, CoreError::InvariantViolation { container: "Level", .. }));

        let root: Nested1<Vec<i32>> = Level::new(1).unwrap();
        let err = free_nested(&[1, 1], root).unwrap_err();
        assert!(matches!(err, CoreError::InvariantViolation { container: "free_nested", .. }));
    }
}
