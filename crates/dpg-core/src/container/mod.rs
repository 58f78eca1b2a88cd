//! Dense containers: [`Vector`], [`Matrix`] and [`Multiarray`].
//!
//! Each container comes in two flavours that share one generic base type:
//!
//! | Owning | Const view |
//! |--------|------------|
//! | [`Vector<T>`] | [`VectorView<'a, T>`] |
//! | [`Matrix<T>`] | [`MatrixView<'a, T>`] |
//! | [`Multiarray<T>`] | [`MultiarrayView<'a, T>`] |
//!
//! Matrices and multiarrays carry a per-instance [`Layout`] tag rather than a
//! type parameter, so the same kernel can consume row-major operator tables
//! and column-major solution coefficients.

mod display;
mod matrix;
mod multiarray;
mod ops;
pub mod storage;
mod vector;
mod vector_array;

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::Element;
use crate::error::{CoreError, Result};

pub use display::TolDisplay;
pub use matrix::{Matrix, MatrixBase, MatrixView};
pub use multiarray::{Extents, MAX_ORDER, Multiarray, MultiarrayBase, MultiarrayView};
pub use storage::{Storage, StorageMut};
pub use vector::{NormType, Vector, VectorBase, VectorView};
pub use vector_array::VectorArray;

/// Storage order of a matrix or multiarray.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Layout {
    /// Row-major (`'R'`): the last index varies fastest.
    #[default]
    #[serde(rename = "R")]
    Row,
    /// Column-major (`'C'`): the first index varies fastest.
    #[serde(rename = "C")]
    Col,
}

impl Layout {
    /// The single-character tag used in diagnostics.
    pub fn as_char(self) -> char {
        match self {
            Self::Row => 'R',
            Self::Col => 'C',
        }
    }

    /// Parse an `'R'`/`'C'` tag.
    pub fn from_char(c: char) -> Result<Self> {
        match c {
            'R' | 'r' => Ok(Self::Row),
            'C' | 'c' => Ok(Self::Col),
            _ => Err(CoreError::InvalidArgument {
                reason: "layout must be 'R' or 'C'",
            }),
        }
    }

    /// The other layout.
    #[inline]
    pub fn flipped(self) -> Self {
        match self {
            Self::Row => Self::Col,
            Self::Col => Self::Row,
        }
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

// ======================================================================
// Allocation helpers
// ======================================================================

/// Number of elements described by `extents`, failing on overflow.
pub(crate) fn checked_len(container: &'static str, extents: &[usize]) -> Result<usize> {
    extents
        .iter()
        .try_fold(1usize, |acc, &e| acc.checked_mul(e))
        .ok_or_else(|| CoreError::Allocation {
            container,
            extents: extents.to_vec(),
            reason: "extent product overflows the addressable range".to_string(),
        })
}

/// Allocate a buffer of `len` copies of `value` without aborting on failure.
///
/// A zero length yields an unallocated `Vec`.
pub(crate) fn alloc_filled<T: Element>(
    container: &'static str,
    extents: &[usize],
    len: usize,
    value: T,
) -> Result<Vec<T>> {
    let mut data = Vec::new();
    if len == 0 {
        return Ok(data);
    }
    data.try_reserve_exact(len)
        .map_err(|e| CoreError::Allocation {
            container,
            extents: extents.to_vec(),
            reason: e.to_string(),
        })?;
    data.resize(len, value);
    Ok(data)
}

/// Copy a slice into a freshly allocated buffer.
pub(crate) fn alloc_copy<T: Element>(
    container: &'static str,
    extents: &[usize],
    src: &[T],
) -> Result<Vec<T>> {
    let mut data = Vec::new();
    if src.is_empty() {
        return Ok(data);
    }
    data.try_reserve_exact(src.len())
        .map_err(|e| CoreError::Allocation {
            container,
            extents: extents.to_vec(),
            reason: e.to_string(),
        })?;
    data.extend_from_slice(src);
    Ok(data)
}

/// Report a buffer whose length disagrees with its extents.
pub(crate) fn check_len(container: &'static str, extents: &[usize], len: usize) -> Result<()> {
    let expected = checked_len(container, extents)?;
    if expected != len {
        return Err(CoreError::invariant(
            container,
            format_args!("extents {extents:?} describe {expected} elements, buffer holds {len}"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_chars() {
        assert_eq!(Layout::Row.as_char(), 'R');
        assert_eq!(Layout::from_char('C').unwrap(), Layout::Col);
        assert!(Layout::from_char('x').is_err());
        assert_eq!(Layout::Row.flipped(), Layout::Col);
        assert_eq!(format!("{}", Layout::Col), "C");
    }

    #[test]
    fn test_checked_len_overflow() {
        assert_eq!(checked_len("Test", &[2, 3, 4]).unwrap(), 24);
        assert_eq!(checked_len("Test", &[]).unwrap(), 1);
        let err = checked_len("Test", &[usize::MAX, 2]).unwrap_err();
        assert!(matches!(err, CoreError::Allocation { .. }));
    }

    #[test]
    fn test_alloc_filled_zero_len_has_no_storage() {
        let v: Vec<f64> = alloc_filled("Test", &[0], 0, 1.0).unwrap();
        assert_eq!(v.capacity(), 0);
    }

    #[test]
    fn test_alloc_filled_too_large() {
        let err = alloc_filled("Test", &[usize::MAX / 4], usize::MAX / 4, 0.0_f64).unwrap_err();
        assert!(matches!(err, CoreError::Allocation { container: "Test", .. }));
    }

    #[test]
    fn test_check_len() {
        assert!(check_len("Test", &[2, 2], 4).is_ok());
        assert!(check_len("Test", &[2, 2], 3).is_err());
    }
}
