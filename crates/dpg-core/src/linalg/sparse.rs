//! Compressed sparse row (CSR) operator storage.
//!
//! A CSR operator keeps three buffers:
//!
//! - `row_index` of length `rows + 1`, non-decreasing, starting at `0` and
//!   ending at `nnz`;
//! - `columns` of length `nnz`, every entry `< cols` (unsorted rows allowed);
//! - `values` of length `nnz`.
//!
//! Like the dense containers, [`CsrBase`] is generic over its ownership:
//! [`CsrOperator`] owns all three buffers, [`CsrView`] borrows them. The
//! buffer invariants are validated on construction when `debug_assertions`
//! are enabled.

use core::fmt;

use crate::container::storage::Storage;
use crate::container::{Layout, Matrix, MatrixBase, alloc_copy};
use crate::error::{CoreError, Result, ensure_invariant};
use crate::{Element, Scalar};

// ======================================================================
// CsrBase
// ======================================================================

/// A CSR operator, generic over its ownership.
pub struct CsrBase<D: Storage> {
    row_index: D::Indices,
    columns: D::Indices,
    values: D,
    cols: usize,
}

/// An owning CSR operator.
pub type CsrOperator<T> = CsrBase<Vec<T>>;

/// A non-owning, read-only CSR operator.
pub type CsrView<'a, T> = CsrBase<&'a [T]>;

impl<D: Storage + Clone> Clone for CsrBase<D> {
    fn clone(&self) -> Self {
        Self {
            row_index: self.row_index.clone(),
            columns: self.columns.clone(),
            values: self.values.clone(),
            cols: self.cols,
        }
    }
}

impl<D: Storage> fmt::Debug for CsrBase<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CsrBase")
            .field("row_index", &self.row_index)
            .field("columns", &self.columns)
            .field("values", &self.values.as_slice())
            .field("cols", &self.cols)
            .finish()
    }
}

impl<D: Storage> PartialEq for CsrBase<D> {
    fn eq(&self, other: &Self) -> bool {
        self.cols == other.cols
            && self.row_index() == other.row_index()
            && self.columns() == other.columns()
            && self.values() == other.values()
    }
}

/// Check the CSR buffer invariants. Compiled to a no-op without
/// `debug_assertions`.
fn validate(row_index: &[usize], columns: &[usize], n_values: usize, cols: usize) -> Result<()> {
    ensure_invariant!(!row_index.is_empty(), "CsrOperator", "row_index is empty");
    ensure_invariant!(
        row_index[0] == 0,
        "CsrOperator",
        "row_index[0] = {}, expected 0",
        row_index[0]
    );
    ensure_invariant!(
        row_index.windows(2).all(|w| w[0] <= w[1]),
        "CsrOperator",
        "row_index is not non-decreasing"
    );
    let nnz = row_index.last().copied().unwrap_or(0);
    ensure_invariant!(
        columns.len() == nnz && n_values == nnz,
        "CsrOperator",
        "row_index ends at {nnz}, but columns has {} and values {} entries",
        columns.len(),
        n_values
    );
    ensure_invariant!(
        columns.iter().all(|&c| c < cols),
        "CsrOperator",
        "column index out of range for {cols} columns"
    );
    Ok(())
}

impl<D: Storage> CsrBase<D> {
    /// Number of rows.
    #[inline]
    pub fn rows(&self) -> usize {
        self.row_index().len().saturating_sub(1)
    }

    /// Number of columns.
    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Shape as `(rows, cols)`.
    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (self.rows(), self.cols)
    }

    /// Number of stored entries.
    #[inline]
    pub fn nnz(&self) -> usize {
        self.values.as_slice().len()
    }

    #[inline]
    pub fn row_index(&self) -> &[usize] {
        self.row_index.as_slice()
    }

    #[inline]
    pub fn columns(&self) -> &[usize] {
        self.columns.as_slice()
    }

    #[inline]
    pub fn values(&self) -> &[D::Elem] {
        self.values.as_slice()
    }

    /// Zero-copy const view.
    pub fn view(&self) -> CsrView<'_, D::Elem> {
        CsrBase {
            row_index: self.row_index(),
            columns: self.columns(),
            values: self.values(),
            cols: self.cols,
        }
    }

    /// Reinterpret as a const view for a read-only consumer.
    #[inline]
    pub fn as_const(&self) -> CsrView<'_, D::Elem> {
        self.view()
    }

    /// Column indices and values stored in row `r`.
    pub fn row(&self, r: usize) -> Result<(&[usize], &[D::Elem])> {
        if r >= self.rows() {
            return Err(CoreError::Index {
                container: "CsrOperator",
                index: vec![r],
                extents: vec![self.rows()],
            });
        }
        let (start, end) = (self.row_index()[r], self.row_index()[r + 1]);
        Ok((&self.columns()[start..end], &self.values()[start..end]))
    }

    /// Copy into a new owning operator.
    pub fn to_operator(&self) -> Result<CsrOperator<D::Elem>> {
        let extents = [self.rows(), self.cols];
        Ok(CsrBase {
            row_index: alloc_copy("CsrOperator", &extents, self.row_index())?,
            columns: alloc_copy("CsrOperator", &extents, self.columns())?,
            values: alloc_copy("CsrOperator", &extents, self.values())?,
            cols: self.cols,
        })
    }
}

impl<'a, T: Element> CsrView<'a, T> {
    /// Borrow existing CSR buffers.
    pub fn new(
        cols: usize,
        row_index: &'a [usize],
        columns: &'a [usize],
        values: &'a [T],
    ) -> Result<Self> {
        validate(row_index, columns, values.len(), cols)?;
        Ok(Self {
            row_index,
            columns,
            values,
            cols,
        })
    }
}

impl<T: Element> CsrOperator<T> {
    /// Take ownership of the three CSR buffers. The column count is inferred
    /// as one past the largest column index.
    pub fn new(row_index: Vec<usize>, columns: Vec<usize>, values: Vec<T>) -> Result<Self> {
        let cols = columns.iter().max().map_or(0, |&c| c + 1);
        Self::with_ncols(cols, row_index, columns, values)
    }

    /// Take ownership of the three CSR buffers for an operator with `cols`
    /// columns.
    pub fn with_ncols(
        cols: usize,
        row_index: Vec<usize>,
        columns: Vec<usize>,
        values: Vec<T>,
    ) -> Result<Self> {
        validate(&row_index, &columns, values.len(), cols)?;
        tracing::trace!(
            container = "CsrOperator",
            rows = row_index.len().saturating_sub(1),
            cols,
            nnz = values.len(),
            "constructed"
        );
        Ok(Self {
            row_index,
            columns,
            values,
            cols,
        })
    }

    /// Mutable access to the stored values. The sparsity pattern is fixed.
    pub fn values_mut(&mut self) -> &mut [T] {
        &mut self.values
    }

    /// Release all three buffers.
    pub fn destroy(self) {
        tracing::trace!(container = "CsrOperator", nnz = self.nnz(), "destroyed");
        drop(self);
    }

    /// Destroy an operator that may not have been constructed. `None` is a
    /// no-op.
    pub fn destroy_optional(op: Option<Self>) {
        if let Some(op) = op {
            op.destroy();
        }
    }

    /// Give the buffers back as `(row_index, columns, values)`.
    pub fn into_parts(self) -> (Vec<usize>, Vec<usize>, Vec<T>) {
        (self.row_index, self.columns, self.values)
    }
}

impl<T: Scalar> CsrOperator<T> {
    /// Compress a dense matrix, dropping entries whose modulus is below
    /// `tol`. Columns within each row come out sorted.
    pub fn from_dense<D: Storage<Elem = T>>(a: &MatrixBase<D>, tol: T::Real) -> Result<Self> {
        let (rows, cols) = a.extents();
        let mut row_index = Vec::with_capacity(rows + 1);
        let mut columns = Vec::new();
        let mut values = Vec::new();
        row_index.push(0);
        for i in 0..rows {
            for j in 0..cols {
                let v = a[(i, j)];
                if v.modulus() >= tol && v != T::zero() {
                    columns.push(j);
                    values.push(v);
                }
            }
            row_index.push(values.len());
        }
        Self::with_ncols(cols, row_index, columns, values)
    }
}

impl<D> CsrBase<D>
where
    D: Storage,
    D::Elem: Scalar,
{
    /// Value at `(r, c)`; zero when not stored. Duplicate entries are summed.
    pub fn get(&self, r: usize, c: usize) -> Result<D::Elem> {
        if c >= self.cols || r >= self.rows() {
            return Err(CoreError::Index {
                container: "CsrOperator",
                index: vec![r, c],
                extents: vec![self.rows(), self.cols],
            });
        }
        let (columns, values) = self.row(r)?;
        Ok(columns
            .iter()
            .zip(values)
            .filter(|&(&col, _)| col == c)
            .map(|(_, &v)| v)
            .sum())
    }

    /// Expand into a dense matrix stored in `layout`. Duplicate entries are
    /// summed.
    pub fn to_dense(&self, layout: Layout) -> Result<Matrix<D::Elem>> {
        let (rows, cols) = self.shape();
        let mut out = Matrix::zeros(rows, cols, layout)?;
        for r in 0..rows {
            let (columns, values) = self.row(r)?;
            for (&c, &v) in columns.iter().zip(values) {
                out[(r, c)] += v;
            }
        }
        Ok(out)
    }
}
