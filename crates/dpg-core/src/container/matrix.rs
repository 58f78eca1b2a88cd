//! Rank-2 container with a per-instance layout tag.

use core::ops::{Index, IndexMut};

use crate::container::storage::{Storage, StorageMut};
use crate::container::{Layout, VectorView, alloc_copy, alloc_filled, check_len, checked_len};
use crate::container::vector::{Vector, VectorBase};
use crate::error::{CoreError, Result};
use crate::{Element, Scalar};

/// A dense 2-D array, generic over its ownership.
///
/// Element `(i, j)` lives at `i * cols + j` for [`Layout::Row`] and at
/// `j * rows + i` for [`Layout::Col`].
#[derive(Debug, Clone, PartialEq)]
pub struct MatrixBase<D: Storage> {
    pub(crate) data: D,
    rows: usize,
    cols: usize,
    layout: Layout,
}

/// An owning matrix.
pub type Matrix<T> = MatrixBase<Vec<T>>;

/// A non-owning, read-only matrix aliasing a buffer owned elsewhere.
pub type MatrixView<'a, T> = MatrixBase<&'a [T]>;

impl<D: Storage> MatrixBase<D> {
    /// Assemble from parts the caller has already checked.
    #[inline]
    pub(crate) fn from_parts(data: D, rows: usize, cols: usize, layout: Layout) -> Self {
        debug_assert_eq!(data.as_slice().len(), rows * cols);
        Self {
            data,
            rows,
            cols,
            layout,
        }
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// `(rows, cols)`.
    #[inline]
    pub fn extents(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    #[inline]
    pub fn layout(&self) -> Layout {
        self.layout
    }

    /// Total number of entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.as_slice().len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The entries in storage order.
    #[inline]
    pub fn as_slice(&self) -> &[D::Elem] {
        self.data.as_slice()
    }

    /// Zero-copy const view.
    #[inline]
    pub fn view(&self) -> MatrixView<'_, D::Elem> {
        MatrixBase {
            data: self.data.as_slice(),
            rows: self.rows,
            cols: self.cols,
            layout: self.layout,
        }
    }

    /// Reinterpret as a const view for a read-only consumer.
    #[inline]
    pub fn as_const(&self) -> MatrixView<'_, D::Elem> {
        self.view()
    }

    /// Buffer offset of `(i, j)`. Does not check the extents.
    #[inline]
    pub fn offset(&self, i: usize, j: usize) -> usize {
        match self.layout {
            Layout::Row => i * self.cols + j,
            Layout::Col => j * self.rows + i,
        }
    }

    fn index_error(&self, i: usize, j: usize) -> CoreError {
        CoreError::Index {
            container: "Matrix",
            index: vec![i, j],
            extents: vec![self.rows, self.cols],
        }
    }

    /// Checked element access.
    pub fn get(&self, i: usize, j: usize) -> Result<D::Elem> {
        if i >= self.rows || j >= self.cols {
            return Err(self.index_error(i, j));
        }
        Ok(self.as_slice()[self.offset(i, j)])
    }

    /// Row `i` as a vector view. Only contiguous for [`Layout::Row`].
    pub fn row(&self, i: usize) -> Result<VectorView<'_, D::Elem>> {
        if self.layout != Layout::Row {
            return Err(CoreError::LayoutMismatch {
                op: "Matrix::row",
                required: Layout::Row,
                got: self.layout,
            });
        }
        if i >= self.rows {
            return Err(self.index_error(i, 0));
        }
        let start = i * self.cols;
        Ok(VectorView::new(&self.as_slice()[start..start + self.cols]))
    }

    /// Column `j` as a vector view. Only contiguous for [`Layout::Col`].
    pub fn col(&self, j: usize) -> Result<VectorView<'_, D::Elem>> {
        if self.layout != Layout::Col {
            return Err(CoreError::LayoutMismatch {
                op: "Matrix::col",
                required: Layout::Col,
                got: self.layout,
            });
        }
        if j >= self.cols {
            return Err(self.index_error(0, j));
        }
        let start = j * self.rows;
        Ok(VectorView::new(&self.as_slice()[start..start + self.rows]))
    }

    /// Rows `start..start + n` as a matrix view. Only contiguous for
    /// [`Layout::Row`].
    pub fn slice_rows(&self, start: usize, n: usize) -> Result<MatrixView<'_, D::Elem>> {
        if self.layout != Layout::Row {
            return Err(CoreError::LayoutMismatch {
                op: "Matrix::slice_rows",
                required: Layout::Row,
                got: self.layout,
            });
        }
        match start.checked_add(n) {
            Some(end) if end <= self.rows => Ok(MatrixBase::from_parts(
                &self.as_slice()[start * self.cols..end * self.cols],
                n,
                self.cols,
                Layout::Row,
            )),
            _ => Err(self.index_error(start.saturating_add(n), 0)),
        }
    }

    /// Columns `start..start + n` as a matrix view. Only contiguous for
    /// [`Layout::Col`].
    pub fn slice_cols(&self, start: usize, n: usize) -> Result<MatrixView<'_, D::Elem>> {
        if self.layout != Layout::Col {
            return Err(CoreError::LayoutMismatch {
                op: "Matrix::slice_cols",
                required: Layout::Col,
                got: self.layout,
            });
        }
        match start.checked_add(n) {
            Some(end) if end <= self.cols => Ok(MatrixBase::from_parts(
                &self.as_slice()[start * self.rows..end * self.rows],
                self.rows,
                n,
                Layout::Col,
            )),
            _ => Err(self.index_error(0, start.saturating_add(n))),
        }
    }

    /// Copy into a new owning matrix with the same layout.
    pub fn to_matrix(&self) -> Result<Matrix<D::Elem>> {
        let data = alloc_copy("Matrix", &[self.rows, self.cols], self.as_slice())?;
        Ok(MatrixBase {
            data,
            rows: self.rows,
            cols: self.cols,
            layout: self.layout,
        })
    }

    /// Copy into a new owning matrix stored in `layout`. The logical content
    /// is unchanged.
    pub fn to_layout(&self, layout: Layout) -> Result<Matrix<D::Elem>> {
        let mut out = Matrix::filled(self.rows, self.cols, layout, D::Elem::default())?;
        for i in 0..self.rows {
            for j in 0..self.cols {
                let dst = out.offset(i, j);
                out.data[dst] = self.as_slice()[self.offset(i, j)];
            }
        }
        Ok(out)
    }
}

impl<'a, T: Element> MatrixView<'a, T> {
    /// Borrow `data` as a `rows x cols` matrix. Never allocates; a buffer of
    /// the wrong length is reported as an invariant violation.
    pub fn new(data: &'a [T], rows: usize, cols: usize, layout: Layout) -> Result<Self> {
        check_len("MatrixView", &[rows, cols], data.len())?;
        Ok(Self {
            data,
            rows,
            cols,
            layout,
        })
    }
}

impl<T: Element> Matrix<T> {
    /// A `rows x cols` matrix of default (zero) entries.
    pub fn zeros(rows: usize, cols: usize, layout: Layout) -> Result<Self> {
        Self::filled(rows, cols, layout, T::default())
    }

    /// A `rows x cols` matrix of copies of `value`.
    pub fn filled(rows: usize, cols: usize, layout: Layout, value: T) -> Result<Self> {
        let len = checked_len("Matrix", &[rows, cols])?;
        let data = alloc_filled("Matrix", &[rows, cols], len, value)?;
        tracing::trace!(container = "Matrix", rows, cols, %layout, "constructed");
        Ok(Self {
            data,
            rows,
            cols,
            layout,
        })
    }

    /// Take ownership of an existing buffer (move constructor).
    pub fn from_vec(rows: usize, cols: usize, layout: Layout, data: Vec<T>) -> Result<Self> {
        check_len("Matrix", &[rows, cols], data.len())?;
        Ok(Self {
            data,
            rows,
            cols,
            layout,
        })
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        self.data.as_mut_slice()
    }

    /// Checked element write.
    pub fn set(&mut self, i: usize, j: usize, value: T) -> Result<()> {
        if i >= self.rows || j >= self.cols {
            return Err(self.index_error(i, j));
        }
        let k = self.offset(i, j);
        self.data[k] = value;
        Ok(())
    }

    /// Mutable row `i`. Only contiguous for [`Layout::Row`].
    pub fn row_mut(&mut self, i: usize) -> Result<&mut [T]> {
        if self.layout != Layout::Row {
            return Err(CoreError::LayoutMismatch {
                op: "Matrix::row_mut",
                required: Layout::Row,
                got: self.layout,
            });
        }
        if i >= self.rows {
            return Err(self.index_error(i, 0));
        }
        let start = i * self.cols;
        Ok(&mut self.data[start..start + self.cols])
    }

    /// Mutable column `j`. Only contiguous for [`Layout::Col`].
    pub fn col_mut(&mut self, j: usize) -> Result<&mut [T]> {
        if self.layout != Layout::Col {
            return Err(CoreError::LayoutMismatch {
                op: "Matrix::col_mut",
                required: Layout::Col,
                got: self.layout,
            });
        }
        if j >= self.cols {
            return Err(self.index_error(0, j));
        }
        let start = j * self.rows;
        Ok(&mut self.data[start..start + self.rows])
    }

    /// Overwrite row `i` with `src`, whatever the layout.
    pub fn set_row(&mut self, i: usize, src: &[T]) -> Result<()> {
        if i >= self.rows {
            return Err(self.index_error(i, 0));
        }
        self.check_line("Matrix::set_row", self.cols, src.len())?;
        for (j, &x) in src.iter().enumerate() {
            let k = self.offset(i, j);
            self.data[k] = x;
        }
        Ok(())
    }

    /// Overwrite column `j` with `src`, whatever the layout.
    pub fn set_col(&mut self, j: usize, src: &[T]) -> Result<()> {
        if j >= self.cols {
            return Err(self.index_error(0, j));
        }
        self.check_line("Matrix::set_col", self.rows, src.len())?;
        for (i, &x) in src.iter().enumerate() {
            let k = self.offset(i, j);
            self.data[k] = x;
        }
        Ok(())
    }

    /// Set every entry of column `j` to `value`.
    pub fn set_col_to_val(&mut self, j: usize, value: T) -> Result<()> {
        if j >= self.cols {
            return Err(self.index_error(0, j));
        }
        for i in 0..self.rows {
            let k = self.offset(i, j);
            self.data[k] = value;
        }
        Ok(())
    }

    /// Copy `src` into the block whose top-left entry is `(row0, col0)`.
    /// The layouts of `self` and `src` may differ.
    pub fn set_block<E: Storage<Elem = T>>(&mut self, row0: usize, col0: usize, src: &MatrixBase<E>) -> Result<()> {
        self.check_block(row0, col0, src)?;
        for i in 0..src.rows {
            for j in 0..src.cols {
                let k = self.offset(row0 + i, col0 + j);
                self.data[k] = src.as_slice()[src.offset(i, j)];
            }
        }
        Ok(())
    }

    fn check_line(&self, op: &'static str, expected: usize, got: usize) -> Result<()> {
        if expected != got {
            return Err(CoreError::DimensionMismatch {
                op,
                expected: vec![expected],
                got: vec![got],
            });
        }
        Ok(())
    }

    fn check_block<E: Storage<Elem = T>>(&self, row0: usize, col0: usize, src: &MatrixBase<E>) -> Result<()> {
        let fits = |start: usize, n: usize, ext: usize| start.checked_add(n).is_some_and(|end| end <= ext);
        if !(fits(row0, src.rows, self.rows) && fits(col0, src.cols, self.cols)) {
            return Err(self.index_error(row0.saturating_add(src.rows), col0.saturating_add(src.cols)));
        }
        Ok(())
    }

    pub fn fill(&mut self, value: T) {
        self.data.fill(value);
    }

    /// Logical transpose without moving any data: the extents are swapped and
    /// the layout tag flipped.
    pub fn transpose(&mut self) {
        core::mem::swap(&mut self.rows, &mut self.cols);
        self.layout = self.layout.flipped();
    }

    /// Reorder the buffer into `layout`, keeping the logical content.
    pub fn set_layout(&mut self, layout: Layout) -> Result<()> {
        if layout == self.layout {
            return Ok(());
        }
        *self = self.to_layout(layout)?;
        Ok(())
    }

    /// Consume the matrix and return the underlying buffer.
    #[inline]
    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    /// Reinterpret the buffer as a vector (storage order), keeping ownership.
    pub fn into_vector(self) -> VectorBase<Vec<T>> {
        VectorBase { data: self.data }
    }

    /// Release the buffer. Consumes the matrix.
    pub fn destroy(self) {
        tracing::trace!(
            container = "Matrix",
            rows = self.rows,
            cols = self.cols,
            "destroyed"
        );
        drop(self);
    }
}

impl<T: Scalar> Matrix<T> {
    /// The `n x n` identity.
    pub fn identity(n: usize, layout: Layout) -> Result<Self> {
        let mut out = Self::zeros(n, n, layout)?;
        for i in 0..n {
            let k = out.offset(i, i);
            out.data[k] = T::one();
        }
        Ok(out)
    }

    /// Promote a real matrix to this scalar type (imaginary parts zero).
    pub fn from_real<E: Storage<Elem = T::Real>>(src: &MatrixBase<E>) -> Result<Self> {
        let mut out = Self::zeros(src.rows, src.cols, src.layout)?;
        for (o, &r) in out.data.iter_mut().zip(src.as_slice()) {
            *o = T::from_real(r);
        }
        Ok(out)
    }

    /// Add `src` into the block whose top-left entry is `(row0, col0)`.
    pub fn add_block<E: Storage<Elem = T>>(&mut self, row0: usize, col0: usize, src: &MatrixBase<E>) -> Result<()> {
        self.check_block(row0, col0, src)?;
        for i in 0..src.rows {
            for j in 0..src.cols {
                let k = self.offset(row0 + i, col0 + j);
                self.data[k] += src.as_slice()[src.offset(i, j)];
            }
        }
        Ok(())
    }

    /// Multiply every entry by `alpha`.
    pub fn scale(&mut self, alpha: T) {
        for x in &mut self.data {
            *x *= alpha;
        }
    }
}

impl<D> MatrixBase<D>
where
    D: Storage,
    D::Elem: Scalar,
{
    /// Apply a function to every entry, returning a new matrix.
    pub fn map<F>(&self, f: F) -> Result<Matrix<D::Elem>>
    where
        F: Fn(D::Elem) -> D::Elem,
    {
        let mut out = self.to_matrix()?;
        for x in &mut out.data {
            *x = f(*x);
        }
        Ok(out)
    }

    /// Sum along `axis`: `0` adds the rows together (length `cols`), `1`
    /// adds the columns together (length `rows`).
    pub fn sum_axis(&self, axis: usize) -> Result<Vector<D::Elem>> {
        let n = match axis {
            0 => self.cols,
            1 => self.rows,
            _ => {
                return Err(CoreError::InvalidArgument {
                    reason: "matrix axis must be 0 or 1",
                });
            }
        };
        let mut out = Vector::<D::Elem>::zeros(n)?;
        let sums = out.as_mut_slice();
        for i in 0..self.rows {
            for j in 0..self.cols {
                let k = if axis == 0 { j } else { i };
                sums[k] += self.as_slice()[self.offset(i, j)];
            }
        }
        Ok(out)
    }

    /// Real-part projection, same extents and layout.
    pub fn real_part(&self) -> Result<Matrix<<D::Elem as Scalar>::Real>> {
        let mut out = Matrix::zeros(self.rows, self.cols, self.layout)?;
        for (o, &x) in out.data.iter_mut().zip(self.as_slice()) {
            *o = x.real_part();
        }
        Ok(out)
    }

    /// Imaginary-part projection, same extents and layout.
    pub fn imag_part(&self) -> Result<Matrix<<D::Elem as Scalar>::Real>> {
        let mut out = Matrix::zeros(self.rows, self.cols, self.layout)?;
        for (o, &x) in out.data.iter_mut().zip(self.as_slice()) {
            *o = x.imag_part();
        }
        Ok(out)
    }
}

impl<D: Storage> Index<(usize, usize)> for MatrixBase<D> {
    type Output = D::Elem;

    #[inline]
    fn index(&self, (i, j): (usize, usize)) -> &D::Elem {
        debug_assert!(
            i < self.rows && j < self.cols,
            "{}",
            self.index_error(i, j)
        );
        &self.data.as_slice()[self.offset(i, j)]
    }
}

impl<D: StorageMut> IndexMut<(usize, usize)> for MatrixBase<D> {
    #[inline]
    fn index_mut(&mut self, (i, j): (usize, usize)) -> &mut D::Elem {
        debug_assert!(
            i < self.rows && j < self.cols,
            "{}",
            self.index_error(i, j)
        );
        let k = self.offset(i, j);
        &mut self.data.as_mut_slice()[k]
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;
    use num_complex::Complex64;

    fn sample(layout: Layout) -> Matrix<f64> {
        // [[1, 2, 3],
        //  [4, 5, 6]]
        let data = match layout {
            Layout::Row => vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0],
            Layout::Col => vec![1.0, 4.0, 2.0, 5.0, 3.0, 6.0],
        };
        Matrix::from_vec(2, 3, layout, data).unwrap()
    }

    #[test]
    fn test_offsets_follow_layout() {
        let r = sample(Layout::Row);
        let c = sample(Layout::Col);
        for i in 0..2 {
            for j in 0..3 {
                assert_eq!(r[(i, j)], c[(i, j)]);
            }
        }
        assert_eq!(r.offset(1, 2), 5);
        assert_eq!(c.offset(1, 2), 5);
        assert_eq!(c.offset(0, 1), 2);
    }

    #[test]
    fn test_from_vec_length_mismatch() {
        let err = Matrix::from_vec(2, 2, Layout::Row, vec![1.0; 3]).unwrap_err();
        assert!(matches!(err, CoreError::InvariantViolation { container: "Matrix", .. }));
    }

    #[test]
    fn test_view_new_checks_length() {
        let buf = [0.0; 6];
        assert!(MatrixView::new(&buf, 2, 3, Layout::Col).is_ok());
        assert!(MatrixView::new(&buf, 2, 2, Layout::Col).is_err());
    }

    #[test]
    fn test_view_sees_owner_mutation() {
        for layout in [Layout::Row, Layout::Col] {
            let mut m = sample(layout);
            m[(1, 0)] = 10.0;
            let v = m.view();
            assert_eq!(v[(1, 0)], 10.0);
            assert_eq!(v.layout(), layout);
            assert_eq!(v.as_slice().as_ptr(), m.as_slice().as_ptr());
        }
    }

    #[test]
    fn test_set_row_and_col_in_either_layout() {
        for layout in [Layout::Row, Layout::Col] {
            let mut m = sample(layout);
            m.set_row(1, &[7.0, 8.0, 9.0]).unwrap();
            m.set_col(0, &[-1.0, -4.0]).unwrap();
            assert_eq!(m.to_layout(Layout::Row).unwrap().as_slice(), &[-1.0, 2.0, 3.0, -4.0, 8.0, 9.0]);
            assert!(matches!(m.set_row(2, &[0.0; 3]), Err(CoreError::Index { .. })));
            assert!(matches!(m.set_col(0, &[0.0; 3]), Err(CoreError::DimensionMismatch { .. })));
        }
    }

    #[test]
    fn test_set_col_to_val() {
        let mut m = sample(Layout::Row);
        m.set_col_to_val(2, 0.5).unwrap();
        assert_eq!(m.as_slice(), &[1.0, 2.0, 0.5, 4.0, 5.0, 0.5]);
        assert!(m.set_col_to_val(3, 0.0).is_err());
    }

    #[test]
    fn test_set_and_add_block_across_layouts() {
        let mut m = Matrix::<f64>::zeros(3, 4, Layout::Col).unwrap();
        let block = Matrix::from_vec(2, 2, Layout::Row, vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        m.set_block(1, 2, &block).unwrap();
        assert_eq!(m[(1, 2)], 1.0);
        assert_eq!(m[(1, 3)], 2.0);
        assert_eq!(m[(2, 2)], 3.0);
        assert_eq!(m[(2, 3)], 4.0);
        m.add_block(1, 2, &block.view()).unwrap();
        assert_eq!(m[(2, 3)], 8.0);
        assert_eq!(m[(0, 0)], 0.0);
        assert!(m.set_block(2, 2, &block).is_err());
        assert!(m.add_block(1, 3, &block).is_err());
    }

    #[test]
    fn test_slices_share_storage() {
        let r = sample(Layout::Row);
        let s = r.slice_rows(1, 1).unwrap();
        assert_eq!(s.extents(), (1, 3));
        assert_eq!(s[(0, 2)], 6.0);
        assert!(r.slice_rows(1, 2).is_err());
        assert!(matches!(r.slice_cols(0, 1), Err(CoreError::LayoutMismatch { .. })));

        let c = sample(Layout::Col);
        let s = c.slice_cols(1, 2).unwrap();
        assert_eq!(s.extents(), (2, 2));
        assert_eq!(s[(1, 0)], 5.0);
        assert_eq!(s.as_slice().as_ptr(), c.as_slice()[2..].as_ptr());
    }

    #[test]
    fn test_sum_axis() {
        for layout in [Layout::Row, Layout::Col] {
            let m = sample(layout);
            assert_eq!(m.sum_axis(0).unwrap().as_slice(), &[5.0, 7.0, 9.0]);
            assert_eq!(m.sum_axis(1).unwrap().as_slice(), &[6.0, 15.0]);
            assert!(m.sum_axis(2).is_err());
        }
    }

    #[test]
    fn test_checked_get() {
        let m = sample(Layout::Col);
        assert_eq!(m.get(1, 1).unwrap(), 5.0);
        assert!(matches!(m.get(2, 0), Err(CoreError::Index { .. })));
    }

    #[test]
    fn test_row_col_views() {
        let r = sample(Layout::Row);
        assert_eq!(r.row(1).unwrap().as_slice(), &[4.0, 5.0, 6.0]);
        assert!(r.col(0).is_err());
        let c = sample(Layout::Col);
        assert_eq!(c.col(2).unwrap().as_slice(), &[3.0, 6.0]);
        assert!(matches!(c.row(0), Err(CoreError::LayoutMismatch { .. })));
    }

    #[test]
    fn test_transpose_is_zero_copy() {
        let mut m = sample(Layout::Row);
        let ptr = m.as_slice().as_ptr();
        m.transpose();
        assert_eq!(m.extents(), (3, 2));
        assert_eq!(m.layout(), Layout::Col);
        assert_eq!(m.as_slice().as_ptr(), ptr);
        assert_eq!(m[(2, 1)], 6.0);
        assert_eq!(m[(0, 1)], 4.0);
    }

    #[test]
    fn test_set_layout_keeps_logical_content() {
        let mut m = sample(Layout::Row);
        m.set_layout(Layout::Col).unwrap();
        assert_eq!(m.layout(), Layout::Col);
        assert_eq!(m.as_slice(), sample(Layout::Col).as_slice());
        assert_eq!(m[(1, 0)], 4.0);
    }

    #[test]
    fn test_identity() {
        let eye = Matrix::<f64>::identity(3, Layout::Col).unwrap();
        assert_eq!(eye[(1, 1)], 1.0);
        assert_eq!(eye[(0, 1)], 0.0);
    }

    #[test]
    fn test_real_complex_round_trip() {
        let r = sample(Layout::Col);
        let mut c = Matrix::<Complex64>::from_real(&r).unwrap();
        c[(0, 2)] += Complex64::new(0.0, 1e-30);
        assert_eq!(c.real_part().unwrap(), r);
        assert_eq!(c.imag_part().unwrap()[(0, 2)], 1e-30);
    }

    #[test]
    fn test_zero_sized_matrix() {
        let m = Matrix::<f64>::zeros(0, 5, Layout::Row).unwrap();
        assert!(m.is_empty());
        assert_eq!(m.data.capacity(), 0);
    }
}
