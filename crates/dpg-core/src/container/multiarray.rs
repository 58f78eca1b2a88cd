//! Order-N container.
//!
//! A [`Multiarray`] stores `product(extents)` entries in one flat buffer. In
//! [`Layout::Col`] the first index varies fastest, so
//! `(i0, i1, i2)` lives at `i0 + e0 * (i1 + e1 * i2)`; in [`Layout::Row`] the
//! last index varies fastest.
//!
//! Column-major multiarrays are the usual shape for per-node quantities: the
//! leading extent runs over nodes, so every trailing index tuple selects a
//! contiguous column (see [`MultiarrayBase::col`] and
//! [`MultiarrayBase::sub_matrix`]).

use core::fmt;
use core::ops::{Index, IndexMut};

use crate::config::Config;
use crate::container::storage::{Storage, StorageMut};
use crate::container::{
    Layout, Matrix, MatrixBase, MatrixView, VectorView, alloc_copy, alloc_filled, check_len,
    checked_len,
};
use crate::error::{CoreError, Result};
use crate::{Element, Scalar};

/// Highest supported order.
pub const MAX_ORDER: usize = 6;

// ======================================================================
// Extents
// ======================================================================

/// The extents of a multiarray, stored inline so views never allocate.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Extents {
    dims: [usize; MAX_ORDER],
    order: usize,
}

impl Extents {
    /// Validate `dims` (order between 1 and [`MAX_ORDER`]).
    pub fn new(dims: &[usize]) -> Result<Self> {
        if dims.is_empty() || dims.len() > MAX_ORDER {
            return Err(CoreError::InvalidArgument {
                reason: "multiarray order must be between 1 and MAX_ORDER",
            });
        }
        let mut inline = [0; MAX_ORDER];
        inline[..dims.len()].copy_from_slice(dims);
        Ok(Self {
            dims: inline,
            order: dims.len(),
        })
    }

    #[inline]
    pub fn order(&self) -> usize {
        self.order
    }

    #[inline]
    pub fn as_slice(&self) -> &[usize] {
        &self.dims[..self.order]
    }

    /// Product of the extents.
    pub fn product(&self) -> usize {
        self.as_slice().iter().product()
    }

    fn contains(&self, index: &[usize]) -> bool {
        index.len() == self.order && index.iter().zip(self.as_slice()).all(|(&i, &e)| i < e)
    }
}

impl fmt::Debug for Extents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.as_slice()).finish()
    }
}

// ======================================================================
// MultiarrayBase
// ======================================================================

/// A dense order-N array, generic over its ownership.
#[derive(Debug, Clone, PartialEq)]
pub struct MultiarrayBase<D: Storage> {
    pub(crate) data: D,
    extents: Extents,
    layout: Layout,
}

/// An owning multiarray.
pub type Multiarray<T> = MultiarrayBase<Vec<T>>;

/// A non-owning, read-only multiarray.
pub type MultiarrayView<'a, T> = MultiarrayBase<&'a [T]>;

impl<D: Storage> MultiarrayBase<D> {
    #[inline]
    pub fn order(&self) -> usize {
        self.extents.order()
    }

    #[inline]
    pub fn extents(&self) -> &[usize] {
        self.extents.as_slice()
    }

    #[inline]
    pub fn layout(&self) -> Layout {
        self.layout
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.as_slice().len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn as_slice(&self) -> &[D::Elem] {
        self.data.as_slice()
    }

    /// Zero-copy const view.
    #[inline]
    pub fn view(&self) -> MultiarrayView<'_, D::Elem> {
        MultiarrayBase {
            data: self.data.as_slice(),
            extents: self.extents,
            layout: self.layout,
        }
    }

    /// Reinterpret as a const view for a read-only consumer.
    #[inline]
    pub fn as_const(&self) -> MultiarrayView<'_, D::Elem> {
        self.view()
    }

    /// Buffer offset of `index`. The caller guarantees it is in range.
    pub fn offset(&self, index: &[usize]) -> usize {
        let dims = self.extents();
        match self.layout {
            Layout::Col => index
                .iter()
                .zip(dims)
                .rev()
                .fold(0, |off, (&i, &e)| off * e + i),
            Layout::Row => index
                .iter()
                .zip(dims)
                .fold(0, |off, (&i, &e)| off * e + i),
        }
    }

    fn index_error(&self, index: &[usize]) -> CoreError {
        CoreError::Index {
            container: "Multiarray",
            index: index.to_vec(),
            extents: self.extents().to_vec(),
        }
    }

    /// Checked element access.
    pub fn get(&self, index: &[usize]) -> Result<D::Elem> {
        if !self.extents.contains(index) {
            return Err(self.index_error(index));
        }
        Ok(self.as_slice()[self.offset(index)])
    }

    fn require_col(&self, op: &'static str) -> Result<()> {
        if self.layout != Layout::Col {
            return Err(CoreError::LayoutMismatch {
                op,
                required: Layout::Col,
                got: self.layout,
            });
        }
        Ok(())
    }

    /// Number of columns when the array is read as `ext_0 x (ext_1 * ...)`.
    fn trailing_len(&self) -> usize {
        self.extents()[1..].iter().product()
    }

    /// Column `j` of a column-major array, i.e. all entries sharing the
    /// flattened trailing index `j`.
    pub fn col(&self, j: usize) -> Result<VectorView<'_, D::Elem>> {
        self.require_col("Multiarray::col")?;
        if j >= self.trailing_len() {
            return Err(self.index_error(&[0, j]));
        }
        let n = self.extents()[0];
        Ok(VectorView::new(&self.as_slice()[j * n..(j + 1) * n]))
    }

    /// The `ext_0 x ext_1` matrix selected by the trailing indices `tail`.
    pub fn sub_matrix(&self, tail: &[usize]) -> Result<MatrixView<'_, D::Elem>> {
        self.require_col("Multiarray::sub_matrix")?;
        let dims = self.extents();
        if dims.len() < 2 || tail.len() != dims.len() - 2 {
            return Err(CoreError::DimensionMismatch {
                op: "Multiarray::sub_matrix",
                expected: vec![dims.len().saturating_sub(2)],
                got: vec![tail.len()],
            });
        }
        if tail.iter().zip(&dims[2..]).any(|(&i, &e)| i >= e) {
            let mut index = vec![0, 0];
            index.extend_from_slice(tail);
            return Err(self.index_error(&index));
        }
        let (rows, cols) = (dims[0], dims[1]);
        let block = tail
            .iter()
            .zip(&dims[2..])
            .rev()
            .fold(0, |off, (&i, &e)| off * e + i);
        let start = block * rows * cols;
        Ok(MatrixBase::from_parts(
            &self.as_slice()[start..start + rows * cols],
            rows,
            cols,
            Layout::Col,
        ))
    }

    /// View an order-2 array as a matrix.
    pub fn as_matrix(&self) -> Result<MatrixView<'_, D::Elem>> {
        match *self.extents() {
            [rows, cols] => Ok(MatrixBase::from_parts(
                self.as_slice(),
                rows,
                cols,
                self.layout,
            )),
            _ => Err(CoreError::DimensionMismatch {
                op: "Multiarray::as_matrix",
                expected: vec![2],
                got: vec![self.order()],
            }),
        }
    }

    /// View an order-1 array as a vector.
    pub fn as_vector(&self) -> Result<VectorView<'_, D::Elem>> {
        if self.order() != 1 {
            return Err(CoreError::DimensionMismatch {
                op: "Multiarray::as_vector",
                expected: vec![1],
                got: vec![self.order()],
            });
        }
        Ok(VectorView::new(self.as_slice()))
    }

    /// Copy into a new owning multiarray.
    pub fn to_multiarray(&self) -> Result<Multiarray<D::Elem>> {
        let data = alloc_copy("Multiarray", self.extents(), self.as_slice())?;
        Ok(MultiarrayBase {
            data,
            extents: self.extents,
            layout: self.layout,
        })
    }
}

impl<'a, T: Element> MultiarrayView<'a, T> {
    /// Borrow `data` with the given extents. Never allocates.
    pub fn new(data: &'a [T], extents: &[usize], layout: Layout) -> Result<Self> {
        let extents = Extents::new(extents)?;
        check_len("MultiarrayView", extents.as_slice(), data.len())?;
        Ok(Self {
            data,
            extents,
            layout,
        })
    }
}

impl<T: Element> Multiarray<T> {
    /// A multiarray of default (zero) entries.
    pub fn zeros(extents: &[usize], layout: Layout) -> Result<Self> {
        Self::filled(extents, layout, T::default())
    }

    /// A multiarray of copies of `value`.
    pub fn filled(extents: &[usize], layout: Layout, value: T) -> Result<Self> {
        let ext = Extents::new(extents)?;
        let len = checked_len("Multiarray", extents)?;
        let data = alloc_filled("Multiarray", extents, len, value)?;
        tracing::trace!(container = "Multiarray", extents = ?ext, %layout, "constructed");
        Ok(Self {
            data,
            extents: ext,
            layout,
        })
    }

    /// Take ownership of an existing buffer.
    pub fn from_vec(extents: &[usize], layout: Layout, data: Vec<T>) -> Result<Self> {
        let ext = Extents::new(extents)?;
        check_len("Multiarray", extents, data.len())?;
        Ok(Self {
            data,
            extents: ext,
            layout,
        })
    }

    /// Move a matrix into an order-2 multiarray.
    pub fn from_matrix(m: Matrix<T>) -> Self {
        let (rows, cols) = m.extents();
        let layout = m.layout();
        let mut dims = [0; MAX_ORDER];
        dims[0] = rows;
        dims[1] = cols;
        Self {
            data: m.into_vec(),
            extents: Extents { dims, order: 2 },
            layout,
        }
    }

    /// Move an order-2 multiarray into a matrix.
    pub fn into_matrix(self) -> Result<Matrix<T>> {
        if self.order() != 2 {
            return Err(CoreError::DimensionMismatch {
                op: "Multiarray::into_matrix",
                expected: vec![2],
                got: vec![self.order()],
            });
        }
        let (rows, cols) = (self.extents.dims[0], self.extents.dims[1]);
        Ok(MatrixBase::from_parts(self.data, rows, cols, self.layout))
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        self.data.as_mut_slice()
    }

    /// Checked element write.
    pub fn set(&mut self, index: &[usize], value: T) -> Result<()> {
        if !self.extents.contains(index) {
            return Err(self.index_error(index));
        }
        let k = self.offset(index);
        self.data[k] = value;
        Ok(())
    }

    /// Mutable column `j` of a column-major array.
    pub fn col_mut(&mut self, j: usize) -> Result<&mut [T]> {
        self.require_col("Multiarray::col_mut")?;
        if j >= self.trailing_len() {
            return Err(self.index_error(&[0, j]));
        }
        let n = self.extents()[0];
        Ok(&mut self.data[j * n..(j + 1) * n])
    }

    pub fn fill(&mut self, value: T) {
        self.data.fill(value);
    }

    #[inline]
    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    /// Release the buffer. Consumes the multiarray.
    pub fn destroy(self) {
        tracing::trace!(container = "Multiarray", extents = ?self.extents, "destroyed");
        drop(self);
    }

    // ------------------------------------------------------------------
    // Config-sized constructors
    // ------------------------------------------------------------------

    /// Zeros with the given extents in the configured layout.
    pub fn zeros_with(cfg: &Config, extents: &[usize]) -> Result<Self> {
        Self::zeros(extents, cfg.layout)
    }

    /// Nodal solution coefficients: `[n_nodes, n_var]`.
    pub fn solution(cfg: &Config, n_nodes: usize) -> Result<Self> {
        Self::zeros_with(cfg, &[n_nodes, cfg.n_var])
    }

    /// Nodal flux values per equation: `[n_nodes, n_eq]`.
    pub fn flux(cfg: &Config, n_nodes: usize) -> Result<Self> {
        Self::zeros_with(cfg, &[n_nodes, cfg.n_eq])
    }

    /// Nodal flux Jacobian: `[n_nodes, n_eq, n_var]`.
    pub fn flux_jacobian(cfg: &Config, n_nodes: usize) -> Result<Self> {
        Self::zeros_with(cfg, &[n_nodes, cfg.n_eq, cfg.n_var])
    }

    /// Basis coefficients of an order-`p` element: `[(p + 1)^dim, n_var]`.
    pub fn coefficients(cfg: &Config, p: usize) -> Result<Self> {
        Self::zeros_with(cfg, &[cfg.n_basis(p)?, cfg.n_var])
    }
}

impl<T: Scalar> Multiarray<T> {
    /// Promote a real multiarray to this scalar type.
    pub fn from_real<E: Storage<Elem = T::Real>>(src: &MultiarrayBase<E>) -> Result<Self> {
        let mut out = Self::zeros(src.extents(), src.layout)?;
        for (o, &r) in out.data.iter_mut().zip(src.as_slice()) {
            *o = T::from_real(r);
        }
        Ok(out)
    }

    /// Multiply every entry by `alpha`.
    pub fn scale(&mut self, alpha: T) {
        for x in &mut self.data {
            *x *= alpha;
        }
    }
}

impl<D> MultiarrayBase<D>
where
    D: Storage,
    D::Elem: Scalar,
{
    /// Real-part projection, same extents and layout.
    pub fn real_part(&self) -> Result<Multiarray<<D::Elem as Scalar>::Real>> {
        let mut out = Multiarray::zeros(self.extents(), self.layout)?;
        for (o, &x) in out.data.iter_mut().zip(self.as_slice()) {
            *o = x.real_part();
        }
        Ok(out)
    }

    /// Imaginary-part projection, same extents and layout.
    pub fn imag_part(&self) -> Result<Multiarray<<D::Elem as Scalar>::Real>> {
        let mut out = Multiarray::zeros(self.extents(), self.layout)?;
        for (o, &x) in out.data.iter_mut().zip(self.as_slice()) {
            *o = x.imag_part();
        }
        Ok(out)
    }
}

impl<D: Storage, const N: usize> Index<[usize; N]> for MultiarrayBase<D> {
    type Output = D::Elem;

    #[inline]
    fn index(&self, index: [usize; N]) -> &D::Elem {
        debug_assert!(self.extents.contains(&index), "{}", self.index_error(&index));
        &self.data.as_slice()[self.offset(&index)]
    }
}

impl<D: StorageMut, const N: usize> IndexMut<[usize; N]> for MultiarrayBase<D> {
    #[inline]
    fn index_mut(&mut self, index: [usize; N]) -> &mut D::Elem {
        debug_assert!(self.extents.contains(&index), "{}", self.index_error(&index));
        let k = self.offset(&index);
        &mut self.data.as_mut_slice()[k]
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    fn arange(extents: &[usize], layout: Layout) -> Multiarray<f64> {
        let n = extents.iter().product::<usize>();
        Multiarray::from_vec(extents, layout, (0..n).map(|k| k as f64).collect()).unwrap()
    }

    #[test]
    fn test_col_major_offsets() {
        let a = arange(&[2, 3, 4], Layout::Col);
        assert_eq!(a.offset(&[1, 0, 0]), 1);
        assert_eq!(a.offset(&[0, 1, 0]), 2);
        assert_eq!(a.offset(&[0, 0, 1]), 6);
        assert_eq!(a[[1, 2, 3]], 23.0);
    }

    #[test]
    fn test_row_major_offsets() {
        let a = arange(&[2, 3, 4], Layout::Row);
        assert_eq!(a.offset(&[0, 0, 1]), 1);
        assert_eq!(a.offset(&[0, 1, 0]), 4);
        assert_eq!(a.offset(&[1, 0, 0]), 12);
    }

    #[test]
    fn test_order_bounds() {
        assert!(Multiarray::<f64>::zeros(&[], Layout::Col).is_err());
        assert!(Multiarray::<f64>::zeros(&[1; MAX_ORDER + 1], Layout::Col).is_err());
        assert!(Multiarray::<f64>::zeros(&[1; MAX_ORDER], Layout::Col).is_ok());
    }

    #[test]
    fn test_view_new_length_mismatch() {
        let buf = [0.0; 5];
        let err = MultiarrayView::new(&buf, &[2, 3], Layout::Col).unwrap_err();
        assert!(matches!(err, CoreError::InvariantViolation { .. }));
    }

    #[test]
    fn test_view_sees_owner_mutation() {
        for layout in [Layout::Row, Layout::Col] {
            let mut a = arange(&[2, 3, 2], layout);
            a[[1, 2, 1]] = -1.0;
            a.set(&[0, 1, 0], 42.0).unwrap();
            let v = a.view();
            assert_eq!(v[[1, 2, 1]], -1.0);
            assert_eq!(v.get(&[0, 1, 0]).unwrap(), 42.0);
            assert_eq!(v.layout(), layout);
            assert_eq!(v.as_slice().as_ptr(), a.as_slice().as_ptr());
        }
    }

    #[test]
    fn test_checked_get_and_set() {
        let mut a = Multiarray::<f64>::zeros(&[2, 2], Layout::Col).unwrap();
        a.set(&[1, 0], 4.0).unwrap();
        assert_eq!(a.get(&[1, 0]).unwrap(), 4.0);
        assert!(a.get(&[2, 0]).is_err());
        assert!(a.get(&[0, 0, 0]).is_err());
        assert!(a.set(&[0, 2], 1.0).is_err());
    }

    #[test]
    fn test_col_and_sub_matrix() {
        let a = arange(&[2, 3, 2], Layout::Col);
        assert_eq!(a.col(4).unwrap().as_slice(), &[8.0, 9.0]);
        assert!(a.col(6).is_err());
        let m = a.sub_matrix(&[1]).unwrap();
        assert_eq!(m.extents(), (2, 3));
        assert_eq!(m[(0, 0)], 6.0);
        assert_eq!(m[(1, 2)], 11.0);
        assert!(a.sub_matrix(&[2]).is_err());
        assert!(a.sub_matrix(&[]).is_err());
    }

    #[test]
    fn test_col_requires_col_layout() {
        let a = arange(&[2, 3], Layout::Row);
        assert!(matches!(a.col(0), Err(CoreError::LayoutMismatch { .. })));
    }

    #[test]
    fn test_matrix_round_trip() {
        let m = Matrix::from_vec(2, 2, Layout::Row, vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        let a = Multiarray::from_matrix(m.clone());
        assert_eq!(a.extents(), &[2, 2]);
        assert_eq!(a.as_matrix().unwrap()[(1, 0)], 3.0);
        assert_eq!(a.into_matrix().unwrap(), m);
        assert!(arange(&[2], Layout::Col).into_matrix().is_err());
    }

    #[test]
    fn test_as_vector() {
        let a = arange(&[3], Layout::Col);
        assert_eq!(a.as_vector().unwrap().as_slice(), &[0.0, 1.0, 2.0]);
        assert!(arange(&[3, 1], Layout::Col).as_vector().is_err());
    }

    #[test]
    fn test_config_sized_constructors() {
        let cfg = Config::default().with_n_eq(4).with_n_var(4).with_layout(Layout::Col);
        let s = Multiarray::<f64>::solution(&cfg, 10).unwrap();
        assert_eq!(s.extents(), &[10, 4]);
        let j = Multiarray::<f64>::flux_jacobian(&cfg, 10).unwrap();
        assert_eq!(j.extents(), &[10, 4, 4]);
        assert_eq!(j.layout(), Layout::Col);
        let f = Multiarray::<f64>::flux(&cfg, 3).unwrap();
        assert_eq!(f.len(), 12);
    }

    #[test]
    fn test_coefficients_sized_by_dim_and_order() {
        let cfg = Config::default().with_dim(2).with_p_max(3).with_n_var(4);
        let c = Multiarray::<f64>::coefficients(&cfg, 2).unwrap();
        assert_eq!(c.extents(), &[9, 4]);
        assert!(Multiarray::<f64>::coefficients(&cfg, 4).is_err());
    }

    #[test]
    fn test_zero_extent_has_no_storage() {
        let a = Multiarray::<f64>::zeros(&[0, 4], Layout::Col).unwrap();
        assert!(a.is_empty());
        assert_eq!(a.data.capacity(), 0);
    }
}
