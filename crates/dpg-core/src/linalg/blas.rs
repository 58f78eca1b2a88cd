//! BLAS Level 1–3 operations on the dense containers.
//!
//! Every two-operand routine reads its inputs through the logical `(i, j)`
//! index and accumulates in a fixed order (`p = 0, 1, ..., k-1`), so the
//! result is bit-identical for every combination of operand layouts. The
//! output keeps its own layout.

use crate::container::storage::Storage;
use crate::container::{
    Layout, Matrix, MatrixBase, Multiarray, MultiarrayBase, Vector, VectorBase,
};
use crate::error::{CoreError, Result};
use crate::{Real, Scalar};

/// Whether an operand enters a product as stored or transposed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Transpose {
    /// `'N'`
    #[default]
    No,
    /// `'T'`
    Yes,
}

impl Transpose {
    /// Parse a BLAS-style `'N'`/`'T'` flag.
    pub fn from_char(c: char) -> Result<Self> {
        match c {
            'N' | 'n' => Ok(Self::No),
            'T' | 't' => Ok(Self::Yes),
            _ => Err(CoreError::InvalidArgument {
                reason: "transpose flag must be 'N' or 'T'",
            }),
        }
    }
}

/// Side of the diagonal matrix in [`scale_by_diagonal`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    /// `diag(d) * A`: row `i` is scaled by `d_i`.
    Left,
    /// `A * diag(d)`: column `j` is scaled by `d_j`.
    Right,
}

/// Logical extents of `op(a)`.
fn op_extents<D: Storage>(a: &MatrixBase<D>, trans: Transpose) -> (usize, usize) {
    match trans {
        Transpose::No => a.extents(),
        Transpose::Yes => (a.cols(), a.rows()),
    }
}

/// Entry `(i, j)` of `op(a)`.
#[inline]
fn op_at<D: Storage>(a: &MatrixBase<D>, trans: Transpose, i: usize, j: usize) -> D::Elem {
    match trans {
        Transpose::No => a[(i, j)],
        Transpose::Yes => a[(j, i)],
    }
}

// ======================================================================
// BLAS Level 1 — vector operations, O(n)
// ======================================================================

/// Inner (dot) product `sum(x_i * y_i)`, no conjugation.
///
/// ```
/// # use dpg_core::container::Vector;
/// # use dpg_core::linalg::dot;
/// let x = Vector::from_vec(vec![1.0_f64, 2.0, 3.0]);
/// let y = Vector::from_vec(vec![4.0_f64, 5.0, 6.0]);
/// assert_eq!(dot(&x, &y.view()).unwrap(), 32.0);
/// ```
pub fn dot<T, DX, DY>(x: &VectorBase<DX>, y: &VectorBase<DY>) -> Result<T>
where
    T: Scalar,
    DX: Storage<Elem = T>,
    DY: Storage<Elem = T>,
{
    crate::math::dot(x.as_slice(), y.as_slice())
}

/// `y = alpha * x + y`.
///
/// ```
/// # use dpg_core::container::Vector;
/// # use dpg_core::linalg::axpy;
/// let x = Vector::from_vec(vec![1.0, 2.0, 3.0]);
/// let mut y = Vector::from_vec(vec![10.0, 20.0, 30.0]);
/// axpy(2.0, &x, &mut y).unwrap();
/// assert_eq!(y.as_slice(), &[12.0, 24.0, 36.0]);
/// ```
pub fn axpy<T, DX>(alpha: T, x: &VectorBase<DX>, y: &mut Vector<T>) -> Result<()>
where
    T: Scalar,
    DX: Storage<Elem = T>,
{
    crate::math::axpy(alpha, x.as_slice(), y.as_mut_slice())
}

/// Euclidean norm `sqrt(sum(|x_i|^2))`.
pub fn nrm2<D>(x: &VectorBase<D>) -> <D::Elem as Scalar>::Real
where
    D: Storage,
    D::Elem: Scalar,
{
    crate::math::norm(x.as_slice(), crate::container::NormType::L2)
}

/// Sum of magnitudes `sum(|x_i|)`.
pub fn asum<D>(x: &VectorBase<D>) -> <D::Elem as Scalar>::Real
where
    D: Storage,
    D::Elem: Scalar,
{
    x.iter().map(|&v| v.modulus()).sum()
}

/// Scale a vector in place: `x = alpha * x`.
pub fn scal<T: Scalar>(alpha: T, x: &mut Vector<T>) {
    x.scale(alpha);
}

/// Index of the entry with the largest magnitude; `None` when empty.
pub fn iamax<D>(x: &VectorBase<D>) -> Option<usize>
where
    D: Storage,
    D::Elem: Scalar,
{
    let mut best: Option<(usize, <D::Elem as Scalar>::Real)> = None;
    for (i, &v) in x.iter().enumerate() {
        let m = v.modulus();
        match best {
            Some((_, b)) if m <= b => {}
            _ => best = Some((i, m)),
        }
    }
    best.map(|(i, _)| i)
}

// ======================================================================
// BLAS Level 2 — matrix-vector operations, O(n^2)
// ======================================================================

/// General matrix-vector multiply: `y = alpha * op(A) * x + beta * y`.
///
/// If `beta` is zero, `y` is overwritten (not read).
///
/// ```
/// # use dpg_core::container::{Layout, Matrix, Vector};
/// # use dpg_core::linalg::{mv, Transpose};
/// // A = [[1, 2], [3, 4]], x = [5, 6]
/// let a = Matrix::from_vec(2, 2, Layout::Col, vec![1.0, 3.0, 2.0, 4.0]).unwrap();
/// let x = Vector::from_vec(vec![5.0, 6.0]);
/// let mut y = Vector::<f64>::zeros(2).unwrap();
/// mv(Transpose::No, 1.0, &a, &x, 0.0, &mut y).unwrap();
/// assert_eq!(y.as_slice(), &[17.0, 39.0]);
/// ```
#[allow(clippy::many_single_char_names)]
pub fn mv<T, DA, DX>(
    trans: Transpose,
    alpha: T,
    a: &MatrixBase<DA>,
    x: &VectorBase<DX>,
    beta: T,
    y: &mut Vector<T>,
) -> Result<()>
where
    T: Scalar,
    DA: Storage<Elem = T>,
    DX: Storage<Elem = T>,
{
    mv_impl(trans, alpha, a, x, beta, y, |a_ij, x_j| a_ij * x_j)
}

/// [`mv`] with a real operator applied to scalar data (`T` may be complex).
#[allow(clippy::many_single_char_names)]
pub fn mv_real<T, DA, DX>(
    trans: Transpose,
    alpha: T,
    a: &MatrixBase<DA>,
    x: &VectorBase<DX>,
    beta: T,
    y: &mut Vector<T>,
) -> Result<()>
where
    T: Scalar,
    DA: Storage<Elem = T::Real>,
    DX: Storage<Elem = T>,
{
    mv_impl(trans, alpha, a, x, beta, y, |a_ij, x_j: T| x_j.scale(a_ij))
}

#[allow(clippy::many_single_char_names)]
fn mv_impl<T, DA, DX, F>(
    trans: Transpose,
    alpha: T,
    a: &MatrixBase<DA>,
    x: &VectorBase<DX>,
    beta: T,
    y: &mut Vector<T>,
    mul: F,
) -> Result<()>
where
    T: Scalar,
    DA: Storage,
    DX: Storage<Elem = T>,
    F: Fn(DA::Elem, T) -> T,
{
    let (m, n) = op_extents(a, trans);
    if x.len() != n || y.len() != m {
        return Err(CoreError::DimensionMismatch {
            op: "mv",
            expected: vec![m, n],
            got: vec![y.len(), x.len()],
        });
    }
    let overwrite = beta == T::zero();
    let xs = x.as_slice();
    for (i, yi) in y.as_mut_slice().iter_mut().enumerate() {
        let mut sum = T::zero();
        for (j, &xj) in xs.iter().enumerate() {
            sum += mul(op_at(a, trans, i, j), xj);
        }
        *yi = if overwrite {
            alpha * sum
        } else {
            alpha * sum + beta * *yi
        };
    }
    Ok(())
}

/// Allocate and return `alpha * op(A) * x`.
pub fn mv_new<T, DA, DX>(
    trans: Transpose,
    alpha: T,
    a: &MatrixBase<DA>,
    x: &VectorBase<DX>,
) -> Result<Vector<T>>
where
    T: Scalar,
    DA: Storage<Elem = T>,
    DX: Storage<Elem = T>,
{
    let mut y = Vector::zeros(op_extents(a, trans).0)?;
    mv(trans, alpha, a, x, T::zero(), &mut y)?;
    Ok(y)
}

// ======================================================================
// BLAS Level 3 — matrix-matrix operations, O(n^3)
// ======================================================================

/// General matrix-matrix multiply: `C = alpha * op(A) * op(B) + beta * C`.
///
/// Operands may use any layout; `c` keeps its own. If `beta` is zero, `c` is
/// overwritten (not read).
///
/// ```
/// # use dpg_core::container::{Layout, Matrix};
/// # use dpg_core::linalg::{mm, Transpose};
/// let a = Matrix::from_vec(2, 2, Layout::Row, vec![1.0, 2.0, 3.0, 4.0]).unwrap();
/// let b = Matrix::from_vec(2, 2, Layout::Col, vec![5.0, 7.0, 6.0, 8.0]).unwrap();
/// let mut c = Matrix::<f64>::zeros(2, 2, Layout::Row).unwrap();
/// mm(Transpose::No, Transpose::No, 1.0, &a, &b, 0.0, &mut c).unwrap();
/// assert_eq!(c.as_slice(), &[19.0, 22.0, 43.0, 50.0]);
/// ```
#[allow(clippy::many_single_char_names)]
pub fn mm<T, DA, DB>(
    trans_a: Transpose,
    trans_b: Transpose,
    alpha: T,
    a: &MatrixBase<DA>,
    b: &MatrixBase<DB>,
    beta: T,
    c: &mut Matrix<T>,
) -> Result<()>
where
    T: Scalar,
    DA: Storage<Elem = T>,
    DB: Storage<Elem = T>,
{
    mm_impl(trans_a, trans_b, alpha, a, b, beta, c, |x, y| x * y)
}

/// [`mm`] with a real left operand applied to scalar data (`T` may be
/// complex).
#[allow(clippy::many_single_char_names)]
pub fn mm_real<T, DA, DB>(
    trans_a: Transpose,
    trans_b: Transpose,
    alpha: T,
    a: &MatrixBase<DA>,
    b: &MatrixBase<DB>,
    beta: T,
    c: &mut Matrix<T>,
) -> Result<()>
where
    T: Scalar,
    DA: Storage<Elem = T::Real>,
    DB: Storage<Elem = T>,
{
    mm_impl(trans_a, trans_b, alpha, a, b, beta, c, |x, y: T| y.scale(x))
}

#[allow(clippy::many_single_char_names, clippy::too_many_arguments)]
fn mm_impl<T, DA, DB, F>(
    trans_a: Transpose,
    trans_b: Transpose,
    alpha: T,
    a: &MatrixBase<DA>,
    b: &MatrixBase<DB>,
    beta: T,
    c: &mut Matrix<T>,
    mul: F,
) -> Result<()>
where
    T: Scalar,
    DA: Storage,
    DB: Storage<Elem = T>,
    F: Fn(DA::Elem, T) -> T,
{
    let (m, k) = op_extents(a, trans_a);
    let (kb, n) = op_extents(b, trans_b);
    if kb != k {
        return Err(CoreError::DimensionMismatch {
            op: "mm",
            expected: vec![k, n],
            got: vec![kb, n],
        });
    }
    if c.extents() != (m, n) {
        return Err(CoreError::DimensionMismatch {
            op: "mm",
            expected: vec![m, n],
            got: vec![c.rows(), c.cols()],
        });
    }
    let overwrite = beta == T::zero();
    for i in 0..m {
        for j in 0..n {
            let mut sum = T::zero();
            for p in 0..k {
                sum += mul(op_at(a, trans_a, i, p), op_at(b, trans_b, p, j));
            }
            let cij = &mut c[(i, j)];
            *cij = if overwrite {
                alpha * sum
            } else {
                alpha * sum + beta * *cij
            };
        }
    }
    Ok(())
}

/// Allocate and return `alpha * op(A) * op(B)` stored in `layout`.
pub fn mm_new<T, DA, DB>(
    trans_a: Transpose,
    trans_b: Transpose,
    alpha: T,
    a: &MatrixBase<DA>,
    b: &MatrixBase<DB>,
    layout: Layout,
) -> Result<Matrix<T>>
where
    T: Scalar,
    DA: Storage<Elem = T>,
    DB: Storage<Elem = T>,
{
    let m = op_extents(a, trans_a).0;
    let n = op_extents(b, trans_b).1;
    let mut c = Matrix::zeros(m, n, layout)?;
    mm(trans_a, trans_b, alpha, a, b, T::zero(), &mut c)?;
    Ok(c)
}

/// Apply an operator along the leading extent of a column-major multiarray:
/// every column block `B[:, :, tail]` is replaced by `A * B[:, :, tail]`.
///
/// The result has extents `[A.rows, ext_1, ..., ext_{N-1}]`, column-major.
pub fn mm_multiarray<T, DA, DB>(alpha: T, a: &MatrixBase<DA>, b: &MultiarrayBase<DB>) -> Result<Multiarray<T>>
where
    T: Scalar,
    DA: Storage<Elem = T>,
    DB: Storage<Elem = T>,
{
    if b.layout() != Layout::Col {
        return Err(CoreError::LayoutMismatch {
            op: "mm_multiarray",
            required: Layout::Col,
            got: b.layout(),
        });
    }
    let ext = b.extents();
    if a.cols() != ext[0] {
        return Err(CoreError::DimensionMismatch {
            op: "mm_multiarray",
            expected: vec![a.cols()],
            got: vec![ext[0]],
        });
    }
    let mut out_ext = ext.to_vec();
    out_ext[0] = a.rows();
    let mut out = Multiarray::zeros(&out_ext, Layout::Col)?;
    let n_cols: usize = ext[1..].iter().product();
    for col in 0..n_cols {
        let src = b.col(col)?;
        let dst = out.col_mut(col)?;
        for (i, d) in dst.iter_mut().enumerate() {
            let mut sum = T::zero();
            for (p, &x) in src.iter().enumerate() {
                sum += a[(i, p)] * x;
            }
            *d = alpha * sum;
        }
    }
    Ok(out)
}

/// Scale `a` in place by the diagonal matrix `diag(d)` (or its inverse when
/// `invert` is set) from the given side.
pub fn scale_by_diagonal<T, DD>(side: Side, alpha: T, a: &mut Matrix<T>, d: &VectorBase<DD>, invert: bool) -> Result<()>
where
    T: Scalar,
    DD: Storage<Elem = T>,
{
    let (rows, cols) = a.extents();
    let expected = match side {
        Side::Left => rows,
        Side::Right => cols,
    };
    if d.len() != expected {
        return Err(CoreError::DimensionMismatch {
            op: "scale_by_diagonal",
            expected: vec![expected],
            got: vec![d.len()],
        });
    }
    for i in 0..rows {
        for j in 0..cols {
            let di = match side {
                Side::Left => d[i],
                Side::Right => d[j],
            };
            let f = if invert { alpha / di } else { alpha * di };
            a[(i, j)] *= f;
        }
    }
    Ok(())
}

// ======================================================================
// Convenience methods
// ======================================================================

impl<D> MatrixBase<D>
where
    D: Storage,
    D::Elem: Scalar,
{
    /// Matrix-vector product `self * x` as a new vector.
    pub fn matvec<E: Storage<Elem = D::Elem>>(&self, x: &VectorBase<E>) -> Result<Vector<D::Elem>> {
        mv_new(Transpose::No, D::Elem::one(), self, x)
    }

    /// Matrix-matrix product `self * other`, stored in `self`'s layout.
    pub fn matmul<E: Storage<Elem = D::Elem>>(&self, other: &MatrixBase<E>) -> Result<Matrix<D::Elem>> {
        mm_new(
            Transpose::No,
            Transpose::No,
            D::Elem::one(),
            self,
            other,
            self.layout(),
        )
    }

    /// Largest entry magnitude.
    pub fn max_abs(&self) -> <D::Elem as Scalar>::Real {
        crate::math::maximum_abs(self.as_slice())
    }

    /// Relative infinity-norm difference to `other`, compared entry by
    /// logical index.
    pub fn norm_diff<E: Storage<Elem = D::Elem>>(&self, other: &MatrixBase<E>) -> Result<<D::Elem as Scalar>::Real> {
        if self.extents() != other.extents() {
            return Err(CoreError::DimensionMismatch {
                op: "Matrix::norm_diff",
                expected: vec![self.rows(), self.cols()],
                got: vec![other.rows(), other.cols()],
            });
        }
        let mut diff = <D::Elem as Scalar>::Real::zero();
        for i in 0..self.rows() {
            for j in 0..self.cols() {
                diff = diff.max((self[(i, j)] - other[(i, j)]).modulus());
            }
        }
        let den = self.max_abs().max(other.max_abs());
        if den > <D::Elem as Scalar>::Real::epsilon() {
            Ok(diff / den)
        } else {
            Ok(diff)
        }
    }
}
