//! Rank-1 container.

use core::ops::{Index, IndexMut};

use crate::container::storage::{Storage, StorageMut};
use crate::container::{alloc_copy, alloc_filled, checked_len};
use crate::error::{CoreError, Result};
use crate::math;
use crate::{Element, Scalar};

/// Norm selector for vector and slice norms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NormType {
    /// Euclidean norm.
    #[default]
    L2,
    /// Maximum entry magnitude.
    Inf,
}

/// A 1-D sequence of elements, generic over its ownership.
///
/// Use the [`Vector`] (owning) and [`VectorView`] (const view) aliases.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorBase<D: Storage> {
    pub(crate) data: D,
}

/// An owning vector. Dropping it (or calling [`Vector::destroy`]) frees the
/// buffer.
pub type Vector<T> = VectorBase<Vec<T>>;

/// A non-owning, read-only vector aliasing a buffer owned elsewhere.
pub type VectorView<'a, T> = VectorBase<&'a [T]>;

impl<D: Storage> VectorBase<D> {
    /// Number of entries (`ext_0`).
    #[inline]
    pub fn len(&self) -> usize {
        self.data.as_slice().len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The entries as a flat slice.
    #[inline]
    pub fn as_slice(&self) -> &[D::Elem] {
        self.data.as_slice()
    }

    /// Zero-copy const view of this vector.
    #[inline]
    pub fn view(&self) -> VectorView<'_, D::Elem> {
        VectorBase {
            data: self.data.as_slice(),
        }
    }

    /// Reinterpret as a const view for a read-only consumer. Same as
    /// [`view`](Self::view).
    #[inline]
    pub fn as_const(&self) -> VectorView<'_, D::Elem> {
        self.view()
    }

    /// Checked element access.
    pub fn get(&self, i: usize) -> Result<D::Elem> {
        self.as_slice()
            .get(i)
            .copied()
            .ok_or_else(|| CoreError::Index {
                container: "Vector",
                index: vec![i],
                extents: vec![self.len()],
            })
    }

    pub fn iter(&self) -> impl Iterator<Item = &D::Elem> {
        self.as_slice().iter()
    }

    /// Copy into a new owning vector.
    pub fn to_vector(&self) -> Result<Vector<D::Elem>> {
        let data = alloc_copy("Vector", &[self.len()], self.as_slice())?;
        Ok(Vector { data })
    }
}

impl<'a, T: Element> VectorView<'a, T> {
    /// Borrow `data` as a vector. Never allocates.
    #[inline]
    pub fn new(data: &'a [T]) -> Self {
        Self { data }
    }
}

impl<T: Element> Vector<T> {
    /// A vector of `n` default (zero) entries.
    pub fn zeros(n: usize) -> Result<Self> {
        Self::filled(n, T::default())
    }

    /// A vector of `n` copies of `value`.
    pub fn filled(n: usize, value: T) -> Result<Self> {
        let len = checked_len("Vector", &[n])?;
        let data = alloc_filled("Vector", &[n], len, value)?;
        tracing::trace!(container = "Vector", n, "constructed");
        Ok(Self { data })
    }

    /// Take ownership of an existing buffer (move constructor).
    pub fn from_vec(data: Vec<T>) -> Self {
        Self { data }
    }

    /// Copy a slice into a new owning vector.
    pub fn copy_from_slice(src: &[T]) -> Result<Self> {
        let data = alloc_copy("Vector", &[src.len()], src)?;
        Ok(Self { data })
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        self.data.as_mut_slice()
    }

    /// Checked element write.
    pub fn set(&mut self, i: usize, value: T) -> Result<()> {
        let n = self.len();
        match self.data.get_mut(i) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(CoreError::Index {
                container: "Vector",
                index: vec![i],
                extents: vec![n],
            }),
        }
    }

    /// Change the length, padding with default entries. A length of zero
    /// releases the backing storage.
    pub fn resize(&mut self, n: usize) -> Result<()> {
        if n == 0 {
            self.data = Vec::new();
            return Ok(());
        }
        if n > self.data.len() {
            self.data
                .try_reserve_exact(n - self.data.len())
                .map_err(|e| CoreError::Allocation {
                    container: "Vector",
                    extents: vec![n],
                    reason: e.to_string(),
                })?;
        }
        self.data.resize(n, T::default());
        Ok(())
    }

    pub fn fill(&mut self, value: T) {
        self.data.fill(value);
    }

    /// Apply a function to every entry in place.
    pub fn apply<F>(&mut self, f: F)
    where
        F: Fn(T) -> T,
    {
        for x in &mut self.data {
            *x = f(*x);
        }
    }

    /// Consume the vector and return the underlying buffer.
    #[inline]
    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    /// Release the buffer. Consumes the vector, so it cannot be destroyed
    /// twice.
    pub fn destroy(self) {
        tracing::trace!(container = "Vector", n = self.len(), "destroyed");
        drop(self);
    }
}

impl<T: Element + Ord> Vector<T> {
    /// Sort the entries in ascending order.
    pub fn sort(&mut self) {
        self.data.sort_unstable();
    }
}

impl<D> VectorBase<D>
where
    D: Storage,
    D::Elem: Scalar,
{
    pub fn sum(&self) -> D::Elem {
        self.iter().copied().sum()
    }

    /// Norm of the entry magnitudes.
    pub fn norm(&self, norm_type: NormType) -> <D::Elem as Scalar>::Real {
        math::norm(self.as_slice(), norm_type)
    }

    /// Inner product `sum(a_i * b_i)` (no conjugation, so it stays
    /// holomorphic).
    pub fn dot<E: Storage<Elem = D::Elem>>(&self, other: &VectorBase<E>) -> Result<D::Elem> {
        math::dot(self.as_slice(), other.as_slice())
    }

    /// Apply a function to every entry, returning a new vector.
    pub fn map<F>(&self, f: F) -> Result<Vector<D::Elem>>
    where
        F: Fn(D::Elem) -> D::Elem,
    {
        let mut out = self.to_vector()?;
        out.apply(f);
        Ok(out)
    }

    /// Apply a function entry-wise to two vectors of equal length.
    pub fn zip_map<E, F>(&self, other: &VectorBase<E>, f: F) -> Result<Vector<D::Elem>>
    where
        E: Storage<Elem = D::Elem>,
        F: Fn(D::Elem, D::Elem) -> D::Elem,
    {
        if self.len() != other.len() {
            return Err(CoreError::DimensionMismatch {
                op: "Vector::zip_map",
                expected: vec![self.len()],
                got: vec![other.len()],
            });
        }
        let data = self
            .iter()
            .zip(other.iter())
            .map(|(&a, &b)| f(a, b))
            .collect();
        Ok(Vector { data })
    }

    /// Real-part projection into a new real vector.
    pub fn real_part(&self) -> Result<Vector<<D::Elem as Scalar>::Real>> {
        let mut out = Vector::zeros(self.len())?;
        for (o, &x) in out.data.iter_mut().zip(self.iter()) {
            *o = x.real_part();
        }
        Ok(out)
    }

    /// Imaginary-part projection into a new real vector.
    pub fn imag_part(&self) -> Result<Vector<<D::Elem as Scalar>::Real>> {
        let mut out = Vector::zeros(self.len())?;
        for (o, &x) in out.data.iter_mut().zip(self.iter()) {
            *o = x.imag_part();
        }
        Ok(out)
    }
}

impl<T: Scalar> Vector<T> {
    /// Promote a real vector to this scalar type (imaginary parts zero).
    pub fn from_real<E: Storage<Elem = T::Real>>(src: &VectorBase<E>) -> Result<Self> {
        let mut out = Self::zeros(src.len())?;
        for (o, &r) in out.data.iter_mut().zip(src.iter()) {
            *o = T::from_real(r);
        }
        Ok(out)
    }

    /// Replace every entry by its reciprocal.
    pub fn invert(&mut self) {
        self.apply(Scalar::recip);
    }

    /// Multiply every entry by `alpha`.
    pub fn scale(&mut self, alpha: T) {
        for x in &mut self.data {
            *x *= alpha;
        }
    }

    /// Add `b` entry-wise.
    pub fn add_to(&mut self, b: &[T]) -> Result<()> {
        if b.len() != self.len() {
            return Err(CoreError::DimensionMismatch {
                op: "Vector::add_to",
                expected: vec![self.len()],
                got: vec![b.len()],
            });
        }
        for (x, &y) in self.data.iter_mut().zip(b) {
            *x += y;
        }
        Ok(())
    }

    /// `alpha * a` appended to itself `n_repeated` times.
    pub fn repeated<E: Storage<Elem = T>>(
        alpha: T,
        a: &VectorBase<E>,
        n_repeated: usize,
    ) -> Result<Self> {
        let n = a.len();
        let len = checked_len("Vector", &[n, n_repeated])?;
        let mut data = alloc_filled("Vector", &[len], len, T::zero())?;
        for chunk in data.chunks_exact_mut(n.max(1)).take(n_repeated) {
            for (d, &x) in chunk.iter_mut().zip(a.iter()) {
                *d = alpha * x;
            }
        }
        Ok(Self { data })
    }

    /// Entry-wise product `alpha * a .* b`, repeated `n_repeated` times.
    pub fn dot_mult<E1, E2>(
        alpha: T,
        a: &VectorBase<E1>,
        b: &VectorBase<E2>,
        n_repeated: usize,
    ) -> Result<Self>
    where
        E1: Storage<Elem = T>,
        E2: Storage<Elem = T>,
    {
        let prod = a.zip_map(b, |x, y| x * y)?;
        Self::repeated(alpha, &prod, n_repeated)
    }

    /// Entry-wise quotient `alpha * a ./ b`, repeated `n_repeated` times.
    pub fn dot_mult_inverse_2nd<E1, E2>(
        alpha: T,
        a: &VectorBase<E1>,
        b: &VectorBase<E2>,
        n_repeated: usize,
    ) -> Result<Self>
    where
        E1: Storage<Elem = T>,
        E2: Storage<Elem = T>,
    {
        let quot = a.zip_map(b, |x, y| x / y)?;
        Self::repeated(alpha, &quot, n_repeated)
    }

    /// `alpha_0 * a + alpha_1 * b`.
    pub fn sum_scaled<E1, E2>(alpha_0: T, a: &VectorBase<E1>, alpha_1: T, b: &VectorBase<E2>) -> Result<Self>
    where
        E1: Storage<Elem = T>,
        E2: Storage<Elem = T>,
    {
        a.zip_map(b, |x, y| alpha_0 * x + alpha_1 * y)
    }
}

impl<D: Storage> Index<usize> for VectorBase<D> {
    type Output = D::Elem;

    #[inline]
    fn index(&self, i: usize) -> &D::Elem {
        debug_assert!(
            i < self.len(),
            "{}",
            CoreError::Index {
                container: "Vector",
                index: vec![i],
                extents: vec![self.len()],
            }
        );
        &self.data.as_slice()[i]
    }
}

impl<D: StorageMut> IndexMut<usize> for VectorBase<D> {
    #[inline]
    fn index_mut(&mut self, i: usize) -> &mut D::Elem {
        debug_assert!(
            i < self.len(),
            "{}",
            CoreError::Index {
                container: "Vector",
                index: vec![i],
                extents: vec![self.len()],
            }
        );
        &mut self.data.as_mut_slice()[i]
    }
}
