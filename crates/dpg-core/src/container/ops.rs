//! Element-wise arithmetic operators for vectors.
//!
//! Implements `Add`, `Sub`, `Mul`, `Div` for:
//! - `Vector<T> op Vector<T>` and `&VectorBase op &VectorBase` (element-wise,
//!   same length; owning and view operands mix freely)
//! - `Vector<T> op T` and `&VectorBase op T` (broadcast scalar)
//! - `Neg`

use core::ops::{Add, Div, Mul, Neg, Sub};

use crate::Scalar;
use crate::container::storage::Storage;
use crate::container::{Vector, VectorBase};

// ======================================================================
// Vector op Vector  (element-wise, same length; panics on mismatch)
// ======================================================================

macro_rules! impl_vector_binop {
    ($trait:ident, $method:ident, $op:tt) => {
        impl<T: Scalar> $trait for Vector<T> {
            type Output = Vector<T>;

            fn $method(mut self, rhs: Vector<T>) -> Vector<T> {
                assert_eq!(
                    self.len(), rhs.len(),
                    "length mismatch in element-wise {}: {} vs {}",
                    stringify!($method), self.len(), rhs.len(),
                );
                for (a, &b) in self.data.iter_mut().zip(rhs.data.iter()) {
                    *a = *a $op b;
                }
                self
            }
        }

        impl<'a, 'b, T, D1, D2> $trait<&'b VectorBase<D2>> for &'a VectorBase<D1>
        where
            T: Scalar,
            D1: Storage<Elem = T>,
            D2: Storage<Elem = T>,
        {
            type Output = Vector<T>;

            fn $method(self, rhs: &'b VectorBase<D2>) -> Vector<T> {
                assert_eq!(
                    self.len(), rhs.len(),
                    "length mismatch in element-wise {}: {} vs {}",
                    stringify!($method), self.len(), rhs.len(),
                );
                let data = self.iter()
                    .zip(rhs.iter())
                    .map(|(&a, &b)| a $op b)
                    .collect();
                Vector { data }
            }
        }
    };
}

impl_vector_binop!(Add, add, +);
impl_vector_binop!(Sub, sub, -);
impl_vector_binop!(Mul, mul, *);
impl_vector_binop!(Div, div, /);

// ======================================================================
// Vector op scalar  (broadcast)
// ======================================================================

macro_rules! impl_scalar_binop {
    ($trait:ident, $method:ident, $op:tt) => {
        impl<T: Scalar> $trait<T> for Vector<T> {
            type Output = Vector<T>;

            fn $method(mut self, rhs: T) -> Vector<T> {
                for a in &mut self.data {
                    *a = *a $op rhs;
                }
                self
            }
        }

        impl<'a, T, D> $trait<T> for &'a VectorBase<D>
        where
            T: Scalar,
            D: Storage<Elem = T>,
        {
            type Output = Vector<T>;

            fn $method(self, rhs: T) -> Vector<T> {
                let data = self.iter().map(|&a| a $op rhs).collect();
                Vector { data }
            }
        }
    };
}

impl_scalar_binop!(Add, add, +);
impl_scalar_binop!(Sub, sub, -);
impl_scalar_binop!(Mul, mul, *);
impl_scalar_binop!(Div, div, /);

// ======================================================================
// Negation
// ======================================================================

impl<T: Scalar> Neg for Vector<T> {
    type Output = Vector<T>;

    fn neg(mut self) -> Vector<T> {
        for a in &mut self.data {
            *a = -*a;
        }
        self
    }
}

impl<T, D> Neg for &VectorBase<D>
where
    T: Scalar,
    D: Storage<Elem = T>,
{
    type Output = Vector<T>;

    fn neg(self) -> Vector<T> {
        let data = self.iter().map(|&a| -a).collect();
        Vector { data }
    }
}
