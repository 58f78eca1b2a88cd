//! Element and scalar type hierarchy.
//!
//! ```text
//! Element            (storable: i32, i64, usize, f32, f64, Complex<f32>, Complex<f64>)
//!   └── Scalar       (arithmetic: f32, f64, Complex<f32>, Complex<f64>)
//!         └── Real   (ordered: f32, f64)
//! ```
//!
//! Every numerical kernel is written once against [`Scalar`] and instantiated
//! for a real and a complex type. `Scalar` deliberately has no `PartialOrd`
//! bound: complex values have no total order, so any value-dependent branch
//! has to go through [`Scalar::real_part`], whose result is a [`Real`]. A
//! kernel that tries to compare two scalars directly does not compile.

use core::fmt;
use core::iter::Sum;
use core::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign};

use num_complex::Complex;

// ---------------------------------------------------------------------------
// Element — anything a container can store
// ---------------------------------------------------------------------------

/// Base trait for values storable in a container.
///
/// Integer elements are included so index vectors and CSR offset buffers use
/// the same containers as the numerical data.
pub trait Element:
    Copy + Clone + fmt::Debug + fmt::Display + PartialEq + Default + Send + Sync + 'static
{
}

impl Element for i32 {}
impl Element for i64 {}
impl Element for usize {}
impl Element for f32 {}
impl Element for f64 {}
impl Element for Complex<f32> {}
impl Element for Complex<f64> {}

// ---------------------------------------------------------------------------
// Scalar — the abstract type numerical kernels are written against
// ---------------------------------------------------------------------------

/// A real or complex floating-point value.
///
/// Only holomorphic operations are provided here; anything that needs an
/// ordering (`abs`, `min`, `max`, sign tests) lives in
/// [`crate::dual::branch`] and is expressed through [`Scalar::real_part`].
pub trait Scalar:
    Element
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Neg<Output = Self>
    + AddAssign
    + SubAssign
    + MulAssign
    + DivAssign
    + Sum
{
    /// The real type this scalar projects onto.
    type Real: Real;

    /// `true` for the complex instantiation.
    const IS_COMPLEX: bool;

    /// Short name used in diagnostics ("real" / "complex").
    const KIND: &'static str;

    /// The additive identity (`0`).
    fn zero() -> Self;

    /// The multiplicative identity (`1`).
    fn one() -> Self;

    /// Embed a real value (imaginary part zero).
    fn from_real(r: Self::Real) -> Self;

    /// Build from real and imaginary parts. The imaginary part is dropped for
    /// real scalars.
    fn from_parts(re: Self::Real, im: Self::Real) -> Self;

    /// Convert from an `f64` literal (used for constants).
    fn from_f64(v: f64) -> Self;

    /// Multiply by a real factor (`x * r`). Holomorphic in `x`.
    fn scale(self, r: Self::Real) -> Self;

    /// Divide by a real factor (`x / r`).
    fn unscale(self, r: Self::Real) -> Self;

    /// Convert from `usize` (used for index arithmetic).
    fn from_usize(v: usize) -> Self;

    /// Real component. Identity for real scalars.
    fn real_part(self) -> Self::Real;

    /// Imaginary component. Zero for real scalars.
    fn imag_part(self) -> Self::Real;

    /// Magnitude `|x|`. Not differentiable; use only on physical quantities
    /// or for display/tolerance tests.
    fn modulus(self) -> Self::Real;

    fn conj(self) -> Self;
    fn sqrt(self) -> Self;
    fn exp(self) -> Self;
    fn ln(self) -> Self;
    fn sin(self) -> Self;
    fn cos(self) -> Self;
    fn powi(self, n: i32) -> Self;
    fn powf(self, n: Self::Real) -> Self;
    fn recip(self) -> Self;
    fn is_finite(self) -> bool;
}

// ---------------------------------------------------------------------------
// Real — ordered scalars
// ---------------------------------------------------------------------------

/// Real floating-point scalars (`f32`, `f64`).
pub trait Real: Scalar<Real = Self> + PartialOrd + fmt::LowerExp {
    /// Machine epsilon.
    fn epsilon() -> Self;

    /// Positive infinity.
    fn infinity() -> Self;

    fn abs(self) -> Self;
    fn max(self, other: Self) -> Self;
    fn min(self, other: Self) -> Self;

    /// Widen to `f64` (used for logging and tolerance arithmetic).
    fn to_f64(self) -> f64;
}

/// Real part of any scalar; the identity for real scalars.
#[inline]
pub fn real_part<S: Scalar>(x: S) -> S::Real {
    x.real_part()
}

// ===========================================================================
// Macro implementations
// ===========================================================================

macro_rules! impl_scalar_real {
    ($ty:ty) => {
        impl Scalar for $ty {
            type Real = $ty;

            const IS_COMPLEX: bool = false;
            const KIND: &'static str = "real";

            #[inline]
            fn zero() -> Self {
                0.0
            }
            #[inline]
            fn one() -> Self {
                1.0
            }
            #[inline]
            fn from_real(r: Self) -> Self {
                r
            }
            #[inline]
            fn from_parts(re: Self, _im: Self) -> Self {
                re
            }
            #[inline]
            fn from_f64(v: f64) -> Self {
                v as Self
            }
            #[inline]
            fn from_usize(v: usize) -> Self {
                v as Self
            }
            #[inline]
            fn scale(self, r: Self) -> Self {
                self * r
            }
            #[inline]
            fn unscale(self, r: Self) -> Self {
                self / r
            }
            #[inline]
            fn real_part(self) -> Self {
                self
            }
            #[inline]
            fn imag_part(self) -> Self {
                0.0
            }
            #[inline]
            fn modulus(self) -> Self {
                <$ty>::abs(self)
            }
            #[inline]
            fn conj(self) -> Self {
                self
            }
            #[inline]
            fn sqrt(self) -> Self {
                <$ty>::sqrt(self)
            }
            #[inline]
            fn exp(self) -> Self {
                <$ty>::exp(self)
            }
            #[inline]
            fn ln(self) -> Self {
                <$ty>::ln(self)
            }
            #[inline]
            fn sin(self) -> Self {
                <$ty>::sin(self)
            }
            #[inline]
            fn cos(self) -> Self {
                <$ty>::cos(self)
            }
            #[inline]
            fn powi(self, n: i32) -> Self {
                <$ty>::powi(self, n)
            }
            #[inline]
            fn powf(self, n: Self) -> Self {
                <$ty>::powf(self, n)
            }
            #[inline]
            fn recip(self) -> Self {
                <$ty>::recip(self)
            }
            #[inline]
            fn is_finite(self) -> bool {
                <$ty>::is_finite(self)
            }
        }

        impl Real for $ty {
            #[inline]
            fn epsilon() -> Self {
                <$ty>::EPSILON
            }
            #[inline]
            fn infinity() -> Self {
                <$ty>::INFINITY
            }
            #[inline]
            fn abs(self) -> Self {
                <$ty>::abs(self)
            }
            #[inline]
            fn max(self, other: Self) -> Self {
                <$ty>::max(self, other)
            }
            #[inline]
            fn min(self, other: Self) -> Self {
                <$ty>::min(self, other)
            }
            #[inline]
            fn to_f64(self) -> f64 {
                self as f64
            }
        }
    };
}

impl_scalar_real!(f32);
impl_scalar_real!(f64);

macro_rules! impl_scalar_complex {
    ($ty:ty) => {
        impl Scalar for Complex<$ty> {
            type Real = $ty;

            const IS_COMPLEX: bool = true;
            const KIND: &'static str = "complex";

            #[inline]
            fn zero() -> Self {
                Complex::new(0.0, 0.0)
            }
            #[inline]
            fn one() -> Self {
                Complex::new(1.0, 0.0)
            }
            #[inline]
            fn from_real(r: $ty) -> Self {
                Complex::new(r, 0.0)
            }
            #[inline]
            fn from_parts(re: $ty, im: $ty) -> Self {
                Complex::new(re, im)
            }
            #[inline]
            fn from_f64(v: f64) -> Self {
                Complex::new(v as $ty, 0.0)
            }
            #[inline]
            fn from_usize(v: usize) -> Self {
                Complex::new(v as $ty, 0.0)
            }
            #[inline]
            fn scale(self, r: $ty) -> Self {
                self * r
            }
            #[inline]
            fn unscale(self, r: $ty) -> Self {
                self / r
            }
            #[inline]
            fn real_part(self) -> $ty {
                self.re
            }
            #[inline]
            fn imag_part(self) -> $ty {
                self.im
            }
            #[inline]
            fn modulus(self) -> $ty {
                Complex::norm(self)
            }
            #[inline]
            fn conj(self) -> Self {
                Complex::conj(&self)
            }
            #[inline]
            fn sqrt(self) -> Self {
                Complex::sqrt(self)
            }
            #[inline]
            fn exp(self) -> Self {
                Complex::exp(self)
            }
            #[inline]
            fn ln(self) -> Self {
                Complex::ln(self)
            }
            #[inline]
            fn sin(self) -> Self {
                Complex::sin(self)
            }
            #[inline]
            fn cos(self) -> Self {
                Complex::cos(self)
            }
            #[inline]
            fn powi(self, n: i32) -> Self {
                Complex::powi(&self, n)
            }
            #[inline]
            fn powf(self, n: $ty) -> Self {
                Complex::powf(self, n)
            }
            #[inline]
            fn recip(self) -> Self {
                Complex::inv(&self)
            }
            #[inline]
            fn is_finite(self) -> bool {
                Complex::is_finite(self)
            }
        }
    };
}

impl_scalar_complex!(f32);
impl_scalar_complex!(f64);
