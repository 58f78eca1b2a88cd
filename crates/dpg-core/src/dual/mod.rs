//! Real/complex instantiation of numerical kernels.
//!
//! A kernel is written once as a generic function over [`Scalar`] and
//! instantiated for either [`RealSet`] (`f64`) or [`ComplexSet`]
//! (`Complex64`). The complex instantiation feeds the complex-step
//! differentiation protocol in [`complex_step`].
//!
//! Kernels may only branch on [`Scalar::real_part`] (see [`branch`]); since
//! `Scalar` is not ordered, comparing two scalars directly does not compile.
//!
//! ```
//! use dpg_core::Scalar;
//! use dpg_core::dual::{ComplexSet, DualKernel, RealSet, evaluate_in};
//! use dpg_core::error::Result;
//! use dpg_core::Complex64;
//!
//! struct Square;
//!
//! impl DualKernel for Square {
//!     fn n_inputs(&self) -> usize { 1 }
//!     fn n_outputs(&self) -> usize { 1 }
//!     fn evaluate<S: Scalar<Real = f64>>(&self, x: &[S], out: &mut [S]) -> Result<()> {
//!         out[0] = x[0] * x[0];
//!         Ok(())
//!     }
//! }
//!
//! let r = evaluate_in::<RealSet, _>(&Square, &[3.0]).unwrap();
//! assert_eq!(r[0], 9.0);
//! let c = evaluate_in::<ComplexSet, _>(&Square, &[Complex64::new(3.0, 1e-20)]).unwrap();
//! assert_eq!(c[0].re, 9.0);
//! ```

pub mod branch;
pub mod complex_step;

use num_complex::Complex64;

use crate::Scalar;
use crate::container::Vector;
use crate::error::{CoreError, Result};

/// A numerical kernel with one generic body for both scalar kinds.
pub trait DualKernel {
    /// Length of the input slice.
    fn n_inputs(&self) -> usize;

    /// Length of the output slice.
    fn n_outputs(&self) -> usize;

    /// Evaluate the kernel. `x` has [`n_inputs`](Self::n_inputs) entries and
    /// `out` has [`n_outputs`](Self::n_outputs).
    fn evaluate<S: Scalar<Real = f64>>(&self, x: &[S], out: &mut [S]) -> Result<()>;
}

/// One of the two compile-time instantiations of a kernel.
pub trait KernelSet {
    type Scalar: Scalar<Real = f64>;

    /// Short name used in diagnostics.
    const NAME: &'static str;
}

/// The real instantiation (`f64`).
#[derive(Debug, Clone, Copy, Default)]
pub struct RealSet;

/// The complex instantiation (`Complex64`).
#[derive(Debug, Clone, Copy, Default)]
pub struct ComplexSet;

impl KernelSet for RealSet {
    type Scalar = f64;

    const NAME: &'static str = "real";
}

impl KernelSet for ComplexSet {
    type Scalar = Complex64;

    const NAME: &'static str = "complex";
}

/// Evaluate `kernel` in the instantiation selected by `Set`, returning a new
/// output vector.
pub fn evaluate_in<Set, K>(kernel: &K, x: &[Set::Scalar]) -> Result<Vector<Set::Scalar>>
where
    Set: KernelSet,
    K: DualKernel,
{
    if x.len() != kernel.n_inputs() {
        return Err(CoreError::DimensionMismatch {
            op: "evaluate_in",
            expected: vec![kernel.n_inputs()],
            got: vec![x.len()],
        });
    }
    let mut out = Vector::zeros(kernel.n_outputs())?;
    kernel.evaluate(x, out.as_mut_slice())?;
    tracing::trace!(set = Set::NAME, n_inputs = x.len(), "kernel evaluated");
    Ok(out)
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    struct Affine;

    impl DualKernel for Affine {
        fn n_inputs(&self) -> usize {
            2
        }

        fn n_outputs(&self) -> usize {
            2
        }

        fn evaluate<S: Scalar<Real = f64>>(&self, x: &[S], out: &mut [S]) -> Result<()> {
            out[0] = x[0] + S::from_f64(2.0) * x[1];
            out[1] = x[0] * x[1];
            Ok(())
        }
    }

    #[test]
    fn test_both_instantiations_agree_on_real_axis() {
        let r = evaluate_in::<RealSet, _>(&Affine, &[1.5, -2.0]).unwrap();
        let x = [Complex64::new(1.5, 0.0), Complex64::new(-2.0, 0.0)];
        let c = evaluate_in::<ComplexSet, _>(&Affine, &x).unwrap();
        assert_eq!(c.real_part().unwrap(), r);
        assert!(c.imag_part().unwrap().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_input_length_checked() {
        let err = evaluate_in::<RealSet, _>(&Affine, &[1.0]).unwrap_err();
        assert!(matches!(err, CoreError::DimensionMismatch { op: "evaluate_in", .. }));
    }

    #[test]
    fn test_set_names() {
        assert_eq!(RealSet::NAME, "real");
        assert_eq!(<ComplexSet as KernelSet>::NAME, "complex");
    }
}
