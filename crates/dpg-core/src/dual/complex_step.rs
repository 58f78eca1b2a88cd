//! Complex-step differentiation.
//!
//! For a holomorphic `f`, evaluating at `x + i h` gives
//! `f(x + i h) = f(x) + i h f'(x) + O(h^2)`, so `Im f(x + i h) / h` is the
//! derivative to machine precision with no subtractive cancellation. `h` can
//! therefore be tiny (`1e-30` by default), which also makes the real part of
//! the perturbed evaluation identical to the unperturbed value. With larger
//! steps the real part drifts by `-h^2 f''(x) / 2`; the duality check accepts
//! a drift that shrinks when the step is halved.
//!
//! A Jacobian needs one complex evaluation per input: input `j` is perturbed
//! and the imaginary parts of the outputs form column `j`.

use num_complex::Complex64;

use crate::config::{Config, DEFAULT_COMPLEX_STEP};
use crate::container::{Layout, Matrix, Vector};
use crate::dual::{ComplexSet, DualKernel, RealSet, evaluate_in};
use crate::error::{CoreError, Result};
use crate::math;

/// Relative deviation of the real part below which no refinement is done.
pub const DUALITY_TOL: f64 = 1e-12;

/// Largest ratio of the drift at `h / 2` to the drift at `h` accepted as
/// second-order. A holomorphic kernel gives `1/4`, a diverged branch `1`.
const DRIFT_RATIO: f64 = 0.5;

/// Settings of the complex-step protocol.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComplexStep {
    step: f64,
    check_duality: bool,
}

impl Default for ComplexStep {
    fn default() -> Self {
        Self {
            step: DEFAULT_COMPLEX_STEP,
            check_duality: cfg!(debug_assertions),
        }
    }
}

/// Value and derivative of a scalar function at a point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScalarDerivative {
    pub value: f64,
    pub derivative: f64,
}

/// A kernel's outputs at `x` together with their Jacobian.
#[derive(Debug, Clone, PartialEq)]
pub struct Linearization {
    /// `f(x)`, length `m`.
    pub value: Vector<f64>,
    /// `df/dx`, `m x n`, column-major.
    pub jacobian: Matrix<f64>,
}

impl ComplexStep {
    /// Use the imaginary step `step`, which must be finite and positive.
    pub fn new(step: f64) -> Result<Self> {
        if !(step.is_finite() && step > 0.0) {
            return Err(CoreError::InvalidArgument {
                reason: "complex step must be finite and positive",
            });
        }
        Ok(Self {
            step,
            ..Self::default()
        })
    }

    /// Take the step and the duality-check switch from `cfg`.
    pub fn from_config(cfg: &Config) -> Result<Self> {
        Ok(Self::new(cfg.complex_step)?.with_check_duality(cfg.check_duality))
    }

    /// Enable or disable the duality check.
    pub fn with_check_duality(mut self, on: bool) -> Self {
        self.check_duality = on;
        self
    }

    #[inline]
    pub fn step(&self) -> f64 {
        self.step
    }

    #[inline]
    pub fn check_duality(&self) -> bool {
        self.check_duality
    }

    /// Value and derivative of a holomorphic scalar function at `x`.
    pub fn derivative<F>(&self, f: F, x: f64) -> ScalarDerivative
    where
        F: Fn(Complex64) -> Complex64,
    {
        let fx = f(Complex64::new(x, self.step));
        ScalarDerivative {
            value: fx.re,
            derivative: fx.im / self.step,
        }
    }

    /// Promote `x` to complex with input `j` perturbed by `i h`.
    pub fn perturb(&self, x: &[f64], j: usize) -> Result<Vector<Complex64>> {
        if j >= x.len() {
            return Err(CoreError::Index {
                container: "ComplexStep",
                index: vec![j],
                extents: vec![x.len()],
            });
        }
        let mut xc = Vector::zeros(x.len())?;
        for (c, &r) in xc.as_mut_slice().iter_mut().zip(x) {
            *c = Complex64::new(r, 0.0);
        }
        xc[j].im = self.step;
        Ok(xc)
    }

    /// Column `j` of the Jacobian of `kernel` at `x`.
    pub fn jacobian_column<K: DualKernel>(&self, kernel: &K, x: &[f64], j: usize) -> Result<Vector<f64>> {
        let baseline = if self.check_duality {
            Some(evaluate_in::<RealSet, _>(kernel, x)?)
        } else {
            None
        };
        self.column(kernel, x, j, baseline.as_ref().map(|b| b.as_slice()))
    }

    fn column<K: DualKernel>(
        &self,
        kernel: &K,
        x: &[f64],
        j: usize,
        baseline: Option<&[f64]>,
    ) -> Result<Vector<f64>> {
        let xc = self.perturb(x, j)?;
        let fc = evaluate_in::<ComplexSet, _>(kernel, xc.as_slice())?;
        if let Some(real) = baseline {
            self.verify_duality(kernel, x, j, real, fc.as_slice())?;
        }
        let mut col = fc.imag_part()?;
        col.apply(|v| v / self.step);
        Ok(col)
    }

    /// The real part of a perturbed evaluation must match the real
    /// evaluation up to the `O(h^2)` drift of a holomorphic kernel; otherwise
    /// the kernel's control flow diverged between the two instantiations.
    ///
    /// Outputs off by more than [`DUALITY_TOL`] are re-evaluated at `h / 2`;
    /// their drift must shrink by at least [`DRIFT_RATIO`].
    fn verify_duality<K: DualKernel>(
        &self,
        kernel: &K,
        x: &[f64],
        j: usize,
        real: &[f64],
        perturbed: &[Complex64],
    ) -> Result<()> {
        let drifted: Vec<usize> = (0..real.len())
            .filter(|&i| drift(real[i], perturbed[i].re).is_some())
            .collect();
        if drifted.is_empty() {
            return Ok(());
        }
        let half = Self {
            step: 0.5 * self.step,
            ..*self
        };
        let xc = half.perturb(x, j)?;
        let refined = evaluate_in::<ComplexSet, _>(kernel, xc.as_slice())?;
        for i in drifted {
            let (r, c) = (real[i], perturbed[i].re);
            let d = (r - c).abs();
            let d_half = drift(r, refined[i].re).unwrap_or(0.0);
            let second_order = d_half <= DRIFT_RATIO * d;
            if !second_order {
                tracing::warn!(
                    column = j,
                    output = i,
                    real = r,
                    perturbed = c,
                    refined = refined[i].re,
                    "complex-step evaluation diverged from the real evaluation"
                );
                return Err(CoreError::invariant(
                    "ComplexStep",
                    format_args!("column {j}: output {i} has real part {c} under perturbation, {r} without"),
                ));
            }
        }
        Ok(())
    }

    /// Value and full Jacobian of `kernel` at `x`, one complex evaluation per
    /// input.
    pub fn jacobian<K: DualKernel>(&self, kernel: &K, x: &[f64]) -> Result<Linearization> {
        let value = evaluate_in::<RealSet, _>(kernel, x)?;
        let (m, n) = (kernel.n_outputs(), x.len());
        tracing::debug!(n_inputs = n, n_outputs = m, step = self.step, "complex-step jacobian");
        let baseline = self.check_duality.then(|| value.as_slice());
        let mut jacobian = Matrix::zeros(m, n, Layout::Col)?;
        for j in 0..n {
            let col = self.column(kernel, x, j, baseline)?;
            jacobian.col_mut(j)?.copy_from_slice(col.as_slice());
        }
        Ok(Linearization { value, jacobian })
    }

    /// [`jacobian`](Self::jacobian) with the columns evaluated concurrently.
    #[cfg(feature = "parallel")]
    pub fn jacobian_par<K: DualKernel + Sync>(&self, kernel: &K, x: &[f64]) -> Result<Linearization> {
        use rayon::prelude::*;

        let value = evaluate_in::<RealSet, _>(kernel, x)?;
        let (m, n) = (kernel.n_outputs(), x.len());
        tracing::debug!(n_inputs = n, n_outputs = m, step = self.step, "parallel complex-step jacobian");
        let baseline = self.check_duality.then(|| value.as_slice());
        let columns = (0..n)
            .into_par_iter()
            .map(|j| self.column(kernel, x, j, baseline))
            .collect::<Result<Vec<_>>>()?;
        let mut jacobian = Matrix::zeros(m, n, Layout::Col)?;
        for (j, col) in columns.iter().enumerate() {
            jacobian.col_mut(j)?.copy_from_slice(col.as_slice());
        }
        Ok(Linearization { value, jacobian })
    }
}

/// `|real - perturbed|` when the two disagree beyond [`DUALITY_TOL`]. Two
/// NaNs agree.
fn drift(real: f64, perturbed: f64) -> Option<f64> {
    if (real.is_nan() && perturbed.is_nan()) || math::equal(real, perturbed, DUALITY_TOL) {
        None
    } else {
        Some((real - perturbed).abs())
    }
}
