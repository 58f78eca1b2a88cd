//! Slice-level scalar math: norms, relative equality, reductions and the
//! BLAS-1 style updates shared by the containers.
//!
//! Everything here is generic over [`Scalar`] and works on plain slices, so
//! the same routine serves owning containers, views and raw buffers. Results
//! that only make sense as magnitudes (norms, relative differences) are
//! returned as the associated [`Real`] type.

use crate::container::NormType;
use crate::error::{CoreError, Result};
use crate::{Real, Scalar};

fn check_same_len(op: &'static str, a: usize, b: usize) -> Result<()> {
    if a != b {
        return Err(CoreError::DimensionMismatch {
            op,
            expected: vec![a],
            got: vec![b],
        });
    }
    Ok(())
}

// ======================================================================
// Norms
// ======================================================================

/// Norm of the entry magnitudes.
pub fn norm<S: Scalar>(data: &[S], norm_type: NormType) -> S::Real {
    match norm_type {
        NormType::L2 => data
            .iter()
            .map(|&x| {
                let m = x.modulus();
                m * m
            })
            .sum::<S::Real>()
            .sqrt(),
        NormType::Inf => maximum_abs(data),
    }
}

/// Norm of the real parts only.
pub fn norm_real_part<S: Scalar>(data: &[S], norm_type: NormType) -> S::Real {
    match norm_type {
        NormType::L2 => data
            .iter()
            .map(|&x| {
                let r = x.real_part();
                r * r
            })
            .sum::<S::Real>()
            .sqrt(),
        NormType::Inf => data
            .iter()
            .map(|&x| x.real_part().abs())
            .fold(S::Real::zero(), Real::max),
    }
}

/// Relative norm of `a - b`, scaled by the larger of the two norms. Falls
/// back to the absolute difference when both inputs are (numerically) zero.
pub fn norm_diff<S: Scalar>(a: &[S], b: &[S], norm_type: NormType) -> Result<S::Real> {
    check_same_len("math::norm_diff", a.len(), b.len())?;
    let diff: Vec<S> = a.iter().zip(b).map(|(&x, &y)| x - y).collect();
    let abs = norm(&diff, norm_type);
    let den = norm(a, norm_type).max(norm(b, norm_type));
    if den > S::Real::epsilon() {
        Ok(abs / den)
    } else {
        Ok(abs)
    }
}

/// Absolute infinity norm of `a - b`.
pub fn norm_diff_inf_abs<S: Scalar>(a: &[S], b: &[S]) -> Result<S::Real> {
    check_same_len("math::norm_diff_inf_abs", a.len(), b.len())?;
    Ok(a.iter()
        .zip(b)
        .map(|(&x, &y)| (x - y).modulus())
        .fold(S::Real::zero(), Real::max))
}

// ======================================================================
// Approximate equality
// ======================================================================

/// `true` when `x0` and `x1` agree to a relative tolerance. Inputs with
/// magnitude below machine epsilon are compared absolutely.
pub fn equal<S: Scalar>(x0: S, x1: S, tol: S::Real) -> bool {
    let m = x0.modulus();
    if m < S::Real::epsilon() {
        (x0 - x1).modulus() < tol
    } else {
        (x0 - x1).modulus() / m < tol
    }
}

/// Like [`equal`] with an explicit denominator for the relative difference.
pub fn equal_rel<S: Scalar>(x0: S, x1: S, tol: S::Real, den: S) -> bool {
    let d = den.modulus();
    if d < S::Real::epsilon() {
        (x0 - x1).modulus() < tol
    } else {
        (x0 - x1).modulus() / d < tol
    }
}

/// Entry-wise [`equal`] over two slices of the same length.
pub fn all_equal<S: Scalar>(a: &[S], b: &[S], tol: S::Real) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(&x, &y)| equal(x, y, tol))
}

// ======================================================================
// Reductions
// ======================================================================

/// Mean of the entries. Fails on an empty slice.
pub fn average<S: Scalar>(data: &[S]) -> Result<S> {
    if data.is_empty() {
        return Err(CoreError::InvalidArgument {
            reason: "average of an empty slice",
        });
    }
    let sum: S = data.iter().copied().sum();
    Ok(sum.unscale(S::Real::from_usize(data.len())))
}

/// The entry with the smallest real part. `None` for an empty slice.
pub fn minimum<S: Scalar>(data: &[S]) -> Option<S> {
    data.iter()
        .copied()
        .reduce(|a, b| if b.real_part() < a.real_part() { b } else { a })
}

/// Largest real part. `None` for an empty slice.
pub fn maximum_real<S: Scalar>(data: &[S]) -> Option<S::Real> {
    data.iter().map(|&x| x.real_part()).reduce(Real::max)
}

/// Largest entry magnitude (zero for an empty slice).
pub fn maximum_abs<S: Scalar>(data: &[S]) -> S::Real {
    data.iter()
        .map(|&x| x.modulus())
        .fold(S::Real::zero(), Real::max)
}

// ======================================================================
// BLAS-1 style updates
// ======================================================================

/// Inner product `sum(a_i * b_i)`, without conjugation.
pub fn dot<S: Scalar>(a: &[S], b: &[S]) -> Result<S> {
    check_same_len("math::dot", a.len(), b.len())?;
    Ok(a.iter().zip(b).map(|(&x, &y)| x * y).sum())
}

/// Real inner product of a real slice with the real parts of `b`.
pub fn dot_real<S: Scalar>(a: &[S::Real], b: &[S]) -> Result<S::Real> {
    check_same_len("math::dot_real", a.len(), b.len())?;
    Ok(a.iter().zip(b).map(|(&x, &y)| x * y.real_part()).sum())
}

/// `z += y * x`, entry-wise.
pub fn z_yxpz<S: Scalar>(x: &[S], y: &[S], z: &mut [S]) -> Result<()> {
    check_same_len("math::z_yxpz", x.len(), y.len())?;
    check_same_len("math::z_yxpz", x.len(), z.len())?;
    for ((zi, &xi), &yi) in z.iter_mut().zip(x).zip(y) {
        *zi += yi * xi;
    }
    Ok(())
}

/// [`z_yxpz`] with a real `x`.
pub fn z_yxpz_real<S: Scalar>(x: &[S::Real], y: &[S], z: &mut [S]) -> Result<()> {
    check_same_len("math::z_yxpz_real", x.len(), y.len())?;
    check_same_len("math::z_yxpz_real", x.len(), z.len())?;
    for ((zi, &xi), &yi) in z.iter_mut().zip(x).zip(y) {
        *zi += yi.scale(xi);
    }
    Ok(())
}

/// `y += alpha * x`, entry-wise.
pub fn axpy<S: Scalar>(alpha: S, x: &[S], y: &mut [S]) -> Result<()> {
    check_same_len("math::axpy", x.len(), y.len())?;
    for (yi, &xi) in y.iter_mut().zip(x) {
        *yi += alpha * xi;
    }
    Ok(())
}

/// Add the constant `c` to every entry.
pub fn add_constant<S: Scalar>(data: &mut [S], c: S) {
    for x in data {
        *x += c;
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;
    use num_complex::Complex64;

    #[test]
    fn test_norms() {
        let v = [3.0, -4.0];
        assert_eq!(norm(&v, NormType::L2), 5.0);
        assert_eq!(norm(&v, NormType::Inf), 4.0);
        assert_eq!(norm::<f64>(&[], NormType::Inf), 0.0);
    }

    #[test]
    fn test_complex_norm_uses_modulus() {
        let v = [Complex64::new(3.0, 4.0)];
        assert_eq!(norm(&v, NormType::L2), 5.0);
        assert_eq!(norm_real_part(&v, NormType::Inf), 3.0);
    }

    #[test]
    fn test_norm_diff_relative() {
        let a = [10.0, 0.0];
        let b = [9.0, 0.0];
        let d: f64 = norm_diff(&a, &b, NormType::Inf).unwrap();
        assert!((d - 0.1).abs() < 1e-15);
        assert_eq!(norm_diff(&[0.0], &[0.0], NormType::Inf).unwrap(), 0.0);
        assert!(norm_diff(&a, &[1.0], NormType::Inf).is_err());
        assert_eq!(norm_diff_inf_abs(&a, &b).unwrap(), 1.0);
    }

    #[test]
    fn test_equal() {
        assert!(equal(1.0, 1.0 + 1e-14, 1e-12));
        assert!(!equal(1.0, 1.1, 1e-12));
        assert!(equal(0.0, 1e-20, 1e-12));
        assert!(equal_rel(100.0, 101.0, 0.02, 100.0));
        assert!(all_equal(&[1.0, 2.0], &[1.0, 2.0], 1e-12));
        assert!(!all_equal(&[1.0], &[1.0, 2.0], 1e-12));
    }

    #[test]
    fn test_reductions() {
        let d = [2.0, -5.0, 3.0];
        assert_eq!(average(&d).unwrap(), 0.0);
        assert!(average::<f64>(&[]).is_err());
        assert_eq!(minimum(&d), Some(-5.0));
        assert_eq!(maximum_real(&d), Some(3.0));
        assert_eq!(maximum_abs(&d), 5.0);
    }

    #[test]
    fn test_minimum_complex_compares_real_parts() {
        let d = [Complex64::new(1.0, -9.0), Complex64::new(0.5, 9.0)];
        assert_eq!(minimum(&d), Some(Complex64::new(0.5, 9.0)));
    }

    #[test]
    fn test_dot_and_updates() {
        assert_eq!(dot(&[1.0, 2.0], &[3.0, 4.0]).unwrap(), 11.0);
        assert!(dot(&[1.0], &[]).is_err());
        let mut z = [1.0, 1.0];
        z_yxpz(&[1.0, 2.0], &[3.0, 4.0], &mut z).unwrap();
        assert_eq!(z, [4.0, 9.0]);
        let mut y = [0.0, 1.0];
        axpy(2.0, &[1.0, 1.0], &mut y).unwrap();
        assert_eq!(y, [2.0, 3.0]);
        add_constant(&mut y, 1.0);
        assert_eq!(y, [3.0, 4.0]);
    }

    #[test]
    fn test_mixed_real_complex() {
        let x = [2.0];
        let y = [Complex64::new(1.0, 1.0)];
        let mut z = [Complex64::new(0.0, 0.0)];
        z_yxpz_real(&x, &y, &mut z).unwrap();
        assert_eq!(z[0], Complex64::new(2.0, 2.0));
        assert_eq!(dot_real(&x, &y).unwrap(), 2.0);
    }
}
