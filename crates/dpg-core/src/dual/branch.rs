//! Value-dependent choices that stay valid under complex perturbation.
//!
//! Each helper decides on [`Scalar::real_part`] and then returns one of its
//! *scalar* arguments unchanged, so the imaginary perturbation carried by a
//! complex input flows through to the result. For real scalars they reduce
//! to the usual `abs`/`max`/`min`.

use crate::Scalar;

/// `|x|`, taken as `x` or `-x` by the sign of the real part. Unlike
/// [`Scalar::modulus`] this is differentiable away from zero.
#[inline]
pub fn abs<S: Scalar>(x: S) -> S {
    if x.real_part() < S::Real::zero() {
        -x
    } else {
        x
    }
}

/// The argument with the larger real part (`a` on ties).
#[inline]
pub fn max<S: Scalar>(a: S, b: S) -> S {
    if b.real_part() > a.real_part() { b } else { a }
}

/// The argument with the smaller real part (`a` on ties).
#[inline]
pub fn min<S: Scalar>(a: S, b: S) -> S {
    if b.real_part() < a.real_part() { b } else { a }
}

/// The larger of `|a|` and `|b|`, each taken with [`abs`].
#[inline]
pub fn max_abs_real<S: Scalar>(a: S, b: S) -> S {
    max(abs(a), abs(b))
}

/// The smaller of `|a|` and `|b|`, each taken with [`abs`].
#[inline]
pub fn min_abs_real<S: Scalar>(a: S, b: S) -> S {
    min(abs(a), abs(b))
}

/// `if_nonneg` when the real part of `cond` is `>= 0`, else `if_neg`.
///
/// This is the upwinding pattern: the direction is decided on real data,
/// both candidates keep their perturbations.
#[inline]
pub fn select_if_nonnegative<S: Scalar>(cond: S, if_nonneg: S, if_neg: S) -> S {
    if cond.real_part() >= S::Real::zero() {
        if_nonneg
    } else {
        if_neg
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;
    use num_complex::Complex64;

    #[test]
    fn test_real_scalars_behave_as_usual() {
        assert_eq!(abs(-2.0), 2.0);
        assert_eq!(max(1.0, 3.0), 3.0);
        assert_eq!(min(1.0, 3.0), 1.0);
        assert_eq!(max_abs_real(-4.0, 3.0), 4.0);
        assert_eq!(min_abs_real(-4.0, 3.0), 3.0);
        assert_eq!(select_if_nonnegative(0.0, 1.0, 2.0), 1.0);
        assert_eq!(select_if_nonnegative(-0.5, 1.0, 2.0), 2.0);
    }

    #[test]
    fn test_abs_keeps_perturbation_sign_consistent() {
        let h = 1e-30;
        let x = Complex64::new(-2.0, h);
        assert_eq!(abs(x), Complex64::new(2.0, -h));
        let y = Complex64::new(2.0, h);
        assert_eq!(abs(y), y);
    }

    #[test]
    fn test_max_returns_the_perturbed_argument() {
        let a = Complex64::new(1.0, 1e-30);
        let b = Complex64::new(0.5, 7.0);
        assert_eq!(max(a, b), a);
        assert_eq!(min(a, b), b);
    }

    #[test]
    fn test_branch_is_stable_in_step_size() {
        for h in [1e-40, 1e-30, 1e-20, 1e-10, 1e-3] {
            let picked = select_if_nonnegative(
                Complex64::new(0.25, -h),
                Complex64::new(1.0, 0.0),
                Complex64::new(-1.0, 0.0),
            );
            assert_eq!(picked.re, 1.0);
        }
    }
}
