//! Mathematical utility functions and constants for return-based estimation.
//!
//! Compensated summation and small floating-point helpers shared by the
//! estimators and the LPPL fitter.

use crate::errors::{FinanceError, FinanceResult};

/// Numerical constants used across estimators
pub mod constants {
    /// Variances at or below this are treated as exactly zero.
    ///
    /// Annualized variances of real price series are many orders of magnitude
    /// above this, so only constant-return series fall under it.
    pub const MIN_VARIANCE: f64 = 1e-20;

    /// Seconds in a calendar day
    pub const SECONDS_PER_DAY: f64 = 86_400.0;
}

/// Safe comparison for floating point values (NaN sorts last)
pub fn float_total_cmp(a: &f64, b: &f64) -> std::cmp::Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => std::cmp::Ordering::Equal,
        (true, false) => std::cmp::Ordering::Greater,
        (false, true) => std::cmp::Ordering::Less,
        (false, false) => a.total_cmp(b),
    }
}

/// Kahan compensated summation.
///
/// Error: O(ε) vs O(nε) for naive summation.
pub fn kahan_sum(values: &[f64]) -> f64 {
    kahan_sum_iter(values.iter().copied())
}

/// Kahan summation over an iterator, so weighted terms need no temporary buffer.
pub fn kahan_sum_iter<I: IntoIterator<Item = f64>>(values: I) -> f64 {
    let mut sum = 0.0;
    let mut c = 0.0; // Compensation for lost low-order bits

    for value in values {
        let y = value - c;
        let t = sum + y;
        c = (t - sum) - y;
        sum = t;
    }

    sum
}

/// Square root of a variance-like quantity, failing on negative or non-finite input.
pub fn checked_sqrt(x: f64, operation: &str) -> FinanceResult<f64> {
    float_ops::safe_sqrt(x).ok_or_else(|| FinanceError::NumericalError {
        reason: format!("cannot take square root of {}", x),
        operation: Some(operation.to_string()),
    })
}

/// Guarded floating-point helpers
pub mod float_ops {
    /// Safe square root that checks for non-negative arguments and finite inputs
    pub fn safe_sqrt(x: f64) -> Option<f64> {
        if x >= 0.0 && x.is_finite() {
            Some(x.sqrt())
        } else {
            None
        }
    }

    /// Wrap an angle into `[0, 2π)`.
    #[inline]
    pub fn wrap_angle(angle: f64) -> f64 {
        angle.rem_euclid(std::f64::consts::TAU)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn test_kahan_sum_precision() {
        let mut values = vec![1.0];
        values.extend(std::iter::repeat(1e-16).take(10_000));
        let naive: f64 = values.iter().sum();
        let compensated = kahan_sum(&values);
        assert_approx_eq!(compensated, 1.0 + 1e-12, 1e-15);
        assert!((compensated - (1.0 + 1e-12)).abs() <= (naive - (1.0 + 1e-12)).abs());
    }

    #[test]
    fn test_kahan_sum_iter_matches_slice() {
        let values = [0.1, 0.2, 0.3, 0.4];
        assert_eq!(kahan_sum(&values), kahan_sum_iter(values.iter().copied()));
        assert_eq!(kahan_sum(&[]), 0.0);
    }

    #[test]
    fn test_float_total_cmp_nan_last() {
        let mut v = vec![3.0, f64::NAN, 1.0, 2.0];
        v.sort_by(float_total_cmp);
        assert_eq!(&v[..3], &[1.0, 2.0, 3.0]);
        assert!(v[3].is_nan());
    }

    #[test]
    fn test_float_ops() {
        assert_eq!(float_ops::safe_sqrt(4.0), Some(2.0));
        assert_eq!(float_ops::safe_sqrt(-1.0), None);
        assert_eq!(checked_sqrt(9.0, "test").unwrap(), 3.0);
        assert!(checked_sqrt(f64::INFINITY, "test").is_err());

        use std::f64::consts::{FRAC_PI_2, PI, TAU};
        assert_approx_eq!(float_ops::wrap_angle(-FRAC_PI_2), 1.5 * PI, 1e-12);
        assert_approx_eq!(float_ops::wrap_angle(7.0), 7.0 - TAU, 1e-12);
    }
}
