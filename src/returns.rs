//! Log returns over irregular time grids.
//!
//! Calendar gaps (weekends, holidays) make consecutive observations unequally
//! spaced, so every return carries the elapsed fraction of a year it covers.
//! All annualized statistics in the crate are built on [`LogReturns`].

use crate::errors::{
    validate_data_length, validate_parameter, validate_positive_prices, FinanceError,
    FinanceResult,
};
use crate::math_utils::{constants::SECONDS_PER_DAY, kahan_sum, kahan_sum_iter};
use crate::timeseries::MIN_OBSERVATIONS;
use time::OffsetDateTime;

/// Log returns with the year fraction elapsed over each one.
#[derive(Debug, Clone, PartialEq)]
pub struct LogReturns {
    returns: Vec<f64>,
    intervals: Vec<f64>,
}

impl LogReturns {
    /// Compute `ln(p_i / p_{i-1})` and elapsed year fractions.
    ///
    /// # Errors
    /// * `InsufficientData` for fewer than two observations
    /// * `InvalidParameter` for non-positive prices
    /// * `InvalidTimeSeries` for mismatched lengths or non-increasing timestamps
    pub fn compute(
        timestamps: &[OffsetDateTime],
        prices: &[f64],
        days_per_year: f64,
    ) -> FinanceResult<Self> {
        if timestamps.len() != prices.len() {
            return Err(FinanceError::InvalidTimeSeries {
                reason: format!(
                    "{} timestamps but {} prices",
                    timestamps.len(),
                    prices.len()
                ),
            });
        }
        validate_data_length(prices, MIN_OBSERVATIONS)?;
        validate_positive_prices(prices)?;
        validate_parameter(days_per_year, f64::MIN_POSITIVE, f64::MAX, "days_per_year")?;

        let intervals = year_fractions(timestamps, days_per_year)?;
        let returns = prices.windows(2).map(|w| (w[1] / w[0]).ln()).collect();

        Ok(Self { returns, intervals })
    }

    /// Log returns
    pub fn returns(&self) -> &[f64] {
        &self.returns
    }

    /// Year fraction elapsed over each return
    pub fn intervals(&self) -> &[f64] {
        &self.intervals
    }

    /// Number of returns (observations minus one)
    pub fn len(&self) -> usize {
        self.returns.len()
    }

    /// Whether there are no returns
    pub fn is_empty(&self) -> bool {
        self.returns.is_empty()
    }

    /// Total elapsed time in years
    pub fn total_time(&self) -> f64 {
        kahan_sum(&self.intervals)
    }

    /// Annualized drift: `Σ x_i / Σ dt_i`.
    pub fn drift(&self) -> f64 {
        kahan_sum(&self.returns) / self.total_time()
    }

    /// Per-interval returns expressed at an annual rate, `x_i / dt_i`.
    pub fn annualized(&self) -> impl Iterator<Item = f64> + '_ {
        self.returns
            .iter()
            .zip(&self.intervals)
            .map(|(x, dt)| x / dt)
    }

    /// Annualized covariance with another return series on the same grid.
    ///
    /// `Σ (x_i − r_x dt_i)(y_i − r_y dt_i) / dt_i / max(n−1, 1)`; with `other ==
    /// self` this is the squared GBM volatility.
    pub fn covariance(&self, other: &LogReturns) -> FinanceResult<f64> {
        self.ensure_same_grid(other)?;
        let (rx, ry) = (self.drift(), other.drift());
        let sum = kahan_sum_iter(
            self.returns
                .iter()
                .zip(&other.returns)
                .zip(&self.intervals)
                .map(|((x, y), dt)| (x - rx * dt) * (y - ry * dt) / dt),
        );
        Ok(sum / self.dof())
    }

    /// Annualized second moment about zero with another series on the same grid.
    ///
    /// `Σ x_i y_i / dt_i / n`.
    pub fn raw_comoment(&self, other: &LogReturns) -> FinanceResult<f64> {
        self.ensure_same_grid(other)?;
        let sum = kahan_sum_iter(
            self.returns
                .iter()
                .zip(&other.returns)
                .zip(&self.intervals)
                .map(|((x, y), dt)| x * y / dt),
        );
        Ok(sum / self.len() as f64)
    }

    fn dof(&self) -> f64 {
        self.len().saturating_sub(1).max(1) as f64
    }

    fn ensure_same_grid(&self, other: &LogReturns) -> FinanceResult<()> {
        if self.intervals != other.intervals {
            return Err(FinanceError::InvalidTimeSeries {
                reason: "return series are not on the same time grid".to_string(),
            });
        }
        Ok(())
    }
}

/// Elapsed year fraction between consecutive timestamps.
pub fn year_fractions(
    timestamps: &[OffsetDateTime],
    days_per_year: f64,
) -> FinanceResult<Vec<f64>> {
    let seconds_per_year = days_per_year * SECONDS_PER_DAY;
    timestamps
        .windows(2)
        .enumerate()
        .map(|(i, w)| {
            let seconds = (w[1] - w[0]).as_seconds_f64();
            if seconds <= 0.0 {
                Err(FinanceError::InvalidTimeSeries {
                    reason: format!("timestamp {} does not follow timestamp {}", i + 1, i),
                })
            } else {
                Ok(seconds / seconds_per_year)
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use time::macros::datetime;
    use time::Duration;

    fn days(offsets: &[i64]) -> Vec<OffsetDateTime> {
        offsets
            .iter()
            .map(|&d| datetime!(2024-03-01 16:00 UTC) + Duration::days(d))
            .collect()
    }

    #[test]
    fn test_weekend_gap_is_annualized_by_elapsed_time() {
        // Friday -> Monday spans three days
        let ts = days(&[0, 3]);
        let r = LogReturns::compute(&ts, &[100.0, 101.0], 365.0).unwrap();
        assert_approx_eq!(r.intervals()[0], 3.0 / 365.0, 1e-15);
        assert_approx_eq!(r.returns()[0], (1.01f64).ln(), 1e-15);
        assert_approx_eq!(r.drift(), (1.01f64).ln() / (3.0 / 365.0), 1e-12);
    }

    #[test]
    fn test_self_covariance_for_uniform_grid_matches_sample_variance() {
        let ts = days(&[0, 1, 2, 3, 4]);
        let prices = [100.0, 102.0, 101.0, 104.0, 103.0];
        let r = LogReturns::compute(&ts, &prices, 365.0).unwrap();

        let x = r.returns();
        let mean = x.iter().sum::<f64>() / x.len() as f64;
        let sample_var = x.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (x.len() - 1) as f64;
        assert_approx_eq!(r.covariance(&r).unwrap(), sample_var * 365.0, 1e-12);
    }

    #[test]
    fn test_raw_comoment() {
        let ts = days(&[0, 1, 2]);
        let r = LogReturns::compute(&ts, &[1.0, 2.0, 4.0], 365.0).unwrap();
        let ln2 = 2f64.ln();
        assert_approx_eq!(r.raw_comoment(&r).unwrap(), ln2 * ln2 * 365.0, 1e-10);
    }

    #[test]
    fn test_validation_errors() {
        let ts = days(&[0]);
        assert!(matches!(
            LogReturns::compute(&ts, &[1.0], 365.0),
            Err(FinanceError::InsufficientData { required: 2, actual: 1 })
        ));

        let ts = days(&[0, 1]);
        assert!(matches!(
            LogReturns::compute(&ts, &[1.0, -1.0], 365.0),
            Err(FinanceError::InvalidParameter { .. })
        ));
        assert!(matches!(
            LogReturns::compute(&ts, &[1.0], 365.0),
            Err(FinanceError::InvalidTimeSeries { .. })
        ));

        let ts = days(&[1, 1]);
        assert!(matches!(
            LogReturns::compute(&ts, &[1.0, 2.0], 365.0),
            Err(FinanceError::InvalidTimeSeries { .. })
        ));
    }

    #[test]
    fn test_mismatched_grids_rejected() {
        let a = LogReturns::compute(&days(&[0, 1, 2]), &[1.0, 2.0, 3.0], 365.0).unwrap();
        let b = LogReturns::compute(&days(&[0, 1, 3]), &[1.0, 2.0, 3.0], 365.0).unwrap();
        assert!(a.covariance(&b).is_err());
        assert!(a.raw_comoment(&b).is_err());
    }
}
