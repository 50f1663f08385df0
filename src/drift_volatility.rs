//! Geometric Brownian motion drift and volatility.
//!
//! Under GBM, `ln(p_i/p_{i-1}) ~ N(r·dt_i, σ²·dt_i)` for an interval of
//! `dt_i` years. The estimators below weight each return by its elapsed time,
//! so irregular calendars do not bias the annualized figures.

use crate::errors::FinanceResult;
use crate::math_utils::checked_sqrt;
use crate::returns::LogReturns;
use time::OffsetDateTime;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Annualized GBM parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GbmFit {
    /// Annualized log drift
    pub r: f64,
    /// Annualized volatility
    pub sigma: f64,
}

impl GbmFit {
    /// Fit from precomputed log returns.
    pub fn from_returns(returns: &LogReturns) -> FinanceResult<Self> {
        let r = returns.drift();
        let variance = returns.covariance(returns)?;
        Ok(Self {
            r,
            sigma: checked_sqrt(variance, "fit_gbm")?,
        })
    }

    /// Annualized variance `σ²`.
    pub fn variance(&self) -> f64 {
        self.sigma * self.sigma
    }
}

/// Estimate annualized drift and volatility of a price series.
///
/// `r = Σx_i / Σdt_i` and `σ² = Σ(x_i − r·dt_i)² / dt_i / max(n−1, 1)`.
///
/// # Errors
/// * `InsufficientData` with fewer than two prices
/// * `InvalidParameter` for non-positive prices
/// * `InvalidTimeSeries` for mismatched or non-increasing timestamps
pub fn fit_gbm(
    timestamps: &[OffsetDateTime],
    prices: &[f64],
    days_per_year: f64,
) -> FinanceResult<GbmFit> {
    let returns = LogReturns::compute(timestamps, prices, days_per_year)?;
    GbmFit::from_returns(&returns)
}
