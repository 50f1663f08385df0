//! Downside and upside semi-deviation.
//!
//! Each return is annualized as `a_i = x_i / dt_i` and compared to a
//! threshold `θ`. Only deviations on one side contribute, weighted by the
//! elapsed time, giving `sqrt((1/n) Σ d_i²·dt_i)` in the units of `σ`.

use crate::errors::{validate_finite, FinanceResult};
use crate::math_utils::{checked_sqrt, kahan_sum_iter};
use crate::returns::LogReturns;
use time::OffsetDateTime;

/// Side of the threshold a semi-deviation measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    /// Returns below the threshold
    Downside,
    /// Returns above the threshold
    Upside,
}

impl Side {
    fn deviation(self, excess: f64) -> f64 {
        match self {
            Side::Downside => excess.min(0.0),
            Side::Upside => excess.max(0.0),
        }
    }
}

/// Semi-deviation of precomputed returns around an annualized threshold.
pub fn semi_deviation(returns: &LogReturns, threshold: f64, side: Side) -> FinanceResult<f64> {
    validate_finite(threshold, "threshold_return")?;
    let n = returns.len() as f64;
    let weighted = kahan_sum_iter(returns.annualized().zip(returns.intervals()).map(
        |(a, dt)| {
            let d = side.deviation(a - threshold);
            d * d * dt
        },
    ));
    checked_sqrt(weighted / n, "semi_deviation")
}

/// Annualized downside deviation below `threshold`.
///
/// Zero when no return falls below the threshold.
pub fn downside_risk(
    timestamps: &[OffsetDateTime],
    prices: &[f64],
    threshold: f64,
    days_per_year: f64,
) -> FinanceResult<f64> {
    let returns = LogReturns::compute(timestamps, prices, days_per_year)?;
    semi_deviation(&returns, threshold, Side::Downside)
}

/// Annualized upside deviation above `threshold`.
pub fn upside_risk(
    timestamps: &[OffsetDateTime],
    prices: &[f64],
    threshold: f64,
    days_per_year: f64,
) -> FinanceResult<f64> {
    let returns = LogReturns::compute(timestamps, prices, days_per_year)?;
    semi_deviation(&returns, threshold, Side::Upside)
}
