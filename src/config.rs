//! # Estimation Configuration
//!
//! Configuration structures for the closed-form estimators and the bundle
//! consumed by [`crate::analyzer::MarketAnalyzer`].

use crate::errors::{validate_parameter, FinanceResult};
use crate::lppl::LpplConfig;
use crate::timeseries::JoinMode;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// How second moments are taken when computing beta.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum BetaMethod {
    /// Moments about each series' fitted drift: `Cov(asset, benchmark) / Var(benchmark)`.
    #[default]
    Centered,
    /// Moments about a zero return. Defined for constant-return series.
    RawMoment,
}

/// Configuration for drift, volatility, risk and beta estimation.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EstimationConfig {
    /// Calendar days in one annualization period
    pub days_per_year: f64,
    /// Threshold return for downside/upside semi-deviation
    pub threshold_return: f64,
    /// Moment convention for beta
    pub beta_method: BetaMethod,
    /// Join used to line the benchmark up against the asset
    pub benchmark_join: JoinMode,
}

impl Default for EstimationConfig {
    fn default() -> Self {
        Self::daily()
    }
}

impl EstimationConfig {
    /// Calendar-day annualization (365 days per year)
    pub fn daily() -> Self {
        Self {
            days_per_year: 365.0,
            threshold_return: 0.0,
            beta_method: BetaMethod::Centered,
            benchmark_join: JoinMode::Left,
        }
    }

    /// Trading-day annualization (252 days per year)
    pub fn trading_days() -> Self {
        Self {
            days_per_year: 252.0,
            ..Self::daily()
        }
    }

    /// Check that the annualization period is usable.
    pub fn validate(&self) -> FinanceResult<()> {
        validate_parameter(self.days_per_year, f64::MIN_POSITIVE, 1e6, "days_per_year")?;
        validate_parameter(self.threshold_return, -1e6, 1e6, "threshold_return")
    }
}

/// Complete configuration for the market analyzer.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AnalysisConfig {
    /// Closed-form estimator settings
    pub estimation: EstimationConfig,
    /// LPPL crash-fit settings
    pub lppl: LpplConfig,
}
