//! # Market Analyzer
//!
//! [`MarketAnalyzer`] is the entry point that turns raw symbol series into the
//! result records: per-symbol drift, risk and beta, pairwise correlation, and
//! LPPL crash-time prediction. It owns only configuration; every call is a
//! pure function of its inputs.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use lppl_finance::{MarketAnalyzer, TimeSeries};
//! use lppl_finance::errors::FinanceError;
//! use time::{macros::datetime, Duration};
//!
//! # fn main() -> Result<(), FinanceError> {
//! let start = datetime!(2024-01-01 00:00 UTC);
//! let timestamps: Vec<_> = (0..120).map(|i| start + Duration::days(i)).collect();
//! let asset: Vec<f64> = (0..120).map(|i| 100.0 * (1.0 + 0.002 * i as f64)).collect();
//! let index: Vec<f64> = (0..120).map(|i| 50.0 * (1.0 + 0.001 * i as f64)).collect();
//!
//! let asset = TimeSeries::from_prices(timestamps.clone(), asset)?;
//! let index = TimeSeries::from_prices(timestamps, index)?;
//!
//! let analyzer = MarketAnalyzer::new();
//! let estimate = analyzer.estimate_symbol("ACME", &asset, &index)?;
//! println!(
//!     "r = {:.4}, sigma = {:.4}, beta = {:?}",
//!     estimate.r,
//!     estimate.volatility,
//!     estimate.beta.value()
//! );
//!
//! let crash = analyzer.predict_crash("ACME", &asset)?;
//! println!("estimated crash: {}", crash.estimated_crash_time);
//! # Ok(())
//! # }
//! ```

use crate::beta_correlation::{beta_outcome, joint_fit};
use crate::compute_budget::CancellationToken;
use crate::config::AnalysisConfig;
use crate::drift_volatility::GbmFit;
use crate::errors::FinanceResult;
use crate::lppl::LpplFitter;
use crate::results::{CorrelationResult, CrashModelResult, EstimationResult};
use crate::returns::LogReturns;
use crate::risk::{semi_deviation, Side};
use crate::timeseries::{align, JoinMode, TimeSeries};
use time::OffsetDateTime;

/// Orchestrates the estimators over symbol series.
#[derive(Debug, Clone, Default)]
pub struct MarketAnalyzer {
    config: AnalysisConfig,
}

impl MarketAnalyzer {
    /// Analyzer with daily annualization and the default LPPL search.
    pub fn new() -> Self {
        Self::default()
    }

    /// Analyzer with a validated configuration.
    pub fn with_config(config: AnalysisConfig) -> FinanceResult<Self> {
        config.estimation.validate()?;
        config.lppl.validate()?;
        Ok(Self { config })
    }

    /// Active configuration
    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Drift, volatility, semi-deviations and beta of `series`.
    ///
    /// Missing prices are dropped before estimation. Beta is computed against
    /// `benchmark`; when that fails the record carries an unavailable beta
    /// instead of an error. The date range is that of the supplied series.
    ///
    /// # Errors
    /// * `InsufficientData` when fewer than two non-null prices remain
    /// * `InvalidParameter` for non-positive prices
    pub fn estimate_symbol(
        &self,
        symbol: &str,
        series: &TimeSeries,
        benchmark: &TimeSeries,
    ) -> FinanceResult<EstimationResult> {
        let estimation = &self.config.estimation;
        let clean = series.drop_nulls()?;
        let returns =
            LogReturns::compute(clean.timestamps(), clean.values(), estimation.days_per_year)?;
        let gbm = GbmFit::from_returns(&returns)?;
        let downside_risk = semi_deviation(&returns, estimation.threshold_return, Side::Downside)?;
        let upside_risk = semi_deviation(&returns, estimation.threshold_return, Side::Upside)?;
        let beta = beta_outcome(benchmark, series, estimation);

        let (start, end) = span(series, clean.timestamps());
        log::debug!(
            "Estimated {}: r = {:.6}, sigma = {:.6}, {} records",
            symbol,
            gbm.r,
            gbm.sigma,
            clean.len()
        );

        Ok(EstimationResult {
            symbol: symbol.to_string(),
            r: gbm.r,
            volatility: gbm.sigma,
            downside_risk,
            upside_risk,
            beta,
            data_startdate: start.date(),
            data_enddate: end.date(),
            nbrecords: clean.len(),
        })
    }

    /// Joint drift, volatility and correlation of two symbols.
    ///
    /// The series are inner-joined on timestamps and rows with a missing value
    /// on either side are dropped. The reported period is the first and last
    /// shared timestamp.
    ///
    /// # Errors
    /// * `InsufficientData` when fewer than two shared rows remain
    /// * `DegenerateVariance` when either symbol has zero volatility
    pub fn estimate_correlation(
        &self,
        symbol1: &str,
        series1: &TimeSeries,
        symbol2: &str,
        series2: &TimeSeries,
    ) -> FinanceResult<CorrelationResult> {
        let aligned = align(series1, series2, JoinMode::Inner).drop_null_rows()?;
        let fit = joint_fit(
            aligned.timestamps(),
            &[aligned.first().to_vec(), aligned.second().to_vec()],
            self.config.estimation.days_per_year,
        )?;
        let correlation = fit.correlation(0, 1)?;

        let timestamps = aligned.timestamps();
        Ok(CorrelationResult {
            symbol1: symbol1.to_string(),
            symbol2: symbol2.to_string(),
            r1: fit.drift()[0],
            r2: fit.drift()[1],
            std1: fit.std(0)?,
            std2: fit.std(1)?,
            covariance: fit.covariance(0, 1),
            correlation,
            startdate: timestamps[0].date(),
            enddate: timestamps[timestamps.len() - 1].date(),
        })
    }

    /// Fit an LPPL model to `series` and report the implied crash time.
    ///
    /// # Errors
    /// * `InsufficientData` with too few non-null prices
    /// * `FitConvergence` when no multi-start refinement converges
    pub fn predict_crash(
        &self,
        symbol: &str,
        series: &TimeSeries,
    ) -> FinanceResult<CrashModelResult> {
        self.predict_crash_with_cancellation(symbol, series, &CancellationToken::new())
    }

    /// [`predict_crash`](Self::predict_crash) that aborts with `Cancelled`
    /// once `token` is cancelled.
    pub fn predict_crash_with_cancellation(
        &self,
        symbol: &str,
        series: &TimeSeries,
        token: &CancellationToken,
    ) -> FinanceResult<CrashModelResult> {
        let clean = series.drop_nulls()?;
        let fit = LpplFitter::new(self.config.lppl.clone()).fit_with_cancellation(
            clean.timestamps(),
            clean.values(),
            token,
        )?;

        let timestamps = clean.timestamps();
        let result = CrashModelResult::from_fit(
            symbol,
            timestamps[0].date(),
            timestamps[timestamps.len() - 1].date(),
            &fit,
        )?;
        log::info!(
            "LPPL fit for {}: crash estimated at {} (m = {:.3}, omega = {:.3}, rss = {:.3e})",
            symbol,
            result.estimated_crash_time,
            fit.parameters.m,
            fit.parameters.omega,
            fit.rss
        );
        Ok(result)
    }
}

/// First and last timestamp of the raw series, falling back to the cleaned ones.
fn span(series: &TimeSeries, clean: &[OffsetDateTime]) -> (OffsetDateTime, OffsetDateTime) {
    let first = series.first_timestamp().unwrap_or(clean[0]);
    let last = series.last_timestamp().unwrap_or(clean[clean.len() - 1]);
    (first, last)
}
