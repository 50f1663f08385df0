//! Beta against a benchmark and joint GBM fits across assets.
//!
//! Beta lines the asset up with the benchmark on shared timestamps, takes log
//! returns over that common grid and divides their co-moment by the
//! benchmark's second moment. The joint fit extends the single-asset GBM
//! estimator to cross products, giving a drift vector and an annualized
//! covariance matrix from which volatilities and correlations follow.

use crate::config::{BetaMethod, EstimationConfig};
use crate::drift_volatility::GbmFit;
use crate::errors::{validate_data_length, FinanceError, FinanceResult};
use crate::math_utils::{checked_sqrt, constants::MIN_VARIANCE};
use crate::returns::LogReturns;
use crate::timeseries::{align, TimeSeries, MIN_OBSERVATIONS};
use nalgebra::{DMatrix, DVector};
use time::OffsetDateTime;

/// Result of a beta computation that is allowed to fail softly.
///
/// Symbol estimation still reports drift and risk when the benchmark is
/// unusable; the reason is kept for diagnostics and the wire value is `null`.
#[derive(Debug, Clone, PartialEq)]
pub enum BetaOutcome {
    /// Beta was computed
    Computed(f64),
    /// The benchmark could not be used
    Unavailable {
        /// Why no beta could be computed
        reason: String,
    },
}

impl BetaOutcome {
    /// The beta value, if one was computed.
    pub fn value(&self) -> Option<f64> {
        match self {
            BetaOutcome::Computed(beta) => Some(*beta),
            BetaOutcome::Unavailable { .. } => None,
        }
    }

    /// Whether a value is present.
    pub fn is_available(&self) -> bool {
        matches!(self, BetaOutcome::Computed(_))
    }
}

impl From<FinanceResult<f64>> for BetaOutcome {
    fn from(result: FinanceResult<f64>) -> Self {
        match result {
            Ok(beta) => BetaOutcome::Computed(beta),
            Err(e) => BetaOutcome::Unavailable {
                reason: e.to_string(),
            },
        }
    }
}

/// Serialize a [`BetaOutcome`] as `number | null`.
///
/// Deserializing `null` yields `Unavailable` with an empty reason.
#[cfg(feature = "serde")]
pub mod beta_as_nullable {
    use super::BetaOutcome;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Write the beta value or `null`.
    pub fn serialize<S: Serializer>(beta: &BetaOutcome, serializer: S) -> Result<S::Ok, S::Error> {
        beta.value().serialize(serializer)
    }

    /// Read a beta value or `null`.
    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<BetaOutcome, D::Error> {
        Ok(match Option::<f64>::deserialize(deserializer)? {
            Some(beta) => BetaOutcome::Computed(beta),
            None => BetaOutcome::Unavailable {
                reason: String::new(),
            },
        })
    }
}

/// Beta of asset returns against benchmark returns on the same grid.
///
/// # Errors
/// `DegenerateVariance` when the benchmark's second moment is zero.
pub fn beta_from_returns(
    benchmark: &LogReturns,
    asset: &LogReturns,
    method: BetaMethod,
) -> FinanceResult<f64> {
    let (comoment, benchmark_moment) = match method {
        BetaMethod::RawMoment => (
            asset.raw_comoment(benchmark)?,
            benchmark.raw_comoment(benchmark)?,
        ),
        BetaMethod::Centered => (
            asset.covariance(benchmark)?,
            benchmark.covariance(benchmark)?,
        ),
    };

    if benchmark_moment <= MIN_VARIANCE {
        return Err(FinanceError::DegenerateVariance {
            quantity: "benchmark variance".to_string(),
        });
    }
    Ok(comoment / benchmark_moment)
}

/// Beta from two price columns sharing one timestamp grid.
pub fn beta_from_prices(
    timestamps: &[OffsetDateTime],
    benchmark_prices: &[f64],
    asset_prices: &[f64],
    method: BetaMethod,
    days_per_year: f64,
) -> FinanceResult<f64> {
    let benchmark = LogReturns::compute(timestamps, benchmark_prices, days_per_year)?;
    let asset = LogReturns::compute(timestamps, asset_prices, days_per_year)?;
    beta_from_returns(&benchmark, &asset, method)
}

/// Beta of `asset` against `benchmark`.
///
/// The benchmark is joined onto the asset's timestamps with
/// `config.benchmark_join`, rows with a missing value on either side are
/// dropped, and returns are taken over the remaining shared grid.
///
/// # Errors
/// * `InsufficientData` when fewer than two aligned rows remain
/// * `DegenerateVariance` when the benchmark does not move
pub fn beta(
    benchmark: &TimeSeries,
    asset: &TimeSeries,
    config: &EstimationConfig,
) -> FinanceResult<f64> {
    let aligned = align(asset, benchmark, config.benchmark_join).drop_null_rows()?;
    beta_from_prices(
        aligned.timestamps(),
        aligned.second(),
        aligned.first(),
        config.beta_method,
        config.days_per_year,
    )
}

/// [`beta`] with failures folded into [`BetaOutcome::Unavailable`].
pub fn beta_outcome(
    benchmark: &TimeSeries,
    asset: &TimeSeries,
    config: &EstimationConfig,
) -> BetaOutcome {
    let outcome = BetaOutcome::from(beta(benchmark, asset, config));
    if let BetaOutcome::Unavailable { reason } = &outcome {
        log::warn!("Beta unavailable, reporting null: {}", reason);
    }
    outcome
}

/// Drift vector and annualized covariance matrix of several assets.
#[derive(Debug, Clone, PartialEq)]
pub struct JointGbmFit {
    drift: DVector<f64>,
    covariance: DMatrix<f64>,
}

impl JointGbmFit {
    /// Number of assets in the fit
    pub fn n_assets(&self) -> usize {
        self.drift.len()
    }

    /// Annualized drift per asset
    pub fn drift(&self) -> &DVector<f64> {
        &self.drift
    }

    /// Annualized covariance matrix
    pub fn covariance_matrix(&self) -> &DMatrix<f64> {
        &self.covariance
    }

    /// Annualized covariance between assets `i` and `j`.
    pub fn covariance(&self, i: usize, j: usize) -> f64 {
        self.covariance[(i, j)]
    }

    /// Annualized volatility of asset `i`.
    pub fn std(&self, i: usize) -> FinanceResult<f64> {
        checked_sqrt(self.covariance[(i, i)], "joint_fit")
    }

    /// Single-asset GBM parameters for asset `i`.
    pub fn marginal(&self, i: usize) -> FinanceResult<GbmFit> {
        Ok(GbmFit {
            r: self.drift[i],
            sigma: self.std(i)?,
        })
    }

    /// Correlation between assets `i` and `j`, clamped to `[-1, 1]`.
    ///
    /// # Errors
    /// `DegenerateVariance` when either asset has zero volatility.
    pub fn correlation(&self, i: usize, j: usize) -> FinanceResult<f64> {
        let (std_i, std_j) = (self.std(i)?, self.std(j)?);
        for (k, std) in [(i, std_i), (j, std_j)] {
            if std * std <= MIN_VARIANCE {
                return Err(FinanceError::DegenerateVariance {
                    quantity: format!("volatility of asset {}", k),
                });
            }
        }
        Ok((self.covariance(i, j) / (std_i * std_j)).clamp(-1.0, 1.0))
    }

    /// Full correlation matrix.
    pub fn correlation_matrix(&self) -> FinanceResult<DMatrix<f64>> {
        let n = self.n_assets();
        let mut corr = DMatrix::identity(n, n);
        for i in 0..n {
            for j in (i + 1)..n {
                let c = self.correlation(i, j)?;
                corr[(i, j)] = c;
                corr[(j, i)] = c;
            }
        }
        Ok(corr)
    }
}

/// Fit a joint GBM to assets observed on one timestamp grid.
///
/// `prices[k]` is the price column of asset `k`. The drift of each asset is
/// its single-asset GBM drift; `cov_ij = Σ(x_i − r_i·dt)(x_j − r_j·dt)/dt /
/// max(n−1, 1)`.
///
/// # Errors
/// * `InvalidParameter` with no assets
/// * `InsufficientData` with fewer than two observations
/// * `InvalidParameter` for non-positive prices
/// * `InvalidTimeSeries` when a column length differs from the timestamps
pub fn joint_fit(
    timestamps: &[OffsetDateTime],
    prices: &[Vec<f64>],
    days_per_year: f64,
) -> FinanceResult<JointGbmFit> {
    if prices.is_empty() {
        return Err(FinanceError::InvalidParameter {
            parameter: "prices".to_string(),
            value: 0.0,
            constraint: "at least one asset".to_string(),
        });
    }
    validate_data_length(timestamps, MIN_OBSERVATIONS)?;

    let returns = prices
        .iter()
        .map(|column| LogReturns::compute(timestamps, column, days_per_year))
        .collect::<FinanceResult<Vec<_>>>()?;

    let n = returns.len();
    let drift = DVector::from_iterator(n, returns.iter().map(LogReturns::drift));
    let mut covariance = DMatrix::zeros(n, n);
    for i in 0..n {
        for j in i..n {
            let c = returns[i].covariance(&returns[j])?;
            covariance[(i, j)] = c;
            covariance[(j, i)] = c;
        }
    }

    log::debug!(
        "Joint GBM fit over {} assets and {} returns",
        n,
        returns[0].len()
    );
    Ok(JointGbmFit { drift, covariance })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeseries::JoinMode;
    use assert_approx_eq::assert_approx_eq;
    use time::macros::datetime;
    use time::Duration;

    fn daily(n: usize) -> Vec<OffsetDateTime> {
        (0..n)
            .map(|i| datetime!(2022-01-03 00:00 UTC) + Duration::days(i as i64))
            .collect()
    }

    fn wiggle(n: usize) -> Vec<f64> {
        (0..n)
            .map(|i| 100.0 * (1.0 + 0.05 * (i as f64 * 0.7).sin()) * 1.001f64.powi(i as i32))
            .collect()
    }

    #[test]
    fn test_beta_of_series_with_itself_is_one() {
        let ts = daily(40);
        let p = wiggle(40);
        for method in [BetaMethod::RawMoment, BetaMethod::Centered] {
            let b = beta_from_prices(&ts, &p, &p, method, 365.0).unwrap();
            assert_approx_eq!(b, 1.0, 1e-12);
        }
    }

    #[test]
    fn test_constant_return_ratio_gives_beta_two() {
        let ts = daily(10);
        let bench: Vec<f64> = (0..10).map(|i| 100.0 * 0.01f64.exp().powi(i)).collect();
        let asset: Vec<f64> = (0..10).map(|i| 50.0 * 0.02f64.exp().powi(i)).collect();
        let b = beta_from_prices(&ts, &bench, &asset, BetaMethod::RawMoment, 365.0).unwrap();
        assert_approx_eq!(b, 2.0, 1e-9);
    }

    #[test]
    fn test_constant_return_ratio_is_degenerate_when_centered() {
        let ts = daily(10);
        let bench: Vec<f64> = (0..10).map(|i| 100.0 * 0.01f64.exp().powi(i)).collect();
        let asset: Vec<f64> = (0..10).map(|i| 50.0 * 0.02f64.exp().powi(i)).collect();
        assert!(matches!(
            beta_from_prices(&ts, &bench, &asset, BetaMethod::Centered, 365.0),
            Err(FinanceError::DegenerateVariance { .. })
        ));
    }

    #[test]
    fn test_default_beta_is_covariance_over_variance_on_trending_pair() {
        let n = 40;
        let ts = daily(n);
        let bench_log: Vec<f64> = (0..n)
            .map(|i| 0.01 * i as f64 + 0.02 * (0.7 * i as f64).sin())
            .collect();
        let asset_log: Vec<f64> = (0..n)
            .map(|i| 0.03 * i as f64 + 0.01 * (1.3 * i as f64).cos())
            .collect();
        let to_prices = |logs: &[f64]| -> Vec<f64> { logs.iter().map(|x| x.exp()).collect() };
        let benchmark = TimeSeries::from_prices(ts.clone(), to_prices(&bench_log[..])).unwrap();
        let asset = TimeSeries::from_prices(ts, to_prices(&asset_log[..])).unwrap();

        let diffs = |v: &[f64]| -> Vec<f64> { v.windows(2).map(|w| w[1] - w[0]).collect() };
        let (a, b) = (diffs(&asset_log[..]), diffs(&bench_log[..]));
        let mean = |v: &[f64]| v.iter().sum::<f64>() / v.len() as f64;
        let (a_bar, b_bar) = (mean(&a[..]), mean(&b[..]));
        let cov: f64 = a.iter().zip(&b).map(|(x, y)| (x - a_bar) * (y - b_bar)).sum();
        let var: f64 = b.iter().map(|y| (y - b_bar).powi(2)).sum();
        let expected = cov / var;

        let default_beta = beta(&benchmark, &asset, &EstimationConfig::default()).unwrap();
        assert_approx_eq!(default_beta, expected, 1e-9);
        assert!(default_beta < 0.0, "beta = {}", default_beta);

        // moments about zero are dominated by the shared trend
        let raw = EstimationConfig {
            beta_method: BetaMethod::RawMoment,
            ..EstimationConfig::default()
        };
        assert!(beta(&benchmark, &asset, &raw).unwrap() > 1.0);
    }

    #[test]
    fn test_flat_benchmark_is_degenerate() {
        let ts = daily(10);
        let bench = vec![100.0; 10];
        let asset = wiggle(10);
        for method in [BetaMethod::RawMoment, BetaMethod::Centered] {
            assert!(matches!(
                beta_from_prices(&ts, &bench, &asset, method, 365.0),
                Err(FinanceError::DegenerateVariance { .. })
            ));
        }
    }

    #[test]
    fn test_beta_aligns_on_shared_timestamps() {
        let ts = daily(30);
        let p = wiggle(30);
        let asset = TimeSeries::from_prices(ts.clone(), p.clone()).unwrap();
        // benchmark misses every third day and has one extra trailing point
        let mut bench_ts = Vec::new();
        let mut bench_p = Vec::new();
        for (i, (t, v)) in ts.iter().zip(&p).enumerate() {
            if i % 3 != 0 {
                bench_ts.push(*t);
                bench_p.push(*v);
            }
        }
        bench_ts.push(ts[29] + Duration::days(1));
        bench_p.push(1.0);
        let benchmark = TimeSeries::from_prices(bench_ts, bench_p).unwrap();

        for join in [JoinMode::Left, JoinMode::Inner] {
            let config = EstimationConfig {
                benchmark_join: join,
                ..EstimationConfig::daily()
            };
            assert_approx_eq!(beta(&benchmark, &asset, &config).unwrap(), 1.0, 1e-12);
        }
    }

    #[test]
    fn test_beta_outcome_on_disjoint_benchmark() {
        let asset = TimeSeries::from_prices(daily(5), wiggle(5)).unwrap();
        let late: Vec<_> = daily(5).iter().map(|t| *t + Duration::days(100)).collect();
        let benchmark = TimeSeries::from_prices(late, wiggle(5)).unwrap();

        let outcome = beta_outcome(&benchmark, &asset, &EstimationConfig::daily());
        assert!(!outcome.is_available());
        assert_eq!(outcome.value(), None);
        match outcome {
            BetaOutcome::Unavailable { reason } => assert!(reason.contains("Insufficient")),
            BetaOutcome::Computed(_) => panic!("expected unavailable beta"),
        }
    }

    #[test]
    fn test_joint_fit_matches_single_asset_fit() {
        let ts = daily(50);
        let a = wiggle(50);
        let b: Vec<f64> = a.iter().map(|p| p * p / 80.0).collect();
        let fit = joint_fit(&ts, &[a.clone(), b], 365.0).unwrap();

        let single = crate::drift_volatility::fit_gbm(&ts, &a, 365.0).unwrap();
        assert_approx_eq!(fit.drift()[0], single.r, 1e-12);
        assert_approx_eq!(fit.std(0).unwrap(), single.sigma, 1e-12);
        assert_eq!(fit.marginal(0).unwrap().r, fit.drift()[0]);

        // b's log returns are exactly twice a's
        assert_approx_eq!(fit.covariance(0, 1), 2.0 * fit.covariance(0, 0), 1e-9);
        assert_approx_eq!(fit.correlation(0, 1).unwrap(), 1.0, 1e-12);
    }

    #[test]
    fn test_reciprocal_prices_are_perfectly_anticorrelated() {
        let ts = daily(25);
        let a = wiggle(25);
        let inv: Vec<f64> = a.iter().map(|p| 1.0 / p).collect();
        let fit = joint_fit(&ts, &[a, inv], 365.0).unwrap();
        assert_approx_eq!(fit.correlation(0, 1).unwrap(), -1.0, 1e-12);

        let corr = fit.correlation_matrix().unwrap();
        assert_eq!(corr[(0, 0)], 1.0);
        assert_approx_eq!(corr[(1, 0)], -1.0, 1e-12);
    }

    #[test]
    fn test_joint_fit_three_assets_is_symmetric() {
        let ts = daily(30);
        let a = wiggle(30);
        let b: Vec<f64> = (0..30).map(|i| 20.0 + (i as f64 * 1.3).cos()).collect();
        let c: Vec<f64> = (0..30).map(|i| 70.0 + (i as f64 * 0.4).sin() * 3.0).collect();
        let fit = joint_fit(&ts, &[a, b, c], 365.0).unwrap();

        assert_eq!(fit.n_assets(), 3);
        let cov = fit.covariance_matrix();
        assert_eq!(cov, &cov.transpose());
        let corr = fit.correlation_matrix().unwrap();
        for v in corr.iter() {
            assert!((-1.0..=1.0).contains(v));
        }
    }

    #[test]
    fn test_zero_volatility_correlation_is_degenerate() {
        let ts = daily(10);
        let fit = joint_fit(&ts, &[wiggle(10), vec![5.0; 10]], 365.0).unwrap();
        assert_eq!(fit.std(1).unwrap(), 0.0);
        assert!(matches!(
            fit.correlation(0, 1),
            Err(FinanceError::DegenerateVariance { .. })
        ));
        assert!(fit.correlation_matrix().is_err());
    }

    #[test]
    fn test_joint_fit_input_errors() {
        let ts = daily(5);
        assert!(joint_fit(&ts, &[], 365.0).is_err());
        assert!(matches!(
            joint_fit(&ts[..1], &[vec![1.0]], 365.0),
            Err(FinanceError::InsufficientData { .. })
        ));
        assert!(matches!(
            joint_fit(&ts, &[wiggle(5), wiggle(4)], 365.0),
            Err(FinanceError::InvalidTimeSeries { .. })
        ));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_beta_wire_format() {
        #[derive(serde::Serialize, serde::Deserialize)]
        struct Wrapper {
            #[serde(with = "beta_as_nullable")]
            beta: BetaOutcome,
        }

        let computed = Wrapper {
            beta: BetaOutcome::Computed(1.5),
        };
        assert_eq!(serde_json::to_string(&computed).unwrap(), r#"{"beta":1.5}"#);

        let missing = Wrapper {
            beta: BetaOutcome::Unavailable {
                reason: "flat".into(),
            },
        };
        assert_eq!(serde_json::to_string(&missing).unwrap(), r#"{"beta":null}"#);

        let back: Wrapper = serde_json::from_str(r#"{"beta":null}"#).unwrap();
        assert!(!back.beta.is_available());
    }
}
