//! # LPPL Finance
//!
//! Return-based estimation and bubble diagnostics for financial time series.
//!
//! The crate estimates statistical properties of price series observed on
//! irregular calendars and fits a log-periodic power law (LPPL) model to
//! locate the critical time of a speculative bubble.
//!
//! ## Key Features
//!
//! - **GBM Drift & Volatility**: time-weighted, annualized estimators that respect calendar gaps
//! - **Semi-Deviation Risk**: downside and upside deviation around a threshold return
//! - **Beta & Correlation**: benchmark beta over shared timestamps and joint multi-asset fits
//! - **LPPL Crash Fitting**: multi-start, two-stage Levenberg–Marquardt with linear slaving
//! - **Deterministic & Cancellable**: seeded multi-start, iteration and wall-clock budgets,
//!   cooperative cancellation
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use lppl_finance::{MarketAnalyzer, TimeSeries};
//! use time::{macros::datetime, Duration};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let start = datetime!(2023-01-02 00:00 UTC);
//!     let timestamps: Vec<_> = (0..250).map(|i| start + Duration::days(i)).collect();
//!     let prices: Vec<f64> = (0..250)
//!         .map(|i| 100.0 * (0.003 * i as f64).exp() * (1.0 + 0.01 * (i as f64 * 0.3).sin()))
//!         .collect();
//!     let index: Vec<f64> = (0..250).map(|i| 4000.0 * (0.001 * i as f64).exp()).collect();
//!
//!     let series = TimeSeries::from_prices(timestamps.clone(), prices)?;
//!     let benchmark = TimeSeries::from_prices(timestamps, index)?;
//!     let analyzer = MarketAnalyzer::new();
//!
//!     let estimate = analyzer.estimate_symbol("ACME", &series, &benchmark)?;
//!     println!("r = {:.4}, sigma = {:.4}", estimate.r, estimate.volatility);
//!
//!     match analyzer.predict_crash("ACME", &series) {
//!         Ok(crash) => println!("crash expected around {}", crash.estimated_crash_date),
//!         Err(e) => println!("no LPPL fit: {}", e),
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! [`timeseries`] aligns and cleans raw series; [`returns`] turns prices into
//! log returns with elapsed year fractions, on which [`drift_volatility`],
//! [`risk`] and [`beta_correlation`] build. [`lppl`] fits the crash model on top
//! of [`optimizer`]. [`MarketAnalyzer`] ties them together into the result
//! records of [`results`].

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod analyzer;
pub mod beta_correlation;
pub mod compute_budget;
pub mod config;
pub mod drift_volatility;
pub mod errors;
pub mod lppl;
pub mod math_utils;
pub mod optimizer;
pub mod results;
pub mod returns;
pub mod risk;
pub mod timeseries;

pub use analyzer::MarketAnalyzer;
pub use beta_correlation::{
    beta, beta_from_prices, beta_from_returns, beta_outcome, joint_fit, BetaOutcome, JointGbmFit,
};
pub use compute_budget::{
    from_environment, CancellationToken, ComputeBudget, ComputeBudgetBuilder, StopSignal,
};
pub use config::{AnalysisConfig, BetaMethod, EstimationConfig};
pub use drift_volatility::{fit_gbm, GbmFit};
pub use errors::{FinanceError, FinanceResult};
pub use lppl::{fit_lppl, LpplConfig, LpplFit, LpplFitter, LpplParameters};
pub use optimizer::{levenberg_marquardt, LeastSquaresProblem, LmOutcome, LmSettings, Termination};
pub use results::{CorrelationResult, CrashModelResult, EstimationResult};
pub use returns::LogReturns;
pub use risk::{downside_risk, semi_deviation, upside_risk, Side};
pub use timeseries::{
    align, AlignedSeriesPair, CleanPair, CleanSeries, JoinMode, Observation, TimeSeries,
};
