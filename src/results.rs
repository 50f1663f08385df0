//! # Result Records
//!
//! Immutable value objects returned by [`crate::analyzer::MarketAnalyzer`].
//! With the `serde` feature, dates serialize as `YYYY-MM-DD`, the crash time
//! as RFC 3339 and beta as a number or `null`.

use crate::beta_correlation::BetaOutcome;
use crate::errors::FinanceResult;
use crate::lppl::{LpplFit, LpplParameters};
use time::{Date, OffsetDateTime};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Drift, volatility, semi-deviations and beta of one symbol.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EstimationResult {
    /// Symbol the series belongs to
    pub symbol: String,
    /// Annualized log drift
    pub r: f64,
    /// Annualized volatility
    pub volatility: f64,
    /// Annualized downside semi-deviation
    pub downside_risk: f64,
    /// Annualized upside semi-deviation
    pub upside_risk: f64,
    /// Beta against the benchmark, `null` when unavailable
    #[cfg_attr(feature = "serde", serde(with = "crate::beta_correlation::beta_as_nullable"))]
    pub beta: BetaOutcome,
    /// First date of the supplied series
    pub data_startdate: Date,
    /// Last date of the supplied series
    pub data_enddate: Date,
    /// Number of non-null prices used
    pub nbrecords: usize,
}

/// Pairwise drift, volatility and correlation of two symbols.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CorrelationResult {
    /// First symbol
    pub symbol1: String,
    /// Second symbol
    pub symbol2: String,
    /// Annualized drift of the first symbol
    pub r1: f64,
    /// Annualized drift of the second symbol
    pub r2: f64,
    /// Annualized volatility of the first symbol
    pub std1: f64,
    /// Annualized volatility of the second symbol
    pub std2: f64,
    /// Annualized covariance
    pub covariance: f64,
    /// `covariance / (std1·std2)`
    pub correlation: f64,
    /// First shared date
    pub startdate: Date,
    /// Last shared date
    pub enddate: Date,
}

/// Fitted LPPL model and the crash time it implies.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CrashModelResult {
    /// Symbol the series belongs to
    pub symbol: String,
    /// First date of the fitted window
    pub startdate: Date,
    /// Last date of the fitted window
    pub enddate: Date,
    /// UTC calendar date of `tc`
    pub estimated_crash_date: Date,
    /// `tc` as a UTC timestamp
    #[cfg_attr(feature = "serde", serde(with = "time::serde::rfc3339"))]
    pub estimated_crash_time: OffsetDateTime,
    /// Parameters in seconds since the Unix epoch
    pub model_parameters: LpplParameters,
}

impl CrashModelResult {
    /// Build the record for an accepted fit over `[startdate, enddate]`.
    pub fn from_fit(
        symbol: impl Into<String>,
        startdate: Date,
        enddate: Date,
        fit: &LpplFit,
    ) -> FinanceResult<Self> {
        let estimated_crash_time = fit.parameters.critical_time()?;
        Ok(Self {
            symbol: symbol.into(),
            startdate,
            enddate,
            estimated_crash_date: estimated_crash_time.date(),
            estimated_crash_time,
            model_parameters: fit.parameters,
        })
    }
}

#[cfg(all(test, feature = "serde"))]
mod tests {
    use super::*;
    use time::macros::{date, datetime};

    #[test]
    fn test_estimation_result_wire_format() {
        let result = EstimationResult {
            symbol: "ACME".into(),
            r: 0.1,
            volatility: 0.2,
            downside_risk: 0.05,
            upside_risk: 0.07,
            beta: BetaOutcome::Unavailable {
                reason: "benchmark flat".into(),
            },
            data_startdate: date!(2024 - 01 - 02),
            data_enddate: date!(2024 - 03 - 28),
            nbrecords: 60,
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["beta"], serde_json::Value::Null);
        assert_eq!(json["data_startdate"], "2024-01-02");
        assert_eq!(json["data_enddate"], "2024-03-28");
        assert_eq!(json["nbrecords"], 60);
    }

    #[test]
    fn test_crash_result_wire_format() {
        let fit = LpplFit {
            parameters: LpplParameters {
                tc: datetime!(2024-05-01 12:00 UTC).unix_timestamp() as f64,
                m: 0.4,
                omega: 7.5,
                a: 8.2,
                b: -1e-3,
                c: 1e-4,
                phi: 0.3,
            },
            rss: 1e-3,
            starts_attempted: 100,
            starts_converged: 10,
            iterations: 500,
        };
        let result =
            CrashModelResult::from_fit("ACME", date!(2023 - 05 - 01), date!(2024 - 04 - 01), &fit)
                .unwrap();
        assert_eq!(result.estimated_crash_date, date!(2024 - 05 - 01));

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["estimated_crash_date"], "2024-05-01");
        assert_eq!(json["estimated_crash_time"], "2024-05-01T12:00:00Z");
        assert_eq!(json["model_parameters"]["A"], 8.2);
        assert_eq!(json["model_parameters"]["omega"], 7.5);

        let back: CrashModelResult = serde_json::from_value(json).unwrap();
        assert_eq!(back, result);
    }
}
