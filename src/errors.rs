//! Error types and validation functions for financial estimation.
//!
//! Every fallible operation in the crate returns [`FinanceResult`]. Errors are
//! reported to the caller unchanged; numerical failures are never retried or
//! replaced with placeholder values.

use thiserror::Error;

/// Error types for time series estimation and crash-model fitting.
#[derive(Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum FinanceError {
    /// Fewer usable observations than the operation requires.
    #[error("Insufficient data: need at least {required} points, got {actual}")]
    InsufficientData {
        /// Minimum required data points
        required: usize,
        /// Actual number of data points provided
        actual: usize,
    },

    /// A ratio required division by a zero variance.
    #[error("Degenerate variance: {quantity} is zero")]
    DegenerateVariance {
        /// Name of the quantity whose variance vanished
        quantity: String,
    },

    /// The LPPL multi-start search produced no acceptable candidate.
    #[error("LPPL fit did not converge after {starts_attempted} starts: {reason}")]
    FitConvergence {
        /// Why no candidate was accepted
        reason: String,
        /// Number of local refinements that were attempted
        starts_attempted: usize,
    },

    /// The caller cancelled a long-running computation.
    #[error("Computation cancelled: {operation}")]
    Cancelled {
        /// Operation that observed the cancellation
        operation: String,
    },

    /// Invalid parameter value for an estimator or configuration.
    #[error("Invalid parameter: {parameter} = {value}, expected {constraint}")]
    InvalidParameter {
        /// Parameter name
        parameter: String,
        /// Invalid value provided
        value: f64,
        /// Valid range or constraint description
        constraint: String,
    },

    /// Time series violates its structural invariants.
    #[error("Invalid time series: {reason}")]
    InvalidTimeSeries {
        /// Description of the violated invariant
        reason: String,
    },

    /// Numerical computation error due to instability or invalid input.
    #[error("Numerical computation failed: {reason}")]
    NumericalError {
        /// Detailed reason for numerical failure
        reason: String,
        /// Operation that failed
        operation: Option<String>,
    },
}

/// Result type for estimation operations.
pub type FinanceResult<T> = Result<T, FinanceError>;

/// Validates that data has sufficient length for an estimator.
///
/// # Example
/// ```rust
/// use lppl_finance::errors::validate_data_length;
///
/// let data = vec![1.0, 2.0, 3.0];
/// assert!(validate_data_length(&data, 2).is_ok());
/// assert!(validate_data_length(&data, 5).is_err());
/// ```
pub fn validate_data_length<T>(data: &[T], min_required: usize) -> FinanceResult<()> {
    if data.len() < min_required {
        Err(FinanceError::InsufficientData {
            required: min_required,
            actual: data.len(),
        })
    } else {
        Ok(())
    }
}

/// Validates that a parameter is within expected bounds (inclusive).
///
/// # Example
/// ```rust
/// use lppl_finance::errors::validate_parameter;
///
/// assert!(validate_parameter(0.5, 0.0, 1.0, "m").is_ok());
/// assert!(validate_parameter(1.5, 0.0, 1.0, "m").is_err());
/// ```
pub fn validate_parameter(value: f64, min: f64, max: f64, name: &str) -> FinanceResult<()> {
    if value.is_nan() {
        return Err(FinanceError::InvalidParameter {
            parameter: name.to_string(),
            value,
            constraint: "must not be NaN".to_string(),
        });
    }

    if min.is_nan() || max.is_nan() || min > max {
        return Err(FinanceError::NumericalError {
            reason: format!(
                "Invalid bounds for parameter {}: min={}, max={}",
                name, min, max
            ),
            operation: None,
        });
    }

    if value < min || value > max {
        Err(FinanceError::InvalidParameter {
            parameter: name.to_string(),
            value,
            constraint: format!("[{}, {}]", min, max),
        })
    } else {
        Ok(())
    }
}

/// Validates that a value is finite and not NaN.
pub fn validate_finite(value: f64, name: &str) -> FinanceResult<()> {
    if !value.is_finite() {
        Err(FinanceError::NumericalError {
            reason: format!("{} is not finite: {}", name, value),
            operation: None,
        })
    } else {
        Ok(())
    }
}

/// Validates that all values in a slice are finite.
///
/// Returns on the first non-finite value, naming its index.
pub fn validate_all_finite(data: &[f64], name: &str) -> FinanceResult<()> {
    if let Some((i, &value)) = data.iter().enumerate().find(|(_, v)| !v.is_finite()) {
        return Err(FinanceError::NumericalError {
            reason: format!("{} contains non-finite value at index {}: {}", name, i, value),
            operation: None,
        });
    }
    Ok(())
}

/// Validates that every price is strictly positive, as required for log returns.
pub fn validate_positive_prices(prices: &[f64]) -> FinanceResult<()> {
    validate_all_finite(prices, "prices")?;
    if let Some(&value) = prices.iter().find(|&&p| p <= 0.0) {
        return Err(FinanceError::InvalidParameter {
            parameter: "price".to_string(),
            value,
            constraint: "> 0".to_string(),
        });
    }
    Ok(())
}
