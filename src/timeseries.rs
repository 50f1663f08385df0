//! Time series containers and timestamp alignment.
//!
//! A [`TimeSeries`] holds strictly increasing timestamps with optional values.
//! Two series are joined by exact timestamp match with [`align`]; rows with a
//! missing value are then dropped before any estimator sees them.

use crate::errors::{FinanceError, FinanceResult};
use time::OffsetDateTime;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Minimum number of usable rows for any return-based estimator.
pub const MIN_OBSERVATIONS: usize = 2;

/// A single observation; `None` marks a missing value.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Observation {
    /// Observation instant
    pub timestamp: OffsetDateTime,
    /// Observed value, if present
    pub value: Option<f64>,
}

impl Observation {
    /// Observation with a present value.
    pub fn new(timestamp: OffsetDateTime, value: f64) -> Self {
        Self {
            timestamp,
            value: Some(value),
        }
    }

    /// Observation with a missing value.
    pub fn missing(timestamp: OffsetDateTime) -> Self {
        Self {
            timestamp,
            value: None,
        }
    }
}

/// Ordered sequence of observations with strictly increasing timestamps.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries {
    observations: Vec<Observation>,
}

impl TimeSeries {
    /// Build a series, checking timestamp order.
    ///
    /// `NaN` values are stored as missing; infinite values are rejected.
    pub fn new(observations: Vec<Observation>) -> FinanceResult<Self> {
        let mut observations = observations;
        for (i, obs) in observations.iter_mut().enumerate() {
            match obs.value {
                Some(v) if v.is_nan() => obs.value = None,
                Some(v) if v.is_infinite() => {
                    return Err(FinanceError::InvalidTimeSeries {
                        reason: format!("infinite value at index {}", i),
                    })
                }
                _ => {}
            }
        }

        if let Some(i) = observations
            .windows(2)
            .position(|w| w[1].timestamp <= w[0].timestamp)
        {
            return Err(FinanceError::InvalidTimeSeries {
                reason: format!(
                    "timestamp at index {} ({}) is not after index {} ({})",
                    i + 1,
                    observations[i + 1].timestamp,
                    i,
                    observations[i].timestamp
                ),
            });
        }

        Ok(Self { observations })
    }

    /// Build a series from parallel timestamp and value vectors.
    pub fn from_values(
        timestamps: Vec<OffsetDateTime>,
        values: Vec<Option<f64>>,
    ) -> FinanceResult<Self> {
        if timestamps.len() != values.len() {
            return Err(FinanceError::InvalidTimeSeries {
                reason: format!(
                    "{} timestamps but {} values",
                    timestamps.len(),
                    values.len()
                ),
            });
        }
        Self::new(
            timestamps
                .into_iter()
                .zip(values)
                .map(|(timestamp, value)| Observation { timestamp, value })
                .collect(),
        )
    }

    /// Build a series without missing values.
    pub fn from_prices(timestamps: Vec<OffsetDateTime>, prices: Vec<f64>) -> FinanceResult<Self> {
        Self::from_values(timestamps, prices.into_iter().map(Some).collect())
    }

    /// All observations, in timestamp order.
    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    /// Number of observations, missing ones included.
    pub fn len(&self) -> usize {
        self.observations.len()
    }

    /// Whether the series has no observations.
    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// Number of observations with a value.
    pub fn valid_count(&self) -> usize {
        self.observations.iter().filter(|o| o.value.is_some()).count()
    }

    /// First timestamp, missing values included.
    pub fn first_timestamp(&self) -> Option<OffsetDateTime> {
        self.observations.first().map(|o| o.timestamp)
    }

    /// Last timestamp, missing values included.
    pub fn last_timestamp(&self) -> Option<OffsetDateTime> {
        self.observations.last().map(|o| o.timestamp)
    }

    /// Value at an exact timestamp, if the timestamp is present.
    pub fn value_at(&self, timestamp: OffsetDateTime) -> Option<Option<f64>> {
        self.observations
            .binary_search_by(|o| o.timestamp.cmp(&timestamp))
            .ok()
            .map(|i| self.observations[i].value)
    }

    /// Drop missing rows; fails when fewer than two remain.
    pub fn drop_nulls(&self) -> FinanceResult<CleanSeries> {
        let (timestamps, values): (Vec<_>, Vec<_>) = self
            .observations
            .iter()
            .filter_map(|o| o.value.map(|v| (o.timestamp, v)))
            .unzip();

        if values.len() < MIN_OBSERVATIONS {
            return Err(FinanceError::InsufficientData {
                required: MIN_OBSERVATIONS,
                actual: values.len(),
            });
        }

        Ok(CleanSeries { timestamps, values })
    }
}

/// Null-free series with at least two observations.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanSeries {
    timestamps: Vec<OffsetDateTime>,
    values: Vec<f64>,
}

impl CleanSeries {
    /// Timestamps in increasing order
    pub fn timestamps(&self) -> &[OffsetDateTime] {
        &self.timestamps
    }

    /// Values aligned with [`Self::timestamps`]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Always false: a clean series holds at least two rows
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Join mode for [`align`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum JoinMode {
    /// Keep only timestamps present in both series
    #[default]
    Inner,
    /// Keep every timestamp of the first series
    Left,
}

/// Two series joined on shared timestamps.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedSeriesPair {
    mode: JoinMode,
    timestamps: Vec<OffsetDateTime>,
    first: Vec<Option<f64>>,
    second: Vec<Option<f64>>,
}

impl AlignedSeriesPair {
    /// Join mode that produced this pair
    pub fn mode(&self) -> JoinMode {
        self.mode
    }

    /// Joined timestamps
    pub fn timestamps(&self) -> &[OffsetDateTime] {
        &self.timestamps
    }

    /// Values from the first series
    pub fn first(&self) -> &[Option<f64>] {
        &self.first
    }

    /// Values from the second series
    pub fn second(&self) -> &[Option<f64>] {
        &self.second
    }

    /// Number of joined rows
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    /// Whether the join is empty
    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    /// Drop rows where either value is missing; fails when fewer than two remain.
    pub fn drop_null_rows(&self) -> FinanceResult<CleanPair> {
        let mut timestamps = Vec::with_capacity(self.len());
        let mut first = Vec::with_capacity(self.len());
        let mut second = Vec::with_capacity(self.len());

        for ((&ts, a), b) in self.timestamps.iter().zip(&self.first).zip(&self.second) {
            if let (Some(a), Some(b)) = (a, b) {
                timestamps.push(ts);
                first.push(*a);
                second.push(*b);
            }
        }

        if timestamps.len() < MIN_OBSERVATIONS {
            return Err(FinanceError::InsufficientData {
                required: MIN_OBSERVATIONS,
                actual: timestamps.len(),
            });
        }

        Ok(CleanPair {
            timestamps,
            first,
            second,
        })
    }
}

/// Null-free joined pair with at least two rows.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanPair {
    timestamps: Vec<OffsetDateTime>,
    first: Vec<f64>,
    second: Vec<f64>,
}

impl CleanPair {
    /// Shared timestamps
    pub fn timestamps(&self) -> &[OffsetDateTime] {
        &self.timestamps
    }

    /// Values from the first series
    pub fn first(&self) -> &[f64] {
        &self.first
    }

    /// Values from the second series
    pub fn second(&self) -> &[f64] {
        &self.second
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    /// Always false: a clean pair holds at least two rows
    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }
}

/// Join two series by exact timestamp match. No interpolation is performed.
pub fn align(a: &TimeSeries, b: &TimeSeries, mode: JoinMode) -> AlignedSeriesPair {
    let a_obs = a.observations();
    let b_obs = b.observations();
    let capacity = match mode {
        JoinMode::Inner => a_obs.len().min(b_obs.len()),
        JoinMode::Left => a_obs.len(),
    };

    let mut timestamps = Vec::with_capacity(capacity);
    let mut first = Vec::with_capacity(capacity);
    let mut second = Vec::with_capacity(capacity);

    // Both inputs are strictly increasing, so a single merge pass suffices
    let mut j = 0;
    for obs in a_obs {
        while j < b_obs.len() && b_obs[j].timestamp < obs.timestamp {
            j += 1;
        }
        let matched = b_obs
            .get(j)
            .filter(|other| other.timestamp == obs.timestamp);

        match (matched, mode) {
            (Some(other), _) => {
                timestamps.push(obs.timestamp);
                first.push(obs.value);
                second.push(other.value);
            }
            (None, JoinMode::Left) => {
                timestamps.push(obs.timestamp);
                first.push(obs.value);
                second.push(None);
            }
            (None, JoinMode::Inner) => {}
        }
    }

    AlignedSeriesPair {
        mode,
        timestamps,
        first,
        second,
    }
}
