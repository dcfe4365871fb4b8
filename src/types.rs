//! Core data types: price points, series, lookback periods and requests

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{DispersionError, Result};

/// A single closing price observation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    /// Observation time
    pub timestamp: DateTime<Utc>,
    /// Closing price; NaN marks a missing close
    pub close: f64,
}

impl PricePoint {
    pub fn new(timestamp: DateTime<Utc>, close: f64) -> Self {
        Self { timestamp, close }
    }
}

/// Time-ordered closing prices for one instrument
///
/// Ordering and de-duplication are the provider's responsibility; the series
/// is taken as given and never mutated after construction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    points: Vec<PricePoint>,
}

impl PriceSeries {
    pub fn new(points: Vec<PricePoint>) -> Self {
        Self { points }
    }

    /// Build a daily series from bare closes, starting at the Unix epoch
    pub fn from_closes<I>(closes: I) -> Self
    where
        I: IntoIterator<Item = f64>,
    {
        let points = closes
            .into_iter()
            .enumerate()
            .map(|(day, close)| {
                let timestamp =
                    DateTime::from_timestamp(day as i64 * 86_400, 0).unwrap_or_default();
                PricePoint::new(timestamp, close)
            })
            .collect();
        Self { points }
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn closes(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.close).collect()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first_timestamp(&self) -> Option<DateTime<Utc>> {
        self.points.first().map(|p| p.timestamp)
    }

    pub fn last_timestamp(&self) -> Option<DateTime<Utc>> {
        self.points.last().map(|p| p.timestamp)
    }
}

/// Lookback period requested from a provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum LookbackPeriod {
    #[serde(rename = "1y")]
    OneYear,
    #[serde(rename = "5y")]
    FiveYears,
    #[default]
    #[serde(rename = "10y")]
    TenYears,
    #[serde(rename = "max")]
    Max,
}

impl LookbackPeriod {
    pub const ALL: [LookbackPeriod; 4] = [
        LookbackPeriod::OneYear,
        LookbackPeriod::FiveYears,
        LookbackPeriod::TenYears,
        LookbackPeriod::Max,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LookbackPeriod::OneYear => "1y",
            LookbackPeriod::FiveYears => "5y",
            LookbackPeriod::TenYears => "10y",
            LookbackPeriod::Max => "max",
        }
    }

    /// Calendar span covered by the period, `None` for the full history
    pub fn span(&self) -> Option<Duration> {
        match self {
            LookbackPeriod::OneYear => Some(Duration::days(365)),
            LookbackPeriod::FiveYears => Some(Duration::days(5 * 365)),
            LookbackPeriod::TenYears => Some(Duration::days(10 * 365)),
            LookbackPeriod::Max => None,
        }
    }
}

impl fmt::Display for LookbackPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LookbackPeriod {
    type Err = DispersionError;

    fn from_str(s: &str) -> Result<Self> {
        LookbackPeriod::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| DispersionError::InvalidParameter {
                name: "period",
                reason: format!("expected one of 1y, 5y, 10y, max; got {s:?}"),
            })
    }
}

/// Explicit parameters for one analysis run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalysisRequest {
    symbol: String,
    period: LookbackPeriod,
    window: usize,
}

impl AnalysisRequest {
    /// Validate and build a request; rejects an empty symbol or a zero window
    pub fn new(symbol: impl Into<String>, period: LookbackPeriod, window: usize) -> Result<Self> {
        let symbol = symbol.into().trim().to_uppercase();
        if symbol.is_empty() {
            return Err(DispersionError::InvalidParameter {
                name: "symbol",
                reason: "symbol must not be empty".to_string(),
            });
        }
        if window == 0 {
            return Err(DispersionError::InvalidParameter {
                name: "window",
                reason: "window must be at least 1".to_string(),
            });
        }
        Ok(Self {
            symbol,
            period,
            window,
        })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn period(&self) -> LookbackPeriod {
        self.period
    }

    pub fn window(&self) -> usize {
        self.window
    }
}
