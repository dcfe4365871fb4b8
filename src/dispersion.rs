//! Moving average and percentage dispersion
//!
//! Dispersion is the signed distance of a close from its own trailing simple
//! moving average, in percent:
//!
//! ```text
//! dispersion[i] = (close[i] - sma[i]) / sma[i] * 100
//! ```
//!
//! Every intermediate series is index-aligned with the input prices and tags
//! each entry as defined (`Some`) or undefined (`None`). Only the defined
//! entries leave this module, as a [`CleanDispersionSeries`].
//!
//! # Example
//!
//! ```
//! use dispersion::{DispersionCalculator, PriceSeries};
//!
//! let prices = PriceSeries::from_closes([100.0, 102.0, 104.0]);
//! let calculator = DispersionCalculator::new(2).unwrap();
//! let series = calculator.compute(&prices).unwrap();
//!
//! assert_eq!(series.len(), 2);
//! assert!((series.values()[0] - 100.0 / 101.0).abs() < 1e-12);
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{DispersionError, Result};
use crate::types::PriceSeries;

/// One defined dispersion value, still tied to its observation time
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DispersionPoint {
    pub timestamp: DateTime<Utc>,
    /// Percentage deviation from the moving average
    pub value: f64,
}

/// Dispersion values with every undefined entry removed, in chronological order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CleanDispersionSeries {
    points: Vec<DispersionPoint>,
}

impl CleanDispersionSeries {
    pub fn new(points: Vec<DispersionPoint>) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[DispersionPoint] {
        &self.points
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Derives the dispersion series for a fixed moving-average window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispersionCalculator {
    window: usize,
}

impl DispersionCalculator {
    /// Create a calculator; a zero window is rejected
    pub fn new(window: usize) -> Result<Self> {
        if window == 0 {
            return Err(DispersionError::InvalidParameter {
                name: "window",
                reason: "window must be at least 1".to_string(),
            });
        }
        Ok(Self { window })
    }

    pub fn window(&self) -> usize {
        self.window
    }

    /// Trailing simple moving average, aligned with `closes`
    ///
    /// The first `window - 1` entries are `None`, as is any window holding a
    /// non-finite close.
    pub fn moving_average(&self, closes: &[f64]) -> Vec<Option<f64>> {
        let mut averages = vec![None; closes.len()];
        if closes.len() < self.window {
            return averages;
        }

        let divisor = self.window as f64;
        let mut sum = RunningSum::default();
        // Consecutive finite closes ending at `index`
        let mut run = 0usize;
        for (index, &close) in closes.iter().enumerate() {
            if !close.is_finite() {
                sum = RunningSum::default();
                run = 0;
                continue;
            }
            sum.add(close);
            run += 1;
            if run > self.window {
                sum.add(-closes[index - self.window]);
            }
            if run >= self.window {
                averages[index] = Some(sum.value() / divisor);
            }
        }
        averages
    }

    /// Percentage dispersion, aligned with the input prices
    pub fn dispersion_series(&self, prices: &PriceSeries) -> Result<Vec<Option<f64>>> {
        self.check_length(prices)?;

        let closes = prices.closes();
        let averages = self.moving_average(&closes);

        Ok(closes
            .iter()
            .zip(averages)
            .map(|(&close, sma)| match sma {
                Some(sma) if sma != 0.0 && close.is_finite() => {
                    Some((close - sma) / sma * 100.0).filter(|d| d.is_finite())
                }
                _ => None,
            })
            .collect())
    }

    /// Defined dispersion values only, ready for splitting
    pub fn compute(&self, prices: &PriceSeries) -> Result<CleanDispersionSeries> {
        let series = self.dispersion_series(prices)?;

        let points: Vec<DispersionPoint> = prices
            .points()
            .iter()
            .zip(series)
            .filter_map(|(point, value)| {
                value.map(|value| DispersionPoint {
                    timestamp: point.timestamp,
                    value,
                })
            })
            .collect();

        let expected = prices.len() - self.window + 1;
        if points.len() < expected {
            warn!(
                dropped = expected - points.len(),
                "Dropped dispersion entries with zero or non-finite inputs"
            );
        }
        debug!(
            prices = prices.len(),
            window = self.window,
            defined = points.len(),
            "Computed dispersion series"
        );

        Ok(CleanDispersionSeries::new(points))
    }

    fn check_length(&self, prices: &PriceSeries) -> Result<()> {
        if prices.len() < self.window {
            return Err(DispersionError::InsufficientData {
                required: self.window,
                actual: prices.len(),
            });
        }
        Ok(())
    }
}

/// Neumaier-compensated running sum
#[derive(Debug, Default, Clone, Copy)]
struct RunningSum {
    sum: f64,
    compensation: f64,
}

impl RunningSum {
    fn add(&mut self, value: f64) {
        let total = self.sum + value;
        if self.sum.abs() >= value.abs() {
            self.compensation += (self.sum - total) + value;
        } else {
            self.compensation += (value - total) + self.sum;
        }
        self.sum = total;
    }

    fn value(&self) -> f64 {
        self.sum + self.compensation
    }
}
