//! Percentiles, counts, extrema and histograms for each dispersion half
//!
//! The positive and negative partitions are summarized independently: each
//! gets its own percentile set and its own histogram spanning that side's
//! [min, max]. Bin widths therefore differ between the two sides unless a
//! renderer aligns them explicitly.
//!
//! Percentiles use the linear method: for rank `p` over `n` sorted values the
//! position is `p / 100 * (n - 1)`, interpolated between the order statistics
//! either side of it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use tracing::debug;

use crate::error::{DispersionError, Result, Side};
use crate::splitter::SignedPartition;

/// Percentile ranks reported for each side
pub const PERCENTILE_RANKS: [u8; 7] = [5, 10, 25, 50, 75, 90, 97];

/// Histogram bins per side
pub const HISTOGRAM_BINS: usize = 100;

/// Half-width added around a single-valued range so bins keep a width
///
/// Widened further when the value is too large for 0.5 to register.
pub const DEGENERATE_PAD: f64 = 0.5;

/// Linear-interpolated percentile of an ascending slice
///
/// Returns `None` for an empty slice. `rank` is in percent and clamped to
/// [0, 100].
pub fn percentile(sorted: &[f64], rank: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }

    let position = rank.clamp(0.0, 100.0) / 100.0 * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - lower as f64;

    let (a, b) = (sorted[lower], sorted[upper]);
    // Interpolate from the nearer end so results never overshoot `b`
    let value = if fraction >= 0.5 {
        b - (b - a) * (1.0 - fraction)
    } else {
        a + (b - a) * fraction
    };
    Some(value)
}

/// Percentile values keyed by integer rank
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PercentileSet {
    values: BTreeMap<u8, f64>,
}

impl PercentileSet {
    /// Compute the standard ranks over an unsorted partition
    pub fn compute(side: Side, values: &[f64]) -> Result<Self> {
        Self::compute_ranks(side, values, &PERCENTILE_RANKS)
    }

    pub fn compute_ranks(side: Side, values: &[f64], ranks: &[u8]) -> Result<Self> {
        if values.is_empty() {
            return Err(DispersionError::EmptyPartition { side });
        }

        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);

        let values = ranks
            .iter()
            .filter_map(|&rank| percentile(&sorted, f64::from(rank)).map(|v| (rank, v)))
            .collect();
        Ok(Self { values })
    }

    pub fn get(&self, rank: u8) -> Option<f64> {
        self.values.get(&rank).copied()
    }

    /// (rank, value) pairs in ascending rank order
    pub fn iter(&self) -> impl Iterator<Item = (u8, f64)> + '_ {
        self.values.iter().map(|(&rank, &value)| (rank, value))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// One histogram bin
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistogramBin {
    pub left: f64,
    pub right: f64,
    pub count: u64,
}

/// Equal-width histogram over a partition's own range
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Histogram {
    /// `bins + 1` ascending edges
    pub edges: Vec<f64>,
    /// One count per bin
    pub frequencies: Vec<u64>,
}

impl Histogram {
    /// Bin `values` into `bins` equal-width bins spanning [min, max]
    ///
    /// A range too narrow to split at the values' magnitude is widened
    /// symmetrically so every bin has a positive width. Bins are half-open except the last, which also holds the maximum.
    /// Returns `None` when there is nothing to bin.
    pub fn from_values(values: &[f64], bins: usize) -> Option<Self> {
        if values.is_empty() || bins == 0 {
            return None;
        }

        let (mut low, mut high) = values
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            });
        // Narrowest span whose equal-width edges stay distinct at this magnitude
        let min_span = low.abs().max(high.abs()) * f64::EPSILON * 4.0 * bins as f64;
        if low == high {
            let pad = DEGENERATE_PAD.max(min_span / 2.0);
            low -= pad;
            high += pad;
        } else if high - low < min_span {
            let pad = (min_span - (high - low)) / 2.0;
            low -= pad;
            high += pad;
        }

        let step = (high - low) / bins as f64;
        let mut edges: Vec<f64> = (0..=bins).map(|i| low + step * i as f64).collect();
        edges[bins] = high;

        let norm = bins as f64 / (high - low);
        let mut frequencies = vec![0u64; bins];
        for &value in values {
            let mut index = (((value - low) * norm) as usize).min(bins - 1);
            // Correct for rounding against the materialized edges
            if index > 0 && value < edges[index] {
                index -= 1;
            } else if index + 1 < bins && value >= edges[index + 1] {
                index += 1;
            }
            frequencies[index] += 1;
        }

        Some(Self { edges, frequencies })
    }

    pub fn bin_count(&self) -> usize {
        self.frequencies.len()
    }

    pub fn total(&self) -> u64 {
        self.frequencies.iter().sum()
    }

    pub fn bins(&self) -> impl Iterator<Item = HistogramBin> + '_ {
        self.edges
            .windows(2)
            .zip(&self.frequencies)
            .map(|(edge, &count)| HistogramBin {
                left: edge[0],
                right: edge[1],
                count,
            })
    }
}

/// Statistics for one non-empty sign partition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartitionSummary {
    pub side: Side,
    pub count: usize,
    pub percentiles: PercentileSet,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    /// Sample standard deviation, present from two values upward
    pub std_dev: Option<f64>,
    pub histogram: Histogram,
}

impl PartitionSummary {
    /// Value furthest from the average: max for positive, min for negative
    pub fn extreme(&self) -> f64 {
        match self.side {
            Side::Positive => self.max,
            Side::Negative => self.min,
        }
    }
}

/// A percentile marker for chart overlays
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReferenceLine {
    pub side: Side,
    pub rank: u8,
    pub value: f64,
}

/// Final, presentation-agnostic summary of a dispersion series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DispersionReport {
    /// Days with non-zero dispersion (`positive_count + negative_count`)
    pub total_days: usize,
    /// Every defined dispersion day, zeros included
    pub analyzed_days: usize,
    pub positive_count: usize,
    pub negative_count: usize,
    pub zero_count: usize,
    /// Fraction of `total_days`; `None` when there are no such days
    pub positive_share: Option<f64>,
    pub negative_share: Option<f64>,
    pub positive: Option<PartitionSummary>,
    pub negative: Option<PartitionSummary>,
}

impl DispersionReport {
    pub fn side(&self, side: Side) -> Result<&PartitionSummary> {
        let summary = match side {
            Side::Positive => self.positive.as_ref(),
            Side::Negative => self.negative.as_ref(),
        };
        summary.ok_or(DispersionError::EmptyPartition { side })
    }

    pub fn percentiles_positive(&self) -> Result<&PercentileSet> {
        self.side(Side::Positive).map(|s| &s.percentiles)
    }

    pub fn percentiles_negative(&self) -> Result<&PercentileSet> {
        self.side(Side::Negative).map(|s| &s.percentiles)
    }

    pub fn max_positive(&self) -> Result<f64> {
        self.side(Side::Positive).map(|s| s.max)
    }

    pub fn min_negative(&self) -> Result<f64> {
        self.side(Side::Negative).map(|s| s.min)
    }

    pub fn histogram_positive(&self) -> Result<&Histogram> {
        self.side(Side::Positive).map(|s| &s.histogram)
    }

    pub fn histogram_negative(&self) -> Result<&Histogram> {
        self.side(Side::Negative).map(|s| &s.histogram)
    }

    /// Percentile markers for every non-empty side, positive first
    pub fn reference_lines(&self) -> Vec<ReferenceLine> {
        [self.positive.as_ref(), self.negative.as_ref()]
            .into_iter()
            .flatten()
            .flat_map(|summary| {
                summary.percentiles.iter().map(|(rank, value)| ReferenceLine {
                    side: summary.side,
                    rank,
                    value,
                })
            })
            .collect()
    }
}

/// Builds a [`DispersionReport`] from a signed partition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatisticsSummarizer {
    bins: usize,
}

impl Default for StatisticsSummarizer {
    fn default() -> Self {
        Self {
            bins: HISTOGRAM_BINS,
        }
    }
}

impl StatisticsSummarizer {
    pub fn with_bins(bins: usize) -> Result<Self> {
        if bins == 0 {
            return Err(DispersionError::InvalidParameter {
                name: "bins",
                reason: "histogram needs at least one bin".to_string(),
            });
        }
        Ok(Self { bins })
    }

    pub fn bins(&self) -> usize {
        self.bins
    }

    /// Summarize one side; fails with `EmptyPartition` when `values` is empty
    pub fn summarize_side(&self, side: Side, values: &[f64]) -> Result<PartitionSummary> {
        let percentiles = PercentileSet::compute(side, values)?;
        let histogram = Histogram::from_values(values, self.bins)
            .ok_or(DispersionError::EmptyPartition { side })?;

        let (min, max) = values
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            });
        let std_dev = (values.len() > 1).then(|| Statistics::std_dev(values.iter()));

        Ok(PartitionSummary {
            side,
            count: values.len(),
            percentiles,
            min,
            max,
            mean: Statistics::mean(values.iter()),
            std_dev,
            histogram,
        })
    }

    /// Summarize both halves; an empty half is left as `None`
    pub fn summarize(&self, partition: &SignedPartition) -> DispersionReport {
        let positive_count = partition.positive.len();
        let negative_count = partition.negative.len();
        let total_days = positive_count + negative_count;

        let share = |count: usize| (total_days > 0).then(|| count as f64 / total_days as f64);

        let positive = self.summarize_side(Side::Positive, &partition.positive).ok();
        let negative = self.summarize_side(Side::Negative, &partition.negative).ok();

        debug!(
            positive_count,
            negative_count,
            zero_count = partition.zero_count,
            "Summarized dispersion partitions"
        );

        DispersionReport {
            total_days,
            analyzed_days: partition.source_len(),
            positive_count,
            negative_count,
            zero_count: partition.zero_count,
            positive_share: share(positive_count),
            negative_share: share(negative_count),
            positive,
            negative,
        }
    }
}
