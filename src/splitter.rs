//! Sign partitioning of a clean dispersion series

use serde::{Deserialize, Serialize};

use crate::dispersion::CleanDispersionSeries;

/// Dispersion values split by sign, chronological order preserved
///
/// Exact zeros (a close sitting on its average) belong to neither side and
/// are only counted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SignedPartition {
    pub positive: Vec<f64>,
    pub negative: Vec<f64>,
    pub zero_count: usize,
}

impl SignedPartition {
    /// Length of the series this partition was split from
    pub fn source_len(&self) -> usize {
        self.positive.len() + self.negative.len() + self.zero_count
    }
}

/// Partition dispersion values into strictly positive and strictly negative
pub fn split(series: &CleanDispersionSeries) -> SignedPartition {
    let mut partition = SignedPartition::default();

    for point in series.points() {
        if point.value > 0.0 {
            partition.positive.push(point.value);
        } else if point.value < 0.0 {
            partition.negative.push(point.value);
        } else {
            partition.zero_count += 1;
        }
    }

    partition
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispersion::DispersionPoint;
    use chrono::DateTime;

    fn series(values: &[f64]) -> CleanDispersionSeries {
        CleanDispersionSeries::new(
            values
                .iter()
                .enumerate()
                .map(|(i, &value)| DispersionPoint {
                    timestamp: DateTime::from_timestamp(i as i64 * 86_400, 0).unwrap(),
                    value,
                })
                .collect(),
        )
    }

    #[test]
    fn test_split_preserves_order() {
        let partition = split(&series(&[1.5, -0.5, 0.0, 2.5, -3.0, 0.25]));

        assert_eq!(partition.positive, vec![1.5, 2.5, 0.25]);
        assert_eq!(partition.negative, vec![-0.5, -3.0]);
        assert_eq!(partition.zero_count, 1);
        assert_eq!(partition.source_len(), 6);
    }

    #[test]
    fn test_split_empty() {
        let partition = split(&CleanDispersionSeries::default());
        assert!(partition.positive.is_empty());
        assert!(partition.negative.is_empty());
        assert_eq!(partition.zero_count, 0);
    }

    #[test]
    fn test_negative_zero_counts_as_zero() {
        let partition = split(&series(&[-0.0, 0.0]));
        assert_eq!(partition.zero_count, 2);
    }
}
