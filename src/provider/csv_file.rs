//! CSV file price provider
//!
//! Reads daily closes exported from a charting tool or a spreadsheet. The
//! file needs a `Date` and a `Close` column (lowercase accepted); any other
//! columns are ignored. Empty or unparseable closes are kept as NaN so the
//! dispersion calculator drops them explicitly.
//!
//! The path may contain a `{symbol}` placeholder, e.g. `data/{symbol}.csv`.

use std::io::Read;
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, Utc};
use csv::ReaderBuilder;
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use super::PriceSeriesProvider;
use crate::error::ProviderError;
use crate::types::{LookbackPeriod, PricePoint, PriceSeries};

/// One CSV row
#[derive(Debug, Clone, Deserialize)]
struct CsvPriceRecord {
    #[serde(rename = "Date", alias = "date", alias = "timestamp")]
    date: String,
    #[serde(
        rename = "Close",
        alias = "close",
        deserialize_with = "csv::invalid_option"
    )]
    close: Option<f64>,
}

/// Parse `YYYY-MM-DD`, `YYYY-MM-DD HH:MM:SS±HH:MM` or RFC 3339 timestamps
fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, ProviderError> {
    let raw = raw.trim();

    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    if let Ok(ts) = DateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%:z") {
        return Ok(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| ProviderError::Parse {
            message: format!("Invalid date: {raw}"),
        })
}

/// Parse CSV rows into a series trimmed to `period`
///
/// Rows are sorted oldest first; the lookback is measured back from the most
/// recent row.
pub fn read_price_series<R: Read>(
    reader: R,
    symbol: &str,
    period: LookbackPeriod,
) -> Result<PriceSeries, ProviderError> {
    let mut csv_reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut points = Vec::new();
    let mut missing = 0usize;
    for result in csv_reader.deserialize() {
        let record: CsvPriceRecord = result?;
        let close = record.close.unwrap_or_else(|| {
            missing += 1;
            f64::NAN
        });
        points.push(PricePoint::new(parse_timestamp(&record.date)?, close));
    }

    if missing > 0 {
        warn!(symbol, missing, "CSV rows without a usable close");
    }

    points.sort_by_key(|p| p.timestamp);

    if let (Some(span), Some(last)) = (period.span(), points.last().map(|p| p.timestamp)) {
        let cutoff = last - span;
        points.retain(|p| p.timestamp >= cutoff);
    }

    if points.is_empty() {
        return Err(ProviderError::NoData {
            symbol: symbol.to_string(),
        });
    }

    debug!(symbol, %period, rows = points.len(), "Loaded CSV price series");
    Ok(PriceSeries::new(points))
}

/// Provider reading closes from a CSV file per symbol
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvPriceProvider {
    path: PathBuf,
}

impl CsvPriceProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// File path for `symbol`, substituting any `{symbol}` placeholder
    pub fn path_for(&self, symbol: &str) -> PathBuf {
        let raw = self.path.to_string_lossy();
        if raw.contains("{symbol}") {
            PathBuf::from(raw.replace("{symbol}", symbol))
        } else {
            self.path.clone()
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PriceSeriesProvider for CsvPriceProvider {
    #[instrument(skip(self))]
    async fn fetch(
        &self,
        symbol: &str,
        period: LookbackPeriod,
    ) -> Result<PriceSeries, ProviderError> {
        let path = self.path_for(symbol);
        let content = tokio::fs::read(&path).await.map_err(|err| {
            if err.kind() == std::io::ErrorKind::NotFound {
                ProviderError::SymbolNotFound {
                    symbol: symbol.to_string(),
                }
            } else {
                ProviderError::from(err)
            }
        })?;

        read_price_series(content.as_slice(), symbol, period)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
Date,Open,High,Low,Close,Volume
2024-01-03,1,1,1,101.0,10
2024-01-02,1,1,1,100.0,10
2024-01-04,1,1,1,,10
2024-01-05,1,1,1,103.5,10
";

    #[test]
    fn test_parse_timestamp_formats() {
        let expected = parse_timestamp("2024-01-02").unwrap();
        assert_eq!(parse_timestamp("2024-01-02T00:00:00Z").unwrap(), expected);
        assert_eq!(
            parse_timestamp("2024-01-01 19:00:00-05:00").unwrap(),
            expected
        );
        assert!(parse_timestamp("02/01/2024").is_err());
    }

    #[test]
    fn test_read_sorts_and_keeps_missing_as_nan() {
        let series = read_price_series(SAMPLE.as_bytes(), "TEST", LookbackPeriod::Max).unwrap();
        let closes = series.closes();

        assert_eq!(series.len(), 4);
        assert_eq!(closes[0], 100.0);
        assert_eq!(closes[1], 101.0);
        assert!(closes[2].is_nan());
        assert_eq!(closes[3], 103.5);
    }

    #[test]
    fn test_read_trims_to_period() {
        let csv = "Date,Close\n2020-01-01,1.0\n2023-06-01,2.0\n2024-01-01,3.0\n";
        let series = read_price_series(csv.as_bytes(), "TEST", LookbackPeriod::OneYear).unwrap();
        assert_eq!(series.closes(), vec![2.0, 3.0]);

        let series = read_price_series(csv.as_bytes(), "TEST", LookbackPeriod::FiveYears).unwrap();
        assert_eq!(series.len(), 3);
    }

    #[test]
    fn test_read_empty_file_is_no_data() {
        let err = read_price_series("Date,Close\n".as_bytes(), "EMPTY", LookbackPeriod::Max)
            .unwrap_err();
        assert_eq!(
            err,
            ProviderError::NoData {
                symbol: "EMPTY".to_string()
            }
        );
    }

    #[test]
    fn test_read_rejects_bad_date() {
        let err = read_price_series("Date,Close\nyesterday,1.0\n".as_bytes(), "X", LookbackPeriod::Max)
            .unwrap_err();
        assert!(matches!(err, ProviderError::Parse { .. }));
    }

    #[test]
    fn test_path_placeholder() {
        let provider = CsvPriceProvider::new("data/{symbol}.csv");
        assert_eq!(provider.path_for("MSFT"), PathBuf::from("data/MSFT.csv"));

        let provider = CsvPriceProvider::new("prices.csv");
        assert_eq!(provider.path_for("MSFT"), PathBuf::from("prices.csv"));
    }
}
