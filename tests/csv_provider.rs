//! CSV provider through the async analysis entry point

use std::io::Write;

use dispersion::{
    AnalysisRequest, CsvPriceProvider, DispersionError, LookbackPeriod, PriceSeriesProvider,
    ProviderError, analyze,
};
use tempfile::TempDir;

fn write_prices(dir: &TempDir, name: &str, closes: &[f64]) {
    let mut file = std::fs::File::create(dir.path().join(name)).unwrap();
    writeln!(file, "Date,Close").unwrap();
    let start = chrono::NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
    for (i, close) in closes.iter().enumerate() {
        let date = start + chrono::Duration::days(i as i64);
        writeln!(file, "{},{close}", date.format("%Y-%m-%d")).unwrap();
    }
}

#[tokio::test]
async fn test_analyze_from_csv() {
    let dir = TempDir::new().unwrap();
    let closes: Vec<f64> = (0..120)
        .map(|i| 50.0 + 3.0 * (i as f64 / 9.0).sin())
        .collect();
    write_prices(&dir, "ACME.csv", &closes);

    let provider = CsvPriceProvider::new(dir.path().join("{symbol}.csv"));
    let request = AnalysisRequest::new("acme", LookbackPeriod::Max, 10).unwrap();
    let analysis = analyze(&provider, &request).await.unwrap();

    assert_eq!(analysis.symbol, "ACME");
    assert_eq!(analysis.report.analyzed_days, 120 - 10 + 1);
    assert!(analysis.report.positive.is_some());
    assert!(analysis.report.negative.is_some());
    assert_eq!(
        analysis.first.unwrap().format("%Y-%m-%d").to_string(),
        "2023-01-02"
    );
}

#[tokio::test]
async fn test_missing_file_is_symbol_not_found() {
    let dir = TempDir::new().unwrap();
    let provider = CsvPriceProvider::new(dir.path().join("{symbol}.csv"));

    let err = provider
        .fetch("NOPE", LookbackPeriod::OneYear)
        .await
        .unwrap_err();
    assert_eq!(
        err,
        ProviderError::SymbolNotFound {
            symbol: "NOPE".to_string()
        }
    );
}

#[tokio::test]
async fn test_short_file_is_insufficient_data() {
    let dir = TempDir::new().unwrap();
    write_prices(&dir, "TINY.csv", &[1.0, 2.0, 3.0]);

    let provider = CsvPriceProvider::new(dir.path().join("TINY.csv"));
    let request = AnalysisRequest::new("TINY", LookbackPeriod::Max, 10).unwrap();
    let err = analyze(&provider, &request).await.unwrap_err();

    assert_eq!(
        err,
        DispersionError::InsufficientData {
            required: 10,
            actual: 3
        }
    );
}

#[tokio::test]
async fn test_lookback_trims_old_rows() {
    let dir = TempDir::new().unwrap();
    // Two years of daily rows
    write_prices(&dir, "LONG.csv", &vec![10.0; 730]);

    let provider = CsvPriceProvider::new(dir.path().join("LONG.csv"));
    let series = provider.fetch("LONG", LookbackPeriod::OneYear).await.unwrap();

    assert_eq!(series.len(), 366);
}
