//! Text rendering of an [`AnalysisReport`]
//!
//! Formats only; every number comes straight from the report.

use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, CellAlignment, ContentArrangement, Table};

use crate::error::Side;
use crate::pipeline::AnalysisReport;
use crate::statistics::{DispersionReport, PERCENTILE_RANKS};

const NOT_AVAILABLE: &str = "n/a";

fn percent(value: f64) -> String {
    format!("{value:.2}%")
}

fn share(value: Option<f64>) -> String {
    value.map_or_else(|| NOT_AVAILABLE.to_string(), |v| percent(v * 100.0))
}

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

/// Percentile table with one column per side
pub fn percentile_table(report: &DispersionReport) -> Table {
    let mut table = new_table(vec!["Percentile", "Positive", "Negative"]);

    for rank in PERCENTILE_RANKS {
        let value = |side: Side| {
            report
                .side(side)
                .ok()
                .and_then(|summary| summary.percentiles.get(rank))
                .map_or_else(|| NOT_AVAILABLE.to_string(), percent)
        };
        table.add_row(vec![
            Cell::new(format!("{rank}%")),
            Cell::new(value(Side::Positive)).set_alignment(CellAlignment::Right),
            Cell::new(value(Side::Negative)).set_alignment(CellAlignment::Right),
        ]);
    }
    table
}

/// Counts, shares and extrema
pub fn summary_table(report: &DispersionReport) -> Table {
    let mut table = new_table(vec!["Statistic", "Value"]);

    let extreme = |value: crate::error::Result<f64>| {
        value.map_or_else(|_| NOT_AVAILABLE.to_string(), percent)
    };

    let rows = [
        ("Days analyzed", report.analyzed_days.to_string()),
        ("Days with non-zero dispersion", report.total_days.to_string()),
        (
            "Days with positive dispersion",
            format!("{} ({})", report.positive_count, share(report.positive_share)),
        ),
        (
            "Days with negative dispersion",
            format!("{} ({})", report.negative_count, share(report.negative_share)),
        ),
        ("Days on the average", report.zero_count.to_string()),
        ("Maximum positive dispersion", extreme(report.max_positive())),
        ("Maximum negative dispersion", extreme(report.min_negative())),
    ];
    for (label, value) in rows {
        table.add_row(vec![
            Cell::new(label),
            Cell::new(value).set_alignment(CellAlignment::Right),
        ]);
    }
    table
}

/// Full text report: title, percentiles, then the summary block
pub fn render(analysis: &AnalysisReport) -> String {
    let range = match (analysis.first, analysis.last) {
        (Some(first), Some(last)) => {
            format!(" from {} to {}", first.format("%Y-%m-%d"), last.format("%Y-%m-%d"))
        }
        _ => String::new(),
    };

    format!(
        "Dispersion from SMA({}) for {} ({}){}\n\n{}\n\n{}\n",
        analysis.window,
        analysis.symbol,
        analysis.period,
        range,
        percentile_table(&analysis.report),
        summary_table(&analysis.report),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::analyze_prices;
    use crate::types::{LookbackPeriod, PriceSeries};

    fn analysis(closes: &[f64], window: usize) -> AnalysisReport {
        let prices = PriceSeries::from_closes(closes.iter().copied());
        AnalysisReport {
            symbol: "TEST".to_string(),
            period: LookbackPeriod::OneYear,
            window,
            first: prices.first_timestamp(),
            last: prices.last_timestamp(),
            report: analyze_prices(&prices, window).unwrap(),
        }
    }

    #[test]
    fn test_render_includes_labels_and_values() {
        let text = render(&analysis(&[100.0, 102.0, 104.0, 106.0, 108.0, 110.0], 2));

        assert!(text.contains("Dispersion from SMA(2) for TEST (1y)"));
        assert!(text.contains("1970-01-01"));
        assert!(text.contains("97%"));
        assert!(text.contains("5 (100.00%)"));
        assert!(text.contains("0 (0.00%)"));
    }

    #[test]
    fn test_render_marks_empty_half() {
        let report = analysis(&[100.0; 6], 3).report;
        let table = percentile_table(&report).to_string();
        let summary = summary_table(&report).to_string();

        assert!(table.contains(NOT_AVAILABLE));
        assert!(summary.contains("0 (n/a)"));
        assert!(summary.contains("Days analyzed"));
    }
}
