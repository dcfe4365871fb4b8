//! End-to-end analysis: fetch, compute, split, summarize

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::dispersion::DispersionCalculator;
use crate::error::{Result, Side};
use crate::provider::PriceSeriesProvider;
use crate::splitter::split;
use crate::statistics::{DispersionReport, StatisticsSummarizer};
use crate::types::{AnalysisRequest, LookbackPeriod, PriceSeries};

/// Compute → split → summarize for one moving-average window
///
/// Holds no mutable state; one pipeline can serve any number of threads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispersionPipeline {
    calculator: DispersionCalculator,
    summarizer: StatisticsSummarizer,
}

impl DispersionPipeline {
    pub fn new(window: usize) -> Result<Self> {
        Ok(Self {
            calculator: DispersionCalculator::new(window)?,
            summarizer: StatisticsSummarizer::default(),
        })
    }

    pub fn with_summarizer(mut self, summarizer: StatisticsSummarizer) -> Self {
        self.summarizer = summarizer;
        self
    }

    pub fn window(&self) -> usize {
        self.calculator.window()
    }

    pub fn run(&self, prices: &PriceSeries) -> Result<DispersionReport> {
        let series = self.calculator.compute(prices)?;
        let partition = split(&series);
        Ok(self.summarizer.summarize(&partition))
    }
}

/// Report labelled with the request that produced it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub symbol: String,
    pub period: LookbackPeriod,
    pub window: usize,
    /// First and last price timestamps fed to the pipeline
    pub first: Option<DateTime<Utc>>,
    pub last: Option<DateTime<Utc>>,
    pub report: DispersionReport,
}

/// Run the pipeline over an already materialized series
pub fn analyze_prices(prices: &PriceSeries, window: usize) -> Result<DispersionReport> {
    DispersionPipeline::new(window)?.run(prices)
}

/// Fetch prices for `request` and summarize their dispersion
#[instrument(skip(provider, request), fields(symbol = request.symbol(), period = %request.period(), window = request.window()))]
pub async fn analyze<P>(provider: &P, request: &AnalysisRequest) -> Result<AnalysisReport>
where
    P: PriceSeriesProvider,
{
    let pipeline = DispersionPipeline::new(request.window())?;
    let prices = provider.fetch(request.symbol(), request.period()).await?;
    let report = pipeline.run(&prices)?;

    for (side, summary) in [
        (Side::Positive, &report.positive),
        (Side::Negative, &report.negative),
    ] {
        if summary.is_none() {
            warn!(%side, total_days = report.total_days, "Dispersion half is empty");
        }
    }
    info!(
        prices = prices.len(),
        analyzed_days = report.analyzed_days,
        positive = report.positive_count,
        negative = report.negative_count,
        "Dispersion analysis complete"
    );

    Ok(AnalysisReport {
        symbol: request.symbol().to_string(),
        period: request.period(),
        window: request.window(),
        first: prices.first_timestamp(),
        last: prices.last_timestamp(),
        report,
    })
}
