//! # Dispersion
//!
//! Distribution of a price's deviation from its own simple moving average.
//!
//! ## Quick Start
//!
//! ```rust
//! use dispersion::{DispersionPipeline, PriceSeries};
//!
//! let prices = PriceSeries::from_closes([100.0, 102.0, 101.0, 99.0, 103.0, 104.0, 100.0]);
//!
//! // 3-day SMA
//! let pipeline = DispersionPipeline::new(3).unwrap();
//! let report = pipeline.run(&prices).unwrap();
//!
//! println!("{} days analyzed", report.analyzed_days);
//! if let Ok(percentiles) = report.percentiles_positive() {
//!     for (rank, value) in percentiles.iter() {
//!         println!("p{rank}: {value:.2}%");
//!     }
//! }
//! ```
//!
//! ## Pipeline
//!
//! 1. **Calculate**: `dispersion = (close - sma) / sma * 100`, dropping the
//!    warm-up region, zero averages and non-finite closes
//! 2. **Split**: strictly positive and strictly negative values; exact zeros
//!    belong to neither side
//! 3. **Summarize**: linear percentiles at 5/10/25/50/75/90/97, counts,
//!    shares, extrema and a 100-bin histogram for each side
//!
//! Everything is synchronous and allocation-per-call; a pipeline can be shared
//! across threads. Fetching prices is delegated to a [`PriceSeriesProvider`].
//!
//! ## Features
//!
//! - `yahoo` (default): [`provider::YahooPriceProvider`] over the Yahoo Finance
//!   chart API

pub mod config;
pub mod dispersion;
pub mod error;
pub mod logging;
pub mod pipeline;
pub mod provider;
pub mod report_table;
pub mod splitter;
pub mod statistics;
pub mod types;

// Re-export commonly used types for convenience
pub use dispersion::{CleanDispersionSeries, DispersionCalculator, DispersionPoint};
pub use error::{DispersionError, ProviderError, Result, Side};
pub use pipeline::{AnalysisReport, DispersionPipeline, analyze, analyze_prices};
pub use provider::{CsvPriceProvider, PriceSeriesProvider};
pub use splitter::{SignedPartition, split};
pub use statistics::{
    DispersionReport, Histogram, PartitionSummary, PercentileSet, ReferenceLine,
    StatisticsSummarizer,
};
pub use types::{AnalysisRequest, LookbackPeriod, PricePoint, PriceSeries};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");
