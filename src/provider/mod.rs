//! Price series providers
//!
//! A provider turns a symbol and a lookback period into a time-ordered
//! [`PriceSeries`], or an explicit [`ProviderError`]. It never hands back a
//! partially populated series with missing closes silently set to zero.
//!
//! - [`CsvPriceProvider`]: local `Date,Close` files
//! - [`YahooPriceProvider`]: Yahoo Finance chart API (`yahoo` feature)

use std::future::Future;

use crate::error::ProviderError;
use crate::types::{LookbackPeriod, PriceSeries};

pub mod csv_file;
#[cfg(feature = "yahoo")]
pub mod yahoo;

pub use csv_file::CsvPriceProvider;
#[cfg(feature = "yahoo")]
pub use yahoo::YahooPriceProvider;

/// Source of closing prices for the dispersion pipeline
pub trait PriceSeriesProvider {
    /// Fetch closes for `symbol` covering `period`, oldest first
    fn fetch(
        &self,
        symbol: &str,
        period: LookbackPeriod,
    ) -> impl Future<Output = Result<PriceSeries, ProviderError>> + Send;
}
