//! Yahoo Finance chart API provider
//!
//! Requests daily bars for a symbol over one of the chart API's named ranges
//! (`1y`, `5y`, `10y`, `max`) and keeps the closing prices. Bars without a
//! close are skipped.

use std::time::Duration;

use chrono::DateTime;
use serde::Deserialize;
use tracing::{debug, instrument};

use super::PriceSeriesProvider;
use crate::config::YahooSettings;
use crate::error::ProviderError;
use crate::types::{LookbackPeriod, PricePoint, PriceSeries};

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartBody,
}

#[derive(Debug, Deserialize)]
struct ChartBody {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteData>,
}

#[derive(Debug, Deserialize)]
struct QuoteData {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

/// Parse a chart API response body into a close series
pub fn parse_chart(symbol: &str, body: &str) -> Result<PriceSeries, ProviderError> {
    let response: ChartResponse = serde_json::from_str(body).map_err(|e| ProviderError::Parse {
        message: e.to_string(),
    })?;

    if let Some(error) = response.chart.error {
        return Err(if error.code == "Not Found" {
            ProviderError::SymbolNotFound {
                symbol: symbol.to_string(),
            }
        } else {
            ProviderError::Network {
                message: format!("API error [{}]: {}", error.code, error.description),
            }
        });
    }

    let no_data = || ProviderError::NoData {
        symbol: symbol.to_string(),
    };
    let results = response.chart.result.ok_or_else(no_data)?;
    let data = results.first().ok_or_else(no_data)?;
    let quote = data.indicators.quote.first().ok_or_else(no_data)?;

    let mut points = Vec::with_capacity(data.timestamp.len());
    for (i, &secs) in data.timestamp.iter().enumerate() {
        let Some(close) = quote.close.get(i).copied().flatten() else {
            continue;
        };
        let timestamp = DateTime::from_timestamp(secs, 0).ok_or_else(|| ProviderError::Parse {
            message: format!("Invalid timestamp: {secs}"),
        })?;
        points.push(PricePoint::new(timestamp, close));
    }

    if points.is_empty() {
        return Err(no_data());
    }
    Ok(PriceSeries::new(points))
}

/// HTTP client for the chart endpoint
#[derive(Debug, Clone)]
pub struct YahooPriceProvider {
    client: reqwest::Client,
    base_url: String,
}

impl YahooPriceProvider {
    pub fn new(settings: &YahooSettings) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .user_agent(settings.user_agent.as_str())
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Chart URL for `symbol`, without query parameters
    pub fn chart_url(&self, symbol: &str) -> String {
        format!("{}/{}", self.base_url, symbol)
    }
}

impl PriceSeriesProvider for YahooPriceProvider {
    #[instrument(skip(self))]
    async fn fetch(
        &self,
        symbol: &str,
        period: LookbackPeriod,
    ) -> Result<PriceSeries, ProviderError> {
        let response = self
            .client
            .get(self.chart_url(symbol))
            .query(&[("range", period.as_str()), ("interval", "1d")])
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ProviderError::SymbolNotFound {
                symbol: symbol.to_string(),
            });
        }
        let body = response.text().await?;
        if !status.is_success() {
            // Error bodies still carry the chart error object when there is one
            return match parse_chart(symbol, &body) {
                Err(err @ ProviderError::SymbolNotFound { .. }) => Err(err),
                _ => Err(ProviderError::Network {
                    message: format!("HTTP {status} from chart API"),
                }),
            };
        }

        let series = parse_chart(symbol, &body)?;
        debug!(rows = series.len(), "Fetched Yahoo price series");
        Ok(series)
    }
}
