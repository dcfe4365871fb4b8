//! Layered application configuration
//!
//! Sources, lowest precedence first:
//! 1. built-in defaults
//! 2. an optional TOML/YAML/JSON file (`dispersion.toml` unless overridden)
//! 3. `DISPERSION_*` environment variables, `__` separating nested keys
//!    (`DISPERSION_YAHOO__TIMEOUT_SECS=10`)
//!
//! Command-line flags are applied on top by the binary.

use std::path::{Path, PathBuf};

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::error::{DispersionError, Result};
use crate::types::{AnalysisRequest, LookbackPeriod};

/// Default config file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "dispersion.toml";

/// Moving-average windows accepted from users
pub const WINDOW_RANGE: std::ops::RangeInclusive<usize> = 5..=100;

pub const DEFAULT_SYMBOL: &str = "AAPL";
pub const DEFAULT_WINDOW: usize = 21;

/// `DISPERSION_*` variables; `__` descends into nested tables
pub fn environment() -> Environment {
    Environment::with_prefix("DISPERSION")
        .prefix_separator("_")
        .separator("__")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[default]
    Yahoo,
    Csv,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct YahooSettings {
    pub base_url: String,
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for YahooSettings {
    fn default() -> Self {
        Self {
            base_url: "https://query1.finance.yahoo.com/v8/finance/chart".to_string(),
            timeout_secs: 30,
            user_agent: concat!("dispersion/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    /// `EnvFilter` directive used when `RUST_LOG` is unset
    pub filter: String,
    pub format: LogFormat,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub symbol: String,
    pub period: LookbackPeriod,
    pub window: usize,
    pub provider: ProviderKind,
    /// CSV source; may contain a `{symbol}` placeholder
    pub csv_path: Option<PathBuf>,
    pub yahoo: YahooSettings,
    pub log: LogSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            symbol: DEFAULT_SYMBOL.to_string(),
            period: LookbackPeriod::default(),
            window: DEFAULT_WINDOW,
            provider: ProviderKind::default(),
            csv_path: None,
            yahoo: YahooSettings::default(),
            log: LogSettings::default(),
        }
    }
}

impl AppConfig {
    /// Load defaults, then `path` (or the default file if present), then env
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(path) => File::from(path).required(true),
            None => File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };
        Self::from_builder(
            Config::builder()
                .add_source(file)
                .add_source(environment()),
        )
    }

    /// Build from explicit sources on top of the defaults
    pub fn from_builder(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<Self> {
        let config: AppConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Enforce the user-facing parameter ranges
    pub fn validate(&self) -> Result<()> {
        if self.symbol.trim().is_empty() {
            return Err(DispersionError::InvalidParameter {
                name: "symbol",
                reason: "symbol must not be empty".to_string(),
            });
        }
        if !WINDOW_RANGE.contains(&self.window) {
            return Err(DispersionError::InvalidParameter {
                name: "window",
                reason: format!(
                    "window must be within {}..={}, got {}",
                    WINDOW_RANGE.start(),
                    WINDOW_RANGE.end(),
                    self.window
                ),
            });
        }
        if self.provider == ProviderKind::Csv && self.csv_path.is_none() {
            return Err(DispersionError::InvalidParameter {
                name: "csv_path",
                reason: "csv provider selected without a csv_path".to_string(),
            });
        }
        Ok(())
    }

    pub fn request(&self) -> Result<AnalysisRequest> {
        AnalysisRequest::new(&self.symbol, self.period, self.window)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    fn from_toml(toml: &str) -> Result<AppConfig> {
        AppConfig::from_builder(
            Config::builder().add_source(File::from_str(toml, FileFormat::Toml)),
        )
    }

    #[test]
    fn test_defaults() {
        let config = from_toml("").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.symbol, "AAPL");
        assert_eq!(config.period, LookbackPeriod::TenYears);
        assert_eq!(config.window, 21);
    }

    #[test]
    fn test_file_overrides() {
        let config = from_toml(
            r#"
            symbol = "MSFT"
            period = "5y"
            window = 50
            provider = "csv"
            csv_path = "data/{symbol}.csv"

            [yahoo]
            timeout_secs = 5

            [log]
            format = "json"
            "#,
        )
        .unwrap();

        assert_eq!(config.symbol, "MSFT");
        assert_eq!(config.period, LookbackPeriod::FiveYears);
        assert_eq!(config.window, 50);
        assert_eq!(config.provider, ProviderKind::Csv);
        assert_eq!(config.yahoo.timeout_secs, 5);
        assert_eq!(config.yahoo.base_url, YahooSettings::default().base_url);
        assert_eq!(config.log.format, LogFormat::Json);
        assert_eq!(config.log.filter, "info");
    }

    #[test]
    fn test_environment_overrides_file() {
        let vars: config::Map<String, String> = [
            ("DISPERSION_YAHOO__TIMEOUT_SECS", "10"),
            ("DISPERSION_PROVIDER", "csv"),
            ("DISPERSION_CSV_PATH", "x.csv"),
            ("DISPERSION_LOG__FORMAT", "json"),
            ("OTHER_WINDOW", "7"),
        ]
        .into_iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect();

        let config = AppConfig::from_builder(
            Config::builder()
                .add_source(File::from_str("window = 30", FileFormat::Toml))
                .add_source(environment().source(Some(vars))),
        )
        .unwrap();

        assert_eq!(config.yahoo.timeout_secs, 10);
        assert_eq!(config.provider, ProviderKind::Csv);
        assert_eq!(config.csv_path, Some(PathBuf::from("x.csv")));
        assert_eq!(config.log.format, LogFormat::Json);
        assert_eq!(config.window, 30);
    }

    #[test]
    fn test_window_out_of_range() {
        let err = from_toml("window = 3").unwrap_err();
        assert!(matches!(
            err,
            DispersionError::InvalidParameter { name: "window", .. }
        ));
        assert!(from_toml("window = 101").is_err());
        assert!(from_toml("window = 100").is_ok());
    }

    #[test]
    fn test_bad_period_is_config_error() {
        let err = from_toml(r#"period = "3m""#).unwrap_err();
        assert!(matches!(err, DispersionError::Config { .. }));
    }

    #[test]
    fn test_csv_provider_needs_path() {
        assert!(from_toml(r#"provider = "csv""#).is_err());
    }

    #[test]
    fn test_request_from_config() {
        let request = AppConfig::default().request().unwrap();
        assert_eq!(request.symbol(), "AAPL");
        assert_eq!(request.window(), DEFAULT_WINDOW);
    }
}
