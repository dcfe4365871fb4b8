//! Dispersion report CLI
//!
//! Fetches closing prices for one symbol, computes the dispersion from its
//! simple moving average and prints percentile and count tables (or JSON).

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use dispersion::config::{AppConfig, LogFormat, ProviderKind};
use dispersion::logging::init_logging;
use dispersion::pipeline::{AnalysisReport, analyze};
use dispersion::report_table;
use dispersion::{AnalysisRequest, CsvPriceProvider, LookbackPeriod};

#[derive(Debug, Parser)]
#[command(name = "dispersion-report", version, about = "Distribution of price dispersion from its SMA")]
struct Cli {
    /// Ticker symbol
    #[arg(short, long, env = "DISPERSION_SYMBOL")]
    symbol: Option<String>,

    /// Lookback period: 1y, 5y, 10y or max
    #[arg(short, long, env = "DISPERSION_PERIOD")]
    period: Option<LookbackPeriod>,

    /// Moving-average window in days
    #[arg(short, long, env = "DISPERSION_WINDOW", value_parser = clap::value_parser!(u16).range(5..=100))]
    window: Option<u16>,

    /// Read prices from a CSV file instead of the network (`{symbol}` is substituted)
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Configuration file (defaults to ./dispersion.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,

    /// Log output format
    #[arg(long, value_parser = ["pretty", "json"])]
    log_format: Option<String>,
}

impl Cli {
    /// Overlay command-line flags on the loaded configuration
    fn apply(&self, mut config: AppConfig) -> dispersion::Result<AppConfig> {
        if let Some(symbol) = &self.symbol {
            config.symbol = symbol.clone();
        }
        if let Some(period) = self.period {
            config.period = period;
        }
        if let Some(window) = self.window {
            config.window = usize::from(window);
        }
        if let Some(path) = &self.csv {
            config.provider = ProviderKind::Csv;
            config.csv_path = Some(path.clone());
        }
        match self.log_format.as_deref() {
            Some("json") => config.log.format = LogFormat::Json,
            Some("pretty") => config.log.format = LogFormat::Pretty,
            _ => {}
        }
        config.validate()?;
        Ok(config)
    }
}

async fn run_analysis(config: &AppConfig, request: &AnalysisRequest) -> Result<AnalysisReport> {
    let analysis = match config.provider {
        ProviderKind::Csv => {
            let path = config
                .csv_path
                .clone()
                .context("csv provider selected without a csv_path")?;
            analyze(&CsvPriceProvider::new(path), request).await?
        }
        #[cfg(feature = "yahoo")]
        ProviderKind::Yahoo => {
            let provider = dispersion::provider::YahooPriceProvider::new(&config.yahoo)?;
            analyze(&provider, request).await?
        }
        #[cfg(not(feature = "yahoo"))]
        ProviderKind::Yahoo => {
            anyhow::bail!("yahoo provider not compiled (yahoo feature disabled); use --csv")
        }
    };
    Ok(analysis)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    let config = cli.apply(config).context("Invalid parameters")?;
    init_logging(&config.log);

    let request = config.request()?;
    let analysis = run_analysis(&config, &request).await.with_context(|| {
        format!(
            "Dispersion analysis failed for {} ({})",
            request.symbol(),
            request.period()
        )
    })?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&analysis)?);
    } else {
        print!("{}", report_table::render(&analysis));
    }
    Ok(())
}
