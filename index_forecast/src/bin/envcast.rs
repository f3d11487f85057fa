//! # envcast
//!
//! Command-line front end for index forecasting.

use clap::{Parser, Subcommand};
use index_forecast::{CsvStore, ForecastConfig, ForecastError, IndexName, Orchestrator};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "envcast")]
#[command(about = "Environmental index forecasting CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Forecast the next months of every index (or one index) from a CSV dataset
    Forecast {
        /// Dataset with date, NDVI, NDWI, NDBI and LST columns
        #[arg(short, long)]
        input: PathBuf,

        /// Forecast a single index (ndvi, ndwi, ndbi, lst)
        #[arg(long)]
        index: Option<IndexName>,

        /// JSON configuration overriding the defaults
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "envcast=info,index_forecast=info".into()),
        )
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Forecast {
            input,
            index,
            config,
            pretty,
        } => run_forecast(input, index, config, pretty),
    };

    match result {
        Ok(output) => {
            println!("{}", output);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run_forecast(
    input: PathBuf,
    index: Option<IndexName>,
    config: Option<PathBuf>,
    pretty: bool,
) -> Result<String, ForecastError> {
    let config = match config {
        Some(path) => ForecastConfig::from_json_file(path)?,
        None => ForecastConfig::default(),
    };
    let store = CsvStore::new(input);
    let orchestrator = Orchestrator::new(config);

    let value = match index {
        Some(index) => serde_json::to_value(orchestrator.forecast_index(&store, index)?)?,
        None => serde_json::to_value(orchestrator.run(&store)?)?,
    };
    let output = if pretty {
        serde_json::to_string_pretty(&value)?
    } else {
        serde_json::to_string(&value)?
    };
    Ok(output)
}
