//! TrendSignal CLI: analyze one bar window and print the signal report.
//!
//! Commands:
//! - `analyze` reads a JSON request or a CSV bar table and prints the report
//! - `variants` lists the signal variants and the history each one needs

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde_json::Value;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use trendsignal_core::{
    AnalysisOutcome, EngineConfig, RawRecord, SignalEngine, SignalRequest, Variant,
};

#[derive(Parser)]
#[command(
    name = "trendsignal",
    about = "TrendSignal CLI: trend classification for a window of price bars"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum InputFormat {
    /// A request document: `{"symbol", "timeframe", "values": [...]}`.
    Json,
    /// A header row plus one bar per line, newest first.
    Csv,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze one bar window and print the report as JSON.
    Analyze {
        /// Input file, or `-` for stdin.
        #[arg(long, default_value = "-")]
        input: String,

        /// Input format.
        #[arg(long, value_enum, default_value_t = InputFormat::Json)]
        format: InputFormat,

        /// Symbol label (required for CSV; overrides the JSON field).
        #[arg(long)]
        symbol: Option<String>,

        /// Timeframe label (required for CSV; overrides the JSON field).
        #[arg(long)]
        timeframe: Option<String>,

        /// Signal variant: ema_cross, ema_cross_confirmed, pullback, sma_trend.
        #[arg(long)]
        variant: Option<Variant>,

        /// Moving-average window.
        #[arg(long)]
        window: Option<usize>,

        /// Path to a TOML engine config.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Pretty-print the JSON output.
        #[arg(long, default_value_t = false)]
        pretty: bool,
    },
    /// List signal variants with their minimum history.
    Variants {
        /// Path to a TOML engine config (minimums depend on its window).
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "trendsignal=info".into()),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            input,
            format,
            symbol,
            timeframe,
            variant,
            window,
            config,
            pretty,
        } => {
            let config = resolve_config(config.as_deref(), variant, window)?;
            let request = load_request(&input, format, symbol, timeframe)?;
            let failed = run_analyze(&request, config, pretty)?;
            if failed {
                std::process::exit(1);
            }
            Ok(())
        }
        Commands::Variants { config } => {
            let config = resolve_config(config.as_deref(), None, None)?;
            print_variants(&config);
            Ok(())
        }
    }
}

/// Defaults, then the TOML file, then command-line flags.
fn resolve_config(
    path: Option<&Path>,
    variant: Option<Variant>,
    window: Option<usize>,
) -> Result<EngineConfig> {
    let mut config = match path {
        Some(path) => EngineConfig::from_toml_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => EngineConfig::default(),
    };

    if let Some(variant) = variant {
        config.variant = variant;
    }
    if let Some(window) = window {
        config.window = window;
    }

    config.validate().context("invalid engine configuration")?;
    debug!(?config, "engine config resolved");
    Ok(config)
}

fn read_input(input: &str) -> Result<String> {
    let mut text = String::new();
    if input == "-" {
        io::stdin()
            .read_to_string(&mut text)
            .context("reading stdin")?;
    } else {
        text = std::fs::read_to_string(input).with_context(|| format!("reading {input}"))?;
    }
    Ok(text)
}

fn load_request(
    input: &str,
    format: InputFormat,
    symbol: Option<String>,
    timeframe: Option<String>,
) -> Result<SignalRequest> {
    let text = read_input(input)?;

    let mut request = match format {
        InputFormat::Json => {
            serde_json::from_str::<SignalRequest>(&text).context("parsing JSON request")?
        }
        InputFormat::Csv => {
            let symbol = symbol.clone().context("--symbol is required for CSV input")?;
            let timeframe = timeframe
                .clone()
                .context("--timeframe is required for CSV input")?;
            SignalRequest::new(symbol, timeframe, parse_csv(&text)?)
        }
    };

    if let Some(symbol) = symbol {
        request.symbol = symbol;
    }
    if let Some(timeframe) = timeframe {
        request.timeframe = timeframe;
    }

    info!(
        symbol = %request.symbol,
        timeframe = %request.timeframe,
        records = request.values.len(),
        "request loaded"
    );
    Ok(request)
}

/// One record per CSV row, keyed by the header.
///
/// Cells stay strings so the engine coerces them like any other payload.
/// Empty cells are left out so they surface as missing fields.
fn parse_csv(text: &str) -> Result<Vec<RawRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());
    let headers = reader.headers().context("reading CSV header")?.clone();

    let mut records = Vec::new();
    for (line, row) in reader.records().enumerate() {
        let row = row.with_context(|| format!("reading CSV row {}", line + 1))?;
        let record: RawRecord = headers
            .iter()
            .zip(row.iter())
            .filter(|(_, cell)| !cell.is_empty())
            .map(|(key, cell)| (key.to_string(), Value::String(cell.to_string())))
            .collect();
        records.push(record);
    }
    Ok(records)
}

/// Print the outcome; returns true when it is an error record.
fn run_analyze(request: &SignalRequest, config: EngineConfig, pretty: bool) -> Result<bool> {
    let engine = SignalEngine::new(config)?;
    let outcome = engine.respond(request);

    let json = if pretty {
        serde_json::to_string_pretty(&outcome)?
    } else {
        serde_json::to_string(&outcome)?
    };
    println!("{json}");

    if let AnalysisOutcome::Report(report) = &outcome {
        info!(symbol = %report.symbol, signal = %report.signal, "analysis complete");
    }
    Ok(outcome.is_failed())
}

fn print_variants(config: &EngineConfig) {
    println!("{:<22} {:<8} {:>9}", "VARIANT", "AVERAGE", "MIN BARS");
    for variant in Variant::ALL {
        println!(
            "{:<22} {:<8} {:>9}",
            variant.name(),
            variant.ma_kind().to_string(),
            variant.min_bars(config)
        );
    }
}
