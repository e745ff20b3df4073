//! Command-line interface for xtrade
//!
//! # Usage
//!
//! ```bash
//! # Top 5 Indian picks as a table
//! xtrade suggest --market India --mode both --count 5
//!
//! # JSON request payload on stdin, JSON response on stdout
//! echo '{"market": "USA", "analysisMode": "technical"}' | xtrade request
//!
//! # Menu-driven session
//! xtrade interactive
//! ```
//!
//! Live data comes from Yahoo Finance, plus Alpha Vantage when
//! `ALPHA_VANTAGE_API_KEY` is set. LLM ranking is enabled by `OPENAI_MODEL`.

mod menu;

use clap::{Args, Parser, Subcommand};
use std::io::{self, BufRead};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{debug, info};
use xtrade_stock::interface::{default_file_name, error_response};
use xtrade_stock::{
    AnalysisMode, FormatterFactory, Market, OutputFormat, StockConfig, StockError,
    SuggestionEngine, SuggestionRequest, SuggestionResult, Symbol, resolve_universe,
};
use xtrade_utils::{Config, LogFormat};

/// Exit status for a request payload that cannot be served
const EXIT_BAD_REQUEST: u8 = 2;

#[derive(Parser, Debug)]
#[command(name = "xtrade")]
#[command(about = "Stock suggestions for India, USA and Australia", long_about = None)]
#[command(version)]
struct Cli {
    /// Log output format (pretty or json); defaults to XTRADE_LOG_FORMAT
    #[arg(long, global = true)]
    log_format: Option<LogFormat>,

    /// More log output (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Suggest stocks for a market
    Suggest {
        /// Market selector (India, USA, Australia)
        #[arg(short, long, default_value = "India")]
        market: String,

        /// Analysis mode (technical, fundamental, both)
        #[arg(long, default_value = "both")]
        mode: AnalysisMode,

        /// Number of stocks, clamped to 1..=20
        #[arg(short, long, default_value_t = 10, allow_negative_numbers = true)]
        count: i64,

        /// Output format (table, json, csv)
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,

        /// Write the output to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        engine: EngineArgs,
    },

    /// Serve a JSON request payload read from FILE or stdin
    Request {
        file: Option<PathBuf>,

        #[command(flatten)]
        engine: EngineArgs,
    },

    /// List supported markets and their universes
    Markets,

    /// Menu-driven session
    Interactive {
        #[command(flatten)]
        engine: EngineArgs,
    },
}

#[derive(Args, Debug, Clone, Copy)]
struct EngineArgs {
    /// Skip live sources and use synthetic values only
    #[arg(long)]
    offline: bool,

    /// Never substitute synthetic values for failed lookups
    #[arg(long, conflicts_with = "offline")]
    live_only: bool,

    /// Keep registry order even when OPENAI_MODEL is set
    #[arg(long)]
    no_rank: bool,
}

impl EngineArgs {
    fn build_engine(self) -> anyhow::Result<SuggestionEngine> {
        let mut builder = StockConfig::builder()
            .with_env_api_key()
            .offline(self.offline)
            .synthetic_fallback(!self.live_only);
        if !self.no_rank {
            builder = builder.with_env_ranking();
        }

        let config = builder.build()?;
        let engine = SuggestionEngine::from_config(&config)?;
        debug!(
            sources = ?engine.router().source_names(),
            ranker = engine.ranker_name().unwrap_or("none"),
            "Engine ready"
        );
        Ok(engine)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    let app = Config::from_env();

    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    xtrade_utils::init_tracing_with(cli.log_format.unwrap_or(app.log_format), filter);

    info!(environment = %app.environment, "Starting {}", app.app_name);

    match cli.command {
        Command::Suggest {
            market,
            mode,
            count,
            format,
            output,
            engine,
        } => {
            let engine = engine.build_engine()?;
            let result = engine
                .suggest(&SuggestionRequest::new(market, mode, count))
                .await;
            emit(&result, format, output.as_deref()).await?;
        }
        Command::Request { file, engine } => {
            let payload = match file {
                Some(path) => tokio::fs::read_to_string(&path).await?,
                None => io::read_to_string(io::stdin())?,
            };
            let engine = engine.build_engine()?;
            return serve_payload(&engine, &payload).await;
        }
        Command::Markets => print_markets(),
        Command::Interactive { engine } => {
            let engine = engine.build_engine()?;
            run_interactive(&engine, &mut io::stdin().lock()).await?;
        }
    }

    Ok(ExitCode::SUCCESS)
}

async fn serve_payload(engine: &SuggestionEngine, payload: &str) -> anyhow::Result<ExitCode> {
    match engine.suggest_payload(payload).await {
        Ok(result) => {
            println!("{}", serde_json::to_string_pretty(&result)?);
            Ok(ExitCode::SUCCESS)
        }
        Err(e @ StockError::BadRequest(_)) => {
            eprintln!("Request rejected: {e}");
            println!("{}", error_response(&e));
            Ok(ExitCode::from(EXIT_BAD_REQUEST))
        }
        Err(e) => Err(e.into()),
    }
}

async fn emit(
    result: &SuggestionResult,
    format: OutputFormat,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    let rendered = FormatterFactory::create(format).render(result)?;
    match output {
        Some(path) => {
            tokio::fs::write(path, rendered).await?;
            println!("Saved {} record(s) to {}", result.len(), path.display());
        }
        None => println!("{rendered}"),
    }
    Ok(())
}

fn print_markets() {
    for market in Market::ALL {
        let symbols: Vec<&str> = resolve_universe(market.name())
            .iter()
            .map(Symbol::as_str)
            .collect();
        println!("{} [{}]", market.label(), market.exchange());
        println!("  {}", symbols.join(", "));
    }
}

async fn run_interactive(engine: &SuggestionEngine, input: &mut impl BufRead) -> anyhow::Result<()> {
    menu::print_banner();

    loop {
        let Some(market) = menu::prompt_until(input, &menu::market_menu(), menu::parse_market)?
        else {
            break;
        };
        let Some(mode) = menu::prompt_until(input, &menu::mode_menu(), menu::parse_mode)? else {
            break;
        };
        let Some(count) =
            menu::prompt_until(input, "How many stocks? [10]: ", menu::parse_count)?
        else {
            break;
        };

        println!("\nFetching {count} {} picks for {market}...", mode.describe());
        let result = engine
            .suggest(&SuggestionRequest::new(market.name(), mode, count))
            .await;
        emit(&result, OutputFormat::Table, None).await?;

        if !result.is_empty() {
            let path = PathBuf::from(default_file_name(&result.market, OutputFormat::Csv));
            emit(&result, OutputFormat::Csv, Some(&path)).await?;
        }

        let again = menu::prompt_until(input, "\nAnother search? [y/N]: ", |answer| {
            Some(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
        })?;
        if again != Some(true) {
            break;
        }
        println!();
    }

    println!("Goodbye!");
    Ok(())
}
