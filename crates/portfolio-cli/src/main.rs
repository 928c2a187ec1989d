//! Command-line interface for folio-rs
//!
//! ```bash
//! portfolio-cli holdings add AAPL 10 150
//! portfolio-cli holdings add 600519 100 1500
//! portfolio-cli overview
//! portfolio-cli analyze --period weekly --days 730 --json
//! portfolio-cli analyze --prices demos/prices.json
//! ```

mod output;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use portfolio_analytics::Period;
use portfolio_service::{
    HistoryProvider, JsonFileHoldingsStore, PortfolioConfig, PortfolioError, PortfolioService,
    StaticHistoryProvider, YahooHistoryProvider,
};
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::info;

use crate::output::ErrorPayload;

#[derive(Parser, Debug)]
#[command(name = "portfolio-cli")]
#[command(about = "Track holdings and analyze portfolio performance", long_about = None)]
struct Cli {
    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    /// Holdings file
    #[arg(long, global = true, default_value = "portfolio.json")]
    store: PathBuf,

    /// Owner whose holdings are used
    #[arg(long, global = true, default_value = "anonymous")]
    owner: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Manage holdings
    Holdings {
        #[command(subcommand)]
        action: HoldingsAction,
    },
    /// Value holdings at the latest prices and consolidate into USD
    Overview {
        #[command(flatten)]
        source: PriceSource,
    },
    /// Compute return, risk and correlation statistics
    Analyze {
        #[command(flatten)]
        source: PriceSource,

        /// Bar granularity: daily, weekly or monthly
        #[arg(long)]
        period: Option<Period>,

        /// History window in calendar days (widened x1.25 weekly, x5 monthly)
        #[arg(long)]
        days: Option<u32>,
    },
}

#[derive(Subcommand, Debug)]
enum HoldingsAction {
    /// List holdings
    List {
        #[arg(long)]
        json: bool,
    },
    /// Add a holding
    Add(HoldingArgs),
    /// Replace the quantity and cost of a holding
    Update(HoldingArgs),
    /// Remove a holding
    Remove { symbol: String },
}

#[derive(Args, Debug)]
struct HoldingArgs {
    symbol: String,
    #[arg(allow_hyphen_values = true)]
    quantity: String,
    #[arg(allow_hyphen_values = true)]
    cost: String,
}

#[derive(Args, Debug)]
struct PriceSource {
    /// Read prices from a JSON file instead of Yahoo Finance
    #[arg(long)]
    prices: Option<PathBuf>,

    /// Print the JSON payload instead of tables
    #[arg(long)]
    json: bool,
}

impl PriceSource {
    async fn provider(&self, config: &PortfolioConfig) -> anyhow::Result<Arc<dyn HistoryProvider>> {
        let provider: Arc<dyn HistoryProvider> = match &self.prices {
            Some(path) => Arc::new(
                StaticHistoryProvider::from_json_file(path)
                    .await
                    .with_context(|| format!("Failed to load prices from {}", path.display()))?,
            ),
            None => Arc::new(YahooHistoryProvider::new(config)),
        };
        Ok(provider)
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Report a service failure with its kind; JSON mode prints the structured payload
fn report_failure(err: &PortfolioError, json: bool) -> anyhow::Result<ExitCode> {
    let payload = ErrorPayload::from(err);
    if json {
        print_json(&payload)?;
    } else {
        eprintln!("Error ({:?}): {}", payload.kind, payload.message);
        for failure in &payload.dropped {
            eprintln!("  dropped {}: {}", failure.symbol, failure.reason);
        }
    }
    Ok(ExitCode::FAILURE)
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let mut builder = PortfolioConfig::builder().with_env()?;
    if let Commands::Analyze { period, days, .. } = &cli.command {
        if let Some(period) = period {
            builder = builder.period(*period);
        }
        if let Some(days) = days {
            builder = builder.history_days(*days);
        }
    }
    let config = Arc::new(builder.build()?);
    let store = Arc::new(JsonFileHoldingsStore::new(&cli.store));
    let owner = cli.owner.as_str();

    match &cli.command {
        Commands::Holdings { action } => {
            let service = PortfolioService::new(
                config.clone(),
                Arc::new(StaticHistoryProvider::new()),
                store,
            );
            let result = match action {
                HoldingsAction::List { json } => {
                    let holdings = service.holdings(owner).await?;
                    if *json {
                        print_json(&holdings)?;
                    } else {
                        println!("{}", output::holdings_table(&holdings));
                    }
                    return Ok(ExitCode::SUCCESS);
                }
                HoldingsAction::Add(args) => {
                    service
                        .add_holding(owner, &args.symbol, &args.quantity, &args.cost)
                        .await
                }
                HoldingsAction::Update(args) => {
                    service
                        .update_holding(owner, &args.symbol, &args.quantity, &args.cost)
                        .await
                }
                HoldingsAction::Remove { symbol } => {
                    if service.remove_holding(owner, symbol).await? {
                        println!("Removed {}", symbol.trim().to_uppercase());
                    } else {
                        println!("No holding for {}", symbol.trim().to_uppercase());
                    }
                    return Ok(ExitCode::SUCCESS);
                }
            };
            match result {
                Ok(holding) => {
                    println!(
                        "Saved {} x{} @ {}",
                        holding.symbol, holding.shares, holding.cost_basis
                    );
                    Ok(ExitCode::SUCCESS)
                }
                Err(e) => report_failure(&e, false),
            }
        }
        Commands::Overview { source } => {
            let provider = source.provider(&config).await?;
            let service = PortfolioService::new(config.clone(), provider, store);
            let overview = match service.overview(owner).await {
                Ok(overview) => overview,
                Err(e) => return report_failure(&e, source.json),
            };
            if source.json {
                print_json(&overview)?;
            } else {
                let (holdings, totals) = output::overview_tables(&overview);
                println!("{holdings}\n{totals}");
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::Analyze { source, .. } => {
            let provider = source.provider(&config).await?;
            let service = PortfolioService::new(config.clone(), provider, store);
            let analysis = match service.analyze(owner).await {
                Ok(analysis) => analysis,
                Err(e) => return report_failure(&e, source.json),
            };
            let report = analysis.report();
            if source.json {
                print_json(&report)?;
            } else {
                let (metrics, correlation) = output::analysis_tables(&report);
                println!(
                    "Period: {} (history window {} days)\n{metrics}\n{correlation}",
                    analysis.period,
                    analysis.period.lookback_days(config.history_days)
                );
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    if cli.log_json {
        portfolio_utils::init_tracing_json();
    } else {
        portfolio_utils::init_tracing();
    }

    info!(owner = %cli.owner, store = %cli.store.display(), "Starting portfolio-cli");
    run(cli).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_analyze() {
        let cli = Cli::try_parse_from([
            "portfolio-cli",
            "--owner",
            "alice",
            "analyze",
            "--period",
            "weekly",
            "--days",
            "730",
            "--json",
        ])
        .unwrap();

        assert_eq!(cli.owner, "alice");
        match cli.command {
            Commands::Analyze {
                source,
                period,
                days,
            } => {
                assert_eq!(period, Some(Period::Weekly));
                assert_eq!(days, Some(730));
                assert!(source.json);
                assert!(source.prices.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_holding_with_negative_quantity() {
        let cli = Cli::try_parse_from(["portfolio-cli", "holdings", "add", "AAPL", "-1", "150"])
            .unwrap();
        match cli.command {
            Commands::Holdings {
                action: HoldingsAction::Add(args),
            } => assert_eq!(args.quantity, "-1"),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_rejects_unknown_period() {
        assert!(Cli::try_parse_from(["portfolio-cli", "analyze", "--period", "hourly"]).is_err());
    }

    #[tokio::test]
    async fn test_holdings_round_trip_through_store_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = dir.path().join("portfolio.json");
        let store_arg = store.to_str().unwrap();

        let add = Cli::try_parse_from([
            "portfolio-cli", "--store", store_arg, "holdings", "add", "aapl", "10", "150",
        ])
        .unwrap();
        assert_eq!(run(add).await.unwrap(), ExitCode::SUCCESS);

        let bad = Cli::try_parse_from([
            "portfolio-cli", "--store", store_arg, "holdings", "add", "MSFT", "1.5", "10",
        ])
        .unwrap();
        assert_eq!(run(bad).await.unwrap(), ExitCode::FAILURE);

        let holdings = JsonFileHoldingsStore::new(&store);
        let listed = portfolio_service::HoldingsStore::list(&holdings, "anonymous")
            .await
            .unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].symbol, "AAPL");
    }
}
