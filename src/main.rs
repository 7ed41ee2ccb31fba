use analytics::AnalysisRecord;
use analyzer::AnalysisService;
use anyhow::Context;
use api_client::YahooClient;
use clap::{Parser, Subcommand};
use comfy_table::Table;
use configuration::settings::Settings;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// The main entry point for the Equity Lens application.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file, if there is one
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Parse command-line arguments
    let cli = Cli::parse();
    let settings = configuration::load_settings().context("Failed to load configuration")?;

    // Execute the appropriate command
    match cli.command {
        Commands::Serve(args) => handle_serve(args, settings).await,
        Commands::Analyze(args) => handle_analyze(args, settings).await,
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Financial diagnostics (Sharpe, beta, Piotroski, Altman) for listed equities.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve `GET /equity/{symbol}` over HTTP.
    Serve(ServeArgs),
    /// Analyze one symbol and print the metrics.
    Analyze(AnalyzeArgs),
}

#[derive(Parser)]
struct ServeArgs {
    /// Interface to bind, overriding `server.host`.
    #[arg(long)]
    host: Option<String>,

    /// Port to bind, overriding `server.port`.
    #[arg(long)]
    port: Option<u16>,
}

#[derive(Parser)]
struct AnalyzeArgs {
    /// The ticker symbol, exactly as the data provider spells it (e.g., "AAPL").
    #[arg(long)]
    symbol: String,

    /// Print the record as JSON instead of a table.
    #[arg(long)]
    json: bool,
}

// ==============================================================================
// Command Logic
// ==============================================================================

fn build_service(settings: &Settings) -> anyhow::Result<AnalysisService> {
    let client = YahooClient::new(&settings.market_data).context("Failed to build market data client")?;
    Ok(AnalysisService::new(Arc::new(client), settings.analysis.clone()))
}

async fn handle_serve(args: ServeArgs, mut settings: Settings) -> anyhow::Result<()> {
    if let Some(host) = args.host {
        settings.server.host = host;
    }
    if let Some(port) = args.port {
        settings.server.port = port;
    }
    let addr = settings.server.socket_addr()?;

    let service = build_service(&settings)?;
    web_server::run_server(addr, service).await
}

async fn handle_analyze(args: AnalyzeArgs, settings: Settings) -> anyhow::Result<()> {
    let service = build_service(&settings)?;
    let record = service
        .analyze(&args.symbol)
        .await
        .with_context(|| format!("Analysis of {} failed", args.symbol))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&record)?);
    } else {
        println!("{}", render_table(&args.symbol, &record));
    }
    Ok(())
}

fn render_table(symbol: &str, record: &AnalysisRecord) -> Table {
    let mut table = Table::new();
    table.set_header(vec![symbol.to_string(), "Value".to_string()]);
    table.add_row(vec!["Sharpe ratio".to_string(), format!("{:.3}", record.sharpe)]);
    table.add_row(vec!["Beta".to_string(), format!("{:.3}", record.beta)]);
    table.add_row(vec!["Piotroski F-Score".to_string(), format!("{} / 9", record.piotroski)]);
    table.add_row(vec!["Altman Z-Score".to_string(), format!("{:.3}", record.altman)]);
    table
}
