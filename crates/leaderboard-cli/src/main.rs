use clap::{ArgAction, Parser, ValueEnum};
use color_eyre::eyre::{Context, Result};
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;
use indicatif::{ProgressBar, ProgressStyle};
use leaderboard_analysis::{
    top5, ActivityAggregator, ActivityRecord, AggregationStats, TransferSignature,
};
use leaderboard_data::{from_block_for_depth, RpcClient, TransportConfig};
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, Level};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "erc20-leaderboard")]
#[command(about = "Ranks the most active ERC-20 transfer addresses over recent blocks")]
#[command(version)]
struct Cli {
    #[arg(long, short = 'v', action = ArgAction::Count)]
    verbose: u8,

    #[arg(long, short = 'q')]
    quiet: bool,

    /// JSON-RPC endpoint of an Ethereum node.
    #[arg(long, env = "RPC_URL")]
    rpc_url: String,

    /// TCP connect budget, e.g. `15s`.
    #[arg(long, env = "DIAL_TIMEOUT", default_value = "15s", value_parser = parse_duration)]
    dial_timeout: Duration,

    /// TLS handshake budget.
    #[arg(long, env = "TLS_HANDSHAKE_TIMEOUT", default_value = "15s", value_parser = parse_duration)]
    tls_handshake_timeout: Duration,

    /// Whole-request budget.
    #[arg(long, env = "HTTP_CLIENT_TIMEOUT", default_value = "15s", value_parser = parse_duration)]
    http_client_timeout: Duration,

    /// How many blocks back from the latest to scan. Negative values mean 0.
    #[arg(long, env = "DEPTH", default_value = "100", value_parser = parse_depth, allow_negative_numbers = true)]
    depth: u64,

    /// PEM bundle with extra root certificates.
    #[arg(long, env = "CA_BUNDLE")]
    ca_bundle: Option<PathBuf>,

    #[arg(long, env = "MAX_RETRIES", default_value_t = 2)]
    max_retries: u32,

    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    output: OutputFormat,
}

impl Cli {
    fn transport_config(&self) -> TransportConfig {
        TransportConfig {
            dial_timeout: self.dial_timeout,
            tls_handshake_timeout: self.tls_handshake_timeout,
            http_client_timeout: self.http_client_timeout,
            ca_bundle: self.ca_bundle.clone(),
            max_retries: self.max_retries,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    Table,
    Json,
}

/// Result of one run, as printed.
#[derive(Debug, Serialize)]
struct Leaderboard {
    latest_block: u64,
    from_block: u64,
    records: usize,
    stats: AggregationStats,
    top: Vec<ActivityRecord>,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet)?;

    let signature = TransferSignature::compute();
    let client =
        RpcClient::new(&cli.rpc_url, &cli.transport_config()).wrap_err("can't build RPC client")?;

    let leaderboard = build_leaderboard(&client, &signature, cli.depth).await?;

    match cli.output {
        OutputFormat::Table => print_table(&leaderboard),
        OutputFormat::Json => {
            let json =
                serde_json::to_string_pretty(&leaderboard).wrap_err("failed to serialize JSON")?;
            println!("{json}");
        }
    }

    Ok(())
}

fn init_tracing(verbose: u8, quiet: bool) -> Result<()> {
    let level = if quiet {
        Level::WARN
    } else {
        match verbose {
            0 => Level::INFO,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level.as_str()))
        .wrap_err("failed to initialize tracing filter")?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

async fn build_leaderboard(
    client: &RpcClient,
    signature: &TransferSignature,
    depth: u64,
) -> Result<Leaderboard> {
    let latest_block = client
        .block_number()
        .await
        .wrap_err("can't get most recent block number")?;
    info!(latest_block, "most recent block number");

    let from_block = from_block_for_depth(latest_block, depth);
    info!(from_block, depth, "fetching log records");

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner:.green} {msg}")
            .wrap_err("failed to create progress style")?,
    );
    pb.set_message(format!("eth_getLogs from block {from_block}"));
    pb.enable_steady_tick(Duration::from_millis(100));
    let records = client.get_logs(from_block, signature.hex()).await;
    pb.finish_and_clear();
    let records = records.wrap_err("can't get logs")?;
    info!(count = records.len(), "got log records");

    let tally = ActivityAggregator::new(signature)
        .ingest_all(&records)
        .wrap_err("can't rank logs")?;
    let stats = *tally.stats();
    debug!(?stats, addresses = tally.len(), "aggregation complete");

    Ok(Leaderboard {
        latest_block,
        from_block,
        records: records.len(),
        stats,
        top: top5(tally.into_records()),
    })
}

fn print_table(leaderboard: &Leaderboard) {
    info!(
        "top{} leaderboard for blocks {}..={}",
        leaderboard.top.len(),
        leaderboard.from_block,
        leaderboard.latest_block
    );

    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Rank", "Address", "Transfers"]);

    for (rank, record) in leaderboard.top.iter().enumerate() {
        table.add_row(vec![
            (rank + 1).to_string(),
            record.address.to_string(),
            record.activity.to_string(),
        ]);
    }

    println!("{table}");
}

fn parse_duration(value: &str) -> std::result::Result<Duration, String> {
    humantime::parse_duration(value.trim()).map_err(|e| format!("bad duration {value:?}: {e}"))
}

fn parse_depth(value: &str) -> std::result::Result<u64, String> {
    let depth: i64 = value
        .trim()
        .parse()
        .map_err(|e| format!("bad depth {value:?}: {e}"))?;
    Ok(depth.max(0) as u64)
}
