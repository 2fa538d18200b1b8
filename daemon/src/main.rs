//! tally daemon — runs the synchronization core against a live endpoint and
//! renders the proposal store to the terminal.

mod logging;

use anyhow::Context;
use clap::Parser;
use logging::LogFormat;
use std::path::PathBuf;
use std::sync::Arc;
use tally_chain::{ChainConfig, EventListener, VotingContract};
use tally_sync::{EventReconciler, ProposalStore, SnapshotLoader};
use tally_types::{Address, ProposalEvent, Timestamp};
use tokio::sync::broadcast;

#[derive(Parser)]
#[command(name = "tally-daemon", about = "Voting-contract state sync daemon")]
struct Cli {
    /// HTTP JSON-RPC endpoint for reads.
    #[arg(long, env = "TALLY_HTTP_URL")]
    http_url: Option<String>,

    /// WebSocket endpoint for the log subscription.
    #[arg(long, env = "TALLY_WS_URL")]
    ws_url: Option<String>,

    /// Address of the voting contract.
    #[arg(long, env = "TALLY_CONTRACT_ADDRESS")]
    contract: Option<Address>,

    /// Address of the multicall aggregator.
    #[arg(long, env = "TALLY_MULTICALL_ADDRESS")]
    multicall: Option<Address>,

    /// Per-request timeout for HTTP reads, in seconds.
    #[arg(long, env = "TALLY_REQUEST_TIMEOUT")]
    request_timeout: Option<u64>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, default_value = "info", env = "TALLY_LOG_LEVEL")]
    log_level: String,

    /// Log format: "human" or "json".
    #[arg(long, default_value = "human", env = "TALLY_LOG_FORMAT")]
    log_format: LogFormat,

    /// Path to a TOML configuration file. If provided, file settings are
    /// used as the base; CLI flags and env vars override them.
    #[arg(long)]
    config: Option<PathBuf>,
}

/// Merge CLI/env settings over an optional config file.
fn resolve_config(cli: &Cli) -> anyhow::Result<ChainConfig> {
    if let Some(ref path) = cli.config {
        let file = ChainConfig::from_toml_file(path)
            .with_context(|| format!("loading config file {}", path.display()))?;
        tracing::info!("loaded config from {}", path.display());
        return Ok(ChainConfig {
            http_url: cli.http_url.clone().unwrap_or(file.http_url),
            ws_url: cli.ws_url.clone().unwrap_or(file.ws_url),
            contract_address: cli.contract.unwrap_or(file.contract_address),
            multicall_address: cli.multicall.unwrap_or(file.multicall_address),
            request_timeout_secs: cli.request_timeout.unwrap_or(file.request_timeout_secs),
        });
    }

    Ok(ChainConfig {
        http_url: cli
            .http_url
            .clone()
            .unwrap_or_else(|| "http://127.0.0.1:8545".to_string()),
        ws_url: cli
            .ws_url
            .clone()
            .unwrap_or_else(|| "ws://127.0.0.1:8545".to_string()),
        contract_address: cli
            .contract
            .context("contract address required (--contract or config file)")?,
        multicall_address: cli
            .multicall
            .context("multicall address required (--multicall or config file)")?,
        request_timeout_secs: cli.request_timeout.unwrap_or(10),
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.log_format, &cli.log_level);

    let config = resolve_config(&cli)?;
    tracing::info!(
        contract = %config.contract_address,
        rpc = %config.http_url,
        ws = %config.ws_url,
        "starting tally daemon",
    );

    let store = Arc::new(ProposalStore::new());
    let contract = VotingContract::new(&config);
    let loader = SnapshotLoader::new(Arc::new(contract), Arc::clone(&store));

    // Open the subscription before the bootstrap read so no event can fall
    // between the snapshot block and the first delivered log; the overlap is
    // safe because creation events deduplicate by id.
    let listener = EventListener::new(config.ws_url.clone(), config.contract_address);
    let mut reconciler = EventReconciler::new(Arc::clone(&store));
    reconciler.attach(listener.subscribe());

    let mut display_rx = listener.subscribe();
    let mut listener_task = tokio::spawn(async move { listener.run().await });

    match loader.load().await {
        Ok(outcome) => {
            tracing::info!(?outcome, "bootstrap complete");
            render_snapshot(&store);
        }
        // Keep running on the event stream alone; the operator can restart
        // to retry the snapshot.
        Err(e) => tracing::error!("snapshot load failed: {e}"),
    }

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("received SIGINT, shutting down");
                break;
            }
            result = &mut listener_task => {
                match result {
                    Ok(Ok(())) => tracing::info!("subscription closed by server"),
                    Ok(Err(e)) => tracing::error!("event listener failed: {e}"),
                    Err(e) => tracing::error!("event listener task panicked: {e}"),
                }
                break;
            }
            event = display_rx.recv() => match event {
                Ok(event) => render_event(&store, &event),
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    }

    reconciler.detach();
    listener_task.abort();
    render_snapshot(&store);
    tracing::info!("tally daemon exited cleanly");
    Ok(())
}

/// Print the full proposal list.
fn render_snapshot(store: &ProposalStore) {
    let records = store.snapshot();
    tracing::info!("{} proposal(s) known", records.len());
    let now = Timestamp::now();
    for record in records {
        let status = if record.executed {
            "executed"
        } else if record.is_expired(now) {
            "expired"
        } else if record.can_execute() {
            "executable"
        } else {
            "open"
        };
        tracing::info!(
            "  {} {:<30} {} ETH  votes {}/{}  [{}]",
            record.id,
            record.description,
            record.amount.to_eth_string(),
            record.vote_count,
            record.min_required_vote,
            status,
        );
    }
}

/// Print the store line affected by one event.
fn render_event(store: &ProposalStore, event: &ProposalEvent) {
    let id = event.proposal_id();
    match store.get(id) {
        Some(record) => tracing::info!(
            "{} {:?}: votes {}/{}, executed: {}",
            id,
            record.description,
            record.vote_count,
            record.min_required_vote,
            record.executed,
        ),
        None => tracing::debug!("event for proposal {id} not yet in the store"),
    }
}
