//! Expiredis - batch key-expiry maintenance for Redis
//!
//! Walks the keyspace with SCAN, checks each key's TTL against a threshold
//! and deletes the key or rewrites its TTL, logging throughput as it goes.

use anyhow::Context;
use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use expiredis::{run, Cli, RedisStore};

/// Main entry point for expiredis.
///
/// # Startup Sequence
/// 1. Parse flags (and `EXPIREDIS_*` environment variables)
/// 2. Initialize tracing subscriber for logging
/// 3. Connect to the Redis server; failure here is fatal
/// 4. Scan until the cursor is exhausted or the limit is reached
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = cli.config();
    init_tracing(config.verbose);

    let mut store = match RedisStore::connect(&cli.url).await {
        Ok(store) => store,
        Err(e) => {
            error!("Failed to connect to redis: {}", e);
            return Err(e).context("Failed to connect to redis");
        }
    };

    if config.dry_run {
        info!("Dry-run mode: destructive commands skipped");
    }
    match config.configured_actions() {
        0 => info!("No action configured, matching keys will only be counted"),
        1 => {}
        _ => warn!(
            "Several actions configured, only '{}' will be applied",
            config.action().describe()
        ),
    }

    let report = run(&mut store, &config).await.context("Scan aborted")?;
    info!(
        "Scan finished after {} batches ({} keys counted, {:?})",
        report.outcome.batches, report.outcome.total, report.outcome.stop
    );

    Ok(())
}

/// Logs to stderr. Defaults to info, or debug with `--verbose`; `RUST_LOG`
/// overrides both.
fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "expiredis=debug"
    } else {
        "expiredis=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
