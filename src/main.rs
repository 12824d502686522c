use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, info};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;
use std::time::Duration;

use pulse_feed::board::{split_columns, Column, Dashboard, ImageIndex};
use pulse_feed::cli::Cli;
use pulse_feed::config::Config;
use pulse_feed::scheduler::{Scheduler, TokioScheduler};
use pulse_feed::models::TokenRecord;
use pulse_feed::{feed, logging, metrics, seed};

const REUSED_IMAGE_LIMIT: usize = 5;

fn log_board_layout(tokens: &[TokenRecord]) {
    let columns = split_columns(tokens);
    for (column, group) in [
        (Column::NewPairs, &columns.new_pairs),
        (Column::FinalStretch, &columns.final_stretch),
        (Column::Migrated, &columns.migrated),
    ] {
        let symbols: Vec<&str> = group.iter().map(|t| t.token_symbol.as_str()).collect();
        info!("{}: {}", column.title(), symbols.join(", "));
    }

    let images = ImageIndex::build(tokens);
    for token in tokens {
        if let Some(others) = images.other_tokens(token, REUSED_IMAGE_LIMIT) {
            let symbols: Vec<&str> = others.iter().map(|o| o.token_symbol.as_str()).collect();
            info!("{} reuses an image with {}", token.token_symbol, symbols.join(", "));
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("Failed to load configuration from {:?}", path))?,
        None => Config::default(),
    };
    if let Some(path) = cli.seed.clone() {
        config.feed.seed_path = Some(path);
    }
    if let Some(rng_seed) = cli.rng_seed {
        config.feed.rng_seed = Some(rng_seed);
    }
    if let Some(path) = cli.log_file.clone() {
        config.logging.file = Some(path);
    }
    config.validate()?;

    logging::init(&config.logging, cli.debug)?;
    metrics::init()?;
    info!("Starting pulse feed...");

    let tokens = match &config.feed.seed_path {
        Some(path) => seed::load(path)
            .with_context(|| format!("Failed to load seed tokens from {:?}", path))?,
        None => seed::default_board(),
    };
    let rng = match config.feed.rng_seed {
        Some(value) => StdRng::seed_from_u64(value),
        None => StdRng::from_entropy(),
    };

    let scheduler: Arc<dyn Scheduler> = Arc::new(TokioScheduler::current()?);
    let handle = feed::initialize(tokens, scheduler.clone(), rng, &config.feed);
    let mut dashboard = Dashboard::new(scheduler, config.classifier.clear_after());
    let mut updates = handle.subscribe();

    let initial = updates.borrow_and_update().clone();
    log_board_layout(&initial);
    for row in dashboard.apply(&initial) {
        info!("{}", row.render());
    }

    let shutdown = async {
        match cli.duration {
            Some(secs) => tokio::time::sleep(Duration::from_secs(secs)).await,
            None => {
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    };
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                info!("Shutdown requested");
                break;
            }
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let tokens = updates.borrow_and_update().clone();
                for row in dashboard.apply(&tokens) {
                    if !row.changes.is_empty() {
                        info!("{}", row.render());
                    }
                }
            }
        }
    }

    handle.teardown();
    debug!("Final metrics:\n{}", metrics::render());
    info!("Pulse feed stopped after tracking {} tokens", dashboard.tracked());
    Ok(())
}
