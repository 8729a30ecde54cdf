use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};

use cartoon_catalog::catalog;
use cartoon_catalog::config::{ConfigBuilder, ScraperConfig};
use cartoon_catalog::fetcher::Fetcher;
use cartoon_catalog::logging;
use cartoon_catalog::pipeline::episodes::{self, EpisodeOptions, ShowScraper};
use cartoon_catalog::pipeline::watch_urls::{self, DryRunReport, WatchUrlOptions};
use cartoon_catalog::resolver::StreamResolver;

mod cli;

use cli::{Cli, Command, EpisodeArgs, WatchUrlArgs};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_log = match &cli.command {
        Command::WatchUrls(_) => "watch_urls.log",
        Command::Episodes(_) => "scraper.log",
    };
    let log_file = cli
        .log_file
        .clone()
        .unwrap_or_else(|| default_log.into());
    logging::init(&cli.log_level, Some(&log_file))?;

    let result = match &cli.command {
        Command::WatchUrls(args) => run_watch_urls(&cli, args).await,
        Command::Episodes(args) => run_episodes(&cli, args).await,
    };

    if let Err(err) = &result {
        error!("{:#}", err);
    }
    result
}

fn build_config(cli: &Cli, timeout_secs: u64) -> Result<ScraperConfig> {
    ConfigBuilder::new()
        .base_url(cli.base_url.as_str())
        .timeout_secs(timeout_secs)
        .build()
}

async fn run_watch_urls(cli: &Cli, args: &WatchUrlArgs) -> Result<()> {
    if args.dry_run {
        let catalog = catalog::load(&args.input)?;
        println!(
            "{}",
            DryRunReport::new(&catalog, args.limit, args.workers as usize)
        );
        return Ok(());
    }

    let output = args.output.clone().unwrap_or_else(|| args.input.clone());
    let mut catalog = load_catalog(&args.input)?;

    let config = build_config(cli, args.timeout)?;
    let resolver = Arc::new(StreamResolver::new(Fetcher::new(&config)?, config));

    let options = WatchUrlOptions {
        workers: args.workers as usize,
        limit: args.limit,
        timeout: Duration::from_secs(args.timeout),
        ..WatchUrlOptions::new(output)
    };

    watch_urls::run(&mut catalog, resolver, &options).await?;
    Ok(())
}

async fn run_episodes(cli: &Cli, args: &EpisodeArgs) -> Result<()> {
    let workers = args.effective_workers();
    info!("Starting scraper with {} worker(s)", workers);
    if args.streams {
        info!("Stream URL extraction enabled - this will be slower but more complete");
    }

    let output = args.output.clone().unwrap_or_else(|| args.input.clone());
    let mut catalog = load_catalog(&args.input)?;

    let config = build_config(cli, args.timeout)?;
    let scraper = Arc::new(ShowScraper::new(&config)?);

    let options = EpisodeOptions {
        workers,
        include_streams: args.streams,
        stream_workers: args.stream_workers as usize,
        timeout: Duration::from_secs(args.timeout),
        ..EpisodeOptions::new(output)
    };

    episodes::run(&mut catalog, scraper, &options).await?;
    Ok(())
}

fn load_catalog(path: &Path) -> Result<cartoon_catalog::models::Catalog> {
    info!("Loading data from {}", path.display());
    catalog::load(path).with_context(|| format!("Error loading {}", path.display()))
}
