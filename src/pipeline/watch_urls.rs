use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use futures::StreamExt;
use tracing::{Instrument, error, info, info_span, warn};

use super::{BatchSummary, Checkpoint};
use crate::catalog::{self, CatalogStats, UrlField};
use crate::error::ScrapeError;
use crate::models::{Catalog, EpisodeKey, EpisodePos};
use crate::resolver::StreamResolver;

#[derive(Debug, Clone)]
pub struct WatchUrlOptions {
    pub output: PathBuf,
    pub workers: usize,
    pub limit: Option<usize>,
    pub timeout: Duration,
    pub checkpoint_every: usize,
    pub throttle: Duration,
}

impl WatchUrlOptions {
    pub fn new(output: PathBuf) -> Self {
        Self {
            output,
            workers: 5,
            limit: None,
            timeout: Duration::from_secs(15),
            checkpoint_every: 50,
            throttle: Duration::from_millis(100),
        }
    }
}

struct Job {
    pos: EpisodePos,
    key: Result<EpisodeKey, ScrapeError>,
    show: String,
    title: String,
}

struct Outcome {
    pos: EpisodePos,
    url: Option<String>,
}

/// Resolves `watch_url` for every episode that does not have one yet and
/// writes the catalog to `options.output`.
pub async fn run(
    catalog: &mut Catalog,
    resolver: Arc<StreamResolver>,
    options: &WatchUrlOptions,
) -> Result<BatchSummary> {
    if let Some(limit) = options.limit {
        info!("Processing only first {} shows", limit);
    }

    let stats = catalog.stats(options.limit, UrlField::Watch);
    info!("Found {} cartoons to process", stats.shows);
    info!("Total episodes: {}", stats.total_episodes);
    info!("Episodes needing watch URLs: {}", stats.without_url);

    let jobs: Vec<Job> = catalog
        .pending(options.limit, UrlField::Watch)
        .into_iter()
        .filter_map(|pos| {
            let episode = catalog.episode(pos)?;
            Some(Job {
                pos,
                key: episode.key(),
                show: catalog.cartoons[pos.cartoon].title.clone(),
                title: episode.short_title(40),
            })
        })
        .collect();

    let mut summary = BatchSummary::default();
    if jobs.is_empty() {
        info!("All episodes already have watch URLs!");
        return Ok(summary);
    }

    let total = jobs.len();
    let workers = options.workers.max(1);
    let checkpoint = Checkpoint::new(&options.output, options.checkpoint_every);
    info!("Starting processing with {} workers...", workers);

    let mut results = futures::stream::iter(jobs)
        .map(|job| {
            let resolver = Arc::clone(&resolver);
            let timeout = options.timeout;
            let span = info_span!("episode", show = %job.show);
            tokio::spawn(resolve_job(resolver, job, timeout).instrument(span))
        })
        .buffer_unordered(workers);

    while let Some(joined) = results.next().await {
        match joined {
            Ok(outcome) => {
                summary.record(outcome.url.is_some());
                if let Some(episode) = catalog.episode_mut(outcome.pos) {
                    UrlField::Watch.set(episode, outcome.url);
                }
            }
            Err(err) => {
                error!("Worker task failed: {}", err);
                summary.record(false);
            }
        }

        checkpoint.tick(catalog, summary.processed, total, "episodes");

        if !options.throttle.is_zero() {
            tokio::time::sleep(options.throttle).await;
        }
    }

    catalog::save(catalog, &options.output)?;

    info!("{}", "=".repeat(60));
    info!("PROCESSING COMPLETE!");
    info!("Total episodes processed: {}", summary.processed);
    info!("Successfully got watch URLs: {}", summary.succeeded);
    info!("Failed to get watch URLs: {}", summary.failed);
    info!("Success rate: {:.1}%", summary.success_rate());
    info!("Output saved to: {}", options.output.display());

    Ok(summary)
}

async fn resolve_job(resolver: Arc<StreamResolver>, job: Job, timeout: Duration) -> Outcome {
    let key = match job.key {
        Ok(key) => key,
        Err(err) => {
            warn!("Missing IDs for episode: {} ({})", job.title, err);
            return Outcome {
                pos: job.pos,
                url: None,
            };
        }
    };

    let url = resolver.resolve(&key, timeout).await;
    if url.is_some() {
        info!("✓ {} {} - {}...", job.show, key, job.title);
    } else {
        warn!("✗ {} {} - Failed to get watch URL", job.show, key);
    }

    Outcome { pos: job.pos, url }
}

/// Report-only mode: counts plus a rough time estimate, no network.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DryRunReport {
    pub stats: CatalogStats,
    pub workers: usize,
}

impl DryRunReport {
    pub fn new(catalog: &Catalog, limit: Option<usize>, workers: usize) -> Self {
        Self {
            stats: catalog.stats(limit, UrlField::Watch),
            workers,
        }
    }
}

impl fmt::Display for DryRunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "📊 DRY RUN STATISTICS:")?;
        writeln!(f, "Shows to process: {}", self.stats.shows)?;
        writeln!(f, "Total episodes: {}", self.stats.total_episodes)?;
        writeln!(f, "Episodes with watch_url: {}", self.stats.with_url)?;
        writeln!(f, "Episodes needing watch_url: {}", self.stats.without_url)?;
        write!(
            f,
            "Estimated processing time: {:.1} minutes",
            self.stats.eta_minutes(self.workers)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Cartoon, Episode, Season};

    #[test]
    fn test_dry_run_report() {
        let episodes = (1..=4)
            .map(|n| Episode {
                episode_id: Some(n),
                watch_url: (n == 1).then(|| "https://cdn.example/1.m3u8".to_string()),
                ..Default::default()
            })
            .collect();
        let catalog = Catalog {
            cartoons: vec![Cartoon {
                title: "Steven Universe".to_string(),
                url: "https://stevenuniverse.best/su".to_string(),
                seasons: vec![Season::new(1, episodes)],
                extra: Default::default(),
            }],
            extra: Default::default(),
        };

        let report = DryRunReport::new(&catalog, None, 1).to_string();

        assert!(report.contains("Shows to process: 1"));
        assert!(report.contains("Total episodes: 4"));
        assert!(report.contains("Episodes with watch_url: 1"));
        assert!(report.contains("Episodes needing watch_url: 3"));
        assert!(report.contains("Estimated processing time: 0.1 minutes"));
    }
}
