use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use futures::StreamExt;
use tracing::{Instrument, error, info, info_span, warn};

use super::{BatchSummary, Checkpoint};
use crate::catalog::{self, UrlField};
use crate::config::ScraperConfig;
use crate::error::ScrapeError;
use crate::extractor::ShowPageParser;
use crate::fetcher::Fetcher;
use crate::models::{Cartoon, Catalog, Episode, Season};
use crate::resolver::StreamResolver;
use crate::tmdb::TmdbClient;

#[derive(Debug, Clone)]
pub struct EpisodeOptions {
    pub output: PathBuf,
    pub workers: usize,
    pub include_streams: bool,
    pub stream_workers: usize,
    pub timeout: Duration,
    pub checkpoint_every: usize,
}

impl EpisodeOptions {
    pub fn new(output: PathBuf) -> Self {
        Self {
            output,
            workers: 3,
            include_streams: false,
            stream_workers: 5,
            timeout: Duration::from_secs(10),
            checkpoint_every: 10,
        }
    }
}

/// Episodes fetched for one season of a show.
pub type SeasonEpisodes = (u32, Vec<Episode>);

/// Builds the season/episode tree of a single show from its page and TMDb.
#[derive(Debug)]
pub struct ShowScraper {
    fetcher: Fetcher,
    tmdb: TmdbClient,
    resolver: Arc<StreamResolver>,
    parser: ShowPageParser,
    season_delay: Duration,
}

impl ShowScraper {
    pub fn new(config: &ScraperConfig) -> Result<Self> {
        let fetcher = Fetcher::new(config)?;
        Ok(Self {
            tmdb: TmdbClient::new(fetcher.clone(), config.clone()),
            resolver: Arc::new(StreamResolver::new(fetcher.clone(), config.clone())),
            parser: ShowPageParser::new()?,
            season_delay: config.season_delay,
            fetcher,
        })
    }

    /// Seasons in the order the show page lists them. A TMDb failure for one
    /// season yields an empty list for it; a page without TMDb data fails the
    /// whole show.
    pub async fn scrape_show(
        &self,
        show_url: &str,
        options: &EpisodeOptions,
    ) -> Result<Vec<SeasonEpisodes>, ScrapeError> {
        let page = self.fetcher.get_with_retry(show_url, None).await?;
        let show = self.parser.parse(&page.body);

        let api_key = show
            .api_key
            .as_deref()
            .ok_or(ScrapeError::MissingField("apiKey"))?;
        let tmdb_id = show
            .tmdb_id
            .as_deref()
            .ok_or(ScrapeError::MissingField("id"))?;

        info!(
            "Found TMDb ID {} with {} seasons",
            tmdb_id,
            show.season_numbers.len()
        );

        let mut seasons = Vec::with_capacity(show.season_numbers.len());
        for &season_number in &show.season_numbers {
            let mut episodes = match self.tmdb.season_episodes(api_key, tmdb_id, season_number).await {
                Ok(episodes) => episodes,
                Err(err) => {
                    warn!(
                        "TMDb error for TV {} Season {}: {}",
                        tmdb_id, season_number, err
                    );
                    Vec::new()
                }
            };

            if options.include_streams && !episodes.is_empty() {
                episodes = self
                    .resolve_play_urls(episodes, options.stream_workers, options.timeout)
                    .await;
            }

            info!("  Season {}: {} episodes", season_number, episodes.len());
            seasons.push((season_number, episodes));

            if !self.season_delay.is_zero() {
                tokio::time::sleep(self.season_delay).await;
            }
        }

        Ok(seasons)
    }

    /// Fills `play_url` for each episode using a bounded pool. Order is kept.
    pub async fn resolve_play_urls(
        &self,
        mut episodes: Vec<Episode>,
        workers: usize,
        timeout: Duration,
    ) -> Vec<Episode> {
        let workers = workers.max(1);
        info!(
            "  Getting stream URLs for {} episodes using {} workers...",
            episodes.len(),
            workers
        );

        let jobs: Vec<_> = episodes
            .iter()
            .enumerate()
            .map(|(index, episode)| (index, episode.key(), episode.short_title(30)))
            .collect();

        let mut results = futures::stream::iter(jobs)
            .map(|(index, key, title)| {
                let resolver = Arc::clone(&self.resolver);
                tokio::spawn(async move {
                    let key = match key {
                        Ok(key) => key,
                        Err(err) => {
                            warn!("  ✗ {} - {}", title, err);
                            return (index, None);
                        }
                    };
                    let url = resolver.resolve(&key, timeout).await;
                    if url.is_some() {
                        info!("  ✓ S{}E{} - {}...", key.season, key.episode, title);
                    } else {
                        warn!("  ✗ S{}E{} - Failed to get stream URL", key.season, key.episode);
                    }
                    (index, url)
                })
            })
            .buffer_unordered(workers);

        while let Some(joined) = results.next().await {
            match joined {
                Ok((index, url)) => UrlField::Play.set(&mut episodes[index], url),
                Err(err) => error!("Stream worker failed: {}", err),
            }
        }

        let resolved = episodes.iter().filter(|ep| ep.play_url.is_some()).count();
        info!("  ✓ Successfully got {}/{} stream URLs", resolved, episodes.len());

        episodes
    }
}

/// Writes scraped seasons into a show record. Seasons the page did not list
/// end up empty; listed seasons the record lacks are appended.
pub fn merge_seasons(cartoon: &mut Cartoon, mut fetched: Vec<SeasonEpisodes>) {
    for season in &mut cartoon.seasons {
        season.episodes = match fetched.iter().position(|(n, _)| *n == season.season_number) {
            Some(index) => fetched.remove(index).1,
            None => Vec::new(),
        };
        info!(
            "  Found {} episodes for season {}",
            season.episodes.len(),
            season.season_number
        );
    }

    cartoon.seasons.extend(
        fetched
            .into_iter()
            .map(|(season_number, episodes)| Season::new(season_number, episodes)),
    );
}

/// Rebuilds every show's episode lists and writes the catalog to
/// `options.output`.
pub async fn run(
    catalog: &mut Catalog,
    scraper: Arc<ShowScraper>,
    options: &EpisodeOptions,
) -> Result<BatchSummary> {
    let workers = options.workers.max(1);
    info!("Starting episode scraping for all shows");
    info!(
        "Stream URLs: {}",
        if options.include_streams { "Enabled" } else { "Disabled" }
    );
    info!("Max workers: {}", workers);

    let total = catalog.cartoons.len();
    let mut summary = BatchSummary::default();
    if total == 0 {
        warn!("No cartoon data found to process");
        return Ok(summary);
    }
    info!("Found {} cartoons to process", total);

    let jobs: Vec<(usize, String, String)> = catalog
        .cartoons
        .iter()
        .enumerate()
        .map(|(index, cartoon)| (index, cartoon.title.clone(), cartoon.url.clone()))
        .collect();

    let checkpoint = Checkpoint::new(&options.output, options.checkpoint_every);

    let mut results = futures::stream::iter(jobs)
        .map(|(index, title, url)| {
            let scraper = Arc::clone(&scraper);
            let options = options.clone();
            let span = info_span!("show", title = %title);
            tokio::spawn(
                async move {
                    info!("Processing {}: {}", index + 1, title);
                    let result = scraper.scrape_show(&url, &options).await;
                    (index, title, result)
                }
                .instrument(span),
            )
        })
        .buffer_unordered(workers);

    while let Some(joined) = results.next().await {
        match joined {
            Ok((index, _, Ok(seasons))) => {
                merge_seasons(&mut catalog.cartoons[index], seasons);
                summary.record(true);
            }
            Ok((_, title, Err(err))) => {
                warn!("Could not extract TMDb data for {}: {}", title, err);
                summary.record(false);
            }
            Err(err) => {
                error!("Worker task failed: {}", err);
                summary.record(false);
            }
        }

        checkpoint.tick(catalog, summary.processed, total, "shows");
    }

    catalog::save(catalog, &options.output)?;
    info!("Data saved to {}", options.output.display());

    let stats = catalog.stats(None, UrlField::Play);
    info!("Episode scraping complete!");
    info!("Total shows: {}", total);
    info!("Shows failed: {}", summary.failed);
    info!("Total episodes found: {}", stats.total_episodes);
    if options.include_streams {
        info!(
            "Episodes with stream URLs: {}/{}",
            stats.with_url, stats.total_episodes
        );
    }

    Ok(summary)
}
