use std::time::Duration;

use tracing::{debug, warn};

use crate::config::ScraperConfig;
use crate::error::{Result, ScrapeError};
use crate::extractor::find_watch_url;
use crate::fetcher::Fetcher;
use crate::manifest::{first_media_line, is_mpegurl};
use crate::models::EpisodeKey;

/// Turns an episode key into a playable URL:
/// video player page -> watch URL -> (optional) first playlist entry.
/// One attempt per call.
#[derive(Debug, Clone)]
pub struct StreamResolver {
    fetcher: Fetcher,
    config: ScraperConfig,
}

impl StreamResolver {
    pub fn new(fetcher: Fetcher, config: ScraperConfig) -> Self {
        Self { fetcher, config }
    }

    /// Every failure collapses to `None` after being logged.
    pub async fn resolve(&self, key: &EpisodeKey, timeout: Duration) -> Option<String> {
        match self.try_resolve(key, timeout).await {
            Ok(url) => Some(url),
            Err(ScrapeError::ExtractionMiss { .. }) => {
                warn!("No watch URL found for {}", key);
                None
            }
            Err(ScrapeError::Timeout { url }) => {
                warn!(url = %url, "Timeout getting watch URL for {}", key);
                None
            }
            Err(err) => {
                warn!(error = %err, "Request error for {}", key);
                None
            }
        }
    }

    pub async fn try_resolve(&self, key: &EpisodeKey, timeout: Duration) -> Result<String> {
        let player_url = self
            .config
            .video_player_url(&key.show_id, key.season, key.episode);
        let referer = Some(self.config.referer.as_str());

        let player = self.fetcher.get(&player_url, referer, timeout).await?;

        let watch_url = find_watch_url(&player.body, &self.config.provider_marker).ok_or_else(
            || ScrapeError::ExtractionMiss {
                marker: self.config.provider_marker.clone(),
            },
        )?;
        debug!(watch_url = %watch_url, "Found watch URL for {}", key);

        let stream = self.fetcher.get(&watch_url, referer, timeout).await?;

        if !is_mpegurl(&stream.content_type) {
            return Ok(watch_url);
        }

        match first_media_line(&stream.body) {
            Ok(line) => Ok(line.to_string()),
            Err(ScrapeError::ManifestEmpty) => {
                debug!(watch_url = %watch_url, "Playlist has no media line, keeping watch URL");
                Ok(watch_url)
            }
            Err(err) => Err(err),
        }
    }
}
