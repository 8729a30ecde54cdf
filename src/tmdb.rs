use serde::Deserialize;
use tracing::debug;

use crate::config::ScraperConfig;
use crate::error::{Result, ScrapeError};
use crate::fetcher::Fetcher;
use crate::models::Episode;

/// Client for the one TMDb endpoint the catalog needs.
#[derive(Debug, Clone)]
pub struct TmdbClient {
    fetcher: Fetcher,
    config: ScraperConfig,
}

#[derive(Debug, Deserialize)]
struct SeasonResponse {
    #[serde(default)]
    episodes: Vec<TmdbEpisode>,
}

#[derive(Debug, Deserialize)]
pub struct TmdbEpisode {
    pub episode_number: Option<u32>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub still_path: Option<String>,
}

impl TmdbClient {
    pub fn new(fetcher: Fetcher, config: ScraperConfig) -> Self {
        Self { fetcher, config }
    }

    /// Episodes of one season, already shaped as catalog records with no
    /// stream URL.
    pub async fn season_episodes(
        &self,
        api_key: &str,
        tmdb_id: &str,
        season_number: u32,
    ) -> Result<Vec<Episode>> {
        let url = format!(
            "{}/tv/{}/season/{}?api_key={}",
            self.config.tmdb_api_base, tmdb_id, season_number, api_key
        );
        debug!(tmdb_id, season_number, "Requesting TMDb season");

        let page = self
            .fetcher
            .get(&url, None, self.config.request_timeout)
            .await?;

        let season: SeasonResponse =
            serde_json::from_str(&page.body).map_err(|source| ScrapeError::Decode {
                url: format!("{}/tv/{}/season/{}", self.config.tmdb_api_base, tmdb_id, season_number),
                source,
            })?;

        Ok(season
            .episodes
            .into_iter()
            .map(|ep| episode_from_tmdb(&self.config, tmdb_id, season_number, ep))
            .collect())
    }
}

pub fn episode_from_tmdb(
    config: &ScraperConfig,
    tmdb_id: &str,
    season_number: u32,
    ep: TmdbEpisode,
) -> Episode {
    let episode_label = ep
        .episode_number
        .map(|n| n.to_string())
        .unwrap_or_default();

    let image = match ep.still_path.as_deref() {
        Some(path) if !path.is_empty() => format!("{}{}", config.tmdb_image_base, path),
        _ => String::new(),
    };

    Episode {
        number: format!("Episode {}", episode_label),
        title: ep.name.unwrap_or_default(),
        description: ep.overview.unwrap_or_default(),
        image,
        link: format!(
            "{}/video-player/?idd={}&season={}&episode={}",
            config.base_url, tmdb_id, season_number, episode_label
        ),
        show_id: Some(tmdb_id.to_string()),
        season_id: Some(season_number),
        episode_id: ep.episode_number,
        play_url: None,
        watch_url: None,
        extra: Default::default(),
    }
}
