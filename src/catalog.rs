use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use crate::models::{Cartoon, Catalog, Episode, EpisodePos};

pub const DEFAULT_CATALOG_FILE: &str = "cartoons_data.json";

/// Rough per-episode cost used for the dry-run estimate.
const SECONDS_PER_EPISODE: f64 = 2.0;

pub fn load(path: &Path) -> Result<Catalog> {
    let content =
        fs::read_to_string(path).with_context(|| format!("Reading {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Parsing {}", path.display()))
}

/// Rewrites the whole file. Not atomic.
pub fn save(catalog: &Catalog, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(catalog).context("Serializing catalog")?;
    fs::write(path, json).with_context(|| format!("Writing {}", path.display()))
}

/// Which resolved-URL slot of an episode a pass works on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrlField {
    Watch,
    Play,
}

impl UrlField {
    pub fn get(self, episode: &Episode) -> Option<&str> {
        match self {
            UrlField::Watch => episode.watch_url.as_deref(),
            UrlField::Play => episode.play_url.as_deref(),
        }
    }

    pub fn set(self, episode: &mut Episode, url: Option<String>) {
        match self {
            UrlField::Watch => episode.watch_url = url,
            UrlField::Play => episode.play_url = url,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CatalogStats {
    pub shows: usize,
    pub total_episodes: usize,
    pub with_url: usize,
    pub without_url: usize,
}

impl CatalogStats {
    /// Minutes the remaining episodes are expected to take with `workers`.
    pub fn eta_minutes(&self, workers: usize) -> f64 {
        self.without_url as f64 * SECONDS_PER_EPISODE / workers.max(1) as f64 / 60.0
    }
}

impl Catalog {
    /// The first `limit` shows, or all of them.
    pub fn shows(&self, limit: Option<usize>) -> &[Cartoon] {
        let end = limit.map_or(self.cartoons.len(), |n| n.min(self.cartoons.len()));
        &self.cartoons[..end]
    }

    pub fn stats(&self, limit: Option<usize>, field: UrlField) -> CatalogStats {
        let mut stats = CatalogStats {
            shows: self.shows(limit).len(),
            ..Default::default()
        };

        for episode in self
            .shows(limit)
            .iter()
            .flat_map(|cartoon| &cartoon.seasons)
            .flat_map(|season| &season.episodes)
        {
            stats.total_episodes += 1;
            if field.get(episode).is_some() {
                stats.with_url += 1;
            } else {
                stats.without_url += 1;
            }
        }

        stats
    }

    /// Positions of episodes whose `field` is still null, in catalog order.
    pub fn pending(&self, limit: Option<usize>, field: UrlField) -> Vec<EpisodePos> {
        let mut positions = Vec::new();
        for (ci, cartoon) in self.shows(limit).iter().enumerate() {
            for (si, season) in cartoon.seasons.iter().enumerate() {
                for (ei, episode) in season.episodes.iter().enumerate() {
                    if field.get(episode).is_none() {
                        positions.push(EpisodePos {
                            cartoon: ci,
                            season: si,
                            episode: ei,
                        });
                    }
                }
            }
        }
        positions
    }

    pub fn episode(&self, pos: EpisodePos) -> Option<&Episode> {
        self.cartoons
            .get(pos.cartoon)?
            .seasons
            .get(pos.season)?
            .episodes
            .get(pos.episode)
    }

    pub fn episode_mut(&mut self, pos: EpisodePos) -> Option<&mut Episode> {
        self.cartoons
            .get_mut(pos.cartoon)?
            .seasons
            .get_mut(pos.season)?
            .episodes
            .get_mut(pos.episode)
    }
}
