use std::time::Duration;

use anyhow::Result;

pub const DEFAULT_BASE_URL: &str = "https://stevenuniverse.best";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";
pub const DEFAULT_PROVIDER_MARKER: &str = "123moviespremium.net/watch/";
pub const DEFAULT_TMDB_API_BASE: &str = "https://api.themoviedb.org/3";
pub const DEFAULT_TMDB_IMAGE_BASE: &str = "https://image.tmdb.org/t/p/w500";

/// Site and network settings shared by every fetch the crate makes.
#[derive(Debug, Clone)]
pub struct ScraperConfig {
    pub base_url: String,
    pub referer: String,
    pub user_agent: String,
    pub provider_marker: String,
    pub tmdb_api_base: String,
    pub tmdb_image_base: String,
    pub request_timeout: Duration,
    pub retries: u32,
    pub retry_delay: Duration,
    pub season_delay: Duration,
}

impl ScraperConfig {
    /// Video player URL for one episode. Also stored as the episode `link`.
    pub fn video_player_url(&self, show_id: &str, season: u32, episode: u32) -> String {
        format!(
            "{}/video-player/?idd={}&season={}&episode={}",
            self.base_url, show_id, season, episode
        )
    }
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            referer: DEFAULT_BASE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            provider_marker: DEFAULT_PROVIDER_MARKER.to_string(),
            tmdb_api_base: DEFAULT_TMDB_API_BASE.to_string(),
            tmdb_image_base: DEFAULT_TMDB_IMAGE_BASE.to_string(),
            request_timeout: Duration::from_secs(15),
            retries: 3,
            retry_delay: Duration::from_secs(1),
            season_delay: Duration::from_millis(300),
        }
    }
}

pub struct ConfigBuilder {
    base_url: Option<String>,
    referer: Option<String>,
    user_agent: Option<String>,
    provider_marker: Option<String>,
    tmdb_api_base: Option<String>,
    request_timeout: Option<Duration>,
    retries: Option<u32>,
    retry_delay: Option<Duration>,
    season_delay: Option<Duration>,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            base_url: None,
            referer: None,
            user_agent: None,
            provider_marker: None,
            tmdb_api_base: None,
            request_timeout: None,
            retries: None,
            retry_delay: None,
            season_delay: None,
        }
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into().trim_end_matches('/').to_string());
        self
    }

    /// Defaults to the base URL when unset.
    pub fn referer(mut self, referer: impl Into<String>) -> Self {
        self.referer = Some(referer.into());
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    pub fn provider_marker(mut self, marker: impl Into<String>) -> Self {
        self.provider_marker = Some(marker.into());
        self
    }

    pub fn tmdb_api_base(mut self, url: impl Into<String>) -> Self {
        self.tmdb_api_base = Some(url.into().trim_end_matches('/').to_string());
        self
    }

    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.request_timeout = Some(Duration::from_secs(secs));
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    pub fn retries(mut self, retries: u32) -> Self {
        self.retries = Some(retries);
        self
    }

    pub fn retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = Some(delay);
        self
    }

    pub fn season_delay(mut self, delay: Duration) -> Self {
        self.season_delay = Some(delay);
        self
    }

    pub fn build(self) -> Result<ScraperConfig> {
        let defaults = ScraperConfig::default();

        let base_url = self.base_url.unwrap_or(defaults.base_url);
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(anyhow::anyhow!("Base URL must be http(s): {}", base_url));
        }

        let provider_marker = self.provider_marker.unwrap_or(defaults.provider_marker);
        if provider_marker.is_empty() {
            return Err(anyhow::anyhow!("Provider marker cannot be empty"));
        }

        let request_timeout = self.request_timeout.unwrap_or(defaults.request_timeout);
        if request_timeout.is_zero() {
            return Err(anyhow::anyhow!("Request timeout must be greater than 0"));
        }

        let retries = self.retries.unwrap_or(defaults.retries);
        if retries == 0 {
            return Err(anyhow::anyhow!("Retries must be at least 1"));
        }

        Ok(ScraperConfig {
            referer: self.referer.unwrap_or_else(|| base_url.clone()),
            base_url,
            user_agent: self.user_agent.unwrap_or(defaults.user_agent),
            provider_marker,
            tmdb_api_base: self.tmdb_api_base.unwrap_or(defaults.tmdb_api_base),
            tmdb_image_base: defaults.tmdb_image_base,
            request_timeout,
            retries,
            retry_delay: self.retry_delay.unwrap_or(defaults.retry_delay),
            season_delay: self.season_delay.unwrap_or(defaults.season_delay),
        })
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
