use std::time::Duration;

use anyhow::Context;
use reqwest::Client;
use reqwest::header::{self, HeaderMap, HeaderValue};
use tracing::{debug, error, warn};

use crate::config::ScraperConfig;
use crate::error::{Result, ScrapeError};

/// A successfully fetched (2xx) response body.
#[derive(Debug, Clone)]
pub struct Page {
    pub url: String,
    pub content_type: String,
    pub body: String,
}

/// Thin wrapper around a shared `reqwest::Client` that always sends the
/// configured browser user agent.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    timeout: Duration,
    retries: u32,
    retry_delay: Duration,
}

impl Fetcher {
    pub fn new(config: &ScraperConfig) -> anyhow::Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::USER_AGENT,
            HeaderValue::from_str(&config.user_agent).context("Invalid user agent")?,
        );

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            timeout: config.request_timeout,
            retries: config.retries,
            retry_delay: config.retry_delay,
        })
    }

    /// Single attempt. Non-2xx statuses are errors.
    pub async fn get(&self, url: &str, referer: Option<&str>, timeout: Duration) -> Result<Page> {
        let mut request = self.client.get(url).timeout(timeout);
        if let Some(referer) = referer {
            request = request.header(header::REFERER, referer);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ScrapeError::from_reqwest(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScrapeError::Status {
                url: url.to_string(),
                status,
            });
        }

        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_string();

        let body = response
            .text()
            .await
            .map_err(|e| ScrapeError::from_reqwest(url, e))?;

        Ok(Page {
            url: url.to_string(),
            content_type,
            body,
        })
    }

    /// Retries transport failures and bad statuses with a doubling delay.
    pub async fn get_with_retry(&self, url: &str, referer: Option<&str>) -> Result<Page> {
        let mut delay = self.retry_delay;
        let mut attempt = 1;

        loop {
            debug!(url, attempt, "Fetching");
            match self.get(url, referer, self.timeout).await {
                Ok(page) => return Ok(page),
                Err(err) if attempt < self.retries => {
                    warn!(url, attempt, error = %err, "Error fetching, retrying in {:?}", delay);
                    tokio::time::sleep(delay).await;
                    delay *= 2;
                    attempt += 1;
                }
                Err(err) => {
                    error!(url, attempts = self.retries, error = %err, "Failed to fetch");
                    return Err(err);
                }
            }
        }
    }
}
