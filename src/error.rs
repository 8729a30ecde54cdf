use thiserror::Error;

/// Per-item failures. None of these abort a batch: the item they belong to is
/// left unresolved and the run moves on.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("request to {url} timed out")]
    Timeout { url: String },

    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP error {status} from {url}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("no element containing {marker} found")]
    ExtractionMiss { marker: String },

    #[error("manifest has no media line")]
    ManifestEmpty,

    #[error("could not decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

impl ScrapeError {
    /// Classifies a reqwest failure into the timeout / transport split.
    pub fn from_reqwest(url: &str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ScrapeError::Timeout {
                url: url.to_string(),
            }
        } else {
            ScrapeError::Transport {
                url: url.to_string(),
                source: err,
            }
        }
    }
}

pub type Result<T, E = ScrapeError> = std::result::Result<T, E>;
