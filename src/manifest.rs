//! Just enough M3U8 handling to follow one level of playlist indirection.

use crate::error::{Result, ScrapeError};

/// True for `application/vnd.apple.mpegurl`, `audio/x-mpegurl` and friends.
pub fn is_mpegurl(content_type: &str) -> bool {
    content_type.to_ascii_lowercase().contains("mpegurl")
}

/// First trimmed line that is neither blank nor a `#` tag or comment.
pub fn first_media_line(playlist: &str) -> Result<&str> {
    playlist
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty() && !line.starts_with('#'))
        .ok_or(ScrapeError::ManifestEmpty)
}
