//! Batch orchestration shared by the `watch-urls` and `episodes` commands.
//!
//! Workers never touch the catalog. They return owned results tagged with the
//! record's position and the orchestrator applies them, saving a checkpoint
//! of the whole document every so often.

pub mod episodes;
pub mod watch_urls;

use std::path::Path;

use tracing::{error, info};

use crate::catalog;
use crate::models::Catalog;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub processed: usize,
    pub succeeded: usize,
    pub failed: usize,
}

impl BatchSummary {
    pub fn record(&mut self, success: bool) {
        self.processed += 1;
        if success {
            self.succeeded += 1;
        } else {
            self.failed += 1;
        }
    }

    pub fn success_rate(&self) -> f64 {
        if self.processed == 0 {
            0.0
        } else {
            self.succeeded as f64 / self.processed as f64 * 100.0
        }
    }
}

/// Periodic full rewrite of the output file.
#[derive(Debug, Clone, Copy)]
pub struct Checkpoint<'a> {
    path: &'a Path,
    every: usize,
}

impl<'a> Checkpoint<'a> {
    pub fn new(path: &'a Path, every: usize) -> Self {
        Self { path, every }
    }

    /// Saves when `completed` is a multiple of the interval. A failed save is
    /// logged and the batch keeps going.
    pub fn tick(&self, catalog: &Catalog, completed: usize, total: usize, unit: &str) {
        if self.every == 0 || completed % self.every != 0 {
            return;
        }
        match catalog::save(catalog, self.path) {
            Ok(()) => info!("Progress saved: {}/{} {} processed", completed, total, unit),
            Err(err) => error!("Checkpoint save to {} failed: {:#}", self.path.display(), err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_summary_counts() {
        let mut summary = BatchSummary::default();
        summary.record(true);
        summary.record(false);
        summary.record(true);
        summary.record(true);

        assert_eq!(summary.processed, 4);
        assert_eq!(summary.succeeded, 3);
        assert_eq!(summary.failed, 1);
        assert!((summary.success_rate() - 75.0).abs() < 1e-9);
        assert_eq!(BatchSummary::default().success_rate(), 0.0);
    }

    #[test]
    fn test_checkpoint_only_on_interval() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.json");
        let checkpoint = Checkpoint::new(&path, 10);
        let catalog = Catalog::default();

        checkpoint.tick(&catalog, 9, 20, "shows");
        assert!(!path.exists());

        checkpoint.tick(&catalog, 10, 20, "shows");
        assert!(path.exists());
    }
}
