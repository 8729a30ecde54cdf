use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use cartoon_catalog::catalog::DEFAULT_CATALOG_FILE;
use cartoon_catalog::config::DEFAULT_BASE_URL;

#[derive(Debug, Parser)]
#[command(author, version, about = "Cartoon catalog scraper", long_about = None)]
pub struct Cli {
    /// Catalog site the shows and video player pages live on
    #[arg(long, global = true, value_name = "URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Log level
    #[arg(
        long,
        global = true,
        value_name = "LEVEL",
        default_value = "info",
        value_parser = ["trace", "debug", "info", "warn", "error"]
    )]
    pub log_level: String,

    /// Append log lines to this file as well as the console
    #[arg(long, global = true, value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Add watch_url fields to every episode that lacks one
    WatchUrls(WatchUrlArgs),
    /// Rebuild each show's seasons and episodes from TMDb
    Episodes(EpisodeArgs),
}

#[derive(Debug, Args)]
pub struct WatchUrlArgs {
    /// Input JSON file
    #[arg(short, long, value_name = "FILE", default_value = DEFAULT_CATALOG_FILE)]
    pub input: PathBuf,

    /// Output JSON file (default: same as input)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Number of concurrent workers
    #[arg(short, long, default_value_t = 5, value_parser = clap::value_parser!(u16).range(1..))]
    pub workers: u16,

    /// Limit processing to the first N shows
    #[arg(short, long, value_name = "N")]
    pub limit: Option<usize>,

    /// Per-request timeout in seconds
    #[arg(long, value_name = "SECS", default_value_t = 15, value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: u64,

    /// Show what would be processed without making changes
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Debug, Args)]
pub struct EpisodeArgs {
    /// Input JSON file
    #[arg(short, long, value_name = "FILE", default_value = DEFAULT_CATALOG_FILE)]
    pub input: PathBuf,

    /// Output JSON file (default: same as input)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Also extract streaming URLs (slower)
    #[arg(long)]
    pub streams: bool,

    /// Number of shows processed concurrently
    #[arg(long, default_value_t = 3, value_parser = clap::value_parser!(u16).range(1..))]
    pub workers: u16,

    /// Process shows one at a time
    #[arg(long)]
    pub no_threads: bool,

    /// Concurrent stream lookups per season when --streams is set
    #[arg(long, default_value_t = 5, value_parser = clap::value_parser!(u16).range(1..))]
    pub stream_workers: u16,

    /// Per-request timeout in seconds
    #[arg(long, value_name = "SECS", default_value_t = 10, value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: u64,
}

impl EpisodeArgs {
    pub fn effective_workers(&self) -> usize {
        if self.no_threads { 1 } else { self.workers as usize }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_watch_urls_defaults() {
        let cli = Cli::try_parse_from(["cartoon-catalog", "watch-urls"]).unwrap();
        assert_eq!(cli.base_url, DEFAULT_BASE_URL);
        match cli.command {
            Command::WatchUrls(args) => {
                assert_eq!(args.input, PathBuf::from(DEFAULT_CATALOG_FILE));
                assert_eq!(args.output, None);
                assert_eq!(args.workers, 5);
                assert_eq!(args.timeout, 15);
                assert!(!args.dry_run);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_watch_urls_short_flags() {
        let cli = Cli::try_parse_from([
            "cartoon-catalog",
            "watch-urls",
            "-i",
            "in.json",
            "-o",
            "out.json",
            "-w",
            "8",
            "-l",
            "2",
            "--dry-run",
        ])
        .unwrap();
        match cli.command {
            Command::WatchUrls(args) => {
                assert_eq!(args.input, PathBuf::from("in.json"));
                assert_eq!(args.output, Some(PathBuf::from("out.json")));
                assert_eq!(args.workers, 8);
                assert_eq!(args.limit, Some(2));
                assert!(args.dry_run);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_episodes_no_threads() {
        let cli = Cli::try_parse_from([
            "cartoon-catalog",
            "episodes",
            "--streams",
            "--workers",
            "6",
            "--no-threads",
        ])
        .unwrap();
        match cli.command {
            Command::Episodes(args) => {
                assert!(args.streams);
                assert_eq!(args.effective_workers(), 1);
                assert_eq!(args.timeout, 10);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_rejects_zero_workers_and_bad_level() {
        assert!(Cli::try_parse_from(["cartoon-catalog", "watch-urls", "-w", "0"]).is_err());
        assert!(
            Cli::try_parse_from(["cartoon-catalog", "--log-level", "loud", "episodes"]).is_err()
        );
    }
}
