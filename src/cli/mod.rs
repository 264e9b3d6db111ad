use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::config::{parse_positive_duration, Settings};
use crate::scan::DEFAULT_WORKERS;

#[derive(Parser, Debug)]
#[command(name = "feedhook")]
#[command(about = "POST new RSS/Atom items to web-hooks", long_about = None)]
pub struct Cli {
    /// The path to the configuration file to read
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// The timeout used for fetching the remote feeds
    #[arg(long, default_value = "5s", value_parser = parse_positive_duration)]
    pub timeout: Duration,

    /// Delay between scans (e.g., "5m", "1h")
    #[arg(long, default_value = "5m", value_parser = parse_positive_duration)]
    pub interval: Duration,

    /// The timeout used when posting to a hook
    #[arg(long, default_value = "30s", value_parser = parse_positive_duration)]
    pub notify_timeout: Duration,

    /// Number of feeds scanned concurrently
    #[arg(short, long, default_value_t = DEFAULT_WORKERS)]
    pub workers: usize,

    /// Cache file location (default: cache.db beside the config file)
    #[arg(long)]
    pub cache: Option<PathBuf>,

    /// Scan once and exit
    #[arg(long)]
    pub once: bool,
}

impl Cli {
    /// Settings for this invocation, or `None` when no config was given.
    pub fn settings(&self) -> Option<Settings> {
        let config = self.config.clone()?;

        let mut settings = Settings::new(config);
        settings.cache_path = self.cache.clone();
        settings.fetch_timeout = self.timeout;
        settings.notify_timeout = self.notify_timeout;
        settings.interval = self.interval;
        settings.workers = self.workers;
        Some(settings)
    }
}
