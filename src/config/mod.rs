//! Runtime configuration.
//!
//! The feed list is a line-oriented text file. Each non-blank line that does
//! not start with `#` maps a feed URL to a hook URL:
//!
//! ```text
//! # feed = hook
//! https://blog.rust-lang.org/feed.xml = https://hooks.example.com/rust
//! ```
//!
//! The seen cache lives next to this file as `cache.db`.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use url::Url;

use crate::app::{FeedhookError, Result};
use crate::domain::FeedEntry;
use crate::scan::DEFAULT_WORKERS;

pub const CACHE_FILE_NAME: &str = "cache.db";
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_NOTIFY_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// Everything needed to build an [`AppContext`](crate::app::AppContext).
#[derive(Debug, Clone)]
pub struct Settings {
    pub config_path: PathBuf,
    /// Cache location; `None` means `cache.db` beside the config file.
    pub cache_path: Option<PathBuf>,
    pub fetch_timeout: Duration,
    pub notify_timeout: Duration,
    pub interval: Duration,
    pub workers: usize,
}

impl Settings {
    pub fn new(config_path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: config_path.into(),
            cache_path: None,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            notify_timeout: DEFAULT_NOTIFY_TIMEOUT,
            interval: DEFAULT_INTERVAL,
            workers: DEFAULT_WORKERS,
        }
    }

    /// Resolve the cache file path.
    pub fn cache_path(&self) -> Result<PathBuf> {
        if let Some(ref path) = self.cache_path {
            return Ok(path.clone());
        }

        let dir = match self.config_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let dir = fs::canonicalize(&dir).map_err(|e| FeedhookError::ConfigFile {
            path: dir.clone(),
            source: e,
        })?;

        Ok(dir.join(CACHE_FILE_NAME))
    }
}

/// Read and parse the feed list at `path`.
pub fn load_feeds(path: &Path) -> Result<Vec<FeedEntry>> {
    let content = fs::read_to_string(path).map_err(|e| FeedhookError::ConfigFile {
        path: path.to_path_buf(),
        source: e,
    })?;

    Ok(parse_feeds(&content))
}

/// Parse feed list text. Malformed lines are logged and skipped.
pub fn parse_feeds(content: &str) -> Vec<FeedEntry> {
    content
        .lines()
        .enumerate()
        .filter_map(|(idx, line)| {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                return None;
            }

            match parse_line(line) {
                Ok(entry) => Some(entry),
                Err(reason) => {
                    tracing::warn!("Skipping config line {}: {}", idx + 1, reason);
                    None
                }
            }
        })
        .collect()
}

fn parse_line(line: &str) -> std::result::Result<FeedEntry, String> {
    // Feed URLs may carry query strings, so split on the last '='.
    let (feed, hook) = line
        .rsplit_once('=')
        .ok_or_else(|| format!("expected feed=hook, got {:?}", line))?;

    let feed = feed.trim();
    let hook = hook.trim();

    if feed.is_empty() || hook.is_empty() {
        return Err(format!("empty feed or hook in {:?}", line));
    }

    validate_url(feed)?;
    validate_url(hook)?;

    Ok(FeedEntry::new(feed, hook))
}

fn validate_url(raw: &str) -> std::result::Result<(), String> {
    let url = Url::parse(raw).map_err(|e| format!("invalid URL {:?}: {}", raw, e))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(format!("unsupported scheme {:?} in {:?}", other, raw)),
    }
}

/// Parse a duration like "5s", "250ms", "30m", "6h", "1d", or raw seconds.
pub fn parse_duration(s: &str) -> std::result::Result<Duration, String> {
    let s = s.trim().to_lowercase();

    if let Some(millis) = s.strip_suffix("ms") {
        millis
            .parse::<u64>()
            .map(Duration::from_millis)
            .map_err(|_| format!("Invalid milliseconds: {}", millis))
    } else if let Some(hours) = s.strip_suffix('h') {
        scaled_secs(hours, 3600).ok_or_else(|| format!("Invalid hours: {}", hours))
    } else if let Some(minutes) = s.strip_suffix('m') {
        scaled_secs(minutes, 60).ok_or_else(|| format!("Invalid minutes: {}", minutes))
    } else if let Some(days) = s.strip_suffix('d') {
        scaled_secs(days, 86400).ok_or_else(|| format!("Invalid days: {}", days))
    } else if let Some(secs) = s.strip_suffix('s') {
        secs.parse::<u64>()
            .map(Duration::from_secs)
            .map_err(|_| format!("Invalid seconds: {}", secs))
    } else {
        s.parse::<u64>()
            .map(Duration::from_secs)
            .map_err(|_| format!("Invalid duration: {}. Use format like '5s', '5m', '1h'", s))
    }
}

fn scaled_secs(value: &str, unit: u64) -> Option<Duration> {
    value
        .parse::<u64>()
        .ok()?
        .checked_mul(unit)
        .map(Duration::from_secs)
}

/// Like [`parse_duration`], but zero is rejected.
pub fn parse_positive_duration(s: &str) -> std::result::Result<Duration, String> {
    let d = parse_duration(s)?;
    if d.is_zero() {
        return Err("Duration must be greater than zero".to_string());
    }
    Ok(d)
}

/// Format a duration for log output.
pub fn format_duration(d: Duration) -> String {
    let secs = d.as_secs();
    if d.subsec_millis() != 0 || secs == 0 {
        format!("{}ms", d.as_millis())
    } else if secs >= 86400 && secs % 86400 == 0 {
        format!("{}d", secs / 86400)
    } else if secs >= 3600 && secs % 3600 == 0 {
        format!("{}h", secs / 3600)
    } else if secs >= 60 && secs % 60 == 0 {
        format!("{}m", secs / 60)
    } else {
        format!("{}s", secs)
    }
}
