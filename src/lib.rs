//! # feedhook
//!
//! Watches RSS/Atom feeds and POSTs every new item, as JSON, to a web-hook.
//!
//! ## Architecture
//!
//! ```text
//! Fetcher → Normalizer → SeenStore check → Notifier → SeenStore mark
//! ```
//!
//! A [`ScanCycle`](scan::ScanCycle) runs that pipeline once over every
//! configured feed; the [`Scheduler`](daemon::Scheduler) repeats it on a
//! fixed interval until shutdown.
//!
//! ## Quick Start
//!
//! ```bash
//! cat > feeds.conf <<EOF
//! https://blog.rust-lang.org/feed.xml = https://hooks.example.com/rust
//! EOF
//!
//! feedhook --config feeds.conf --timeout 10s
//! ```

/// Application context and error handling.
///
/// The [`AppContext`](app::AppContext) struct wires together the feed list,
/// store, fetcher and notifier.
pub mod app;

/// Command-line interface using clap.
pub mod cli;

/// Feed list loading and runtime settings.
pub mod config;

/// Periodic scheduler and signal handling.
pub mod daemon;

/// Core domain models.
///
/// - [`FeedEntry`](domain::FeedEntry): a feed URL and its hook
/// - [`Item`](domain::Item): a feed entry, serialised as the hook payload
/// - [`Fingerprint`](domain::Fingerprint): SHA-256 dedup key
pub mod domain;

/// HTTP fetching of raw feed documents.
pub mod fetcher;

/// Feed parsing.
///
/// Converts RSS 0.9x/1.0/2.0, Atom 0.3/1.0, and JSON Feed 1.0
/// into [`Item`](domain::Item) structs.
pub mod normalizer;

/// Hook delivery.
pub mod notifier;

/// One scan over every configured feed.
pub mod scan;

/// Seen-item cache.
///
/// - [`SeenStore`](store::SeenStore): trait for the cache
/// - [`SqliteSeenStore`](store::SqliteSeenStore): SQLite implementation
pub mod store;
