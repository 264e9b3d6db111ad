use chrono::{DateTime, Utc};
use serde::Serialize;

/// A single feed entry, as posted to a hook.
///
/// The JSON form of this struct is the hook payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Item {
    pub guid: String,
    pub title: Option<String>,
    pub link: Option<String>,
    pub links: Vec<String>,
    pub summary: Option<String>,
    pub content: Option<String>,
    pub authors: Vec<String>,
    pub categories: Vec<String>,
    pub published: Option<DateTime<Utc>>,
    pub updated: Option<DateTime<Utc>>,
}

impl Item {
    pub fn new(guid: impl Into<String>) -> Self {
        Self {
            guid: guid.into(),
            ..Self::default()
        }
    }

    /// The stable identifier used for deduplication: the GUID, or the
    /// link when the feed supplies no GUID.
    pub fn identifier(&self) -> &str {
        if self.guid.is_empty() {
            self.link.as_deref().unwrap_or("")
        } else {
            &self.guid
        }
    }

    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or("(Untitled)")
    }
}
