/// A monitored feed and the hook its new items are posted to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedEntry {
    pub feed_url: String,
    pub hook_url: String,
}

impl FeedEntry {
    pub fn new(feed_url: impl Into<String>, hook_url: impl Into<String>) -> Self {
        Self {
            feed_url: feed_url.into(),
            hook_url: hook_url.into(),
        }
    }
}
