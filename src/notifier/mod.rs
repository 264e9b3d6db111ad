pub mod http_notifier;

use async_trait::async_trait;

use crate::app::Result;
use crate::domain::Item;

pub use http_notifier::HttpNotifier;

/// Outcome of a POST that reached the hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delivery {
    pub status: u16,
}

impl Delivery {
    /// Whether the hook answered 200 or 201.
    pub fn acknowledged(&self) -> bool {
        matches!(self.status, 200 | 201)
    }
}

#[async_trait]
pub trait Notifier {
    /// Post `item` to `hook_url`.
    ///
    /// Any HTTP response counts as delivered; only a failure to reach the
    /// hook or read its reply is an error.
    async fn notify(&self, hook_url: &str, item: &Item) -> Result<Delivery>;
}
