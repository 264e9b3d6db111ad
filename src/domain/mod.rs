pub mod feed;
pub mod fingerprint;
pub mod item;

pub use feed::FeedEntry;
pub use fingerprint::Fingerprint;
pub use item::Item;
