pub mod sqlite;

use crate::app::Result;
use crate::domain::Fingerprint;

pub use sqlite::SqliteSeenStore;

/// Persistent record of items that have already been delivered.
///
/// Implementations serialise access internally; callers share one store
/// across tasks without extra locking.
pub trait SeenStore: Send + Sync {
    /// True iff nothing has been recorded for `fingerprint`.
    fn is_new(&self, fingerprint: &Fingerprint) -> Result<bool>;

    /// Record `fingerprint` as delivered. Durable once this returns.
    fn mark_seen(&self, fingerprint: &Fingerprint, link: &str) -> Result<()>;
}
