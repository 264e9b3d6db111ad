use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use rusqlite_migration::{Migrations, M};

use crate::app::{FeedhookError, Result};
use crate::domain::Fingerprint;
use crate::store::SeenStore;

pub struct SqliteSeenStore {
    conn: Mutex<Connection>,
}

impl SqliteSeenStore {
    /// Open or create the cache file at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let unavailable = |reason: String| FeedhookError::StorageUnavailable {
            path: path.to_path_buf(),
            reason,
        };

        let conn = Connection::open(path).map_err(|e| unavailable(e.to_string()))?;
        Self::with_connection(conn).map_err(|e| unavailable(e.to_string()))
    }

    pub fn in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(mut conn: Connection) -> Result<Self> {
        // WAL lets readers proceed while a mark is being committed; FULL
        // syncs the log on every commit.
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| {
            row.get::<_, String>(0)
        })?;
        conn.pragma_update(None, "synchronous", "FULL")?;

        Self::run_migrations(&mut conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn run_migrations(conn: &mut Connection) -> Result<()> {
        let migrations = Migrations::new(vec![M::up(include_str!(
            "../../migrations/001-initial/up.sql"
        ))]);

        migrations
            .to_latest(conn)
            .map_err(|e| FeedhookError::StorageUnavailable {
                path: conn.path().unwrap_or(":memory:").into(),
                reason: e.to_string(),
            })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|e| {
            FeedhookError::Database(rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error::new(1),
                Some(e.to_string()),
            ))
        })
    }

    /// Close the underlying connection, flushing the write-ahead log.
    pub fn close(self) -> Result<()> {
        let conn = self.conn.into_inner().map_err(|e| {
            FeedhookError::Database(rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error::new(1),
                Some(e.to_string()),
            ))
        })?;

        conn.close().map_err(|(_, e)| FeedhookError::Database(e))
    }
}

impl SeenStore for SqliteSeenStore {
    fn is_new(&self, fingerprint: &Fingerprint) -> Result<bool> {
        let conn = self.conn()?;

        let found = conn
            .query_row(
                "SELECT 1 FROM seen WHERE fingerprint = ?1",
                params![fingerprint.as_str()],
                |row| row.get::<_, i64>(0),
            )
            .optional()?;

        Ok(found.is_none())
    }

    fn mark_seen(&self, fingerprint: &Fingerprint, link: &str) -> Result<()> {
        let mut conn = self.conn()?;

        let tx = conn.transaction()?;
        tx.execute(
            "INSERT INTO seen (fingerprint, link, seen_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(fingerprint) DO UPDATE SET link = excluded.link",
            params![fingerprint.as_str(), link, Utc::now().to_rfc3339()],
        )?;
        tx.commit()?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    fn fp(item: &str) -> Fingerprint {
        Fingerprint::new("https://example.com/feed.xml", item)
    }

    #[test]
    fn test_new_until_marked() {
        let store = SqliteSeenStore::in_memory().unwrap();
        let fingerprint = fp("entry-1");

        assert!(store.is_new(&fingerprint).unwrap());
        store
            .mark_seen(&fingerprint, "https://example.com/1")
            .unwrap();
        assert!(!store.is_new(&fingerprint).unwrap());
    }

    #[test]
    fn test_is_new_has_no_side_effect() {
        let store = SqliteSeenStore::in_memory().unwrap();
        let fingerprint = fp("entry-1");

        assert!(store.is_new(&fingerprint).unwrap());
        assert!(store.is_new(&fingerprint).unwrap());
    }

    #[test]
    fn test_marks_are_per_fingerprint() {
        let store = SqliteSeenStore::in_memory().unwrap();
        store.mark_seen(&fp("entry-1"), "").unwrap();

        assert!(!store.is_new(&fp("entry-1")).unwrap());
        assert!(store.is_new(&fp("entry-2")).unwrap());
    }

    #[test]
    fn test_mark_twice_is_upsert() {
        let store = SqliteSeenStore::in_memory().unwrap();
        let fingerprint = fp("entry-1");

        store.mark_seen(&fingerprint, "https://example.com/old").unwrap();
        store.mark_seen(&fingerprint, "https://example.com/new").unwrap();

        let conn = store.conn().unwrap();
        let (count, link): (i64, String) = conn
            .query_row("SELECT COUNT(*), MAX(link) FROM seen", [], |row| {
                Ok((row.get(0)?, row.get(1)?))
            })
            .unwrap();
        assert_eq!(count, 1);
        assert_eq!(link, "https://example.com/new");
    }

    #[test]
    fn test_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.db");
        let fingerprint = fp("entry-1");

        let store = SqliteSeenStore::open(&path).unwrap();
        store
            .mark_seen(&fingerprint, "https://example.com/1")
            .unwrap();
        drop(store);

        let reopened = SqliteSeenStore::open(&path).unwrap();
        assert!(!reopened.is_new(&fingerprint).unwrap());
        assert!(reopened.is_new(&fp("entry-2")).unwrap());
    }

    #[test]
    fn test_close_then_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.db");

        let store = SqliteSeenStore::open(&path).unwrap();
        store.mark_seen(&fp("entry-1"), "").unwrap();
        store.close().unwrap();

        let reopened = SqliteSeenStore::open(&path).unwrap();
        assert!(!reopened.is_new(&fp("entry-1")).unwrap());
    }

    #[test]
    fn test_open_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.db");

        SqliteSeenStore::open(&path).unwrap().close().unwrap();
        SqliteSeenStore::open(&path).unwrap().close().unwrap();
    }

    #[test]
    fn test_open_unwritable_location_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("cache.db");

        let result = SqliteSeenStore::open(&path);
        assert!(matches!(
            result,
            Err(FeedhookError::StorageUnavailable { .. })
        ));
    }

    #[test]
    fn test_concurrent_marks_from_threads() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(SqliteSeenStore::open(dir.path().join("cache.db")).unwrap());

        let handles: Vec<_> = (0..4)
            .map(|t| {
                let store = store.clone();
                std::thread::spawn(move || {
                    for i in 0..25 {
                        let fingerprint = Fingerprint::new(
                            &format!("https://feed{}.example/rss", t),
                            &format!("entry-{}", i),
                        );
                        store.mark_seen(&fingerprint, "").unwrap();
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        for t in 0..4 {
            for i in 0..25 {
                let fingerprint = Fingerprint::new(
                    &format!("https://feed{}.example/rss", t),
                    &format!("entry-{}", i),
                );
                assert!(!store.is_new(&fingerprint).unwrap());
            }
        }
    }
}
