use std::fmt;

use sha2::{Digest, Sha256};

/// Deduplication key for a (feed, item) pair.
///
/// SHA-256 over the feed URL and the item identifier, hex encoded. The feed
/// URL is length-prefixed so that shifting bytes between the two inputs
/// changes the digest.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn new(feed_url: &str, item_id: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update((feed_url.len() as u64).to_be_bytes());
        hasher.update(feed_url.as_bytes());
        hasher.update(item_id.as_bytes());
        Self(hex::encode(hasher.finalize()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use rand::distributions::Alphanumeric;
    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};

    use super::*;

    #[test]
    fn test_deterministic() {
        let a = Fingerprint::new("https://example.com/feed.xml", "entry-123");
        let b = Fingerprint::new("https://example.com/feed.xml", "entry-123");
        assert_eq!(a, b);
    }

    #[test]
    fn test_different_inputs() {
        let a = Fingerprint::new("https://example.com/feed.xml", "entry-123");
        let b = Fingerprint::new("https://example.com/feed.xml", "entry-456");
        let c = Fingerprint::new("https://other.com/feed.xml", "entry-123");
        assert_ne!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_boundary_shift_changes_digest() {
        let a = Fingerprint::new("ab", "c");
        let b = Fingerprint::new("a", "bc");
        assert_ne!(a, b);
    }

    #[test]
    fn test_is_hex_sha256() {
        let fp = Fingerprint::new("https://example.com/feed.xml", "entry-123");
        assert_eq!(fp.as_str().len(), 64);
        assert!(fp.as_str().chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(fp.to_string(), fp.as_str());
    }

    #[test]
    fn test_random_pairs_do_not_collide() {
        let mut rng = SmallRng::seed_from_u64(0x5eed);
        let mut pairs = HashSet::new();
        let mut prints = HashSet::new();

        for _ in 0..5_000 {
            let feed_len = rng.gen_range(0..24);
            let item_len = rng.gen_range(0..24);
            let feed: String = (&mut rng)
                .sample_iter(&Alphanumeric)
                .take(feed_len)
                .map(char::from)
                .collect();
            let item: String = (&mut rng)
                .sample_iter(&Alphanumeric)
                .take(item_len)
                .map(char::from)
                .collect();

            if pairs.insert((feed.clone(), item.clone())) {
                assert!(
                    prints.insert(Fingerprint::new(&feed, &item)),
                    "collision for ({feed:?}, {item:?})"
                );
            }
        }

        assert_eq!(pairs.len(), prints.len());
    }
}
