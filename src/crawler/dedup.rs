//! Content deduplication by SHA-256 fingerprint

use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::fmt;
use std::sync::Mutex;

/// SHA-256 digest of a page body
///
/// Two bodies with the same fingerprint are treated as the same content;
/// collisions are accepted as negligible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint([u8; 32]);

impl Fingerprint {
    pub fn of(content: &[u8]) -> Self {
        Self(Sha256::digest(content).into())
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

/// Set of fingerprints seen during a crawl
///
/// Locked independently of the frontier.
#[derive(Debug, Default)]
pub struct ContentDeduplicator {
    seen: Mutex<HashSet<Fingerprint>>,
}

impl ContentDeduplicator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `content` and reports whether it was novel
    ///
    /// The membership test and the insert happen under one lock, so two
    /// workers can never both see the same content as novel.
    ///
    /// # Returns
    ///
    /// `true` on first sight, `false` for a duplicate
    pub fn check_and_record(&self, content: &[u8]) -> bool {
        let fingerprint = Fingerprint::of(content);
        self.seen
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(fingerprint)
    }

    /// Number of distinct bodies seen
    pub fn len(&self) -> usize {
        self.seen.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
