// src/pipeline/dedup.rs

//! Duplicate detection across one run and previously stored postings.

use std::collections::HashSet;

use crate::error::Result;
use crate::models::Posting;
use crate::storage::JobStore;

/// Identity keys and URLs already accepted.
#[derive(Debug, Clone, Default)]
pub struct SeenKeys {
    keys: HashSet<String>,
    urls: HashSet<String>,
}

impl SeenKeys {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed from everything the store already holds.
    pub fn from_store(store: &dyn JobStore) -> Result<Self> {
        Ok(Self {
            keys: store.identity_keys()?,
            urls: store.urls()?,
        })
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.keys.contains(key)
    }
}

/// Stateless duplicate checks against a [`SeenKeys`] set.
#[derive(Debug, Clone, Copy, Default)]
pub struct Deduplicator;

impl Deduplicator {
    /// A posting is a duplicate when its identity key or its URL was seen.
    pub fn is_duplicate(&self, posting: &Posting, seen: &SeenKeys) -> bool {
        seen.keys.contains(&posting.identity_key()) || seen.urls.contains(&posting.url)
    }

    /// Record the posting so later sightings are rejected.
    pub fn register(&self, posting: &Posting, seen: &mut SeenKeys) {
        seen.keys.insert(posting.identity_key());
        seen.urls.insert(posting.url.clone());
    }
}
