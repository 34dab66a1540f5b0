//! Storage abstractions for job posting persistence.
//!
//! A single `jobs` table keyed by the posting identity key. The unique
//! constraints on `identity_key` and `job_url` reject duplicates even when
//! application-level dedup is bypassed.
//!
//! ## Layout
//!
//! ```text
//! storage/
//! ├── config.toml           # Configuration
//! └── jobs.db               # SQLite database
//! ```

mod schema;
pub mod sqlite;

use std::collections::{BTreeMap, HashSet};

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::Result;
use crate::models::{Level, Posting, StoredPosting};

// Re-export for convenience
pub use sqlite::SqliteJobStore;

/// Location terms that match every location filter when broad matching is on.
pub const BROAD_LOCATIONS: &[&str] = &["united states", "usa", "remote", "nationwide", "anywhere"];

/// Result of an insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// New row with this id
    Inserted(i64),
    /// Identity key or URL already stored
    AlreadyExists,
}

/// Read-side filters. Unset fields do not constrain.
#[derive(Debug, Clone, Default)]
pub struct JobFilter {
    /// Case-insensitive substring of title or company
    pub keyword: Option<String>,
    pub level: Option<Level>,
    /// Case-insensitive substring of location
    pub location: Option<String>,
    /// With a location filter, also match remote/nationwide postings and
    /// postings in the same state
    pub include_broad_locations: bool,
    pub limit: Option<usize>,
}

impl JobFilter {
    pub fn keyword(mut self, keyword: impl Into<String>) -> Self {
        self.keyword = Some(keyword.into());
        self
    }

    pub fn level(mut self, level: Level) -> Self {
        self.level = Some(level);
        self
    }

    pub fn location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn broad(mut self, include: bool) -> Self {
        self.include_broad_locations = include;
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Aggregate counts over the stored postings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BoardStats {
    pub total_jobs: usize,
    pub companies: usize,
    pub remote_jobs: usize,
    pub new_today: usize,
    pub with_salary: usize,
    /// Keyed by level name; unknown level is "unspecified"
    pub by_level: BTreeMap<String, usize>,
    pub by_category: BTreeMap<String, usize>,
}

/// Trait for job storage backends.
pub trait JobStore: Send + Sync {
    /// Insert a posting. Duplicates are reported, not raised.
    fn insert(&self, posting: &Posting) -> Result<InsertOutcome>;

    /// Postings matching `filter`, newest first.
    fn query(&self, filter: &JobFilter) -> Result<Vec<StoredPosting>>;

    /// Every stored identity key.
    fn identity_keys(&self) -> Result<HashSet<String>>;

    /// Every stored posting URL.
    fn urls(&self) -> Result<HashSet<String>>;

    fn count(&self) -> Result<usize>;

    /// Aggregate counts; `today` decides what counts as new.
    fn stats(&self, today: NaiveDate) -> Result<BoardStats>;

    /// Distinct non-empty locations, sorted.
    fn locations(&self) -> Result<Vec<String>>;

    /// Delete every posting, returning how many were removed.
    fn clear(&self) -> Result<usize>;
}
