//! File-backed job source.
//!
//! Replays canned provider answers per search task. Used by `run --fixture`
//! for offline runs and by the pipeline tests.
//!
//! ## File format
//!
//! ```json
//! [
//!   { "term": "Corporate Trainer", "location": "Remote",
//!     "postings": [ { "title": "...", "job_url": "..." } ] },
//!   { "term": "Sales Enablement", "location": "Orlando, FL",
//!     "error": "provider timed out" }
//! ]
//! ```
//!
//! An entry with an `error` and no postings fails at fetch time; with both,
//! the postings are streamed first and the error ends the stream.

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::{RawPosting, RunWindow, SearchTask};
use crate::services::{JobSource, PostingStream};

/// Canned answer for one search task.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FixtureEntry {
    pub term: String,
    pub location: String,
    #[serde(default)]
    pub postings: Vec<RawPosting>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Job source answering from an in-memory table.
#[derive(Debug, Default)]
pub struct FixtureSource {
    entries: HashMap<SearchTask, FixtureEntry>,
    fetches: AtomicUsize,
}

impl FixtureSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load entries from a JSON fixture file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let entries: Vec<FixtureEntry> = serde_json::from_str(&content)?;
        Ok(entries.into_iter().fold(Self::new(), Self::with_entry))
    }

    pub fn with_entry(mut self, entry: FixtureEntry) -> Self {
        let task = SearchTask::new(&entry.term, &entry.location);
        self.entries.insert(task, entry);
        self
    }

    /// Answer `task` with `postings`.
    pub fn with_postings(self, task: &SearchTask, postings: Vec<RawPosting>) -> Self {
        self.with_entry(FixtureEntry {
            term: task.term.clone(),
            location: task.location.clone(),
            postings,
            error: None,
        })
    }

    /// Make `task` fail at fetch time.
    pub fn with_failure(self, task: &SearchTask, message: impl Into<String>) -> Self {
        self.with_entry(FixtureEntry {
            term: task.term.clone(),
            location: task.location.clone(),
            postings: Vec::new(),
            error: Some(message.into()),
        })
    }

    /// Number of `fetch` calls made so far.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl JobSource for FixtureSource {
    async fn fetch(&self, task: &SearchTask, _window: RunWindow) -> Result<PostingStream> {
        self.fetches.fetch_add(1, Ordering::SeqCst);

        let Some(entry) = self.entries.get(task) else {
            return Ok(stream::empty().boxed());
        };

        let context = task.to_string();
        match (&entry.error, entry.postings.is_empty()) {
            (Some(message), true) => Err(AppError::provider(context, message)),
            (Some(message), false) => {
                let tail = AppError::provider(context, message);
                let items: Vec<Result<RawPosting>> = entry
                    .postings
                    .iter()
                    .cloned()
                    .map(Ok)
                    .chain(std::iter::once(Err(tail)))
                    .collect();
                Ok(stream::iter(items).boxed())
            }
            (None, _) => Ok(stream::iter(entry.postings.clone().into_iter().map(Ok)).boxed()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Config;

    fn raw(title: &str, url: &str) -> RawPosting {
        RawPosting {
            title: Some(title.to_string()),
            job_url: Some(url.to_string()),
            ..RawPosting::default()
        }
    }

    #[tokio::test]
    async fn unknown_task_yields_nothing() {
        let source = FixtureSource::new();
        let task = SearchTask::new("Trainer", "Remote");
        let items: Vec<_> = source
            .fetch(&task, Config::default().window())
            .await
            .unwrap()
            .collect()
            .await;
        assert!(items.is_empty());
        assert_eq!(source.fetch_count(), 1);
    }

    #[tokio::test]
    async fn failure_entries() {
        let task = SearchTask::new("Trainer", "Remote");
        let window = Config::default().window();

        let failing = FixtureSource::new().with_failure(&task, "boom");
        assert!(failing.fetch(&task, window).await.is_err());

        let mid_stream = FixtureSource::new().with_entry(FixtureEntry {
            term: task.term.clone(),
            location: task.location.clone(),
            postings: vec![raw("Trainer", "https://x.io/1")],
            error: Some("connection reset".to_string()),
        });
        let items: Vec<_> = mid_stream.fetch(&task, window).await.unwrap().collect().await;
        assert_eq!(items.len(), 2);
        assert!(items[0].is_ok());
        assert!(items[1].is_err());
    }

    #[test]
    fn loads_fixture_file() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(
            tmp.path(),
            r#"[
                {"term": "Trainer", "location": "Remote",
                 "postings": [{"title": "Corporate Trainer", "job_url": "https://x.io/1"}]},
                {"term": "Trainer", "location": "Orlando, FL", "error": "timeout"}
            ]"#,
        )
        .unwrap();

        let source = FixtureSource::load(tmp.path()).unwrap();
        assert_eq!(source.entries.len(), 2);
        assert!(source.entries[&SearchTask::new("Trainer", "Orlando, FL")].error.is_some());
    }
}
