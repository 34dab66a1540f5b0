//! Source adapters for the job search provider.
//!
//! This module contains:
//! - The `JobSource` seam the pipeline pulls raw postings through
//! - `JobSpyClient`, the HTTP adapter for a JobSpy-compatible search API
//! - `FixtureSource`, a file-backed adapter for offline runs and tests

mod fixture;
mod jobspy;

use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::error::Result;
use crate::models::{RawPosting, RunWindow, SearchTask};

pub use fixture::{FixtureEntry, FixtureSource};
pub use jobspy::JobSpyClient;

/// Lazy sequence of raw postings for one search task.
///
/// An `Err` item means the provider broke off mid-task.
pub type PostingStream = BoxStream<'static, Result<RawPosting>>;

/// Anything that can answer a search task with raw postings.
#[async_trait]
pub trait JobSource: Send + Sync {
    /// Start fetching postings for `task`, no older than the window.
    ///
    /// Fails with `AppError::Provider` when the source is unreachable or
    /// its response is malformed.
    async fn fetch(&self, task: &SearchTask, window: RunWindow) -> Result<PostingStream>;
}
