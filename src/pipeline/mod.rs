//! Ingestion pipeline.
//!
//! - `classify`: keyword-based role relevance
//! - `dedup`: identity-key and URL seen-set
//! - `ingest`: the run state machine over all search tasks
//! - `schedule`: daily UTC trigger

pub mod classify;
pub mod dedup;
pub mod ingest;
pub mod schedule;

pub use classify::{RoleClassifier, Verdict};
pub use dedup::{Deduplicator, SeenKeys};
pub use ingest::{IngestionPipeline, RunContext, RunReport, RunState};
pub use schedule::{DailySchedule, next_fire};
