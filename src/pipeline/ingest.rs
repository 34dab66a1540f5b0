// src/pipeline/ingest.rs

//! Ingestion run over every search task.
//!
//! For each task: fetch, then for each raw posting normalize, drop stale
//! ones, classify, dedup, insert and register. Provider failures end the
//! current task only. Storage failures other than a uniqueness conflict
//! fail the whole run.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};
use futures::StreamExt;
use serde::Serialize;

use crate::error::{AppError, Result};
use crate::models::{Config, RawPosting, RunWindow, SearchTask};
use crate::pipeline::classify::RoleClassifier;
use crate::pipeline::dedup::{Deduplicator, SeenKeys};
use crate::services::JobSource;
use crate::storage::{InsertOutcome, JobStore};
use crate::utils::log::{header, step, sub_item, summary};

/// Lifecycle of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunState {
    Idle,
    Running,
    Completed,
    Failed,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Counters for one run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub state: RunState,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub tasks_total: usize,
    pub tasks_attempted: usize,
    /// Tasks cut short by a provider error
    pub tasks_failed: usize,
    /// Raw postings received
    pub found: usize,
    pub inserted: usize,
    pub duplicate: usize,
    pub irrelevant: usize,
    pub stale: usize,
    /// Raw postings without a usable title or URL
    pub invalid: usize,
    /// Set when the run failed
    pub error: Option<String>,
}

impl RunReport {
    fn new(tasks_total: usize) -> Self {
        Self {
            state: RunState::Running,
            started_at: Utc::now(),
            finished_at: None,
            tasks_total,
            tasks_attempted: 0,
            tasks_failed: 0,
            found: 0,
            inserted: 0,
            duplicate: 0,
            irrelevant: 0,
            stale: 0,
            invalid: 0,
            error: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.state == RunState::Completed
    }

    /// The report itself, or [`AppError::RunFailed`] carrying the failure message.
    pub fn into_result(self) -> Result<Self> {
        match (self.state, &self.error) {
            (RunState::Failed, Some(message)) => Err(AppError::RunFailed(message.clone())),
            (RunState::Failed, None) => Err(AppError::RunFailed("unknown error".to_string())),
            _ => Ok(self),
        }
    }

    fn summary_items(&self) -> Vec<(&'static str, String)> {
        vec![
            ("State", self.state.to_string()),
            (
                "Tasks",
                format!(
                    "{}/{} attempted, {} failed",
                    self.tasks_attempted, self.tasks_total, self.tasks_failed
                ),
            ),
            ("Found", self.found.to_string()),
            ("Inserted", self.inserted.to_string()),
            ("Duplicate", self.duplicate.to_string()),
            ("Irrelevant", self.irrelevant.to_string()),
            ("Stale", self.stale.to_string()),
            ("Invalid", self.invalid.to_string()),
        ]
    }
}

/// Mutable state threaded through one run.
#[derive(Debug)]
pub struct RunContext {
    pub seen: SeenKeys,
    /// Postings published before this date are ignored
    pub cutoff: NaiveDate,
    pub report: RunReport,
}

/// What happened to a single raw posting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Disposition {
    Inserted,
    Duplicate,
    Irrelevant,
    Stale,
    Invalid,
}

/// Drives a run from a job source into a job store.
pub struct IngestionPipeline {
    source: Arc<dyn JobSource>,
    store: Arc<dyn JobStore>,
    classifier: RoleClassifier,
    dedup: Deduplicator,
    tasks: Vec<SearchTask>,
    window: RunWindow,
    request_delay: Duration,
    state: RunState,
}

impl IngestionPipeline {
    pub fn new(config: &Config, source: Arc<dyn JobSource>, store: Arc<dyn JobStore>) -> Self {
        Self {
            source,
            store,
            classifier: RoleClassifier::new(&config.classifier),
            dedup: Deduplicator,
            tasks: config.tasks(),
            window: config.window(),
            request_delay: Duration::from_millis(config.provider.request_delay_ms),
            state: RunState::Idle,
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// Run every task once. `today` anchors the lookback window.
    ///
    /// Never returns an error: a fatal storage failure is reported as
    /// [`RunState::Failed`] with the message in [`RunReport::error`].
    pub async fn run(&mut self, today: NaiveDate) -> RunReport {
        self.state = RunState::Running;
        header(&format!(
            "Job ingestion: {} tasks, {}-day window",
            self.tasks.len(),
            self.window.lookback_days
        ));

        let mut report = RunReport::new(self.tasks.len());
        let outcome = match SeenKeys::from_store(self.store.as_ref()) {
            Ok(seen) => {
                log::info!("Seeded dedup set with {} stored postings", seen.len());
                let mut ctx = RunContext {
                    seen,
                    cutoff: self.window.cutoff(today),
                    report,
                };
                let result = self.run_tasks(&mut ctx).await;
                report = ctx.report;
                result
            }
            Err(e) => Err(e),
        };

        report.state = match outcome {
            Ok(()) => RunState::Completed,
            Err(e) => {
                log::error!("Run failed: {}", e);
                report.error = Some(e.to_string());
                RunState::Failed
            }
        };
        report.finished_at = Some(Utc::now());
        self.state = report.state;

        summary("Ingestion run", &report.summary_items());
        report
    }

    async fn run_tasks(&self, ctx: &mut RunContext) -> Result<()> {
        let total = self.tasks.len();
        for (idx, task) in self.tasks.iter().enumerate() {
            if idx > 0 && !self.request_delay.is_zero() {
                tokio::time::sleep(self.request_delay).await;
            }
            step(idx + 1, total, &task.to_string());
            ctx.report.tasks_attempted += 1;

            let inserted_before = ctx.report.inserted;
            let found_before = ctx.report.found;
            if let Err(e) = self.run_task(task, ctx).await {
                if !e.is_recoverable() {
                    return Err(e);
                }
                log::warn!("Skipping rest of {}: {}", task, e);
                ctx.report.tasks_failed += 1;
            }
            sub_item(&format!(
                "found {}, inserted {}",
                ctx.report.found - found_before,
                ctx.report.inserted - inserted_before
            ));
        }
        Ok(())
    }

    async fn run_task(&self, task: &SearchTask, ctx: &mut RunContext) -> Result<()> {
        let mut stream = self.source.fetch(task, self.window).await?;
        while let Some(item) = stream.next().await {
            let raw = item?;
            ctx.report.found += 1;
            match self.process(&raw, ctx)? {
                Disposition::Inserted => ctx.report.inserted += 1,
                Disposition::Duplicate => ctx.report.duplicate += 1,
                Disposition::Irrelevant => ctx.report.irrelevant += 1,
                Disposition::Stale => ctx.report.stale += 1,
                Disposition::Invalid => ctx.report.invalid += 1,
            }
        }
        Ok(())
    }

    fn process(&self, raw: &RawPosting, ctx: &mut RunContext) -> Result<Disposition> {
        let Some(posting) = raw.normalize() else {
            log::debug!("Invalid posting skipped: {:?}", raw.title);
            return Ok(Disposition::Invalid);
        };
        if posting.is_older_than(ctx.cutoff) {
            return Ok(Disposition::Stale);
        }
        if !self.classifier.is_relevant(&posting) {
            log::debug!("Irrelevant: {}", posting.title);
            return Ok(Disposition::Irrelevant);
        }
        if self.dedup.is_duplicate(&posting, &ctx.seen) {
            return Ok(Disposition::Duplicate);
        }

        let outcome = self.store.insert(&posting).map_err(fatal)?;
        self.dedup.register(&posting, &mut ctx.seen);
        match outcome {
            InsertOutcome::Inserted(id) => {
                log::debug!("Inserted #{}: {} at {}", id, posting.title, posting.company);
                Ok(Disposition::Inserted)
            }
            InsertOutcome::AlreadyExists => Ok(Disposition::Duplicate),
        }
    }
}

/// Storage errors surface as unrecoverable regardless of their variant.
fn fatal(e: AppError) -> AppError {
    match e {
        AppError::StorageUnavailable(_) | AppError::Storage(_) => e,
        other => AppError::storage_unavailable(other),
    }
}
