// src/pipeline/schedule.rs

//! Daily trigger.

use std::future::Future;

use chrono::{DateTime, Duration, NaiveTime, Utc};

/// Next instant strictly after `now` whose UTC wall time is `daily_at`.
pub fn next_fire(now: DateTime<Utc>, daily_at: NaiveTime) -> DateTime<Utc> {
    let today = now.date_naive().and_time(daily_at).and_utc();
    if today > now {
        today
    } else {
        today + Duration::days(1)
    }
}

/// Fires a job once a day at a fixed UTC time.
#[derive(Debug, Clone, Copy)]
pub struct DailySchedule {
    at: NaiveTime,
}

impl DailySchedule {
    pub fn new(at: NaiveTime) -> Self {
        Self { at }
    }

    /// Time left until the next fire.
    pub fn until_next(&self, now: DateTime<Utc>) -> std::time::Duration {
        (next_fire(now, self.at) - now)
            .to_std()
            .unwrap_or(std::time::Duration::ZERO)
    }

    /// Sleep until each fire time and run `job`, `max_runs` times or forever.
    ///
    /// A run finishes before the next fire time is computed, so runs never
    /// overlap; a run that overshoots a fire time skips it.
    pub async fn run<F, Fut>(&self, max_runs: Option<usize>, mut job: F)
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = ()>,
    {
        let mut runs = 0;
        while max_runs.is_none_or(|max| runs < max) {
            let now = Utc::now();
            log::info!(
                "Next run at {} (in {})",
                next_fire(now, self.at).format("%Y-%m-%d %H:%M UTC"),
                format_wait(self.until_next(now))
            );
            tokio::time::sleep(self.until_next(Utc::now())).await;
            job().await;
            runs += 1;
        }
    }
}

fn format_wait(wait: std::time::Duration) -> String {
    let mins = wait.as_secs() / 60;
    format!("{}h{:02}m", mins / 60, mins % 60)
}
