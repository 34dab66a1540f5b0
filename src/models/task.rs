//! Search tasks and the lookback window.

use std::fmt;

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

/// One provider query: a search term in a location.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SearchTask {
    pub term: String,
    pub location: String,
}

impl SearchTask {
    pub fn new(term: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            location: location.into(),
        }
    }

    /// Every (term, location) pair, terms in the outer loop.
    pub fn cross_product(terms: &[String], locations: &[String]) -> Vec<Self> {
        terms
            .iter()
            .flat_map(|term| locations.iter().map(move |location| Self::new(term, location)))
            .collect()
    }
}

impl fmt::Display for SearchTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' in '{}'", self.term, self.location)
    }
}

/// Rolling lookback applied to every run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunWindow {
    pub lookback_days: u32,
}

impl RunWindow {
    pub fn new(lookback_days: u32) -> Self {
        Self { lookback_days }
    }

    /// Age limit handed to the provider.
    pub fn hours_old(&self) -> u32 {
        self.lookback_days.saturating_mul(24)
    }

    /// Oldest posted date still inside the window.
    pub fn cutoff(&self, today: NaiveDate) -> NaiveDate {
        today
            .checked_sub_days(Days::new(u64::from(self.lookback_days)))
            .unwrap_or(NaiveDate::MIN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cross_product_covers_every_pair() {
        let terms = vec!["Trainer".to_string(), "Instructional Designer".to_string()];
        let locations = vec![
            "Remote".to_string(),
            "Orlando, FL".to_string(),
            "Maitland, FL".to_string(),
        ];
        let tasks = SearchTask::cross_product(&terms, &locations);
        assert_eq!(tasks.len(), 6);
        assert_eq!(tasks[0], SearchTask::new("Trainer", "Remote"));
        assert_eq!(tasks[5], SearchTask::new("Instructional Designer", "Maitland, FL"));
    }

    #[test]
    fn window_math() {
        let window = RunWindow::new(30);
        assert_eq!(window.hours_old(), 720);
        let today = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
        assert_eq!(window.cutoff(today), NaiveDate::from_ymd_opt(2026, 9, 18).unwrap());
    }

    #[test]
    fn huge_window_saturates_instead_of_panicking() {
        let window = RunWindow::new(200_000_000);
        assert_eq!(window.hours_old(), u32::MAX);
        let today = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
        assert_eq!(window.cutoff(today), NaiveDate::MIN);
    }

    #[test]
    fn task_display() {
        let task = SearchTask::new("Corporate Trainer", "Remote");
        assert_eq!(task.to_string(), "'Corporate Trainer' in 'Remote'");
    }
}
