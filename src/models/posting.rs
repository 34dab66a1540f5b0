//! Job posting data structures.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use unicode_segmentation::UnicodeSegmentation;

use crate::error::AppError;

/// Seniority inferred from a job title.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Junior,
    Mid,
    Senior,
}

static SENIOR_TITLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b(senior|sr|lead|principal|manager|director|head|vp|vice president|chief|executive)\b",
    )
    .expect("static regex")
});

static JUNIOR_TITLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(junior|jr|entry|associate|assistant|intern|internship|trainee|coordinator)\b")
        .expect("static regex")
});

impl Level {
    /// Infer the level from a title. Senior wins over junior ("Senior Associate").
    ///
    /// Returns `None` for an empty title.
    pub fn infer(title: &str) -> Option<Self> {
        let title = title.trim().to_lowercase();
        if title.is_empty() {
            return None;
        }
        if SENIOR_TITLE.is_match(&title) {
            Some(Self::Senior)
        } else if JUNIOR_TITLE.is_match(&title) {
            Some(Self::Junior)
        } else {
            Some(Self::Mid)
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Junior => "junior",
            Self::Mid => "mid",
            Self::Senior => "senior",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "junior" => Ok(Self::Junior),
            "mid" => Ok(Self::Mid),
            "senior" => Ok(Self::Senior),
            other => Err(AppError::validation(format!(
                "unknown level '{other}' (expected junior, mid or senior)"
            ))),
        }
    }
}

/// Coarse L&D category, derived from title keywords.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    InstructionalDesign,
    TrainingDelivery,
    Enablement,
    OpsAnalytics,
    GeneralLd,
}

impl Category {
    /// Categorize by title, checking the most specific families first.
    pub fn infer(title: &str) -> Self {
        let title = title.to_lowercase();
        let has_any = |words: &[&str]| words.iter().any(|w| title.contains(w));

        if has_any(&["instructional", "curriculum", "elearning", "e-learning", "storyline"]) {
            Self::InstructionalDesign
        } else if has_any(&["trainer", "facilitation", "facilitator", "onboarding"]) {
            Self::TrainingDelivery
        } else if title.contains("enablement") {
            Self::Enablement
        } else if has_any(&["analyst", "lms", "ops", "admin"]) {
            Self::OpsAnalytics
        } else {
            Self::GeneralLd
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InstructionalDesign => "instructional_design",
            Self::TrainingDelivery => "training_delivery",
            Self::Enablement => "enablement",
            Self::OpsAnalytics => "ops_analytics",
            Self::GeneralLd => "general_ld",
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::InstructionalDesign => "Instructional Design",
            Self::TrainingDelivery => "Training Delivery",
            Self::Enablement => "Enablement",
            Self::OpsAnalytics => "Ops & Analytics",
            Self::GeneralLd => "General L&D",
        }
    }
}

impl FromStr for Category {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "instructional_design" => Ok(Self::InstructionalDesign),
            "training_delivery" => Ok(Self::TrainingDelivery),
            "enablement" => Ok(Self::Enablement),
            "ops_analytics" => Ok(Self::OpsAnalytics),
            "general_ld" => Ok(Self::GeneralLd),
            other => Err(AppError::validation(format!("unknown category '{other}'"))),
        }
    }
}

/// Advertised pay, as reported by the job board.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SalaryRange {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub currency: Option<String>,
    /// "yearly", "hourly", ...
    pub interval: Option<String>,
}

impl SalaryRange {
    /// Build a range, returning `None` when neither bound is known.
    pub fn new(
        min: Option<f64>,
        max: Option<f64>,
        currency: Option<String>,
        interval: Option<String>,
    ) -> Option<Self> {
        if min.is_none() && max.is_none() {
            return None;
        }
        Some(Self {
            min,
            max,
            currency,
            interval,
        })
    }
}

impl fmt::Display for SalaryRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self.currency.as_deref() {
            None | Some("USD") => "$".to_string(),
            Some(other) => format!("{other} "),
        };
        match (self.min, self.max) {
            (Some(min), Some(max)) if min != max => {
                write!(f, "{symbol}{min:.0} - {symbol}{max:.0}")?
            }
            (Some(amount), _) | (None, Some(amount)) => write!(f, "{symbol}{amount:.0}")?,
            (None, None) => return Ok(()),
        }
        if let Some(interval) = &self.interval {
            write!(f, " / {interval}")?;
        }
        Ok(())
    }
}

/// A validated job posting, ready for classification and storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Posting {
    pub title: String,

    /// Hiring company (empty when the board did not report one)
    pub company: String,

    pub location: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salary: Option<SalaryRange>,

    /// Canonical URL of the posting
    pub url: String,

    /// Job board the posting came from ("indeed", "linkedin", ...)
    pub source: String,

    /// Plain-text description or snippet
    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub level: Option<Level>,

    pub category: Category,

    #[serde(default)]
    pub posted: Option<NaiveDate>,
}

/// Legal suffixes dropped from company names before keying.
const COMPANY_SUFFIXES: &[&str] = &[
    "inc",
    "incorporated",
    "llc",
    "ltd",
    "limited",
    "corp",
    "corporation",
    "co",
    "company",
    "plc",
    "lp",
    "llp",
];

impl Posting {
    /// Identity key used for deduplication.
    ///
    /// Hex SHA-256 over the normalized `title|company|location` triple.
    pub fn identity_key(&self) -> String {
        identity_key(&self.title, &self.company, &self.location)
    }

    /// Whether the posting was published before `cutoff`. Undated postings never are.
    pub fn is_older_than(&self, cutoff: NaiveDate) -> bool {
        self.posted.is_some_and(|posted| posted < cutoff)
    }
}

/// Derive the identity key from the three identifying fields.
pub fn identity_key(title: &str, company: &str, location: &str) -> String {
    let material = format!(
        "{}|{}|{}",
        normalize_text(title),
        normalize_company(company),
        normalize_text(location)
    );
    hex::encode(Sha256::digest(material.as_bytes()))
}

/// Lowercase, fold `&amp;`, and keep only Unicode words separated by single spaces.
pub fn normalize_text(text: &str) -> String {
    words(text).join(" ")
}

/// Like [`normalize_text`] but also strips trailing legal suffixes.
pub fn normalize_company(company: &str) -> String {
    let mut words = words(company);
    while words.len() > 1
        && words
            .last()
            .is_some_and(|w| COMPANY_SUFFIXES.contains(&w.as_str()))
    {
        words.pop();
    }
    words.join(" ")
}

fn words(text: &str) -> Vec<String> {
    let folded = text.to_lowercase().replace("&amp;", "&");
    folded.unicode_words().map(String::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_posting() -> Posting {
        Posting {
            title: "Instructional Designer".to_string(),
            company: "Acme Learning, Inc.".to_string(),
            location: "Orlando, FL".to_string(),
            salary: SalaryRange::new(Some(65000.0), Some(80000.0), None, Some("yearly".into())),
            url: "https://www.indeed.com/viewjob?jk=abc123".to_string(),
            source: "indeed".to_string(),
            description: "Design e-learning courses.".to_string(),
            level: Level::infer("Instructional Designer"),
            category: Category::infer("Instructional Designer"),
            posted: NaiveDate::from_ymd_opt(2026, 10, 1),
        }
    }

    #[test]
    fn identity_key_ignores_case_punctuation_and_suffixes() {
        let a = identity_key("Instructional Designer", "Acme Learning, Inc.", "Orlando, FL");
        let b = identity_key("  instructional   designer ", "ACME Learning", "orlando fl");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn identity_key_separates_locations() {
        let orlando = identity_key("Corporate Trainer", "Acme", "Orlando, FL");
        let tampa = identity_key("Corporate Trainer", "Acme", "Tampa, FL");
        assert_ne!(orlando, tampa);
    }

    #[test]
    fn normalize_company_keeps_single_word_suffix_names() {
        assert_eq!(normalize_company("Company"), "company");
        assert_eq!(normalize_company("Learning Co."), "learning");
        assert_eq!(normalize_company("Smith &amp; Sons LLC"), "smith sons");
    }

    #[test]
    fn level_inference() {
        assert_eq!(Level::infer("Senior Instructional Designer"), Some(Level::Senior));
        assert_eq!(Level::infer("Training Manager"), Some(Level::Senior));
        assert_eq!(Level::infer("Head of L&D"), Some(Level::Senior));
        assert_eq!(Level::infer("Training Coordinator"), Some(Level::Junior));
        assert_eq!(Level::infer("Corporate Trainer"), Some(Level::Mid));
        assert_eq!(Level::infer("Headquarters Trainer"), Some(Level::Mid));
        assert_eq!(Level::infer("   "), None);
    }

    #[test]
    fn level_parses_case_insensitively() {
        assert_eq!("Senior".parse::<Level>().unwrap(), Level::Senior);
        assert!("management+".parse::<Level>().is_err());
    }

    #[test]
    fn category_inference_order() {
        assert_eq!(Category::infer("Curriculum Developer"), Category::InstructionalDesign);
        assert_eq!(Category::infer("Onboarding Trainer"), Category::TrainingDelivery);
        assert_eq!(Category::infer("Sales Enablement Lead"), Category::Enablement);
        assert_eq!(Category::infer("LMS Administrator"), Category::OpsAnalytics);
        assert_eq!(Category::infer("Learning Partner"), Category::GeneralLd);
        assert_eq!(
            Category::infer("Enablement Curriculum Manager"),
            Category::InstructionalDesign
        );
    }

    #[test]
    fn category_round_trips_through_str() {
        let category = Category::OpsAnalytics;
        assert_eq!(category.as_str().parse::<Category>().unwrap(), category);
    }

    #[test]
    fn salary_display() {
        let range = SalaryRange::new(Some(65000.0), Some(80000.0), None, Some("yearly".into()));
        assert_eq!(range.unwrap().to_string(), "$65000 - $80000 / yearly");
        let hourly = SalaryRange::new(Some(30.0), None, Some("USD".into()), Some("hourly".into()));
        assert_eq!(hourly.unwrap().to_string(), "$30 / hourly");
        assert!(SalaryRange::new(None, None, None, None).is_none());
    }

    #[test]
    fn stale_check_treats_undated_as_fresh() {
        let mut posting = sample_posting();
        let cutoff = NaiveDate::from_ymd_opt(2026, 10, 5).unwrap();
        assert!(posting.is_older_than(cutoff));
        posting.posted = None;
        assert!(!posting.is_older_than(cutoff));
    }

    #[test]
    fn posting_key_matches_free_function() {
        let posting = sample_posting();
        assert_eq!(
            posting.identity_key(),
            identity_key("Instructional Designer", "Acme Learning", "Orlando FL")
        );
    }
}
