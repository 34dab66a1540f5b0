//! Application configuration structures.

use std::fs;
use std::path::Path;

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::{RunWindow, SearchTask};

/// Longest accepted lookback window.
pub const MAX_LOOKBACK_DAYS: u32 = 365;

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Search terms, locations and lookback
    #[serde(default)]
    pub search: SearchConfig,

    /// Job search provider settings
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Role relevance keyword lists
    #[serde(default)]
    pub classifier: ClassifierConfig,

    /// Database location
    #[serde(default)]
    pub storage: StorageConfig,

    /// Daily trigger
    #[serde(default)]
    pub schedule: ScheduleConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load and validate configuration, keeping `fallback` if either fails.
    pub fn reload_or(path: impl AsRef<Path>, fallback: &Config) -> Self {
        let loaded = Self::load(&path).and_then(|config| {
            config.validate()?;
            Ok(config)
        });
        loaded.unwrap_or_else(|e| {
            log::warn!(
                "Config reload failed from {:?}: {}. Keeping previous config.",
                path.as_ref(),
                e
            );
            fallback.clone()
        })
    }

    /// All search tasks for one run.
    pub fn tasks(&self) -> Vec<SearchTask> {
        SearchTask::cross_product(&self.search.terms, &self.search.locations)
    }

    pub fn window(&self) -> RunWindow {
        RunWindow::new(self.search.lookback_days)
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.search.terms.iter().all(|t| t.trim().is_empty()) {
            return Err(AppError::validation("No search terms defined"));
        }
        if self.search.locations.iter().all(|l| l.trim().is_empty()) {
            return Err(AppError::validation("No locations defined"));
        }
        if self.search.lookback_days == 0 || self.search.lookback_days > MAX_LOOKBACK_DAYS {
            return Err(AppError::validation(format!(
                "search.lookback_days must be between 1 and {MAX_LOOKBACK_DAYS}"
            )));
        }
        if self.search.results_wanted == 0 {
            return Err(AppError::validation("search.results_wanted must be > 0"));
        }
        if self.provider.endpoint.trim().is_empty() {
            return Err(AppError::validation("provider.endpoint is empty"));
        }
        url::Url::parse(&self.provider.endpoint)
            .map_err(|e| AppError::validation(format!("provider.endpoint is invalid: {e}")))?;
        if self.provider.sites.is_empty() {
            return Err(AppError::validation("provider.sites is empty"));
        }
        if self.provider.user_agent.trim().is_empty() {
            return Err(AppError::validation("provider.user_agent is empty"));
        }
        if self.provider.timeout_secs == 0 {
            return Err(AppError::validation("provider.timeout_secs must be > 0"));
        }
        if self.classifier.allow_keywords.is_empty() {
            return Err(AppError::validation("classifier.allow_keywords is empty"));
        }
        if self.storage.database_file.trim().is_empty() {
            return Err(AppError::validation("storage.database_file is empty"));
        }
        self.schedule.daily_time()?;
        Ok(())
    }
}

/// Which searches to run each day.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "defaults::terms")]
    pub terms: Vec<String>,

    #[serde(default = "defaults::locations")]
    pub locations: Vec<String>,

    /// Maximum posting age in days
    #[serde(default = "defaults::lookback_days")]
    pub lookback_days: u32,

    /// Results requested per search task
    #[serde(default = "defaults::results_wanted")]
    pub results_wanted: u32,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            terms: defaults::terms(),
            locations: defaults::locations(),
            lookback_days: defaults::lookback_days(),
            results_wanted: defaults::results_wanted(),
        }
    }
}

/// HTTP settings for the JobSpy-compatible search endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default = "defaults::endpoint")]
    pub endpoint: String,

    /// Sent as `x-api-key` when present
    #[serde(default)]
    pub api_key: Option<String>,

    /// Job boards to query
    #[serde(default = "defaults::sites")]
    pub sites: Vec<String>,

    #[serde(default = "defaults::country")]
    pub country: String,

    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Delay between search tasks in milliseconds
    #[serde(default = "defaults::request_delay")]
    pub request_delay_ms: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            endpoint: defaults::endpoint(),
            api_key: None,
            sites: defaults::sites(),
            country: defaults::country(),
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            request_delay_ms: defaults::request_delay(),
        }
    }
}

/// Keyword lists for the role classifier. Matching is case-insensitive.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Role-family terms; one hit in title or description makes a posting relevant
    #[serde(default = "defaults::allow_keywords")]
    pub allow_keywords: Vec<String>,

    /// Title terms that reject a posting outright
    #[serde(default = "defaults::deny_title_keywords")]
    pub deny_title_keywords: Vec<String>,

    /// Title terms that need corroboration from `guarded_require_any`
    #[serde(default = "defaults::guarded_terms")]
    pub guarded_terms: Vec<String>,

    /// Title terms that reject a posting whose title holds a guarded term
    #[serde(default = "defaults::guarded_deny_title")]
    pub guarded_deny_title: Vec<String>,

    #[serde(default = "defaults::guarded_require_any")]
    pub guarded_require_any: Vec<String>,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            allow_keywords: defaults::allow_keywords(),
            deny_title_keywords: defaults::deny_title_keywords(),
            guarded_terms: defaults::guarded_terms(),
            guarded_deny_title: defaults::guarded_deny_title(),
            guarded_require_any: defaults::guarded_require_any(),
        }
    }
}

/// Database settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// SQLite file, relative to the storage directory
    #[serde(default = "defaults::database_file")]
    pub database_file: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_file: defaults::database_file(),
        }
    }
}

/// Daily trigger settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// `HH:MM`, UTC
    #[serde(default = "defaults::daily_at_utc")]
    pub daily_at_utc: String,
}

impl ScheduleConfig {
    /// Parse the configured wall-clock time.
    pub fn daily_time(&self) -> Result<NaiveTime> {
        NaiveTime::parse_from_str(self.daily_at_utc.trim(), "%H:%M").map_err(|e| {
            AppError::validation(format!(
                "schedule.daily_at_utc '{}' is not HH:MM: {e}",
                self.daily_at_utc
            ))
        })
    }
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            daily_at_utc: defaults::daily_at_utc(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter when RUST_LOG is unset
    #[serde(default = "defaults::log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::log_level(),
        }
    }
}

mod defaults {
    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    // Search defaults
    pub fn terms() -> Vec<String> {
        strings(&[
            "Learning and Development",
            "Instructional Designer",
            "Corporate Trainer",
            "Sales Enablement",
            "Talent Development",
        ])
    }
    pub fn locations() -> Vec<String> {
        strings(&[
            "Remote",
            "United States",
            // Central Florida
            "Orlando, FL",
            "Maitland, FL",
            "Altamonte Springs, FL",
            "Winter Park, FL",
            "Lake Mary, FL",
            "Sanford, FL",
            "Kissimmee, FL",
            "Daytona Beach, FL",
            "Melbourne, FL",
            "Lakeland, FL",
            "Ocala, FL",
            // Rest of Florida
            "Tampa, FL",
            "St. Petersburg, FL",
            "Clearwater, FL",
            "Sarasota, FL",
            "Fort Myers, FL",
            "Naples, FL",
            "Miami, FL",
            "Fort Lauderdale, FL",
            "West Palm Beach, FL",
            "Boca Raton, FL",
            "Jacksonville, FL",
            "Gainesville, FL",
            "Tallahassee, FL",
            "Pensacola, FL",
            // Major US metros
            "Atlanta, GA",
            "Charlotte, NC",
            "Raleigh, NC",
            "Nashville, TN",
            "Dallas, TX",
            "Austin, TX",
            "Houston, TX",
            "Chicago, IL",
            "Minneapolis, MN",
            "Denver, CO",
            "Phoenix, AZ",
            "New York, NY",
            "Boston, MA",
            "Philadelphia, PA",
            "Washington, DC",
            "Seattle, WA",
            "San Francisco, CA",
            "Los Angeles, CA",
            "San Diego, CA",
        ])
    }
    pub fn lookback_days() -> u32 {
        30
    }
    pub fn results_wanted() -> u32 {
        20
    }

    // Provider defaults
    pub fn endpoint() -> String {
        "http://localhost:8000/api/v1/search_jobs".into()
    }
    pub fn sites() -> Vec<String> {
        strings(&["indeed", "linkedin", "glassdoor"])
    }
    pub fn country() -> String {
        "USA".into()
    }
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; jobboard/0.1)".into()
    }
    pub fn timeout() -> u64 {
        60
    }
    pub fn request_delay() -> u64 {
        1000
    }

    // Classifier defaults
    pub fn allow_keywords() -> Vec<String> {
        strings(&[
            "learning",
            "l&d",
            "instructional",
            "trainer",
            "training",
            "enablement",
            "curriculum",
            "facilitator",
            "facilitation",
            "talent development",
            "organizational development",
            "e-learning",
            "elearning",
            "onboarding",
        ])
    }
    pub fn deny_title_keywords() -> Vec<String> {
        Vec::new()
    }
    pub fn guarded_terms() -> Vec<String> {
        strings(&["enablement"])
    }
    pub fn guarded_deny_title() -> Vec<String> {
        strings(&[
            "deal desk",
            "revops",
            "revenue operations",
            "sales operations",
            "crm admin",
            "salesforce",
            "quota",
            "pipeline",
            "forecasting",
        ])
    }
    pub fn guarded_require_any() -> Vec<String> {
        strings(&[
            "training",
            "learning",
            "facilitation",
            "coaching",
            "onboarding",
            "curriculum",
            "content",
            "instructional",
            "development",
        ])
    }

    // Storage defaults
    pub fn database_file() -> String {
        "jobs.db".into()
    }

    // Schedule defaults
    pub fn daily_at_utc() -> String {
        "09:00".into()
    }

    pub fn log_level() -> String {
        "info".into()
    }
}
