// src/models/mod.rs

//! Domain models for the job board.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod config;
mod posting;
mod raw;
mod specialty;
mod stored;
mod task;

// Re-export all public types
pub use config::{
    ClassifierConfig, Config, LoggingConfig, ProviderConfig, ScheduleConfig, SearchConfig,
    StorageConfig,
};
pub use posting::{
    Category, Level, Posting, SalaryRange, identity_key, normalize_company, normalize_text,
};
pub use raw::RawPosting;
pub use specialty::{SPECIALTIES, Specialty, SpecialtyCount, count_specialties};
pub use stored::StoredPosting;
pub use task::{RunWindow, SearchTask};
