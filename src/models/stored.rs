//! Rows read back from the job store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::Posting;

/// A persisted posting with its storage metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredPosting {
    pub id: i64,
    pub identity_key: String,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub posting: Posting,
}

impl StoredPosting {
    /// Format for terminal output using a template.
    ///
    /// Supported placeholders:
    /// - `{id}`, `{title}`, `{company}`, `{location}`, `{level}`
    /// - `{category}`, `{salary}`, `{source}`, `{posted}`, `{url}`
    pub fn format(&self, template: &str) -> String {
        let p = &self.posting;
        template
            .replace("{id}", &self.id.to_string())
            .replace("{title}", &p.title)
            .replace("{company}", &p.company)
            .replace("{location}", &p.location)
            .replace("{level}", p.level.map_or("-", |l| l.as_str()))
            .replace("{category}", p.category.label())
            .replace(
                "{salary}",
                &p.salary.as_ref().map(|s| s.to_string()).unwrap_or_default(),
            )
            .replace("{source}", &p.source)
            .replace(
                "{posted}",
                &p.posted.map(|d| d.to_string()).unwrap_or_default(),
            )
            .replace("{url}", &p.url)
    }
}
