//! Raw posting records as returned by the job search provider.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::{Category, Level, Posting, SalaryRange};
use crate::utils::html::strip_html;
use crate::utils::url::{canonical_url, source_from_url};

/// An unvalidated posting straight off the wire.
///
/// Field names follow the JobSpy result columns.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawPosting {
    #[serde(default)]
    pub site: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub job_url: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// `YYYY-MM-DD`, RFC 3339, or epoch milliseconds
    #[serde(default)]
    pub date_posted: Option<Value>,
    #[serde(default)]
    pub min_amount: Option<Value>,
    #[serde(default)]
    pub max_amount: Option<Value>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub interval: Option<String>,
}

impl RawPosting {
    /// Validate and normalize into a [`Posting`].
    ///
    /// Returns `None` when the record has no usable title or URL.
    pub fn normalize(&self) -> Option<Posting> {
        let title = non_empty(self.title.as_deref())?;
        let url = canonical_url(non_empty(self.job_url.as_deref())?.as_str())?;

        let source = non_empty(self.site.as_deref())
            .map(|s| s.to_lowercase())
            .or_else(|| source_from_url(&url))
            .unwrap_or_else(|| "unknown".to_string());

        let description = self
            .description
            .as_deref()
            .map(strip_html)
            .unwrap_or_default();

        let salary = SalaryRange::new(
            self.min_amount.as_ref().and_then(parse_amount),
            self.max_amount.as_ref().and_then(parse_amount),
            non_empty(self.currency.as_deref()),
            non_empty(self.interval.as_deref()).map(|s| s.to_lowercase()),
        );

        Some(Posting {
            level: Level::infer(&title),
            category: Category::infer(&title),
            company: non_empty(self.company.as_deref()).unwrap_or_default(),
            location: non_empty(self.location.as_deref()).unwrap_or_default(),
            posted: self.date_posted.as_ref().and_then(parse_date),
            title,
            salary,
            url,
            source,
            description,
        })
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    let trimmed = value?.split_whitespace().collect::<Vec<_>>().join(" ");
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("nan") {
        None
    } else {
        Some(trimmed)
    }
}

fn parse_amount(value: &Value) -> Option<f64> {
    let amount = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.replace([',', '$'], "").trim().parse::<f64>().ok(),
        _ => None,
    };
    amount.filter(|amount| amount.is_finite() && *amount > 0.0)
}

fn parse_date(value: &Value) -> Option<NaiveDate> {
    match value {
        Value::String(s) => {
            let s = s.trim();
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .or_else(|| {
                    DateTime::parse_from_rfc3339(s)
                        .ok()
                        .map(|dt| dt.with_timezone(&Utc).date_naive())
                })
                .or_else(|| s.get(..10).and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok()))
        }
        Value::Number(n) => n
            .as_i64()
            .and_then(|ms| Utc.timestamp_millis_opt(ms).single())
            .map(|dt| dt.date_naive()),
        _ => None,
    }
}
