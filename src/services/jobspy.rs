// src/services/jobspy.rs

//! HTTP adapter for a JobSpy-compatible job search API.
//!
//! One GET per search task; the provider fans out to the configured job
//! boards itself. Pagination and retries are left to the provider.

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;

use crate::error::{AppError, Result};
use crate::models::{Config, ProviderConfig, RawPosting, RunWindow, SearchTask};
use crate::services::{JobSource, PostingStream};
use crate::utils::http::create_async_client;

/// Response body: either `{"jobs": [...]}` or a bare array.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SearchResponse {
    Wrapped { jobs: Vec<Value> },
    Bare(Vec<Value>),
}

impl SearchResponse {
    fn into_items(self) -> Vec<Value> {
        match self {
            Self::Wrapped { jobs } => jobs,
            Self::Bare(jobs) => jobs,
        }
    }
}

/// Client for the search endpoint.
pub struct JobSpyClient {
    provider: ProviderConfig,
    results_wanted: u32,
    client: Client,
}

impl JobSpyClient {
    /// Create a new client with the given configuration.
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            provider: config.provider.clone(),
            results_wanted: config.search.results_wanted,
            client: create_async_client(&config.provider)?,
        })
    }

    async fn request(&self, task: &SearchTask, window: RunWindow) -> Result<String> {
        let sites = self.provider.sites.join(",");
        let hours_old = window.hours_old().to_string();
        let results_wanted = self.results_wanted.to_string();

        let mut request = self.client.get(&self.provider.endpoint).query(&[
            ("search_term", task.term.as_str()),
            ("location", task.location.as_str()),
            ("site_name", sites.as_str()),
            ("hours_old", hours_old.as_str()),
            ("results_wanted", results_wanted.as_str()),
            ("country_indeed", self.provider.country.as_str()),
        ]);
        if let Some(key) = &self.provider.api_key {
            request = request.header("x-api-key", key);
        }

        let resp = request.send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(AppError::provider(
                task.to_string(),
                format!("HTTP {}: {}", status.as_u16(), truncate(&body, 200)),
            ));
        }
        Ok(resp.text().await?)
    }
}

#[async_trait]
impl JobSource for JobSpyClient {
    async fn fetch(&self, task: &SearchTask, window: RunWindow) -> Result<PostingStream> {
        let context = task.to_string();
        log::debug!("Requesting {} (hours_old={})", context, window.hours_old());

        let body = self
            .request(task, window)
            .await
            .map_err(|e| match e {
                AppError::Provider { .. } => e,
                other => AppError::provider(&context, other),
            })?;

        let items = parse_body(&context, &body)?;
        log::debug!("Provider returned {} raw postings for {}", items.len(), context);
        Ok(into_stream(context, items))
    }
}

/// Decode the envelope. Individual items are decoded lazily by [`into_stream`].
fn parse_body(context: &str, body: &str) -> Result<Vec<Value>> {
    if body.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str::<SearchResponse>(body)
        .map(SearchResponse::into_items)
        .map_err(|e| AppError::provider(context, format!("malformed response: {e}")))
}

fn into_stream(context: String, items: Vec<Value>) -> PostingStream {
    stream::iter(items)
        .map(move |item| {
            serde_json::from_value::<RawPosting>(item)
                .map_err(|e| AppError::provider(&context, format!("malformed posting: {e}")))
        })
        .boxed()
}

fn truncate(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_wrapped_and_bare_bodies() {
        let wrapped = r#"{"count": 1, "jobs": [{"title": "Trainer", "job_url": "https://x.io/1"}]}"#;
        assert_eq!(parse_body("t", wrapped).unwrap().len(), 1);

        let bare = r#"[{"title": "A"}, {"title": "B"}]"#;
        assert_eq!(parse_body("t", bare).unwrap().len(), 2);

        assert!(parse_body("t", "  ").unwrap().is_empty());
    }

    #[test]
    fn test_parse_malformed_body_is_provider_error() {
        let err = parse_body("'Trainer' in 'Remote'", "<html>502 Bad Gateway</html>").unwrap_err();
        assert!(matches!(err, AppError::Provider { .. }));
        assert!(err.is_recoverable());
    }

    #[tokio::test]
    async fn test_stream_yields_error_for_malformed_item() {
        let items = vec![
            serde_json::json!({"title": "Trainer", "job_url": "https://x.io/1"}),
            serde_json::json!({"title": ["not", "a", "string"]}),
        ];
        let results: Vec<_> = into_stream("ctx".into(), items).collect().await;
        assert!(results[0].is_ok());
        assert!(matches!(results[1], Err(AppError::Provider { .. })));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_provider_error() {
        let mut config = Config::default();
        config.provider.endpoint = "http://127.0.0.1:1/api/v1/search_jobs".to_string();
        config.provider.timeout_secs = 2;
        let client = JobSpyClient::new(&config).unwrap();

        let result = client
            .fetch(&SearchTask::new("Corporate Trainer", "Remote"), config.window())
            .await;
        assert!(matches!(result, Err(AppError::Provider { .. })));
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("abcdef", 3), "abc...");
        assert_eq!(truncate("abc", 3), "abc");
    }
}
