// src/utils/http.rs

//! HTTP client utilities.

use std::time::Duration;

use crate::error::Result;
use crate::models::ProviderConfig;

/// Create a configured asynchronous HTTP client.
///
/// The timeout bounds every provider call so a stuck request only costs
/// the task it belongs to.
pub fn create_async_client(config: &ProviderConfig) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .user_agent(&config.user_agent)
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()?;
    Ok(client)
}
