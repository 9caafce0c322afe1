// src/utils/http.rs

//! HTTP client utilities.

use std::time::Duration;

use crate::error::{AppError, Result};
use crate::models::SourceConfig;

/// Create a configured asynchronous HTTP client.
pub fn create_client(config: &SourceConfig) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .user_agent(&config.user_agent)
        .timeout(Duration::from_secs(config.timeout_secs))
        .danger_accept_invalid_certs(config.accept_invalid_certs)
        .build()?;
    Ok(client)
}

/// Fetch a page body, treating any non-success status as a fetch error.
pub async fn fetch_text(client: &reqwest::Client, url: &str) -> Result<String> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| AppError::fetch(url, e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(AppError::fetch(url, format!("status {status}")));
    }

    response.text().await.map_err(|e| AppError::fetch(url, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_client_from_defaults() {
        assert!(create_client(&SourceConfig::default()).is_ok());
    }

    #[tokio::test]
    async fn test_unreachable_host_is_fetch_error() {
        let config = SourceConfig {
            timeout_secs: 2,
            ..SourceConfig::default()
        };
        let client = create_client(&config).unwrap();

        let result = fetch_text(&client, "http://127.0.0.1:9/").await;
        assert!(matches!(result, Err(AppError::Fetch { .. })));
    }
}
