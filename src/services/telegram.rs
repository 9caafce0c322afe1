// src/services/telegram.rs

//! Notification delivery.

use std::sync::Mutex;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::error::{AppError, Result};
use crate::models::{SourceConfig, TelegramConfig};
use crate::utils::http;

/// A channel that delivers one rendered message per call.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Channel name for logs.
    fn name(&self) -> &str;

    async fn send(&self, text: &str) -> Result<()>;
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

/// Telegram Bot API `sendMessage` in Markdown mode.
pub struct TelegramNotifier {
    client: Client,
    url: String,
    chat_id: String,
}

impl TelegramNotifier {
    pub fn new(config: &TelegramConfig, source: &SourceConfig) -> Result<Self> {
        if !config.is_configured() {
            return Err(AppError::config("telegram token and chat_id are required"));
        }

        Ok(Self {
            client: http::create_client(source)?,
            url: format!(
                "{}/bot{}/sendMessage",
                config.api_base.trim_end_matches('/'),
                config.token
            ),
            chat_id: config.chat_id.clone(),
        })
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    fn name(&self) -> &str {
        "telegram"
    }

    async fn send(&self, text: &str) -> Result<()> {
        let form = [
            ("chat_id", self.chat_id.as_str()),
            ("text", text),
            ("parse_mode", "Markdown"),
        ];

        // The URL embeds the bot token; keep it out of error messages.
        let response = self
            .client
            .post(&self.url)
            .form(&form)
            .send()
            .await
            .map_err(|e| AppError::notify(e.without_url()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AppError::notify(e.without_url()))?;

        match serde_json::from_str::<ApiResponse>(&body) {
            Ok(ApiResponse { ok: true, .. }) => Ok(()),
            Ok(ApiResponse { description, .. }) => Err(AppError::notify(format!(
                "status {status}: {}",
                description.unwrap_or_else(|| "no description".into())
            ))),
            Err(_) => Err(AppError::notify(format!("status {status}: unexpected response"))),
        }
    }
}

/// Logs messages instead of sending them.
#[derive(Debug, Default)]
pub struct DryRunNotifier {
    sent: Mutex<Vec<String>>,
}

impl DryRunNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages "sent" so far.
    pub fn messages(&self) -> Vec<String> {
        self.sent
            .lock()
            .map(|sent| sent.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl Notifier for DryRunNotifier {
    fn name(&self) -> &str {
        "dry-run"
    }

    async fn send(&self, text: &str) -> Result<()> {
        log::info!("[dry-run] would send:\n{text}");
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(text.to_string());
        }
        Ok(())
    }
}

/// Pick the delivery channel for a run.
///
/// Falls back to a dry run, with a warning, when credentials are missing.
pub fn build_notifier(
    config: &TelegramConfig,
    source: &SourceConfig,
    dry_run: bool,
) -> Result<Box<dyn Notifier>> {
    if dry_run {
        return Ok(Box::new(DryRunNotifier::new()));
    }
    if !config.is_configured() {
        log::warn!("TELEGRAM_TOKEN or TELEGRAM_CHAT_ID not set; messages will only be logged");
        return Ok(Box::new(DryRunNotifier::new()));
    }
    Ok(Box::new(TelegramNotifier::new(config, source)?))
}
