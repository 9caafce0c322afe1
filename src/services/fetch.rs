// src/services/fetch.rs

//! Raw content providers.
//!
//! A plain HTTPS GET is tried first. When a renderer is configured, a failed
//! fetch or a page missing its content marker is retried through a headless
//! browser that executes the page's scripts and dumps the resulting DOM.

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tokio::process::Command;

use crate::error::{AppError, Result};
use crate::models::{RendererConfig, SourceConfig};
use crate::utils::http;

/// Something that can produce the markup behind a URL.
#[async_trait]
pub trait ContentProvider: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &str;

    /// Return the page markup.
    async fn fetch(&self, url: &str) -> Result<String>;
}

/// Plain HTTP GET.
pub struct HttpProvider {
    client: Client,
}

impl HttpProvider {
    pub fn new(config: &SourceConfig) -> Result<Self> {
        Ok(Self {
            client: http::create_client(config)?,
        })
    }
}

#[async_trait]
impl ContentProvider for HttpProvider {
    fn name(&self) -> &str {
        "http"
    }

    async fn fetch(&self, url: &str) -> Result<String> {
        log::debug!("GET {url}");
        let body = http::fetch_text(&self.client, url).await?;
        log::debug!("Received {} bytes from {url}", body.len());
        Ok(body)
    }
}

/// Headless browser that prints the rendered DOM on stdout.
pub struct HeadlessRenderer {
    config: RendererConfig,
    user_agent: String,
}

impl HeadlessRenderer {
    pub fn new(config: RendererConfig, user_agent: impl Into<String>) -> Self {
        Self {
            config,
            user_agent: user_agent.into(),
        }
    }

    fn command(&self, url: &str) -> Command {
        let mut cmd = Command::new(&self.config.command);
        cmd.args(&self.config.args)
            .arg(format!("--user-agent={}", self.user_agent))
            .arg(format!("--virtual-time-budget={}", self.config.wait_ms))
            .arg("--dump-dom")
            .arg(url)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }
}

#[async_trait]
impl ContentProvider for HeadlessRenderer {
    fn name(&self) -> &str {
        "renderer"
    }

    async fn fetch(&self, url: &str) -> Result<String> {
        log::info!("Rendering {url} with {}", self.config.command);
        let limit = Duration::from_secs(self.config.timeout_secs);

        let output = tokio::time::timeout(limit, self.command(url).output())
            .await
            .map_err(|_| AppError::fetch(url, format!("renderer timed out after {limit:?}")))?
            .map_err(|e| AppError::fetch(url, format!("cannot run {}: {e}", self.config.command)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(AppError::fetch(
                url,
                format!("renderer exited with {}: {}", output.status, stderr.trim()),
            ));
        }

        let dom = String::from_utf8_lossy(&output.stdout).into_owned();
        if dom.trim().is_empty() {
            return Err(AppError::fetch(url, "renderer produced no output"));
        }
        Ok(dom)
    }
}

/// Primary provider with an optional rendering retry.
pub struct FallbackProvider {
    primary: Box<dyn ContentProvider>,
    renderer: Option<Box<dyn ContentProvider>>,
    marker: Option<String>,
}

impl FallbackProvider {
    pub fn new(
        primary: Box<dyn ContentProvider>,
        renderer: Option<Box<dyn ContentProvider>>,
        marker: Option<String>,
    ) -> Self {
        Self {
            primary,
            renderer,
            marker,
        }
    }

    /// Build the standard HTTP-then-renderer chain from configuration.
    pub fn from_config(
        source: &SourceConfig,
        renderer: Option<&RendererConfig>,
        marker: Option<String>,
    ) -> Result<Self> {
        let primary = Box::new(HttpProvider::new(source)?);
        let renderer = renderer.map(|r| {
            Box::new(HeadlessRenderer::new(r.clone(), &source.user_agent))
                as Box<dyn ContentProvider>
        });
        Ok(Self::new(primary, renderer, marker))
    }

    fn has_marker(&self, markup: &str) -> bool {
        self.marker
            .as_deref()
            .is_none_or(|marker| markup.contains(marker))
    }
}

#[async_trait]
impl ContentProvider for FallbackProvider {
    fn name(&self) -> &str {
        self.primary.name()
    }

    async fn fetch(&self, url: &str) -> Result<String> {
        let primary = self.primary.fetch(url).await;

        let Some(renderer) = &self.renderer else {
            return primary;
        };

        match primary {
            Ok(markup) if self.has_marker(&markup) => return Ok(markup),
            Ok(_) => log::info!(
                "Content marker {:?} missing from {url}; retrying with {}",
                self.marker.as_deref().unwrap_or_default(),
                renderer.name()
            ),
            Err(e) => log::warn!("{} failed: {e}; retrying with {}", self.primary.name(), renderer.name()),
        }

        let rendered = renderer.fetch(url).await?;
        if !self.has_marker(&rendered) {
            log::warn!(
                "Content marker {:?} still missing after rendering {url}; using markup as-is",
                self.marker.as_deref().unwrap_or_default()
            );
        }
        Ok(rendered)
    }
}
