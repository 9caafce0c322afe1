//! Application configuration structures.

use std::fs;
use std::path::Path;

use chrono::{DateTime, FixedOffset, NaiveDate, Offset, Utc};
use scraper::Selector;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::Category;

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// HTTP fetch behavior shared by both paths
    #[serde(default)]
    pub source: SourceConfig,

    /// Academic calendar path
    #[serde(default)]
    pub calendar: CalendarConfig,

    /// Postings board path
    #[serde(default)]
    pub notices: NoticesConfig,

    /// Message delivery
    #[serde(default)]
    pub telegram: TelegramConfig,

    /// Headless browser fallback (disabled when absent)
    #[serde(default)]
    pub renderer: Option<RendererConfig>,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Apply overrides from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from a key lookup. Empty values are ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(token) = get("TELEGRAM_TOKEN") {
            self.telegram.token = token;
        }
        if let Some(chat_id) = get("TELEGRAM_CHAT_ID") {
            self.telegram.chat_id = chat_id;
        }
        if let Some(url) = get("CALENDAR_URL") {
            self.calendar.endpoint = url;
        }
        if let Some(url) = get("NOTICE_URL") {
            self.notices.endpoint = url;
        }
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.source.user_agent.trim().is_empty() {
            return Err(AppError::validation("source.user_agent is empty"));
        }
        if self.source.timeout_secs == 0 {
            return Err(AppError::validation("source.timeout_secs must be > 0"));
        }

        url::Url::parse(&self.calendar.endpoint)?;
        url::Url::parse(&self.notices.endpoint)?;

        if self.calendar.horizon_days < 0 {
            return Err(AppError::validation("calendar.horizon_days must be >= 0"));
        }
        if self.calendar.offset().is_none() {
            return Err(AppError::validation(
                "calendar.utc_offset_hours is out of range",
            ));
        }
        if self.calendar.strategies.is_empty() {
            return Err(AppError::validation("No calendar strategies defined"));
        }
        for strategy in &self.calendar.strategies {
            strategy.validate()?;
        }

        if self.notices.scan_limit == 0 {
            return Err(AppError::validation("notices.scan_limit must be > 0"));
        }
        if self.notices.row_selectors.is_empty() {
            return Err(AppError::validation("No notices.row_selectors defined"));
        }
        for selector in self
            .notices
            .row_selectors
            .iter()
            .chain([&self.notices.title_selector, &self.notices.info_selector])
        {
            parse_selector(selector)?;
        }
        if self.notices.snapshot_path.trim().is_empty() {
            return Err(AppError::validation("notices.snapshot_path is empty"));
        }

        if let Some(renderer) = &self.renderer {
            if renderer.command.trim().is_empty() {
                return Err(AppError::validation("renderer.command is empty"));
            }
            if renderer.timeout_secs == 0 {
                return Err(AppError::validation("renderer.timeout_secs must be > 0"));
            }
        }
        Ok(())
    }
}

/// Parse a CSS selector, mapping failures into `AppError`.
pub fn parse_selector(s: &str) -> Result<Selector> {
    Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
}

/// HTTP fetch settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Browser-identifying User-Agent header
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Skip TLS certificate verification (the origin serves a broken chain)
    #[serde(default = "defaults::accept_invalid_certs")]
    pub accept_invalid_certs: bool,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            accept_invalid_certs: defaults::accept_invalid_certs(),
        }
    }
}

/// Academic calendar settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarConfig {
    /// Calendar page URL
    #[serde(default = "defaults::calendar_endpoint")]
    pub endpoint: String,

    /// Maximum distance in days for an event to count as upcoming
    #[serde(default = "defaults::horizon_days")]
    pub horizon_days: i64,

    /// Maximum number of upcoming events reported
    #[serde(default = "defaults::upcoming_limit")]
    pub upcoming_limit: usize,

    /// Offset of the local calendar day used as "today"
    #[serde(default = "defaults::utc_offset_hours")]
    pub utc_offset_hours: i32,

    /// Digest heading
    #[serde(default = "defaults::calendar_heading")]
    pub heading: String,

    #[serde(default = "defaults::today_label")]
    pub today_label: String,

    #[serde(default = "defaults::upcoming_label")]
    pub upcoming_label: String,

    /// Substring expected in fully loaded markup; triggers the renderer when missing
    #[serde(default = "defaults::calendar_marker")]
    pub render_marker: Option<String>,

    /// Extraction strategies, tried in order
    #[serde(default = "defaults::calendar_strategies")]
    pub strategies: Vec<ExtractionStrategy>,
}

impl CalendarConfig {
    /// Configured UTC offset, `None` when out of range.
    pub fn offset(&self) -> Option<FixedOffset> {
        self.utc_offset_hours
            .checked_mul(3600)
            .and_then(FixedOffset::east_opt)
    }

    /// The local calendar day at `now`.
    pub fn today_at(&self, now: DateTime<Utc>) -> NaiveDate {
        let offset = self.offset().unwrap_or(Utc.fix());
        now.with_timezone(&offset).date_naive()
    }
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            endpoint: defaults::calendar_endpoint(),
            horizon_days: defaults::horizon_days(),
            upcoming_limit: defaults::upcoming_limit(),
            utc_offset_hours: defaults::utc_offset_hours(),
            heading: defaults::calendar_heading(),
            today_label: defaults::today_label(),
            upcoming_label: defaults::upcoming_label(),
            render_marker: defaults::calendar_marker(),
            strategies: defaults::calendar_strategies(),
        }
    }
}

/// How to turn a calendar page into text fragments.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExtractionStrategy {
    /// One item per `item` match, emitting its `date` text then its `title` text
    Structured {
        item: String,
        date: String,
        title: String,
    },
    /// Every block of visible text under `root`, in document order
    Flatten {
        #[serde(default = "defaults::flatten_root")]
        root: String,
    },
}

impl ExtractionStrategy {
    /// Short label for logs.
    pub fn describe(&self) -> String {
        match self {
            Self::Structured { item, .. } => format!("structured({item})"),
            Self::Flatten { root } => format!("flatten({root})"),
        }
    }

    fn validate(&self) -> Result<()> {
        match self {
            Self::Structured { item, date, title } => {
                parse_selector(item)?;
                parse_selector(date)?;
                parse_selector(title)?;
            }
            Self::Flatten { root } => {
                parse_selector(root)?;
            }
        }
        Ok(())
    }
}

/// Postings board settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoticesConfig {
    /// Board list URL
    #[serde(default = "defaults::notice_endpoint")]
    pub endpoint: String,

    /// Row selectors, tried in order until one matches
    #[serde(default = "defaults::row_selectors")]
    pub row_selectors: Vec<String>,

    /// Link element carrying the title, within a row
    #[serde(default = "defaults::title_selector")]
    pub title_selector: String,

    /// Secondary info element, within a row
    #[serde(default = "defaults::info_selector")]
    pub info_selector: String,

    /// Text tagging a row as recently added
    #[serde(default = "defaults::new_marker")]
    pub new_marker: String,

    /// Only the first N rows are scanned
    #[serde(default = "defaults::scan_limit")]
    pub scan_limit: usize,

    /// Labels stripped from titles
    #[serde(default = "defaults::title_remove_patterns")]
    pub title_remove_patterns: Vec<String>,

    /// Info tokens containing any of these are dropped
    #[serde(default = "defaults::meta_skip_keywords")]
    pub meta_skip_keywords: Vec<String>,

    /// Fingerprint file, relative to the storage directory
    #[serde(default = "defaults::snapshot_path")]
    pub snapshot_path: String,

    #[serde(default = "defaults::render_marker_notices")]
    pub render_marker: Option<String>,

    #[serde(default = "defaults::link_label")]
    pub link_label: String,

    #[serde(default = "defaults::default_icon")]
    pub default_icon: String,

    #[serde(default = "defaults::categories")]
    pub categories: Vec<Category>,
}

impl NoticesConfig {
    /// Clean a raw title: collapse whitespace and strip configured labels.
    pub fn clean_title(&self, raw: &str) -> String {
        let mut title = normalize_whitespace(raw);
        for pattern in &self.title_remove_patterns {
            title = title.replace(pattern.as_str(), "");
        }
        normalize_whitespace(&title)
    }

    /// Clean raw info text: drop view counters and short numbers, join the rest.
    pub fn clean_meta(&self, raw: &str) -> String {
        raw.split_whitespace()
            .filter(|part| {
                !self
                    .meta_skip_keywords
                    .iter()
                    .any(|k| part.contains(k.as_str()))
            })
            .filter(|part| !(part.len() < 6 && part.chars().all(|c| c.is_ascii_digit())))
            .collect::<Vec<_>>()
            .join(" | ")
    }
}

impl Default for NoticesConfig {
    fn default() -> Self {
        Self {
            endpoint: defaults::notice_endpoint(),
            row_selectors: defaults::row_selectors(),
            title_selector: defaults::title_selector(),
            info_selector: defaults::info_selector(),
            new_marker: defaults::new_marker(),
            scan_limit: defaults::scan_limit(),
            title_remove_patterns: defaults::title_remove_patterns(),
            meta_skip_keywords: defaults::meta_skip_keywords(),
            snapshot_path: defaults::snapshot_path(),
            render_marker: defaults::render_marker_notices(),
            link_label: defaults::link_label(),
            default_icon: defaults::default_icon(),
            categories: defaults::categories(),
        }
    }
}

/// Telegram Bot API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    #[serde(default = "defaults::telegram_api_base")]
    pub api_base: String,

    /// Bot token
    #[serde(default)]
    pub token: String,

    /// Recipient chat or channel id
    #[serde(default)]
    pub chat_id: String,
}

impl TelegramConfig {
    pub fn is_configured(&self) -> bool {
        !self.token.trim().is_empty() && !self.chat_id.trim().is_empty()
    }
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            api_base: defaults::telegram_api_base(),
            token: String::new(),
            chat_id: String::new(),
        }
    }
}

/// Headless browser used when a plain fetch misses the content marker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RendererConfig {
    /// Browser executable
    #[serde(default = "defaults::renderer_command")]
    pub command: String,

    /// Flags passed before the DOM dump flags
    #[serde(default = "defaults::renderer_args")]
    pub args: Vec<String>,

    /// Virtual time granted to page scripts, in milliseconds
    #[serde(default = "defaults::renderer_wait")]
    pub wait_ms: u64,

    /// Hard limit on the browser process
    #[serde(default = "defaults::renderer_timeout")]
    pub timeout_secs: u64,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            command: defaults::renderer_command(),
            args: defaults::renderer_args(),
            wait_ms: defaults::renderer_wait(),
            timeout_secs: defaults::renderer_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
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

fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

mod defaults {
    use super::{Category, ExtractionStrategy};

    // Source defaults
    pub fn user_agent() -> String {
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36".into()
    }
    pub fn timeout() -> u64 {
        30
    }
    pub fn accept_invalid_certs() -> bool {
        true
    }

    // Calendar defaults
    pub fn calendar_endpoint() -> String {
        "https://www.kw.ac.kr/ko/life/bachelor_calendar.jsp".into()
    }
    pub fn horizon_days() -> i64 {
        60
    }
    pub fn upcoming_limit() -> usize {
        2
    }
    pub fn utc_offset_hours() -> i32 {
        9
    }
    pub fn calendar_heading() -> String {
        "광운대 학사일정".into()
    }
    pub fn today_label() -> String {
        "오늘의 일정".into()
    }
    pub fn upcoming_label() -> String {
        "다가오는 일정".into()
    }
    pub fn calendar_marker() -> Option<String> {
        Some("schedule-list-box".into())
    }
    pub fn flatten_root() -> String {
        "body".into()
    }
    pub fn calendar_strategies() -> Vec<ExtractionStrategy> {
        vec![
            ExtractionStrategy::Structured {
                item: "div.schedule-list-box ul li".into(),
                date: "strong".into(),
                title: "p".into(),
            },
            ExtractionStrategy::Structured {
                item: "div.list ul li".into(),
                date: "strong".into(),
                title: "p".into(),
            },
            ExtractionStrategy::Flatten {
                root: flatten_root(),
            },
        ]
    }

    // Notices defaults
    pub fn notice_endpoint() -> String {
        "https://www.kw.ac.kr/ko/life/notice.jsp".into()
    }
    pub fn row_selectors() -> Vec<String> {
        vec![".board-list-box ul li".into(), "table.board-list tbody tr".into()]
    }
    pub fn title_selector() -> String {
        "div.board-text > a".into()
    }
    pub fn info_selector() -> String {
        "p.info".into()
    }
    pub fn new_marker() -> String {
        "신규게시글".into()
    }
    pub fn scan_limit() -> usize {
        50
    }
    pub fn title_remove_patterns() -> Vec<String> {
        vec!["신규게시글".into(), "Attachment".into()]
    }
    pub fn meta_skip_keywords() -> Vec<String> {
        vec!["조회".into()]
    }
    pub fn snapshot_path() -> String {
        "seen_postings.txt".into()
    }
    pub fn render_marker_notices() -> Option<String> {
        Some("board-list-box".into())
    }
    pub fn link_label() -> String {
        "👉 공지 바로가기".into()
    }
    pub fn default_icon() -> String {
        "📢".into()
    }
    pub fn categories() -> Vec<Category> {
        vec![
            Category::new("💰", &["장학", "대출"]),
            Category::new("📅", &["학사", "수업", "복학"]),
            Category::new("🎉", &["행사", "축제", "특강"]),
            Category::new("👔", &["채용", "모집", "인턴"]),
            Category::new("✈️", &["국제", "교환"]),
            Category::new("❤️", &["봉사"]),
            Category::new("🏆", &["대회", "공모"]),
        ]
    }

    // Delivery defaults
    pub fn telegram_api_base() -> String {
        "https://api.telegram.org".into()
    }

    // Renderer defaults
    pub fn renderer_command() -> String {
        "chromium".into()
    }
    pub fn renderer_args() -> Vec<String> {
        vec![
            "--headless=new".into(),
            "--disable-gpu".into(),
            "--no-sandbox".into(),
        ]
    }
    pub fn renderer_wait() -> u64 {
        10_000
    }
    pub fn renderer_timeout() -> u64 {
        60
    }

    pub fn log_level() -> String {
        "info".into()
    }
}
