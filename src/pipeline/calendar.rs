// src/pipeline/calendar.rs

//! Calendar digest pipeline.

use chrono::{Datelike, NaiveDate};

use crate::error::Result;
use crate::models::Config;
use crate::pipeline::assemble::EventAssembler;
use crate::pipeline::dates::DateRangeParser;
use crate::pipeline::window::WindowClassifier;
use crate::services::{ContentProvider, Notifier, TextLineExtractor, format};
use crate::utils::log::{header, summary};

/// What one calendar run found and did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CalendarReport {
    pub events: usize,
    pub active_today: usize,
    pub upcoming: usize,
    pub sent: bool,
}

/// Run the calendar path for `today`.
///
/// Fetch and extraction failures abort the run. A delivery failure is logged
/// and reported through `CalendarReport::sent`.
pub async fn run_calendar(
    config: &Config,
    provider: &dyn ContentProvider,
    notifier: &dyn Notifier,
    today: NaiveDate,
) -> Result<CalendarReport> {
    header(&format!("Calendar digest for {today}"));

    let html = provider.fetch(&config.calendar.endpoint).await?;

    let extractor = TextLineExtractor::new(&config.calendar.strategies)?;
    let assembler = EventAssembler::new(DateRangeParser::new(today.year()));
    let events = extractor.extract_events(&html, &assembler)?;

    let window = WindowClassifier::new(config.calendar.horizon_days, config.calendar.upcoming_limit)
        .classify(today, &events);

    let mut report = CalendarReport {
        events: events.len(),
        active_today: window.active_today.len(),
        upcoming: window.upcoming.len(),
        sent: false,
    };

    match format::calendar_digest(&config.calendar, today, &window) {
        None => log::info!("Nothing to report for {today}"),
        Some(text) => match notifier.send(&text).await {
            Ok(()) => report.sent = true,
            Err(e) if e.is_run_fatal() => return Err(e),
            Err(e) => log::error!("Digest delivery via {} failed: {e}", notifier.name()),
        },
    }

    summary(
        "Calendar",
        &[
            ("Events parsed", report.events.to_string()),
            ("Active today", report.active_today.to_string()),
            ("Upcoming", report.upcoming.to_string()),
            ("Digest sent", report.sent.to_string()),
        ],
    );

    Ok(report)
}
