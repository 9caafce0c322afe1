// src/services/notices.rs

//! Posting extraction from the notice board list page.
//!
//! Only rows carrying the board's "new posting" marker are kept. Which rows
//! are considered at all is bounded by the configured scan limit.

use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::error::{AppError, Result};
use crate::models::config::parse_selector;
use crate::models::{NoticesConfig, Posting};
use crate::utils::resolve_url;

/// Extracts marked postings from a board list page.
pub struct PostingExtractor<'a> {
    config: &'a NoticesConfig,
    row_selectors: Vec<(&'a str, Selector)>,
    title_sel: Selector,
    info_sel: Selector,
    base_url: Url,
}

impl<'a> PostingExtractor<'a> {
    /// Create an extractor, compiling all selectors up front.
    pub fn new(config: &'a NoticesConfig) -> Result<Self> {
        let row_selectors = config
            .row_selectors
            .iter()
            .map(|s| -> Result<(&'a str, Selector)> { Ok((s.as_str(), parse_selector(s)?)) })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            config,
            row_selectors,
            title_sel: parse_selector(&config.title_selector)?,
            info_sel: parse_selector(&config.info_selector)?,
            base_url: Url::parse(&config.endpoint)?,
        })
    }

    /// Extract the marked postings from `html`, in page order.
    ///
    /// A page where no row selector matches at all is a structural error. A
    /// page with rows but none marked new yields an empty list.
    pub fn extract(&self, html: &str) -> Result<Vec<Posting>> {
        let document = Html::parse_document(html);

        let Some((name, rows)) = self.row_selectors.iter().find_map(|(name, sel)| {
            let rows: Vec<ElementRef<'_>> = document.select(sel).collect();
            (!rows.is_empty()).then_some((*name, rows))
        }) else {
            return Err(AppError::structural(format!(
                "no board rows matched any of {:?}",
                self.config.row_selectors
            )));
        };

        log::info!(
            "Scanning {} of {} rows ({name})",
            rows.len().min(self.config.scan_limit),
            rows.len()
        );

        let postings: Vec<Posting> = rows
            .into_iter()
            .take(self.config.scan_limit)
            .filter_map(|row| self.parse_row(row))
            .collect();

        log::info!("{} rows carry the new-posting marker", postings.len());
        Ok(postings)
    }

    fn parse_row(&self, row: ElementRef<'_>) -> Option<Posting> {
        let row_text: String = row.text().collect();
        if !row_text.contains(&self.config.new_marker) {
            return None;
        }

        let Some(title_elem) = row.select(&self.title_sel).next() else {
            log::debug!("Marked row without a title link, skipping");
            return None;
        };

        let raw_title: String = title_elem.text().collect();
        let title = self.config.clean_title(&raw_title);
        if title.is_empty() {
            return None;
        }

        let link = title_elem
            .value()
            .attr("href")
            .map(str::trim)
            .filter(|href| !href.is_empty())
            .map_or_else(
                || self.config.endpoint.clone(),
                |href| resolve_url(&self.base_url, href),
            );

        let meta = row
            .select(&self.info_sel)
            .next()
            .map(|info| {
                let raw = info.text().collect::<Vec<_>>().join(" ");
                self.config.clean_meta(&raw)
            })
            .unwrap_or_default();

        Some(Posting { title, link, meta })
    }
}
