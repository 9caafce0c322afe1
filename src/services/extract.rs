// src/services/extract.rs

//! Calendar text extraction.
//!
//! Markup is reduced to an ordered list of text fragments by one of several
//! strategies, and the fragments are handed to the [`EventAssembler`].
//! Strategies are tried in configured order; the first one that yields at
//! least one event wins.

use scraper::{ElementRef, Html, Selector};

use crate::error::{AppError, Result};
use crate::models::config::parse_selector;
use crate::models::{Event, ExtractionStrategy};
use crate::pipeline::assemble::{EventAssembler, meaningful_len};

/// Elements whose text is never content.
const SKIPPED: &[&str] = &["script", "style", "noscript", "head", "template", "svg"];

/// Elements that start a new fragment.
const BLOCKS: &[&str] = &[
    "li", "p", "td", "th", "dt", "dd", "div", "tr", "section", "article", "h1", "h2", "h3",
    "h4", "h5", "h6",
];

enum Compiled {
    Structured {
        item: Selector,
        date: Selector,
        title: Selector,
    },
    Flatten {
        root: Selector,
    },
}

/// Turns calendar markup into fragments, trying each strategy in turn.
pub struct TextLineExtractor {
    strategies: Vec<(String, Compiled)>,
}

impl TextLineExtractor {
    /// Compile the configured strategies.
    pub fn new(strategies: &[ExtractionStrategy]) -> Result<Self> {
        let strategies = strategies
            .iter()
            .map(|strategy| -> Result<(String, Compiled)> {
                let compiled = match strategy {
                    ExtractionStrategy::Structured { item, date, title } => Compiled::Structured {
                        item: parse_selector(item)?,
                        date: parse_selector(date)?,
                        title: parse_selector(title)?,
                    },
                    ExtractionStrategy::Flatten { root } => Compiled::Flatten {
                        root: parse_selector(root)?,
                    },
                };
                Ok((strategy.describe(), compiled))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { strategies })
    }

    /// Extract events from `html` with the first productive strategy.
    ///
    /// Fails with `AppError::StructuralParse` when every strategy comes up
    /// empty.
    pub fn extract_events(&self, html: &str, assembler: &EventAssembler) -> Result<Vec<Event>> {
        let document = Html::parse_document(html);

        for (name, strategy) in &self.strategies {
            let fragments = Self::fragments(&document, strategy);
            let events = assembler.assemble(&fragments);
            if events.is_empty() {
                log::debug!("Strategy {name}: {} fragments, no events", fragments.len());
                continue;
            }
            log::info!(
                "Strategy {name}: {} events from {} fragments",
                events.len(),
                fragments.len()
            );
            return Ok(events);
        }

        Err(AppError::structural(format!(
            "no events from any of {} extraction strategies",
            self.strategies.len()
        )))
    }

    fn fragments(document: &Html, strategy: &Compiled) -> Vec<String> {
        match strategy {
            Compiled::Structured { item, date, title } => document
                .select(item)
                .filter_map(|row| {
                    let date = first_text(row, date)?;
                    let title = first_text(row, title)?;
                    Some([date, title])
                })
                .flatten()
                .collect(),
            Compiled::Flatten { root } => document
                .select(root)
                .next()
                .map(flatten)
                .unwrap_or_default(),
        }
    }
}

/// Collapsed text of the first match of `selector` under `row`, if non-empty.
fn first_text(row: ElementRef<'_>, selector: &Selector) -> Option<String> {
    let text = normalize(&row.select(selector).next()?.text().collect::<String>());
    (!text.is_empty()).then_some(text)
}

/// Flatten everything under `root` into text fragments in document order.
///
/// Adjacent text nodes belonging to the same nearest block element are
/// joined into one fragment. Fragments without a single letter or digit are
/// dropped.
pub fn flatten(root: ElementRef<'_>) -> Vec<String> {
    let mut fragments = Vec::new();
    let mut buffer = String::new();
    let mut current = None;

    'nodes: for node in root.descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };

        let mut block = root.id();
        for ancestor in node.ancestors() {
            let Some(element) = ancestor.value().as_element() else {
                continue;
            };
            if SKIPPED.contains(&element.name()) {
                continue 'nodes;
            }
            if block == root.id() && BLOCKS.contains(&element.name()) {
                block = ancestor.id();
            }
            if ancestor.id() == root.id() {
                break;
            }
        }

        if current != Some(block) {
            push_fragment(&mut fragments, &mut buffer);
            current = Some(block);
        }
        buffer.push(' ');
        buffer.push_str(text);
    }
    push_fragment(&mut fragments, &mut buffer);

    fragments
}

fn push_fragment(fragments: &mut Vec<String>, buffer: &mut String) {
    let text = normalize(buffer);
    buffer.clear();
    if meaningful_len(&text) > 0 {
        fragments.push(text);
    }
}

fn normalize(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
