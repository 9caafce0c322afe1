//! Event assembly from ordered text fragments.
//!
//! Calendar pages put the date and the title either in the same fragment
//! (`02.20(금) 수강신청`) or in two consecutive fragments (`02.20(금)`,
//! `수강신청`). The assembler handles both without knowing the layout in
//! advance, using a single pending date range:
//!
//! - a date fragment with a usable title emits an event directly
//! - a date-only fragment becomes pending, replacing any earlier pending range
//! - a text fragment following a pending range becomes its title

use std::collections::HashSet;

use chrono::NaiveDate;
use unicode_segmentation::UnicodeSegmentation;

use crate::error::AppError;
use crate::models::{DateRange, Event};
use crate::pipeline::dates::DateRangeParser;

/// Minimum number of meaningful characters in a title.
pub const MIN_TITLE_CHARS: usize = 2;

/// Punctuation trimmed from the edges of a title.
const SEPARATORS: &[char] = &[
    '~', '∼', '～', '-', '–', '—', ':', '|', ',', '/', '·', '•', '.', '*',
];

/// Pairs date ranges with titles and removes duplicates within one pass.
#[derive(Debug, Clone, Copy)]
pub struct EventAssembler {
    parser: DateRangeParser,
}

impl EventAssembler {
    pub fn new(parser: DateRangeParser) -> Self {
        Self { parser }
    }

    /// Assemble events from fragments in document order.
    ///
    /// The result is sorted by start date; events sharing a start date keep
    /// their discovery order.
    pub fn assemble<S: AsRef<str>>(&self, fragments: &[S]) -> Vec<Event> {
        let mut pending: Option<DateRange> = None;
        let mut seen: HashSet<(String, NaiveDate)> = HashSet::new();
        let mut events = Vec::new();

        for fragment in fragments {
            let text = normalize_whitespace(fragment.as_ref());

            match self.parser.parse_fragment(&text) {
                Ok(parsed) => match clean_title(&parsed.residual()) {
                    Some(title) => {
                        pending = None;
                        push_unique(&mut events, &mut seen, title, parsed.range);
                    }
                    None => {
                        if let Some(dropped) = pending.replace(parsed.range) {
                            log::debug!("Discarding untitled range starting {}", dropped.start());
                        }
                    }
                },
                Err(AppError::NotADate(_)) => {
                    let Some(range) = pending else {
                        continue;
                    };
                    // Too short to be a title: noise, keep waiting.
                    if let Some(title) = clean_title(&text) {
                        pending = None;
                        push_unique(&mut events, &mut seen, title, range);
                    }
                }
                Err(e) => {
                    log::warn!("Skipping fragment {text:?}: {e}");
                    pending = None;
                }
            }
        }

        events.sort_by_key(Event::start);
        events
    }
}

fn push_unique(
    events: &mut Vec<Event>,
    seen: &mut HashSet<(String, NaiveDate)>,
    title: String,
    range: DateRange,
) {
    if seen.insert((title.clone(), range.start())) {
        events.push(Event::new(title, range));
    } else {
        log::debug!("Dropping duplicate event {title:?} on {}", range.start());
    }
}

/// Count graphemes that contain a letter or digit.
pub fn meaningful_len(text: &str) -> usize {
    text.graphemes(true)
        .filter(|g| g.chars().any(char::is_alphanumeric))
        .count()
}

/// Trim separators and whitespace; `None` if too little is left.
fn clean_title(raw: &str) -> Option<String> {
    let title = normalize_whitespace(raw);
    let title = title.trim_matches(|c: char| c.is_whitespace() || SEPARATORS.contains(&c));

    (meaningful_len(title) >= MIN_TITLE_CHARS).then(|| title.to_string())
}

fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
