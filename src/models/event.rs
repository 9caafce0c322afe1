//! Calendar event data structures.

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::{AppError, Result};
use crate::models::{Fingerprint, Fingerprinted};

/// An inclusive span of calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    /// Create a range, rejecting an end that precedes the start.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if end < start {
            return Err(AppError::date_format(
                format!("{start} ~ {end}"),
                "range ends before it starts",
            ));
        }
        Ok(Self { start, end })
    }

    /// Single-day range.
    pub fn single(day: NaiveDate) -> Self {
        Self {
            start: day,
            end: day,
        }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Whether `day` falls inside the range (both ends inclusive).
    pub fn contains(&self, day: NaiveDate) -> bool {
        self.start <= day && day <= self.end
    }
}

/// A titled calendar entry assembled from scraped fragments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Event {
    pub title: String,
    pub range: DateRange,
}

impl Event {
    pub fn new(title: impl Into<String>, range: DateRange) -> Self {
        Self {
            title: title.into(),
            range,
        }
    }

    pub fn start(&self) -> NaiveDate {
        self.range.start()
    }

    pub fn end(&self) -> NaiveDate {
        self.range.end()
    }
}

impl Fingerprinted for Event {
    /// Identity key: title + start date.
    fn fingerprint(&self) -> Fingerprint {
        Fingerprint::of(&[self.title.as_str(), self.start().to_string().as_str()])
    }
}
