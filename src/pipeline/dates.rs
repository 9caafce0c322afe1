//! Date range parsing for calendar fragments.
//!
//! Fragments carry `MM.DD` tokens, optionally followed by a parenthesised
//! weekday (`02.20(금)`, `02.20 (Fri)`). The weekday carries no information
//! and is removed before scanning.

use std::ops::Range;
use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::error::{AppError, Result};
use crate::models::DateRange;

/// Parenthesised weekday marker: `(금)`, `(금요일)`, `(Fri)`, `( Mon. )`.
static WEEKDAY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\(\s*(?:[월화수목금토일](?:요일)?|(?i:mon|tue|wed|thu|fri|sat|sun)[a-z]*\.?)\s*\)")
        .expect("weekday pattern is valid")
});

/// Maximal run of dot-separated digit groups; `date_parts` decides whether it is a date.
/// Being maximal, a run is never flanked by another digit or dot.
static DOTTED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]+(?:\.[0-9]+)+").expect("dotted pattern is valid"));

/// A parsed range plus where its tokens sat in the cleaned text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedFragment {
    pub range: DateRange,
    /// Fragment text with weekday markers removed
    pub cleaned: String,
    /// Byte span in `cleaned` from the first used token to the last
    pub span: Range<usize>,
}

impl ParsedFragment {
    /// Text left over once the date span is cut out.
    pub fn residual(&self) -> String {
        format!(
            "{} {}",
            &self.cleaned[..self.span.start],
            &self.cleaned[self.span.end..]
        )
    }
}

/// Parser for `MM.DD` date fragments, pinned to one calendar year.
#[derive(Debug, Clone, Copy)]
pub struct DateRangeParser {
    year: i32,
}

impl DateRangeParser {
    pub fn new(year: i32) -> Self {
        Self { year }
    }

    /// Parse a fragment into a date range.
    pub fn parse(&self, fragment: &str) -> Result<DateRange> {
        self.parse_fragment(fragment).map(|p| p.range)
    }

    /// Parse a fragment, keeping the cleaned text and token span.
    ///
    /// - no token: `AppError::NotADate`
    /// - one token: single-day range
    /// - two or more: first and second token, the rest ignored
    /// - impossible day or reversed pair: `AppError::DateFormat`
    pub fn parse_fragment(&self, fragment: &str) -> Result<ParsedFragment> {
        let cleaned = strip_weekdays(fragment);
        let (range, span) = {
            let mut tokens = date_tokens(&cleaned);
            let first = tokens
                .next()
                .ok_or_else(|| AppError::NotADate(fragment.to_string()))?;
            let second = tokens.next();

            let start = self.to_date(first.as_str())?;
            let range = match second {
                None => DateRange::single(start),
                Some(token) => DateRange::new(start, self.to_date(token.as_str())?)?,
            };

            let last = second.unwrap_or(first);
            (range, first.start()..last.end())
        };

        Ok(ParsedFragment {
            range,
            cleaned,
            span,
        })
    }

    /// Whether the fragment contains at least one date token.
    pub fn is_date_shaped(fragment: &str) -> bool {
        date_tokens(&strip_weekdays(fragment)).next().is_some()
    }

    fn to_date(&self, token: &str) -> Result<NaiveDate> {
        let (month, day) = date_parts(token)
            .ok_or_else(|| AppError::date_format(token, "not an MM.DD token"))?;
        let month: u32 = month.parse().map_err(|e| AppError::date_format(token, e))?;
        let day: u32 = day.parse().map_err(|e| AppError::date_format(token, e))?;

        NaiveDate::from_ymd_opt(self.year, month, day).ok_or_else(|| {
            AppError::date_format(token, format!("not a day of {}", self.year))
        })
    }
}

fn strip_weekdays(fragment: &str) -> String {
    WEEKDAY.replace_all(fragment, "").into_owned()
}

fn date_tokens(text: &str) -> impl Iterator<Item = regex::Match<'_>> {
    DOTTED
        .find_iter(text)
        .filter(|m| date_parts(m.as_str()).is_some())
}

/// Month and day of `MM.DD`, or of `YYYY.MM.DD` with the year dropped.
/// Both groups are exactly two digits, so decimals like `3.5` are not dates.
fn date_parts(token: &str) -> Option<(&str, &str)> {
    let parts: Vec<&str> = token.split('.').collect();
    match parts.as_slice() {
        [m, d] if m.len() == 2 && d.len() == 2 => Some((*m, *d)),
        [y, m, d] if y.len() == 4 && m.len() == 2 && d.len() == 2 => Some((*m, *d)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, m, d).unwrap()
    }

    fn parser() -> DateRangeParser {
        DateRangeParser::new(2026)
    }

    #[test]
    fn test_single_token() {
        let range = parser().parse("02.20").unwrap();
        assert_eq!(range.start(), day(2, 20));
        assert_eq!(range.end(), day(2, 20));
    }

    #[test]
    fn test_weekday_is_ignored() {
        let p = parser();
        assert_eq!(p.parse("02.20(Fri)").unwrap(), p.parse("02.20").unwrap());
        assert_eq!(p.parse("02.20(금)").unwrap(), p.parse("02.20").unwrap());
        assert_eq!(p.parse("02.20 ( 금 )").unwrap(), p.parse("02.20").unwrap());
    }

    #[test]
    fn test_two_tokens_any_separator() {
        let p = parser();
        for fragment in [
            "02.02(월) ~ 02.27(금)",
            "02.02 - 02.27",
            "02.02~02.27",
            "02.02 02.27",
            "from 02.02 until 02.27",
            "02.02(Mon)/02.27(Fri)",
        ] {
            let range = p.parse(fragment).unwrap();
            assert_eq!(range.start(), day(2, 2), "{fragment}");
            assert_eq!(range.end(), day(2, 27), "{fragment}");
        }
    }

    #[test]
    fn test_extra_tokens_ignored() {
        let range = parser().parse("03.02 ~ 03.06, 03.09").unwrap();
        assert_eq!(range.start(), day(3, 2));
        assert_eq!(range.end(), day(3, 6));
    }

    #[test]
    fn test_no_token_is_not_a_date() {
        assert!(matches!(
            parser().parse("Registration period"),
            Err(AppError::NotADate(_))
        ));
        assert!(!DateRangeParser::is_date_shaped("Registration period"));
    }

    #[test]
    fn test_invalid_day_is_format_error() {
        assert!(matches!(
            parser().parse("04.31"),
            Err(AppError::DateFormat { .. })
        ));
        assert!(matches!(
            parser().parse("13.01"),
            Err(AppError::DateFormat { .. })
        ));
        assert!(DateRangeParser::is_date_shaped("04.31"));
    }

    #[test]
    fn test_leap_day_depends_on_year() {
        assert!(DateRangeParser::new(2028).parse("02.29").is_ok());
        assert!(DateRangeParser::new(2026).parse("02.29").is_err());
    }

    #[test]
    fn test_reversed_pair_is_rejected() {
        assert!(matches!(
            parser().parse("12.22 ~ 01.05"),
            Err(AppError::DateFormat { .. })
        ));
    }

    #[test]
    fn test_full_date_uses_month_and_day() {
        let range = parser().parse("2026.03.02 개강").unwrap();
        assert_eq!(range.start(), day(3, 2));
        assert!(!DateRangeParser::is_date_shaped("v1.2.3.4"));
        assert!(!DateRangeParser::is_date_shaped("123.45"));
    }

    #[test]
    fn test_decimals_are_not_dates() {
        for text in ["평점 3.5 이상", "v2.0 출시", "Mozilla/5.0", "10.5%", "3.02"] {
            assert!(!DateRangeParser::is_date_shaped(text), "{text}");
        }
        let range = parser().parse("평점 3.5 이상 03.02 ~ 03.06").unwrap();
        assert_eq!(range.start(), day(3, 2));
        assert_eq!(range.end(), day(3, 6));
    }

    #[test]
    fn test_hangul_may_touch_digits() {
        let range = parser().parse("개강03.03").unwrap();
        assert_eq!(range.start(), day(3, 3));
    }

    #[test]
    fn test_non_weekday_parenthetical_is_kept() {
        let parsed = parser().parse_fragment("03.03(화) 개강(신입생)").unwrap();
        assert_eq!(parsed.residual().trim(), "개강(신입생)");
    }

    #[test]
    fn test_residual_removes_date_span() {
        let parsed = parser()
            .parse_fragment("02.02(월) ~ 02.27(금) 수강신청 기간")
            .unwrap();
        assert_eq!(parsed.residual().trim(), "수강신청 기간");
    }
}
