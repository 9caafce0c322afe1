// src/services/format.rs

//! Message rendering in Telegram's legacy Markdown.

use chrono::NaiveDate;

use crate::models::{CalendarConfig, NotificationCandidate};
use crate::pipeline::window::Window;

const RULE: &str = "────────────────";

/// Make free text safe inside a Markdown message.
///
/// Square brackets become parentheses; `_`, `*` and `` ` `` are escaped.
pub fn escape_markdown(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '[' => out.push('('),
            ']' => out.push(')'),
            '_' | '*' | '`' => {
                out.push('\\');
                out.push(c);
            }
            _ => out.push(c),
        }
    }
    out
}

/// Make free text safe inside a bold or link entity.
///
/// Legacy Markdown has no escapes within an entity, so `_`, `*` and `` ` ``
/// are dropped and square brackets become parentheses.
pub fn entity_text(text: &str) -> String {
    text.chars()
        .filter(|c| !matches!(c, '_' | '*' | '`'))
        .map(|c| match c {
            '[' => '(',
            ']' => ')',
            c => c,
        })
        .collect()
}

/// Percent-encode the characters that would end a Markdown link target.
fn link_target(url: &str) -> String {
    url.replace('(', "%28").replace(')', "%29")
}

/// Daily calendar digest, or `None` when the window is empty.
pub fn calendar_digest(config: &CalendarConfig, today: NaiveDate, window: &Window) -> Option<String> {
    if window.is_empty() {
        return None;
    }

    let mut lines = vec![format!(
        "📆 *{}* ({})",
        entity_text(&config.heading),
        today.format("%m/%d")
    )];

    if !window.active_today.is_empty() {
        lines.push(format!("\n🔔 *{}*", entity_text(&config.today_label)));
        for event in &window.active_today {
            lines.push(format!("• {}", escape_markdown(&event.title)));
        }
    }

    if !window.upcoming.is_empty() {
        lines.push(format!("\n⏳ *{}*", entity_text(&config.upcoming_label)));
        for item in &window.upcoming {
            lines.push(format!(
                "• D-{} {} ({})",
                item.days_until,
                escape_markdown(&item.event.title),
                item.event.start().format("%m/%d")
            ));
        }
    }

    Some(lines.join("\n"))
}

/// Message announcing one new posting.
pub fn posting_message(candidate: &NotificationCandidate, link_label: &str) -> String {
    format!(
        "{} *{}*\n{RULE}\n{}\n[{}]({})",
        candidate.category,
        entity_text(&candidate.title),
        escape_markdown(&candidate.meta),
        entity_text(link_label),
        link_target(&candidate.link)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DateRange, Event};
    use crate::pipeline::window::Upcoming;

    fn day(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, m, d).unwrap()
    }

    #[test]
    fn test_escape_markdown() {
        assert_eq!(
            escape_markdown("[학사] 수강_신청 *필독* `안내`"),
            "(학사) 수강\\_신청 \\*필독\\* \\`안내\\`"
        );
    }

    #[test]
    fn test_calendar_digest() {
        let window = Window {
            active_today: vec![Event::new(
                "등록금 납부",
                DateRange::new(day(2, 2), day(2, 27)).unwrap(),
            )],
            upcoming: vec![Upcoming {
                event: Event::new("개강", DateRange::single(day(3, 2))),
                days_until: 20,
            }],
        };

        let text = calendar_digest(&CalendarConfig::default(), day(2, 10), &window).unwrap();
        assert_eq!(
            text,
            "📆 *광운대 학사일정* (02/10)\n\n🔔 *오늘의 일정*\n• 등록금 납부\n\n⏳ *다가오는 일정*\n• D-20 개강 (03/02)"
        );
    }

    #[test]
    fn test_digest_omits_empty_sections() {
        let window = Window {
            active_today: vec![],
            upcoming: vec![Upcoming {
                event: Event::new("개강", DateRange::single(day(3, 2))),
                days_until: 20,
            }],
        };
        let text = calendar_digest(&CalendarConfig::default(), day(2, 10), &window).unwrap();
        assert!(!text.contains("오늘의 일정"));
    }

    #[test]
    fn test_empty_window_has_no_digest() {
        assert!(calendar_digest(&CalendarConfig::default(), day(2, 10), &Window::default()).is_none());
    }

    #[test]
    fn test_posting_message() {
        let candidate = NotificationCandidate {
            title: "[장학] 국가장학금 신청".into(),
            link: "https://www.kw.ac.kr/n/1".into(),
            meta: "2026-01-07 | 학생복지팀".into(),
            category: "💰".into(),
        };

        assert_eq!(
            posting_message(&candidate, "👉 공지 바로가기"),
            "💰 *(장학) 국가장학금 신청*\n────────────────\n2026-01-07 | 학생복지팀\n[👉 공지 바로가기](https://www.kw.ac.kr/n/1)"
        );
    }

    #[test]
    fn test_entities_carry_no_escapes() {
        let candidate = NotificationCandidate {
            title: "*필독* 수강_신청 [정정]".into(),
            link: "https://www.kw.ac.kr/notice?id=(12)".into(),
            meta: "학사_팀".into(),
            category: "📌".into(),
        };

        assert_eq!(
            posting_message(&candidate, "[바로가기]"),
            "📌 *필독 수강신청 (정정)*\n────────────────\n학사\\_팀\n[(바로가기)](https://www.kw.ac.kr/notice?id=%2812%29)"
        );
    }
}
