//! Classification of events into "today" and "upcoming" windows.

use chrono::NaiveDate;

use crate::models::Event;

/// An event starting after today, with its distance in days.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upcoming {
    pub event: Event,
    pub days_until: i64,
}

/// What the calendar path has to report for one day.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Window {
    pub active_today: Vec<Event>,
    pub upcoming: Vec<Upcoming>,
}

impl Window {
    /// True when there is nothing to report.
    pub fn is_empty(&self) -> bool {
        self.active_today.is_empty() && self.upcoming.is_empty()
    }
}

/// Splits events around a reference day.
#[derive(Debug, Clone, Copy)]
pub struct WindowClassifier {
    horizon_days: i64,
    upcoming_limit: usize,
}

impl WindowClassifier {
    pub fn new(horizon_days: i64, upcoming_limit: usize) -> Self {
        Self {
            horizon_days,
            upcoming_limit,
        }
    }

    /// Classify `events` (already in start order) against `today`.
    ///
    /// - active: `start <= today <= end`, input order kept
    /// - upcoming: `0 < start - today <= horizon`, by start then input order,
    ///   truncated to the upcoming limit
    pub fn classify(&self, today: NaiveDate, events: &[Event]) -> Window {
        let active_today: Vec<Event> = events
            .iter()
            .filter(|e| e.range.contains(today))
            .cloned()
            .collect();

        let mut upcoming: Vec<Upcoming> = events
            .iter()
            .filter_map(|e| {
                let days_until = (e.start() - today).num_days();
                (days_until > 0 && days_until <= self.horizon_days).then(|| Upcoming {
                    event: e.clone(),
                    days_until,
                })
            })
            .collect();
        upcoming.sort_by_key(|u| u.event.start());
        upcoming.truncate(self.upcoming_limit);

        Window {
            active_today,
            upcoming,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DateRange;

    fn day(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, m, d).unwrap()
    }

    fn event(title: &str, start: NaiveDate, end: NaiveDate) -> Event {
        Event::new(title, DateRange::new(start, end).unwrap())
    }

    fn titles(window: &Window) -> (Vec<&str>, Vec<&str>) {
        (
            window.active_today.iter().map(|e| e.title.as_str()).collect(),
            window
                .upcoming
                .iter()
                .map(|u| u.event.title.as_str())
                .collect(),
        )
    }

    #[test]
    fn test_reference_example() {
        let events = vec![
            event("B", day(2, 9), day(2, 9)),
            event("A", day(2, 10), day(2, 15)),
            event("E", day(3, 1), day(3, 1)),
            event("C", day(4, 10), day(4, 10)),
            event("D", day(5, 1), day(5, 1)),
        ];

        let window = WindowClassifier::new(60, 2).classify(day(2, 10), &events);
        let (active, upcoming) = titles(&window);

        assert_eq!(active, vec!["A"]);
        assert_eq!(upcoming, vec!["E", "C"]);
        assert_eq!(window.upcoming[1].days_until, 59);
    }

    #[test]
    fn test_d_qualifies_without_truncation() {
        let events = vec![
            event("C", day(4, 10), day(4, 10)),
            event("D", day(5, 1), day(5, 1)),
        ];
        // 2026-03-05 puts D within 57 days
        let window = WindowClassifier::new(60, 5).classify(day(3, 5), &events);
        assert_eq!(titles(&window).1, vec!["C", "D"]);
    }

    #[test]
    fn test_horizon_is_inclusive() {
        let events = vec![
            event("edge", day(4, 11), day(4, 11)),
            event("past", day(4, 12), day(4, 12)),
        ];
        let window = WindowClassifier::new(60, 10).classify(day(2, 10), &events);
        assert_eq!(titles(&window).1, vec!["edge"]);
    }

    #[test]
    fn test_starting_today_is_active_not_upcoming() {
        let events = vec![event("today", day(2, 10), day(2, 10))];
        let window = WindowClassifier::new(60, 2).classify(day(2, 10), &events);
        assert_eq!(titles(&window), (vec!["today"], vec![]));
    }

    #[test]
    fn test_ties_keep_input_order() {
        let events = vec![
            event("first", day(3, 1), day(3, 1)),
            event("second", day(3, 1), day(3, 3)),
            event("third", day(3, 1), day(3, 2)),
        ];
        let window = WindowClassifier::new(60, 2).classify(day(2, 10), &events);
        assert_eq!(titles(&window).1, vec!["first", "second"]);
    }

    #[test]
    fn test_nothing_to_report() {
        let events = vec![
            event("old", day(1, 5), day(1, 9)),
            event("far", day(12, 1), day(12, 1)),
        ];
        let window = WindowClassifier::new(60, 2).classify(day(2, 10), &events);
        assert!(window.is_empty());
    }
}
