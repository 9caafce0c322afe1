//! Pipeline entry points and the stages they are built from.
//!
//! - `run_calendar`: fetch the academic calendar and send a daily digest
//! - `run_postings`: fetch the notice board and announce new postings
//!
//! The stages below them (`dates`, `assemble`, `window`, `diff`) are pure and
//! do no I/O.

pub mod assemble;
pub mod calendar;
pub mod dates;
pub mod diff;
pub mod postings;
pub mod window;

pub use assemble::EventAssembler;
pub use calendar::{CalendarReport, run_calendar};
pub use dates::DateRangeParser;
pub use diff::{DiffCalculator, DiffResult};
pub use postings::{PostingsReport, run_postings};
pub use window::{Upcoming, Window, WindowClassifier};
