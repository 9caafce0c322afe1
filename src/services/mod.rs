//! Service layer for the notifier.
//!
//! This module contains the collaborators around the core pipeline:
//! - Content fetching with rendering fallback (`ContentProvider`)
//! - Calendar text extraction (`TextLineExtractor`)
//! - Notice board posting extraction (`PostingExtractor`)
//! - Message formatting and delivery (`Notifier`)

mod extract;
pub mod fetch;
pub mod format;
mod notices;
mod telegram;

pub use extract::{TextLineExtractor, flatten};
pub use fetch::{ContentProvider, FallbackProvider, HeadlessRenderer, HttpProvider};
pub use notices::PostingExtractor;
pub use telegram::{DryRunNotifier, Notifier, TelegramNotifier, build_notifier};
