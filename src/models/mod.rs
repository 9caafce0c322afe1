// src/models/mod.rs

//! Domain models for the notifier.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

pub mod config;
mod event;
mod notification;
mod posting;
mod snapshot;

// Re-export all public types
pub use config::{
    CalendarConfig, Config, ExtractionStrategy, NoticesConfig, RendererConfig, SourceConfig,
    TelegramConfig,
};
pub use event::{DateRange, Event};
pub use notification::{Category, NotificationCandidate, categorize};
pub use posting::Posting;
pub use snapshot::{Fingerprint, Fingerprinted, Snapshot};
