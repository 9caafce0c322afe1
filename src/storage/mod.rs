//! Storage abstractions for the seen-items snapshot.
//!
//! The snapshot is the only state carried between runs. It is read in full at
//! the start of a run and replaced in full at the end.
//!
//! ## File format
//!
//! ```text
//! 3f9a...c1   # one fingerprint per line
//! 8b20...7e
//! ```
//!
//! A missing file means "first run" and is never an error.

pub mod local;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::Snapshot;

// Re-export for convenience
pub use local::LocalStorage;

/// Trait for snapshot storage backends.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Load the previous snapshot; `None` if none was ever written.
    async fn load(&self) -> Result<Option<Snapshot>>;

    /// Replace the stored snapshot.
    async fn save(&self, snapshot: &Snapshot) -> Result<()>;

    /// Human-readable location for logs.
    fn location(&self) -> String;
}
