//! Fingerprints and the persisted snapshot of seen items.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Stable identity key for an item. Compared for equality only.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Derive a fingerprint from identity-bearing fields.
    pub fn of(parts: &[&str]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(parts.join("|").as_bytes());
        Self(hex::encode(hasher.finalize()))
    }

    /// Wrap a key read back from storage.
    pub fn from_stored(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Items that can be reduced to a fingerprint.
pub trait Fingerprinted {
    fn fingerprint(&self) -> Fingerprint;
}

/// Set of fingerprints seen on the previous run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    keys: BTreeSet<Fingerprint>,
}

impl Snapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, key: &Fingerprint) -> bool {
        self.keys.contains(key)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Fingerprint> {
        self.keys.iter()
    }

    /// Newline-delimited text form used by the file store.
    pub fn to_lines(&self) -> String {
        let mut out = String::new();
        for key in &self.keys {
            out.push_str(key.as_str());
            out.push('\n');
        }
        out
    }

    /// Parse the newline-delimited form, ignoring blank lines.
    pub fn from_lines(text: &str) -> Self {
        text.lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(Fingerprint::from_stored)
            .collect()
    }
}

impl FromIterator<Fingerprint> for Snapshot {
    fn from_iter<I: IntoIterator<Item = Fingerprint>>(iter: I) -> Self {
        Self {
            keys: iter.into_iter().collect(),
        }
    }
}
