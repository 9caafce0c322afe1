//! Notification candidates and keyword categories.

use serde::{Deserialize, Serialize};

use crate::models::Posting;

/// Keyword group mapped to an icon shown in front of a title.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    /// Icon prefix (usually an emoji)
    pub icon: String,

    /// Title substrings that select this category
    pub keywords: Vec<String>,
}

impl Category {
    pub fn new(icon: &str, keywords: &[&str]) -> Self {
        Self {
            icon: icon.to_string(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        }
    }

    pub fn matches(&self, title: &str) -> bool {
        self.keywords.iter().any(|k| title.contains(k.as_str()))
    }
}

/// Pick the icon of the first category matching `title`.
pub fn categorize<'a>(title: &str, categories: &'a [Category], default_icon: &'a str) -> &'a str {
    categories
        .iter()
        .find(|c| c.matches(title))
        .map_or(default_icon, |c| c.icon.as_str())
}

/// A notifiable item handed to the formatter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotificationCandidate {
    pub title: String,
    pub link: String,
    pub meta: String,
    pub category: String,
}

impl NotificationCandidate {
    /// Build a candidate for a posting, resolving its category icon.
    pub fn from_posting(posting: &Posting, categories: &[Category], default_icon: &str) -> Self {
        Self {
            title: posting.title.clone(),
            link: posting.link.clone(),
            meta: posting.meta.clone(),
            category: categorize(&posting.title, categories, default_icon).to_string(),
        }
    }
}
