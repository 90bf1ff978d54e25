// src/article.rs
//! Canonical article record, the unit of everything downstream of
//! normalization.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Where an article came from, by retrieval mechanism.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArticleKind {
    Rss,
    GoogleNews,
    Twitter,
    WebScrape,
    /// Synthetic fallback article injected when too few real ones were found.
    Sample,
}

/// Invariants for any article that survives normalization: `title` and `url`
/// are non-empty, and `published_at` never lies after the run clock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub id: String,
    pub title: String,
    pub url: String,
    pub summary: String,
    pub source: String,
    pub category: String,
    #[serde(rename = "type")]
    pub kind: ArticleKind,
    pub published_at: DateTime<Utc>,
    /// Fetch-time marker; always the run clock at normalization time.
    pub timestamp: DateTime<Utc>,
}

impl Article {
    /// Title + summary, the text every analytics heuristic runs over.
    pub fn combined_text(&self) -> String {
        format!("{} {}", self.title, self.summary)
    }
}
