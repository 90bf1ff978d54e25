// src/fetch/types.rs
use anyhow::Result;

use crate::article::ArticleKind;
use crate::config::{SourceDescriptor, SourceKind};
use crate::normalize::RelevancePolicy;

/// Loosely structured entry as the wire gives it to us. Every field is
/// optional; the normalizer decides what survives.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawEntry {
    pub title: Option<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub link: Option<String>,
    pub published: Option<String>,
    pub updated: Option<String>,
}

/// One retrievable source. Implementations surface transport and parse
/// failures as `Err`; the driver logs and moves on.
#[async_trait::async_trait]
pub trait FetchSource: Send + Sync {
    async fn fetch_entries(&self) -> Result<Vec<RawEntry>>;
    fn descriptor(&self) -> &SourceDescriptor;
    /// Tag applied to articles from this source.
    fn article_kind(&self) -> ArticleKind {
        match self.descriptor().kind {
            SourceKind::Rss => ArticleKind::Rss,
            SourceKind::GoogleNews => ArticleKind::GoogleNews,
            SourceKind::Twitter => ArticleKind::Twitter,
            SourceKind::Scrape => ArticleKind::WebScrape,
        }
    }
    /// Feed adapters require the keyword gate; adapters that pre-filter
    /// (scraping) skip it.
    fn relevance_policy(&self) -> RelevancePolicy {
        RelevancePolicy::Require
    }
}
