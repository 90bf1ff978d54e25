// src/fetch/scrape.rs
//! Fallback adapter for sources without a feed: pull the landing page and
//! lift anchor-tag headlines that pass the keyword gate. Deliberately crude;
//! these sources publish a handful of items a day on a static front page.

use anyhow::{Context, Result};
use async_trait::async_trait;
use metrics::counter;
use once_cell::sync::OnceCell;
use regex::Regex;
use std::time::Duration;

use crate::config::SourceDescriptor;
use crate::fetch::types::{FetchSource, RawEntry};
use crate::normalize::{clean_text, is_relevant, RelevancePolicy};

/// Anchors scanned per page and links kept, in that order.
const SCAN_LIMIT: usize = 10;
const KEEP_LIMIT: usize = 5;

/// Link text shorter than this is navigation chrome, not a headline.
const MIN_HEADLINE_CHARS: usize = 20;

pub struct ScrapeFetcher {
    source: SourceDescriptor,
    keywords: Vec<String>,
    mode: Mode,
}

enum Mode {
    Fixture(String),
    Http { client: reqwest::Client },
}

impl ScrapeFetcher {
    pub fn from_fixture_str(source: SourceDescriptor, keywords: Vec<String>, html: &str) -> Self {
        Self {
            source,
            keywords,
            mode: Mode::Fixture(html.to_string()),
        }
    }

    pub fn from_registry(
        source: SourceDescriptor,
        keywords: Vec<String>,
        timeout: Duration,
    ) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();
        Self {
            source,
            keywords,
            mode: Mode::Http { client },
        }
    }

    fn extract_entries(&self, html: &str) -> Vec<RawEntry> {
        static RE_ANCHOR: OnceCell<Regex> = OnceCell::new();
        let re_anchor = RE_ANCHOR.get_or_init(|| {
            Regex::new(r#"(?is)<a\s[^>]*href\s*=\s*["']([^"']+)["'][^>]*>(.*?)</a>"#).unwrap()
        });

        let mut kept = Vec::new();
        for caps in re_anchor.captures_iter(html).take(SCAN_LIMIT) {
            let text = clean_text(&caps[2]);
            if text.chars().count() <= MIN_HEADLINE_CHARS || !is_relevant(&text, &self.keywords) {
                continue;
            }

            let href = caps[1].trim();
            let url = if href.starts_with("http") {
                href.to_string()
            } else {
                format!("{}{}", self.source.url.trim_end_matches('/'), href)
            };

            kept.push(RawEntry {
                title: Some(text),
                link: Some(url),
                summary: Some(format!("Latest update from {}", self.source.name)),
                ..RawEntry::default()
            });
            if kept.len() >= KEEP_LIMIT {
                break;
            }
        }

        counter!("fetch_entries_total").increment(kept.len() as u64);
        kept
    }
}

#[async_trait]
impl FetchSource for ScrapeFetcher {
    async fn fetch_entries(&self) -> Result<Vec<RawEntry>> {
        match &self.mode {
            Mode::Fixture(html) => Ok(self.extract_entries(html)),
            Mode::Http { client } => {
                let body = client
                    .get(&self.source.url)
                    .send()
                    .await
                    .with_context(|| format!("GET {}", self.source.url))?
                    .text()
                    .await
                    .context("reading page body")?;
                Ok(self.extract_entries(&body))
            }
        }
    }

    fn descriptor(&self) -> &SourceDescriptor {
        &self.source
    }

    // Link text already passed the keyword gate here.
    fn relevance_policy(&self) -> RelevancePolicy {
        RelevancePolicy::Skip
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SourceKind;

    fn source() -> SourceDescriptor {
        SourceDescriptor {
            name: "Central Bank of Nigeria".to_string(),
            url: "https://www.cbn.gov.ng".to_string(),
            kind: SourceKind::Scrape,
            category: "monetary_policy".to_string(),
        }
    }

    fn keywords() -> Vec<String> {
        vec!["naira".to_string(), "monetary policy".to_string()]
    }

    const PAGE: &str = r#"<html><body>
      <a href="/about">About</a>
      <a href="/news/mpc-2025">Monetary policy committee holds rate in first meeting</a>
      <a href="https://example.ng/fx">Naira appreciates in the official market window</a>
      <a href="/sports">Big match tonight: full preview and lineup news</a>
    </body></html>"#;

    #[tokio::test]
    async fn keeps_only_relevant_headlines_and_absolutizes_links() {
        let f = ScrapeFetcher::from_fixture_str(source(), keywords(), PAGE);
        let entries = f.fetch_entries().await.expect("scrape fixture");
        assert_eq!(entries.len(), 2);
        assert_eq!(
            entries[0].link.as_deref(),
            Some("https://www.cbn.gov.ng/news/mpc-2025")
        );
        assert_eq!(entries[1].link.as_deref(), Some("https://example.ng/fx"));
        assert!(entries[0]
            .summary
            .as_deref()
            .unwrap()
            .contains("Central Bank of Nigeria"));
    }
}
