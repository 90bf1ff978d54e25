// src/fetch/rss.rs
//! RSS retrieval: direct GET first, then the configured CORS-proxy chain,
//! then give up for this run. Parsing is a strict quick-xml deserialization
//! of the `rss/channel/item` shape after a small entity scrub.

use anyhow::{Context, Result};
use async_trait::async_trait;
use metrics::{counter, histogram};
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use quick_xml::de::from_str;
use serde::Deserialize;
use std::time::Duration;

use crate::config::SourceDescriptor;
use crate::fetch::types::{FetchSource, RawEntry};

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    item: Vec<Item>,
}

#[derive(Debug, Deserialize)]
struct Item {
    title: Option<String>,
    link: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
    description: Option<String>,
}

pub struct RssFetcher {
    source: SourceDescriptor,
    mode: Mode,
}

enum Mode {
    /// Inline XML, for offline parsing in tests.
    Fixture(String),
    Http {
        client: reqwest::Client,
        proxies: Vec<String>,
    },
}

impl RssFetcher {
    pub fn from_fixture_str(source: SourceDescriptor, xml: &str) -> Self {
        Self {
            source,
            mode: Mode::Fixture(xml.to_string()),
        }
    }

    pub fn from_registry(
        source: SourceDescriptor,
        proxies: Vec<String>,
        timeout: Duration,
    ) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();
        Self {
            source,
            mode: Mode::Http { client, proxies },
        }
    }

    fn parse_entries_from_str(&self, xml: &str) -> Result<Vec<RawEntry>> {
        let t0 = std::time::Instant::now();
        let xml_clean = scrub_html_entities_for_xml(xml);
        let rss: Rss = from_str(&xml_clean)
            .with_context(|| format!("parsing rss xml for {}", self.source.name))?;

        let out: Vec<RawEntry> = rss
            .channel
            .item
            .into_iter()
            .map(|it| RawEntry {
                title: it.title,
                link: it.link,
                published: it.pub_date,
                description: it.description,
                ..RawEntry::default()
            })
            .collect();

        let ms = t0.elapsed().as_secs_f64() * 1_000.0;
        histogram!("fetch_parse_ms").record(ms);
        counter!("fetch_entries_total").increment(out.len() as u64);
        Ok(out)
    }

    async fn get_text(client: &reqwest::Client, url: &str) -> Result<String> {
        let resp = client
            .get(url)
            .send()
            .await
            .with_context(|| format!("GET {url}"))?;
        resp.text().await.context("reading response body")
    }
}

#[async_trait]
impl FetchSource for RssFetcher {
    async fn fetch_entries(&self) -> Result<Vec<RawEntry>> {
        match &self.mode {
            Mode::Fixture(xml) => self.parse_entries_from_str(xml),

            Mode::Http { client, proxies } => {
                // Direct attempt first.
                match Self::get_text(client, &self.source.url).await {
                    Ok(body) => {
                        if let Ok(entries) = self.parse_entries_from_str(&body) {
                            if !entries.is_empty() {
                                return Ok(entries);
                            }
                        }
                    }
                    Err(e) => {
                        tracing::warn!(error = ?e, source = %self.source.name, "direct fetch failed");
                    }
                }

                // Fall back through the proxy chain in order.
                let encoded = utf8_percent_encode(&self.source.url, NON_ALPHANUMERIC).to_string();
                for proxy in proxies {
                    let proxied = format!("{proxy}{encoded}");
                    match Self::get_text(client, &proxied).await {
                        Ok(body) => match self.parse_entries_from_str(&body) {
                            Ok(entries) if !entries.is_empty() => return Ok(entries),
                            _ => continue,
                        },
                        Err(e) => {
                            tracing::warn!(error = ?e, source = %self.source.name, proxy = %proxy, "proxy fetch failed");
                            counter!("fetch_proxy_errors_total").increment(1);
                        }
                    }
                }

                anyhow::bail!("no entries from {} (direct + proxies)", self.source.name)
            }
        }
    }

    fn descriptor(&self) -> &SourceDescriptor {
        &self.source
    }
}

/// quick-xml rejects named HTML entities inside element text; collapse the
/// common ones before deserializing.
fn scrub_html_entities_for_xml(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&ndash;", "-")
        .replace("&mdash;", "-")
        .replace("&ldquo;", "\"")
        .replace("&rdquo;", "\"")
        .replace("&lsquo;", "'")
        .replace("&rsquo;", "'")
}
