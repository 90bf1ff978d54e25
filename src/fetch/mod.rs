// src/fetch/mod.rs
//! Fetch stage: turn the source registry into normalized articles, one
//! source at a time, with a politeness pause between requests. A failing
//! source contributes zero articles and never aborts the run.

pub mod rss;
pub mod scrape;
pub mod types;

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge};
use once_cell::sync::OnceCell;
use std::time::Duration;

use crate::article::Article;
use crate::config::{SourceKind, SourceRegistry};
use crate::fetch::rss::RssFetcher;
use crate::fetch::scrape::ScrapeFetcher;
use crate::normalize::{normalize_entry, NormalizeCfg};

pub use types::{FetchSource, RawEntry};

/// One-time metrics registration (names show up even before first increment).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("fetch_entries_total", "Raw entries parsed from sources.");
        describe_counter!(
            "fetch_kept_total",
            "Entries surviving normalization + relevance gate."
        );
        describe_counter!("fetch_source_errors_total", "Source fetch/parse errors.");
        describe_counter!("fetch_proxy_errors_total", "Proxy fallback errors.");
        describe_histogram!("fetch_parse_ms", "Source parse time in milliseconds.");
        describe_gauge!("fetch_last_run_ts", "Unix ts when the fetch stage last ran.");
    });
}

/// Build live fetchers for every registry entry.
pub fn build_sources(registry: &SourceRegistry) -> Vec<Box<dyn FetchSource>> {
    let timeout = Duration::from_secs(registry.pipeline.request_timeout_secs);
    registry
        .sources
        .iter()
        .map(|desc| -> Box<dyn FetchSource> {
            match desc.kind {
                SourceKind::Scrape => Box::new(ScrapeFetcher::from_registry(
                    desc.clone(),
                    registry.keywords.clone(),
                    timeout,
                )),
                _ => Box::new(RssFetcher::from_registry(
                    desc.clone(),
                    registry.proxies.clone(),
                    timeout,
                )),
            }
        })
        .collect()
}

/// Fetch and normalize every source in sequence. Sources are independent;
/// merging happens downstream in the aggregator.
pub async fn fetch_all(
    sources: &[Box<dyn FetchSource>],
    registry: &SourceRegistry,
) -> Vec<Article> {
    ensure_metrics_described();

    let now = chrono::Utc::now();
    let cfg = NormalizeCfg {
        keywords: &registry.keywords,
        summary_max_chars: registry.pipeline.summary_max_chars,
        freshness_rewrite: registry.pipeline.freshness_rewrite,
    };

    let mut out = Vec::new();
    for (i, src) in sources.iter().enumerate() {
        // Politeness pause between upstream hosts, not before the first.
        if i > 0 && registry.pipeline.request_delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(registry.pipeline.request_delay_ms)).await;
        }

        let desc = src.descriptor();
        match src.fetch_entries().await {
            Ok(entries) => {
                let found = entries.len();
                let kept: Vec<Article> = entries
                    .iter()
                    .take(registry.pipeline.per_source_cap)
                    .filter_map(|entry| {
                        normalize_entry(
                            entry,
                            desc,
                            src.article_kind(),
                            src.relevance_policy(),
                            cfg,
                            now,
                        )
                    })
                    .collect();

                counter!("fetch_kept_total").increment(kept.len() as u64);
                tracing::info!(
                    source = %desc.name,
                    found,
                    kept = kept.len(),
                    "fetched source"
                );
                out.extend(kept);
            }
            Err(e) => {
                tracing::warn!(error = ?e, source = %desc.name, "source error");
                counter!("fetch_source_errors_total").increment(1);
            }
        }
    }

    gauge!("fetch_last_run_ts").set(now.timestamp() as f64);
    out
}
