// src/pipeline.rs
//! Batch drivers wiring the stages together. Each driver reads its inputs,
//! runs one full pass, and atomically replaces its snapshot outputs.
//! Recoverable failures (a dead source, a missing input file) are absorbed
//! inside the run; only genuinely unexpected errors propagate to the caller
//! and from there to the exit code.

use anyhow::Result;
use chrono::Utc;
use std::path::Path;

use crate::aggregate;
use crate::analytics::{AnalyticsEngine, TrendSnapshot};
use crate::config::SourceRegistry;
use crate::fetch::{self, FetchSource};
use crate::report;
use crate::snapshot::{write_json_atomic, write_text_atomic, NewsSnapshot, SnapshotStore};

/// Fetch every source, aggregate, and write `news.json` + the update rollup.
pub async fn run_fetch(
    registry: &SourceRegistry,
    sources: &[Box<dyn FetchSource>],
    store: &SnapshotStore,
) -> Result<NewsSnapshot> {
    let fetched = fetch::fetch_all(sources, registry).await;
    tracing::info!(fetched = fetched.len(), "merged per-source output");

    // Run clock taken after the fetch so no normalized timestamp can sit
    // past it.
    let now = Utc::now();
    let feed = aggregate::aggregate(fetched, &registry.pipeline, now);
    let snapshot = NewsSnapshot::new(
        feed,
        registry.sources.iter().map(|s| s.name.clone()).collect(),
        now,
    );
    store.write_news(&snapshot)?;
    store.write_update_summary(&snapshot)?;

    tracing::info!(total = snapshot.total_articles, "fetch run complete");
    Ok(snapshot)
}

/// Re-read the latest feed snapshot and derive the full processed set.
/// A missing `news.json` processes an empty feed rather than failing.
pub fn run_process(registry: &SourceRegistry, store: &SnapshotStore) -> Result<usize> {
    let now = Utc::now();
    let articles = match store.load_news()? {
        Some(snap) => snap.articles,
        None => Vec::new(),
    };

    let engine = AnalyticsEngine::with_default_lexicon();
    let enhanced = engine.enhance(&articles);
    let summary = engine.summary(&articles);
    let trends = engine.trends(&articles, now, registry.pipeline.trend_window_hours);
    let stats = engine.source_stats(&articles, now);

    store.write_processed(&enhanced, &summary, &trends, &stats, now)?;
    tracing::info!(articles = articles.len(), "process run complete");
    Ok(articles.len())
}

/// Render the weekly report and daily digest from the processed snapshots.
/// Missing inputs produce placeholder reports, not errors.
pub fn run_report(store: &SnapshotStore, reports_dir: &Path) -> Result<()> {
    let now = Utc::now();

    let analytics = store
        .load_analytics()?
        .map(|s| s.analytics)
        .unwrap_or_default();
    let trends = match store.load_trending()? {
        Some(t) => t.trends,
        None => TrendSnapshot {
            trending_keywords: Vec::new(),
            trending_entities: Vec::new(),
            total_recent_articles: 0,
            analysis_time: now,
        },
    };
    let sources = store
        .load_sources_stats()?
        .map(|s| s.sources)
        .unwrap_or_default();

    let date = now.format("%Y-%m-%d");
    let markdown = report::weekly_report(&analytics, &trends, &sources, now);
    write_text_atomic(&reports_dir.join(format!("weekly-report-{date}.md")), &markdown)?;

    let json = report::weekly_report_json(&analytics, &trends, now);
    write_json_atomic(&reports_dir.join("weekly-report.json"), &json)?;

    let articles = store.load_news()?.map(|s| s.articles).unwrap_or_default();
    match report::daily_digest(&articles, now) {
        Some(digest) => {
            write_text_atomic(&reports_dir.join(format!("daily-digest-{date}.md")), &digest)?;
        }
        None => tracing::info!("no articles from today; skipping daily digest"),
    }

    tracing::info!(dir = %reports_dir.display(), "report run complete");
    Ok(())
}
