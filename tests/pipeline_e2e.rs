// tests/pipeline_e2e.rs
// Full batch pass over fixture XML: fetch → aggregate → snapshot files →
// analytics → reports, with one failing source in the mix.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{Duration, Utc};

use naija_econ_news::article::ArticleKind;
use naija_econ_news::config::{SourceDescriptor, SourceKind, SourceRegistry};
use naija_econ_news::fetch::rss::RssFetcher;
use naija_econ_news::fetch::{FetchSource, RawEntry};
use naija_econ_news::pipeline;
use naija_econ_news::snapshot::SnapshotStore;

const TEST_TOML: &str = r#"
keywords = [
    "naira", "cbn", "inflation", "budget", "gdp", "economy", "trade",
    "export", "manufacturing", "monetary policy", "federal government", "oil",
]

[pipeline]
request_delay_ms = 0

[[sources]]
name = "Fixture Feed"
url = "https://example.ng/feed"
kind = "rss"
category = "business"
"#;

fn descriptor(name: &str, kind: SourceKind) -> SourceDescriptor {
    SourceDescriptor {
        name: name.to_string(),
        url: "https://example.ng/feed".to_string(),
        kind,
        category: "business".to_string(),
    }
}

struct FailingSource {
    desc: SourceDescriptor,
}

#[async_trait]
impl FetchSource for FailingSource {
    async fn fetch_entries(&self) -> Result<Vec<RawEntry>> {
        anyhow::bail!("upstream timed out")
    }
    fn descriptor(&self) -> &SourceDescriptor {
        &self.desc
    }
}

fn item(title: &str, link: &str, pub_date: &str, description: &str) -> String {
    format!(
        "<item><title>{title}</title><link>{link}</link><pubDate>{pub_date}</pubDate><description>{description}</description></item>"
    )
}

/// Fixture feed with relative dates so the test is stable on any run day:
/// relevant items, a near-duplicate, an off-topic item, a missing-link item,
/// a bad date, and a future date.
fn fixture_xml() -> String {
    let now = Utc::now();
    let ago = |h: i64| (now - Duration::hours(h)).to_rfc2822();
    let ahead = |h: i64| (now + Duration::hours(h)).to_rfc2822();

    let items = [
        item(
            "Naira gains against dollar at official window",
            "https://example.ng/naira-1",
            &ago(1),
            "The naira firmed after central bank supply.",
        ),
        item(
            "Naira gains against the dollar officially",
            "https://example.ng/naira-2",
            &ago(1),
            "Duplicate wire copy of the same naira story.",
        ),
        item(
            "CBN announces new monetary policy measures",
            "https://example.ng/cbn",
            &ago(2),
            "The CBN outlined steps after the MPC meeting.",
        ),
        item(
            "Inflation eases to 21.5% in latest NBS data",
            "https://example.ng/inflation",
            &ago(3),
            "Headline inflation slowed for a second month.",
        ),
        item(
            "Federal government unveils budget plan for infrastructure",
            "https://example.ng/budget",
            &ago(4),
            "The federal government proposed new capital spending.",
        ),
        item(
            "Oil exports rise as output recovers strongly",
            "https://example.ng/oil",
            &ago(5),
            "Crude oil export volumes improved in the period.",
        ),
        item(
            "GDP growth beats forecasts in second quarter",
            "https://example.ng/gdp",
            &ago(6),
            "The economy expanded faster than projected.",
        ),
        item(
            "Premier League transfer roundup",
            "https://example.ng/sport",
            &ago(1),
            "Football moves and rumours.",
        ),
        item(
            "Trade surplus widens on manufacturing gains",
            "https://example.ng/trade",
            "not-a-date",
            "Manufacturing exports lifted the trade balance.",
        ),
        item(
            "Naira forecast: what analysts expect next week",
            "https://example.ng/forecast",
            &ahead(5),
            "Analysts shared naira projections.",
        ),
        // no link: must be dropped
        "<item><title>Untitled economy teaser</title></item>".to_string(),
    ]
    .join("\n");

    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0"><channel><title>Fixture Feed</title>
{items}
</channel></rss>"#
    )
}

#[tokio::test]
async fn fetch_process_report_full_pass() {
    let registry = SourceRegistry::from_toml_str(TEST_TOML).expect("test registry");
    let dir = tempfile::tempdir().unwrap();
    let store = SnapshotStore::new(dir.path().join("api"));
    let reports_dir = dir.path().join("reports");

    let xml = fixture_xml();
    let sources: Vec<Box<dyn FetchSource>> = vec![
        Box::new(RssFetcher::from_fixture_str(
            descriptor("Fixture Feed", SourceKind::Rss),
            &xml,
        )),
        Box::new(FailingSource {
            desc: descriptor("Broken Feed", SourceKind::Rss),
        }),
    ];

    // --- fetch ---
    let snapshot = pipeline::run_fetch(&registry, &sources, &store)
        .await
        .expect("fetch run");

    // off-topic, duplicate, and link-less items are gone; everything else kept
    assert_eq!(snapshot.total_articles, 8);
    let titles: Vec<&str> = snapshot.articles.iter().map(|a| a.title.as_str()).collect();
    assert!(!titles.iter().any(|t| t.contains("Premier League")));
    assert!(!titles.iter().any(|t| t.contains("Untitled")));
    assert_eq!(
        titles
            .iter()
            .filter(|t| t.starts_with("Naira gains"))
            .count(),
        1
    );

    // feed invariants
    assert!(snapshot.articles.len() <= registry.pipeline.max_articles);
    for article in &snapshot.articles {
        assert!(!article.title.is_empty());
        assert!(!article.url.is_empty());
        assert!(article.published_at <= snapshot.last_updated);
        assert_ne!(article.kind, ArticleKind::Sample);
    }
    for pair in snapshot.articles.windows(2) {
        assert!(pair[0].published_at >= pair[1].published_at);
    }

    assert!(store.news_path().exists());
    assert!(dir.path().join("api/update-summary.json").exists());

    // --- process ---
    let processed = pipeline::run_process(&registry, &store).expect("process run");
    assert_eq!(processed, 8);

    let analytics = store
        .load_analytics()
        .unwrap()
        .expect("analytics.json written");
    assert_eq!(analytics.analytics.total_articles, 8);
    assert_eq!(
        analytics.analytics.sentiment_distribution.positive
            + analytics.analytics.sentiment_distribution.neutral
            + analytics.analytics.sentiment_distribution.negative,
        8
    );

    let trending = store.load_trending().unwrap().expect("trending.json written");
    // every fixture article is inside the 24h window
    assert_eq!(trending.trends.total_recent_articles, 8);
    assert!(trending
        .trends
        .trending_keywords
        .iter()
        .any(|k| k.keyword == "naira"));

    let stats = store
        .load_sources_stats()
        .unwrap()
        .expect("sources-stats.json written");
    assert_eq!(stats.sources["Fixture Feed"].article_count, 8);

    // --- report ---
    pipeline::run_report(&store, &reports_dir).expect("report run");
    assert!(reports_dir.join("weekly-report.json").exists());
    let date = Utc::now().format("%Y-%m-%d");
    let weekly = std::fs::read_to_string(reports_dir.join(format!("weekly-report-{date}.md")))
        .expect("weekly markdown");
    assert!(weekly.contains("## Executive Summary"));
    assert!(weekly.contains("| Fixture Feed |"));
}

#[tokio::test]
async fn all_sources_failing_still_produces_a_feed() {
    let registry = SourceRegistry::from_toml_str(TEST_TOML).expect("test registry");
    let dir = tempfile::tempdir().unwrap();
    let store = SnapshotStore::new(dir.path().join("api"));

    let sources: Vec<Box<dyn FetchSource>> = vec![Box::new(FailingSource {
        desc: descriptor("Broken Feed", SourceKind::Rss),
    })];

    let snapshot = pipeline::run_fetch(&registry, &sources, &store)
        .await
        .expect("fetch run survives");

    // degrade-gracefully: synthetic articles fill the feed floor
    assert_eq!(snapshot.total_articles, 5);
    assert!(snapshot
        .articles
        .iter()
        .all(|a| a.kind == ArticleKind::Sample));
    let now = Utc::now();
    for article in &snapshot.articles {
        assert!(article.published_at <= now);
    }
}

#[tokio::test]
async fn processing_without_a_news_snapshot_writes_placeholders() {
    let registry = SourceRegistry::from_toml_str(TEST_TOML).expect("test registry");
    let dir = tempfile::tempdir().unwrap();
    let store = SnapshotStore::new(dir.path().join("api"));
    let reports_dir = dir.path().join("reports");

    let processed = pipeline::run_process(&registry, &store).expect("process with no input");
    assert_eq!(processed, 0);

    let analytics = store.load_analytics().unwrap().expect("placeholder analytics");
    assert_eq!(analytics.analytics.total_articles, 0);

    pipeline::run_report(&store, &reports_dir).expect("report with no input");
    let json = std::fs::read_to_string(reports_dir.join("weekly-report.json")).unwrap();
    assert!(json.contains("\"total_articles\": 0"));
}
