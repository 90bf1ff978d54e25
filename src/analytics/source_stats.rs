// src/analytics/source_stats.rs
//! Per-source rollups: volume, category mix, average sentiment, and an
//! update-frequency classification from the latest article's recency.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::analytics::sentiment::{analyze_sentiment, label_for_score, SentimentLabel};
use crate::article::Article;
use crate::registry::EconLexicon;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateFrequency {
    VeryFrequent,
    Frequent,
    Daily,
    Infrequent,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceStats {
    pub article_count: u64,
    pub dominant_category: String,
    pub category_distribution: BTreeMap<String, u64>,
    pub avg_sentiment: f64,
    pub sentiment_label: SentimentLabel,
    pub avg_article_length: f64,
    pub latest_article: Option<DateTime<Utc>>,
    pub update_frequency: UpdateFrequency,
}

/// Hours since the latest article → cadence bucket. Sources with fewer than
/// two articles stay unknown; one data point says nothing about cadence.
fn classify_update_frequency(
    latest: Option<DateTime<Utc>>,
    article_count: u64,
    now: DateTime<Utc>,
) -> UpdateFrequency {
    let Some(latest) = latest else {
        return UpdateFrequency::Unknown;
    };
    if article_count < 2 {
        return UpdateFrequency::Unknown;
    }

    let hours_since = (now - latest).num_seconds() as f64 / 3600.0;
    if hours_since < 2.0 {
        UpdateFrequency::VeryFrequent
    } else if hours_since < 6.0 {
        UpdateFrequency::Frequent
    } else if hours_since < 24.0 {
        UpdateFrequency::Daily
    } else {
        UpdateFrequency::Infrequent
    }
}

/// Roll the feed up by source name.
pub fn source_stats(
    lexicon: &EconLexicon,
    articles: &[Article],
    now: DateTime<Utc>,
) -> BTreeMap<String, SourceStats> {
    struct Acc {
        count: u64,
        categories: BTreeMap<String, u64>,
        sentiment_sum: f64,
        length_sum: f64,
        latest: Option<DateTime<Utc>>,
    }

    let mut by_source: BTreeMap<String, Acc> = BTreeMap::new();
    for article in articles {
        let acc = by_source.entry(article.source.clone()).or_insert(Acc {
            count: 0,
            categories: BTreeMap::new(),
            sentiment_sum: 0.0,
            length_sum: 0.0,
            latest: None,
        });

        acc.count += 1;
        *acc.categories.entry(article.category.clone()).or_insert(0) += 1;

        let text = article.combined_text();
        acc.sentiment_sum += analyze_sentiment(&text, &lexicon.positive, &lexicon.negative).score;
        acc.length_sum += text.chars().count() as f64;

        if acc.latest.map_or(true, |l| article.published_at > l) {
            acc.latest = Some(article.published_at);
        }
    }

    by_source
        .into_iter()
        .map(|(source, acc)| {
            let avg_sentiment = acc.sentiment_sum / acc.count.max(1) as f64;
            // ties break to the lexicographically smallest category
            let dominant_category = acc
                .categories
                .iter()
                .max_by(|a, b| a.1.cmp(b.1).then(b.0.cmp(a.0)))
                .map(|(cat, _)| cat.clone())
                .unwrap_or_else(|| "general".to_string());

            let stats = SourceStats {
                article_count: acc.count,
                dominant_category,
                category_distribution: acc.categories,
                avg_sentiment,
                sentiment_label: label_for_score(avg_sentiment),
                avg_article_length: acc.length_sum / acc.count.max(1) as f64,
                latest_article: acc.latest,
                update_frequency: classify_update_frequency(acc.latest, acc.count, now),
            };
            (source, stats)
        })
        .collect()
}
