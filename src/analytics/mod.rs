// src/analytics/mod.rs
//! Analytics stage: pure functions of the aggregated feed. No I/O here; the
//! engine is handed its keyword tables at construction and the batch driver
//! feeds it articles. A bad article skews nothing but its own contribution;
//! nothing in this module aborts the batch.

pub mod extract;
pub mod sentiment;
pub mod source_stats;
pub mod trends;

use chrono::{DateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::article::Article;
use crate::registry::{econ_lexicon, EconLexicon};

pub use extract::{extract_economic_data, MetricValue};
pub use sentiment::{analyze_sentiment, label_for_score, SentimentLabel, SentimentResult};
pub use source_stats::{SourceStats, UpdateFrequency};
pub use trends::{TrendSnapshot, TrendingEntity, TrendingKeyword};

/// Article enriched with everything the analytics stage can say about it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnhancedArticle {
    #[serde(flatten)]
    pub article: Article,
    pub sentiment_analysis: SentimentResult,
    pub extracted_data: BTreeMap<String, MetricValue>,
    pub matched_keywords: Vec<String>,
    pub matched_entities: Vec<String>,
    /// 0.3 per matched keyword + 0.2 per matched entity, capped at 1.0.
    pub relevance_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeakHour {
    pub hour: u32,
    pub count: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SentimentDistribution {
    pub positive: u64,
    pub neutral: u64,
    pub negative: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisPeriod {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

/// Whole-feed rollup.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsSummary {
    pub total_articles: usize,
    pub avg_sentiment: f64,
    pub avg_article_length: f64,
    pub top_sources: Vec<(String, u64)>,
    pub top_categories: Vec<(String, u64)>,
    pub peak_hours: Vec<PeakHour>,
    pub sentiment_distribution: SentimentDistribution,
    pub sources_count: usize,
    pub categories_count: usize,
    pub analysis_period: AnalysisPeriod,
}

/// The analytics engine. Holds the immutable keyword tables; every method is
/// a pure function of its arguments.
#[derive(Debug, Clone)]
pub struct AnalyticsEngine {
    lexicon: EconLexicon,
}

impl AnalyticsEngine {
    pub fn new(lexicon: EconLexicon) -> Self {
        Self { lexicon }
    }

    /// Engine over the embedded lexicon.
    pub fn with_default_lexicon() -> Self {
        Self::new(econ_lexicon().clone())
    }

    pub fn sentiment(&self, text: &str) -> SentimentResult {
        analyze_sentiment(text, &self.lexicon.positive, &self.lexicon.negative)
    }

    pub fn trends(&self, articles: &[Article], now: DateTime<Utc>, window_hours: i64) -> TrendSnapshot {
        trends::detect_trends(&self.lexicon, articles, now, window_hours)
    }

    pub fn source_stats(
        &self,
        articles: &[Article],
        now: DateTime<Utc>,
    ) -> BTreeMap<String, SourceStats> {
        source_stats::source_stats(&self.lexicon, articles, now)
    }

    /// Enrich every article with sentiment, extracted metrics and keyword/
    /// entity matches.
    pub fn enhance(&self, articles: &[Article]) -> Vec<EnhancedArticle> {
        articles
            .iter()
            .map(|article| {
                let text = article.combined_text();
                let lower = text.to_lowercase();

                let matched_keywords: Vec<String> = self
                    .lexicon
                    .indicators
                    .keys()
                    .filter(|kw| lower.contains(kw.as_str()))
                    .cloned()
                    .collect();
                let matched_entities: Vec<String> = self
                    .lexicon
                    .entities
                    .iter()
                    .filter(|e| lower.contains(&e.to_lowercase()))
                    .cloned()
                    .collect();

                let relevance_score = (matched_keywords.len() as f64 * 0.3
                    + matched_entities.len() as f64 * 0.2)
                    .min(1.0);

                EnhancedArticle {
                    sentiment_analysis: self.sentiment(&text),
                    extracted_data: extract_economic_data(&text),
                    matched_keywords,
                    matched_entities,
                    relevance_score,
                    article: article.clone(),
                }
            })
            .collect()
    }

    /// Whole-feed summary: hour histogram, source/category counts, mean
    /// sentiment and length, peak hours, sentiment buckets.
    pub fn summary(&self, articles: &[Article]) -> AnalyticsSummary {
        if articles.is_empty() {
            return AnalyticsSummary::default();
        }

        let mut by_hour: BTreeMap<u32, u64> = BTreeMap::new();
        let mut by_source: BTreeMap<String, u64> = BTreeMap::new();
        let mut by_category: BTreeMap<String, u64> = BTreeMap::new();
        let mut distribution = SentimentDistribution::default();
        let mut sentiment_sum = 0.0;
        let mut length_sum = 0.0;
        let mut period = AnalysisPeriod::default();

        for article in articles {
            *by_hour.entry(article.published_at.hour()).or_insert(0) += 1;
            *by_source.entry(article.source.clone()).or_insert(0) += 1;
            *by_category.entry(article.category.clone()).or_insert(0) += 1;

            let text = article.combined_text();
            let score = self.sentiment(&text).score;
            sentiment_sum += score;
            length_sum += text.chars().count() as f64;

            // Same thresholds as per-article labeling, so the buckets agree.
            match label_for_score(score) {
                SentimentLabel::Positive => distribution.positive += 1,
                SentimentLabel::Neutral => distribution.neutral += 1,
                SentimentLabel::Negative => distribution.negative += 1,
            }

            if period.start.map_or(true, |s| article.published_at < s) {
                period.start = Some(article.published_at);
            }
            if period.end.map_or(true, |e| article.published_at > e) {
                period.end = Some(article.published_at);
            }
        }

        let total = articles.len();
        let sources_count = by_source.len();
        let categories_count = by_category.len();

        AnalyticsSummary {
            total_articles: total,
            avg_sentiment: sentiment_sum / total as f64,
            avg_article_length: length_sum / total as f64,
            top_sources: top_n(by_source, 5),
            top_categories: top_n(by_category, 5),
            peak_hours: peak_hours(by_hour),
            sentiment_distribution: distribution,
            sources_count,
            categories_count,
            analysis_period: period,
        }
    }
}

fn top_n(counts: BTreeMap<String, u64>, n: usize) -> Vec<(String, u64)> {
    let mut pairs: Vec<(String, u64)> = counts.into_iter().collect();
    pairs.sort_by(|a, b| b.1.cmp(&a.1));
    pairs.truncate(n);
    pairs
}

fn peak_hours(by_hour: BTreeMap<u32, u64>) -> Vec<PeakHour> {
    let mut hours: Vec<PeakHour> = by_hour
        .into_iter()
        .map(|(hour, count)| PeakHour { hour, count })
        .collect();
    hours.sort_by(|a, b| b.count.cmp(&a.count));
    hours.truncate(3);
    hours
}
