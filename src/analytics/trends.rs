// src/analytics/trends.rs
//! Trend detection over the trailing window: count indicator keywords and
//! government entities across recent articles, rank by count, keep the top
//! ten of each.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::article::Article;
use crate::registry::EconLexicon;

const TOP_N: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendingKeyword {
    pub keyword: String,
    pub count: u64,
    /// Normalized: count / max(recent article count, 1).
    pub score: f64,
    /// Static weight from the indicator registry.
    pub weight: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendingEntity {
    pub entity: String,
    pub count: u64,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendSnapshot {
    pub trending_keywords: Vec<TrendingKeyword>,
    pub trending_entities: Vec<TrendingEntity>,
    pub total_recent_articles: usize,
    pub analysis_time: DateTime<Utc>,
}

/// Count keyword/entity presence per recent article (one hit per article per
/// term, case-insensitive substring over title + summary).
pub fn detect_trends(
    lexicon: &EconLexicon,
    articles: &[Article],
    now: DateTime<Utc>,
    window_hours: i64,
) -> TrendSnapshot {
    let cutoff = now - Duration::hours(window_hours);
    let recent: Vec<&Article> = articles
        .iter()
        .filter(|a| a.published_at >= cutoff)
        .collect();
    let total_recent = recent.len();

    let mut keyword_counts: BTreeMap<&str, u64> = BTreeMap::new();
    let mut entity_counts: BTreeMap<&str, u64> = BTreeMap::new();

    for article in &recent {
        let text = article.combined_text().to_lowercase();
        for keyword in lexicon.indicators.keys() {
            if text.contains(keyword.as_str()) {
                *keyword_counts.entry(keyword.as_str()).or_insert(0) += 1;
            }
        }
        for entity in &lexicon.entities {
            if text.contains(&entity.to_lowercase()) {
                *entity_counts.entry(entity.as_str()).or_insert(0) += 1;
            }
        }
    }

    let denom = total_recent.max(1) as f64;

    // BTreeMap iteration + stable sort keeps equal counts alphabetical.
    let mut keywords: Vec<TrendingKeyword> = keyword_counts
        .into_iter()
        .map(|(kw, count)| TrendingKeyword {
            keyword: kw.to_string(),
            count,
            score: count as f64 / denom,
            weight: lexicon.indicator_weight(kw),
        })
        .collect();
    keywords.sort_by(|a, b| b.count.cmp(&a.count));
    keywords.truncate(TOP_N);

    let mut entities: Vec<TrendingEntity> = entity_counts
        .into_iter()
        .map(|(entity, count)| TrendingEntity {
            entity: entity.to_string(),
            count,
            score: count as f64 / denom,
        })
        .collect();
    entities.sort_by(|a, b| b.count.cmp(&a.count));
    entities.truncate(TOP_N);

    TrendSnapshot {
        trending_keywords: keywords,
        trending_entities: entities,
        total_recent_articles: total_recent,
        analysis_time: now,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::article::ArticleKind;
    use crate::registry::econ_lexicon;
    use chrono::TimeZone;

    fn article(title: &str, summary: &str, published_at: DateTime<Utc>) -> Article {
        Article {
            id: "t_1".to_string(),
            title: title.to_string(),
            url: "https://example.ng/t".to_string(),
            summary: summary.to_string(),
            source: "Test Source".to_string(),
            category: "general".to_string(),
            kind: ArticleKind::Rss,
            published_at,
            timestamp: published_at,
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn only_recent_articles_count() {
        let t = now();
        let articles = vec![
            article("Inflation pressures persist", "", t - Duration::hours(2)),
            article("Inflation outlook for farmers", "", t - Duration::hours(30)),
        ];
        let snap = detect_trends(econ_lexicon(), &articles, t, 24);
        assert_eq!(snap.total_recent_articles, 1);
        let inflation = snap
            .trending_keywords
            .iter()
            .find(|k| k.keyword == "inflation")
            .expect("inflation trends");
        assert_eq!(inflation.count, 1);
        assert_eq!(inflation.weight, 10);
        assert_eq!(inflation.score, 1.0);
    }

    #[test]
    fn widening_the_window_never_decreases_counts() {
        let t = now();
        let articles: Vec<Article> = (0..5)
            .map(|i| {
                article(
                    "Naira weakens as oil output dips",
                    "",
                    t - Duration::hours(6 * i),
                )
            })
            .collect();

        let narrow = detect_trends(econ_lexicon(), &articles, t, 12);
        let wide = detect_trends(econ_lexicon(), &articles, t, 48);

        for kw in &narrow.trending_keywords {
            let wide_count = wide
                .trending_keywords
                .iter()
                .find(|w| w.keyword == kw.keyword)
                .map(|w| w.count)
                .unwrap_or(0);
            assert!(wide_count >= kw.count, "count shrank for {}", kw.keyword);
        }
    }

    #[test]
    fn entities_are_counted_case_insensitively() {
        let t = now();
        let articles = vec![article(
            "NNPC remits oil revenue",
            "the nnpc said crude receipts rose",
            t,
        )];
        let snap = detect_trends(econ_lexicon(), &articles, t, 24);
        let nnpc = snap
            .trending_entities
            .iter()
            .find(|e| e.entity == "NNPC")
            .expect("NNPC trends");
        assert_eq!(nnpc.count, 1);
    }

    #[test]
    fn empty_window_yields_empty_snapshot() {
        let t = now();
        let articles = vec![article("Inflation note", "", t - Duration::hours(100))];
        let snap = detect_trends(econ_lexicon(), &articles, t, 24);
        assert_eq!(snap.total_recent_articles, 0);
        assert!(snap.trending_keywords.is_empty());
        assert!(snap.trending_entities.is_empty());
    }
}
