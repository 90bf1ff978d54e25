// src/report.rs
//! Human-readable rendering of the processed snapshots: a weekly markdown
//! report with a JSON twin, and a short daily digest grouped by source.
//! Consumes analytics output only; never reaches back into earlier stages.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Write as _;

use crate::analytics::{AnalyticsSummary, SourceStats, TrendSnapshot, TrendingKeyword};
use crate::article::Article;

fn sentiment_word(score: f64) -> &'static str {
    if score > 0.2 {
        "Positive"
    } else if score < -0.2 {
        "Negative"
    } else {
        "Neutral"
    }
}

/// Weekly report, markdown.
pub fn weekly_report(
    analytics: &AnalyticsSummary,
    trends: &TrendSnapshot,
    sources: &BTreeMap<String, SourceStats>,
    now: DateTime<Utc>,
) -> String {
    let mut out = String::new();
    let date = now.format("%Y-%m-%d");

    let _ = writeln!(out, "# Nigeria Economic News Weekly Report");
    let _ = writeln!(out, "**Report Period**: {date}\n");

    let _ = writeln!(out, "## Executive Summary\n");
    let _ = writeln!(
        out,
        "- **Total Articles Analyzed**: {}",
        analytics.total_articles
    );
    let _ = writeln!(
        out,
        "- **Overall Sentiment**: {}",
        sentiment_word(analytics.avg_sentiment)
    );
    let active: Vec<&str> = analytics
        .top_sources
        .iter()
        .take(3)
        .map(|(name, _)| name.as_str())
        .collect();
    let _ = writeln!(out, "- **Most Active Sources**: {}\n", active.join(", "));

    let _ = writeln!(out, "## Trending Topics This Week\n");
    for (i, topic) in trends.trending_keywords.iter().take(5).enumerate() {
        let _ = writeln!(
            out,
            "{}. **{}** - Mentioned {} times (Score: {:.2})",
            i + 1,
            title_case(&topic.keyword),
            topic.count,
            topic.score
        );
    }

    let _ = writeln!(out, "\n## Government Entities in Focus\n");
    for (i, entity) in trends.trending_entities.iter().take(5).enumerate() {
        let _ = writeln!(
            out,
            "{}. **{}** - Mentioned {} times",
            i + 1,
            entity.entity,
            entity.count
        );
    }

    let _ = writeln!(out, "\n## Source Performance\n");
    let _ = writeln!(out, "| Source | Articles | Dominant Category | Avg Sentiment |");
    let _ = writeln!(out, "|--------|----------|-------------------|---------------|");
    for (name, stats) in sources.iter().take(10) {
        let _ = writeln!(
            out,
            "| {} | {} | {} | {} |",
            name,
            stats.article_count,
            title_case(&stats.dominant_category),
            sentiment_word(stats.avg_sentiment)
        );
    }

    let _ = writeln!(out, "\n## Peak News Hours\n");
    for peak in &analytics.peak_hours {
        let _ = writeln!(
            out,
            "- **{:02}:00**: {} articles published",
            peak.hour, peak.count
        );
    }

    let _ = writeln!(out, "\n## Insights\n");
    for insight in generate_insights(analytics, trends) {
        let _ = writeln!(out, "- {insight}");
    }

    let _ = writeln!(
        out,
        "\n---\n*Report generated automatically on {} UTC*",
        now.format("%Y-%m-%d %H:%M")
    );
    out
}

/// JSON twin of the weekly report, for API consumers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeeklyReport {
    pub report_date: String,
    pub total_articles: usize,
    pub avg_sentiment: f64,
    pub trending_topics: Vec<TrendingKeyword>,
    pub top_sources: Vec<(String, u64)>,
    pub insights: Vec<String>,
}

pub fn weekly_report_json(
    analytics: &AnalyticsSummary,
    trends: &TrendSnapshot,
    now: DateTime<Utc>,
) -> WeeklyReport {
    WeeklyReport {
        report_date: now.format("%Y-%m-%d").to_string(),
        total_articles: analytics.total_articles,
        avg_sentiment: analytics.avg_sentiment,
        trending_topics: trends.trending_keywords.iter().take(5).cloned().collect(),
        top_sources: analytics.top_sources.iter().take(5).cloned().collect(),
        insights: generate_insights(analytics, trends),
    }
}

/// Rule-based observations derived from the aggregates.
pub fn generate_insights(analytics: &AnalyticsSummary, trends: &TrendSnapshot) -> Vec<String> {
    let mut insights = Vec::new();

    if analytics.total_articles > 100 {
        insights.push("High volume of economic news indicates active market discussions".to_string());
    } else if analytics.total_articles < 20 {
        insights.push("Low news volume may indicate slower economic news cycle".to_string());
    }

    if analytics.avg_sentiment > 0.3 {
        insights.push("Strong positive sentiment suggests optimistic economic outlook".to_string());
    } else if analytics.avg_sentiment < -0.3 {
        insights.push("Strong negative sentiment indicates significant economic concerns".to_string());
    }

    if analytics.sources_count >= 5 {
        insights.push(format!(
            "Good source diversity with {} active sources",
            analytics.sources_count
        ));
    } else {
        insights.push(format!(
            "Limited source coverage ({} sources), consider adding more",
            analytics.sources_count
        ));
    }

    if let Some(top) = trends.trending_keywords.first() {
        insights.push(format!(
            "'{}' is the dominant economic topic",
            title_case(&top.keyword)
        ));
    }

    if let Some(peak) = analytics.peak_hours.first() {
        insights.push(format!("Peak news publishing hour: {}:00", peak.hour));
    }

    insights
}

/// Short digest of today's articles, grouped by source, up to three stories
/// each. Returns None when no article carries today's date.
pub fn daily_digest(articles: &[Article], now: DateTime<Utc>) -> Option<String> {
    let today = now.date_naive();
    let todays: Vec<&Article> = articles
        .iter()
        .filter(|a| a.published_at.date_naive() == today)
        .collect();
    if todays.is_empty() {
        return None;
    }

    let mut by_source: BTreeMap<&str, Vec<&Article>> = BTreeMap::new();
    for article in &todays {
        by_source.entry(article.source.as_str()).or_default().push(article);
    }

    let mut out = String::new();
    let _ = writeln!(out, "# Nigeria Economic News Daily Digest");
    let _ = writeln!(out, "**Date**: {}", today.format("%Y-%m-%d"));
    let _ = writeln!(out, "**Total Articles Today**: {}\n", todays.len());
    let _ = writeln!(out, "## Top Stories Today\n");

    for (source, items) in by_source {
        let _ = writeln!(out, "### {source}\n");
        for (i, article) in items.iter().take(3).enumerate() {
            let _ = writeln!(out, "{}. **{}**", i + 1, article.title);
            if !article.summary.is_empty() {
                let short: String = article.summary.chars().take(100).collect();
                if article.summary.chars().count() > 100 {
                    let _ = writeln!(out, "   *{short}...*");
                } else {
                    let _ = writeln!(out, "   *{short}*");
                }
            }
            let _ = writeln!(out);
        }
    }

    let _ = writeln!(
        out,
        "---\n*Automatically generated on {} UTC*",
        now.format("%H:%M")
    );
    Some(out)
}

fn title_case(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::AnalyticsEngine;
    use crate::article::ArticleKind;
    use chrono::{Duration, TimeZone};

    fn article(source: &str, title: &str, published_at: DateTime<Utc>) -> Article {
        Article {
            id: format!("{source}_r"),
            title: title.to_string(),
            url: "https://example.ng/r".to_string(),
            summary: "Inflation hit 21.5% in January as growth slowed.".to_string(),
            source: source.to_string(),
            category: "business".to_string(),
            kind: ArticleKind::Rss,
            published_at,
            timestamp: published_at,
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn weekly_report_contains_all_sections() {
        let engine = AnalyticsEngine::with_default_lexicon();
        let t = now();
        let articles = vec![
            article("Nairametrics", "Inflation pressures persist", t),
            article("Punch Nigeria", "Naira gains on CBN intervention", t - Duration::hours(2)),
        ];
        let analytics = engine.summary(&articles);
        let trends = engine.trends(&articles, t, 24);
        let sources = engine.source_stats(&articles, t);

        let report = weekly_report(&analytics, &trends, &sources, t);
        for heading in [
            "# Nigeria Economic News Weekly Report",
            "## Executive Summary",
            "## Trending Topics This Week",
            "## Source Performance",
            "## Peak News Hours",
            "## Insights",
        ] {
            assert!(report.contains(heading), "missing {heading}");
        }
        assert!(report.contains("| Nairametrics |"));
    }

    #[test]
    fn insights_mention_the_top_topic() {
        let engine = AnalyticsEngine::with_default_lexicon();
        let t = now();
        let articles = vec![article("Nairametrics", "Inflation outlook worsens", t)];
        let analytics = engine.summary(&articles);
        let trends = engine.trends(&articles, t, 24);

        let insights = generate_insights(&analytics, &trends);
        assert!(insights.iter().any(|i| i.contains("Inflation")));
        assert!(insights.iter().any(|i| i.contains("news cycle")));
    }

    #[test]
    fn daily_digest_groups_by_source_and_skips_old_news() {
        let t = now();
        let articles = vec![
            article("Nairametrics", "Naira steadies", t - Duration::hours(1)),
            article("Nairametrics", "Bond yields dip", t - Duration::hours(2)),
            article("Punch Nigeria", "Fuel prices hold", t - Duration::hours(3)),
            article("The Cable", "Old story from before", t - Duration::days(3)),
        ];
        let digest = daily_digest(&articles, t).expect("digest for today");
        assert!(digest.contains("**Total Articles Today**: 3"));
        assert!(digest.contains("### Nairametrics"));
        assert!(digest.contains("### Punch Nigeria"));
        assert!(!digest.contains("Old story from before"));
    }

    #[test]
    fn no_todays_articles_means_no_digest() {
        let t = now();
        let articles = vec![article("The Cable", "Stale story", t - Duration::days(2))];
        assert!(daily_digest(&articles, t).is_none());
    }

    #[test]
    fn weekly_json_twin_matches_markdown_inputs() {
        let engine = AnalyticsEngine::with_default_lexicon();
        let t = now();
        let articles = vec![article("Nairametrics", "Inflation pressures persist", t)];
        let analytics = engine.summary(&articles);
        let trends = engine.trends(&articles, t, 24);

        let json = weekly_report_json(&analytics, &trends, t);
        assert_eq!(json.report_date, "2025-06-01");
        assert_eq!(json.total_articles, 1);
        assert_eq!(json.insights, generate_insights(&analytics, &trends));
    }
}
