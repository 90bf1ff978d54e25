// src/snapshot.rs
//! Flat JSON snapshot store. Every file is rewritten whole each run; writes
//! go to a temp file in the same directory and are renamed into place so a
//! mid-run crash never leaves a half-written snapshot visible.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::analytics::{AnalyticsSummary, EnhancedArticle, SourceStats, TrendSnapshot, TrendingKeyword};
use crate::article::Article;

/// The `news.json` shape consumed by the process stage and external readers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsSnapshot {
    pub status: String,
    pub last_updated: DateTime<Utc>,
    pub total_articles: usize,
    pub sources_used: Vec<String>,
    pub articles: Vec<Article>,
}

impl NewsSnapshot {
    pub fn new(articles: Vec<Article>, sources_used: Vec<String>, now: DateTime<Utc>) -> Self {
        Self {
            status: "success".to_string(),
            last_updated: now,
            total_articles: articles.len(),
            sources_used,
            articles,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnhancedSnapshot {
    pub processed_at: DateTime<Utc>,
    pub articles: Vec<EnhancedArticle>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsSnapshot {
    pub generated_at: DateTime<Utc>,
    pub analytics: AnalyticsSummary,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendingSnapshotFile {
    pub generated_at: DateTime<Utc>,
    pub trends: TrendSnapshot,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourcesStatsSnapshot {
    pub generated_at: DateTime<Utc>,
    pub sources: BTreeMap<String, SourceStats>,
}

/// Quick-consumption rollup written alongside the full outputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingSummary {
    pub processing_completed: DateTime<Utc>,
    pub total_articles_processed: usize,
    pub analytics_summary: ProcessingSummaryInner,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingSummaryInner {
    pub avg_sentiment: f64,
    pub top_sources: Vec<(String, u64)>,
    pub trending_keywords: Vec<TrendingKeyword>,
}

/// Fetch-run rollup (`update-summary.json`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateSummary {
    pub update_time: DateTime<Utc>,
    pub article_count: usize,
    pub oldest_article: Option<DateTime<Utc>>,
    pub newest_article: Option<DateTime<Utc>>,
    pub sources: Vec<String>,
}

pub struct SnapshotStore {
    api_dir: PathBuf,
}

impl SnapshotStore {
    pub fn new(api_dir: impl Into<PathBuf>) -> Self {
        Self {
            api_dir: api_dir.into(),
        }
    }

    fn processed_dir(&self) -> PathBuf {
        self.api_dir.join("processed")
    }

    pub fn news_path(&self) -> PathBuf {
        self.api_dir.join("news.json")
    }

    pub fn write_news(&self, snapshot: &NewsSnapshot) -> Result<()> {
        write_json_atomic(&self.news_path(), snapshot)
    }

    /// Read the previous fetch output back. A missing file is the
    /// empty-but-recoverable case, not an error.
    pub fn load_news(&self) -> Result<Option<NewsSnapshot>> {
        load_json_optional(&self.news_path())
    }

    pub fn write_update_summary(&self, snapshot: &NewsSnapshot) -> Result<()> {
        let mut sources: Vec<String> = snapshot
            .articles
            .iter()
            .map(|a| a.source.clone())
            .collect();
        sources.sort();
        sources.dedup();

        let summary = UpdateSummary {
            update_time: snapshot.last_updated,
            article_count: snapshot.articles.len(),
            oldest_article: snapshot.articles.last().map(|a| a.published_at),
            newest_article: snapshot.articles.first().map(|a| a.published_at),
            sources,
        };
        write_json_atomic(&self.api_dir.join("update-summary.json"), &summary)
    }

    /// Write the full derived set for one processing run.
    pub fn write_processed(
        &self,
        enhanced: &[EnhancedArticle],
        analytics: &AnalyticsSummary,
        trends: &TrendSnapshot,
        sources: &BTreeMap<String, SourceStats>,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let dir = self.processed_dir();

        write_json_atomic(
            &dir.join("articles-enhanced.json"),
            &EnhancedSnapshot {
                processed_at: now,
                articles: enhanced.to_vec(),
            },
        )?;
        write_json_atomic(
            &dir.join("analytics.json"),
            &AnalyticsSnapshot {
                generated_at: now,
                analytics: analytics.clone(),
            },
        )?;
        write_json_atomic(
            &dir.join("trending.json"),
            &TrendingSnapshotFile {
                generated_at: now,
                trends: trends.clone(),
            },
        )?;
        write_json_atomic(
            &dir.join("sources-stats.json"),
            &SourcesStatsSnapshot {
                generated_at: now,
                sources: sources.clone(),
            },
        )?;
        write_json_atomic(
            &dir.join("summary.json"),
            &ProcessingSummary {
                processing_completed: now,
                total_articles_processed: enhanced.len(),
                analytics_summary: ProcessingSummaryInner {
                    avg_sentiment: analytics.avg_sentiment,
                    top_sources: analytics.top_sources.clone(),
                    trending_keywords: trends.trending_keywords.iter().take(3).cloned().collect(),
                },
            },
        )
    }

    pub fn load_analytics(&self) -> Result<Option<AnalyticsSnapshot>> {
        load_json_optional(&self.processed_dir().join("analytics.json"))
    }

    pub fn load_trending(&self) -> Result<Option<TrendingSnapshotFile>> {
        load_json_optional(&self.processed_dir().join("trending.json"))
    }

    pub fn load_sources_stats(&self) -> Result<Option<SourcesStatsSnapshot>> {
        load_json_optional(&self.processed_dir().join("sources-stats.json"))
    }
}

/// Serialize to a sibling temp file, then rename over the target. Rename is
/// atomic on the same filesystem, so readers see the old file or the new one,
/// never a torn write.
pub fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let body = serde_json::to_vec_pretty(value).context("serializing snapshot")?;
    write_bytes_atomic(path, &body)
}

/// Same temp-then-rename discipline for rendered text outputs.
pub fn write_text_atomic(path: &Path, body: &str) -> Result<()> {
    write_bytes_atomic(path, body.as_bytes())
}

fn write_bytes_atomic(path: &Path, body: &[u8]) -> Result<()> {
    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent)
        .with_context(|| format!("creating output dir {}", parent.display()))?;

    let tmp = path.with_extension("tmp");
    fs::write(&tmp, body).with_context(|| format!("writing {}", tmp.display()))?;
    fs::rename(&tmp, path)
        .with_context(|| format!("replacing {}", path.display()))?;
    Ok(())
}

fn load_json_optional<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    let content = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::warn!(path = %path.display(), "snapshot missing; treating as empty");
            return Ok(None);
        }
        Err(e) => return Err(e).with_context(|| format!("reading {}", path.display())),
    };
    let value = serde_json::from_str(&content)
        .with_context(|| format!("parsing {}", path.display()))?;
    Ok(Some(value))
}
