// src/config.rs
//! Source registry + pipeline tuning, loaded from `config/sources.toml`.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

// --- env defaults & names ---
pub const DEFAULT_SOURCES_CONFIG_PATH: &str = "config/sources.toml";

pub const ENV_SOURCES_CONFIG_PATH: &str = "ECON_SOURCES_PATH";
pub const ENV_FRESHNESS_REWRITE: &str = "ECON_FRESHNESS_REWRITE";

/// How a source's entries are retrieved and tagged. The three feed flavors
/// share the RSS retrieval path but tag their articles differently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Rss,
    GoogleNews,
    Twitter,
    Scrape,
}

/// One entry of the source registry. Immutable after load.
#[derive(Debug, Clone, Deserialize)]
pub struct SourceDescriptor {
    pub name: String,
    pub url: String,
    pub kind: SourceKind,
    pub category: String,
}

/// Tuning knobs shared by the whole pipeline. One set of constants replaces
/// the historical pair of near-duplicate fetch scripts.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PipelineCfg {
    /// Hard ceiling on the aggregated feed.
    pub max_articles: usize,
    /// Below this many real articles, synthetic fallback articles are injected.
    pub fallback_min: usize,
    /// Newest entries taken per source before normalization.
    pub per_source_cap: usize,
    /// Summary truncation length (chars), ellipsis appended when cut.
    pub summary_max_chars: usize,
    /// Politeness pause between source fetches.
    pub request_delay_ms: u64,
    /// Per-request network timeout.
    pub request_timeout_secs: u64,
    /// Trailing window for trend counts.
    pub trend_window_hours: i64,
    /// Rewrite stale year tokens (current year - 1 / - 2) to the current
    /// year. Lossy; kept because the upstream feeds serve stale cached
    /// dates. Disable for correctness-sensitive consumers.
    pub freshness_rewrite: bool,
}

impl Default for PipelineCfg {
    fn default() -> Self {
        Self {
            max_articles: 50,
            fallback_min: 5,
            per_source_cap: 15,
            summary_max_chars: 200,
            request_delay_ms: 500,
            request_timeout_secs: 10,
            trend_window_hours: 24,
            freshness_rewrite: true,
        }
    }
}

/// Parsed `sources.toml`: descriptors, relevance keywords, proxy chain,
/// pipeline tuning.
#[derive(Debug, Clone, Deserialize)]
pub struct SourceRegistry {
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub proxies: Vec<String>,
    #[serde(default)]
    pub pipeline: PipelineCfg,
    pub sources: Vec<SourceDescriptor>,
}

impl SourceRegistry {
    /// Load from a TOML file. Uses ECON_SOURCES_PATH or defaults to
    /// "config/sources.toml".
    pub fn from_toml() -> Result<Self> {
        let path = std::env::var(ENV_SOURCES_CONFIG_PATH)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_SOURCES_CONFIG_PATH));

        let content = fs::read_to_string(&path)
            .with_context(|| format!("reading source registry from {}", path.display()))?;
        Self::from_toml_str(&content)
    }

    /// Load from a TOML string, then apply env overrides.
    pub fn from_toml_str(toml_str: &str) -> Result<Self> {
        let mut reg: SourceRegistry =
            toml::from_str(toml_str).context("parsing source registry toml")?;

        if let Some(flag) = parse_bool_env(std::env::var(ENV_FRESHNESS_REWRITE).ok()) {
            reg.pipeline.freshness_rewrite = flag;
        }

        // Keyword matching is lowercase-substring; normalize once here.
        for kw in &mut reg.keywords {
            *kw = kw.trim().to_ascii_lowercase();
        }
        reg.keywords.retain(|kw| !kw.is_empty());

        Ok(reg)
    }
}

// accept "1"/"0"/"true"/"false"
fn parse_bool_env(raw: Option<String>) -> Option<bool> {
    match raw.as_deref().map(str::trim) {
        Some("1") | Some("true") => Some(true),
        Some("0") | Some("false") => Some(false),
        _ => None,
    }
}
