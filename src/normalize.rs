// src/normalize.rs
//! Article normalizer: raw feed entry in, zero or one canonical [`Article`]
//! out. Cleans text, gates on keyword relevance, parses/repairs the publish
//! timestamp, and assigns the stable per-run identifier.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, TimeZone, Utc};
use once_cell::sync::OnceCell;
use regex::Regex;
use time::format_description::well_known::Rfc2822;
use time::OffsetDateTime;

use crate::article::{Article, ArticleKind};
use crate::config::SourceDescriptor;
use crate::fetch::RawEntry;

/// Whether the keyword gate applies for a given adapter. Scrape adapters
/// pre-filter link text and skip the gate; feed adapters require it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelevancePolicy {
    Require,
    Skip,
}

/// Strip HTML tags, collapse entity markers, collapse whitespace, trim.
pub fn clean_text(s: &str) -> String {
    // 1) HTML entity decode (handles double-escaped feed payloads)
    let mut out = html_escape::decode_html_entities(s).to_string();

    // 2) Strip HTML tags
    static RE_TAGS: OnceCell<Regex> = OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| Regex::new(r"(?is)</?[^>]+>").unwrap());
    out = re_tags.replace_all(&out, "").to_string();

    // 3) Collapse leftover entity markers to single spaces
    static RE_ENT: OnceCell<Regex> = OnceCell::new();
    let re_ent = RE_ENT.get_or_init(|| Regex::new(r"&#?[a-zA-Z0-9]+;").unwrap());
    out = re_ent.replace_all(&out, " ").to_string();

    // 4) Collapse whitespace runs (Unicode-aware, so NBSP collapses too)
    static RE_WS: OnceCell<Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| Regex::new(r"\s+").unwrap());
    out = re_ws.replace_all(&out, " ").to_string();

    out.trim().to_string()
}

/// Keyword gate: at least one registry keyword must appear as a
/// case-insensitive substring. Keywords are pre-lowercased at config load.
pub fn is_relevant(text: &str, keywords: &[String]) -> bool {
    if text.is_empty() {
        return false;
    }
    let lower = text.to_ascii_lowercase();
    keywords.iter().any(|kw| lower.contains(kw.as_str()))
}

/// Identifier: source name + 64-bit truncated digest of the cleaned title.
/// Deterministic within a run; not guaranteed stable across runs.
pub fn article_id(source_name: &str, cleaned_title: &str) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(cleaned_title.as_bytes());
    hasher.update(b"|");
    hasher.update(source_name.as_bytes());
    let digest = hasher.finalize();
    let mut out = String::with_capacity(source_name.len() + 17);
    out.push_str(source_name);
    out.push('_');
    for b in digest.iter().take(8) {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}

/// Rewrite year tokens one or two years stale to the current year.
/// Deliberate freshness policy, not a bug: upstream feeds serve stale cached
/// dates. Lossy; gated by `pipeline.freshness_rewrite`.
pub fn rewrite_stale_years(date_str: &str, now: DateTime<Utc>) -> String {
    static RE_YEAR: OnceCell<Regex> = OnceCell::new();
    let re_year = RE_YEAR.get_or_init(|| Regex::new(r"\b(19|20)\d{2}\b").unwrap());

    let current = now.year();
    re_year
        .replace_all(date_str, |caps: &regex::Captures<'_>| {
            let year: i32 = caps[0].parse().unwrap_or(current);
            if year == current - 1 || year == current - 2 {
                current.to_string()
            } else {
                caps[0].to_string()
            }
        })
        .into_owned()
}

/// Parse a feed date by trying a fixed ordered list of known formats.
/// Falls back to `now` on total failure; a future-dated result is clamped to
/// one hour before `now`.
pub fn parse_published(
    raw: Option<&str>,
    now: DateTime<Utc>,
    freshness_rewrite: bool,
) -> DateTime<Utc> {
    let raw = match raw.map(str::trim) {
        Some(s) if !s.is_empty() => s,
        _ => return now,
    };

    let candidate = if freshness_rewrite {
        rewrite_stale_years(raw, now)
    } else {
        raw.to_string()
    };

    let parsed = try_parse_formats(&candidate).unwrap_or(now);
    if parsed > now {
        now - Duration::hours(1)
    } else {
        parsed
    }
}

fn try_parse_formats(s: &str) -> Option<DateTime<Utc>> {
    // RFC-822 style with numeric offset or GMT/UT ("Mon, 06 Jan 2025 10:30:00 +0100")
    if let Ok(dt) = OffsetDateTime::parse(s, &Rfc2822) {
        let unix = dt.unix_timestamp();
        if let Some(dt) = Utc.timestamp_opt(unix, 0).single() {
            return Some(dt);
        }
    }
    // RFC-822 with obsolete zone names ("… EST"), which chrono still accepts
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.with_timezone(&Utc));
    }
    // ISO-8601 with offset or Z
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    // Naive variants, assumed UTC
    for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%d %b %Y %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    // Date only ("Jan 15, 2025")
    if let Ok(date) = NaiveDate::parse_from_str(s, "%b %d, %Y") {
        let naive = date.and_hms_opt(0, 0, 0)?;
        return Some(Utc.from_utc_datetime(&naive));
    }
    None
}

fn truncate_summary(summary: &str, max_chars: usize) -> String {
    if summary.chars().count() > max_chars {
        let mut cut: String = summary.chars().take(max_chars).collect();
        cut.push_str("...");
        cut
    } else {
        summary.to_string()
    }
}

/// Normalization knobs threaded in from the registry.
#[derive(Debug, Clone, Copy)]
pub struct NormalizeCfg<'a> {
    pub keywords: &'a [String],
    pub summary_max_chars: usize,
    pub freshness_rewrite: bool,
}

/// Convert one raw entry into a canonical article, or drop it.
/// Dropping is the only failure mode; this never errors.
pub fn normalize_entry(
    entry: &RawEntry,
    source: &SourceDescriptor,
    kind: ArticleKind,
    policy: RelevancePolicy,
    cfg: NormalizeCfg<'_>,
    now: DateTime<Utc>,
) -> Option<Article> {
    let title = clean_text(entry.title.as_deref().unwrap_or_default());
    let summary = clean_text(
        entry
            .summary
            .as_deref()
            .or(entry.description.as_deref())
            .unwrap_or_default(),
    );

    if policy == RelevancePolicy::Require
        && !is_relevant(&format!("{title} {summary}"), cfg.keywords)
    {
        return None;
    }

    let url = entry.link.as_deref().unwrap_or_default().trim().to_string();
    if title.is_empty() || url.is_empty() {
        return None;
    }

    let published_raw = entry.published.as_deref().or(entry.updated.as_deref());
    let published_at = parse_published(published_raw, now, cfg.freshness_rewrite);

    Some(Article {
        id: article_id(&source.name, &title),
        summary: truncate_summary(&summary, cfg.summary_max_chars),
        title,
        url,
        source: source.name.clone(),
        category: source.category.clone(),
        kind,
        published_at,
        timestamp: now,
    })
}
