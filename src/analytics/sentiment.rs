// src/analytics/sentiment.rs
//! Bag-of-words sentiment ratio over two fixed economic word lists. This is
//! a keyword-count heuristic, not a trained model; do not read calibrated
//! probabilities into the confidence value.

use serde::{Deserialize, Serialize};

/// Label thresholds, shared with every aggregate bucket computation so an
/// article labeled positive always lands in the positive bucket.
pub const POSITIVE_THRESHOLD: f64 = 0.2;
pub const NEGATIVE_THRESHOLD: f64 = -0.2;

const CONFIDENCE_CAP: f64 = 0.8;
const NEUTRAL_CONFIDENCE: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Positive,
    Neutral,
    Negative,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentResult {
    /// In [-1, 1]: (positive hits − negative hits) / total hits.
    pub score: f64,
    pub label: SentimentLabel,
    /// In [0, 1]: |score| capped at 0.8 when non-neutral, else 0.5.
    pub confidence: f64,
}

impl SentimentResult {
    pub fn neutral() -> Self {
        Self {
            score: 0.0,
            label: SentimentLabel::Neutral,
            confidence: NEUTRAL_CONFIDENCE,
        }
    }
}

/// Bucket a score with the same thresholds used for labeling.
pub fn label_for_score(score: f64) -> SentimentLabel {
    if score > POSITIVE_THRESHOLD {
        SentimentLabel::Positive
    } else if score < NEGATIVE_THRESHOLD {
        SentimentLabel::Negative
    } else {
        SentimentLabel::Neutral
    }
}

/// Count list words present as case-insensitive substrings (presence per
/// word, not occurrences) and derive the ratio score.
pub fn analyze_sentiment(text: &str, positive: &[String], negative: &[String]) -> SentimentResult {
    let lower = text.to_lowercase();
    let pos = positive.iter().filter(|w| lower.contains(w.as_str())).count() as f64;
    let neg = negative.iter().filter(|w| lower.contains(w.as_str())).count() as f64;

    let total = pos + neg;
    if total == 0.0 {
        return SentimentResult::neutral();
    }

    let score = (pos - neg) / total;
    let label = label_for_score(score);
    let confidence = match label {
        SentimentLabel::Neutral => NEUTRAL_CONFIDENCE,
        _ => score.abs().min(CONFIDENCE_CAP),
    };

    SentimentResult {
        score,
        label,
        confidence,
    }
}
