// src/analytics/extract.rs
//! Economic metric extraction: a fixed table of regex patterns, each yielding
//! at most one value per article. Values parse to numbers when they can;
//! otherwise the raw capture is kept as text.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetricValue {
    Number(f64),
    Text(String),
}

/// Metric name → pattern. Patterns with alternates carry two capture groups;
/// the first non-empty group of the first match wins.
static PATTERNS: Lazy<Vec<(&'static str, Regex)>> = Lazy::new(|| {
    [
        ("inflation_rate", r"(?i)inflation.*?(\d+\.?\d*)\s*%"),
        (
            "policy_rate",
            r"(?i)MPR.*?(\d+\.?\d*)\s*%|policy rate.*?(\d+\.?\d*)\s*%",
        ),
        (
            "exchange_rate",
            r"(?i)(\d+\.?\d*)\s*(?:naira|NGN)\s*(?:per|to)\s*(?:dollar|USD)",
        ),
        ("gdp_growth", r"(?i)GDP.*?growth.*?(\d+\.?\d*)\s*%"),
        (
            "budget_amount",
            r"(?i)budget.*?₦\s*(\d+(?:,\d+)*(?:\.\d+)?)\s*(?:trillion|billion|million)?",
        ),
        (
            "oil_price",
            r"(?i)oil.*?\$(\d+\.?\d*)|crude.*?\$(\d+\.?\d*)",
        ),
        ("unemployment_rate", r"(?i)unemployment.*?(\d+\.?\d*)\s*%"),
        (
            "debt_amount",
            r"(?i)debt.*?(\d+(?:,\d+)*(?:\.\d+)?)\s*(?:trillion|billion|million)",
        ),
    ]
    .into_iter()
    .map(|(name, pat)| (name, Regex::new(pat).expect("valid metric pattern")))
    .collect()
});

/// Run every pattern over the text. Missing metrics are simply absent from
/// the map; a value that won't parse as a number stays as text.
pub fn extract_economic_data(text: &str) -> BTreeMap<String, MetricValue> {
    let mut out = BTreeMap::new();
    for (name, re) in PATTERNS.iter() {
        let first_group = re.captures_iter(text).find_map(|caps| {
            caps.iter()
                .skip(1)
                .flatten()
                .map(|m| m.as_str().to_string())
                .next()
        });
        if let Some(raw) = first_group {
            let cleaned = raw.replace(',', "");
            let value = match cleaned.parse::<f64>() {
                Ok(n) => MetricValue::Number(n),
                Err(_) => MetricValue::Text(raw),
            };
            out.insert((*name).to_string(), value);
        }
    }
    out
}
