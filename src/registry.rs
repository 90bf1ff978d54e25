// src/registry.rs
//! Static analytics tables: weighted economic indicators, government
//! entities, and the sentiment word lists. Loaded once from the embedded
//! lexicon and handed to the analytics engine at construction as immutable
//! data, not mutable global state.

use once_cell::sync::Lazy;
use serde::Deserialize;
use std::collections::BTreeMap;

static LEXICON: Lazy<EconLexicon> = Lazy::new(|| {
    let raw = include_str!("econ_lexicon.json");
    serde_json::from_str::<EconLexicon>(raw).expect("valid econ lexicon")
});

/// Per-indicator metadata. `weight` feeds the trend ranking; `sentiment`
/// records the indicator's usual polarity (informational).
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct IndicatorInfo {
    pub weight: u32,
    pub sentiment: i8,
}

/// The full lexicon. BTreeMap keeps indicator iteration deterministic so
/// equal-count trend entries rank stably.
#[derive(Debug, Clone, Deserialize)]
pub struct EconLexicon {
    pub indicators: BTreeMap<String, IndicatorInfo>,
    pub entities: Vec<String>,
    pub positive: Vec<String>,
    pub negative: Vec<String>,
}

impl EconLexicon {
    pub fn indicator_weight(&self, keyword: &str) -> u32 {
        self.indicators.get(keyword).map(|i| i.weight).unwrap_or(1)
    }
}

/// The embedded lexicon shared by the process.
pub fn econ_lexicon() -> &'static EconLexicon {
    &LEXICON
}
