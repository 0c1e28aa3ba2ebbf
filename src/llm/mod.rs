//! Sentiment enrichment.
//!
//! Defines the `SentimentScorer` trait and the JSON envelope a
//! model-backed scorer receives. The shipped scorer is a deterministic
//! heuristic; a language-model client plugs in behind the same trait.

pub mod heuristic;

use anyhow::Result;
use async_trait::async_trait;
use serde::Serialize;

use crate::types::{Metrics, SentimentReading};

/// Instruction sent alongside the technical snapshot.
pub const SENTIMENT_ASK: &str = "give me a sentiment score (0-1) and short market hypothesis";

/// Request envelope for a sentiment model: the symbol, its technical
/// snapshot, and any news snippets.
#[derive(Debug, Clone, Serialize)]
pub struct SentimentPrompt<'a> {
    pub symbol: &'a str,
    pub technical: &'a Metrics,
    pub news: &'a [String],
    pub ask: &'static str,
}

impl<'a> SentimentPrompt<'a> {
    pub fn new(symbol: &'a str, technical: &'a Metrics, news: &'a [String]) -> Self {
        Self {
            symbol,
            technical,
            news,
            ask: SENTIMENT_ASK,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Abstraction over sentiment sources.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SentimentScorer: Send + Sync {
    /// Score a symbol given its technical snapshot and news snippets.
    async fn score(&self, symbol: &str, metrics: &Metrics, news: &[String]) -> Result<SentimentReading>;

    /// Scorer identifier for logging.
    fn name(&self) -> &'static str;
}
