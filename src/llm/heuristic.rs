//! Rule-based sentiment placeholder.
//!
//! Reads the same prompt envelope a model would, and answers bullish
//! when price is up on above-average volume. Neutral otherwise.

use anyhow::Result;
use async_trait::async_trait;
use tracing::debug;

use super::{SentimentPrompt, SentimentScorer};
use crate::types::{Metrics, SentimentReading};

const BULLISH_SCORE: f64 = 0.8;
const NEUTRAL_SCORE: f64 = 0.5;
const THESIS: &str = "Market bias supportive of trade.";

#[derive(Debug, Default, Clone)]
pub struct HeuristicScorer;

impl HeuristicScorer {
    pub fn new() -> Self {
        Self
    }

    fn evaluate(prompt: &SentimentPrompt<'_>) -> SentimentReading {
        let t = prompt.technical;
        let sentiment_score = if t.percent_change > 0.0 && t.v_last > t.avg_volume {
            BULLISH_SCORE
        } else {
            NEUTRAL_SCORE
        };

        SentimentReading {
            sentiment_score,
            thesis: THESIS.to_string(),
        }
    }
}

#[async_trait]
impl SentimentScorer for HeuristicScorer {
    async fn score(&self, symbol: &str, metrics: &Metrics, news: &[String]) -> Result<SentimentReading> {
        let prompt = SentimentPrompt::new(symbol, metrics, news);
        let reading = Self::evaluate(&prompt);
        debug!(
            symbol,
            score = reading.sentiment_score,
            news = news.len(),
            "Heuristic sentiment"
        );
        Ok(reading)
    }

    fn name(&self) -> &'static str {
        "heuristic"
    }
}
