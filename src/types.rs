//! Shared types for the TICKGRADE scanner.
//!
//! These types form the data model used across all modules so that
//! collaborator, strategy, and engine modules can depend on them
//! without circular references.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Bars
// ---------------------------------------------------------------------------

/// One OHLCV sample for a fixed time interval.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Bar {
    /// High-minus-low range of this bar.
    pub fn range(&self) -> f64 {
        self.high - self.low
    }
}

/// Time-ordered bars for a single symbol, oldest first.
///
/// Timestamps are strictly increasing; `new` rejects anything else.
#[derive(Debug, Clone, Serialize)]
pub struct BarSeries {
    symbol: String,
    bars: Vec<Bar>,
}

impl BarSeries {
    pub fn new(symbol: impl Into<String>, bars: Vec<Bar>) -> Result<Self, ScanError> {
        let symbol = symbol.into();
        if let Some(idx) = bars
            .windows(2)
            .position(|w| w[1].timestamp <= w[0].timestamp)
        {
            return Err(ScanError::UnorderedSeries {
                symbol,
                index: idx + 1,
            });
        }
        Ok(Self { symbol, bars })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Open of the oldest bar. Panics on an empty series.
    pub fn first_open(&self) -> f64 {
        self.bars
            .first()
            .map(|b| b.open)
            .expect("first_open called on an empty bar series")
    }

    /// Close of the newest bar. Panics on an empty series.
    pub fn last_close(&self) -> f64 {
        self.bars
            .last()
            .map(|b| b.close)
            .expect("last_close called on an empty bar series")
    }

    /// Close `n` bars back from the newest (`0` is the last bar).
    pub fn close_back(&self, n: usize) -> Option<f64> {
        self.bars
            .len()
            .checked_sub(n + 1)
            .map(|i| self.bars[i].close)
    }
}

// ---------------------------------------------------------------------------
// Metrics
// ---------------------------------------------------------------------------

/// Per-symbol, per-tick inputs to the grading rubric.
///
/// Every field has a default, so a partial mapping deserializes with
/// the neutral value for whatever is missing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Metrics {
    /// Percent move from the first open to the last close.
    pub percent_change: f64,
    pub avg_volume: f64,
    /// Simplified ATR (mean high-low range).
    pub atr: f64,
    pub gap_pct: f64,
    pub last_above_20ma: bool,
    pub breakout_confirmed: bool,
    pub hold_2bars: bool,
    /// Volume of the newest bar.
    pub v_last: f64,
    pub sentiment_score: f64,
    pub during_allowed_hours: bool,
    /// Dealer gamma exposure flat or positive; blocks execution.
    pub gex_flat_or_pos: bool,
    pub dark_pool_flag: bool,
}

impl Default for Metrics {
    fn default() -> Self {
        Self {
            percent_change: 0.0,
            avg_volume: 1.0,
            atr: 0.0,
            gap_pct: 0.0,
            last_above_20ma: false,
            breakout_confirmed: false,
            hold_2bars: false,
            v_last: 0.0,
            sentiment_score: 0.5,
            during_allowed_hours: true,
            gex_flat_or_pos: false,
            dark_pool_flag: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Grade
// ---------------------------------------------------------------------------

/// Letter tier derived from the composite score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Grade {
    #[serde(rename = "A+")]
    APlus,
    A,
    B,
    C,
    F,
}

impl Grade {
    /// Only the top two tiers are allowed to trade.
    pub fn is_tradeable(&self) -> bool {
        matches!(self, Grade::APlus | Grade::A)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Grade::APlus => "A+",
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::F => "F",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Orders
// ---------------------------------------------------------------------------

/// Order direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Buy,
    Sell,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Buy => write!(f, "buy"),
            Side::Sell => write!(f, "sell"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderType {
    Limit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeInForce {
    Day,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderClass {
    Bracket,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TakeProfitLeg {
    #[serde(with = "rust_decimal::serde::str")]
    pub limit_price: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StopLossLeg {
    #[serde(with = "rust_decimal::serde::str")]
    pub stop_price: Decimal,
}

/// Entry order paired with a take-profit and a stop-loss leg.
///
/// Serializes to the shape the broker's order endpoint accepts, with
/// prices as decimal strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderPayload {
    pub symbol: String,
    pub qty: u64,
    pub side: Side,
    #[serde(rename = "type")]
    pub order_type: OrderType,
    pub time_in_force: TimeInForce,
    #[serde(with = "rust_decimal::serde::str")]
    pub limit_price: Decimal,
    pub order_class: OrderClass,
    pub take_profit: TakeProfitLeg,
    pub stop_loss: StopLossLeg,
}

impl fmt::Display for OrderPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} x{} @ {} (tp {} / sl {})",
            self.side,
            self.symbol,
            self.qty,
            self.limit_price,
            self.take_profit.limit_price,
            self.stop_loss.stop_price,
        )
    }
}

/// What the execution sink reported back. Logged, never reconciled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderReceipt {
    pub order_id: String,
    pub status: String,
    /// Full provider response, kept for the log line.
    #[serde(default)]
    pub raw: serde_json::Value,
}

impl fmt::Display for OrderReceipt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.order_id, self.status)
    }
}

// ---------------------------------------------------------------------------
// Sentiment
// ---------------------------------------------------------------------------

/// Sentiment score plus a short market hypothesis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentReading {
    /// 0.0 (bearish) to 1.0 (bullish).
    pub sentiment_score: f64,
    /// Informational only.
    pub thesis: String,
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Domain-specific error types for TICKGRADE.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("Bar series for {symbol} is not strictly increasing at index {index}")]
    UnorderedSeries { symbol: String, index: usize },

    #[error("Degenerate input for {symbol}: {message}")]
    DegenerateInput { symbol: String, message: String },

    #[error("Price is not representable as a decimal: {0}")]
    NonFinitePrice(f64),

    #[error("Configuration error: {0}")]
    Config(String),
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
