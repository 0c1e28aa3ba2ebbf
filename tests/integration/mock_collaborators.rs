//! In-memory collaborators for integration testing.
//!
//! Deterministic `BarSource` and `OrderSink` implementations. State is
//! shared through `Arc`s so test code can inspect it after the scanner
//! takes ownership of a clone.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tickgrade::broker::OrderSink;
use tickgrade::data::BarSource;
use tickgrade::types::*;

/// Serves fixed bar series keyed by symbol.
#[derive(Clone, Default)]
pub struct FixedBars {
    series: Arc<HashMap<String, Vec<Bar>>>,
    failing: Arc<Vec<String>>,
    calls: Arc<Mutex<Vec<(String, u32)>>>,
}

impl FixedBars {
    pub fn new(series: Vec<(&str, Vec<Bar>)>) -> Self {
        Self {
            series: Arc::new(series.into_iter().map(|(s, b)| (s.to_string(), b)).collect()),
            ..Self::default()
        }
    }

    /// Symbols that return a transport error.
    pub fn failing(mut self, symbols: &[&str]) -> Self {
        self.failing = Arc::new(symbols.iter().map(|s| s.to_string()).collect());
        self
    }

    pub fn calls(&self) -> Vec<(String, u32)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl BarSource for FixedBars {
    async fn fetch_bars(&self, symbol: &str, limit: u32) -> Result<BarSeries> {
        self.calls.lock().unwrap().push((symbol.to_string(), limit));

        if self.failing.iter().any(|s| s == symbol) {
            return Err(anyhow!("upstream unavailable for {symbol}"));
        }

        let bars = self.series.get(symbol).cloned().unwrap_or_default();
        let keep = bars.len().saturating_sub(limit as usize);
        Ok(BarSeries::new(symbol, bars[keep..].to_vec())?)
    }

    fn name(&self) -> &'static str {
        "fixed"
    }
}

/// Records every order it receives.
#[derive(Clone, Default)]
pub struct RecordingBroker {
    orders: Arc<Mutex<Vec<OrderPayload>>>,
    /// If set, all submissions fail with this message.
    force_error: Arc<Mutex<Option<String>>>,
}

impl RecordingBroker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_error(&self, msg: &str) {
        *self.force_error.lock().unwrap() = Some(msg.to_string());
    }

    pub fn orders(&self) -> Vec<OrderPayload> {
        self.orders.lock().unwrap().clone()
    }
}

#[async_trait]
impl OrderSink for RecordingBroker {
    async fn submit_bracket(&self, order: &OrderPayload) -> Result<OrderReceipt> {
        if let Some(err) = self.force_error.lock().unwrap().as_ref() {
            return Err(anyhow!("{}", err));
        }

        let mut orders = self.orders.lock().unwrap();
        orders.push(order.clone());
        Ok(OrderReceipt {
            order_id: format!("rec-{}", orders.len()),
            status: "accepted".to_string(),
            raw: serde_json::to_value(order)?,
        })
    }

    fn is_live(&self) -> bool {
        false
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}

// ---------------------------------------------------------------------------
// Bar fixtures
// ---------------------------------------------------------------------------

fn minute(i: usize) -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 14, 30, 0).unwrap() + Duration::minutes(i as i64)
}

/// Steady climb of 0.5 per bar from 100, range 1.0, last bar on triple
/// volume. Grades A under default weights with bullish sentiment.
pub fn rising_bars(n: usize) -> Vec<Bar> {
    (0..n)
        .map(|i| {
            let open = 100.0 + 0.5 * i as f64;
            let close = open + 0.5;
            Bar {
                timestamp: minute(i),
                open,
                high: close + 0.25,
                low: open - 0.25,
                close,
                volume: if i + 1 == n { 3000.0 } else { 1000.0 },
            }
        })
        .collect()
}

/// Unchanged price on even volume.
pub fn flat_bars(n: usize, price: f64) -> Vec<Bar> {
    (0..n)
        .map(|i| Bar {
            timestamp: minute(i),
            open: price,
            high: price + 0.1,
            low: price - 0.1,
            close: price,
            volume: 1000.0,
        })
        .collect()
}
