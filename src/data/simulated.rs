//! Simulated minute bars.
//!
//! Generates a random walk around $100 ending at the current minute.
//! Useful for dry runs and for exercising the full pipeline without
//! market-data credentials.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{Duration, DurationRound, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Mutex;
use tracing::debug;

use super::BarSource;
use crate::types::{Bar, BarSeries};

const BASE_PRICE: f64 = 100.0;
/// Per-bar drift of the underlying walk.
const STEP_SCALE: f64 = 0.2;
/// Noise between the walk and a bar's open/close.
const QUOTE_NOISE: f64 = 0.02;
/// Extra wick beyond the body.
const WICK_SCALE: f64 = 0.05;
const MIN_VOLUME: f64 = 1_000.0;
const VOLUME_SCALE: f64 = 100_000.0;

/// Random-walk bar generator.
pub struct SimulatedBars {
    rng: Mutex<StdRng>,
}

impl SimulatedBars {
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Deterministic generator for tests and reproducible runs.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    fn generate(&self, limit: u32) -> Vec<Bar> {
        let now = Utc::now();
        let end = now.duration_trunc(Duration::minutes(1)).unwrap_or(now);
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        let mut base = BASE_PRICE;
        (0..limit)
            .map(|i| {
                base += rng.gen_range(-1.0..1.0) * STEP_SCALE;
                let open = base + rng.gen_range(-1.0..1.0) * QUOTE_NOISE;
                let close = base + rng.gen_range(-1.0..1.0) * QUOTE_NOISE;
                let high = open.max(close) + rng.gen_range(0.0..1.0) * WICK_SCALE;
                let low = open.min(close) - rng.gen_range(0.0..1.0) * WICK_SCALE;
                let volume = (rng.gen_range(0.0..1.0) * VOLUME_SCALE).floor() + MIN_VOLUME;
                let minutes_back = i64::from(limit - 1 - i);

                Bar {
                    timestamp: end - Duration::minutes(minutes_back),
                    open,
                    high,
                    low,
                    close,
                    volume,
                }
            })
            .collect()
    }
}

impl Default for SimulatedBars {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BarSource for SimulatedBars {
    async fn fetch_bars(&self, symbol: &str, limit: u32) -> Result<BarSeries> {
        let bars = self.generate(limit);
        debug!(symbol, count = bars.len(), "Generated simulated bars");
        Ok(BarSeries::new(symbol, bars)?)
    }

    fn name(&self) -> &'static str {
        "simulated"
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
