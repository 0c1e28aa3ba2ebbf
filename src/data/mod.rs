//! Market data sources.
//!
//! Defines the `BarSource` trait and provides a simulated random-walk
//! source for local runs plus an Alpaca REST source for live minute bars.

pub mod alpaca;
pub mod simulated;

use anyhow::Result;
use async_trait::async_trait;

use crate::types::BarSeries;

/// Abstraction over minute-bar providers.
///
/// Implementors return the most recent `limit` bars for a symbol,
/// ordered oldest to newest.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BarSource: Send + Sync {
    /// Fetch up to `limit` recent one-minute bars.
    async fn fetch_bars(&self, symbol: &str, limit: u32) -> Result<BarSeries>;

    /// Provider name for logging.
    fn name(&self) -> &'static str;
}
