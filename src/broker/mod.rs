//! Execution sinks.
//!
//! Defines the `OrderSink` trait and provides:
//! - Simulated: logs the payload and returns a synthetic receipt
//! - Alpaca: submits to the trading API (paper or live base URL)

pub mod alpaca;
pub mod simulated;

use anyhow::Result;
use async_trait::async_trait;

use crate::types::{OrderPayload, OrderReceipt};

/// Abstraction over order execution.
///
/// The scanner hands over a bracket payload and logs whatever comes
/// back; order state is not tracked after submission.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OrderSink: Send + Sync {
    /// Submit a bracket order.
    async fn submit_bracket(&self, order: &OrderPayload) -> Result<OrderReceipt>;

    /// Whether orders reach a real venue.
    fn is_live(&self) -> bool;

    /// Sink name for logging.
    fn name(&self) -> &'static str;
}
