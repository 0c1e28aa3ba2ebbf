//! Simulated execution sink. Nothing leaves the process.

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::info;

use super::OrderSink;
use crate::types::{OrderPayload, OrderReceipt};

#[derive(Debug, Default, Clone)]
pub struct SimulatedBroker;

impl SimulatedBroker {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl OrderSink for SimulatedBroker {
    async fn submit_bracket(&self, order: &OrderPayload) -> Result<OrderReceipt> {
        let raw = serde_json::to_value(order).context("Failed to serialise order payload")?;
        info!(
            symbol = %order.symbol,
            payload = %serde_json::to_string_pretty(&raw).unwrap_or_default(),
            "[SIMULATED] Order submit"
        );

        Ok(OrderReceipt {
            order_id: format!("sim-{}", uuid::Uuid::new_v4()),
            status: "simulated".to_string(),
            raw,
        })
    }

    fn is_live(&self) -> bool {
        false
    }

    fn name(&self) -> &'static str {
        "simulated"
    }
}
