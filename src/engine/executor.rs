//! Order executor.
//!
//! Hands bracket payloads to the configured `OrderSink` and logs what
//! comes back. No order state is kept after submission.

use anyhow::{Context, Result};
use tracing::info;

use crate::broker::OrderSink;
use crate::types::{OrderPayload, OrderReceipt};

pub struct Executor {
    sink: Box<dyn OrderSink>,
}

impl Executor {
    pub fn new(sink: Box<dyn OrderSink>) -> Self {
        Self { sink }
    }

    pub fn is_live(&self) -> bool {
        self.sink.is_live()
    }

    pub fn sink_name(&self) -> &'static str {
        self.sink.name()
    }

    /// Submit one bracket order.
    pub async fn submit(&self, order: &OrderPayload) -> Result<OrderReceipt> {
        info!(
            sink = self.sink.name(),
            live = self.sink.is_live(),
            order = %order,
            "Submitting bracket order"
        );

        let receipt = self
            .sink
            .submit_bracket(order)
            .await
            .with_context(|| {
                format!("{} sink rejected bracket order for {}", self.sink.name(), order.symbol)
            })?;

        info!(
            symbol = %order.symbol,
            order_id = %receipt.order_id,
            status = %receipt.status,
            "Order accepted"
        );
        Ok(receipt)
    }
}
