//! Alpaca trading API integration.
//!
//! Submits equity bracket orders. Point `base_url` at the paper endpoint
//! for simulation against real market conditions.
//!
//! API: `POST {base}/v2/orders`
//! Auth: `APCA-API-KEY-ID` / `APCA-API-SECRET-KEY` headers.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use secrecy::SecretString;
use serde::Deserialize;
use tracing::debug;

use super::OrderSink;
use crate::data::alpaca::auth_headers;
use crate::types::{OrderPayload, OrderReceipt};

pub const PAPER_BASE_URL: &str = "https://paper-api.alpaca.markets";
const REQUEST_TIMEOUT_SECS: u64 = 10;

/// The subset of Alpaca's order object we log.
#[derive(Debug, Deserialize)]
struct AlpacaOrder {
    id: String,
    #[serde(default)]
    status: String,
}

pub struct AlpacaBroker {
    http: Client,
    base_url: String,
}

impl AlpacaBroker {
    pub fn new(api_key: &SecretString, api_secret: &SecretString, base_url: Option<String>) -> Result<Self> {
        let http = Client::builder()
            .default_headers(auth_headers(api_key, api_secret)?)
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .context("Failed to build HTTP client for Alpaca trading")?;

        Ok(Self {
            http,
            base_url: base_url.unwrap_or_else(|| PAPER_BASE_URL.to_string()),
        })
    }

    fn orders_url(&self) -> String {
        format!("{}/v2/orders", self.base_url.trim_end_matches('/'))
    }

    fn receipt_from(raw: serde_json::Value) -> Result<OrderReceipt> {
        let order: AlpacaOrder =
            serde_json::from_value(raw.clone()).context("Alpaca order response missing id")?;
        Ok(OrderReceipt {
            order_id: order.id,
            status: order.status,
            raw,
        })
    }
}

#[async_trait]
impl OrderSink for AlpacaBroker {
    async fn submit_bracket(&self, order: &OrderPayload) -> Result<OrderReceipt> {
        let url = self.orders_url();
        debug!(url = %url, symbol = %order.symbol, "Posting Alpaca order");

        let resp = self
            .http
            .post(&url)
            .json(order)
            .send()
            .await
            .with_context(|| format!("Alpaca order request failed for {}", order.symbol))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("Alpaca trading API error {status}: {body}");
        }

        let raw: serde_json::Value = resp
            .json()
            .await
            .context("Failed to parse Alpaca order response")?;

        Self::receipt_from(raw)
    }

    fn is_live(&self) -> bool {
        true
    }

    fn name(&self) -> &'static str {
        "alpaca"
    }
}
