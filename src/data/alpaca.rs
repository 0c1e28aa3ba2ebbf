//! Alpaca market-data integration.
//!
//! Pulls one-minute stock bars from the v2 data API.
//!
//! API: `GET {base}/stocks/{symbol}/bars?timeframe=1Min&limit=N&sort=desc`
//! Auth: `APCA-API-KEY-ID` / `APCA-API-SECRET-KEY` headers.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{header, Client};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::debug;

use super::BarSource;
use crate::types::{Bar, BarSeries};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

pub const DEFAULT_DATA_URL: &str = "https://data.alpaca.markets/v2";
const TIMEFRAME: &str = "1Min";
const REQUEST_TIMEOUT_SECS: u64 = 10;

// ---------------------------------------------------------------------------
// API response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct AlpacaBar {
    t: DateTime<Utc>,
    o: f64,
    h: f64,
    l: f64,
    c: f64,
    v: f64,
}

/// `bars` is `null` when the window has no trades.
#[derive(Debug, Deserialize)]
struct AlpacaBarsResponse {
    #[serde(default)]
    bars: Option<Vec<AlpacaBar>>,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

pub struct AlpacaBars {
    http: Client,
    base_url: String,
}

impl AlpacaBars {
    pub fn new(api_key: &SecretString, api_secret: &SecretString, base_url: Option<String>) -> Result<Self> {
        let http = Client::builder()
            .default_headers(auth_headers(api_key, api_secret)?)
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .context("Failed to build HTTP client for Alpaca data")?;

        Ok(Self {
            http,
            base_url: base_url.unwrap_or_else(|| DEFAULT_DATA_URL.to_string()),
        })
    }

    fn bars_url(&self, symbol: &str) -> String {
        format!(
            "{}/stocks/{}/bars",
            self.base_url.trim_end_matches('/'),
            urlencoding::encode(symbol)
        )
    }

    /// Newest-first response → oldest-first series.
    fn into_series(symbol: &str, body: AlpacaBarsResponse) -> Result<BarSeries> {
        let mut bars: Vec<Bar> = body
            .bars
            .unwrap_or_default()
            .into_iter()
            .map(|b| Bar {
                timestamp: b.t,
                open: b.o,
                high: b.h,
                low: b.l,
                close: b.c,
                volume: b.v,
            })
            .collect();
        bars.sort_by_key(|b| b.timestamp);

        BarSeries::new(symbol, bars).with_context(|| format!("Alpaca returned malformed bars for {symbol}"))
    }
}

/// Shared Alpaca auth headers, marked sensitive so they stay out of debug output.
pub(crate) fn auth_headers(api_key: &SecretString, api_secret: &SecretString) -> Result<header::HeaderMap> {
    let mut key = header::HeaderValue::from_str(api_key.expose_secret())
        .context("Alpaca API key is not a valid header value")?;
    key.set_sensitive(true);
    let mut secret = header::HeaderValue::from_str(api_secret.expose_secret())
        .context("Alpaca API secret is not a valid header value")?;
    secret.set_sensitive(true);

    let mut headers = header::HeaderMap::new();
    headers.insert("APCA-API-KEY-ID", key);
    headers.insert("APCA-API-SECRET-KEY", secret);
    Ok(headers)
}

#[async_trait]
impl BarSource for AlpacaBars {
    async fn fetch_bars(&self, symbol: &str, limit: u32) -> Result<BarSeries> {
        let url = self.bars_url(symbol);
        debug!(url = %url, limit, "Fetching Alpaca bars");

        let resp = self
            .http
            .get(&url)
            .query(&[
                ("timeframe", TIMEFRAME.to_string()),
                ("limit", limit.to_string()),
                ("sort", "desc".to_string()),
            ])
            .send()
            .await
            .with_context(|| format!("Alpaca bars request failed for {symbol}"))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("Alpaca data API error {status}: {body}");
        }

        let body: AlpacaBarsResponse = resp
            .json()
            .await
            .context("Failed to parse Alpaca bars response")?;

        Self::into_series(symbol, body)
    }

    fn name(&self) -> &'static str {
        "alpaca"
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
