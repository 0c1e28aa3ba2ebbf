//! Configuration loading from TOML with environment variable resolution.
//!
//! Reads `config.toml` and deserializes into strongly-typed structs.
//! Every section has defaults, so a file only needs the keys it changes.
//! Secrets (API keys) are referenced by env-var name in the config and
//! resolved at startup into `SecretString`s.

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveTime, Utc};
use secrecy::SecretString;
use serde::Deserialize;
use std::fs;
use std::time::Duration;

use crate::strategy::rubric::RubricWeights;
use crate::strategy::sizing::SizingConfig;
use crate::types::ScanError;

/// Top-level application configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    #[serde(default = "default_symbols")]
    pub symbols: Vec<String>,
    #[serde(default)]
    pub scan: ScanConfig,
    #[serde(default)]
    pub account: AccountConfig,
    /// Absent table means default weights; a present one is taken as-is.
    #[serde(default)]
    pub rubric_weights: RubricWeights,
    #[serde(default)]
    pub sizing: SizingConfig,
    #[serde(default)]
    pub data_provider: DataProviderConfig,
    #[serde(default)]
    pub execution: ExecutionConfig,
}

fn default_symbols() -> Vec<String> {
    ["SPY", "QQQ", "TSLA"].iter().map(|s| s.to_string()).collect()
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ScanConfig {
    /// Bars requested per symbol per tick.
    pub lookback_bars: u32,
    /// Shorter series are skipped for the tick.
    pub min_bars: usize,
    pub scan_interval_secs: u64,
    /// Execution is only valid inside this UTC window. Absent means always.
    pub allowed_window_utc: Option<TradingWindow>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            lookback_bars: 18,
            min_bars: 6,
            scan_interval_secs: 30,
            allowed_window_utc: None,
        }
    }
}

impl ScanConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.scan_interval_secs)
    }

    pub fn during_allowed_hours(&self, now: DateTime<Utc>) -> bool {
        self.allowed_window_utc
            .as_ref()
            .map_or(true, |w| w.contains(now.time()))
    }
}

/// Half-open `[start, end)` time-of-day window. Wraps past midnight when
/// `end < start`.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
pub struct TradingWindow {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl TradingWindow {
    pub fn contains(&self, t: NaiveTime) -> bool {
        if self.start <= self.end {
            self.start <= t && t < self.end
        } else {
            t >= self.start || t < self.end
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AccountConfig {
    /// Account equity used for sizing. Not fetched from the broker.
    pub value: f64,
}

impl Default for AccountConfig {
    fn default() -> Self {
        Self { value: 100_000.0 }
    }
}

/// Which concrete collaborator backs an interface.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[default]
    #[serde(alias = "simulated")]
    Mock,
    Alpaca,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DataProviderConfig {
    #[serde(rename = "type")]
    pub kind: ProviderKind,
    pub api_key_env: String,
    pub api_secret_env: String,
    pub base_url: Option<String>,
    /// Seed for the simulated walk; random when absent.
    pub seed: Option<u64>,
}

impl Default for DataProviderConfig {
    fn default() -> Self {
        Self {
            kind: ProviderKind::Mock,
            api_key_env: "APCA_API_KEY_ID".to_string(),
            api_secret_env: "APCA_API_SECRET_KEY".to_string(),
            base_url: None,
            seed: None,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ExecutionConfig {
    pub provider: ProviderKind,
    pub api_key_env: String,
    pub api_secret_env: String,
    pub base_url: Option<String>,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::Mock,
            api_key_env: "APCA_API_KEY_ID".to_string(),
            api_secret_env: "APCA_API_SECRET_KEY".to_string(),
            base_url: None,
        }
    }
}

impl AppConfig {
    /// Load and validate configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {path}"))?;
        Self::from_toml_str(&contents)
            .with_context(|| format!("Invalid config file: {path}"))
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(contents).context("Failed to parse config TOML")?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the scanner cannot run with.
    pub fn validate(&self) -> Result<(), ScanError> {
        let fail = |msg: String| Err(ScanError::Config(msg));

        if self.symbols.is_empty() {
            return fail("symbols must not be empty".into());
        }
        if let Some(bad) = self.symbols.iter().find(|s| s.trim().is_empty()) {
            return fail(format!("blank symbol in list: {bad:?}"));
        }
        if self.scan.min_bars < 2 {
            return fail(format!("scan.min_bars must be at least 2, got {}", self.scan.min_bars));
        }
        if (self.scan.lookback_bars as usize) < self.scan.min_bars {
            return fail(format!(
                "scan.lookback_bars ({}) must be >= scan.min_bars ({})",
                self.scan.lookback_bars, self.scan.min_bars
            ));
        }
        if self.scan.scan_interval_secs == 0 {
            return fail("scan.scan_interval_secs must be positive".into());
        }
        if !(self.account.value.is_finite() && self.account.value > 0.0) {
            return fail(format!("account.value must be positive, got {}", self.account.value));
        }
        if let Some((name, w)) = self
            .rubric_weights
            .iter()
            .find(|(_, w)| !(w.is_finite() && *w >= 0.0))
        {
            return fail(format!("rubric weight {name} must be non-negative, got {w}"));
        }
        let tiers = [
            ("grade_a_plus", self.sizing.grade_a_plus),
            ("grade_a", self.sizing.grade_a),
            ("grade_b", self.sizing.grade_b),
            ("max_risk_per_trade_pct", self.sizing.max_risk_per_trade_pct),
        ];
        if let Some((name, pct)) = tiers.iter().find(|(_, p)| !(0.0..=1.0).contains(p)) {
            return fail(format!("sizing.{name} must be within [0, 1], got {pct}"));
        }
        if let Some(w) = self.scan.allowed_window_utc {
            if w.start == w.end {
                return fail("scan.allowed_window_utc start and end must differ".into());
            }
        }
        Ok(())
    }

    /// Resolve an environment variable name to a secret.
    pub fn resolve_secret(env_name: &str) -> Result<SecretString> {
        std::env::var(env_name)
            .map(SecretString::new)
            .with_context(|| format!("Environment variable not set: {env_name}"))
    }
}
