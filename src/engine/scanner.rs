//! Symbol scanner and tick loop.
//!
//! Each tick walks the configured symbols in order: fetch bars, compute
//! metrics, ask the sentiment scorer, grade, and hand eligible orders to
//! the executor. Every symbol ends in a `SymbolOutcome`; one bad symbol
//! never stops the others.

use anyhow::{Context, Result};
use chrono::Utc;
use std::future::Future;
use tracing::{debug, error, info};

use super::executor::Executor;
use crate::config::{AppConfig, ScanConfig};
use crate::data::BarSource;
use crate::llm::SentimentScorer;
use crate::strategy::indicators::ExternalFlags;
use crate::strategy::rubric::GradePacket;
use crate::strategy::{GradingPipeline, OrderPlan};
use crate::types::{Metrics, OrderPayload, OrderReceipt, ScanError};

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

/// What happened to a graded symbol's order.
#[derive(Debug, Clone, PartialEq)]
pub enum OrderOutcome {
    NotEligible,
    ZeroQuantity,
    Submitted {
        payload: OrderPayload,
        receipt: OrderReceipt,
    },
}

/// Result of scanning one symbol on one tick.
#[derive(Debug, Clone, PartialEq)]
pub enum SymbolOutcome {
    /// Too few bars to grade.
    Skipped { symbol: String, bars: usize },
    Graded {
        packet: GradePacket,
        order: OrderOutcome,
    },
    /// A collaborator failed or the data was degenerate.
    Failed { symbol: String, error: String },
}

impl SymbolOutcome {
    pub fn symbol(&self) -> &str {
        match self {
            Self::Skipped { symbol, .. } | Self::Failed { symbol, .. } => symbol,
            Self::Graded { packet, .. } => &packet.symbol,
        }
    }

    pub fn is_submitted(&self) -> bool {
        matches!(
            self,
            Self::Graded {
                order: OrderOutcome::Submitted { .. },
                ..
            }
        )
    }
}

/// Per-tick summary.
#[derive(Debug, Clone, Default)]
pub struct TickReport {
    pub tick: u64,
    pub outcomes: Vec<SymbolOutcome>,
}

impl TickReport {
    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, SymbolOutcome::Skipped { .. }))
    }

    pub fn graded(&self) -> usize {
        self.count(|o| matches!(o, SymbolOutcome::Graded { .. }))
    }

    pub fn submitted(&self) -> usize {
        self.count(SymbolOutcome::is_submitted)
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, SymbolOutcome::Failed { .. }))
    }

    fn count(&self, pred: impl Fn(&SymbolOutcome) -> bool) -> usize {
        self.outcomes.iter().filter(|o| pred(o)).count()
    }

    /// Log a one-line tick summary.
    pub fn log(&self) {
        info!(
            tick = self.tick,
            symbols = self.outcomes.len(),
            graded = self.graded(),
            orders = self.submitted(),
            skipped = self.skipped(),
            failed = self.failed(),
            "Tick complete"
        );
    }
}

// ---------------------------------------------------------------------------
// Scanner
// ---------------------------------------------------------------------------

pub struct Scanner {
    symbols: Vec<String>,
    scan: ScanConfig,
    pipeline: GradingPipeline,
    bars: Box<dyn BarSource>,
    scorer: Box<dyn SentimentScorer>,
    executor: Executor,
    ticks: u64,
}

impl Scanner {
    pub fn new(
        symbols: Vec<String>,
        scan: ScanConfig,
        pipeline: GradingPipeline,
        bars: Box<dyn BarSource>,
        scorer: Box<dyn SentimentScorer>,
        executor: Executor,
    ) -> Self {
        Self {
            symbols,
            scan,
            pipeline,
            bars,
            scorer,
            executor,
            ticks: 0,
        }
    }

    /// Wire a scanner from validated configuration.
    pub fn from_config(
        cfg: &AppConfig,
        bars: Box<dyn BarSource>,
        scorer: Box<dyn SentimentScorer>,
        executor: Executor,
    ) -> Self {
        let pipeline = GradingPipeline::new(cfg.rubric_weights, cfg.sizing, cfg.account.value);
        Self::new(cfg.symbols.clone(), cfg.scan.clone(), pipeline, bars, scorer, executor)
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Tick until `shutdown` resolves. Shutdown is only observed between
    /// ticks. Returns the number of completed ticks.
    pub async fn run<F: Future>(&mut self, shutdown: F) -> u64 {
        tokio::pin!(shutdown);

        info!(
            symbols = ?self.symbols,
            interval_secs = self.scan.scan_interval_secs,
            source = self.bars.name(),
            scorer = self.scorer.name(),
            sink = self.executor.sink_name(),
            live = self.executor.is_live(),
            "Entering scan loop"
        );

        loop {
            let report = self.run_tick().await;
            report.log();

            tokio::select! {
                _ = tokio::time::sleep(self.scan.interval()) => {}
                _ = &mut shutdown => {
                    info!("Shutdown signal received.");
                    break;
                }
            }
        }

        self.ticks
    }

    /// Scan every symbol once, in configured order.
    pub async fn run_tick(&mut self) -> TickReport {
        self.ticks += 1;
        let flags = ExternalFlags {
            during_allowed_hours: self.scan.during_allowed_hours(Utc::now()),
            ..ExternalFlags::default()
        };
        debug!(tick = self.ticks, allowed = flags.during_allowed_hours, "Starting tick");

        let mut outcomes = Vec::with_capacity(self.symbols.len());
        for symbol in &self.symbols {
            outcomes.push(self.scan_symbol(symbol, flags).await);
        }

        TickReport {
            tick: self.ticks,
            outcomes,
        }
    }

    /// Scan a single symbol. Errors are folded into `SymbolOutcome::Failed`.
    pub async fn scan_symbol(&self, symbol: &str, flags: ExternalFlags) -> SymbolOutcome {
        match self.try_scan_symbol(symbol, flags).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(symbol, tick = self.ticks, error = format!("{e:#}"), "Symbol failed");
                SymbolOutcome::Failed {
                    symbol: symbol.to_string(),
                    error: format!("{e:#}"),
                }
            }
        }
    }

    async fn try_scan_symbol(&self, symbol: &str, flags: ExternalFlags) -> Result<SymbolOutcome> {
        let series = self
            .bars
            .fetch_bars(symbol, self.scan.lookback_bars)
            .await
            .with_context(|| format!("{} bar fetch failed for {symbol}", self.bars.name()))?;

        if series.len() < self.scan.min_bars {
            debug!(symbol, bars = series.len(), min = self.scan.min_bars, "Not enough bars; skipping");
            return Ok(SymbolOutcome::Skipped {
                symbol: symbol.to_string(),
                bars: series.len(),
            });
        }

        let first_open = series.first_open();
        if !(first_open.is_finite() && first_open > 0.0) {
            return Err(ScanError::DegenerateInput {
                symbol: symbol.to_string(),
                message: format!("first open is {first_open}"),
            }
            .into());
        }

        let mut metrics = Metrics::from_series(&series, flags);
        let reading = self
            .scorer
            .score(symbol, &metrics, &[])
            .await
            .with_context(|| format!("{} sentiment failed for {symbol}", self.scorer.name()))?;
        debug!(symbol, thesis = %reading.thesis, "Sentiment");
        metrics.sentiment_score = reading.sentiment_score;

        let packet = self.pipeline.grade(symbol, &metrics);
        let order = match self.pipeline.plan_order(&packet, series.last_close(), metrics.atr)? {
            OrderPlan::NotEligible => OrderOutcome::NotEligible,
            OrderPlan::ZeroQuantity => OrderOutcome::ZeroQuantity,
            OrderPlan::Submit(payload) => {
                let receipt = self.executor.submit(&payload).await?;
                OrderOutcome::Submitted { payload, receipt }
            }
        };

        Ok(SymbolOutcome::Graded { packet, order })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
