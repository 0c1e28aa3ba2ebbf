//! Strategy engine: indicators, rubric grading, and order sizing.

pub mod indicators;
pub mod rubric;
pub mod sizing;

use tracing::{debug, info};

use crate::types::{Metrics, OrderPayload, ScanError};
use rubric::{GradePacket, RubricWeights};
use sizing::SizingConfig;

// ---------------------------------------------------------------------------
// Order plan
// ---------------------------------------------------------------------------

/// What the pipeline decided to do with a graded symbol.
#[derive(Debug, Clone, PartialEq)]
pub enum OrderPlan {
    /// Grade below A; nothing to size.
    NotEligible,
    /// Eligible grade, but the position rounds down to zero shares.
    ZeroQuantity,
    /// Ready for the execution sink.
    Submit(OrderPayload),
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Pipelines grading → eligibility → sizing → bracket construction.
///
/// Holds only immutable configuration, so one instance serves every
/// symbol on every tick.
#[derive(Debug, Clone)]
pub struct GradingPipeline {
    weights: RubricWeights,
    sizing: SizingConfig,
    account_value: f64,
}

impl GradingPipeline {
    pub fn new(weights: RubricWeights, sizing: SizingConfig, account_value: f64) -> Self {
        Self {
            weights,
            sizing,
            account_value,
        }
    }

    pub fn weights(&self) -> &RubricWeights {
        &self.weights
    }

    pub fn account_value(&self) -> f64 {
        self.account_value
    }

    /// Grade fully-populated metrics (sentiment included).
    pub fn grade(&self, symbol: &str, metrics: &Metrics) -> GradePacket {
        let packet = rubric::grade_packet_for_trade(symbol, metrics, &self.weights);
        info!(
            symbol,
            grade = %packet.grade,
            composite = format!("{:.3}", packet.composite),
            behavior = format!("{:.2}", packet.subscores.behavior),
            structure = format!("{:.2}", packet.subscores.structure),
            institutional = format!("{:.2}", packet.subscores.institutional),
            sentiment = format!("{:.2}", packet.subscores.sentiment),
            execution = format!("{:.2}", packet.subscores.execution),
            "GRADE"
        );
        packet
    }

    /// Decide whether and how to trade a graded symbol.
    pub fn plan_order(
        &self,
        packet: &GradePacket,
        last_close: f64,
        atr: f64,
    ) -> Result<OrderPlan, ScanError> {
        if !packet.grade.is_tradeable() {
            debug!(symbol = %packet.symbol, grade = %packet.grade, "No trade");
            return Ok(OrderPlan::NotEligible);
        }

        let order = sizing::size_order(
            &self.sizing,
            self.account_value,
            &packet.symbol,
            packet.grade,
            last_close,
            atr,
        )?;

        match order {
            Some(payload) => Ok(OrderPlan::Submit(payload)),
            None => {
                info!(symbol = %packet.symbol, "Quantity computed 0; skipping");
                Ok(OrderPlan::ZeroQuantity)
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
