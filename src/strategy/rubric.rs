//! Grading rubric.
//!
//! Maps raw metrics into five sub-scores in [0,1], combines them with
//! a weight table into a composite, and buckets the composite into a
//! letter grade. Weights are passed in explicitly; nothing here reads
//! global state.

use serde::{Deserialize, Serialize};

use crate::types::{Grade, Metrics};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// `|percent_change|` at which behavior saturates.
const BEHAVIOR_FULL_PCT: f64 = 5.0;

/// Volume ratio (last / average) at which institutional saturates.
const INSTITUTIONAL_FULL_RATIO: f64 = 2.0;

/// Deducted from institutional when dark-pool prints are flagged.
const DARK_POOL_PENALTY: f64 = 0.3;

/// Composite thresholds, evaluated high to low.
pub const GRADE_THRESHOLDS: [(f64, Grade); 4] = [
    (0.85, Grade::APlus),
    (0.75, Grade::A),
    (0.60, Grade::B),
    (0.40, Grade::C),
];

/// Per-category weights. The composite is a plain weighted sum, so weights
/// that do not add up to 1 scale it accordingly.
///
/// A supplied table replaces the defaults outright: categories it leaves
/// out weigh 0. `Default` applies only when no table is given at all.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RubricWeights {
    #[serde(default)]
    pub behavior: f64,
    #[serde(default)]
    pub structure: f64,
    #[serde(default)]
    pub institutional: f64,
    #[serde(default)]
    pub sentiment: f64,
    #[serde(default)]
    pub execution: f64,
}

impl Default for RubricWeights {
    fn default() -> Self {
        Self {
            behavior: 0.30,
            structure: 0.25,
            institutional: 0.20,
            sentiment: 0.15,
            execution: 0.10,
        }
    }
}

impl RubricWeights {
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, f64)> {
        [
            ("behavior", self.behavior),
            ("structure", self.structure),
            ("institutional", self.institutional),
            ("sentiment", self.sentiment),
            ("execution", self.execution),
        ]
        .into_iter()
    }
}

// ---------------------------------------------------------------------------
// Scores
// ---------------------------------------------------------------------------

/// Normalized per-category scores, each in [0,1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Subscores {
    pub behavior: f64,
    pub structure: f64,
    pub institutional: f64,
    pub sentiment: f64,
    /// Hard gate: either 0.0 or 1.0.
    pub execution: f64,
}

impl Subscores {
    /// Weighted sum over the five categories.
    pub fn weighted(&self, w: &RubricWeights) -> f64 {
        self.behavior * w.behavior
            + self.structure * w.structure
            + self.institutional * w.institutional
            + self.sentiment * w.sentiment
            + self.execution * w.execution
    }
}

/// Result of grading one symbol for one tick.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GradePacket {
    pub symbol: String,
    pub subscores: Subscores,
    pub composite: f64,
    pub grade: Grade,
    pub components: Subscores,
}

pub fn clamp01(x: f64) -> f64 {
    x.clamp(0.0, 1.0)
}

/// Map raw metrics into sub-scores.
pub fn score_from_tech(m: &Metrics) -> Subscores {
    let behavior = clamp01((m.percent_change.abs() / BEHAVIOR_FULL_PCT).min(1.0));

    let mut structure = 0.0;
    if m.breakout_confirmed {
        structure += 0.5;
    }
    if m.last_above_20ma {
        structure += 0.25;
    }
    if m.hold_2bars {
        structure += 0.25;
    }
    let structure = clamp01(structure);

    let mut institutional = 0.0;
    if m.avg_volume > 0.0 {
        let ratio = m.v_last / m.avg_volume;
        institutional = clamp01((ratio / INSTITUTIONAL_FULL_RATIO).min(1.0));
    }
    if m.dark_pool_flag {
        institutional = (institutional - DARK_POOL_PENALTY).max(0.0);
    }

    let sentiment = clamp01(m.sentiment_score);

    let execution = if !m.during_allowed_hours || m.gex_flat_or_pos {
        0.0
    } else {
        1.0
    };

    Subscores {
        behavior,
        structure,
        institutional,
        sentiment,
        execution,
    }
}

/// Weighted composite of the sub-scores.
pub fn combine_scores(subscores: &Subscores, weights: &RubricWeights) -> f64 {
    subscores.weighted(weights)
}

/// First threshold the composite clears, else F.
pub fn grade_from_score(score: f64) -> Grade {
    GRADE_THRESHOLDS
        .iter()
        .find(|(threshold, _)| score >= *threshold)
        .map(|(_, grade)| *grade)
        .unwrap_or(Grade::F)
}

/// Grade a symbol's metrics end to end.
pub fn grade_packet_for_trade(symbol: &str, metrics: &Metrics, weights: &RubricWeights) -> GradePacket {
    let subscores = score_from_tech(metrics);
    let composite = combine_scores(&subscores, weights);
    let grade = grade_from_score(composite);

    GradePacket {
        symbol: symbol.to_string(),
        subscores,
        composite,
        grade,
        components: subscores,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
