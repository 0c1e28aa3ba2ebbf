//! Grade-based position sizing and bracket order construction.
//!
//! Sizing is fixed-fractional: the grade picks a percentage of account
//! value, which is converted to whole shares at the last close. Bracket
//! levels sit at fixed ATR multiples around the entry.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::Deserialize;
use tracing::debug;

use crate::types::{
    Grade, OrderClass, OrderPayload, OrderType, ScanError, Side, StopLossLeg, TakeProfitLeg,
    TimeInForce,
};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Stop distance below entry, in ATRs.
pub const STOP_ATR_MULTIPLE: f64 = 1.0;

/// Take-profit distance above entry, in ATRs.
pub const TARGET_ATR_MULTIPLE: f64 = 1.5;

/// Fraction of account value committed per grade tier.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct SizingConfig {
    pub grade_a_plus: f64,
    pub grade_a: f64,
    pub grade_b: f64,
    /// Used for every grade without its own tier.
    pub max_risk_per_trade_pct: f64,
}

impl Default for SizingConfig {
    fn default() -> Self {
        Self {
            grade_a_plus: 0.05,
            grade_a: 0.03,
            grade_b: 0.01,
            max_risk_per_trade_pct: 0.01,
        }
    }
}

impl SizingConfig {
    pub fn risk_pct(&self, grade: Grade) -> f64 {
        match grade {
            Grade::APlus => self.grade_a_plus,
            Grade::A => self.grade_a,
            Grade::B => self.grade_b,
            _ => self.max_risk_per_trade_pct,
        }
    }
}

// ---------------------------------------------------------------------------
// Quantity and levels
// ---------------------------------------------------------------------------

/// Whole shares for `account_value * risk_pct` at `last_close`, with the
/// price floored at 1.0. `None` when that rounds down to nothing.
pub fn quantity(account_value: f64, risk_pct: f64, last_close: f64) -> Option<u64> {
    let qty = (account_value * risk_pct / last_close.max(1.0)).floor();
    if qty.is_finite() && qty >= 1.0 {
        Some(qty as u64)
    } else {
        None
    }
}

/// Round to cents the way a binary float rounds: the exact value of the
/// `f64` is kept, and true ties go to the even cent. Whole prices keep
/// one decimal place, so 49.0 reads `"49.0"` on the wire.
pub fn round_price(price: f64) -> Result<Decimal, ScanError> {
    let exact = Decimal::from_f64_retain(price).ok_or(ScanError::NonFinitePrice(price))?;
    let mut cents = exact
        .round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven)
        .normalize();
    if cents.scale() == 0 {
        cents.rescale(1);
    }
    Ok(cents)
}

/// Entry, stop and target prices for a long bracket.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BracketLevels {
    pub limit_price: Decimal,
    pub stop_price: Decimal,
    pub take_profit: Decimal,
}

impl BracketLevels {
    pub fn from_atr(last_close: f64, atr: f64) -> Result<Self, ScanError> {
        Ok(Self {
            limit_price: round_price(last_close)?,
            stop_price: round_price(last_close - atr * STOP_ATR_MULTIPLE)?,
            take_profit: round_price(last_close + atr * TARGET_ATR_MULTIPLE)?,
        })
    }
}

/// Fixed-shape limit bracket: day order, take-profit limit leg, stop leg.
pub fn build_bracket_order(symbol: &str, qty: u64, side: Side, levels: &BracketLevels) -> OrderPayload {
    OrderPayload {
        symbol: symbol.to_string(),
        qty,
        side,
        order_type: OrderType::Limit,
        time_in_force: TimeInForce::Day,
        limit_price: levels.limit_price,
        order_class: OrderClass::Bracket,
        take_profit: TakeProfitLeg {
            limit_price: levels.take_profit,
        },
        stop_loss: StopLossLeg {
            stop_price: levels.stop_price,
        },
    }
}

/// Size and build a long bracket for a graded symbol.
///
/// Returns `Ok(None)` when the computed quantity is zero.
pub fn size_order(
    sizing: &SizingConfig,
    account_value: f64,
    symbol: &str,
    grade: Grade,
    last_close: f64,
    atr: f64,
) -> Result<Option<OrderPayload>, ScanError> {
    let risk_pct = sizing.risk_pct(grade);
    let Some(qty) = quantity(account_value, risk_pct, last_close) else {
        debug!(symbol, %grade, risk_pct, last_close, "Quantity rounds to zero");
        return Ok(None);
    };

    let levels = BracketLevels::from_atr(last_close, atr)?;
    Ok(Some(build_bracket_order(symbol, qty, Side::Buy, &levels)))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
