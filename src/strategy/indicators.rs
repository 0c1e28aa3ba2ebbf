//! Technical indicators over a minute-bar series.
//!
//! Pure, stateless functions. Inputs are trusted: an empty series, a zero
//! first open, or a zero reference level is a caller bug and panics rather
//! than producing an infinite or NaN metric. The scanner guards its inputs
//! before calling into this module.

use crate::types::{BarSeries, Metrics};

/// Window of the trailing simple moving average used by `last_above_20ma`.
pub const MA_WINDOW: usize = 20;

/// Minimum percent move for a last-bar up-close to count as a breakout.
const BREAKOUT_MIN_PCT: f64 = 0.2;

/// `(last_close - first_open) / first_open * 100`.
pub fn percent_change_open_to_close(series: &BarSeries) -> f64 {
    let first_open = series.first_open();
    assert!(first_open != 0.0, "percent change undefined: first open is zero");
    (series.last_close() - first_open) / first_open * 100.0
}

/// Arithmetic mean of the volume column.
pub fn average_volume(series: &BarSeries) -> f64 {
    assert!(!series.is_empty(), "average volume of an empty series");
    series.bars().iter().map(|b| b.volume).sum::<f64>() / series.len() as f64
}

/// Mean high-low range. Not Wilder-smoothed and ignores gaps between bars.
pub fn atr_simple(series: &BarSeries) -> f64 {
    assert!(!series.is_empty(), "ATR of an empty series");
    series.bars().iter().map(|b| b.range()).sum::<f64>() / series.len() as f64
}

/// `(first_open - last_close) / first_open * 100`, the sign-inverted
/// percent change.
pub fn gap_fill_pct(series: &BarSeries) -> f64 {
    let first_open = series.first_open();
    assert!(first_open != 0.0, "gap fill undefined: first open is zero");
    (first_open - series.last_close()) / first_open * 100.0
}

/// Whether the last close sits above the 20-bar SMA ending at the last bar.
/// Always false with fewer than 20 bars.
pub fn last_above_20ma(series: &BarSeries) -> bool {
    let bars = series.bars();
    if bars.len() < MA_WINDOW {
        return false;
    }
    let window = &bars[bars.len() - MA_WINDOW..];
    let ma = window.iter().map(|b| b.close).sum::<f64>() / MA_WINDOW as f64;
    series.last_close() > ma
}

/// Percent distance of the last close above (or below) a reference level.
pub fn pct_reclaim_of_level(series: &BarSeries, level: f64) -> f64 {
    assert!(level != 0.0, "reclaim undefined: level is zero");
    (series.last_close() - level) / level * 100.0
}

/// Last bar closed up on the previous bar and the whole window moved more
/// than 0.2%. Needs at least two bars.
pub fn breakout_confirmed(series: &BarSeries, percent_change: f64) -> bool {
    match (series.close_back(0), series.close_back(1)) {
        (Some(last), Some(prev)) => last > prev && percent_change > BREAKOUT_MIN_PCT,
        _ => false,
    }
}

/// The last two closes both held above the close two bars before the last.
pub fn hold_2bars(series: &BarSeries) -> bool {
    match (series.close_back(0), series.close_back(1), series.close_back(2)) {
        (Some(last), Some(prev), Some(base)) => last > base && prev > base,
        _ => false,
    }
}

/// Flags that come from outside the bar series.
#[derive(Debug, Clone, Copy)]
pub struct ExternalFlags {
    pub during_allowed_hours: bool,
    pub gex_flat_or_pos: bool,
    pub dark_pool_flag: bool,
}

impl Default for ExternalFlags {
    fn default() -> Self {
        Self {
            during_allowed_hours: true,
            gex_flat_or_pos: false,
            dark_pool_flag: false,
        }
    }
}

impl Metrics {
    /// Compute every technical field from a series. Sentiment stays at its
    /// neutral default until the scorer fills it in.
    pub fn from_series(series: &BarSeries, flags: ExternalFlags) -> Self {
        let percent_change = percent_change_open_to_close(series);
        let last_volume = series
            .bars()
            .last()
            .map(|b| b.volume)
            .unwrap_or_default();

        Metrics {
            percent_change,
            avg_volume: average_volume(series),
            atr: atr_simple(series),
            gap_pct: gap_fill_pct(series),
            last_above_20ma: last_above_20ma(series),
            breakout_confirmed: breakout_confirmed(series, percent_change),
            hold_2bars: hold_2bars(series),
            v_last: last_volume,
            during_allowed_hours: flags.during_allowed_hours,
            gex_flat_or_pos: flags.gex_flat_or_pos,
            dark_pool_flag: flags.dark_pool_flag,
            ..Metrics::default()
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
