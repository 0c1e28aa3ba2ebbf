//! Full scan loop: bars in, grades and bracket orders out.

use std::time::Duration;
use tokio_test::{assert_err, assert_ok};

use tickgrade::config::AppConfig;
use tickgrade::engine::{Executor, OrderOutcome, Scanner, SymbolOutcome};
use tickgrade::llm::heuristic::HeuristicScorer;
use tickgrade::types::Grade;

use crate::mock_collaborators::{flat_bars, rising_bars, FixedBars, RecordingBroker};

fn config(toml: &str) -> AppConfig {
    assert_ok!(AppConfig::from_toml_str(toml))
}

fn scanner(cfg: &AppConfig, bars: &FixedBars, broker: &RecordingBroker) -> Scanner {
    Scanner::from_config(
        cfg,
        Box::new(bars.clone()),
        Box::new(HeuristicScorer::new()),
        Executor::new(Box::new(broker.clone())),
    )
}

#[tokio::test]
async fn test_rising_symbol_gets_bracket_order() {
    let cfg = config(r#"symbols = ["SPY"]"#);
    let bars = FixedBars::new(vec![("SPY", rising_bars(6))]);
    let broker = RecordingBroker::new();

    let report = scanner(&cfg, &bars, &broker).run_tick().await;
    assert_eq!(report.submitted(), 1);

    let orders = broker.orders();
    assert_eq!(orders.len(), 1);
    let json = serde_json::to_value(&orders[0]).unwrap();
    assert_eq!(json["symbol"], "SPY");
    assert_eq!(json["qty"], 29);
    assert_eq!(json["side"], "buy");
    assert_eq!(json["type"], "limit");
    assert_eq!(json["time_in_force"], "day");
    assert_eq!(json["order_class"], "bracket");
    assert_eq!(json["limit_price"], "103.0");
    assert_eq!(json["stop_loss"]["stop_price"], "102.0");
    assert_eq!(json["take_profit"]["limit_price"], "104.5");

    match &report.outcomes[0] {
        SymbolOutcome::Graded { packet, order } => {
            assert_eq!(packet.grade, Grade::A);
            assert_eq!(packet.subscores, packet.components);
            assert!(matches!(order, OrderOutcome::Submitted { receipt, .. } if receipt.order_id == "rec-1"));
        }
        other => panic!("expected graded, got {other:?}"),
    }
}

#[tokio::test]
async fn test_mixed_tick_keeps_going() {
    let cfg = config(r#"symbols = ["BAD", "SPY", "FLAT", "THIN"]"#);
    let bars = FixedBars::new(vec![
        ("SPY", rising_bars(6)),
        ("FLAT", flat_bars(12, 40.0)),
        ("THIN", flat_bars(3, 40.0)),
    ])
    .failing(&["BAD"]);
    let broker = RecordingBroker::new();

    let report = scanner(&cfg, &bars, &broker).run_tick().await;

    let symbols: Vec<_> = report.outcomes.iter().map(|o| o.symbol()).collect();
    assert_eq!(symbols, vec!["BAD", "SPY", "FLAT", "THIN"]);
    assert_eq!(report.failed(), 1);
    assert_eq!(report.graded(), 2);
    assert_eq!(report.submitted(), 1);
    assert_eq!(report.skipped(), 1);
    assert_eq!(broker.orders().len(), 1);

    let calls = bars.calls();
    assert_eq!(calls.len(), 4);
    assert!(calls.iter().all(|(_, limit)| *limit == 18));
}

#[tokio::test]
async fn test_lookback_limits_bars_used() {
    let cfg = config("symbols = [\"SPY\"]\n[scan]\nlookback_bars = 6");
    // 30 bars available; only the last 6 are requested.
    let bars = FixedBars::new(vec![("SPY", rising_bars(30))]);
    let broker = RecordingBroker::new();

    let report = scanner(&cfg, &bars, &broker).run_tick().await;
    assert_eq!(bars.calls(), vec![("SPY".to_string(), 6)]);
    assert_eq!(report.graded(), 1);
}

#[tokio::test]
async fn test_broker_rejection_is_contained() {
    let cfg = config(r#"symbols = ["SPY", "QQQ"]"#);
    let bars = FixedBars::new(vec![("SPY", rising_bars(6)), ("QQQ", rising_bars(6))]);
    let broker = RecordingBroker::new();
    broker.set_error("market closed");

    let report = scanner(&cfg, &bars, &broker).run_tick().await;
    assert_eq!(report.failed(), 2);
    for outcome in &report.outcomes {
        match outcome {
            SymbolOutcome::Failed { error, .. } => assert!(error.contains("market closed")),
            other => panic!("expected failure, got {other:?}"),
        }
    }
}

#[tokio::test]
async fn test_single_weight_table_drops_other_categories() {
    // Only behavior counts: 0.6 * 1.0 = 0.6, a B.
    let cfg = config("symbols = [\"SPY\"]\n[rubric_weights]\nbehavior = 1.0");
    let bars = FixedBars::new(vec![("SPY", rising_bars(6))]);
    let broker = RecordingBroker::new();

    let report = scanner(&cfg, &bars, &broker).run_tick().await;
    match &report.outcomes[0] {
        SymbolOutcome::Graded { packet, .. } => {
            assert!((packet.composite - 0.6).abs() < 1e-9);
            assert_eq!(packet.subscores.execution, 1.0);
        }
        other => panic!("expected graded, got {other:?}"),
    }
    assert!(broker.orders().is_empty());
}

#[tokio::test]
async fn test_zero_allocation_skips_order() {
    let cfg = config("symbols = [\"SPY\"]\n[sizing]\ngrade_a = 0.0");
    let bars = FixedBars::new(vec![("SPY", rising_bars(6))]);
    let broker = RecordingBroker::new();

    let report = scanner(&cfg, &bars, &broker).run_tick().await;
    match &report.outcomes[0] {
        SymbolOutcome::Graded { order, .. } => assert_eq!(*order, OrderOutcome::ZeroQuantity),
        other => panic!("expected graded, got {other:?}"),
    }
    assert!(broker.orders().is_empty());
}

#[tokio::test]
async fn test_weight_override_changes_grade() {
    // Structure is left out of the table, so it weighs nothing:
    // 0.18 + 0.20 + 0.24 + 0.10.
    let cfg = config(
        "symbols = [\"SPY\"]\n[rubric_weights]\nbehavior = 0.3\ninstitutional = 0.2\nsentiment = 0.3\nexecution = 0.1",
    );
    let bars = FixedBars::new(vec![("SPY", rising_bars(6))]);
    let broker = RecordingBroker::new();

    let report = scanner(&cfg, &bars, &broker).run_tick().await;
    match &report.outcomes[0] {
        SymbolOutcome::Graded { packet, order } => {
            assert_eq!(packet.grade, Grade::B);
            assert_eq!(*order, OrderOutcome::NotEligible);
        }
        other => panic!("expected graded, got {other:?}"),
    }
}

#[tokio::test]
async fn test_invalid_config_rejected() {
    assert_err!(AppConfig::from_toml_str("symbols = []"));
    assert_err!(AppConfig::from_toml_str("[scan]\nmin_bars = 0"));
}

#[tokio::test(start_paused = true)]
async fn test_run_ticks_until_shutdown() {
    let cfg = config("symbols = [\"SPY\"]\n[scan]\nscan_interval_secs = 30");
    let bars = FixedBars::new(vec![("SPY", flat_bars(10, 25.0))]);
    let broker = RecordingBroker::new();

    // Ticks at t=0, 30, 60, 90; shutdown lands at 95.
    let ticks = scanner(&cfg, &bars, &broker)
        .run(tokio::time::sleep(Duration::from_secs(95)))
        .await;
    assert_eq!(ticks, 4);
    assert_eq!(bars.calls().len(), 4);
}
