//! TICKGRADE: minute-bar equity scanner
//!
//! Entry point. Loads configuration, initialises structured logging,
//! wires the data, sentiment and execution collaborators, and runs the
//! scan loop until Ctrl+C.

use anyhow::{Context, Result};
use tracing::{info, warn};

use tickgrade::broker::alpaca::AlpacaBroker;
use tickgrade::broker::simulated::SimulatedBroker;
use tickgrade::broker::OrderSink;
use tickgrade::config::{self, ProviderKind};
use tickgrade::data::alpaca::AlpacaBars;
use tickgrade::data::simulated::SimulatedBars;
use tickgrade::data::BarSource;
use tickgrade::engine::{Executor, Scanner};
use tickgrade::llm::heuristic::HeuristicScorer;

const BANNER: &str = r#"
 _   _      _                       _
| |_(_) ___| | ____ _ _ __ __ _  __| | ___
| __| |/ __| |/ / _` | '__/ _` |/ _` |/ _ \
| |_| | (__|   < (_| | | | (_| | (_| |  __/
 \__|_|\___|_|\_\__, |_|  \__,_|\__,_|\___|
                |___/
  Minute-bar scanner · rubric grading · bracket orders
"#;

const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let cfg = config::AppConfig::load(&config_path)?;

    init_logging();

    println!("{BANNER}");
    info!(
        config = %config_path,
        symbols = ?cfg.symbols,
        interval_secs = cfg.scan.scan_interval_secs,
        account_value = format!("${:.2}", cfg.account.value),
        "TICKGRADE starting up"
    );

    // -- Initialise components -------------------------------------------

    let bars = build_bar_source(&cfg)?;
    let sink = build_order_sink(&cfg)?;
    if sink.is_live() {
        warn!(sink = sink.name(), "Orders will be sent to a broker");
    }

    let mut scanner = Scanner::from_config(
        &cfg,
        bars,
        Box::new(HeuristicScorer::new()),
        Executor::new(sink),
    );

    // -- Main loop -------------------------------------------------------

    info!("Press Ctrl+C to stop.");
    let ticks = scanner.run(tokio::signal::ctrl_c()).await;

    info!(ticks, "TICKGRADE shut down cleanly.");
    Ok(())
}

fn build_bar_source(cfg: &config::AppConfig) -> Result<Box<dyn BarSource>> {
    let dp = &cfg.data_provider;
    match dp.kind {
        ProviderKind::Mock => {
            info!(seed = ?dp.seed, "Using simulated bar source");
            Ok(match dp.seed {
                Some(seed) => Box::new(SimulatedBars::with_seed(seed)),
                None => Box::new(SimulatedBars::new()),
            })
        }
        ProviderKind::Alpaca => {
            let key = config::AppConfig::resolve_secret(&dp.api_key_env)?;
            let secret = config::AppConfig::resolve_secret(&dp.api_secret_env)?;
            info!(base_url = ?dp.base_url, "Using Alpaca market data");
            let source = AlpacaBars::new(&key, &secret, dp.base_url.clone())
                .context("Failed to initialise Alpaca data client")?;
            Ok(Box::new(source))
        }
    }
}

fn build_order_sink(cfg: &config::AppConfig) -> Result<Box<dyn OrderSink>> {
    let ex = &cfg.execution;
    match ex.provider {
        ProviderKind::Mock => {
            info!("Using simulated execution");
            Ok(Box::new(SimulatedBroker::new()))
        }
        ProviderKind::Alpaca => {
            let key = config::AppConfig::resolve_secret(&ex.api_key_env)?;
            let secret = config::AppConfig::resolve_secret(&ex.api_secret_env)?;
            info!(base_url = ?ex.base_url, "Using Alpaca execution");
            let broker = AlpacaBroker::new(&key, &secret, ex.base_url.clone())
                .context("Failed to initialise Alpaca trading client")?;
            Ok(Box::new(broker))
        }
    }
}

/// Initialise the `tracing` subscriber.
fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("tickgrade=info"));

    let json_logging = std::env::var("TICKGRADE_LOG_JSON").is_ok();

    if json_logging {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_thread_ids(true)
            .init();
    } else {
        fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .init();
    }
}
