mod cli;
mod config;
mod parallel;
mod simulate;
mod stats;

use anyhow::Result;
use chrono::Local;
use config::Execution;
use ftsim_common::ledger::TIME_FORMAT;
use ftsim_io::{Ledger, ResultRow};
use stats::RateEstimate;
use std::time::Instant;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let config = match cli::parse_args(std::env::args_os()) {
        Ok(config) => config,
        Err(err) => err.exit(),
    };
    config.validate()?;
    let exec = Execution::from_env()?;

    info!(
        distance = config.distance,
        ec = %config.ec,
        boundaries = %config.boundaries,
        delta = config.delta,
        p_swap = config.p_swap,
        trials = config.trials,
        passive = config.passive,
        seed = exec.seed,
        threads = exec.threads,
        "starting simulation"
    );

    let start = Instant::now();
    let errors = simulate::run(&config, &exec)?;
    let estimate = RateEstimate::new(errors, config.trials);
    info!(elapsed = ?start.elapsed(), "{estimate}");

    let row = ResultRow {
        distance: config.distance,
        ec: config.ec,
        boundaries: config.boundaries,
        delta: config.delta,
        p_swap: config.p_swap,
        errors,
        trials: config.trials,
        current_time: Local::now().format(TIME_FORMAT).to_string(),
    };
    record_result(&Ledger::default(), &row)?;

    Ok(())
}

/// Appends `row` to the ledger and reads the ledger back, returning how
/// many runs it now holds.
fn record_result(ledger: &Ledger, row: &ResultRow) -> Result<usize> {
    ledger.append(row)?;
    let rows = ledger.read_rows()?;
    info!(
        path = %ledger.path().display(),
        runs = rows.len(),
        last = %rows.last().map(ToString::to_string).unwrap_or_default(),
        "result recorded"
    );
    Ok(rows.len())
}
