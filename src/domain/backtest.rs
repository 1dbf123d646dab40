//! Backtest engine and event loop.
//!
//! Per bar, in this order: ask the strategy for a signal, realize it through
//! the execution policy at the bar's close, then mark the portfolio to
//! market. After the last bar any open position is force-closed at the final
//! close. A run never fails: infeasible trades are absorbed as no-ops.

use log::info;

use super::execution::{self, ExecutionConfig, ExecutionOutcome};
use super::portfolio::Portfolio;
use super::price::PriceSeries;
use super::signal::Signal;
use super::strategy::Strategy;

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestConfig {
    pub initial_capital: f64,
    pub execution: ExecutionConfig,
    pub risk_free_rate: f64,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        BacktestConfig {
            initial_capital: 100_000.0,
            execution: ExecutionConfig::default(),
            risk_free_rate: 0.02,
        }
    }
}

/// Raw signal tally for a run, before execution gating.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SignalCounts {
    pub buy: usize,
    pub hold: usize,
    pub sell: usize,
}

impl SignalCounts {
    fn record(&mut self, signal: Signal) {
        match signal {
            Signal::Buy => self.buy += 1,
            Signal::Hold => self.hold += 1,
            Signal::Sell => self.sell += 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestResult {
    pub strategy_name: String,
    pub bars: usize,
    pub portfolio: Portfolio,
    pub signals: SignalCounts,
    /// Trades the execution policy could not afford.
    pub skipped_buys: usize,
    /// Outcome of the end-of-run forced sale.
    pub liquidation: ExecutionOutcome,
}

pub fn run_backtest(
    strategy: &mut dyn Strategy,
    series: &PriceSeries,
    config: &BacktestConfig,
) -> BacktestResult {
    info!(
        "Running backtest for {} over {} bars",
        strategy.name(),
        series.len()
    );

    let mut portfolio = Portfolio::new(config.initial_capital);
    let mut signals = SignalCounts::default();
    let mut skipped_buys = 0usize;

    strategy.initialize(series);

    for (i, bar) in series.bars().iter().enumerate() {
        let signal = strategy.generate_signal(i);
        signals.record(signal);

        let outcome = execution::execute_signal(
            &mut portfolio,
            signal,
            bar.close,
            bar.timestamp,
            &config.execution,
        );
        if outcome == ExecutionOutcome::InsufficientCash {
            skipped_buys += 1;
        }

        portfolio.update_equity(bar.close, bar.timestamp);
    }

    let last = series.last();
    let liquidation = execution::liquidate(
        &mut portfolio,
        last.close,
        last.timestamp,
        &config.execution,
    );
    // Settle equity to realized cash; the curve keeps one row per bar.
    portfolio.mark(last.close);

    info!(
        "Backtest complete. Final equity: {:.2}",
        portfolio.equity()
    );

    BacktestResult {
        strategy_name: strategy.name().to_string(),
        bars: series.len(),
        portfolio,
        signals,
        skipped_buys,
        liquidation,
    }
}
