//! Trade execution and fill simulation.
//!
//! Turns a raw [`Signal`] plus the bar's close into at most one portfolio
//! mutation. Slippage moves the fill against the trader (up for buys, down
//! for sells) and a proportional cost is charged on the filled notional.
//!
//! Position state is a two-state machine: FLAT (`position == 0`) and LONG
//! (`position > 0`). BUY is the only FLAT -> LONG transition and SELL the only
//! LONG -> FLAT transition; every other signal/state pair is a no-op.

use log::{debug, trace};

use super::portfolio::Portfolio;
use super::price::Timestamp;
use super::signal::Signal;

/// Execution cost assumptions, all fractional (0.001 = 0.1%).
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionConfig {
    pub transaction_cost: f64,
    pub slippage: f64,
    /// Apply slippage to the forced end-of-run liquidation as well.
    pub liquidation_slippage: bool,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        ExecutionConfig {
            transaction_cost: 0.001,
            slippage: 0.0005,
            liquidation_slippage: false,
        }
    }
}

impl ExecutionConfig {
    /// No fees, no slippage.
    pub fn frictionless() -> Self {
        ExecutionConfig {
            transaction_cost: 0.0,
            slippage: 0.0,
            liquidation_slippage: false,
        }
    }
}

/// Proportional fee: price * shares * rate.
pub fn calculate_cost(price: f64, shares: u64, rate: f64) -> f64 {
    price * shares as f64 * rate
}

/// Fill price for `signal` quoted at `market_price`.
/// Buy: market_price * (1 + slippage); anything else: market_price * (1 - slippage).
pub fn apply_slippage(market_price: f64, signal: Signal, slippage: f64) -> f64 {
    match signal {
        Signal::Buy => market_price * (1.0 + slippage),
        Signal::Hold | Signal::Sell => market_price * (1.0 - slippage),
    }
}

/// What happened to a signal on one bar.
#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionOutcome {
    Bought {
        shares: u64,
        execution_price: f64,
        cost: f64,
    },
    Sold {
        shares: u64,
        execution_price: f64,
        cost: f64,
    },
    /// A BUY while flat that could not afford a single share. Not an error.
    InsufficientCash,
    NoAction,
}

impl ExecutionOutcome {
    pub fn is_trade(&self) -> bool {
        matches!(
            self,
            ExecutionOutcome::Bought { .. } | ExecutionOutcome::Sold { .. }
        )
    }
}

/// Realize `signal` against the portfolio at this bar's close.
///
/// 1. BUY while flat: buy floor(cash / execution_price) shares.
/// 2. SELL while long: sell the whole position.
/// 3. Anything else: no-op.
pub fn execute_signal(
    portfolio: &mut Portfolio,
    signal: Signal,
    market_price: f64,
    timestamp: Timestamp,
    config: &ExecutionConfig,
) -> ExecutionOutcome {
    match signal {
        Signal::Buy if portfolio.is_flat() => {
            let execution_price = apply_slippage(market_price, signal, config.slippage);
            enter_long(portfolio, execution_price, timestamp, config)
        }
        Signal::Sell if portfolio.is_long() => {
            let execution_price = apply_slippage(market_price, signal, config.slippage);
            exit_long(portfolio, execution_price, timestamp, config)
        }
        _ => ExecutionOutcome::NoAction,
    }
}

/// Force-close any open position at `market_price`.
///
/// Transaction cost is always charged; slippage only when
/// `config.liquidation_slippage` is set. Flat portfolios are left untouched.
pub fn liquidate(
    portfolio: &mut Portfolio,
    market_price: f64,
    timestamp: Timestamp,
    config: &ExecutionConfig,
) -> ExecutionOutcome {
    if portfolio.is_flat() {
        return ExecutionOutcome::NoAction;
    }
    let execution_price = if config.liquidation_slippage {
        apply_slippage(market_price, Signal::Sell, config.slippage)
    } else {
        market_price
    };
    exit_long(portfolio, execution_price, timestamp, config)
}

fn enter_long(
    portfolio: &mut Portfolio,
    execution_price: f64,
    timestamp: Timestamp,
    config: &ExecutionConfig,
) -> ExecutionOutcome {
    let shares = (portfolio.cash() / execution_price).floor();
    if !shares.is_finite() || shares < 1.0 {
        trace!("{timestamp}: buy skipped, cash {:.2} below one share", portfolio.cash());
        return ExecutionOutcome::InsufficientCash;
    }
    let shares = shares as u64;
    let cost = calculate_cost(execution_price, shares, config.transaction_cost);

    // The fee is not part of the sizing, so the portfolio may still refuse.
    if !portfolio.buy(execution_price, shares, timestamp, cost) {
        trace!("{timestamp}: buy of {shares} rejected, fee exceeds remaining cash");
        return ExecutionOutcome::InsufficientCash;
    }

    debug!("{timestamp}: BUY {shares} @ {execution_price:.4} (cost {cost:.4})");
    ExecutionOutcome::Bought {
        shares,
        execution_price,
        cost,
    }
}

fn exit_long(
    portfolio: &mut Portfolio,
    execution_price: f64,
    timestamp: Timestamp,
    config: &ExecutionConfig,
) -> ExecutionOutcome {
    let shares = portfolio.position();
    let cost = calculate_cost(execution_price, shares, config.transaction_cost);

    if !portfolio.sell(execution_price, shares, timestamp, cost) {
        return ExecutionOutcome::NoAction;
    }

    debug!("{timestamp}: SELL {shares} @ {execution_price:.4} (cost {cost:.4})");
    ExecutionOutcome::Sold {
        shares,
        execution_price,
        cost,
    }
}
