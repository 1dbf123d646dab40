//! Performance metrics and statistics.
//!
//! Reads a finished portfolio's equity curve and trade log. Ratios that are
//! undefined on degenerate input (no returns, zero volatility, zero
//! drawdown, no round trips) report 0 instead of failing.

use super::portfolio::{EquityPoint, Portfolio, Trade, TradeKind};

pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Annual drift expressed per trading day.
pub fn annual_to_daily_return(value: f64) -> f64 {
    value / TRADING_DAYS_PER_YEAR
}

/// Annual volatility expressed per trading day.
pub fn annual_to_daily_volatility(value: f64) -> f64 {
    value / TRADING_DAYS_PER_YEAR.sqrt()
}

#[derive(Debug, Clone, PartialEq)]
pub struct Metrics {
    pub total_return: f64,
    pub annualized_return: f64,
    pub annualized_volatility: f64,
    pub sharpe_ratio: f64,
    pub max_drawdown: f64,
    pub calmar_ratio: f64,
    pub win_rate: f64,
    pub total_trades: usize,
    pub final_equity: f64,
}

impl Metrics {
    pub fn compute(portfolio: &Portfolio, risk_free_rate: f64) -> Self {
        let returns = portfolio.returns();
        let initial_capital = portfolio.initial_capital();
        let final_equity = portfolio.equity();

        let total_return = if initial_capital > 0.0 {
            final_equity / initial_capital - 1.0
        } else {
            0.0
        };

        let annualized_return = annualized_return(&returns);
        let annualized_volatility = annualized_volatility(&returns);
        let sharpe_ratio = if annualized_volatility > 0.0 {
            (annualized_return - risk_free_rate) / annualized_volatility
        } else {
            0.0
        };

        let max_drawdown = max_drawdown(portfolio.equity_curve());
        let calmar_ratio = if max_drawdown != 0.0 {
            annualized_return / max_drawdown.abs()
        } else {
            0.0
        };

        Metrics {
            total_return,
            annualized_return,
            annualized_volatility,
            sharpe_ratio,
            max_drawdown,
            calmar_ratio,
            win_rate: win_rate(portfolio.trades()),
            total_trades: portfolio.trades().len(),
            final_equity,
        }
    }
}

/// Compounded growth over the sample, scaled to one year of trading days.
pub fn annualized_return(returns: &[f64]) -> f64 {
    if returns.is_empty() {
        return 0.0;
    }
    let growth: f64 = returns.iter().map(|r| 1.0 + r).product();
    if growth <= 0.0 {
        return -1.0;
    }
    let years = returns.len() as f64 / TRADING_DAYS_PER_YEAR;
    growth.powf(1.0 / years) - 1.0
}

/// Sample standard deviation of per-bar returns, scaled by sqrt(252).
pub fn annualized_volatility(returns: &[f64]) -> f64 {
    if returns.len() < 2 {
        return 0.0;
    }
    let n = returns.len() as f64;
    let mean = returns.iter().sum::<f64>() / n;
    let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / (n - 1.0);
    variance.sqrt() * TRADING_DAYS_PER_YEAR.sqrt()
}

/// Deepest peak-to-trough decline as a non-positive fraction.
pub fn max_drawdown(equity_curve: &[EquityPoint]) -> f64 {
    let mut peak = f64::NEG_INFINITY;
    let mut worst = 0.0_f64;

    for point in equity_curve {
        if point.equity > peak {
            peak = point.equity;
        }
        if peak > 0.0 {
            let dd = (point.equity - peak) / peak;
            if dd < worst {
                worst = dd;
            }
        }
    }

    worst
}

/// Share of round trips that sold above their purchase price.
///
/// The n-th BUY is paired with the n-th SELL in log order.
pub fn win_rate(trades: &[Trade]) -> f64 {
    let buys = trades.iter().filter(|t| t.kind == TradeKind::Buy);
    let sells = trades.iter().filter(|t| t.kind == TradeKind::Sell);

    let mut total = 0usize;
    let mut profitable = 0usize;
    for (buy, sell) in buys.zip(sells) {
        total += 1;
        if sell.price > buy.price {
            profitable += 1;
        }
    }

    if total > 0 {
        profitable as f64 / total as f64
    } else {
        0.0
    }
}
