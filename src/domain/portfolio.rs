//! Portfolio state and equity tracking.
//!
//! Single-asset, long-only ledger. Cash and position change only through
//! [`Portfolio::buy`] and [`Portfolio::sell`]; [`Portfolio::update_equity`]
//! marks to market and appends exactly one equity point per call.

use std::fmt;

use super::price::Timestamp;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TradeKind {
    Buy,
    Sell,
}

impl fmt::Display for TradeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeKind::Buy => f.write_str("BUY"),
            TradeKind::Sell => f.write_str("SELL"),
        }
    }
}

/// An executed transfer between cash and position, fee included.
#[derive(Debug, Clone, PartialEq)]
pub struct Trade {
    pub timestamp: Timestamp,
    pub kind: TradeKind,
    pub price: f64,
    pub shares: u64,
    pub cost: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EquityPoint {
    pub timestamp: Timestamp,
    pub equity: f64,
    pub cash: f64,
    pub position: u64,
    pub price: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Portfolio {
    initial_capital: f64,
    cash: f64,
    position: u64,
    equity: f64,
    trades: Vec<Trade>,
    equity_curve: Vec<EquityPoint>,
}

impl Portfolio {
    pub fn new(initial_capital: f64) -> Self {
        Portfolio {
            initial_capital,
            cash: initial_capital,
            position: 0,
            equity: initial_capital,
            trades: Vec::new(),
            equity_curve: Vec::new(),
        }
    }

    /// Buy `shares` at `price` plus a `cost` fee.
    ///
    /// Succeeds only if `price * shares + cost <= cash`; otherwise nothing
    /// changes and `false` is returned.
    pub fn buy(&mut self, price: f64, shares: u64, timestamp: Timestamp, cost: f64) -> bool {
        if shares == 0 {
            return false;
        }
        let total_cost = price * shares as f64 + cost;
        if total_cost > self.cash {
            return false;
        }

        self.cash -= total_cost;
        self.position += shares;
        self.trades.push(Trade {
            timestamp,
            kind: TradeKind::Buy,
            price,
            shares,
            cost,
        });
        true
    }

    /// Sell `shares` at `price` minus a `cost` fee.
    ///
    /// Succeeds only if `shares <= position`; otherwise nothing changes.
    pub fn sell(&mut self, price: f64, shares: u64, timestamp: Timestamp, cost: f64) -> bool {
        if shares == 0 || shares > self.position {
            return false;
        }

        self.cash += price * shares as f64 - cost;
        self.position -= shares;
        self.trades.push(Trade {
            timestamp,
            kind: TradeKind::Sell,
            price,
            shares,
            cost,
        });
        true
    }

    /// Mark to market and record one equity-curve point.
    pub fn update_equity(&mut self, price: f64, timestamp: Timestamp) {
        self.mark(price);
        self.equity_curve.push(EquityPoint {
            timestamp,
            equity: self.equity,
            cash: self.cash,
            position: self.position,
            price,
        });
    }

    /// Recompute equity at `price` without touching the equity curve.
    pub fn mark(&mut self, price: f64) {
        self.equity = self.cash + self.position as f64 * price;
    }

    pub fn initial_capital(&self) -> f64 {
        self.initial_capital
    }

    pub fn cash(&self) -> f64 {
        self.cash
    }

    pub fn position(&self) -> u64 {
        self.position
    }

    pub fn equity(&self) -> f64 {
        self.equity
    }

    pub fn is_flat(&self) -> bool {
        self.position == 0
    }

    pub fn is_long(&self) -> bool {
        self.position > 0
    }

    pub fn trades(&self) -> &[Trade] {
        &self.trades
    }

    pub fn equity_curve(&self) -> &[EquityPoint] {
        &self.equity_curve
    }

    /// Bar-to-bar percentage change of equity. One shorter than the curve.
    pub fn returns(&self) -> Vec<f64> {
        self.equity_curve
            .windows(2)
            .map(|w| {
                let prev = w[0].equity;
                if prev != 0.0 {
                    w[1].equity / prev - 1.0
                } else {
                    0.0
                }
            })
            .collect()
    }
}
