//! Technical indicators over closing prices.
//!
//! Every indicator is a pure function from a close array to an
//! [`IndicatorSeries`] of the same length. Points inside the warmup window,
//! or where the value is undefined, are marked invalid rather than NaN.
//!
//! - `IndicatorPoint`: a single point in an indicator series
//! - `IndicatorType`: indicator identity + parameters
//! - `IndicatorSeries`: the full series

pub mod crossover;
pub mod sma;
pub mod stddev;
pub mod zscore;

pub use crossover::ma_crossover;
pub use sma::sma;
pub use stddev::rolling_std;
pub use zscore::z_score;

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndicatorPoint {
    pub valid: bool,
    pub value: f64,
}

impl IndicatorPoint {
    pub fn valid(value: f64) -> Self {
        IndicatorPoint { valid: true, value }
    }

    pub fn invalid() -> Self {
        IndicatorPoint {
            valid: false,
            value: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    Sma(usize),
    Stddev(usize),
    ZScore(usize),
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSeries {
    pub indicator_type: IndicatorType,
    pub values: Vec<IndicatorPoint>,
}

impl IndicatorSeries {
    /// Value at `index`, or `None` during warmup / past the end.
    pub fn get(&self, index: usize) -> Option<f64> {
        self.values
            .get(index)
            .filter(|p| p.valid)
            .map(|p| p.value)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub(crate) fn all_invalid(indicator_type: IndicatorType, len: usize) -> Self {
        IndicatorSeries {
            indicator_type,
            values: vec![IndicatorPoint::invalid(); len],
        }
    }
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Sma(period) => write!(f, "SMA({})", period),
            IndicatorType::Stddev(period) => write!(f, "STDDEV({})", period),
            IndicatorType::ZScore(period) => write!(f, "ZSCORE({})", period),
        }
    }
}
