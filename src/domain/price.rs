//! Price bars and the replayed price series.

use chrono::{NaiveDate, NaiveDateTime};
use std::fmt;

use super::error::QuantsimError;

/// Position of a bar on the time axis.
///
/// Daily data carries calendar dates, intraday data a date and time.
/// Synthetic series (and CSV files without a usable date column) are
/// indexed by row. A series never mixes variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Timestamp {
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    Index(usize),
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Timestamp::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Timestamp::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S")),
            Timestamp::Index(i) => write!(f, "{i}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceBar {
    pub timestamp: Timestamp,
    pub close: f64,
}

/// Ordered, immutable, non-empty sequence of bars.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    bars: Vec<PriceBar>,
}

impl PriceSeries {
    pub fn new(bars: Vec<PriceBar>) -> Result<Self, QuantsimError> {
        if bars.is_empty() {
            return Err(QuantsimError::NoData {
                source_name: "price series".into(),
            });
        }

        for (i, bar) in bars.iter().enumerate() {
            if !bar.close.is_finite() || bar.close <= 0.0 {
                return Err(QuantsimError::InvalidPrice {
                    index: i,
                    price: bar.close,
                });
            }
            if i > 0 && bars[i - 1].timestamp >= bar.timestamp {
                return Err(QuantsimError::UnorderedTimestamps { index: i });
            }
        }

        Ok(Self { bars })
    }

    /// Build an index-stamped series from bare closing prices.
    pub fn from_closes(closes: &[f64]) -> Result<Self, QuantsimError> {
        let bars = closes
            .iter()
            .enumerate()
            .map(|(i, &close)| PriceBar {
                timestamp: Timestamp::Index(i),
                close,
            })
            .collect();
        Self::new(bars)
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    pub fn close(&self, index: usize) -> f64 {
        self.bars[index].close
    }

    pub fn timestamp(&self, index: usize) -> Timestamp {
        self.bars[index].timestamp
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn last(&self) -> &PriceBar {
        // non-empty by construction
        &self.bars[self.bars.len() - 1]
    }
}

/// Percentage change between consecutive closes; the first bar has no prior.
pub fn simple_returns(closes: &[f64]) -> Vec<Option<f64>> {
    let mut out = Vec::with_capacity(closes.len());
    for i in 0..closes.len() {
        if i == 0 || closes[i - 1] == 0.0 {
            out.push(None);
        } else {
            out.push(Some(closes[i] / closes[i - 1] - 1.0));
        }
    }
    out
}

/// ln(C[i] / C[i-1]); the first bar has no prior.
pub fn log_returns(closes: &[f64]) -> Vec<Option<f64>> {
    let mut out = Vec::with_capacity(closes.len());
    for i in 0..closes.len() {
        if i == 0 || closes[i - 1] <= 0.0 || closes[i] <= 0.0 {
            out.push(None);
        } else {
            out.push(Some((closes[i] / closes[i - 1]).ln()));
        }
    }
    out
}
