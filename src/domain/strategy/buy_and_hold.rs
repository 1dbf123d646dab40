//! Benchmark: buy on the first bar and never sell.
//!
//! The open position is closed by the end-of-run liquidation.

use super::Strategy;
use crate::domain::price::PriceSeries;
use crate::domain::signal::Signal;

#[derive(Debug, Clone, Default)]
pub struct BuyAndHold {
    bars: usize,
}

impl BuyAndHold {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Strategy for BuyAndHold {
    fn name(&self) -> &str {
        "BuyAndHold"
    }

    fn initialize(&mut self, series: &PriceSeries) {
        self.bars = series.len();
    }

    fn generate_signal(&mut self, index: usize) -> Signal {
        if index == 0 && self.bars > 0 {
            Signal::Buy
        } else {
            Signal::Hold
        }
    }
}
