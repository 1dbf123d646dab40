//! Moving-average crossover momentum.
//!
//! Enters on a fresh golden cross (fast SMA moves above slow SMA on this bar)
//! and exits on a death cross or when the fast SMA drops below the exit SMA.

use super::Strategy;
use crate::domain::indicator::{ma_crossover, sma, IndicatorSeries};
use crate::domain::price::PriceSeries;
use crate::domain::signal::Signal;

#[derive(Debug, Clone, PartialEq)]
pub struct MomentumParams {
    pub fast_ma: usize,
    pub slow_ma: usize,
    pub exit_ma: usize,
}

impl Default for MomentumParams {
    fn default() -> Self {
        MomentumParams {
            fast_ma: 20,
            slow_ma: 50,
            exit_ma: 10,
        }
    }
}

#[derive(Debug, Clone)]
struct Indicators {
    cross_state: Vec<i8>,
    fast: IndicatorSeries,
    exit: IndicatorSeries,
}

#[derive(Debug, Clone)]
pub struct Momentum {
    params: MomentumParams,
    indicators: Option<Indicators>,
    in_position: bool,
}

impl Momentum {
    pub fn new(params: MomentumParams) -> Self {
        Momentum {
            params,
            indicators: None,
            in_position: false,
        }
    }

    pub fn params(&self) -> &MomentumParams {
        &self.params
    }

    pub fn in_position(&self) -> bool {
        self.in_position
    }
}

impl Strategy for Momentum {
    fn name(&self) -> &str {
        "Momentum"
    }

    fn initialize(&mut self, series: &PriceSeries) {
        let closes = series.closes();
        let (cross_state, fast, _slow) =
            ma_crossover(&closes, self.params.fast_ma, self.params.slow_ma);
        let exit = sma(&closes, self.params.exit_ma);

        self.indicators = Some(Indicators {
            cross_state,
            fast,
            exit,
        });
        self.in_position = false;
    }

    fn generate_signal(&mut self, index: usize) -> Signal {
        if index < self.params.slow_ma {
            return Signal::Hold;
        }
        let Some(ind) = self.indicators.as_ref() else {
            return Signal::Hold;
        };
        let (Some(fast), Some(exit)) = (ind.fast.get(index), ind.exit.get(index)) else {
            return Signal::Hold;
        };
        let Some(&state) = ind.cross_state.get(index) else {
            return Signal::Hold;
        };
        let prev_state = if index > 0 {
            ind.cross_state[index - 1]
        } else {
            0
        };

        if !self.in_position && state == 1 && prev_state != 1 {
            self.in_position = true;
            return Signal::Buy;
        }

        if self.in_position && (state == -1 || fast < exit) {
            self.in_position = false;
            return Signal::Sell;
        }

        Signal::Hold
    }
}
