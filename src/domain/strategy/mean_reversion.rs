//! Z-score mean reversion.
//!
//! Enters long when the close falls more than `entry_z` standard deviations
//! below its rolling mean and exits on either a stop-loss (`|z| >
//! stop_loss_z`) or a take-profit (`|z| < exit_z`). Long only: stretched
//! prices above the mean are ignored.
//!
//! The stop-loss check runs before the take-profit check. When both hold on
//! the same bar (only possible when `exit_z > stop_loss_z`) the exit is a
//! stop-loss.

use super::Strategy;
use crate::domain::indicator::{z_score, IndicatorSeries};
use crate::domain::price::PriceSeries;
use crate::domain::signal::Signal;

#[derive(Debug, Clone, PartialEq)]
pub struct MeanReversionParams {
    pub window: usize,
    pub entry_z: f64,
    pub exit_z: f64,
    pub stop_loss_z: f64,
}

impl Default for MeanReversionParams {
    fn default() -> Self {
        MeanReversionParams {
            window: 20,
            entry_z: 2.0,
            exit_z: 0.5,
            stop_loss_z: 3.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    StopLoss,
    TakeProfit,
}

#[derive(Debug, Clone)]
pub struct MeanReversion {
    params: MeanReversionParams,
    z_scores: Option<IndicatorSeries>,
    in_position: bool,
    last_exit: Option<ExitReason>,
}

impl MeanReversion {
    pub fn new(params: MeanReversionParams) -> Self {
        MeanReversion {
            params,
            z_scores: None,
            in_position: false,
            last_exit: None,
        }
    }

    pub fn params(&self) -> &MeanReversionParams {
        &self.params
    }

    pub fn in_position(&self) -> bool {
        self.in_position
    }

    /// Why the most recent exit signal fired.
    pub fn last_exit(&self) -> Option<ExitReason> {
        self.last_exit
    }

    fn exit(&mut self, reason: ExitReason) -> Signal {
        self.in_position = false;
        self.last_exit = Some(reason);
        Signal::Sell
    }
}

impl Strategy for MeanReversion {
    fn name(&self) -> &str {
        "MeanReversion"
    }

    fn initialize(&mut self, series: &PriceSeries) {
        self.z_scores = Some(z_score(&series.closes(), self.params.window));
        self.in_position = false;
        self.last_exit = None;
    }

    fn generate_signal(&mut self, index: usize) -> Signal {
        if index < self.params.window {
            return Signal::Hold;
        }
        let Some(z) = self.z_scores.as_ref().and_then(|s| s.get(index)) else {
            return Signal::Hold;
        };

        if !self.in_position {
            if z < -self.params.entry_z {
                self.in_position = true;
                return Signal::Buy;
            }
            return Signal::Hold;
        }

        if z.abs() > self.params.stop_loss_z {
            return self.exit(ExitReason::StopLoss);
        }
        if z.abs() < self.params.exit_z {
            return self.exit(ExitReason::TakeProfit);
        }
        Signal::Hold
    }
}
