//! Geometric Brownian motion.

use log::debug;
use rand::Rng;

use super::{
    brownian_increment, check_non_negative, check_positive, check_years, step_count, Process,
    SyntheticBar, SyntheticSeries, DT,
};
use crate::domain::error::QuantsimError;
use crate::domain::metrics::{annual_to_daily_return, annual_to_daily_volatility};

#[derive(Debug, Clone, PartialEq)]
pub struct GbmParams {
    /// Annual drift.
    pub mu: f64,
    /// Annual volatility.
    pub sigma: f64,
    pub years: f64,
    pub start_price: f64,
}

impl Default for GbmParams {
    fn default() -> Self {
        GbmParams {
            mu: 0.05,
            sigma: 0.2,
            years: 15.0,
            start_price: 100.0,
        }
    }
}

impl GbmParams {
    pub fn validate(&self) -> Result<(), QuantsimError> {
        check_years(self.years)?;
        check_non_negative("sigma", self.sigma)?;
        check_positive("start_price", self.start_price)?;
        if !self.mu.is_finite() {
            return Err(QuantsimError::invalid("simulation", "mu", "mu must be finite"));
        }
        Ok(())
    }
}

/// One close per step; the start price itself is not emitted.
pub fn simulate_gbm<R: Rng + ?Sized>(params: &GbmParams, rng: &mut R) -> SyntheticSeries {
    let mu_d = annual_to_daily_return(params.mu);
    let sigma_d = annual_to_daily_volatility(params.sigma);
    let n_steps = step_count(params.years);

    debug!(
        "GBM: {} steps, mu_d={:.6}, sigma_d={:.6}",
        n_steps, mu_d, sigma_d
    );

    let mut price = params.start_price;
    let bars = (0..n_steps)
        .map(|_| {
            let dw = brownian_increment(rng);
            price *= (mu_d * DT + sigma_d * dw).exp();
            SyntheticBar {
                close: price,
                log_price: None,
                regime: None,
            }
        })
        .collect();

    SyntheticSeries {
        process: Process::Gbm,
        bars,
    }
}
