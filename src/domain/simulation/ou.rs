//! Ornstein-Uhlenbeck process on log prices.
//!
//! `x` starts at `mean_level` and is pulled back toward it at rate `theta`:
//! `x += theta * (mean_level - x) * dt + sigma * dW`. Closes are `exp(x)`.
//! The start level itself is not emitted; every bar has one step applied.

use log::debug;
use rand::Rng;

use super::{
    brownian_increment, check_non_negative, check_years, step_count, Process, SyntheticBar,
    SyntheticSeries, DT,
};
use crate::domain::error::QuantsimError;

#[derive(Debug, Clone, PartialEq)]
pub struct OuParams {
    pub theta: f64,
    pub sigma: f64,
    /// Long-run mean of the log price; ln(100) by default.
    pub mean_level: f64,
    pub years: f64,
}

impl Default for OuParams {
    fn default() -> Self {
        OuParams {
            theta: 0.1,
            sigma: 0.1,
            mean_level: 4.605,
            years: 15.0,
        }
    }
}

impl OuParams {
    pub fn validate(&self) -> Result<(), QuantsimError> {
        check_years(self.years)?;
        check_non_negative("theta", self.theta)?;
        check_non_negative("sigma", self.sigma)?;
        if !self.mean_level.is_finite() {
            return Err(QuantsimError::invalid(
                "simulation",
                "mean_level",
                "mean_level must be finite",
            ));
        }
        Ok(())
    }
}

/// Time for a deviation to decay by half, in years. Infinite when `theta` is 0.
pub fn half_life(theta: f64) -> f64 {
    if theta > 0.0 {
        std::f64::consts::LN_2 / theta
    } else {
        f64::INFINITY
    }
}

pub fn simulate_ou<R: Rng + ?Sized>(params: &OuParams, rng: &mut R) -> SyntheticSeries {
    let n_steps = step_count(params.years);
    debug!(
        "OU: {} steps, theta={}, half-life {:.2} years",
        n_steps,
        params.theta,
        half_life(params.theta)
    );

    let mut bars = Vec::with_capacity(n_steps);
    let mut x = params.mean_level;
    for _ in 0..n_steps {
        let dw = brownian_increment(rng);
        x += params.theta * (params.mean_level - x) * DT + params.sigma * dw;
        bars.push(SyntheticBar {
            close: x.exp(),
            log_price: Some(x),
            regime: None,
        });
    }

    SyntheticSeries {
        process: Process::OrnsteinUhlenbeck,
        bars,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn first_bar_is_one_step_from_mean_level() {
        let params = OuParams {
            sigma: 0.5,
            years: 1.0,
            ..OuParams::default()
        };
        let series = simulate_ou(&params, &mut StdRng::seed_from_u64(42));

        assert_eq!(series.len(), 252);
        assert_eq!(series.process, Process::OrnsteinUhlenbeck);
        assert_ne!(series.bars[0].log_price, Some(4.605));
    }

    #[test]
    fn first_bar_equals_mean_level_without_noise() {
        let params = OuParams {
            sigma: 0.0,
            years: 1.0,
            ..OuParams::default()
        };
        let series = simulate_ou(&params, &mut StdRng::seed_from_u64(42));
        assert_eq!(series.bars[0].log_price, Some(4.605));
    }

    #[test]
    fn zero_noise_stays_at_mean() {
        let params = OuParams {
            sigma: 0.0,
            years: 0.5,
            ..OuParams::default()
        };
        let series = simulate_ou(&params, &mut StdRng::seed_from_u64(3));
        for bar in &series.bars {
            assert_relative_eq!(bar.log_price.unwrap(), 4.605);
        }
    }

    #[test]
    fn strong_reversion_stays_near_mean() {
        let params = OuParams {
            theta: 5.0,
            sigma: 0.1,
            mean_level: 2.0,
            years: 20.0,
        };
        let series = simulate_ou(&params, &mut StdRng::seed_from_u64(11));
        let logs: Vec<f64> = series.bars.iter().filter_map(|b| b.log_price).collect();
        let mean = logs.iter().sum::<f64>() / logs.len() as f64;

        // stationary std is sigma / sqrt(2 theta) ~ 0.03
        assert!((mean - 2.0).abs() < 0.05, "mean {mean}");
        assert!(logs.iter().all(|x| (x - 2.0).abs() < 0.3));
    }

    #[test]
    fn log_price_matches_close() {
        let params = OuParams {
            years: 1.0,
            ..OuParams::default()
        };
        let series = simulate_ou(&params, &mut StdRng::seed_from_u64(9));
        for bar in &series.bars {
            assert_relative_eq!(bar.close.ln(), bar.log_price.unwrap(), epsilon = 1e-12);
        }
    }

    #[test]
    fn same_seed_same_path() {
        let params = OuParams {
            years: 1.0,
            ..OuParams::default()
        };
        let a = simulate_ou(&params, &mut StdRng::seed_from_u64(42));
        let b = simulate_ou(&params, &mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
    }

    #[test]
    fn half_life_values() {
        assert_relative_eq!(half_life(0.1), std::f64::consts::LN_2 / 0.1);
        assert!(half_life(0.0).is_infinite());
    }

    #[test]
    fn validate_rejects_negative_theta() {
        let params = OuParams {
            theta: -1.0,
            ..OuParams::default()
        };
        assert!(params.validate().is_err());
        assert!(OuParams::default().validate().is_ok());
    }
}
