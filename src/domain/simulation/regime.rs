//! Two-state Markov regime-switching process.
//!
//! The trending regime drifts like GBM on the log price. The range-bound
//! regime reverts toward a mean level that is re-anchored to the current log
//! price every 50 steps. After each step the regime flips with the
//! off-diagonal transition probability of the current state.

use log::debug;
use rand::Rng;

use super::{
    brownian_increment, check_non_negative, check_positive, check_years, step_count, Process,
    Regime, SyntheticBar, SyntheticSeries, DT,
};
use crate::domain::error::QuantsimError;
use crate::domain::metrics::{annual_to_daily_return, annual_to_daily_volatility};

const MEAN_REANCHOR_STEPS: usize = 50;

#[derive(Debug, Clone, PartialEq)]
pub struct RegimeParams {
    pub trend_mu: f64,
    pub trend_sigma: f64,
    pub ou_theta: f64,
    pub ou_sigma: f64,
    pub p_trend_to_range: f64,
    pub p_range_to_trend: f64,
    pub years: f64,
    pub start_price: f64,
}

impl Default for RegimeParams {
    fn default() -> Self {
        RegimeParams {
            trend_mu: 0.06,
            trend_sigma: 0.18,
            ou_theta: 0.08,
            ou_sigma: 0.12,
            p_trend_to_range: 0.03,
            p_range_to_trend: 0.05,
            years: 15.0,
            start_price: 100.0,
        }
    }
}

impl RegimeParams {
    pub fn validate(&self) -> Result<(), QuantsimError> {
        check_years(self.years)?;
        check_positive("start_price", self.start_price)?;
        check_non_negative("trend_sigma", self.trend_sigma)?;
        check_non_negative("ou_theta", self.ou_theta)?;
        check_non_negative("ou_sigma", self.ou_sigma)?;
        for (key, p) in [
            ("p_trend_to_range", self.p_trend_to_range),
            ("p_range_to_trend", self.p_range_to_trend),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return Err(QuantsimError::invalid(
                    "simulation",
                    key,
                    "probability must be in [0, 1]",
                ));
            }
        }
        if !self.trend_mu.is_finite() {
            return Err(QuantsimError::invalid(
                "simulation",
                "trend_mu",
                "trend_mu must be finite",
            ));
        }
        Ok(())
    }

    fn switch_probability(&self, regime: Regime) -> f64 {
        match regime {
            Regime::Trending => self.p_trend_to_range,
            Regime::MeanReverting => self.p_range_to_trend,
        }
    }
}

/// Each bar carries the regime that was active while it was generated.
pub fn simulate_regime_switching<R: Rng + ?Sized>(
    params: &RegimeParams,
    rng: &mut R,
) -> SyntheticSeries {
    let n_steps = step_count(params.years);
    let mu_d = annual_to_daily_return(params.trend_mu);
    let sigma_d = annual_to_daily_volatility(params.trend_sigma);

    let mut log_price = params.start_price.ln();
    let mut mean_level = log_price;
    let mut regime = Regime::Trending;
    let mut bars = Vec::with_capacity(n_steps);

    for t in 0..n_steps {
        let active = regime;
        let dw = brownian_increment(rng);

        match active {
            Regime::Trending => {
                log_price += mu_d * DT + sigma_d * dw;
            }
            Regime::MeanReverting => {
                if t % MEAN_REANCHOR_STEPS == 0 {
                    mean_level = log_price;
                }
                log_price += params.ou_theta * (mean_level - log_price) * DT + params.ou_sigma * dw;
            }
        }

        let u: f64 = rng.gen_range(0.0..1.0);
        if u < params.switch_probability(active) {
            regime = active.other();
        }

        bars.push(SyntheticBar {
            close: log_price.exp(),
            log_price: Some(log_price),
            regime: Some(active),
        });
    }

    let series = SyntheticSeries {
        process: Process::RegimeSwitching,
        bars,
    };
    let (trending, ranging) = series.regime_counts();
    debug!(
        "Regime switching: {} steps, {} trending, {} range-bound",
        n_steps, trending, ranging
    );
    series
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn one_year() -> RegimeParams {
        RegimeParams {
            years: 1.0,
            ..RegimeParams::default()
        }
    }

    #[test]
    fn default_params_validate() {
        let p = RegimeParams::default();
        assert_eq!(p.p_trend_to_range, 0.03);
        assert_eq!(p.p_range_to_trend, 0.05);
        assert!(p.validate().is_ok());
    }

    #[test]
    fn starts_trending_and_labels_every_bar() {
        let series = simulate_regime_switching(&one_year(), &mut StdRng::seed_from_u64(42));

        assert_eq!(series.len(), 252);
        assert_eq!(series.bars[0].regime, Some(Regime::Trending));
        assert!(series.bars.iter().all(|b| b.regime.is_some()));
        let (t, r) = series.regime_counts();
        assert_eq!(t + r, 252);
    }

    #[test]
    fn never_switches_with_zero_probability() {
        let params = RegimeParams {
            p_trend_to_range: 0.0,
            ..one_year()
        };
        let series = simulate_regime_switching(&params, &mut StdRng::seed_from_u64(5));
        assert_eq!(series.regime_counts(), (252, 0));
    }

    #[test]
    fn alternates_with_certain_switching() {
        let params = RegimeParams {
            p_trend_to_range: 1.0,
            p_range_to_trend: 1.0,
            ..one_year()
        };
        let series = simulate_regime_switching(&params, &mut StdRng::seed_from_u64(5));

        for (t, bar) in series.bars.iter().enumerate() {
            let expected = if t % 2 == 0 {
                Regime::Trending
            } else {
                Regime::MeanReverting
            };
            assert_eq!(bar.regime, Some(expected));
        }
        assert_eq!(series.regime_counts(), (126, 126));
    }

    #[test]
    fn absorbing_range_regime_without_noise_is_flat() {
        // one trending step with no noise or drift, then range-bound forever
        let params = RegimeParams {
            trend_mu: 0.0,
            trend_sigma: 0.0,
            ou_sigma: 0.0,
            p_trend_to_range: 1.0,
            p_range_to_trend: 0.0,
            ..one_year()
        };
        let series = simulate_regime_switching(&params, &mut StdRng::seed_from_u64(8));

        assert_eq!(series.regime_counts(), (1, 251));
        for bar in &series.bars {
            assert!((bar.close - 100.0).abs() < 1e-9);
        }
    }

    #[test]
    fn same_seed_same_path() {
        let a = simulate_regime_switching(&one_year(), &mut StdRng::seed_from_u64(42));
        let b = simulate_regime_switching(&one_year(), &mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
    }

    #[test]
    fn validate_rejects_probability_out_of_range() {
        let params = RegimeParams {
            p_range_to_trend: 1.5,
            ..RegimeParams::default()
        };
        let err = params.validate().unwrap_err();
        assert!(err.to_string().contains("p_range_to_trend"));
    }
}
