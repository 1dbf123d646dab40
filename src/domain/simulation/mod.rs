//! Synthetic price series generators.
//!
//! Every generator takes its random stream as an argument, so a seeded
//! generator reproduces the same path and independent runs never share
//! state. Time steps are trading days: `dt = 1/252`, `floor(years * 252)`
//! steps.

pub mod gbm;
pub mod ou;
pub mod regime;

pub use gbm::{simulate_gbm, GbmParams};
pub use ou::{half_life, simulate_ou, OuParams};
pub use regime::{simulate_regime_switching, RegimeParams};

use rand::distributions::Open01;
use rand::Rng;
use std::fmt;

use super::error::QuantsimError;
use super::metrics::TRADING_DAYS_PER_YEAR;
use super::price::PriceSeries;

pub(crate) const DT: f64 = 1.0 / TRADING_DAYS_PER_YEAR;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Process {
    Gbm,
    OrnsteinUhlenbeck,
    RegimeSwitching,
}

impl fmt::Display for Process {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Process::Gbm => f.write_str("GBM"),
            Process::OrnsteinUhlenbeck => f.write_str("OU"),
            Process::RegimeSwitching => f.write_str("regime-switching"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Regime {
    Trending,
    MeanReverting,
}

impl Regime {
    pub fn code(self) -> u8 {
        match self {
            Regime::Trending => 0,
            Regime::MeanReverting => 1,
        }
    }

    pub fn other(self) -> Self {
        match self {
            Regime::Trending => Regime::MeanReverting,
            Regime::MeanReverting => Regime::Trending,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SyntheticBar {
    pub close: f64,
    pub log_price: Option<f64>,
    pub regime: Option<Regime>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SyntheticSeries {
    pub process: Process,
    pub bars: Vec<SyntheticBar>,
}

impl SyntheticSeries {
    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    /// Index-stamped series ready for replay.
    pub fn to_price_series(&self) -> Result<PriceSeries, QuantsimError> {
        PriceSeries::from_closes(&self.closes())
    }

    /// (trending, mean-reverting) bar counts; zero for single-regime processes.
    pub fn regime_counts(&self) -> (usize, usize) {
        self.bars
            .iter()
            .filter_map(|b| b.regime)
            .fold((0, 0), |(t, r), regime| match regime {
                Regime::Trending => (t + 1, r),
                Regime::MeanReverting => (t, r + 1),
            })
    }
}

/// Number of daily steps in `years`.
pub fn step_count(years: f64) -> usize {
    (years * TRADING_DAYS_PER_YEAR).floor().max(0.0) as usize
}

/// Draw from N(0, 1) with the Box-Muller transform.
pub fn standard_normal<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    let u1: f64 = rng.sample(Open01);
    let u2: f64 = rng.sample(Open01);
    (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
}

/// Brownian increment over one step: N(0, sqrt(dt)).
pub(crate) fn brownian_increment<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    DT.sqrt() * standard_normal(rng)
}

pub(crate) fn check_years(years: f64) -> Result<(), QuantsimError> {
    if !(years > 0.0) || step_count(years) == 0 {
        return Err(QuantsimError::invalid(
            "simulation",
            "years",
            "years must cover at least one trading day",
        ));
    }
    Ok(())
}

pub(crate) fn check_non_negative(key: &str, value: f64) -> Result<(), QuantsimError> {
    if !(value >= 0.0) {
        return Err(QuantsimError::invalid(
            "simulation",
            key,
            format!("{key} must be non-negative"),
        ));
    }
    Ok(())
}

pub(crate) fn check_positive(key: &str, value: f64) -> Result<(), QuantsimError> {
    if !(value > 0.0) {
        return Err(QuantsimError::invalid(
            "simulation",
            key,
            format!("{key} must be positive"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn step_count_floors() {
        assert_eq!(step_count(1.0), 252);
        assert_eq!(step_count(0.5), 126);
        assert_eq!(step_count(0.001), 0);
        assert_eq!(step_count(-1.0), 0);
    }

    #[test]
    fn standard_normal_moments() {
        let mut rng = StdRng::seed_from_u64(7);
        let n = 20_000;
        let draws: Vec<f64> = (0..n).map(|_| standard_normal(&mut rng)).collect();
        let mean = draws.iter().sum::<f64>() / n as f64;
        let var = draws.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1) as f64;

        assert!(mean.abs() < 0.05, "mean {mean}");
        assert!((var - 1.0).abs() < 0.05, "variance {var}");
        assert!(draws.iter().all(|x| x.is_finite()));
    }

    #[test]
    fn regime_helpers() {
        assert_eq!(Regime::Trending.code(), 0);
        assert_eq!(Regime::MeanReverting.code(), 1);
        assert_eq!(Regime::Trending.other(), Regime::MeanReverting);
    }

    #[test]
    fn check_years_rejects_empty_horizon() {
        assert!(check_years(0.0).is_err());
        assert!(check_years(f64::NAN).is_err());
        assert!(check_years(1.0 / 252.0).is_ok());
    }
}
