#![allow(dead_code)]

use chrono::NaiveDate;
use quantsim::domain::backtest::BacktestConfig;
use quantsim::domain::error::QuantsimError;
use quantsim::domain::execution::ExecutionConfig;
use quantsim::domain::price::{PriceBar, PriceSeries, Timestamp};
use quantsim::domain::signal::Signal;
use quantsim::domain::strategy::Strategy;
use quantsim::ports::data_port::DataPort;
use std::collections::HashMap;

pub struct MockDataPort {
    pub data: HashMap<String, PriceSeries>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_series(mut self, name: &str, series: PriceSeries) -> Self {
        self.data.insert(name.to_string(), series);
        self
    }

    pub fn with_error(mut self, name: &str, reason: &str) -> Self {
        self.errors.insert(name.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_prices(&self, name: &str) -> Result<PriceSeries, QuantsimError> {
        if let Some(reason) = self.errors.get(name) {
            return Err(QuantsimError::DataParse {
                row: 0,
                reason: reason.clone(),
            });
        }
        self.data
            .get(name)
            .cloned()
            .ok_or_else(|| QuantsimError::NoData {
                source_name: name.to_string(),
            })
    }

    fn list_series(&self) -> Result<Vec<String>, QuantsimError> {
        let mut names: Vec<String> = self.data.keys().cloned().collect();
        names.sort();
        Ok(names)
    }
}

/// Replays a fixed signal per index; HOLD past the end of the script.
pub struct Scripted {
    pub signals: Vec<Signal>,
}

impl Scripted {
    pub fn new(signals: Vec<Signal>) -> Self {
        Self { signals }
    }

    pub fn always_hold() -> Self {
        Self::new(Vec::new())
    }
}

impl Strategy for Scripted {
    fn name(&self) -> &str {
        "Scripted"
    }

    fn initialize(&mut self, _series: &PriceSeries) {}

    fn generate_signal(&mut self, index: usize) -> Signal {
        self.signals.get(index).copied().unwrap_or_default()
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn series(closes: &[f64]) -> PriceSeries {
    PriceSeries::from_closes(closes).unwrap()
}

/// Consecutive calendar days starting at `start`.
pub fn dated_series(start: NaiveDate, closes: &[f64]) -> PriceSeries {
    let bars = closes
        .iter()
        .enumerate()
        .map(|(i, &close)| PriceBar {
            timestamp: Timestamp::Date(start + chrono::Duration::days(i as i64)),
            close,
        })
        .collect();
    PriceSeries::new(bars).unwrap()
}

/// Deterministic oscillating series around `base`.
pub fn wave(n: usize, base: f64, amplitude: f64, period: f64) -> Vec<f64> {
    (0..n)
        .map(|i| base + amplitude * (i as f64 * std::f64::consts::TAU / period).sin())
        .collect()
}

pub fn frictionless_config(initial_capital: f64) -> BacktestConfig {
    BacktestConfig {
        initial_capital,
        execution: ExecutionConfig::frictionless(),
        risk_free_rate: 0.0,
    }
}

pub fn sample_config() -> BacktestConfig {
    BacktestConfig {
        initial_capital: 10_000.0,
        execution: ExecutionConfig::default(),
        risk_free_rate: 0.02,
    }
}
