//! Rolling Standard Deviation.
//!
//! Sample standard deviation (n-1 denominator) over n closing prices.
//! STDDEV(n)[i] = sqrt(sum((C[i-j] - SMA(n)[i])^2 for j in 0..n) / (n-1))
//! Warmup: first (n-1) points are invalid. Undefined for n < 2.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType};

pub fn rolling_std(closes: &[f64], period: usize) -> IndicatorSeries {
    let indicator_type = IndicatorType::Stddev(period);
    if period < 2 {
        return IndicatorSeries::all_invalid(indicator_type, closes.len());
    }

    let mut values = Vec::with_capacity(closes.len());

    for i in 0..closes.len() {
        if i + 1 < period {
            values.push(IndicatorPoint::invalid());
            continue;
        }

        let window = &closes[i + 1 - period..=i];
        let mean = window.iter().sum::<f64>() / period as f64;
        let variance = window
            .iter()
            .map(|c| {
                let diff = c - mean;
                diff * diff
            })
            .sum::<f64>()
            / (period - 1) as f64;

        values.push(IndicatorPoint::valid(variance.sqrt()));
    }

    IndicatorSeries {
        indicator_type,
        values,
    }
}
