//! Simple Moving Average.
//!
//! SMA(n)[i] = sum(C[i-j] for j in 0..n) / n
//! Warmup: first (n-1) points are invalid.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType};

pub fn sma(closes: &[f64], period: usize) -> IndicatorSeries {
    let indicator_type = IndicatorType::Sma(period);
    if period == 0 {
        return IndicatorSeries::all_invalid(indicator_type, closes.len());
    }

    let mut values = Vec::with_capacity(closes.len());
    let mut sum = 0.0;

    for (i, &close) in closes.iter().enumerate() {
        sum += close;
        if i >= period {
            sum -= closes[i - period];
        }
        if i + 1 >= period {
            values.push(IndicatorPoint::valid(sum / period as f64));
        } else {
            values.push(IndicatorPoint::invalid());
        }
    }

    IndicatorSeries {
        indicator_type,
        values,
    }
}
