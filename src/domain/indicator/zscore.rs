//! Rolling z-score: (C[i] - SMA(n)[i]) / STDDEV(n)[i].

use crate::domain::indicator::{rolling_std, sma, IndicatorPoint, IndicatorSeries, IndicatorType};

pub fn z_score(closes: &[f64], period: usize) -> IndicatorSeries {
    let mean = sma(closes, period);
    let std = rolling_std(closes, period);

    let values = closes
        .iter()
        .enumerate()
        .map(|(i, &close)| match (mean.get(i), std.get(i)) {
            (Some(m), Some(s)) if s > 0.0 => IndicatorPoint::valid((close - m) / s),
            _ => IndicatorPoint::invalid(),
        })
        .collect();

    IndicatorSeries {
        indicator_type: IndicatorType::ZScore(period),
        values,
    }
}
