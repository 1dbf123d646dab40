//! Moving-average crossover state.
//!
//! state[i] = +1 when SMA(fast) > SMA(slow), -1 when below, 0 when equal or
//! either average is still warming up.

use crate::domain::indicator::{sma, IndicatorSeries};

pub fn ma_crossover(
    closes: &[f64],
    fast: usize,
    slow: usize,
) -> (Vec<i8>, IndicatorSeries, IndicatorSeries) {
    let fast_ma = sma(closes, fast);
    let slow_ma = sma(closes, slow);

    let state = (0..closes.len())
        .map(|i| match (fast_ma.get(i), slow_ma.get(i)) {
            (Some(f), Some(s)) if f > s => 1,
            (Some(f), Some(s)) if f < s => -1,
            _ => 0,
        })
        .collect();

    (state, fast_ma, slow_ma)
}
