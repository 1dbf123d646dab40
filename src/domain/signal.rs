//! Per-bar strategy recommendation.

use std::fmt;

/// Advisory direction emitted by a strategy for one bar.
///
/// The execution policy decides whether it is actionable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Signal {
    Buy,
    #[default]
    Hold,
    Sell,
}

impl Signal {
    pub fn value(self) -> i8 {
        match self {
            Signal::Buy => 1,
            Signal::Hold => 0,
            Signal::Sell => -1,
        }
    }

    /// Map any integer signal onto its sign.
    pub fn from_value(value: i8) -> Self {
        match value.signum() {
            1 => Signal::Buy,
            -1 => Signal::Sell,
            _ => Signal::Hold,
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Signal::Buy => "BUY",
            Signal::Hold => "HOLD",
            Signal::Sell => "SELL",
        };
        f.write_str(s)
    }
}
