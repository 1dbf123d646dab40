//! Strategy interface and the built-in strategy families.
//!
//! A strategy sees the full price series once, up front, in
//! [`Strategy::initialize`] (where it precomputes its indicator arrays) and is
//! then asked for one signal per bar, in strictly increasing index order.
//! Implementations must only consult data at or before the requested index.

pub mod buy_and_hold;
pub mod mean_reversion;
pub mod momentum;

use std::fmt;
use std::str::FromStr;

use super::price::PriceSeries;
use super::signal::Signal;

pub use buy_and_hold::BuyAndHold;
pub use mean_reversion::{MeanReversion, MeanReversionParams};
pub use momentum::{Momentum, MomentumParams};

pub trait Strategy {
    fn name(&self) -> &str;

    /// One-time precomputation over the whole series.
    fn initialize(&mut self, series: &PriceSeries);

    /// Signal for bar `index`. Returns [`Signal::Hold`] for any index the
    /// strategy has no data for.
    fn generate_signal(&mut self, index: usize) -> Signal;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StrategyKind {
    MeanReversion,
    Momentum,
    BuyAndHold,
}

impl StrategyKind {
    pub const ALL: [StrategyKind; 3] = [
        StrategyKind::MeanReversion,
        StrategyKind::Momentum,
        StrategyKind::BuyAndHold,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            StrategyKind::MeanReversion => "mean_reversion",
            StrategyKind::Momentum => "momentum",
            StrategyKind::BuyAndHold => "buy_and_hold",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StrategyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "mean_reversion" => Ok(StrategyKind::MeanReversion),
            "momentum" => Ok(StrategyKind::Momentum),
            "buy_and_hold" => Ok(StrategyKind::BuyAndHold),
            other => Err(format!(
                "unknown strategy '{other}' (expected mean_reversion, momentum or buy_and_hold)"
            )),
        }
    }
}

/// Parameters for every strategy family, selected by kind.
#[derive(Debug, Clone, PartialEq)]
pub enum StrategyConfig {
    MeanReversion(MeanReversionParams),
    Momentum(MomentumParams),
    BuyAndHold,
}

impl StrategyConfig {
    pub fn kind(&self) -> StrategyKind {
        match self {
            StrategyConfig::MeanReversion(_) => StrategyKind::MeanReversion,
            StrategyConfig::Momentum(_) => StrategyKind::Momentum,
            StrategyConfig::BuyAndHold => StrategyKind::BuyAndHold,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        self.kind().as_str()
    }

    /// Default parameters for `kind`.
    pub fn defaults(kind: StrategyKind) -> Self {
        match kind {
            StrategyKind::MeanReversion => {
                StrategyConfig::MeanReversion(MeanReversionParams::default())
            }
            StrategyKind::Momentum => StrategyConfig::Momentum(MomentumParams::default()),
            StrategyKind::BuyAndHold => StrategyConfig::BuyAndHold,
        }
    }

    pub fn build(&self) -> Box<dyn Strategy> {
        match self {
            StrategyConfig::MeanReversion(p) => Box::new(MeanReversion::new(p.clone())),
            StrategyConfig::Momentum(p) => Box::new(Momentum::new(p.clone())),
            StrategyConfig::BuyAndHold => Box::new(BuyAndHold::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_parses_case_insensitively() {
        assert_eq!(
            "Mean-Reversion".parse::<StrategyKind>().unwrap(),
            StrategyKind::MeanReversion
        );
        assert_eq!(
            " momentum ".parse::<StrategyKind>().unwrap(),
            StrategyKind::Momentum
        );
        assert_eq!(
            "BUY_AND_HOLD".parse::<StrategyKind>().unwrap(),
            StrategyKind::BuyAndHold
        );
    }

    #[test]
    fn kind_rejects_unknown() {
        let err = "pairs".parse::<StrategyKind>().unwrap_err();
        assert!(err.contains("pairs"));
    }

    #[test]
    fn kind_display_round_trips() {
        for kind in StrategyKind::ALL {
            assert_eq!(kind.to_string().parse::<StrategyKind>().unwrap(), kind);
        }
    }

    #[test]
    fn build_from_defaults() {
        for kind in StrategyKind::ALL {
            let config = StrategyConfig::defaults(kind);
            assert_eq!(config.kind(), kind);
            assert_eq!(config.kind_name(), kind.as_str());
            let strategy = config.build();
            assert!(!strategy.name().is_empty());
        }
    }
}
