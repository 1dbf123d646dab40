//! Configuration validation and typed config builders.
//!
//! Validates every field before a backtest runs and turns the raw INI values
//! into [`BacktestConfig`] and [`StrategyConfig`].

use std::path::PathBuf;

use crate::domain::backtest::BacktestConfig;
use crate::domain::error::QuantsimError;
use crate::domain::execution::ExecutionConfig;
use crate::domain::strategy::{MeanReversionParams, MomentumParams, StrategyConfig, StrategyKind};
use crate::ports::config_port::ConfigPort;

/// Validates `[backtest]` and requires `[data] path`.
pub fn validate_backtest_config(config: &dyn ConfigPort) -> Result<(), QuantsimError> {
    validate_backtest_params(config)?;
    data_path(config)?;
    Ok(())
}

/// Validates the numeric `[backtest]` fields only.
pub fn validate_backtest_params(config: &dyn ConfigPort) -> Result<(), QuantsimError> {
    validate_initial_capital(config)?;
    validate_unit_rate(config, "transaction_cost")?;
    validate_unit_rate(config, "slippage")?;
    validate_unit_rate(config, "risk_free_rate")?;
    Ok(())
}

pub fn validate_strategy_config(config: &dyn ConfigPort) -> Result<(), QuantsimError> {
    let kind = strategy_kind(config)?;
    build_strategy_config(config, kind)?;
    Ok(())
}

pub fn build_backtest_config(config: &dyn ConfigPort) -> Result<BacktestConfig, QuantsimError> {
    validate_backtest_params(config)?;
    let defaults = BacktestConfig::default();
    Ok(BacktestConfig {
        initial_capital: config.get_double("backtest", "initial_capital", defaults.initial_capital),
        execution: ExecutionConfig {
            transaction_cost: config.get_double(
                "backtest",
                "transaction_cost",
                defaults.execution.transaction_cost,
            ),
            slippage: config.get_double("backtest", "slippage", defaults.execution.slippage),
            liquidation_slippage: config.get_bool(
                "backtest",
                "liquidation_slippage",
                defaults.execution.liquidation_slippage,
            ),
        },
        risk_free_rate: config.get_double("backtest", "risk_free_rate", defaults.risk_free_rate),
    })
}

/// Reads `[strategy] kind`.
pub fn strategy_kind(config: &dyn ConfigPort) -> Result<StrategyKind, QuantsimError> {
    match config.get_string("strategy", "kind") {
        Some(s) if !s.trim().is_empty() => s
            .parse()
            .map_err(|reason: String| QuantsimError::invalid("strategy", "kind", reason)),
        _ => Err(QuantsimError::ConfigMissing {
            section: "strategy".to_string(),
            key: "kind".to_string(),
        }),
    }
}

/// Reads the parameters for `kind` from `[strategy]`, falling back to the
/// family defaults, and validates them.
pub fn build_strategy_config(
    config: &dyn ConfigPort,
    kind: StrategyKind,
) -> Result<StrategyConfig, QuantsimError> {
    let strategy = match kind {
        StrategyKind::MeanReversion => {
            let d = MeanReversionParams::default();
            StrategyConfig::MeanReversion(MeanReversionParams {
                window: get_count(config, "window", d.window)?,
                entry_z: config.get_double("strategy", "entry_z", d.entry_z),
                exit_z: config.get_double("strategy", "exit_z", d.exit_z),
                stop_loss_z: config.get_double("strategy", "stop_loss_z", d.stop_loss_z),
            })
        }
        StrategyKind::Momentum => {
            let d = MomentumParams::default();
            StrategyConfig::Momentum(MomentumParams {
                fast_ma: get_count(config, "fast_ma", d.fast_ma)?,
                slow_ma: get_count(config, "slow_ma", d.slow_ma)?,
                exit_ma: get_count(config, "exit_ma", d.exit_ma)?,
            })
        }
        StrategyKind::BuyAndHold => StrategyConfig::BuyAndHold,
    };
    validate_strategy_params(&strategy)?;
    Ok(strategy)
}

pub fn validate_strategy_params(strategy: &StrategyConfig) -> Result<(), QuantsimError> {
    match strategy {
        StrategyConfig::MeanReversion(p) => {
            if p.window < 2 {
                return Err(QuantsimError::invalid(
                    "strategy",
                    "window",
                    "window must be at least 2",
                ));
            }
            if !(p.entry_z > 0.0) {
                return Err(QuantsimError::invalid(
                    "strategy",
                    "entry_z",
                    "entry_z must be positive",
                ));
            }
            if !(p.exit_z >= 0.0) {
                return Err(QuantsimError::invalid(
                    "strategy",
                    "exit_z",
                    "exit_z must be non-negative",
                ));
            }
            if !(p.stop_loss_z > p.entry_z) {
                return Err(QuantsimError::invalid(
                    "strategy",
                    "stop_loss_z",
                    "stop_loss_z must be greater than entry_z",
                ));
            }
        }
        StrategyConfig::Momentum(p) => {
            if p.fast_ma < 1 {
                return Err(QuantsimError::invalid(
                    "strategy",
                    "fast_ma",
                    "fast_ma must be at least 1",
                ));
            }
            if p.slow_ma <= p.fast_ma {
                return Err(QuantsimError::invalid(
                    "strategy",
                    "slow_ma",
                    "slow_ma must be greater than fast_ma",
                ));
            }
            if p.exit_ma < 1 {
                return Err(QuantsimError::invalid(
                    "strategy",
                    "exit_ma",
                    "exit_ma must be at least 1",
                ));
            }
        }
        StrategyConfig::BuyAndHold => {}
    }
    Ok(())
}

/// `[data] path`, required.
pub fn data_path(config: &dyn ConfigPort) -> Result<PathBuf, QuantsimError> {
    match config.get_string("data", "path") {
        Some(s) if !s.trim().is_empty() => Ok(PathBuf::from(s.trim())),
        _ => Err(QuantsimError::ConfigMissing {
            section: "data".to_string(),
            key: "path".to_string(),
        }),
    }
}

/// `[report] output_dir`, optional.
pub fn report_output_dir(config: &dyn ConfigPort) -> Option<PathBuf> {
    config
        .get_string("report", "output_dir")
        .filter(|s| !s.trim().is_empty())
        .map(|s| PathBuf::from(s.trim()))
}

fn validate_initial_capital(config: &dyn ConfigPort) -> Result<(), QuantsimError> {
    let default = BacktestConfig::default().initial_capital;
    let value = config.get_double("backtest", "initial_capital", default);
    if !(value > 0.0) || !value.is_finite() {
        return Err(QuantsimError::invalid(
            "backtest",
            "initial_capital",
            "initial_capital must be positive",
        ));
    }
    Ok(())
}

fn validate_unit_rate(config: &dyn ConfigPort, key: &str) -> Result<(), QuantsimError> {
    let value = config.get_double("backtest", key, 0.0);
    if !(0.0..1.0).contains(&value) {
        return Err(QuantsimError::invalid(
            "backtest",
            key,
            format!("{key} must be between 0 and 1"),
        ));
    }
    Ok(())
}

fn get_count(config: &dyn ConfigPort, key: &str, default: usize) -> Result<usize, QuantsimError> {
    let value = config.get_int("strategy", key, default as i64);
    usize::try_from(value)
        .map_err(|_| QuantsimError::invalid("strategy", key, format!("{key} must be non-negative")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::file_config_adapter::FileConfigAdapter;

    fn make_config(content: &str) -> FileConfigAdapter {
        FileConfigAdapter::from_string(content).unwrap()
    }

    #[test]
    fn valid_backtest_config_passes() {
        let config = make_config(
            r#"
[backtest]
initial_capital = 100000.0
transaction_cost = 0.001
slippage = 0.0005
risk_free_rate = 0.02

[data]
path = data/prices.csv
"#,
        );
        assert!(validate_backtest_config(&config).is_ok());
    }

    #[test]
    fn initial_capital_must_be_positive() {
        let config = make_config("[backtest]\ninitial_capital = -100\n[data]\npath = a.csv\n");
        let err = validate_backtest_config(&config).unwrap_err();
        assert!(
            matches!(err, QuantsimError::ConfigInvalid { key, .. } if key == "initial_capital")
        );
    }

    #[test]
    fn initial_capital_zero_fails() {
        let config = make_config("[backtest]\ninitial_capital = 0\n[data]\npath = a.csv\n");
        let err = validate_backtest_config(&config).unwrap_err();
        assert!(
            matches!(err, QuantsimError::ConfigInvalid { key, .. } if key == "initial_capital")
        );
    }

    #[test]
    fn transaction_cost_negative_fails() {
        let config = make_config("[backtest]\ntransaction_cost = -0.01\n[data]\npath = a.csv\n");
        let err = validate_backtest_config(&config).unwrap_err();
        assert!(
            matches!(err, QuantsimError::ConfigInvalid { key, .. } if key == "transaction_cost")
        );
    }

    #[test]
    fn slippage_of_one_fails() {
        let config = make_config("[backtest]\nslippage = 1.0\n[data]\npath = a.csv\n");
        let err = validate_backtest_config(&config).unwrap_err();
        assert!(matches!(err, QuantsimError::ConfigInvalid { key, .. } if key == "slippage"));
    }

    #[test]
    fn risk_free_rate_out_of_range_fails() {
        let config = make_config("[backtest]\nrisk_free_rate = 1.5\n[data]\npath = a.csv\n");
        let err = validate_backtest_config(&config).unwrap_err();
        assert!(
            matches!(err, QuantsimError::ConfigInvalid { key, .. } if key == "risk_free_rate")
        );
    }

    #[test]
    fn missing_data_path_fails() {
        let config = make_config("[backtest]\ninitial_capital = 100\n");
        let err = validate_backtest_config(&config).unwrap_err();
        assert!(matches!(err, QuantsimError::ConfigMissing { key, .. } if key == "path"));
        assert!(validate_backtest_params(&config).is_ok());
    }

    #[test]
    fn build_backtest_config_applies_defaults() {
        let config = make_config("[backtest]\ninitial_capital = 5000\nliquidation_slippage = yes\n");
        let built = build_backtest_config(&config).unwrap();

        assert_eq!(built.initial_capital, 5000.0);
        assert_eq!(built.execution.transaction_cost, 0.001);
        assert_eq!(built.execution.slippage, 0.0005);
        assert!(built.execution.liquidation_slippage);
        assert_eq!(built.risk_free_rate, 0.02);
    }

    #[test]
    fn build_backtest_config_empty_file_uses_defaults() {
        let config = make_config("");
        assert_eq!(build_backtest_config(&config).unwrap(), BacktestConfig::default());
    }

    #[test]
    fn valid_strategy_config_passes() {
        let config = make_config(
            r#"
[strategy]
kind = mean_reversion
window = 20
entry_z = 2.0
exit_z = 0.5
stop_loss_z = 3.0
"#,
        );
        assert!(validate_strategy_config(&config).is_ok());
    }

    #[test]
    fn missing_kind_fails() {
        let config = make_config("[strategy]\nwindow = 20\n");
        let err = validate_strategy_config(&config).unwrap_err();
        assert!(matches!(err, QuantsimError::ConfigMissing { key, .. } if key == "kind"));
    }

    #[test]
    fn unknown_kind_fails() {
        let config = make_config("[strategy]\nkind = pairs\n");
        let err = validate_strategy_config(&config).unwrap_err();
        assert!(matches!(err, QuantsimError::ConfigInvalid { key, .. } if key == "kind"));
    }

    #[test]
    fn window_below_two_fails() {
        let config = make_config("[strategy]\nkind = mean_reversion\nwindow = 1\n");
        let err = validate_strategy_config(&config).unwrap_err();
        assert!(matches!(err, QuantsimError::ConfigInvalid { key, .. } if key == "window"));
    }

    #[test]
    fn negative_window_fails() {
        let config = make_config("[strategy]\nkind = mean_reversion\nwindow = -5\n");
        let err = validate_strategy_config(&config).unwrap_err();
        assert!(matches!(err, QuantsimError::ConfigInvalid { key, .. } if key == "window"));
    }

    #[test]
    fn stop_loss_must_exceed_entry() {
        let config = make_config("[strategy]\nkind = mean_reversion\nentry_z = 2\nstop_loss_z = 2\n");
        let err = validate_strategy_config(&config).unwrap_err();
        assert!(matches!(err, QuantsimError::ConfigInvalid { key, .. } if key == "stop_loss_z"));
    }

    #[test]
    fn entry_z_zero_fails() {
        let config = make_config("[strategy]\nkind = mean_reversion\nentry_z = 0\n");
        let err = validate_strategy_config(&config).unwrap_err();
        assert!(matches!(err, QuantsimError::ConfigInvalid { key, .. } if key == "entry_z"));
    }

    #[test]
    fn slow_ma_must_exceed_fast_ma() {
        let config = make_config("[strategy]\nkind = momentum\nfast_ma = 50\nslow_ma = 20\n");
        let err = validate_strategy_config(&config).unwrap_err();
        assert!(matches!(err, QuantsimError::ConfigInvalid { key, .. } if key == "slow_ma"));
    }

    #[test]
    fn exit_ma_zero_fails() {
        let config = make_config("[strategy]\nkind = momentum\nexit_ma = 0\n");
        let err = validate_strategy_config(&config).unwrap_err();
        assert!(matches!(err, QuantsimError::ConfigInvalid { key, .. } if key == "exit_ma"));
    }

    #[test]
    fn build_strategy_config_reads_momentum_params() {
        let config = make_config("[strategy]\nkind = momentum\nfast_ma = 5\nslow_ma = 15\n");
        let built = build_strategy_config(&config, StrategyKind::Momentum).unwrap();
        assert_eq!(
            built,
            StrategyConfig::Momentum(MomentumParams {
                fast_ma: 5,
                slow_ma: 15,
                exit_ma: 10,
            })
        );
    }

    #[test]
    fn build_strategy_config_kind_override() {
        // mean reversion keys are ignored when another kind is requested
        let config = make_config("[strategy]\nkind = mean_reversion\nwindow = 1\n");
        let built = build_strategy_config(&config, StrategyKind::BuyAndHold).unwrap();
        assert_eq!(built, StrategyConfig::BuyAndHold);
    }

    #[test]
    fn report_output_dir_optional() {
        let config = make_config("[report]\noutput_dir = out/run1\n");
        assert_eq!(report_output_dir(&config), Some(PathBuf::from("out/run1")));
        assert_eq!(report_output_dir(&make_config("")), None);
    }
}
