//! CSV report adapter implementing ReportPort.
//!
//! Writes `trades.csv`, `equity_curve.csv` and `metrics.csv` into the output
//! directory, creating it if needed.

use std::fs;
use std::path::Path;

use log::info;

use crate::domain::backtest::BacktestResult;
use crate::domain::error::QuantsimError;
use crate::domain::metrics::Metrics;
use crate::domain::portfolio::{EquityPoint, Trade};
use crate::ports::report_port::ReportPort;

pub const TRADES_FILE: &str = "trades.csv";
pub const EQUITY_CURVE_FILE: &str = "equity_curve.csv";
pub const METRICS_FILE: &str = "metrics.csv";

#[derive(Debug, Default)]
pub struct CsvReportAdapter;

impl CsvReportAdapter {
    pub fn new() -> Self {
        Self
    }
}

fn write_trades(path: &Path, trades: &[Trade]) -> Result<(), QuantsimError> {
    let mut wtr = csv::Writer::from_path(path)?;
    wtr.write_record(["timestamp", "kind", "price", "shares", "cost"])?;
    for t in trades {
        wtr.write_record([
            t.timestamp.to_string(),
            t.kind.to_string(),
            t.price.to_string(),
            t.shares.to_string(),
            t.cost.to_string(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

fn write_equity_curve(path: &Path, curve: &[EquityPoint]) -> Result<(), QuantsimError> {
    let mut wtr = csv::Writer::from_path(path)?;
    wtr.write_record(["timestamp", "equity", "cash", "position", "price"])?;
    for p in curve {
        wtr.write_record([
            p.timestamp.to_string(),
            p.equity.to_string(),
            p.cash.to_string(),
            p.position.to_string(),
            p.price.to_string(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

fn metric_rows(result: &BacktestResult, metrics: &Metrics) -> Vec<(&'static str, String)> {
    vec![
        ("strategy", result.strategy_name.clone()),
        ("bars", result.bars.to_string()),
        ("total_return", metrics.total_return.to_string()),
        ("annualized_return", metrics.annualized_return.to_string()),
        ("annualized_volatility", metrics.annualized_volatility.to_string()),
        ("sharpe_ratio", metrics.sharpe_ratio.to_string()),
        ("max_drawdown", metrics.max_drawdown.to_string()),
        ("calmar_ratio", metrics.calmar_ratio.to_string()),
        ("win_rate", metrics.win_rate.to_string()),
        ("total_trades", metrics.total_trades.to_string()),
        ("final_equity", metrics.final_equity.to_string()),
        ("skipped_buys", result.skipped_buys.to_string()),
    ]
}

fn write_metrics(path: &Path, rows: &[(&str, String)]) -> Result<(), QuantsimError> {
    let mut wtr = csv::Writer::from_path(path)?;
    wtr.write_record(["metric", "value"])?;
    for (name, value) in rows {
        wtr.write_record([*name, value.as_str()])?;
    }
    wtr.flush()?;
    Ok(())
}

impl ReportPort for CsvReportAdapter {
    fn write(
        &self,
        result: &BacktestResult,
        metrics: &Metrics,
        output: &Path,
    ) -> Result<(), QuantsimError> {
        fs::create_dir_all(output)?;

        let portfolio = &result.portfolio;
        write_trades(&output.join(TRADES_FILE), portfolio.trades())?;
        write_equity_curve(&output.join(EQUITY_CURVE_FILE), portfolio.equity_curve())?;
        write_metrics(&output.join(METRICS_FILE), &metric_rows(result, metrics))?;

        info!("Report written to {}", output.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::backtest::{run_backtest, BacktestConfig};
    use crate::domain::execution::ExecutionConfig;
    use crate::domain::price::PriceSeries;
    use crate::domain::strategy::BuyAndHold;
    use tempfile::TempDir;

    fn sample_result() -> (BacktestResult, Metrics) {
        let series = PriceSeries::from_closes(&[100.0, 105.0, 110.0]).unwrap();
        let config = BacktestConfig {
            initial_capital: 1_000.0,
            execution: ExecutionConfig::frictionless(),
            risk_free_rate: 0.0,
        };
        let result = run_backtest(&mut BuyAndHold::new(), &series, &config);
        let metrics = Metrics::compute(&result.portfolio, config.risk_free_rate);
        (result, metrics)
    }

    #[test]
    fn writes_all_three_files() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("report");
        let (result, metrics) = sample_result();

        CsvReportAdapter::new().write(&result, &metrics, &out).unwrap();

        assert!(out.join(TRADES_FILE).exists());
        assert!(out.join(EQUITY_CURVE_FILE).exists());
        assert!(out.join(METRICS_FILE).exists());
    }

    #[test]
    fn trades_file_has_one_row_per_trade() {
        let dir = TempDir::new().unwrap();
        let (result, metrics) = sample_result();
        CsvReportAdapter::new()
            .write(&result, &metrics, dir.path())
            .unwrap();

        let content = fs::read_to_string(dir.path().join(TRADES_FILE)).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "timestamp,kind,price,shares,cost");
        assert_eq!(lines.len(), 1 + result.portfolio.trades().len());
        assert!(lines[1].starts_with("0,BUY,100,10,"));
        assert!(lines[2].starts_with("2,SELL,110,10,"));
    }

    #[test]
    fn equity_curve_file_has_one_row_per_bar() {
        let dir = TempDir::new().unwrap();
        let (result, metrics) = sample_result();
        CsvReportAdapter::new()
            .write(&result, &metrics, dir.path())
            .unwrap();

        let content = fs::read_to_string(dir.path().join(EQUITY_CURVE_FILE)).unwrap();
        assert_eq!(content.lines().count(), 1 + result.bars);
    }

    #[test]
    fn metrics_file_lists_named_values() {
        let dir = TempDir::new().unwrap();
        let (result, metrics) = sample_result();
        CsvReportAdapter::new()
            .write(&result, &metrics, dir.path())
            .unwrap();

        let content = fs::read_to_string(dir.path().join(METRICS_FILE)).unwrap();
        assert!(content.starts_with("metric,value\n"));
        assert!(content.contains("strategy,BuyAndHold\n"));
        assert!(content.contains("total_trades,2\n"));
        assert!(content.contains("final_equity,1100\n"));
    }
}
