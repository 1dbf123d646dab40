//! CLI definition and dispatch.

use clap::{Args, Parser, Subcommand};
use log::warn;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::csv_report_adapter::CsvReportAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::backtest::{self as backtest_engine, BacktestConfig, BacktestResult};
use crate::domain::config_validation::{
    build_backtest_config, build_strategy_config, data_path, report_output_dir, strategy_kind,
    validate_backtest_config, validate_backtest_params, validate_strategy_config,
};
use crate::domain::error::QuantsimError;
use crate::domain::metrics::Metrics;
use crate::domain::price::{simple_returns, PriceSeries};
use crate::domain::simulation::{
    half_life, simulate_gbm, simulate_ou, simulate_regime_switching, GbmParams, OuParams,
    Process, RegimeParams, SyntheticSeries,
};
use crate::domain::strategy::StrategyKind;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(
    name = "quantsim",
    about = "Single-asset backtester and synthetic market simulator"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a backtest
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        /// Price CSV, overriding [data] path
        #[arg(short, long)]
        data: Option<PathBuf>,
        /// Strategy kind, overriding [strategy] kind
        #[arg(short, long)]
        strategy: Option<StrategyKind>,
        /// Report directory, overriding [report] output_dir
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Run every strategy kind on the same series
        #[arg(long)]
        compare: bool,
    },
    /// Generate a synthetic price series
    Simulate {
        #[command(subcommand)]
        process: SimulateCommand,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

#[derive(Subcommand, Debug)]
pub enum SimulateCommand {
    /// Geometric Brownian motion
    Gbm {
        #[arg(long, default_value_t = 0.05)]
        mu: f64,
        #[arg(long, default_value_t = 0.2)]
        sigma: f64,
        #[arg(long, default_value_t = 100.0)]
        start_price: f64,
        #[command(flatten)]
        common: SimulationArgs,
    },
    /// Ornstein-Uhlenbeck mean reversion on log prices
    Ou {
        #[arg(long, default_value_t = 0.1)]
        theta: f64,
        #[arg(long, default_value_t = 0.1)]
        sigma: f64,
        #[arg(long, default_value_t = 4.605)]
        mean_level: f64,
        #[command(flatten)]
        common: SimulationArgs,
    },
    /// Two-state trending / range-bound Markov regime switching
    Regime {
        #[arg(long, default_value_t = 0.06)]
        trend_mu: f64,
        #[arg(long, default_value_t = 0.18)]
        trend_sigma: f64,
        #[arg(long, default_value_t = 0.08)]
        ou_theta: f64,
        #[arg(long, default_value_t = 0.12)]
        ou_sigma: f64,
        #[arg(long, default_value_t = 0.03)]
        p_trend_to_range: f64,
        #[arg(long, default_value_t = 0.05)]
        p_range_to_trend: f64,
        #[arg(long, default_value_t = 100.0)]
        start_price: f64,
        #[command(flatten)]
        common: SimulationArgs,
    },
}

#[derive(Args, Debug)]
pub struct SimulationArgs {
    #[arg(long, default_value_t = 15.0)]
    pub years: f64,
    #[arg(long, default_value_t = 42)]
    pub seed: u64,
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Backtest {
            config,
            data,
            strategy,
            output,
            compare,
        } => run_backtest(
            &config,
            data.as_deref(),
            strategy,
            output.as_deref(),
            compare,
        ),
        Command::Simulate { process } => run_simulate(process),
        Command::Validate { config } => run_validate(&config),
    }
}

fn fail(err: &QuantsimError) -> ExitCode {
    eprintln!("error: {err}");
    err.into()
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| fail(&e))
}

fn run_backtest(
    config_path: &Path,
    data_override: Option<&Path>,
    kind_override: Option<StrategyKind>,
    output_override: Option<&Path>,
    compare: bool,
) -> ExitCode {
    // Stage 1: Load config
    eprintln!("Loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    // Stage 2: Validate and build the backtest config
    let validated = if data_override.is_some() {
        validate_backtest_params(&adapter)
    } else {
        validate_backtest_config(&adapter)
    };
    if let Err(e) = validated {
        return fail(&e);
    }
    let bt_config = match build_backtest_config(&adapter) {
        Ok(c) => c,
        Err(e) => return fail(&e),
    };

    // Stage 3: Resolve which strategies to run
    let kinds: Vec<StrategyKind> = if compare {
        StrategyKind::ALL.to_vec()
    } else {
        match kind_override.map_or_else(|| strategy_kind(&adapter), Ok) {
            Ok(kind) => vec![kind],
            Err(e) => return fail(&e),
        }
    };

    // Stage 4: Resolve data source
    let data_file = match data_override {
        Some(p) => p.to_path_buf(),
        None => match data_path(&adapter) {
            Ok(p) => p,
            Err(e) => return fail(&e),
        },
    };
    let (data_dir, series_name) = split_data_path(&data_file);
    let data_port = CsvAdapter::new(data_dir);

    let output = output_override
        .map(Path::to_path_buf)
        .or_else(|| report_output_dir(&adapter));

    run_backtest_pipeline(
        &data_port,
        &series_name,
        &adapter,
        &kinds,
        &bt_config,
        output.as_deref(),
    )
}

fn split_data_path(path: &Path) -> (PathBuf, String) {
    let dir = path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    (dir, name)
}

pub fn run_backtest_pipeline(
    data_port: &dyn DataPort,
    series_name: &str,
    config: &dyn ConfigPort,
    kinds: &[StrategyKind],
    bt_config: &BacktestConfig,
    output: Option<&Path>,
) -> ExitCode {
    // Stage 5: Load prices
    let series = match data_port.fetch_prices(series_name) {
        Ok(s) => s,
        Err(e) => return fail(&e),
    };

    // Stage 6: Run each strategy
    let mut runs: Vec<(StrategyKind, BacktestResult, Metrics)> = Vec::with_capacity(kinds.len());
    for &kind in kinds {
        let strategy_config = match build_strategy_config(config, kind) {
            Ok(c) => c,
            Err(e) => return fail(&e),
        };
        let mut strategy = strategy_config.build();
        let result = backtest_engine::run_backtest(strategy.as_mut(), &series, bt_config);
        let metrics = Metrics::compute(&result.portfolio, bt_config.risk_free_rate);
        runs.push((kind, result, metrics));
    }

    // Stage 7: Print console summary to stderr
    if runs.len() == 1 {
        let (_, result, metrics) = &runs[0];
        print_summary(result, metrics, bt_config);
    } else {
        print_comparison(&runs, &series);
    }

    // Stage 8: Write reports
    if let Some(dir) = output {
        let reporter = CsvReportAdapter::new();
        let multiple = runs.len() > 1;
        for (kind, result, metrics) in &runs {
            let target = if multiple {
                dir.join(kind.as_str())
            } else {
                dir.to_path_buf()
            };
            if let Err(e) = reporter.write(result, metrics, &target) {
                return fail(&e);
            }
            eprintln!("Report written to: {}", target.display());
        }
    }

    ExitCode::SUCCESS
}

fn print_summary(result: &BacktestResult, metrics: &Metrics, bt_config: &BacktestConfig) {
    eprintln!("\n=== {} Results ===", result.strategy_name);
    eprintln!("Bars:             {}", result.bars);
    eprintln!("Initial Capital:  ${:.2}", bt_config.initial_capital);
    eprintln!("Final Equity:     ${:.2}", metrics.final_equity);
    eprintln!("Total Return:     {:.2}%", metrics.total_return * 100.0);
    eprintln!(
        "Annualized:       {:.2}%",
        metrics.annualized_return * 100.0
    );
    eprintln!(
        "Volatility:       {:.2}%",
        metrics.annualized_volatility * 100.0
    );
    eprintln!("Sharpe Ratio:     {:.2}", metrics.sharpe_ratio);
    eprintln!("Max Drawdown:     {:.2}%", metrics.max_drawdown * 100.0);
    eprintln!("Calmar Ratio:     {:.2}", metrics.calmar_ratio);
    eprintln!("Total Trades:     {}", metrics.total_trades);
    eprintln!("Win Rate:         {:.1}%", metrics.win_rate * 100.0);
    eprintln!(
        "Signals:          {} buy, {} sell, {} hold",
        result.signals.buy, result.signals.sell, result.signals.hold
    );
    if result.skipped_buys > 0 {
        warn!(
            "{} buy signals could not be filled for lack of cash",
            result.skipped_buys
        );
    }
}

fn print_comparison(runs: &[(StrategyKind, BacktestResult, Metrics)], series: &PriceSeries) {
    eprintln!("\n=== Strategy Comparison ({} bars) ===", series.len());
    eprintln!(
        "{:<16} {:>10} {:>10} {:>8} {:>10} {:>8} {:>8}",
        "Strategy", "Return", "Annual", "Sharpe", "MaxDD", "Trades", "WinRate"
    );
    for (_, result, m) in runs {
        eprintln!(
            "{:<16} {:>9.2}% {:>9.2}% {:>8.2} {:>9.2}% {:>8} {:>7.1}%",
            result.strategy_name,
            m.total_return * 100.0,
            m.annualized_return * 100.0,
            m.sharpe_ratio,
            m.max_drawdown * 100.0,
            m.total_trades,
            m.win_rate * 100.0,
        );
    }
}

fn default_output(process: Process) -> PathBuf {
    match process {
        Process::Gbm => PathBuf::from("data/synthetic/gbm/gbm_data.csv"),
        Process::OrnsteinUhlenbeck => PathBuf::from("data/synthetic/ou/ou_data.csv"),
        Process::RegimeSwitching => {
            PathBuf::from("data/synthetic/markov_regime/regime_data.csv")
        }
    }
}

fn run_simulate(command: SimulateCommand) -> ExitCode {
    let (series, common, ou_theta) = match command {
        SimulateCommand::Gbm {
            mu,
            sigma,
            start_price,
            common,
        } => {
            let params = GbmParams {
                mu,
                sigma,
                years: common.years,
                start_price,
            };
            if let Err(e) = params.validate() {
                return fail(&e);
            }
            let mut rng = StdRng::seed_from_u64(common.seed);
            (simulate_gbm(&params, &mut rng), common, None)
        }
        SimulateCommand::Ou {
            theta,
            sigma,
            mean_level,
            common,
        } => {
            let params = OuParams {
                theta,
                sigma,
                mean_level,
                years: common.years,
            };
            if let Err(e) = params.validate() {
                return fail(&e);
            }
            let mut rng = StdRng::seed_from_u64(common.seed);
            (simulate_ou(&params, &mut rng), common, Some(theta))
        }
        SimulateCommand::Regime {
            trend_mu,
            trend_sigma,
            ou_theta,
            ou_sigma,
            p_trend_to_range,
            p_range_to_trend,
            start_price,
            common,
        } => {
            let params = RegimeParams {
                trend_mu,
                trend_sigma,
                ou_theta,
                ou_sigma,
                p_trend_to_range,
                p_range_to_trend,
                years: common.years,
                start_price,
            };
            if let Err(e) = params.validate() {
                return fail(&e);
            }
            let mut rng = StdRng::seed_from_u64(common.seed);
            (simulate_regime_switching(&params, &mut rng), common, None)
        }
    };

    let output = common
        .output
        .unwrap_or_else(|| default_output(series.process));
    if let Err(e) = CsvAdapter::write_synthetic(&output, &series) {
        return fail(&e);
    }

    print_simulation_summary(&series, &output, ou_theta);
    ExitCode::SUCCESS
}

fn print_simulation_summary(series: &SyntheticSeries, output: &Path, ou_theta: Option<f64>) {
    eprintln!("Generated {} data: {} bars", series.process, series.len());
    eprintln!("Saved to: {}", output.display());

    if series.process == Process::RegimeSwitching && !series.is_empty() {
        let (trending, ranging) = series.regime_counts();
        let n = series.len() as f64;
        eprintln!("\nRegime distribution:");
        eprintln!(
            "  Trending days:    {} ({:.1}%)",
            trending,
            trending as f64 / n * 100.0
        );
        eprintln!(
            "  Range-bound days: {} ({:.1}%)",
            ranging,
            ranging as f64 / n * 100.0
        );
    }
    if let Some(theta) = ou_theta {
        eprintln!("Half-life: {:.2} years", half_life(theta));
    }

    let returns: Vec<f64> = simple_returns(&series.closes())
        .into_iter()
        .flatten()
        .collect();
    eprintln!("\nSummary statistics:");
    if let Some(last) = series.bars.last() {
        eprintln!("  Final price: ${:.2}", last.close);
    }
    if !returns.is_empty() {
        let mean = returns.iter().sum::<f64>() / returns.len() as f64;
        eprintln!("  Mean daily return: {:.4}%", mean * 100.0);
    }
}

fn run_validate(config_path: &Path) -> ExitCode {
    eprintln!("Validating config: {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    if let Err(e) = validate_backtest_config(&adapter) {
        return fail(&e);
    }
    if let Err(e) = validate_strategy_config(&adapter) {
        return fail(&e);
    }

    // both validated above
    if let (Ok(bt), Ok(kind)) = (build_backtest_config(&adapter), strategy_kind(&adapter)) {
        eprintln!("\nBacktest:");
        eprintln!("  initial_capital:  {}", bt.initial_capital);
        eprintln!("  transaction_cost: {}", bt.execution.transaction_cost);
        eprintln!("  slippage:         {}", bt.execution.slippage);
        eprintln!("  risk_free_rate:   {}", bt.risk_free_rate);
        if let Ok(strategy) = build_strategy_config(&adapter, kind) {
            eprintln!("\nStrategy: {kind}");
            eprintln!("  {strategy:?}");
        }
    }

    eprintln!("\nConfiguration is valid.");
    ExitCode::SUCCESS
}
