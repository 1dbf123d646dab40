//! CSV file data adapter.
//!
//! Reads closing-price files and persists generated synthetic series.

use crate::domain::error::QuantsimError;
use crate::domain::price::{log_returns, simple_returns, PriceBar, PriceSeries, Timestamp};
use crate::domain::simulation::SyntheticSeries;
use crate::ports::data_port::DataPort;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use log::{debug, info, warn};
use std::fs;
use std::path::{Path, PathBuf};

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    /// `<base>/<name>.csv`, or `<base>/<name>` when the name already has an
    /// extension. Absolute names are used as-is.
    fn csv_path(&self, name: &str) -> PathBuf {
        if Path::new(name).extension().is_some() {
            self.base_path.join(name)
        } else {
            self.base_path.join(format!("{}.csv", name))
        }
    }

    /// Load a price file from an explicit path.
    pub fn load_prices(path: &Path) -> Result<PriceSeries, QuantsimError> {
        let content = fs::read_to_string(path)?;
        let series = parse_prices(&content, &path.display().to_string())?;
        info!("Loaded {} bars from {}", series.len(), path.display());
        Ok(series)
    }

    /// Write `close, returns, log_returns` plus `log_price` and `regime` when
    /// the process produced them. Parent directories are created.
    pub fn write_synthetic(path: &Path, series: &SyntheticSeries) -> Result<(), QuantsimError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let has_log_price = series.bars.iter().any(|b| b.log_price.is_some());
        let has_regime = series.bars.iter().any(|b| b.regime.is_some());

        let closes = series.closes();
        let returns = simple_returns(&closes);
        let logs = log_returns(&closes);

        let mut header = vec!["close", "returns", "log_returns"];
        if has_log_price {
            header.push("log_price");
        }
        if has_regime {
            header.push("regime");
        }

        let mut wtr = csv::Writer::from_path(path)?;
        wtr.write_record(&header)?;
        for (i, bar) in series.bars.iter().enumerate() {
            let mut row = vec![
                bar.close.to_string(),
                optional(returns[i]),
                optional(logs[i]),
            ];
            if has_log_price {
                row.push(optional(bar.log_price));
            }
            if has_regime {
                row.push(bar.regime.map(|r| r.code().to_string()).unwrap_or_default());
            }
            wtr.write_record(&row)?;
        }
        wtr.flush()?;

        debug!("Wrote {} synthetic bars to {}", series.len(), path.display());
        Ok(())
    }
}

fn optional(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Parse CSV text with a case-insensitive `close` column and an optional
/// `date` / `timestamp` column.
pub fn parse_prices(content: &str, source_name: &str) -> Result<PriceSeries, QuantsimError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let headers = rdr.headers()?.clone();
    let find = |name: &str| headers.iter().position(|h| h.eq_ignore_ascii_case(name));

    let close_col = find("close").ok_or_else(|| QuantsimError::MissingColumn {
        column: "close".into(),
    })?;
    let date_col = find("date").or_else(|| find("timestamp"));

    let mut closes = Vec::new();
    let mut raw_dates = Vec::new();
    for (row, result) in rdr.records().enumerate() {
        let record = result?;

        let close_str = record.get(close_col).unwrap_or("");
        let close: f64 = close_str.parse().map_err(|e| QuantsimError::DataParse {
            row,
            reason: format!("invalid close value '{}': {}", close_str, e),
        })?;
        closes.push(close);

        if let Some(col) = date_col {
            raw_dates.push(record.get(col).unwrap_or("").to_string());
        }
    }

    if closes.is_empty() {
        return Err(QuantsimError::NoData {
            source_name: source_name.to_string(),
        });
    }

    let timestamps = match date_col {
        Some(_) => resolve_timestamps(&raw_dates, source_name),
        None => (0..closes.len()).map(Timestamp::Index).collect(),
    };

    let bars = timestamps
        .into_iter()
        .zip(closes)
        .map(|(timestamp, close)| PriceBar { timestamp, close })
        .collect();
    PriceSeries::new(bars)
}

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

const OFFSET_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%:z", "%Y-%m-%d %H:%M:%S%z"];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d.%m.%Y"];

/// Date, date-time, or date-time with a UTC offset (kept as local time).
fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.naive_local());
    }
    for fmt in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(value, fmt) {
            return Some(dt.naive_local());
        }
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, fmt) {
            return Some(dt);
        }
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
        .map(|d| d.and_time(NaiveTime::MIN))
}

/// One variant for the whole file: dates when every time is midnight,
/// date-times otherwise, row indices if any value does not parse.
fn resolve_timestamps(raw: &[String], source_name: &str) -> Vec<Timestamp> {
    let parsed: Option<Vec<NaiveDateTime>> = raw.iter().map(|v| parse_timestamp(v)).collect();
    match parsed {
        Some(values) => {
            if values.iter().all(|dt| dt.time() == NaiveTime::MIN) {
                values.iter().map(|dt| Timestamp::Date(dt.date())).collect()
            } else {
                values.into_iter().map(Timestamp::DateTime).collect()
            }
        }
        None => {
            warn!(
                "{}: unrecognized date values, indexing bars by row",
                source_name
            );
            (0..raw.len()).map(Timestamp::Index).collect()
        }
    }
}

impl DataPort for CsvAdapter {
    fn fetch_prices(&self, name: &str) -> Result<PriceSeries, QuantsimError> {
        Self::load_prices(&self.csv_path(name))
    }

    fn list_series(&self) -> Result<Vec<String>, QuantsimError> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.base_path)? {
            let path = entry?.path();
            let is_csv = path
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
            if is_csv {
                if let Some(stem) = path.file_stem() {
                    names.push(stem.to_string_lossy().into_owned());
                }
            }
        }
        names.sort();
        Ok(names)
    }
}
