//! INI file configuration adapter.
//!
//! Serves the quantsim run file:
//!
//! ```ini
//! [backtest]  initial_capital, transaction_cost, slippage,
//!             liquidation_slippage, risk_free_rate
//! [data]      path
//! [strategy]  kind, window, entry_z, exit_z, stop_loss_z,
//!             fast_ma, slow_ma, exit_ma
//! [report]    output_dir
//! ```
//!
//! Section and key names are case-insensitive. String values may be wrapped
//! in matching single or double quotes, which are stripped (paths with
//! spaces).

use crate::domain::error::QuantsimError;
use crate::ports::config_port::ConfigPort;
use configparser::ini::Ini;
use std::path::Path;

#[derive(Debug)]
pub struct FileConfigAdapter {
    config: Ini,
}

impl FileConfigAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, QuantsimError> {
        let path = path.as_ref();
        let mut config = Ini::new();
        config
            .load(path)
            .map_err(|reason| QuantsimError::ConfigParse {
                file: path.display().to_string(),
                reason,
            })?;
        Ok(Self { config })
    }

    pub fn from_string(content: &str) -> Result<Self, QuantsimError> {
        let mut config = Ini::new();
        config
            .read(content.to_string())
            .map_err(|reason| QuantsimError::ConfigParse {
                file: "<string>".to_string(),
                reason,
            })?;
        Ok(Self { config })
    }

    fn unquote(value: String) -> String {
        let trimmed = value.trim();
        let quoted = trimmed.len() >= 2
            && ((trimmed.starts_with('"') && trimmed.ends_with('"'))
                || (trimmed.starts_with('\'') && trimmed.ends_with('\'')));
        if quoted {
            trimmed[1..trimmed.len() - 1].to_string()
        } else {
            value
        }
    }

    fn parse_bool(value: &str) -> Option<bool> {
        match value.trim().to_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Some(true),
            "false" | "no" | "off" | "0" => Some(false),
            _ => None,
        }
    }
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.config.get(section, key).map(Self::unquote)
    }

    fn get_int(&self, section: &str, key: &str, default: i64) -> i64 {
        self.config
            .getint(section, key)
            .ok()
            .flatten()
            .unwrap_or(default)
    }

    fn get_double(&self, section: &str, key: &str, default: f64) -> f64 {
        self.config
            .getfloat(section, key)
            .ok()
            .flatten()
            .unwrap_or(default)
    }

    fn get_bool(&self, section: &str, key: &str, default: bool) -> bool {
        self.config
            .get(section, key)
            .as_ref()
            .and_then(|v| Self::parse_bool(v))
            .unwrap_or(default)
    }
}
