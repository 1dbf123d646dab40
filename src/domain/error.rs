//! Domain error types.
//!
//! The replay loop never fails; these are raised at the edges (config
//! loading, price loading, series construction).

/// Top-level error type for quantsim.
#[derive(Debug, thiserror::Error)]
pub enum QuantsimError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("price data must contain a '{column}' column")]
    MissingColumn { column: String },

    #[error("invalid price data at row {row}: {reason}")]
    DataParse { row: usize, reason: String },

    #[error("no price data in {source_name}")]
    NoData { source_name: String },

    #[error("invalid close price {price} at bar {index}")]
    InvalidPrice { index: usize, price: f64 },

    #[error("timestamps not strictly increasing at bar {index}")]
    UnorderedTimestamps { index: usize },

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl QuantsimError {
    pub(crate) fn invalid(section: &str, key: &str, reason: impl Into<String>) -> Self {
        QuantsimError::ConfigInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<&QuantsimError> for std::process::ExitCode {
    fn from(err: &QuantsimError) -> Self {
        let code: u8 = match err {
            QuantsimError::Io(_) | QuantsimError::Csv(_) => 1,
            QuantsimError::ConfigParse { .. }
            | QuantsimError::ConfigMissing { .. }
            | QuantsimError::ConfigInvalid { .. } => 2,
            QuantsimError::MissingColumn { .. }
            | QuantsimError::DataParse { .. }
            | QuantsimError::NoData { .. }
            | QuantsimError::InvalidPrice { .. }
            | QuantsimError::UnorderedTimestamps { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_column_message() {
        let err = QuantsimError::MissingColumn {
            column: "close".into(),
        };
        assert_eq!(
            err.to_string(),
            "price data must contain a 'close' column"
        );
    }

    #[test]
    fn config_invalid_helper() {
        let err = QuantsimError::invalid("backtest", "slippage", "must be non-negative");
        assert_eq!(
            err.to_string(),
            "invalid config value [backtest] slippage: must be non-negative"
        );
    }

    #[test]
    fn io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: QuantsimError = io.into();
        assert!(matches!(err, QuantsimError::Io(_)));
    }
}
