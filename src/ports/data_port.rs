//! Price data access port trait.

use crate::domain::error::QuantsimError;
use crate::domain::price::PriceSeries;

pub trait DataPort {
    /// Load the named series. Malformed or missing data is an error, never
    /// an empty series.
    fn fetch_prices(&self, name: &str) -> Result<PriceSeries, QuantsimError>;

    fn list_series(&self) -> Result<Vec<String>, QuantsimError>;
}
