//! Core domain types and logic.

pub mod error;
pub mod price;
pub mod signal;
pub mod portfolio;
pub mod execution;
pub mod indicator;
pub mod strategy;
pub mod backtest;
pub mod metrics;
pub mod simulation;
pub mod config_validation;
