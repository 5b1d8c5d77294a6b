//! # Cycle Math
//!
//! Numerical building blocks for macroeconomic time series analysis.
//! This crate provides descriptive statistics, rolling windows, z-score
//! normalisation, least-squares solvers and smoothing weights used by the
//! forecasting and business-cycle crates.

use thiserror::Error;

pub mod regression;
pub mod smoothing;
pub mod statistics;

/// Errors that can occur in numerical calculations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MathError {
    #[error("Insufficient data for calculation: {0}")]
    InsufficientData(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Calculation error: {0}")]
    CalculationError(String),
}

/// Result type for numerical operations
pub type Result<T> = std::result::Result<T, MathError>;

/// Tolerance below which a variance or pivot is treated as zero
pub const EPSILON: f64 = 1e-12;
