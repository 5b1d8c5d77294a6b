//! # macro_cycle workspace
//!
//! Umbrella crate for the workspace members:
//!
//! - [`cycle_math`]: statistics, ridge regression and smoothing primitives
//! - [`macro_cycle`]: alignment, forecasting, composite indices and cycle
//!   phase classification
//!
//! ## Example
//!
//! ```
//! use macro_cycle_workspace::macro_cycle::{CycleLabel, FORECAST_HORIZON};
//!
//! assert_eq!(FORECAST_HORIZON, 12);
//! assert_eq!(CycleLabel::Trough.next(), CycleLabel::Expansion);
//! ```

pub use cycle_math;
pub use macro_cycle;
