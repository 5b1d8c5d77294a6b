//! # Macro Cycle
//!
//! Forecasting of macroeconomic indicators and business-cycle phase
//! classification.
//!
//! ## Features
//!
//! - Series alignment onto monthly or quarterly grids, with interpolation of internal gaps
//! - Lag, rolling-window and seasonal feature construction
//! - Candidate models (ridge regression, tree ensemble, exponential smoothing)
//!   selected on a chronological holdout
//! - Recursive 12-period forecasts
//! - Leading, coincident and lagging composite indexes
//! - Turning-point detection and phase classification with a confidence score
//!
//! The two branches (forecasts and composite/cycle) run independently over a
//! [`SeriesSource`]; results and isolated failures go to a [`ReportSink`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use chrono::NaiveDate;
//! use macro_cycle::{AnalysisConfig, AnalysisRequest, CollectingSink, CsvDirectorySource, CycleAnalyzer};
//!
//! # fn main() -> macro_cycle::Result<()> {
//! let source = CsvDirectorySource::new("data");
//! let analyzer = CycleAnalyzer::new(AnalysisConfig::default(), source)?;
//!
//! let start = NaiveDate::from_ymd_opt(2000, 1, 1).unwrap();
//! let end = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();
//! let request = AnalysisRequest::new(["UNRATE", "CPIAUCSL"], start, end);
//!
//! let mut sink = CollectingSink::new();
//! let summary = analyzer.run(&request, &mut sink)?;
//! println!("{:?}: {} series forecast", summary.status, summary.completed_series.len());
//! # Ok(())
//! # }
//! ```

pub mod align;
pub mod composite;
pub mod config;
pub mod cycle;
pub mod data;
pub mod error;
pub mod features;
pub mod forecast;
pub mod metrics;
pub mod models;
pub mod pipeline;
pub mod report;
pub mod selection;
pub mod source;
pub mod utils;

// Re-export commonly used types
pub use crate::align::SeriesAligner;
pub use crate::composite::{
    CompositeIndex, CompositeIndexBuilder, Constituent, IndexKind, Polarity,
};
pub use crate::config::AnalysisConfig;
pub use crate::cycle::{CycleLabel, CyclePhase, CyclePhaseClassifier, CycleSummary, TurningPoint};
pub use crate::data::{AlignedSeries, Frequency, Series, TimePoint};
pub use crate::error::{ErrorKind, MacroError, Result};
pub use crate::features::{FeatureEngineer, FeatureMatrix, FeatureRow};
pub use crate::forecast::{ForecastGenerator, ForecastResult, FORECAST_HORIZON};
pub use crate::metrics::EvaluationScore;
pub use crate::models::{ModelCandidate, ModelSpec, TrainedForecastModel};
pub use crate::pipeline::{AnalysisRequest, CycleAnalyzer, RunStatus, RunSummary};
pub use crate::report::{
    CollectingSink, CycleReport, FailureReport, JsonLinesSink, ReportSink, SeriesReport,
};
pub use crate::selection::{ModelSelection, ModelSelector};
pub use crate::source::{
    CachingSource, CsvDirectorySource, InMemorySource, SeriesSource, SourceError,
};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
