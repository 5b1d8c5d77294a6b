//! Run orchestration
//!
//! One run drives two independent branches over the same Series Source: a
//! forecast pipeline per target series, and the composite/cycle pipeline.
//! Failures are isolated per series and per index and every one of them is
//! passed to the Report Sink.

use crate::align::SeriesAligner;
use crate::composite::{CompositeIndex, CompositeIndexBuilder, IndexKind};
use crate::config::{AlignmentConfig, AnalysisConfig};
use crate::cycle::CyclePhaseClassifier;
use crate::data::{AlignedSeries, Frequency};
use crate::error::{MacroError, Result};
use crate::features::FeatureEngineer;
use crate::forecast::ForecastGenerator;
use crate::report::{CycleReport, FailureReport, ReportSink, SeriesReport};
use crate::selection::ModelSelector;
use crate::source::{SeriesSource, SourceError};
use chrono::NaiveDate;
use rayon::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{info, warn};

/// Series to forecast and the observation window to use
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisRequest {
    pub targets: Vec<String>,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl AnalysisRequest {
    pub fn new<I, T>(targets: I, start: NaiveDate, end: NaiveDate) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            targets: targets.into_iter().map(Into::into).collect(),
            start,
            end,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RunStatus {
    /// Every series and index completed
    Complete,
    /// At least one branch completed but something failed
    Partial,
    /// Neither branch completed
    Failed,
}

/// Outcome of a run, mirroring what was sent to the sink
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub status: RunStatus,
    /// Target series whose forecast completed, in request order
    pub completed_series: Vec<String>,
    pub failures: Vec<FailureReport>,
    pub cycle_completed: bool,
}

struct CycleOutcome {
    report: Option<CycleReport>,
    failures: Vec<FailureReport>,
}

/// Forecasting and business-cycle analysis over one Series Source
#[derive(Debug)]
pub struct CycleAnalyzer<S> {
    source: S,
    parallel: bool,
    aligner: SeriesAligner,
    alignment: AlignmentConfig,
    engineer: FeatureEngineer,
    selector: ModelSelector,
    generator: ForecastGenerator,
    builder: CompositeIndexBuilder,
    classifier: CyclePhaseClassifier,
}

impl<S: SeriesSource> CycleAnalyzer<S> {
    /// Validate `config` and assemble the components
    pub fn new(config: AnalysisConfig, source: S) -> Result<Self> {
        config.validate()?;
        let engineer = FeatureEngineer::new(config.features.clone())?;
        Ok(Self {
            source,
            parallel: config.parallel,
            aligner: SeriesAligner::from_config(&config.alignment),
            builder: CompositeIndexBuilder::new(
                config.composite.clone(),
                config.alignment.min_history,
            ),
            alignment: config.alignment,
            generator: ForecastGenerator::new(engineer.clone()),
            engineer,
            selector: ModelSelector::new(config.selection)?,
            classifier: CyclePhaseClassifier::new(config.cycle)?,
        })
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Execute both branches and report every result and failure to `sink`.
    ///
    /// Reports are emitted in a fixed order (series in request order, then
    /// composite failures, then the cycle report), independent of scheduling.
    /// Only a failing sink aborts the run.
    pub fn run(&self, request: &AnalysisRequest, sink: &mut dyn ReportSink) -> Result<RunSummary> {
        if request.start > request.end {
            return Err(MacroError::InvalidParameter(format!(
                "Start date {} is after end date {}",
                request.start, request.end
            )));
        }
        info!(
            targets = request.targets.len(),
            start = %request.start,
            end = %request.end,
            parallel = self.parallel,
            "starting analysis run"
        );

        let (forecasts, cycle) = if self.parallel {
            rayon::join(
                || self.forecast_branch(request),
                || self.cycle_branch(request.start, request.end),
            )
        } else {
            (
                self.forecast_branch(request),
                self.cycle_branch(request.start, request.end),
            )
        };

        let mut completed_series = Vec::new();
        let mut failures = Vec::new();
        for (name, outcome) in forecasts {
            match outcome {
                Ok(report) => {
                    sink.series_report(&report)?;
                    completed_series.push(name);
                }
                Err(e) => {
                    warn!(series = %name, error = %e, "series pipeline failed");
                    let failure = FailureReport::new(name, &e);
                    sink.failure(&failure)?;
                    failures.push(failure);
                }
            }
        }

        for failure in cycle.failures {
            sink.failure(&failure)?;
            failures.push(failure);
        }
        let cycle_completed = match &cycle.report {
            Some(report) => {
                sink.cycle_report(report)?;
                true
            }
            None => false,
        };

        let status = if failures.is_empty() && cycle_completed {
            RunStatus::Complete
        } else if cycle_completed || !completed_series.is_empty() {
            RunStatus::Partial
        } else {
            RunStatus::Failed
        };
        info!(
            status = ?status,
            completed = completed_series.len(),
            failures = failures.len(),
            "analysis run finished"
        );

        Ok(RunSummary {
            status,
            completed_series,
            failures,
            cycle_completed,
        })
    }

    /// Fetch and align one series.
    ///
    /// Without an explicit `frequency` the configured override applies, then
    /// the native frequency the source reports for the series.
    pub fn aligned(
        &self,
        name: &str,
        frequency: Option<Frequency>,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<AlignedSeries> {
        let raw = self
            .source
            .fetch(name, start, end)
            .map_err(|source| MacroError::Source {
                series: name.to_string(),
                source,
            })?;
        let frequency =
            frequency.unwrap_or_else(|| self.alignment.frequency_for(name, raw.frequency));
        self.aligner.align(&raw, frequency, start, end)
    }

    /// Full forecast pipeline for one target series
    pub fn forecast_series(
        &self,
        name: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<SeriesReport> {
        let series = self.aligned(name, None, start, end)?;
        let matrix = self.engineer.build(&series)?;
        let selection = self.selector.select(name, &matrix)?;
        let forecast = self
            .generator
            .generate(&selection.model, &selection.score, &series)?;

        Ok(SeriesReport {
            series_name: name.to_string(),
            forecast,
            scores: selection.scores,
            candidate_failures: selection.failures,
        })
    }

    fn forecast_branch(&self, request: &AnalysisRequest) -> Vec<(String, Result<SeriesReport>)> {
        let run = |name: &String| {
            (
                name.clone(),
                self.forecast_series(name, request.start, request.end),
            )
        };
        if self.parallel {
            request.targets.par_iter().map(run).collect()
        } else {
            request.targets.iter().map(run).collect()
        }
    }

    fn cycle_branch(&self, start: NaiveDate, end: NaiveDate) -> CycleOutcome {
        let mut failures = Vec::new();
        let frequency = self.builder.frequency();

        let mut names: Vec<&str> = Vec::new();
        for kind in IndexKind::ALL {
            for c in self.builder.config().constituents(kind) {
                if !names.contains(&c.series.as_str()) {
                    names.push(&c.series);
                }
            }
        }

        let mut aligned = BTreeMap::new();
        for name in names {
            match self.aligned(name, Some(frequency), start, end) {
                Ok(series) => {
                    aligned.insert(name.to_string(), series);
                }
                // An absent constituent surfaces as a composite failure.
                Err(MacroError::Source {
                    source: SourceError::NotFound(_),
                    ..
                }) => {}
                Err(e) => {
                    warn!(series = name, error = %e, "constituent unavailable");
                    failures.push(FailureReport::new(name, &e));
                }
            }
        }

        let mut built: BTreeMap<IndexKind, CompositeIndex> = BTreeMap::new();
        for kind in IndexKind::ALL {
            match self.builder.build(kind, &aligned) {
                Ok(index) => {
                    built.insert(kind, index);
                }
                Err(e) => {
                    warn!(index = %kind, error = %e, "composite index failed");
                    failures.push(FailureReport::new(format!("composite:{}", kind), &e));
                }
            }
        }

        let coincident = match built.remove(&IndexKind::Coincident) {
            Some(index) => index,
            None => {
                return CycleOutcome {
                    report: None,
                    failures,
                }
            }
        };
        let leading = built.remove(&IndexKind::Leading);
        let lagging = built.remove(&IndexKind::Lagging);

        let report = match self.classifier.classify(&coincident, leading.as_ref()) {
            Ok(summary) => Some(CycleReport {
                leading,
                coincident,
                lagging,
                summary,
            }),
            Err(e) => {
                failures.push(FailureReport::new("cycle", &e));
                None
            }
        };

        CycleOutcome { report, failures }
    }
}
