//! Report Sink collaborators
//!
//! The core hands structured values to a [`ReportSink`]; rendering and
//! file layout belong to the sink.

use crate::composite::CompositeIndex;
use crate::cycle::{CycleSummary, TurningPoint};
use crate::error::{ErrorKind, MacroError};
use crate::forecast::ForecastResult;
use crate::metrics::EvaluationScore;
use crate::selection::CandidateFailure;
use serde::Serialize;
use std::io::Write;

/// Per-series bundle
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesReport {
    pub series_name: String,
    pub forecast: ForecastResult,
    /// Holdout scores of every candidate that completed
    pub scores: Vec<EvaluationScore>,
    /// Candidates that could not be fitted or scored
    pub candidate_failures: Vec<CandidateFailure>,
}

/// Cross-series bundle
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CycleReport {
    pub leading: Option<CompositeIndex>,
    pub coincident: CompositeIndex,
    pub lagging: Option<CompositeIndex>,
    pub summary: CycleSummary,
}

impl CycleReport {
    /// Confirmed turning points in chronological order
    pub fn turning_points(&self) -> &[TurningPoint] {
        &self.summary.turning_points
    }
}

/// A failure isolated to one series or one composite index
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailureReport {
    /// Series name, or `composite:<kind>` / `cycle`
    pub scope: String,
    pub kind: ErrorKind,
    pub message: String,
}

impl FailureReport {
    pub fn new(scope: impl Into<String>, error: &MacroError) -> Self {
        Self {
            scope: scope.into(),
            kind: error.kind(),
            message: error.to_string(),
        }
    }
}

/// Receives the structured results of a run
pub trait ReportSink {
    fn series_report(&mut self, report: &SeriesReport) -> std::io::Result<()>;

    fn cycle_report(&mut self, report: &CycleReport) -> std::io::Result<()>;

    fn failure(&mut self, failure: &FailureReport) -> std::io::Result<()>;
}

/// Keeps every report in memory
#[derive(Debug, Clone, Default)]
pub struct CollectingSink {
    pub series: Vec<SeriesReport>,
    pub cycle: Option<CycleReport>,
    pub failures: Vec<FailureReport>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report for one series, if it completed
    pub fn series_named(&self, name: &str) -> Option<&SeriesReport> {
        self.series.iter().find(|r| r.series_name == name)
    }
}

impl ReportSink for CollectingSink {
    fn series_report(&mut self, report: &SeriesReport) -> std::io::Result<()> {
        self.series.push(report.clone());
        Ok(())
    }

    fn cycle_report(&mut self, report: &CycleReport) -> std::io::Result<()> {
        self.cycle = Some(report.clone());
        Ok(())
    }

    fn failure(&mut self, failure: &FailureReport) -> std::io::Result<()> {
        self.failures.push(failure.clone());
        Ok(())
    }
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum Line<'a> {
    Series(&'a SeriesReport),
    Cycle(&'a CycleReport),
    Failure(&'a FailureReport),
}

/// Writes one JSON object per report
#[derive(Debug)]
pub struct JsonLinesSink<W: Write> {
    writer: W,
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_line(&mut self, line: &Line<'_>) -> std::io::Result<()> {
        serde_json::to_writer(&mut self.writer, line)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()
    }
}

impl<W: Write> ReportSink for JsonLinesSink<W> {
    fn series_report(&mut self, report: &SeriesReport) -> std::io::Result<()> {
        self.write_line(&Line::Series(report))
    }

    fn cycle_report(&mut self, report: &CycleReport) -> std::io::Result<()> {
        self.write_line(&Line::Cycle(report))
    }

    fn failure(&mut self, failure: &FailureReport) -> std::io::Result<()> {
        self.write_line(&Line::Failure(failure))
    }
}
