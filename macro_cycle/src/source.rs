//! Series Source collaborators
//!
//! The core only consumes the [`SeriesSource`] trait. Rate limiting and
//! retries belong to implementations; failures are surfaced as
//! [`SourceError`] and never retried here.

use crate::data::{Frequency, Series, TimePoint};
use chrono::NaiveDate;
use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::ErrorKind as IoErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use thiserror::Error;
use tracing::{debug, info};

/// Failures a Series Source may report
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SourceError {
    #[error("series not found: {0}")]
    NotFound(String),

    #[error("rate limited: {0}")]
    RateLimited(String),

    #[error("source unavailable: {0}")]
    Unavailable(String),
}

/// Supplies historical values for a named indicator
pub trait SeriesSource: Send + Sync {
    /// Fetch observations of `series_name` dated within `[start, end]`
    fn fetch(
        &self,
        series_name: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Series, SourceError>;
}

impl<S: SeriesSource + ?Sized> SeriesSource for &S {
    fn fetch(
        &self,
        series_name: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Series, SourceError> {
        (**self).fetch(series_name, start, end)
    }
}

fn clip(series: &Series, start: NaiveDate, end: NaiveDate) -> Series {
    Series::new(
        series.name.clone(),
        series.frequency,
        series
            .points
            .iter()
            .filter(|p| p.date >= start && p.date <= end)
            .copied()
            .collect(),
    )
}

/// Source backed by series held in memory
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    series: BTreeMap<String, Series>,
    failures: BTreeMap<String, SourceError>,
}

impl InMemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a series, keyed by its name
    pub fn insert(&mut self, series: Series) {
        self.series.insert(series.name.clone(), series);
    }

    /// Builder-style [`insert`](Self::insert)
    pub fn with_series(mut self, series: Series) -> Self {
        self.insert(series);
        self
    }

    /// Make every fetch of `series_name` fail with `error`
    pub fn with_failure(mut self, series_name: impl Into<String>, error: SourceError) -> Self {
        self.failures.insert(series_name.into(), error);
        self
    }
}

impl SeriesSource for InMemorySource {
    fn fetch(
        &self,
        series_name: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Series, SourceError> {
        if let Some(error) = self.failures.get(series_name) {
            return Err(error.clone());
        }
        self.series
            .get(series_name)
            .map(|s| clip(s, start, end))
            .ok_or_else(|| SourceError::NotFound(series_name.to_string()))
    }
}

type CacheKey = (String, NaiveDate, NaiveDate);

/// Memoises successful fetches of a wrapped source for the lifetime of the value
#[derive(Debug)]
pub struct CachingSource<S> {
    inner: S,
    cache: Mutex<HashMap<CacheKey, Series>>,
}

impl<S: SeriesSource> CachingSource<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Number of cached responses
    pub fn cached(&self) -> usize {
        self.cache.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Drop every cached response
    pub fn clear(&self) {
        self.cache.lock().unwrap_or_else(|e| e.into_inner()).clear();
    }
}

impl<S: SeriesSource> SeriesSource for CachingSource<S> {
    fn fetch(
        &self,
        series_name: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Series, SourceError> {
        let key = (series_name.to_string(), start, end);
        if let Some(hit) = self
            .cache
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(&key)
        {
            debug!(series = series_name, "using cached data");
            return Ok(hit.clone());
        }

        let series = self.inner.fetch(series_name, start, end)?;
        self.cache
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key, series.clone());
        Ok(series)
    }
}

/// Reads `<dir>/<series>.csv` files with a date column and a value column.
///
/// The first row is a header. Values of `.` or empty cells are gaps, as in
/// FRED downloads.
#[derive(Debug, Clone)]
pub struct CsvDirectorySource {
    dir: PathBuf,
    frequencies: BTreeMap<String, Frequency>,
}

impl CsvDirectorySource {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            frequencies: BTreeMap::new(),
        }
    }

    /// Tag a series with a native frequency other than monthly
    pub fn with_frequency(mut self, series_name: impl Into<String>, frequency: Frequency) -> Self {
        self.frequencies.insert(series_name.into(), frequency);
        self
    }

    fn path_for(&self, series_name: &str) -> PathBuf {
        self.dir.join(format!("{}.csv", series_name))
    }
}

impl SeriesSource for CsvDirectorySource {
    fn fetch(
        &self,
        series_name: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Series, SourceError> {
        let path = self.path_for(series_name);
        let file = File::open(&path).map_err(|e| match e.kind() {
            IoErrorKind::NotFound => SourceError::NotFound(series_name.to_string()),
            _ => SourceError::Unavailable(format!("{}: {}", path.display(), e)),
        })?;

        info!(series = series_name, path = %path.display(), "reading series");

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(file);

        let mut points = Vec::new();
        for (line, record) in reader.records().enumerate() {
            let record = record.map_err(|e| {
                SourceError::Unavailable(format!("{}: {}", path.display(), e))
            })?;
            let malformed = |what: &str| {
                SourceError::Unavailable(format!(
                    "{} row {}: {}",
                    path.display(),
                    line + 2,
                    what
                ))
            };

            let date_text = record.get(0).ok_or_else(|| malformed("missing date"))?;
            let date = NaiveDate::parse_from_str(date_text, "%Y-%m-%d")
                .map_err(|_| malformed("invalid date"))?;
            if date < start || date > end {
                continue;
            }

            let value = match record.get(1).unwrap_or("") {
                "" | "." => None,
                text => Some(
                    text.parse::<f64>()
                        .map_err(|_| malformed("invalid value"))?,
                ),
            };
            points.push(TimePoint { date, value });
        }

        let frequency = self
            .frequencies
            .get(series_name)
            .copied()
            .unwrap_or_default();
        Ok(Series::new(series_name, frequency, points))
    }
}
