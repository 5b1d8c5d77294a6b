//! Series alignment onto a uniform period grid

use crate::config::AlignmentConfig;
use crate::data::{AlignedSeries, Frequency, Series};
use crate::error::{MacroError, Result};
use chrono::NaiveDate;
use cycle_math::statistics::interpolate;
use std::collections::BTreeMap;
use tracing::debug;

/// Cleans and resamples raw series.
///
/// Observations inside one target period are averaged. Internal gaps are
/// filled by linear interpolation between the neighbouring observed periods;
/// leading and trailing gaps are left out, so the aligned series runs from the
/// first to the last observed period inside the requested range.
#[derive(Debug, Clone, Copy)]
pub struct SeriesAligner {
    min_history: usize,
}

impl SeriesAligner {
    /// Create an aligner requiring at least `min_history` aligned periods
    pub fn new(min_history: usize) -> Self {
        Self { min_history }
    }

    pub fn from_config(config: &AlignmentConfig) -> Self {
        Self::new(config.min_history)
    }

    pub fn min_history(&self) -> usize {
        self.min_history
    }

    /// Align `raw` to `frequency` over the inclusive date range `[start, end]`
    pub fn align(
        &self,
        raw: &Series,
        frequency: Frequency,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<AlignedSeries> {
        if start > end {
            return Err(MacroError::InvalidParameter(format!(
                "Start date {} is after end date {}",
                start, end
            )));
        }
        check_duplicate_dates(raw)?;

        let mut buckets: BTreeMap<i64, (f64, usize)> = BTreeMap::new();
        for point in &raw.points {
            if point.date < start || point.date > end {
                continue;
            }
            match point.value {
                Some(v) if v.is_finite() => {
                    let bucket = buckets
                        .entry(frequency.period_index(point.date))
                        .or_insert((0.0, 0));
                    bucket.0 += v;
                    bucket.1 += 1;
                }
                _ => {}
            }
        }

        let observed: Vec<(i64, f64)> = buckets
            .into_iter()
            .map(|(period, (sum, count))| (period, sum / count as f64))
            .collect();

        let (first, last) = match (observed.first(), observed.last()) {
            (Some(first), Some(last)) => (first.0, last.0),
            _ => {
                return Err(MacroError::InsufficientHistory {
                    series: raw.name.clone(),
                    required: self.min_history,
                    available: 0,
                })
            }
        };

        let mut values = Vec::with_capacity((last - first + 1) as usize);
        let mut filled = 0usize;
        for pair in observed.windows(2) {
            let (p0, v0) = pair[0];
            let (p1, v1) = pair[1];
            values.push(v0);
            for p in (p0 + 1)..p1 {
                values.push(interpolate(p0 as f64, v0, p1 as f64, v1, p as f64));
                filled += 1;
            }
        }
        if let Some(&(_, v)) = observed.last() {
            values.push(v);
        }

        debug!(
            series = %raw.name,
            periods = values.len(),
            interpolated = filled,
            "aligned series"
        );

        if values.len() < self.min_history {
            return Err(MacroError::InsufficientHistory {
                series: raw.name.clone(),
                required: self.min_history,
                available: values.len(),
            });
        }

        let origin = frequency.period_start(first).ok_or_else(|| {
            MacroError::InvalidSeries(format!("Period {} is out of range", first))
        })?;
        AlignedSeries::from_values(raw.name.clone(), frequency, origin, values)
    }
}

fn check_duplicate_dates(raw: &Series) -> Result<()> {
    let mut dates: Vec<NaiveDate> = raw.points.iter().map(|p| p.date).collect();
    dates.sort_unstable();
    if let Some(pair) = dates.windows(2).find(|w| w[0] == w[1]) {
        return Err(MacroError::InvalidSeries(format!(
            "Series '{}' lists {} more than once",
            raw.name, pair[0]
        )));
    }
    Ok(())
}
