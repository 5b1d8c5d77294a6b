//! Time series data handling for macroeconomic indicators

use crate::error::{MacroError, Result};
use crate::utils::future_dates;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Native sampling frequency of an indicator
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    #[default]
    Monthly,
    Quarterly,
}

impl Frequency {
    /// Number of periods in a calendar year
    pub const fn periods_per_year(&self) -> u32 {
        match self {
            Frequency::Monthly => 12,
            Frequency::Quarterly => 4,
        }
    }

    const fn months_per_period(&self) -> u32 {
        12 / self.periods_per_year()
    }

    /// Zero-based position of the date's period within its year
    pub fn period_of_year(&self, date: NaiveDate) -> u32 {
        date.month0() / self.months_per_period()
    }

    /// Absolute period number, contiguous across year boundaries
    pub fn period_index(&self, date: NaiveDate) -> i64 {
        date.year() as i64 * self.periods_per_year() as i64 + self.period_of_year(date) as i64
    }

    /// First calendar day of the period with the given absolute number
    pub fn period_start(&self, index: i64) -> Option<NaiveDate> {
        let ppy = self.periods_per_year() as i64;
        let year = i32::try_from(index.div_euclid(ppy)).ok()?;
        let month = index.rem_euclid(ppy) as u32 * self.months_per_period() + 1;
        NaiveDate::from_ymd_opt(year, month, 1)
    }

    /// Shift a date by a number of periods, landing on a period start
    pub fn advance(&self, date: NaiveDate, periods: i64) -> Option<NaiveDate> {
        self.period_start(self.period_index(date) + periods)
    }
}

/// A single observation; `value` is `None` when the source reports a gap
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimePoint {
    pub date: NaiveDate,
    pub value: Option<f64>,
}

impl TimePoint {
    /// An observed value
    pub fn new(date: NaiveDate, value: f64) -> Self {
        Self {
            date,
            value: Some(value),
        }
    }

    /// A period the source lists without a value
    pub fn missing(date: NaiveDate) -> Self {
        Self { date, value: None }
    }
}

/// Raw series as returned by a Series Source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    /// Indicator name
    pub name: String,
    /// Native frequency reported by the source
    pub frequency: Frequency,
    /// Observations, possibly unordered and with gaps
    pub points: Vec<TimePoint>,
}

impl Series {
    /// Create a new raw series
    pub fn new(name: impl Into<String>, frequency: Frequency, points: Vec<TimePoint>) -> Self {
        Self {
            name: name.into(),
            frequency,
            points,
        }
    }

    /// Create a raw series of consecutive periods starting at `start`
    pub fn from_values(
        name: impl Into<String>,
        frequency: Frequency,
        start: NaiveDate,
        values: &[f64],
    ) -> Result<Self> {
        let dates = period_dates(frequency, start, values.len())?;
        let points = dates
            .into_iter()
            .zip(values)
            .map(|(d, &v)| TimePoint::new(d, v))
            .collect();

        Ok(Self::new(name, frequency, points))
    }

    /// Check if the series has no observations
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Number of listed observations (observed or missing)
    pub fn len(&self) -> usize {
        self.points.len()
    }
}

/// Series on a uniform period grid with every value present.
///
/// Dates are strictly increasing, contiguous period starts; there is exactly
/// one value per date.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlignedSeries {
    name: String,
    frequency: Frequency,
    dates: Vec<NaiveDate>,
    values: Vec<f64>,
}

impl AlignedSeries {
    /// Build an aligned series of consecutive periods starting at `start`
    pub fn from_values(
        name: impl Into<String>,
        frequency: Frequency,
        start: NaiveDate,
        values: Vec<f64>,
    ) -> Result<Self> {
        if values.iter().any(|v| !v.is_finite()) {
            return Err(MacroError::InvalidSeries(
                "Aligned values must be finite".to_string(),
            ));
        }
        let dates = period_dates(frequency, start, values.len())?;

        Ok(Self {
            name: name.into(),
            frequency,
            dates,
            values,
        })
    }

    /// Get the series name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the sampling frequency
    pub fn frequency(&self) -> Frequency {
        self.frequency
    }

    /// Get the period dates
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Get the values
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Get the length of the series
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if the series is empty
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value observed at a given period date
    pub fn value_at(&self, date: NaiveDate) -> Option<f64> {
        self.dates
            .binary_search(&date)
            .ok()
            .map(|i| self.values[i])
    }

    /// The `horizon` period dates following the last observation
    pub fn next_dates(&self, horizon: usize) -> Result<Vec<NaiveDate>> {
        let last = self.dates.last().ok_or_else(|| {
            MacroError::InvalidSeries(format!("Series '{}' is empty", self.name))
        })?;
        future_dates(self.frequency, *last, horizon)
    }

    /// Percentage change over `periods` periods.
    ///
    /// Use `periods = frequency.periods_per_year()` for year-over-year growth.
    /// Periods whose base value is zero are skipped.
    pub fn growth_rate(&self, periods: usize) -> Vec<(NaiveDate, f64)> {
        if periods == 0 {
            return Vec::new();
        }

        (periods..self.values.len())
            .filter(|&i| self.values[i - periods] != 0.0)
            .map(|i| {
                let base = self.values[i - periods];
                (self.dates[i], (self.values[i] / base - 1.0) * 100.0)
            })
            .collect()
    }
}

fn period_dates(frequency: Frequency, start: NaiveDate, count: usize) -> Result<Vec<NaiveDate>> {
    let first = frequency.period_index(start);
    (0..count as i64)
        .map(|offset| {
            frequency.period_start(first + offset).ok_or_else(|| {
                MacroError::InvalidSeries(format!("Period {} is out of range", first + offset))
            })
        })
        .collect()
}
