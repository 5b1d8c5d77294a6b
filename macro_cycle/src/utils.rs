//! Utility functions for the macro_cycle crate

use crate::data::Frequency;
use crate::error::{MacroError, Result};
use chrono::NaiveDate;

/// Sizes of a chronological train/holdout partition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HoldoutSplit {
    /// Rows in the earliest (training) segment
    pub train: usize,
    /// Rows in the latest (holdout) segment
    pub holdout: usize,
}

/// Split `rows` chronologically: the latest `fraction` (at least `min_holdout`)
/// rows form the holdout, the rest the training segment.
///
/// The training segment must keep at least `min_train` rows.
pub fn holdout_split(
    rows: usize,
    fraction: f64,
    min_holdout: usize,
    min_train: usize,
) -> Result<HoldoutSplit> {
    if !(fraction > 0.0 && fraction < 1.0) {
        return Err(MacroError::InvalidParameter(format!(
            "Holdout fraction must be in (0, 1), got {}",
            fraction
        )));
    }

    let holdout = ((rows as f64 * fraction).round() as usize).max(min_holdout);
    if holdout + min_train > rows {
        return Err(MacroError::ModelFit(format!(
            "{} feature rows cannot hold a {}-row holdout and {} training rows",
            rows, holdout, min_train
        )));
    }

    Ok(HoldoutSplit {
        train: rows - holdout,
        holdout,
    })
}

/// Create the `horizon` period dates that follow `last`
pub fn future_dates(frequency: Frequency, last: NaiveDate, horizon: usize) -> Result<Vec<NaiveDate>> {
    (1..=horizon as i64)
        .map(|step| {
            frequency.advance(last, step).ok_or_else(|| {
                MacroError::InvalidParameter(format!(
                    "Cannot advance {} by {} periods",
                    last, step
                ))
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_holdout_split_respects_minimum() {
        let split = holdout_split(24, 0.2, 6, 2).unwrap();
        assert_eq!(split, HoldoutSplit { train: 18, holdout: 6 });

        let split = holdout_split(100, 0.2, 6, 2).unwrap();
        assert_eq!(split, HoldoutSplit { train: 80, holdout: 20 });

        assert!(holdout_split(7, 0.2, 6, 2).is_err());
        assert!(holdout_split(50, 1.0, 6, 2).is_err());
    }

    #[test]
    fn test_future_dates_cross_year() {
        let last = NaiveDate::from_ymd_opt(2023, 11, 1).unwrap();
        let dates = future_dates(Frequency::Monthly, last, 3).unwrap();
        assert_eq!(
            dates,
            vec![
                NaiveDate::from_ymd_opt(2023, 12, 1).unwrap(),
                NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
            ]
        );

        let q = future_dates(Frequency::Quarterly, NaiveDate::from_ymd_opt(2023, 10, 1).unwrap(), 2)
            .unwrap();
        assert_eq!(q[0], NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(q[1], NaiveDate::from_ymd_opt(2024, 4, 1).unwrap());
    }
}
