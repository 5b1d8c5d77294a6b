mod common;

use common::month;
use macro_cycle::{AlignedSeries, Frequency, MacroError, Series, TimePoint};
use pretty_assertions::assert_eq;
use rstest::rstest;

#[rstest]
#[case(Frequency::Monthly, month(2023, 5), 4)]
#[case(Frequency::Quarterly, month(2023, 5), 1)]
#[case(Frequency::Quarterly, month(2023, 12), 3)]
fn test_period_of_year(
    #[case] frequency: Frequency,
    #[case] date: chrono::NaiveDate,
    #[case] expected: u32,
) {
    assert_eq!(frequency.period_of_year(date), expected);
}

#[test]
fn test_period_start_from_mid_period_date() {
    let mid = chrono::NaiveDate::from_ymd_opt(2021, 8, 17).unwrap();
    let monthly = Frequency::Monthly.period_index(mid);
    let quarterly = Frequency::Quarterly.period_index(mid);
    assert_eq!(Frequency::Monthly.period_start(monthly), Some(month(2021, 8)));
    assert_eq!(Frequency::Quarterly.period_start(quarterly), Some(month(2021, 7)));
}

#[test]
fn test_advance_across_years() {
    assert_eq!(Frequency::Monthly.advance(month(2019, 11), 3), Some(month(2020, 2)));
    assert_eq!(Frequency::Quarterly.advance(month(2019, 10), 1), Some(month(2020, 1)));
    assert_eq!(Frequency::Monthly.advance(month(2020, 1), -1), Some(month(2019, 12)));
    assert_eq!(
        Frequency::Monthly.period_index(month(2020, 1))
            - Frequency::Monthly.period_index(month(2019, 1)),
        12
    );
}

#[test]
fn test_series_from_values() {
    let series =
        Series::from_values("CPI", Frequency::Quarterly, month(2000, 2), &[1.0, 2.0]).unwrap();
    assert_eq!(series.len(), 2);
    assert_eq!(series.points[0], TimePoint::new(month(2000, 1), 1.0));
    assert_eq!(series.points[1].date, month(2000, 4));
    assert!(!series.is_empty());
    assert_eq!(TimePoint::missing(month(2000, 1)).value, None);
}

#[test]
fn test_aligned_series_lookup() {
    let values = vec![3.5, 4.4, 14.7];
    let series =
        AlignedSeries::from_values("UNRATE", Frequency::Monthly, month(2020, 1), values).unwrap();
    assert_eq!(series.name(), "UNRATE");
    assert_eq!(series.len(), 3);
    assert_eq!(series.value_at(month(2020, 3)), Some(14.7));
    assert_eq!(series.value_at(month(2020, 4)), None);
    assert_eq!(
        series.next_dates(2).unwrap(),
        vec![month(2020, 4), month(2020, 5)]
    );
}

#[test]
fn test_aligned_series_rejects_non_finite() {
    let err =
        AlignedSeries::from_values("X", Frequency::Monthly, month(2020, 1), vec![1.0, f64::NAN])
            .unwrap_err();
    assert!(matches!(err, MacroError::InvalidSeries(_)));
}

#[test]
fn test_empty_series_has_no_next_dates() {
    let series =
        AlignedSeries::from_values("X", Frequency::Monthly, month(2020, 1), vec![]).unwrap();
    assert!(series.is_empty());
    assert!(series.next_dates(3).is_err());
}
