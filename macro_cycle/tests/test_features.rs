mod common;

use approx::assert_relative_eq;
use common::{aligned, month};
use macro_cycle::config::FeatureConfig;
use macro_cycle::{AlignedSeries, FeatureEngineer, Frequency, MacroError};
use pretty_assertions::assert_eq;
use rstest::rstest;

fn ramp(n: usize) -> AlignedSeries {
    aligned("RAMP", month(2010, 1), (0..n).map(|i| i as f64).collect())
}

#[test]
fn test_default_schema() {
    let engineer = FeatureEngineer::new(FeatureConfig::default()).unwrap();
    let schema = engineer.schema();
    let names: Vec<&str> = schema.names().iter().map(|s| s.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "lag_1",
            "lag_3",
            "lag_6",
            "lag_12",
            "rolling_mean_12",
            "rolling_std_12",
            "season_sin",
            "season_cos"
        ]
    );
    assert_eq!(engineer.required_history(), 12);
}

#[test]
fn test_constant_series_rows() {
    let series = aligned("FLAT", month(2018, 1), vec![100.0; 36]);
    let engineer = FeatureEngineer::new(FeatureConfig::default()).unwrap();
    let matrix = engineer.build(&series).unwrap();

    assert_eq!(matrix.len(), 24);
    for (row, target) in matrix.rows().iter().zip(matrix.targets()) {
        assert_eq!(*target, 100.0);
        assert_eq!(row.get("lag_12"), Some(100.0));
        assert_relative_eq!(row.get("rolling_mean_12").unwrap(), 100.0);
        assert!(row.get("rolling_std_12").unwrap().abs() < 1e-12);
    }
}

#[test]
fn test_rows_only_use_earlier_values() {
    let series = ramp(30);
    let engineer = FeatureEngineer::new(FeatureConfig::default()).unwrap();
    let matrix = engineer.build(&series).unwrap();

    // First materialised row targets period 12
    assert_eq!(matrix.rows()[0].date(), month(2011, 1));
    for (row, &target) in matrix.rows().iter().zip(matrix.targets()) {
        let t = target;
        assert_eq!(row.get("lag_1"), Some(t - 1.0));
        assert_eq!(row.get("lag_3"), Some(t - 3.0));
        assert_eq!(row.get("lag_12"), Some(t - 12.0));
        assert_relative_eq!(row.get("rolling_mean_12").unwrap(), t - 6.5, epsilon = 1e-9);
    }
}

#[rstest]
#[case(1, 0.0, 1.0)]
#[case(4, 1.0, 0.0)]
#[case(7, 0.0, -1.0)]
#[case(10, -1.0, 0.0)]
fn test_seasonal_encoding(#[case] m: u32, #[case] sin: f64, #[case] cos: f64) {
    let series = ramp(40);
    let engineer = FeatureEngineer::new(FeatureConfig::default()).unwrap();
    let matrix = engineer.build(&series).unwrap();

    let row = matrix
        .rows()
        .iter()
        .find(|r| r.date() == month(2012, m))
        .unwrap();
    assert_relative_eq!(row.get("season_sin").unwrap(), sin, epsilon = 1e-12);
    assert_relative_eq!(row.get("season_cos").unwrap(), cos, epsilon = 1e-12);
}

#[test]
fn test_quarterly_seasonal_period() {
    let series =
        AlignedSeries::from_values("GDP", Frequency::Quarterly, month(2010, 1), (0..20).map(|i| i as f64).collect())
            .unwrap();
    let config = FeatureConfig {
        lags: vec![1, 2],
        rolling_window: 4,
        seasonal: true,
    };
    let matrix = FeatureEngineer::new(config).unwrap().build(&series).unwrap();

    // Q2 sits a quarter of the way round the year
    let q2 = matrix
        .rows()
        .iter()
        .find(|r| r.date() == month(2012, 4))
        .unwrap();
    assert_relative_eq!(q2.get("season_sin").unwrap(), 1.0, epsilon = 1e-12);
}

#[test]
fn test_too_short_series() {
    let engineer = FeatureEngineer::new(FeatureConfig::default()).unwrap();
    let err = engineer.build(&ramp(12)).unwrap_err();
    assert!(matches!(
        err,
        MacroError::InsufficientHistory {
            required: 13,
            available: 12,
            ..
        }
    ));

    let matrix = engineer.build(&ramp(13)).unwrap();
    assert_eq!(matrix.len(), 1);
}

#[test]
fn test_next_row_matches_training_rows() {
    let series = ramp(30);
    let engineer = FeatureEngineer::new(FeatureConfig::default()).unwrap();
    let matrix = engineer.build(&series).unwrap();

    let last = matrix.rows().last().unwrap();
    let rebuilt = engineer
        .next_row(&series.values()[..29], series.dates()[29], Frequency::Monthly)
        .unwrap();
    assert_eq!(&rebuilt, last);
}

#[test]
fn test_build_is_deterministic() {
    let series = aligned("NOISY", month(2000, 1), common::noisy_trend(60, 7));
    let engineer = FeatureEngineer::new(FeatureConfig::default()).unwrap();
    assert_eq!(engineer.build(&series).unwrap(), engineer.build(&series).unwrap());
}

#[test]
fn test_without_seasonal_features() {
    let config = FeatureConfig {
        lags: vec![1, 2, 3],
        rolling_window: 3,
        seasonal: false,
    };
    let engineer = FeatureEngineer::new(config).unwrap();
    assert_eq!(engineer.schema().len(), 5);
    assert_eq!(engineer.build(&ramp(10)).unwrap().len(), 7);
}

#[rstest]
#[case(vec![], 12)]
#[case(vec![0, 1], 12)]
#[case(vec![1, 1], 12)]
#[case(vec![1, 3], 1)]
fn test_invalid_feature_config(#[case] lags: Vec<usize>, #[case] rolling_window: usize) {
    let config = FeatureConfig {
        lags,
        rolling_window,
        seasonal: true,
    };
    assert!(matches!(
        FeatureEngineer::new(config),
        Err(MacroError::InvalidParameter(_))
    ));
}
