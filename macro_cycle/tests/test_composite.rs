mod common;

use approx::assert_relative_eq;
use common::{aligned, month, wave};
use cycle_math::statistics::zscores;
use macro_cycle::config::CompositeConfig;
use macro_cycle::{
    AlignedSeries, CompositeIndexBuilder, Constituent, ErrorKind, Frequency, IndexKind,
    MacroError, Polarity,
};
use pretty_assertions::assert_eq;
use rstest::rstest;
use std::collections::BTreeMap;

fn config_with(coincident: Vec<Constituent>) -> CompositeConfig {
    CompositeConfig {
        coincident,
        ..CompositeConfig::default()
    }
}

fn series_map(series: Vec<AlignedSeries>) -> BTreeMap<String, AlignedSeries> {
    series
        .into_iter()
        .map(|s| (s.name().to_string(), s))
        .collect()
}

#[test]
fn test_weighted_signed_zscores() {
    let rising: Vec<f64> = (0..30).map(|i| i as f64).collect();
    let falling: Vec<f64> = rising.iter().map(|v| 100.0 - 2.0 * v).collect();
    let config = config_with(vec![
        Constituent::new("A", 0.6, Polarity::Positive),
        Constituent::new("B", 0.4, Polarity::Inverse),
    ]);
    let inputs = series_map(vec![
        aligned("A", month(2000, 1), rising.clone()),
        aligned("B", month(2000, 1), falling),
    ]);

    let index = CompositeIndexBuilder::new(config, 24)
        .build(IndexKind::Coincident, &inputs)
        .unwrap();

    // B inverted is a rescaled copy of A, so the composite equals z(A)
    let expected = zscores(&rising).unwrap();
    assert_eq!(index.kind, IndexKind::Coincident);
    assert_eq!(
        index.weights,
        vec![("A".to_string(), 0.6), ("B".to_string(), 0.4)]
    );
    assert_eq!(index.len(), 30);
    for (value, z) in index.values().iter().zip(&expected) {
        assert_relative_eq!(*value, *z, epsilon = 1e-9);
    }
}

#[test]
fn test_zscores_use_each_full_history() {
    // A spans 40 months, B only the last 30: A is standardised over all 40
    let a: Vec<f64> = (0..40).map(|i| i as f64).collect();
    let b = wave(30, 12.0, 50.0, 5.0, 0.0);
    let config = config_with(vec![
        Constituent::new("A", 1.0, Polarity::Positive),
        Constituent::new("B", 0.0, Polarity::Positive),
    ]);
    let inputs = series_map(vec![
        aligned("A", month(2000, 1), a.clone()),
        aligned("B", month(2000, 11), b),
    ]);

    let index = CompositeIndexBuilder::new(config, 24)
        .build(IndexKind::Coincident, &inputs)
        .unwrap();

    let za = zscores(&a).unwrap();
    assert_eq!(index.len(), 30);
    assert_eq!(index.dates()[0], month(2000, 11));
    assert_relative_eq!(index.values()[0], za[10], epsilon = 1e-12);
    assert_relative_eq!(index.values()[29], za[39], epsilon = 1e-12);
}

#[test]
fn test_intersection_below_minimum() {
    let config = config_with(vec![
        Constituent::new("A", 0.5, Polarity::Positive),
        Constituent::new("B", 0.5, Polarity::Positive),
    ]);
    let inputs = series_map(vec![
        aligned("A", month(2000, 1), wave(30, 12.0, 10.0, 1.0, 0.0)),
        aligned("B", month(2001, 1), wave(30, 12.0, 10.0, 1.0, 3.0)),
    ]);

    // Overlap is 2001-01..2002-06: 18 periods
    let err = CompositeIndexBuilder::new(config, 24)
        .build(IndexKind::Coincident, &inputs)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::CompositeIndex);
    assert!(err.to_string().contains("18"));
}

#[test]
fn test_missing_constituent() {
    let config = config_with(vec![
        Constituent::new("A", 0.5, Polarity::Positive),
        Constituent::new("GONE", 0.5, Polarity::Positive),
    ]);
    let inputs = series_map(vec![aligned("A", month(2000, 1), wave(30, 12.0, 10.0, 1.0, 0.0))]);

    let err = CompositeIndexBuilder::new(config, 24)
        .build(IndexKind::Coincident, &inputs)
        .unwrap_err();
    match err {
        MacroError::CompositeIndex { index, reason } => {
            assert_eq!(index, "coincident");
            assert!(reason.contains("GONE"));
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[rstest]
#[case(vec![0.5, 0.4])]
#[case(vec![0.7, 0.7])]
#[case(vec![1.2, -0.2])]
fn test_weight_invariant(#[case] weights: Vec<f64>) {
    let config = config_with(vec![
        Constituent::new("A", weights[0], Polarity::Positive),
        Constituent::new("B", weights[1], Polarity::Positive),
    ]);
    let inputs = series_map(vec![
        aligned("A", month(2000, 1), wave(30, 12.0, 10.0, 1.0, 0.0)),
        aligned("B", month(2000, 1), wave(30, 12.0, 10.0, 1.0, 3.0)),
    ]);

    let err = CompositeIndexBuilder::new(config, 24)
        .build(IndexKind::Coincident, &inputs)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::CompositeIndex);
}

#[test]
fn test_weight_tolerance() {
    let config = config_with(vec![
        Constituent::new("A", 0.5 + 5e-7, Polarity::Positive),
        Constituent::new("B", 0.5, Polarity::Positive),
    ]);
    let inputs = series_map(vec![
        aligned("A", month(2000, 1), wave(30, 12.0, 10.0, 1.0, 0.0)),
        aligned("B", month(2000, 1), wave(30, 12.0, 10.0, 1.0, 3.0)),
    ]);
    assert!(CompositeIndexBuilder::new(config, 24)
        .build(IndexKind::Coincident, &inputs)
        .is_ok());
}

#[test]
fn test_flat_constituent_rejected() {
    let config = config_with(vec![
        Constituent::new("A", 0.5, Polarity::Positive),
        Constituent::new("FLAT", 0.5, Polarity::Positive),
    ]);
    let inputs = series_map(vec![
        aligned("A", month(2000, 1), wave(30, 12.0, 10.0, 1.0, 0.0)),
        aligned("FLAT", month(2000, 1), vec![3.0; 30]),
    ]);

    let err = CompositeIndexBuilder::new(config, 24)
        .build(IndexKind::Coincident, &inputs)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::CompositeIndex);
}

#[test]
fn test_frequency_mismatch() {
    let config = config_with(vec![Constituent::new("GDP", 1.0, Polarity::Positive)]);
    let gdp = AlignedSeries::from_values(
        "GDP",
        Frequency::Quarterly,
        month(2000, 1),
        wave(30, 8.0, 10.0, 1.0, 0.0),
    )
    .unwrap();

    let err = CompositeIndexBuilder::new(config, 24)
        .build(IndexKind::Coincident, &series_map(vec![gdp]))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::CompositeIndex);
}

#[test]
fn test_default_table_is_valid() {
    let config = CompositeConfig::default();
    config.validate().unwrap();
    for kind in IndexKind::ALL {
        assert_eq!(config.constituents(kind).len(), 3);
    }
    assert_eq!(config.leading[2].polarity, Polarity::Inverse);
    assert_eq!(config.lagging[0].series, "UNRATE");
}
