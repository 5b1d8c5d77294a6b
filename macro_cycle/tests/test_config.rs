use macro_cycle::config::{CycleConfig, FeatureConfig, SelectionConfig};
use macro_cycle::{AnalysisConfig, ErrorKind, Frequency, IndexKind, MacroError, ModelSpec, Polarity};
use pretty_assertions::assert_eq;
use rstest::rstest;
use std::io::Write;
use tempfile::NamedTempFile;

#[test]
fn test_defaults_are_valid() {
    let config = AnalysisConfig::default();
    config.validate().unwrap();
    config.composite.validate().unwrap();
    assert!(config.parallel);
    assert_eq!(config.alignment.min_history, 24);
    assert_eq!(config.features.lags, vec![1, 3, 6, 12]);
    assert_eq!(config.selection.candidates.len(), 3);
}

#[test]
fn test_partial_toml_overrides_defaults() {
    let config = AnalysisConfig::from_toml_str(
        r#"
parallel = false

[alignment.frequencies]
GDP = "quarterly"

[features]
lags = [1, 2]
rolling_window = 6

[[selection.candidates]]
model = "exponential_smoothing"
alpha = 0.3

[[selection.candidates]]
model = "linear_regression"
ridge = 0.01
"#,
    )
    .unwrap();

    assert!(!config.parallel);
    assert_eq!(
        config.alignment.frequency_for("GDP", Frequency::Monthly),
        Frequency::Quarterly
    );
    assert_eq!(
        config.alignment.frequency_for("UNRATE", Frequency::Monthly),
        Frequency::Monthly
    );
    assert_eq!(
        config.alignment.frequency_for("GDPC1", Frequency::Quarterly),
        Frequency::Quarterly
    );
    assert_eq!(config.features.lags, vec![1, 2]);
    assert_eq!(config.features.rolling_window, 6);
    assert!(config.features.seasonal);
    assert_eq!(
        config.selection.candidates,
        vec![
            ModelSpec::ExponentialSmoothing { alpha: Some(0.3) },
            ModelSpec::LinearRegression { ridge: 0.01 },
        ]
    );
    assert_eq!(config.selection.min_holdout, 6);
    assert_eq!(config.cycle, CycleConfig::default());
}

#[test]
fn test_composite_table_from_toml() {
    let config = AnalysisConfig::from_toml_str(
        r#"
[[composite.leading]]
series = "SPREAD"
weight = 0.5

[[composite.leading]]
series = "CLAIMS"
weight = 0.5
polarity = "inverse"
"#,
    )
    .unwrap();

    let leading = config.composite.constituents(IndexKind::Leading);
    assert_eq!(leading.len(), 2);
    assert_eq!(leading[0].polarity, Polarity::Positive);
    assert_eq!(leading[1].polarity, Polarity::Inverse);
    assert_eq!(config.composite.coincident.len(), 3);
}

#[test]
fn test_bad_weights_do_not_fail_loading() {
    let config = AnalysisConfig::from_toml_str(
        r#"
[[composite.lagging]]
series = "UNRATE"
weight = 0.7
"#,
    )
    .unwrap();

    let err = config.composite.validate_index(IndexKind::Lagging).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::CompositeIndex);
    config.composite.validate_index(IndexKind::Leading).unwrap();
}

#[test]
fn test_global_frequency_overrides_native() {
    let config = AnalysisConfig::from_toml_str(
        r#"
[alignment]
frequency = "quarterly"

[alignment.frequencies]
PAYEMS = "monthly"
"#,
    )
    .unwrap();

    assert_eq!(
        config.alignment.frequency_for("UNRATE", Frequency::Monthly),
        Frequency::Quarterly
    );
    assert_eq!(
        config.alignment.frequency_for("PAYEMS", Frequency::Quarterly),
        Frequency::Monthly
    );
}

#[rstest]
#[case("[cycle]\nwindow = 4")]
#[case("[features]\nlags = []")]
#[case("[features]\nlags = [1, 1]")]
#[case("[selection]\nholdout_fraction = 1.0")]
#[case("[selection]\ncandidates = []")]
#[case("[alignment]\nmin_history = 1")]
fn test_invalid_values_rejected(#[case] text: &str) {
    let err = AnalysisConfig::from_toml_str(text).unwrap_err();
    assert!(matches!(err, MacroError::InvalidParameter(_)));
    assert_eq!(err.kind(), ErrorKind::InvalidInput);
}

#[rstest]
#[case("parallel = \"yes\"")]
#[case("[[selection.candidates]]\nmodel = \"neural_net\"")]
#[case("[alignment]\nfrequency = \"weekly\"")]
fn test_malformed_toml(#[case] text: &str) {
    let err = AnalysisConfig::from_toml_str(text).unwrap_err();
    assert!(matches!(err, MacroError::Config(_)));
    assert_eq!(err.kind(), ErrorKind::InvalidInput);
}

#[test]
fn test_toml_round_trip() {
    let mut config = AnalysisConfig::default();
    config.parallel = false;
    config
        .alignment
        .frequencies
        .insert("GDP".to_string(), Frequency::Quarterly);

    let text = config.to_toml_string().unwrap();
    let parsed = AnalysisConfig::from_toml_str(&text).unwrap();
    assert_eq!(parsed, config);
}

#[test]
fn test_from_file() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "[cycle]\nmin_separation = 9").unwrap();

    let config = AnalysisConfig::from_toml_file(file.path()).unwrap();
    assert_eq!(config.cycle.min_separation, 9);
    assert_eq!(config.features, FeatureConfig::default());
    assert_eq!(config.selection, SelectionConfig::default());
}

#[test]
fn test_missing_file() {
    let err = AnalysisConfig::from_toml_file("/nonexistent/macro_cycle.toml").unwrap_err();
    assert!(matches!(err, MacroError::IoError(_)));
}
