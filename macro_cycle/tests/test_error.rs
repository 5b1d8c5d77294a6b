use cycle_math::MathError;
use macro_cycle::{ErrorKind, FailureReport, MacroError, SourceError};
use pretty_assertions::assert_eq;
use rstest::rstest;

#[rstest]
#[case(
    MacroError::InsufficientHistory { series: "GDP".into(), required: 24, available: 10 },
    ErrorKind::InsufficientHistory
)]
#[case(
    MacroError::NoViableModel { series: "GDP".into(), reasons: vec![] },
    ErrorKind::NoViableModel
)]
#[case(MacroError::ModelFit("singular".into()), ErrorKind::NoViableModel)]
#[case(
    MacroError::CompositeIndex { index: "leading".into(), reason: "missing".into() },
    ErrorKind::CompositeIndex
)]
#[case(
    MacroError::Source { series: "GDP".into(), source: SourceError::Unavailable("down".into()) },
    ErrorKind::SourceUnavailable
)]
#[case(MacroError::InvalidSeries("duplicate".into()), ErrorKind::InvalidInput)]
#[case(MacroError::InvalidParameter("window".into()), ErrorKind::InvalidInput)]
#[case(MacroError::Config("bad".into()), ErrorKind::InvalidInput)]
fn test_error_kinds(#[case] error: MacroError, #[case] kind: ErrorKind) {
    assert_eq!(error.kind(), kind);
}

#[test]
fn test_error_messages() {
    let err = MacroError::InsufficientHistory {
        series: "UNRATE".to_string(),
        required: 24,
        available: 10,
    };
    assert_eq!(
        err.to_string(),
        "Insufficient history for 'UNRATE': need 24 periods, have 10"
    );

    let err = MacroError::NoViableModel {
        series: "GDP".to_string(),
        reasons: vec!["a: x".to_string(), "b: y".to_string()],
    };
    assert_eq!(err.to_string(), "No viable model for 'GDP': a: x; b: y");

    let err = MacroError::Source {
        series: "ICSA".to_string(),
        source: SourceError::RateLimited("429".to_string()),
    };
    assert_eq!(err.to_string(), "Series source failed for 'ICSA': rate limited: 429");
}

#[test]
fn test_conversions() {
    let io = std::io::Error::new(std::io::ErrorKind::Other, "disk");
    let err: MacroError = io.into();
    assert_eq!(err.kind(), ErrorKind::SourceUnavailable);

    let err: MacroError = MathError::InsufficientData("empty".to_string()).into();
    assert!(matches!(err, MacroError::Math(_)));
    assert_eq!(err.kind(), ErrorKind::InvalidInput);
}

#[test]
fn test_failure_report() {
    let err = MacroError::CompositeIndex {
        index: "coincident".to_string(),
        reason: "weights sum to 0.9, expected 1.0".to_string(),
    };
    let report = FailureReport::new("composite:coincident", &err);

    assert_eq!(report.scope, "composite:coincident");
    assert_eq!(report.kind, ErrorKind::CompositeIndex);
    assert_eq!(report.kind.to_string(), "CompositeIndexError");
    assert!(report.message.contains("0.9"));
}
