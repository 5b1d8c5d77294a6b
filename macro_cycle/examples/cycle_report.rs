//! Forecast a few indicators and classify the business cycle.
//!
//! Run with a directory of FRED-style CSV downloads (`<SERIES>.csv`) or with
//! no argument to use generated data:
//!
//! ```text
//! cargo run --example cycle_report -- ./data
//! ```

use chrono::NaiveDate;
use macro_cycle::{
    AnalysisConfig, AnalysisRequest, CachingSource, CsvDirectorySource, CycleAnalyzer, Frequency,
    InMemorySource, JsonLinesSink, Series, SeriesSource,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use std::f64::consts::PI;

const CONSTITUENTS: [(&str, f64, f64, f64); 9] = [
    ("T10Y2Y", 1.5, 1.0, 6.0),
    ("PERMIT", 1_400.0, 200.0, 5.0),
    ("ICSA", 300_000.0, 40_000.0, 30.0),
    ("PAYEMS", 130_000.0, 2_000.0, 0.0),
    ("INDPRO", 100.0, 5.0, 0.0),
    ("W875RX1", 12_000.0, 300.0, 1.0),
    ("UNRATE", 6.0, 1.5, 22.0),
    ("CPILFESL", 250.0, 4.0, -4.0),
    ("BUSLOANS", 2_000.0, 150.0, -5.0),
];

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let start = NaiveDate::from_ymd_opt(2005, 1, 1).ok_or("invalid start date")?;
    let end = NaiveDate::from_ymd_opt(2019, 12, 1).ok_or("invalid end date")?;
    let request = AnalysisRequest::new(["UNRATE", "INDPRO", "GDP"], start, end);

    let mut config = AnalysisConfig::default();
    config
        .alignment
        .frequencies
        .insert("GDP".to_string(), Frequency::Quarterly);

    match std::env::args().nth(1) {
        Some(dir) => {
            let source = CsvDirectorySource::new(dir).with_frequency("GDP", Frequency::Quarterly);
            report(config, CachingSource::new(source), &request)
        }
        None => report(config, generated(start, 180)?, &request),
    }
}

fn report<S: SeriesSource>(
    config: AnalysisConfig,
    source: S,
    request: &AnalysisRequest,
) -> Result<(), Box<dyn std::error::Error>> {
    let analyzer = CycleAnalyzer::new(config, source)?;
    let mut sink = JsonLinesSink::new(std::io::stdout().lock());
    let summary = analyzer.run(request, &mut sink)?;

    eprintln!(
        "status: {:?}, forecasts: {}, failures: {}",
        summary.status,
        summary.completed_series.len(),
        summary.failures.len()
    );
    Ok(())
}

/// A 60-month cycle per indicator with seeded noise
fn generated(start: NaiveDate, months: usize) -> Result<InMemorySource, Box<dyn std::error::Error>> {
    let mut rng = StdRng::seed_from_u64(2024);
    let mut source = InMemorySource::new();

    for (name, base, amplitude, lead) in CONSTITUENTS {
        let noise = Normal::new(0.0, amplitude * 0.05)?;
        let values: Vec<f64> = (0..months)
            .map(|i| {
                let phase = 2.0 * PI * (i as f64 + lead) / 60.0;
                base + amplitude * phase.sin() + noise.sample(&mut rng)
            })
            .collect();
        source.insert(Series::from_values(name, Frequency::Monthly, start, &values)?);
    }

    let gdp: Vec<f64> = (0..months / 3)
        .map(|q| {
            let t = q as f64;
            15_000.0 + 60.0 * t + 200.0 * (2.0 * PI * t / 20.0).sin()
        })
        .collect();
    source.insert(Series::from_values("GDP", Frequency::Quarterly, start, &gdp)?);

    Ok(source)
}
