#![allow(dead_code)]

use chrono::NaiveDate;
use macro_cycle::{AlignedSeries, Frequency, Series};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use std::f64::consts::PI;

pub fn month(year: i32, month: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, 1).unwrap()
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// Upward trend with a yearly wave and seeded Gaussian noise
pub fn noisy_trend(n: usize, seed: u64) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    let noise = Normal::new(0.0, 0.5).unwrap();
    (0..n)
        .map(|i| {
            let t = i as f64;
            100.0 + 0.3 * t + 2.0 * (2.0 * PI * t / 12.0).sin() + noise.sample(&mut rng)
        })
        .collect()
}

/// `base + amplitude * sin(2π (i + shift) / period)`
pub fn wave(n: usize, period: f64, base: f64, amplitude: f64, shift: f64) -> Vec<f64> {
    (0..n)
        .map(|i| base + amplitude * (2.0 * PI * (i as f64 + shift) / period).sin())
        .collect()
}

pub fn monthly(name: &str, start: NaiveDate, values: &[f64]) -> Series {
    Series::from_values(name, Frequency::Monthly, start, values).unwrap()
}

pub fn aligned(name: &str, start: NaiveDate, values: Vec<f64>) -> AlignedSeries {
    AlignedSeries::from_values(name, Frequency::Monthly, start, values).unwrap()
}
