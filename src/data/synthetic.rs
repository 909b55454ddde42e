//! Synthetic daily rental data
//!
//! Produces a seeded, bike-sharing style frame (`temp`, `hum`, `windspeed`,
//! `cnt`) with one row per day, for demos and tests.

use super::frame::Frame;
use anyhow::{ensure, Result};
use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
use std::f64::consts::PI;

/// Parameters of the generated series
#[derive(Debug, Clone)]
pub struct SyntheticConfig {
    pub start: NaiveDate,
    pub days: usize,
    /// Standard deviation of the noise added to `cnt`
    pub noise: f64,
    pub seed: u64,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            start: NaiveDate::from_ymd_opt(2011, 1, 1).unwrap_or_default(),
            days: 731,
            noise: 400.0,
            seed: 42,
        }
    }
}

/// Generate a daily frame with a seasonal temperature cycle and a count
/// driven linearly by the weather columns plus a yearly growth trend
pub fn generate_daily_rentals(config: &SyntheticConfig) -> Result<Frame> {
    ensure!(
        config.noise.is_finite() && config.noise >= 0.0,
        "noise must be a finite, non-negative standard deviation, got {}",
        config.noise
    );

    let mut rng = StdRng::seed_from_u64(config.seed);
    let noise = Normal::new(0.0, config.noise)?;

    let mut index: Vec<NaiveDateTime> = Vec::with_capacity(config.days);
    let mut temp = Vec::with_capacity(config.days);
    let mut hum = Vec::with_capacity(config.days);
    let mut windspeed = Vec::with_capacity(config.days);
    let mut cnt = Vec::with_capacity(config.days);

    for i in 0..config.days {
        let date = config.start + Duration::days(i as i64);
        let season = (2.0 * PI * (date.ordinal() as f64 - 110.0) / 365.0).sin();

        let t = (0.5 + 0.3 * season + rng.gen_range(-0.05..0.05)).clamp(0.0, 1.0);
        let h = rng.gen_range(0.3..0.95);
        let w = rng.gen_range(0.02..0.45);
        let growth = 1500.0 * (i as f64 / 365.0);
        let c = 1200.0 + 5000.0 * t - 1500.0 * h - 2500.0 * w + growth + noise.sample(&mut rng);

        index.push(date.and_time(chrono::NaiveTime::MIN));
        temp.push(t);
        hum.push(h);
        windspeed.push(w);
        cnt.push(c.max(0.0).round());
    }

    let frame = Frame::from_columns(
        index,
        vec![
            ("temp", temp),
            ("hum", hum),
            ("windspeed", windspeed),
            ("cnt", cnt),
        ],
    )?;
    Ok(frame)
}
