//! Synthetic vegetation index stacks.
//!
//! Generates Sentinel-2-like acquisitions over a small raster: a per-pixel
//! harmonic seasonal signal, Gaussian noise, random cloud masking and an
//! optional dieback step on a random subset of pixels. Used to exercise the
//! detection chain in tests, benchmarks and demos.
//!
//! ```text
//! VI_p(d) = P_p · [1, sin(2πd/T), cos(2πd/T), sin(4πd/T), cos(4πd/T)] + ε + shift_p(d)
//! ```

use chrono::{Duration, NaiveDate};
use rand::prelude::*;
use rand_distr::Normal;

use crate::basis::{evaluate, Coefficients};
use crate::dates::day_number;
use crate::error::{Error, Result};
use crate::pipeline::TimeSeries;

/// Value written to masked (cloudy) observations.
pub const CLOUD_VALUE: f64 = 1.5;

/// A dieback step applied to a fraction of the pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiebackScenario {
    /// Fraction of in-scope pixels affected, in `[0, 1]`.
    pub fraction: f64,
    /// First date index carrying the step.
    pub start_index: usize,
    /// Added to the vegetation index from `start_index` on.
    pub shift: f64,
}

/// Parameters of a synthetic stack.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationParams {
    pub rows: usize,
    pub cols: usize,
    pub start: NaiveDate,
    pub n_dates: usize,
    /// Days between acquisitions.
    pub revisit_days: i64,
    /// Day-number origin of the seasonal signal.
    pub epoch: NaiveDate,
    /// Mean seasonal model shared by all pixels.
    pub model: Coefficients,
    /// Standard deviation of the per-pixel offset of the mean level.
    pub pixel_spread: f64,
    /// Standard deviation of the observation noise.
    pub noise_sd: f64,
    /// Probability that an observation is cloudy.
    pub cloud_probability: f64,
    pub dieback: Option<DiebackScenario>,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            rows: 10,
            cols: 10,
            start: NaiveDate::from_ymd_opt(2017, 1, 1).unwrap_or_default(),
            n_dates: 120,
            revisit_days: 5,
            epoch: NaiveDate::from_ymd_opt(2015, 1, 1).unwrap_or_default(),
            // CRSWIR-like: low in summer, high in winter
            model: [0.55, 0.02, 0.08, 0.01, -0.02],
            pixel_spread: 0.02,
            noise_sd: 0.02,
            cloud_probability: 0.3,
            dieback: None,
        }
    }
}

/// A generated stack with its ground truth.
#[derive(Debug, Clone)]
pub struct SimulatedStack {
    pub stack: TimeSeries,
    /// Pixels carrying the dieback step.
    pub affected: Vec<bool>,
    /// Per-pixel seasonal model used to generate the data (without noise).
    pub models: Vec<Coefficients>,
}

fn normal(sd: f64, what: &str) -> Result<Option<Normal<f64>>> {
    if !sd.is_finite() || sd < 0.0 {
        return Err(Error::config(format!(
            "{} must be a finite non-negative standard deviation, got {}",
            what, sd
        )));
    }
    if sd == 0.0 {
        return Ok(None);
    }
    Normal::new(0.0, sd)
        .map(Some)
        .map_err(|e| Error::config(format!("{}: {}", what, e)))
}

/// Generate a stack.
///
/// # Arguments
/// * `params` - Stack geometry and signal parameters
/// * `seed` - Optional random seed for reproducibility
pub fn simulate_stack(params: &SimulationParams, seed: Option<u64>) -> Result<SimulatedStack> {
    if !(0.0..=1.0).contains(&params.cloud_probability) {
        return Err(Error::config(format!(
            "cloud_probability must be in [0, 1], got {}",
            params.cloud_probability
        )));
    }
    if params.revisit_days <= 0 {
        return Err(Error::config("revisit_days must be positive"));
    }
    if let Some(scenario) = params.dieback {
        if !(0.0..=1.0).contains(&scenario.fraction) {
            return Err(Error::config(format!(
                "dieback fraction must be in [0, 1], got {}",
                scenario.fraction
            )));
        }
    }
    let spread = normal(params.pixel_spread, "pixel_spread")?;
    let noise = normal(params.noise_sd, "noise_sd")?;

    let mut rng = match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    };

    let n_pixels = params.rows * params.cols;
    let models: Vec<Coefficients> = (0..n_pixels)
        .map(|_| {
            let mut model = params.model;
            if let Some(spread) = spread {
                model[0] += rng.sample(spread);
            }
            model
        })
        .collect();
    let affected: Vec<bool> = match params.dieback {
        Some(scenario) => (0..n_pixels)
            .map(|_| rng.gen_bool(scenario.fraction))
            .collect(),
        None => vec![false; n_pixels],
    };

    let mut stack = TimeSeries::new(params.rows, params.cols, vec![true; n_pixels])?;
    for t in 0..params.n_dates {
        let date = params.start + Duration::days(params.revisit_days * t as i64);
        let day = day_number(date, params.epoch) as f64;
        let mut vi = Vec::with_capacity(n_pixels);
        let mut mask = Vec::with_capacity(n_pixels);
        for p in 0..n_pixels {
            let cloudy = rng.gen_bool(params.cloud_probability);
            let mut value = evaluate(&models[p], day);
            if let Some(noise) = noise {
                value += rng.sample(noise);
            }
            if let Some(scenario) = params.dieback {
                if affected[p] && t >= scenario.start_index {
                    value += scenario.shift;
                }
            }
            vi.push(if cloudy { CLOUD_VALUE } else { value });
            mask.push(cloudy);
        }
        stack.push(date, &vi, &mask)?;
    }

    Ok(SimulatedStack {
        stack,
        affected,
        models,
    })
}
