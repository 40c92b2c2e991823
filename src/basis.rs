//! Harmonic seasonal basis.
//!
//! The normal seasonal cycle of a vegetation index is modelled with a truncated
//! Fourier series on the day number `d`:
//!
//! ```text
//! [1, sin(2πd/T), cos(2πd/T), sin(4πd/T), cos(4πd/T)],  T = 365.25
//! ```
//!
//! Unlike a Fourier basis over the observation window, the period is fixed to
//! one year and the phase origin is the day-number epoch, so coefficients stay
//! comparable across pixels and across runs.

use nalgebra::DMatrix;
use std::f64::consts::PI;

/// Number of terms of the harmonic model (intercept + 2 annual + 2 semi-annual).
pub const N_HARMONIC_TERMS: usize = 5;

/// Length of the seasonal period in days.
pub const YEAR_LENGTH_DAYS: f64 = 365.25;

/// Coefficients of one pixel's harmonic model.
pub type Coefficients = [f64; N_HARMONIC_TERMS];

/// Evaluate the five basis terms at day number `day`.
#[inline]
pub fn harmonic_terms(day: f64) -> Coefficients {
    let x = 2.0 * PI * day / YEAR_LENGTH_DAYS;
    [
        1.0,
        x.sin(),
        x.cos(),
        (2.0 * x).sin(),
        (2.0 * x).cos(),
    ]
}

/// Design matrix (`days.len() x 5`) of the harmonic model.
pub fn harmonic_design_matrix(days: &[f64]) -> DMatrix<f64> {
    let mut design = DMatrix::zeros(days.len(), N_HARMONIC_TERMS);
    for (i, &day) in days.iter().enumerate() {
        let terms = harmonic_terms(day);
        for k in 0..N_HARMONIC_TERMS {
            design[(i, k)] = terms[k];
        }
    }
    design
}

/// Evaluate a harmonic model at day number `day`.
#[inline]
pub fn evaluate(coefficients: &Coefficients, day: f64) -> f64 {
    let terms = harmonic_terms(day);
    terms
        .iter()
        .zip(coefficients.iter())
        .map(|(t, c)| t * c)
        .sum()
}
