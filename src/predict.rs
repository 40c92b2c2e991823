//! Vegetation index prediction from the fitted harmonic models.
//!
//! A prediction from an untrained pixel (all-zero coefficients) is `0.0` and
//! carries no meaning; callers gate on the first detection index before using
//! it.

#[cfg(feature = "parallel")]
use rayon::iter::ParallelIterator;

use crate::basis::{harmonic_terms, Coefficients, N_HARMONIC_TERMS};
use crate::iter_maybe_parallel;
use crate::matrix::PixelMatrix;

/// Coefficients of pixel `p` from a `n_pixels x 5` coefficient matrix.
#[inline]
pub fn pixel_coefficients(coefficients: &PixelMatrix<f64>, p: usize) -> Coefficients {
    let mut coefs = [0.0; N_HARMONIC_TERMS];
    for k in 0..N_HARMONIC_TERMS {
        coefs[k] = coefficients[(p, k)];
    }
    coefs
}

/// Predicted value of pixel `p` given the precomputed basis terms of a date.
#[inline]
pub fn predict_pixel(coefficients: &PixelMatrix<f64>, p: usize, terms: &Coefficients) -> f64 {
    let mut value = 0.0;
    for k in 0..N_HARMONIC_TERMS {
        value += coefficients[(p, k)] * terms[k];
    }
    value
}

/// Predicted value of every pixel at day number `day`.
pub fn predict_date(coefficients: &PixelMatrix<f64>, day: f64) -> Vec<f64> {
    let terms = harmonic_terms(day);
    iter_maybe_parallel!(0..coefficients.nrows())
        .map(|p| predict_pixel(coefficients, p, &terms))
        .collect()
}

/// Predicted stack (`n_pixels x days.len()`) for arbitrary day numbers.
pub fn predict_series(coefficients: &PixelMatrix<f64>, days: &[f64]) -> PixelMatrix<f64> {
    let mut predicted = PixelMatrix::with_rows(coefficients.nrows());
    for &day in days {
        predicted.push_column(&predict_date(coefficients, day));
    }
    predicted
}
