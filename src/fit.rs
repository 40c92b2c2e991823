//! Censored least squares fitting of the harmonic model.
//!
//! For each pixel we solve
//!
//! ```text
//! argmin_P || M ⊙ (A·P − VI) ||²
//! ```
//!
//! where `A` is the harmonic design matrix restricted to the pixel's training
//! window and `M` drops masked observations. The problem is formed as the 5×5
//! normal equations `AᵀMA·P = AᵀM·VI`, accumulated only over valid rows, so the
//! batched solve is exactly the per-pixel masked OLS solution. Pixels are
//! solved independently and in parallel.

use nalgebra::{DMatrix, SMatrix, SVector};
#[cfg(feature = "parallel")]
use rayon::iter::ParallelIterator;

use crate::basis::{Coefficients, N_HARMONIC_TERMS};
use crate::iter_maybe_parallel;
use crate::matrix::PixelMatrix;

type NormalMatrix = SMatrix<f64, N_HARMONIC_TERMS, N_HARMONIC_TERMS>;
type NormalVector = SVector<f64, N_HARMONIC_TERMS>;

/// Relative cutoff on singular values for the pseudo-inverse fallback.
const PINV_RELATIVE_EPS: f64 = 1e-10;

/// Fitting options.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FitOptions {
    /// When set, fit twice: the second fit drops valid rows whose absolute
    /// residual to the first fit exceeds this many vegetation index units.
    pub outlier_threshold: Option<f64>,
}

#[inline]
fn design_row(design: &DMatrix<f64>, i: usize) -> NormalVector {
    NormalVector::from_fn(|k, _| design[(i, k)])
}

/// Solve the normal equations, falling back to the pseudo-inverse when the
/// system is not positive definite. Returns `None` if no finite solution exists.
fn solve_normal_equations(ata: NormalMatrix, atb: NormalVector) -> Option<Coefficients> {
    let max_diag = ata.diagonal().iter().cloned().fold(0.0, f64::max);
    let well_conditioned = ata.cholesky().filter(|chol| {
        let l = chol.l_dirty();
        (0..N_HARMONIC_TERMS).all(|k| l[(k, k)] * l[(k, k)] > PINV_RELATIVE_EPS * max_diag)
    });
    let solution = match well_conditioned {
        Some(chol) => chol.solve(&atb),
        None => {
            let svd = ata.svd(true, true);
            let max_sv = svd.singular_values.iter().cloned().fold(0.0, f64::max);
            if max_sv <= 0.0 {
                return None;
            }
            svd.solve(&atb, PINV_RELATIVE_EPS * max_sv).ok()?
        }
    };
    if solution.iter().all(|c| c.is_finite()) {
        let mut coefs = [0.0; N_HARMONIC_TERMS];
        coefs.copy_from_slice(solution.as_slice());
        Some(coefs)
    } else {
        None
    }
}

/// Fit one pixel on the first `values.len()` rows of `design`.
///
/// Rows where `valid` is false (or the value is not finite) do not contribute.
/// Returns `None` when fewer than [`N_HARMONIC_TERMS`] rows are usable or the
/// solve fails.
pub fn fit_censored(design: &DMatrix<f64>, values: &[f64], valid: &[bool]) -> Option<Coefficients> {
    let rows = values.len().min(valid.len()).min(design.nrows());
    let mut ata = NormalMatrix::zeros();
    let mut atb = NormalVector::zeros();
    let mut n_valid = 0;

    for i in 0..rows {
        let y = values[i];
        if !valid[i] || !y.is_finite() {
            continue;
        }
        let a = design_row(design, i);
        ata += a * a.transpose();
        atb += a * y;
        n_valid += 1;
    }

    if n_valid < N_HARMONIC_TERMS {
        return None;
    }
    solve_normal_equations(ata, atb)
}

/// Two-pass fit: fit on all valid rows, drop rows whose absolute residual
/// exceeds `threshold`, refit on the remainder.
///
/// Exactly two passes are made; the second fit is returned even if it would
/// flag further outliers.
pub fn fit_censored_without_outliers(
    design: &DMatrix<f64>,
    values: &[f64],
    valid: &[bool],
    threshold: f64,
) -> Option<Coefficients> {
    let first = fit_censored(design, values, valid)?;
    let rows = values.len().min(valid.len()).min(design.nrows());
    let kept: Vec<bool> = (0..rows)
        .map(|i| {
            if !valid[i] || !values[i].is_finite() {
                return false;
            }
            let fitted = design_row(design, i).dot(&NormalVector::from(first));
            (values[i] - fitted).abs() <= threshold
        })
        .collect();
    fit_censored(design, &values[..rows], &kept)
}

/// Fit one pixel with the configured options.
pub fn fit_pixel(
    design: &DMatrix<f64>,
    values: &[f64],
    valid: &[bool],
    options: FitOptions,
) -> Option<Coefficients> {
    match options.outlier_threshold {
        Some(threshold) => fit_censored_without_outliers(design, values, valid, threshold),
        None => fit_censored(design, values, valid),
    }
}

/// Fit every selected pixel on its own training window.
///
/// * `design` - harmonic design matrix over all dates of the stack (`n_dates x 5`)
/// * `vi`, `mask` - stacks (`n_pixels x n_dates`), `mask = true` marks an invalid observation
/// * `first_detection` - per pixel, first date index eligible for detection; the
///   training window is `0..first_detection[p]`, and `0` means untrained
/// * `selected` - pixels to fit; others return `None`
pub fn fit_training_windows(
    design: &DMatrix<f64>,
    vi: &PixelMatrix<f64>,
    mask: &PixelMatrix<bool>,
    first_detection: &[u32],
    selected: &[bool],
    options: FitOptions,
) -> Vec<Option<Coefficients>> {
    let n_pixels = vi.nrows();
    iter_maybe_parallel!(0..n_pixels)
        .map(|p| {
            let end = (first_detection[p] as usize).min(vi.ncols());
            if !selected[p] || end == 0 {
                return None;
            }
            let values: Vec<f64> = (0..end).map(|t| vi[(p, t)]).collect();
            let valid: Vec<bool> = (0..end).map(|t| !mask[(p, t)]).collect();
            fit_pixel(design, &values, &valid, options)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basis::{evaluate, harmonic_design_matrix};

    const TRUE_COEFS: Coefficients = [0.6, 0.08, -0.05, 0.02, 0.01];

    fn days(n: usize, step: f64) -> Vec<f64> {
        (0..n).map(|i| i as f64 * step).collect()
    }

    fn exact_series(days: &[f64]) -> Vec<f64> {
        days.iter().map(|&d| evaluate(&TRUE_COEFS, d)).collect()
    }

    fn assert_coefs_close(actual: &Coefficients, expected: &Coefficients, tol: f64) {
        for k in 0..N_HARMONIC_TERMS {
            assert!(
                (actual[k] - expected[k]).abs() < tol,
                "coef {}: {} vs {}",
                k,
                actual[k],
                expected[k]
            );
        }
    }

    #[test]
    fn test_recovers_exact_model() {
        let d = days(40, 9.0);
        let design = harmonic_design_matrix(&d);
        let values = exact_series(&d);
        let valid = vec![true; d.len()];
        let coefs = fit_censored(&design, &values, &valid).unwrap();
        assert_coefs_close(&coefs, &TRUE_COEFS, 1e-9);
    }

    #[test]
    fn test_masked_values_do_not_change_fit() {
        let d = days(40, 9.0);
        let design = harmonic_design_matrix(&d);
        let mut values = exact_series(&d);
        let valid: Vec<bool> = (0..d.len()).map(|i| i % 3 != 0).collect();
        let before = fit_censored(&design, &values, &valid).unwrap();

        for i in (0..d.len()).step_by(3) {
            values[i] = 42.0;
        }
        values[3] = f64::NAN;
        let after = fit_censored(&design, &values, &valid).unwrap();
        assert_eq!(before, after);
        assert_coefs_close(&after, &TRUE_COEFS, 1e-9);
    }

    #[test]
    fn test_refit_is_deterministic() {
        let d = days(30, 11.0);
        let design = harmonic_design_matrix(&d);
        let values: Vec<f64> = exact_series(&d)
            .iter()
            .enumerate()
            .map(|(i, v)| v + 0.01 * (17.3 * i as f64).sin())
            .collect();
        let valid = vec![true; d.len()];
        let a = fit_censored(&design, &values, &valid).unwrap();
        let b = fit_censored(&design, &values, &valid).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_too_few_valid_rows() {
        let d = days(10, 20.0);
        let design = harmonic_design_matrix(&d);
        let values = exact_series(&d);
        let mut valid = vec![false; d.len()];
        for i in 0..4 {
            valid[i * 2] = true;
        }
        assert!(fit_censored(&design, &values, &valid).is_none());
        valid[9] = true;
        assert!(fit_censored(&design, &values, &valid).is_some());
    }

    #[test]
    fn test_rank_deficient_uses_pseudo_inverse() {
        // Five observations on the same day: only one direction is identifiable.
        let d = vec![100.0; 5];
        let design = harmonic_design_matrix(&d);
        let values = vec![0.7; 5];
        let valid = vec![true; 5];
        let coefs = fit_censored(&design, &values, &valid).unwrap();
        assert!(coefs.iter().all(|c| c.is_finite()));
        assert!((evaluate(&coefs, 100.0) - 0.7).abs() < 1e-6);
    }

    #[test]
    fn test_outlier_removal_two_passes() {
        let d = days(40, 9.0);
        let design = harmonic_design_matrix(&d);
        let mut values = exact_series(&d);
        values[12] += 0.5;
        values[25] -= 0.6;
        let valid = vec![true; d.len()];

        let plain = fit_censored(&design, &values, &valid).unwrap();
        let robust = fit_censored_without_outliers(&design, &values, &valid, 0.16).unwrap();
        let plain_err = (plain[0] - TRUE_COEFS[0]).abs();
        let robust_err = (robust[0] - TRUE_COEFS[0]).abs();
        assert!(robust_err < plain_err);
        assert_coefs_close(&robust, &TRUE_COEFS, 1e-9);

        let via_options = fit_pixel(
            &design,
            &values,
            &valid,
            FitOptions {
                outlier_threshold: Some(0.16),
            },
        )
        .unwrap();
        assert_eq!(via_options, robust);
    }

    #[test]
    fn test_outlier_removal_can_leave_too_few_rows() {
        let d = days(6, 30.0);
        let design = harmonic_design_matrix(&d);
        let mut values = exact_series(&d);
        values[2] += 1.0;
        values[4] -= 1.0;
        let valid = vec![true; 6];
        assert!(fit_censored_without_outliers(&design, &values, &valid, 1e-6).is_none());
    }

    #[test]
    fn test_batched_matches_per_pixel() {
        let n_dates = 36;
        let n_pixels = 4;
        let d = days(n_dates, 10.0);
        let design = harmonic_design_matrix(&d);

        let mut vi = PixelMatrix::zeros(n_pixels, n_dates);
        let mut mask = PixelMatrix::filled(n_pixels, n_dates, false);
        for p in 0..n_pixels {
            for t in 0..n_dates {
                vi[(p, t)] = evaluate(&TRUE_COEFS, d[t]) + 0.02 * ((p * 7 + t) as f64).sin();
                mask[(p, t)] = (p + t) % 4 == 0;
            }
        }
        let first_detection = vec![30, 20, 0, 36];
        let selected = vec![true, true, true, false];
        let batch = fit_training_windows(
            &design,
            &vi,
            &mask,
            &first_detection,
            &selected,
            FitOptions::default(),
        );

        assert!(batch[2].is_none());
        assert!(batch[3].is_none());
        for p in 0..2 {
            let end = first_detection[p] as usize;
            let values: Vec<f64> = (0..end).map(|t| vi[(p, t)]).collect();
            let valid: Vec<bool> = (0..end).map(|t| !mask[(p, t)]).collect();
            let single = fit_censored(&design, &values, &valid);
            assert_eq!(batch[p], single);
        }
    }
}
