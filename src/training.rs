//! Training window selection.
//!
//! Each pixel is trained on the dates before its first detection date `D0`.
//! The window ends no earlier than the last date before
//! `min_last_date_training`, and is extended date by date until the pixel has
//! `nb_min_date` valid observations, but never beyond `max_last_date_training`.
//! A pixel that cannot gather enough observations gets the sentinel `D0 = 0`
//! and takes no part in detection.

use chrono::NaiveDate;
#[cfg(feature = "parallel")]
use rayon::iter::ParallelIterator;

use crate::dates::DateAxis;
use crate::iter_maybe_parallel;
use crate::matrix::PixelMatrix;

/// Sentinel first-detection index of pixels without a model.
pub const UNTRAINED: u32 = 0;

/// Date-axis bounds of the training window shared by all pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrainingWindow {
    /// Last date index that is always part of training (`None` when no date
    /// precedes `min_last_date_training`).
    pub min_end: Option<usize>,
    /// Last date index that may be part of training (`None` when no date is on
    /// or before `max_last_date_training`).
    pub max_end: Option<usize>,
    /// The history stops before `min_last_date_training`, so `min_end` was
    /// clamped to the last available date.
    pub clamped: bool,
    /// The history reaches `max_last_date_training`: no later date can change
    /// any pixel's window.
    pub complete: bool,
}

impl TrainingWindow {
    /// Compute the window bounds on `dates`.
    pub fn from_dates(
        dates: &DateAxis,
        min_last_date_training: NaiveDate,
        max_last_date_training: NaiveDate,
    ) -> Self {
        let clamped = !dates.covers(min_last_date_training);
        Self {
            min_end: dates.count_before(min_last_date_training).checked_sub(1),
            max_end: dates.count_until(max_last_date_training).checked_sub(1),
            clamped,
            complete: dates.covers(max_last_date_training),
        }
    }

    /// First detection index of one pixel given its validity along the date
    /// axis (`true` = usable observation).
    ///
    /// Returns [`UNTRAINED`] when the pixel's `nb_min_date`-th valid
    /// observation does not occur within `max_end`.
    pub fn first_detection_index<I>(&self, validity: I, nb_min_date: usize) -> u32
    where
        I: IntoIterator<Item = bool>,
    {
        let Some(max_end) = self.max_end else {
            return UNTRAINED;
        };
        let mut n_valid = 0;
        for (t, valid) in validity.into_iter().enumerate().take(max_end + 1) {
            if valid {
                n_valid += 1;
                if n_valid >= nb_min_date {
                    let last_training = self.min_end.map_or(t, |min_end| min_end.max(t));
                    return (last_training + 1) as u32;
                }
            }
        }
        UNTRAINED
    }
}

/// First detection index of every pixel.
///
/// Pixels outside the area of interest are [`UNTRAINED`]. Observations are
/// usable when not masked and finite.
pub fn select_first_detection_dates(
    vi: &PixelMatrix<f64>,
    mask: &PixelMatrix<bool>,
    in_scope: &[bool],
    window: &TrainingWindow,
    nb_min_date: usize,
) -> Vec<u32> {
    let n_dates = mask.ncols();
    iter_maybe_parallel!(0..mask.nrows())
        .map(|p| {
            if !in_scope[p] {
                return UNTRAINED;
            }
            window.first_detection_index(
                (0..n_dates).map(|t| !mask[(p, t)] && vi[(p, t)].is_finite()),
                nb_min_date,
            )
        })
        .collect()
}

/// Observations used to train each pixel: valid and strictly before its
/// first detection index.
pub fn training_validity(mask: &PixelMatrix<bool>, first_detection: &[u32]) -> PixelMatrix<bool> {
    let (n_pixels, n_dates) = mask.shape();
    let mut valid = PixelMatrix::filled(n_pixels, n_dates, false);
    for t in 0..n_dates {
        for p in 0..n_pixels {
            valid[(p, t)] = !mask[(p, t)] && t < first_detection[p] as usize;
        }
    }
    valid
}
