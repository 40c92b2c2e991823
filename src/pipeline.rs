//! Incremental detection over a vegetation index stack.
//!
//! A [`TimeSeries`] holds the full acquisition history of a raster: dates,
//! vegetation index values and validity masks. [`DiebackDetector::run`]
//! brings a [`DetectionState`] up to date with it:
//!
//! 1. Resume the previous state, or start fresh when there is none or when the
//!    detection parameters changed.
//! 2. While the history does not yet reach `max_last_date_training`, (re)train
//!    every pixel whose first detection date has not been consumed yet.
//! 3. Process every unprocessed date in increasing order, updating the
//!    per-pixel dieback and stress state in parallel within a date.
//!
//! Running on a history in one go or in several increments produces the same
//! state.

use std::collections::HashMap;

use chrono::NaiveDate;
#[cfg(feature = "parallel")]
use rayon::iter::{IndexedParallelIterator, ParallelIterator};
use serde::Serialize;

use crate::basis::{harmonic_design_matrix, harmonic_terms, N_HARMONIC_TERMS};
use crate::config::{DetectionConfig, DetectionParams};
use crate::dates::{day_number, parse_date, DateAxis};
use crate::dieback::{PixelDieback, Transition};
use crate::error::{Error, Result};
use crate::fit::fit_training_windows;
use crate::matrix::PixelMatrix;
use crate::predict::predict_pixel;
use crate::slice_maybe_parallel_mut;
use crate::state::DetectionState;
use crate::stress::{PixelStress, StressEvent};
use crate::training::{select_first_detection_dates, TrainingWindow, UNTRAINED};

/// Vegetation index stack of a raster.
///
/// Pixels are flattened row-major (`pixel = row * cols + col`). Non-finite
/// values are stored as masked.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries {
    rows: usize,
    cols: usize,
    dates: DateAxis,
    vi: PixelMatrix<f64>,
    mask: PixelMatrix<bool>,
    in_scope: Vec<bool>,
}

impl TimeSeries {
    /// Empty stack over a `rows x cols` raster. `in_scope` is the static area
    /// of interest, one flag per pixel.
    pub fn new(rows: usize, cols: usize, in_scope: Vec<bool>) -> Result<Self> {
        let n_pixels = rows * cols;
        if in_scope.len() != n_pixels {
            return Err(Error::shape("in_scope", n_pixels, in_scope.len()));
        }
        Ok(Self {
            rows,
            cols,
            dates: DateAxis::new(),
            vi: PixelMatrix::with_rows(n_pixels),
            mask: PixelMatrix::with_rows(n_pixels),
            in_scope,
        })
    }

    /// Append an acquisition given as an ISO `YYYY-MM-DD` date.
    pub fn push_date(&mut self, date: &str, vi: &[f64], mask: &[bool]) -> Result<()> {
        self.push(parse_date(date)?, vi, mask)
    }

    /// Append an acquisition. Dates must be strictly increasing; `mask = true`
    /// marks an invalid observation.
    pub fn push(&mut self, date: NaiveDate, vi: &[f64], mask: &[bool]) -> Result<()> {
        let n_pixels = self.n_pixels();
        if vi.len() != n_pixels {
            return Err(Error::shape("vegetation index", n_pixels, vi.len()));
        }
        if mask.len() != n_pixels {
            return Err(Error::shape("mask", n_pixels, mask.len()));
        }
        self.dates.push(date)?;
        let mask: Vec<bool> = vi
            .iter()
            .zip(mask)
            .map(|(v, &m)| m || !v.is_finite())
            .collect();
        self.vi.push_column(vi);
        self.mask.push_column(&mask);
        Ok(())
    }

    /// Stack restricted to its first `n_dates` dates.
    pub fn truncated(&self, n_dates: usize) -> Self {
        let dates = self.dates.prefix(n_dates);
        let mut vi = PixelMatrix::with_rows(self.n_pixels());
        let mut mask = PixelMatrix::with_rows(self.n_pixels());
        for t in 0..dates.len() {
            vi.push_column(self.vi.column(t));
            mask.push_column(self.mask.column(t));
        }
        Self {
            rows: self.rows,
            cols: self.cols,
            dates,
            vi,
            mask,
            in_scope: self.in_scope.clone(),
        }
    }

    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    #[inline]
    pub fn n_pixels(&self) -> usize {
        self.rows * self.cols
    }

    #[inline]
    pub fn n_dates(&self) -> usize {
        self.dates.len()
    }

    pub fn dates(&self) -> &DateAxis {
        &self.dates
    }

    pub fn vi(&self) -> &PixelMatrix<f64> {
        &self.vi
    }

    pub fn mask(&self) -> &PixelMatrix<bool> {
        &self.mask
    }

    pub fn in_scope(&self) -> &[bool] {
        &self.in_scope
    }
}

/// Counters reported by a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Dates processed for the first time.
    pub new_dates: usize,
    /// Pixels (re)trained during this run that obtained a model.
    pub retrained_pixels: usize,
    /// In-scope pixels without a model after the run.
    pub pixels_without_model: usize,
    /// Confirmed onsets during this run, replays included.
    pub onsets: usize,
    /// Confirmed recoveries during this run, replays included.
    pub recoveries: usize,
    pub pixels_newly_excluded: usize,
    /// Pixels confirmed unhealthy after the run.
    pub pixels_unhealthy: usize,
    /// Pixels confirmed unhealthy after the run that were not before it.
    pub pixels_newly_unhealthy: usize,
    /// Whether the training windows are final.
    pub training_final: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum DateEvent {
    Skipped,
    Observed,
    Onset,
    Recovery,
    Excluded,
}

impl DateEvent {
    fn from_update(transition: Transition, stress: StressEvent) -> Self {
        match (transition, stress) {
            (_, StressEvent::Excluded) => Self::Excluded,
            (Transition::Onset, _) => Self::Onset,
            (Transition::Recovery, _) => Self::Recovery,
            (Transition::None, _) => Self::Observed,
        }
    }
}

/// Runs dieback detection with fixed parameters.
#[derive(Debug, Clone)]
pub struct DiebackDetector {
    params: DetectionParams,
}

impl DiebackDetector {
    pub fn new(params: DetectionParams) -> Self {
        Self { params }
    }

    /// Validate a configuration and build a detector from it.
    pub fn from_config(config: &DetectionConfig) -> Result<Self> {
        Ok(Self::new(config.validate()?))
    }

    pub fn params(&self) -> &DetectionParams {
        &self.params
    }

    /// Bring `previous` (or a fresh state) up to date with `stack`.
    ///
    /// The returned state covers every date of `stack`. A `previous` state that
    /// does not belong to `stack` is rejected before any pixel is touched.
    pub fn run(
        &self,
        stack: &TimeSeries,
        previous: Option<DetectionState>,
    ) -> Result<(DetectionState, RunSummary)> {
        let mut state = self.resume(stack, previous)?;
        let processed = state.next_date_index();
        let was_unhealthy: Vec<bool> = state.dieback.iter().map(|d| d.unhealthy).collect();
        let mut summary = RunSummary {
            new_dates: stack.n_dates() - processed,
            ..Default::default()
        };

        let mut replay_from = vec![processed as u32; stack.n_pixels()];
        if !state.training_final {
            let retrained = self.train(stack, &mut state);
            for (p, &r) in retrained.iter().enumerate() {
                if r {
                    replay_from[p] = 0;
                    summary.retrained_pixels += 1;
                }
            }
        }

        let start = (0..stack.n_pixels())
            .filter(|&p| state.in_scope[p] && state.first_detection[p] != UNTRAINED)
            .map(|p| replay_from[p].max(state.first_detection[p]) as usize)
            .min()
            .unwrap_or(stack.n_dates());

        let mut tally: HashMap<DateEvent, usize> = HashMap::new();
        for t in start..stack.n_dates() {
            let events = self.process_date(stack, &mut state, t, &replay_from);
            tracing::debug!(
                date_index = t,
                updated = events.iter().filter(|&&e| e != DateEvent::Skipped).count(),
                "date processed"
            );
            for event in events {
                *tally.entry(event).or_insert(0) += 1;
            }
        }
        state.dates = stack.dates().clone();

        summary.onsets = tally.get(&DateEvent::Onset).copied().unwrap_or(0);
        summary.recoveries = tally.get(&DateEvent::Recovery).copied().unwrap_or(0);
        summary.pixels_newly_excluded = tally.get(&DateEvent::Excluded).copied().unwrap_or(0);
        summary.pixels_without_model = state.pixels_without_model();
        summary.pixels_unhealthy = state.pixels_unhealthy();
        summary.pixels_newly_unhealthy = (0..stack.n_pixels())
            .filter(|&p| {
                state.dieback[p].unhealthy && !was_unhealthy[p] && !state.is_excluded(p)
            })
            .count();
        summary.training_final = state.training_final;

        if summary.pixels_newly_excluded > 0 {
            tracing::warn!(
                pixels = summary.pixels_newly_excluded,
                max_nb_stress_periods = self.params.max_nb_stress_periods,
                "too many stress periods, pixels excluded from detection"
            );
        }

        tracing::info!(
            new_dates = summary.new_dates,
            retrained = summary.retrained_pixels,
            without_model = summary.pixels_without_model,
            onsets = summary.onsets,
            recoveries = summary.recoveries,
            newly_excluded = summary.pixels_newly_excluded,
            unhealthy = summary.pixels_unhealthy,
            newly_unhealthy = summary.pixels_newly_unhealthy,
            "detection run complete"
        );
        Ok((state, summary))
    }

    fn resume(
        &self,
        stack: &TimeSeries,
        previous: Option<DetectionState>,
    ) -> Result<DetectionState> {
        let fresh = || {
            DetectionState::new(
                stack.rows,
                stack.cols,
                stack.in_scope.clone(),
                self.params.clone(),
            )
        };
        let Some(state) = previous else {
            return Ok(fresh());
        };

        state.check_consistency()?;
        if (state.rows, state.cols) != stack.shape() {
            return Err(Error::HistoryMismatch(format!(
                "state is {}x{}, stack is {}x{}",
                state.rows, state.cols, stack.rows, stack.cols
            )));
        }
        if state.in_scope != stack.in_scope {
            return Err(Error::HistoryMismatch(
                "area of interest differs from the persisted one".to_string(),
            ));
        }
        if !state.dates.is_prefix_of(stack.dates()) {
            return Err(Error::HistoryMismatch(format!(
                "the {} processed dates are not a prefix of the stack dates",
                state.dates.len()
            )));
        }
        if state.params != self.params {
            tracing::info!("detection parameters changed, restarting from the first date");
            return Ok(fresh());
        }
        tracing::debug!(processed = state.dates.len(), "resuming detection state");
        Ok(state)
    }

    /// (Re)train every pixel whose first detection date has not been consumed.
    /// Returns, per pixel, whether it was trained by this call and got a model.
    fn train(&self, stack: &TimeSeries, state: &mut DetectionState) -> Vec<bool> {
        let params = &self.params;
        let n_pixels = stack.n_pixels();
        let processed = state.next_date_index();

        let window = TrainingWindow::from_dates(
            stack.dates(),
            params.min_last_date_training,
            params.max_last_date_training,
        );
        if window.clamped {
            tracing::warn!(
                min_last_date_training = %params.min_last_date_training,
                last_date = ?stack.dates().last(),
                "history ends before min_last_date_training, training on all available dates"
            );
        }

        let selected: Vec<bool> = (0..n_pixels)
            .map(|p| {
                let d0 = state.first_detection[p];
                state.in_scope[p]
                    && !state.is_excluded(p)
                    && (d0 == UNTRAINED || d0 as usize >= processed)
            })
            .collect();
        let candidates = select_first_detection_dates(
            stack.vi(),
            stack.mask(),
            &selected,
            &window,
            params.nb_min_date,
        );
        let design = harmonic_design_matrix(&stack.dates().day_numbers(params.epoch));
        let fits = fit_training_windows(
            &design,
            stack.vi(),
            stack.mask(),
            &candidates,
            &selected,
            params.fit_options(),
        );

        let mut retrained = vec![false; n_pixels];
        let mut failed_fits = 0;
        for p in (0..n_pixels).filter(|&p| selected[p]) {
            state.dieback[p] = PixelDieback::default();
            if let Some(stress) = state.stress.as_mut() {
                stress[p] = PixelStress::default();
            }
            match fits[p] {
                Some(coefs) => {
                    state.coefficients.set_row(p, &coefs);
                    state.first_detection[p] = candidates[p];
                    retrained[p] = true;
                }
                None => {
                    state.coefficients.set_row(p, &[0.0; N_HARMONIC_TERMS]);
                    state.first_detection[p] = UNTRAINED;
                    if candidates[p] != UNTRAINED {
                        failed_fits += 1;
                    }
                }
            }
        }
        state.training_final = window.complete;

        let insufficient = (0..n_pixels)
            .filter(|&p| selected[p] && candidates[p] == UNTRAINED)
            .count();
        if insufficient > 0 {
            tracing::warn!(
                pixels = insufficient,
                nb_min_date = params.nb_min_date,
                "not enough valid training dates, pixels left without model"
            );
        }
        if failed_fits > 0 {
            tracing::warn!(
                pixels = failed_fits,
                "harmonic fit failed, pixels left without model"
            );
        }
        tracing::info!(
            selected = selected.iter().filter(|&&s| s).count(),
            trained = retrained.iter().filter(|&&r| r).count(),
            final_window = window.complete,
            "training windows fitted"
        );
        retrained
    }

    /// Update every eligible pixel with date `t`.
    fn process_date(
        &self,
        stack: &TimeSeries,
        state: &mut DetectionState,
        t: usize,
        replay_from: &[u32],
    ) -> Vec<DateEvent> {
        let params = &self.params;
        let detector = params.detector();
        let day = stack
            .dates()
            .get(t)
            .map_or(0.0, |date| day_number(date, params.epoch) as f64);
        let terms = harmonic_terms(day);
        let vi = stack.vi().column(t);
        let mask = stack.mask().column(t);
        let date_index = t as u32;

        let DetectionState {
            coefficients,
            first_detection,
            in_scope,
            dieback,
            stress,
            ..
        } = state;
        let (coefficients, first_detection, in_scope) =
            (&*coefficients, &*first_detection, &*in_scope);
        let eligible = |p: usize| {
            let d0 = first_detection[p];
            in_scope[p]
                && d0 != UNTRAINED
                && date_index >= d0.max(replay_from[p])
                && !mask[p]
        };

        match (stress.as_mut(), params.stress_index_mode) {
            (Some(stress), Some(mode)) => {
                let max_periods = params.max_nb_stress_periods;
                slice_maybe_parallel_mut!(dieback)
                    .zip(slice_maybe_parallel_mut!(stress))
                    .enumerate()
                    .map(|(p, (dieback, stress))| {
                        if stress.excluded || !eligible(p) {
                            return DateEvent::Skipped;
                        }
                        let assessment =
                            detector.assess(vi[p], predict_pixel(coefficients, p, &terms));
                        let transition = dieback.observe(assessment.anomaly, date_index);
                        let event = stress.observe(
                            dieback,
                            transition,
                            assessment.difference,
                            date_index,
                            mode,
                            max_periods,
                        );
                        DateEvent::from_update(transition, event)
                    })
                    .collect()
            }
            _ => slice_maybe_parallel_mut!(dieback)
                .enumerate()
                .map(|(p, dieback)| {
                    if !eligible(p) {
                        return DateEvent::Skipped;
                    }
                    let predicted = predict_pixel(coefficients, p, &terms);
                    let anomaly = detector.is_anomaly(vi[p], predicted);
                    let transition = dieback.observe(anomaly, date_index);
                    DateEvent::from_update(transition, StressEvent::None)
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basis::evaluate;
    use crate::dates::format_date;
    use crate::results::{DetectionResults, PixelStatus};
    use std::sync::{Arc, Mutex};

    const MODEL: [f64; 5] = [0.6, 0.05, -0.04, 0.01, 0.01];

    fn params(stress_mode: &str) -> DetectionParams {
        DetectionConfig {
            nb_min_date: 10,
            min_last_date_training: "2018-01-01".to_string(),
            max_last_date_training: "2018-06-01".to_string(),
            stress_index_mode: stress_mode.to_string(),
            max_nb_stress_periods: 2,
            ..Default::default()
        }
        .validate()
        .unwrap()
    }

    /// 2x2 raster, dates every 10 days from 2017-06-01. Pixel 0 follows the
    /// model, pixel 1 is shifted by `shift(t)`, pixel 2 is cloudy until date
    /// 40, pixel 3 is out of scope.
    fn stack_with(n_dates: usize, shift: impl Fn(usize) -> f64) -> TimeSeries {
        let epoch = parse_date("2015-01-01").unwrap();
        let start = parse_date("2017-06-01").unwrap();
        let mut ts = TimeSeries::new(2, 2, vec![true, true, true, false]).unwrap();
        for t in 0..n_dates {
            let date = start + chrono::Duration::days(10 * t as i64);
            let base = evaluate(&MODEL, day_number(date, epoch) as f64);
            let vi = [base, base + shift(t), base, base];
            let mask = [false, false, t < 40, false];
            ts.push_date(&format_date(date), &vi, &mask).unwrap();
        }
        ts
    }

    /// Pixel 1 jumps by +0.3 from `break_at`.
    fn stack(n_dates: usize, break_at: usize) -> TimeSeries {
        stack_with(n_dates, |t| if t >= break_at { 0.3 } else { 0.0 })
    }

    /// Pixel 1 alternates 6 shifted and 6 normal dates from date 40: onsets at
    /// dates 42, 54 and 66, recoveries at 48 and 60.
    fn oscillating_stack(n_dates: usize) -> TimeSeries {
        stack_with(n_dates, |t| {
            if t >= 40 && (t - 40) % 12 < 6 {
                0.3
            } else {
                0.0
            }
        })
    }

    /// Collects formatted log lines emitted on the current thread.
    #[derive(Clone, Default)]
    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl LogBuffer {
        fn capture<R>(&self, f: impl FnOnce() -> R) -> R {
            let writer = self.clone();
            let subscriber = tracing_subscriber::fmt()
                .with_max_level(tracing::Level::WARN)
                .with_ansi(false)
                .with_writer(move || writer.clone())
                .finish();
            tracing::subscriber::with_default(subscriber, f)
        }

        fn warnings(&self) -> Vec<String> {
            String::from_utf8_lossy(&self.0.lock().unwrap())
                .lines()
                .filter(|line| line.contains("WARN"))
                .map(str::to_string)
                .collect()
        }
    }

    #[test]
    fn test_push_checks_shape_and_order() {
        let mut ts = TimeSeries::new(1, 2, vec![true, true]).unwrap();
        assert!(matches!(
            ts.push_date("2018-01-01", &[0.1], &[false, false]),
            Err(Error::ShapeMismatch { .. })
        ));
        ts.push_date("2018-01-01", &[0.1, f64::NAN], &[false, false])
            .unwrap();
        assert!(ts.mask()[(1, 0)]);
        assert!(matches!(
            ts.push_date("2018-01-01", &[0.1, 0.2], &[false, false]),
            Err(Error::DateOrder { .. })
        ));
        assert_eq!(ts.n_dates(), 1);
        assert!(TimeSeries::new(2, 2, vec![true; 3]).is_err());
    }

    #[test]
    fn test_full_run_detects_break() {
        let ts = stack(60, 40);
        let detector = DiebackDetector::new(params("mean"));
        let (state, summary) = detector.run(&ts, None).unwrap();

        assert_eq!(state.next_date_index(), 60);
        assert!(state.training_final);
        assert!(!state.dieback[0].unhealthy);
        assert!(state.dieback[1].unhealthy);
        assert_eq!(state.dieback[1].first_date, 40);
        assert_eq!(state.first_detection[2], UNTRAINED);
        assert_eq!(state.first_detection[3], UNTRAINED);
        assert_eq!(summary.new_dates, 60);
        assert_eq!(summary.pixels_unhealthy, 1);
        assert_eq!(summary.pixels_without_model, 1);
        assert_eq!(summary.onsets, 1);
        assert_eq!(summary.pixels_newly_unhealthy, 1);
    }

    #[test]
    fn test_resume_matches_single_run() {
        let full = stack(60, 40);
        let detector = DiebackDetector::new(params("weighted_mean"));
        let (expected, _) = detector.run(&full, None).unwrap();

        for split in [5, 20, 25, 41, 59] {
            let (first, _) = detector.run(&full.truncated(split), None).unwrap();
            let (resumed, summary) = detector.run(&full, Some(first)).unwrap();
            assert_eq!(summary.new_dates, 60 - split);
            assert_eq!(resumed, expected, "split at {}", split);
        }
    }

    #[test]
    fn test_rerun_without_new_dates_is_noop() {
        let ts = stack(60, 40);
        let detector = DiebackDetector::new(params("mean"));
        let (state, _) = detector.run(&ts, None).unwrap();
        let (again, summary) = detector.run(&ts, Some(state.clone())).unwrap();
        assert_eq!(again, state);
        assert_eq!(summary.new_dates, 0);
        assert_eq!(summary.onsets, 0);
    }

    #[test]
    fn test_history_mismatch() {
        let detector = DiebackDetector::new(params("none"));
        let (state, _) = detector.run(&stack(30, 100), None).unwrap();

        let other = TimeSeries::new(1, 4, vec![true; 4]).unwrap();
        assert!(matches!(
            detector.run(&other, Some(state.clone())),
            Err(Error::HistoryMismatch(_))
        ));
        let shorter = stack(20, 100);
        assert!(matches!(
            detector.run(&shorter, Some(state)),
            Err(Error::HistoryMismatch(_))
        ));
    }

    #[test]
    fn test_changed_params_restart() {
        let ts = stack(60, 40);
        let (state, _) = DiebackDetector::new(params("none")).run(&ts, None).unwrap();
        assert!(state.stress.is_none());

        let detector = DiebackDetector::new(params("mean"));
        let (restarted, summary) = detector.run(&ts, Some(state)).unwrap();
        let (fresh, _) = detector.run(&ts, None).unwrap();
        assert_eq!(restarted, fresh);
        assert_eq!(summary.new_dates, 60);
    }

    #[test]
    fn test_too_many_stress_periods_exclude_pixel() {
        let ts = oscillating_stack(100);
        let detector = DiebackDetector::new(params("mean"));
        let (state, summary) = detector.run(&ts, None).unwrap();

        assert_eq!(summary.pixels_newly_excluded, 1);
        let stress = &state.stress.as_ref().unwrap()[1];
        assert!(stress.excluded);
        assert_eq!(stress.nb_periods, 3);
        assert_eq!(stress.periods.len(), 2);
        assert!(state.is_excluded(1));
        assert_eq!(state.valid_area(), vec![true, false, true, false]);

        // excluded at date 66; later dates leave the pixel untouched
        let (at_exclusion, _) = detector.run(&ts.truncated(67), None).unwrap();
        assert!(at_exclusion.is_excluded(1));
        assert_eq!(state.dieback[1], at_exclusion.dieback[1]);
        assert_eq!(*stress, at_exclusion.stress.as_ref().unwrap()[1]);
        assert!(state.dieback[1].unhealthy);

        let results = DetectionResults::from_state(&state).unwrap();
        assert_eq!(results.statuses[1], PixelStatus::Excluded);
        assert_eq!(results.counts().excluded, 1);
    }

    #[test]
    fn test_exclusion_survives_resume() {
        let ts = oscillating_stack(100);
        let detector = DiebackDetector::new(params("weighted_mean"));
        let (expected, _) = detector.run(&ts, None).unwrap();

        for split in [41, 50, 66, 67, 80] {
            let (first, first_summary) = detector.run(&ts.truncated(split), None).unwrap();
            let (resumed, summary) = detector.run(&ts, Some(first)).unwrap();
            assert_eq!(
                first_summary.pixels_newly_excluded + summary.pixels_newly_excluded,
                1,
                "split at {}",
                split
            );
            assert_eq!(resumed, expected, "split at {}", split);
        }
    }

    #[test]
    fn test_warns_about_pixels_without_model_and_exclusions() {
        let logs = LogBuffer::default();
        let detector = DiebackDetector::new(params("mean"));
        let (_, summary) = logs
            .capture(|| detector.run(&oscillating_stack(100), None))
            .unwrap();
        assert_eq!(summary.pixels_without_model, 1);

        let warnings = logs.warnings();
        assert!(warnings
            .iter()
            .any(|w| w.contains("not enough valid training dates") && w.contains("pixels=1")));
        assert!(warnings
            .iter()
            .any(|w| w.contains("too many stress periods") && w.contains("pixels=1")));
    }
}
