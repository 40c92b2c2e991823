//! Per-pixel classification snapshot of a detection state.
//!
//! [`DetectionResults`] resolves date indices to calendar dates and is what
//! raster and vector exporters consume.

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::state::DetectionState;

/// Classification of one pixel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PixelStatus {
    OutOfScope,
    /// Not enough valid observations to train a model.
    NoModel,
    /// Too many stress periods; results are not meaningful.
    Excluded,
    Healthy,
    /// Confirmed dieback, with the date of its first anomaly and, when stress
    /// tracking is enabled, the stress index of the ongoing period.
    Dieback {
        first_date: NaiveDate,
        stress_index: Option<f64>,
    },
}

/// A completed stress period with calendar dates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PeriodRecord {
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
    pub nb_dates: u32,
    pub stress_index: f64,
}

/// Number of pixels in each class.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub out_of_scope: usize,
    pub no_model: usize,
    pub excluded: usize,
    pub healthy: usize,
    pub dieback: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetectionResults {
    pub rows: usize,
    pub cols: usize,
    /// Last processed date.
    pub last_date: Option<NaiveDate>,
    /// One status per pixel, row-major.
    pub statuses: Vec<PixelStatus>,
    /// Completed stress periods per pixel, oldest first.
    pub periods: Vec<Vec<PeriodRecord>>,
}

impl DetectionResults {
    pub fn from_state(state: &DetectionState) -> Result<Self> {
        let date = |index: u32| {
            state.dates.get(index as usize).ok_or_else(|| {
                Error::HistoryMismatch(format!(
                    "date index {} beyond the {} processed dates",
                    index,
                    state.dates.len()
                ))
            })
        };

        let mode = state.params.stress_index_mode;
        let mut statuses = Vec::with_capacity(state.n_pixels());
        let mut periods = Vec::with_capacity(state.n_pixels());
        for p in 0..state.n_pixels() {
            let stress = state.stress.as_ref().map(|s| &s[p]);
            let dieback = &state.dieback[p];
            let status = if !state.in_scope[p] {
                PixelStatus::OutOfScope
            } else if !state.is_trained(p) {
                PixelStatus::NoModel
            } else if state.is_excluded(p) {
                PixelStatus::Excluded
            } else if dieback.unhealthy {
                PixelStatus::Dieback {
                    first_date: date(dieback.first_date)?,
                    stress_index: stress
                        .zip(mode)
                        .and_then(|(s, mode)| s.current_index(dieback, mode)),
                }
            } else {
                PixelStatus::Healthy
            };
            statuses.push(status);

            let mut records = Vec::new();
            for period in stress.map(|s| s.periods.as_slice()).unwrap_or_default() {
                records.push(PeriodRecord {
                    first_date: date(period.first_date)?,
                    last_date: date(period.last_date)?,
                    nb_dates: period.nb_dates,
                    stress_index: period.stress_index,
                });
            }
            periods.push(records);
        }

        Ok(Self {
            rows: state.rows,
            cols: state.cols,
            last_date: state.dates.last(),
            statuses,
            periods,
        })
    }

    /// Status of the pixel at `(row, col)`.
    pub fn status_at(&self, row: usize, col: usize) -> Option<&PixelStatus> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        self.statuses.get(row * self.cols + col)
    }

    pub fn counts(&self) -> StatusCounts {
        let mut counts = StatusCounts::default();
        for status in &self.statuses {
            match status {
                PixelStatus::OutOfScope => counts.out_of_scope += 1,
                PixelStatus::NoModel => counts.no_model += 1,
                PixelStatus::Excluded => counts.excluded += 1,
                PixelStatus::Healthy => counts.healthy += 1,
                PixelStatus::Dieback { .. } => counts.dieback += 1,
            }
        }
        counts
    }

    /// `true` for pixels in confirmed dieback.
    pub fn dieback_mask(&self) -> Vec<bool> {
        self.statuses
            .iter()
            .map(|s| matches!(s, PixelStatus::Dieback { .. }))
            .collect()
    }
}
