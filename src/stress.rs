//! Stress index accumulation over confirmed dieback periods.
//!
//! While a pixel is confirmed unhealthy, the stress-oriented differences
//! between observation and prediction are summed; when it recovers, the sum is
//! turned into a stress index (mean, or mean weighted by the position of each
//! date in the period) and recorded as a [`StressPeriod`].
//!
//! Only dates at which the pixel is labelled unhealthy after the update are
//! accumulated: from the date that confirms the onset up to the date before
//! the one that confirms the recovery. A pixel that starts more than
//! `max_nb_stress_periods` periods is considered unstable and is permanently
//! excluded from detection.

use serde::{Deserialize, Serialize};

use crate::dieback::{PixelDieback, Transition};

/// How the differences of a period are aggregated into a stress index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StressIndexMode {
    /// Arithmetic mean of the differences.
    Mean,
    /// Mean weighted by the 1-based rank of each date in the period, so late
    /// dates weigh more.
    WeightedMean,
}

impl StressIndexMode {
    /// Parse a configuration value. `"none"` disables stress tracking and maps
    /// to `Ok(None)`; unknown values map to `Err(())`.
    #[allow(clippy::result_unit_err)]
    pub fn parse(value: &str) -> Result<Option<Self>, ()> {
        match value.trim().to_ascii_lowercase().as_str() {
            "mean" => Ok(Some(Self::Mean)),
            "weighted_mean" => Ok(Some(Self::WeightedMean)),
            "none" | "" => Ok(None),
            _ => Err(()),
        }
    }

    /// Weight of the `rank`-th date (1-based) of a period.
    #[inline]
    pub fn weight(self, rank: u32) -> f64 {
        match self {
            Self::Mean => 1.0,
            Self::WeightedMean => rank as f64,
        }
    }

    /// Sum of the weights of the first `nb_dates` dates of a period.
    #[inline]
    pub fn normalization(self, nb_dates: u32) -> f64 {
        let n = nb_dates as f64;
        match self {
            Self::Mean => n,
            Self::WeightedMean => n * (n + 1.0) / 2.0,
        }
    }

    /// Stress index from an accumulated weighted sum.
    #[inline]
    pub fn index(self, cum_diff: f64, nb_dates: u32) -> f64 {
        if nb_dates == 0 {
            return 0.0;
        }
        cum_diff / self.normalization(nb_dates)
    }
}

/// A completed dieback period.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StressPeriod {
    /// Date index of the first anomaly of the confirmed onset.
    pub first_date: u32,
    /// Date index of the last unhealthy date of the period.
    pub last_date: u32,
    /// Number of valid dates in the period.
    pub nb_dates: u32,
    pub stress_index: f64,
}

/// What a stress update did to the pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StressEvent {
    None,
    /// A period was closed and recorded.
    PeriodClosed,
    /// The pixel exceeded the allowed number of periods and is now excluded.
    Excluded,
}

/// Persistent stress accumulation state of one pixel.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PixelStress {
    /// Weighted sum of differences since the last confirmed onset.
    pub cum_diff: f64,
    /// Number of dates in `cum_diff`.
    pub nb_dates: u32,
    /// Date index of the last date added to `cum_diff`.
    pub last_date: u32,
    /// Number of periods started (confirmed onsets).
    pub nb_periods: u32,
    /// Completed periods, oldest first. Never longer than `max_nb_stress_periods`.
    pub periods: Vec<StressPeriod>,
    /// Excluded after too many periods; no longer updated.
    pub excluded: bool,
}

impl PixelStress {
    #[inline]
    fn accumulate(&mut self, difference: f64, date_index: u32, mode: StressIndexMode) {
        self.nb_dates += 1;
        self.cum_diff += mode.weight(self.nb_dates) * difference;
        self.last_date = date_index;
    }

    #[inline]
    fn reset_accumulation(&mut self) {
        self.cum_diff = 0.0;
        self.nb_dates = 0;
    }

    /// Stress index of the ongoing confirmed period, if any.
    pub fn current_index(&self, dieback: &PixelDieback, mode: StressIndexMode) -> Option<f64> {
        if !dieback.unhealthy || self.nb_dates == 0 {
            return None;
        }
        Some(mode.index(self.cum_diff, self.nb_dates))
    }

    /// Update after `dieback` consumed a valid observation at `date_index`
    /// producing `transition`. `difference` is the stress-oriented difference
    /// of that observation.
    pub fn observe(
        &mut self,
        dieback: &PixelDieback,
        transition: Transition,
        difference: f64,
        date_index: u32,
        mode: StressIndexMode,
        max_nb_stress_periods: u32,
    ) -> StressEvent {
        match transition {
            Transition::Onset => {
                self.reset_accumulation();
                self.accumulate(difference, date_index, mode);
                self.nb_periods += 1;
                if self.nb_periods > max_nb_stress_periods {
                    self.excluded = true;
                    return StressEvent::Excluded;
                }
                StressEvent::None
            }
            Transition::Recovery => {
                self.periods.push(StressPeriod {
                    first_date: dieback.first_date,
                    last_date: self.last_date,
                    nb_dates: self.nb_dates,
                    stress_index: mode.index(self.cum_diff, self.nb_dates),
                });
                self.reset_accumulation();
                StressEvent::PeriodClosed
            }
            Transition::None if dieback.unhealthy => {
                self.accumulate(difference, date_index, mode);
                StressEvent::None
            }
            Transition::None => StressEvent::None,
        }
    }
}
