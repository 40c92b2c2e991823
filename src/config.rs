//! Detection configuration.
//!
//! [`DetectionConfig`] is the user-facing surface, read from TOML with the
//! option names of the processing chain. It is validated once into
//! [`DetectionParams`], in which every string option has been resolved to a
//! closed enum or a date, so nothing downstream re-inspects strings.

use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::anomaly::{AnomalyDetector, StressDirection};
use crate::dates::{parse_date, DEFAULT_EPOCH};
use crate::error::{Error, Result};
use crate::fit::FitOptions;
use crate::index::VegetationIndex;
use crate::stress::StressIndexMode;

/// Raw detection options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DetectionConfig {
    /// Vegetation index name (`CRSWIR`, `NDVI`, `NDWI`, `NBR` or a custom name).
    pub vi: String,
    /// `+` or `-`; overrides the built-in direction and is required for custom indices.
    pub stress_direction: Option<String>,
    /// Anomaly threshold in vegetation index units.
    pub threshold_anomaly: f64,
    /// Minimum number of valid observations to train a pixel.
    pub nb_min_date: usize,
    pub min_last_date_training: String,
    pub max_last_date_training: String,
    /// `mean`, `weighted_mean` or `none`.
    pub stress_index_mode: String,
    pub max_nb_stress_periods: u32,
    pub remove_outliers: bool,
    pub threshold_outliers: f64,
    /// Origin of day numbers for the harmonic model.
    pub epoch: String,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            vi: "CRSWIR".to_string(),
            stress_direction: None,
            threshold_anomaly: 0.16,
            nb_min_date: 10,
            min_last_date_training: "2018-01-01".to_string(),
            max_last_date_training: "2018-06-01".to_string(),
            stress_index_mode: "none".to_string(),
            max_nb_stress_periods: 5,
            remove_outliers: false,
            threshold_outliers: 0.16,
            epoch: DEFAULT_EPOCH.to_string(),
        }
    }
}

impl DetectionConfig {
    /// Parse from a TOML document. Missing keys take their default value.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Read a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    /// Validate and resolve every option.
    pub fn validate(&self) -> Result<DetectionParams> {
        let direction = match &self.stress_direction {
            Some(symbol) => StressDirection::from_symbol(symbol).ok_or_else(|| {
                Error::config(format!(
                    "stress_direction must be \"+\" or \"-\", got {:?}",
                    symbol
                ))
            })?,
            None => VegetationIndex::from_name(&self.vi)
                .map(VegetationIndex::stress_direction)
                .ok_or_else(|| {
                    Error::config(format!(
                        "unknown vegetation index {:?}: set stress_direction explicitly",
                        self.vi
                    ))
                })?,
        };

        if !self.threshold_anomaly.is_finite() || self.threshold_anomaly < 0.0 {
            return Err(Error::config(format!(
                "threshold_anomaly must be a non-negative number, got {}",
                self.threshold_anomaly
            )));
        }
        if self.nb_min_date == 0 {
            return Err(Error::config("nb_min_date must be at least 1"));
        }
        if self.max_nb_stress_periods == 0 {
            return Err(Error::config("max_nb_stress_periods must be at least 1"));
        }

        let stress_index_mode = StressIndexMode::parse(&self.stress_index_mode).map_err(|_| {
            Error::config(format!(
                "stress_index_mode must be one of mean, weighted_mean, none; got {:?}",
                self.stress_index_mode
            ))
        })?;

        let outlier_threshold = if self.remove_outliers {
            if !self.threshold_outliers.is_finite() || self.threshold_outliers <= 0.0 {
                return Err(Error::config(format!(
                    "threshold_outliers must be a positive number, got {}",
                    self.threshold_outliers
                )));
            }
            Some(self.threshold_outliers)
        } else {
            None
        };

        let min_last_date_training =
            config_date("min_last_date_training", &self.min_last_date_training)?;
        let max_last_date_training =
            config_date("max_last_date_training", &self.max_last_date_training)?;
        if min_last_date_training > max_last_date_training {
            return Err(Error::config(format!(
                "min_last_date_training ({}) is after max_last_date_training ({})",
                self.min_last_date_training, self.max_last_date_training
            )));
        }

        Ok(DetectionParams {
            vi: self.vi.trim().to_string(),
            direction,
            threshold_anomaly: self.threshold_anomaly,
            nb_min_date: self.nb_min_date,
            min_last_date_training,
            max_last_date_training,
            stress_index_mode,
            max_nb_stress_periods: self.max_nb_stress_periods,
            outlier_threshold,
            epoch: config_date("epoch", &self.epoch)?,
        })
    }
}

fn config_date(key: &str, value: &str) -> Result<NaiveDate> {
    parse_date(value).map_err(|e| Error::config(format!("{}: {}", key, e)))
}

/// Validated detection parameters.
///
/// Persisted with the detection state: a state is only resumed under the
/// exact same parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionParams {
    pub vi: String,
    pub direction: StressDirection,
    pub threshold_anomaly: f64,
    pub nb_min_date: usize,
    pub min_last_date_training: NaiveDate,
    pub max_last_date_training: NaiveDate,
    /// `None` disables stress tracking.
    pub stress_index_mode: Option<StressIndexMode>,
    pub max_nb_stress_periods: u32,
    /// `Some(threshold)` enables the two-pass outlier removal.
    pub outlier_threshold: Option<f64>,
    pub epoch: NaiveDate,
}

impl DetectionParams {
    pub fn detector(&self) -> AnomalyDetector {
        AnomalyDetector::new(self.direction, self.threshold_anomaly)
    }

    pub fn fit_options(&self) -> FitOptions {
        FitOptions {
            outlier_threshold: self.outlier_threshold,
        }
    }
}
