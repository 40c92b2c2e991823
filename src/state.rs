//! Persisted detection state.
//!
//! [`DetectionState`] is everything a later run needs to continue detection on
//! new acquisition dates without replaying history: the harmonic models, the
//! first detection indices, the per-pixel dieback and stress state, and the
//! dates already processed. It is the only thing carried between runs.
//!
//! States are saved as JSON. A save writes a sibling temporary file and renames
//! it over the destination, so a reader sees either the previous state or the
//! new one, never a partially written file.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::basis::N_HARMONIC_TERMS;
use crate::config::DetectionParams;
use crate::dates::DateAxis;
use crate::dieback::PixelDieback;
use crate::error::{Error, Result};
use crate::matrix::PixelMatrix;
use crate::stress::PixelStress;
use crate::training::UNTRAINED;

/// Layout version of [`DetectionState`].
pub const STATE_VERSION: u32 = 2;

/// Detection state of a raster after processing a prefix of its dates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionState {
    pub version: u32,
    pub rows: usize,
    pub cols: usize,
    /// Parameters the state was computed with.
    pub params: DetectionParams,
    /// Dates already processed; the next date index is `dates.len()`.
    pub dates: DateAxis,
    /// No future date can change any pixel's training window.
    pub training_final: bool,
    /// Static area of interest.
    pub in_scope: Vec<bool>,
    /// Harmonic coefficients (`n_pixels x 5`), zero for untrained pixels.
    pub coefficients: PixelMatrix<f64>,
    /// First date index eligible for detection, `0` when untrained.
    pub first_detection: Vec<u32>,
    pub dieback: Vec<PixelDieback>,
    /// Present when stress tracking is enabled.
    pub stress: Option<Vec<PixelStress>>,
}

#[derive(Deserialize)]
struct VersionProbe {
    version: u32,
}

impl DetectionState {
    /// Fresh state: nothing trained, nothing processed.
    pub fn new(rows: usize, cols: usize, in_scope: Vec<bool>, params: DetectionParams) -> Self {
        let n_pixels = rows * cols;
        let stress = params
            .stress_index_mode
            .map(|_| vec![PixelStress::default(); n_pixels]);
        Self {
            version: STATE_VERSION,
            rows,
            cols,
            params,
            dates: DateAxis::new(),
            training_final: false,
            in_scope,
            coefficients: PixelMatrix::zeros(n_pixels, N_HARMONIC_TERMS),
            first_detection: vec![UNTRAINED; n_pixels],
            dieback: vec![PixelDieback::default(); n_pixels],
            stress,
        }
    }

    #[inline]
    pub fn n_pixels(&self) -> usize {
        self.rows * self.cols
    }

    /// Index of the first date not yet processed.
    #[inline]
    pub fn next_date_index(&self) -> usize {
        self.dates.len()
    }

    #[inline]
    pub fn is_trained(&self, p: usize) -> bool {
        self.first_detection[p] != UNTRAINED
    }

    /// Excluded after exceeding the allowed number of stress periods.
    #[inline]
    pub fn is_excluded(&self, p: usize) -> bool {
        self.stress
            .as_ref()
            .is_some_and(|stress| stress[p].excluded)
    }

    /// Area where detection results are meaningful: in scope, not excluded.
    pub fn valid_area(&self) -> Vec<bool> {
        (0..self.n_pixels())
            .map(|p| self.in_scope[p] && !self.is_excluded(p))
            .collect()
    }

    /// In-scope pixels without a harmonic model.
    pub fn pixels_without_model(&self) -> usize {
        (0..self.n_pixels())
            .filter(|&p| self.in_scope[p] && !self.is_trained(p))
            .count()
    }

    pub fn pixels_excluded(&self) -> usize {
        (0..self.n_pixels()).filter(|&p| self.is_excluded(p)).count()
    }

    pub fn pixels_unhealthy(&self) -> usize {
        (0..self.n_pixels())
            .filter(|&p| self.dieback[p].unhealthy && !self.is_excluded(p))
            .count()
    }

    /// Check that every per-pixel array matches the raster shape.
    pub fn check_consistency(&self) -> Result<()> {
        let n = self.n_pixels();
        let mut lengths = vec![
            ("in_scope", self.in_scope.len()),
            ("coefficients", self.coefficients.nrows()),
            ("first_detection", self.first_detection.len()),
            ("dieback", self.dieback.len()),
        ];
        if let Some(stress) = &self.stress {
            lengths.push(("stress", stress.len()));
        }
        for (what, len) in lengths {
            if len != n {
                return Err(Error::HistoryMismatch(format!(
                    "{} has {} entries for a {}x{} raster",
                    what, len, self.rows, self.cols
                )));
            }
        }
        if self.coefficients.ncols() != N_HARMONIC_TERMS {
            return Err(Error::HistoryMismatch(format!(
                "coefficients have {} terms, expected {}",
                self.coefficients.ncols(),
                N_HARMONIC_TERMS
            )));
        }
        if self.stress.is_some() != self.params.stress_index_mode.is_some() {
            return Err(Error::HistoryMismatch(
                "stress state does not match stress_index_mode".to_string(),
            ));
        }
        Ok(())
    }

    /// Write the state as JSON, atomically replacing `path`.
    pub fn save(&self, path: &Path) -> Result<()> {
        let mut tmp_name = path.as_os_str().to_owned();
        tmp_name.push(".tmp");
        let tmp = PathBuf::from(tmp_name);
        {
            let mut writer = BufWriter::new(File::create(&tmp)?);
            serde_json::to_writer(&mut writer, self)?;
            writer.flush()?;
            writer.get_ref().sync_all()?;
        }
        std::fs::rename(&tmp, path)?;
        tracing::debug!(
            path = %path.display(),
            dates = self.dates.len(),
            "saved detection state"
        );
        Ok(())
    }

    /// Read a state written by [`save`](Self::save).
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let probe: VersionProbe = serde_json::from_str(&content)?;
        if probe.version != STATE_VERSION {
            return Err(Error::UnsupportedVersion {
                found: probe.version,
                expected: STATE_VERSION,
            });
        }
        let state: DetectionState = serde_json::from_str(&content)?;
        state.check_consistency()?;
        Ok(state)
    }
}
