//! # fordead-core
//!
//! Core algorithms for detecting forest dieback from Sentinel-2 vegetation
//! index time series.
//!
//! This crate provides pure Rust implementations of:
//! - Harmonic (annual + semi-annual) seasonal basis on day numbers
//! - Censored least squares fitting of the seasonal model under a validity mask,
//!   with an optional two-pass outlier removal
//! - Per-pixel training window selection
//! - Prediction of the expected vegetation index and anomaly detection
//! - The incremental 3-strike dieback confirmation state machine
//! - Stress index accumulation over confirmed dieback periods
//! - A versioned, persistable detection state so that new acquisitions can be
//!   processed without replaying history
//!
//! ## Data Layout
//!
//! Rasters are flattened row-major into pixel indices (`pixel = row * cols + col`).
//! Time series stacks are column-major [`PixelMatrix`] values with pixels as rows
//! and dates as columns: `data[pixel + t * n_pixels]` is the value of `pixel` at
//! date `t`, so one acquisition date is one contiguous column.

#![allow(clippy::needless_range_loop)]
#![allow(clippy::too_many_arguments)]

pub mod parallel;

pub mod anomaly;
pub mod basis;
pub mod config;
pub mod dates;
pub mod dieback;
pub mod error;
pub mod fit;
pub mod index;
pub mod matrix;
pub mod pipeline;
pub mod predict;
pub mod results;
pub mod simulation;
pub mod state;
pub mod stress;
pub mod training;

pub use anomaly::{AnomalyDetector, Assessment, StressDirection};
pub use basis::{harmonic_design_matrix, harmonic_terms, N_HARMONIC_TERMS};
pub use config::{DetectionConfig, DetectionParams};
pub use dates::DateAxis;
pub use dieback::{PixelDieback, Transition};
pub use error::{Error, Result};
pub use index::VegetationIndex;
pub use matrix::PixelMatrix;
pub use pipeline::{DiebackDetector, RunSummary, TimeSeries};
pub use results::{DetectionResults, PeriodRecord, PixelStatus, StatusCounts};
pub use simulation::{simulate_stack, SimulationParams};
pub use state::DetectionState;
pub use stress::{PixelStress, StressIndexMode, StressPeriod};
