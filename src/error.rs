//! Error type for detection runs.
//!
//! Only conditions that must abort a run are errors. Per-pixel numeric
//! degeneracy (singular fits, insufficient training data, unstable pixels) is
//! represented in the data itself and never surfaces here.

use thiserror::Error;

/// Errors returned by configuration, input assembly and state persistence.
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid or unrecognised configuration. Fatal for the run.
    #[error("configuration error: {0}")]
    Config(String),

    /// A date string could not be parsed as `YYYY-MM-DD`.
    #[error("invalid date {value:?}: {reason}")]
    InvalidDate { value: String, reason: String },

    /// Dates must be fed in strictly increasing order.
    #[error("date {next} does not come after {previous}")]
    DateOrder { previous: String, next: String },

    /// An input array does not match the raster shape.
    #[error("{what}: expected {expected} values, found {found}")]
    ShapeMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },

    /// A persisted state does not belong to the current input stack.
    #[error("persisted state does not match the input stack: {0}")]
    HistoryMismatch(String),

    /// The persisted state was written by an incompatible version.
    #[error("unsupported state version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl Error {
    /// Create a configuration error.
    #[inline]
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a shape mismatch error.
    #[inline]
    pub fn shape(what: &'static str, expected: usize, found: usize) -> Self {
        Self::ShapeMismatch {
            what,
            expected,
            found,
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
