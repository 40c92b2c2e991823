//! Single-date anomaly test.
//!
//! An observation is anomalous when it departs from the model prediction by
//! more than a threshold in the direction the index moves under stress.

use serde::{Deserialize, Serialize};

/// Direction in which a vegetation index moves when the canopy is stressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StressDirection {
    /// Index rises under stress (`+`).
    #[serde(rename = "+")]
    Increase,
    /// Index falls under stress (`-`).
    #[serde(rename = "-")]
    Decrease,
}

impl StressDirection {
    /// Parse the `+` / `-` configuration symbol.
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol.trim() {
            "+" => Some(Self::Increase),
            "-" => Some(Self::Decrease),
            _ => None,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Self::Increase => "+",
            Self::Decrease => "-",
        }
    }

    /// Difference between observation and prediction, oriented so that stress
    /// is positive.
    #[inline]
    pub fn oriented_difference(self, observed: f64, predicted: f64) -> f64 {
        match self {
            Self::Increase => observed - predicted,
            Self::Decrease => predicted - observed,
        }
    }
}

/// Outcome of the anomaly test for one valid observation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Assessment {
    pub anomaly: bool,
    /// Stress-oriented difference between observation and prediction.
    pub difference: f64,
}

/// Threshold test on the stress-oriented difference.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnomalyDetector {
    pub direction: StressDirection,
    /// Absolute threshold in vegetation index units.
    pub threshold: f64,
}

impl AnomalyDetector {
    pub fn new(direction: StressDirection, threshold: f64) -> Self {
        Self {
            direction,
            threshold,
        }
    }

    #[inline]
    pub fn assess(&self, observed: f64, predicted: f64) -> Assessment {
        let difference = self.direction.oriented_difference(observed, predicted);
        Assessment {
            anomaly: difference > self.threshold,
            difference,
        }
    }

    #[inline]
    pub fn is_anomaly(&self, observed: f64, predicted: f64) -> bool {
        self.assess(observed, predicted).anomaly
    }

    /// Anomaly flags for one date. Entries for masked observations are `false`
    /// and must not be interpreted; callers combine the flags with validity.
    pub fn detect(&self, observed: &[f64], predicted: &[f64], mask: &[bool]) -> Vec<bool> {
        observed
            .iter()
            .zip(predicted)
            .zip(mask)
            .map(|((&obs, &pred), &masked)| !masked && self.is_anomaly(obs, pred))
            .collect()
    }
}
