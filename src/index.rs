//! Catalogue of supported vegetation indices.
//!
//! The detection core treats the index as an opaque real series, but it must
//! know in which direction the index moves when the canopy is stressed. This
//! module records that direction for the built-in indices, along with their
//! formulas over Sentinel-2 surface reflectances.
//!
//! CRSWIR rises under stress while NDVI, NDWI and NBR fall, following canopy
//! greenness and water content. Configurations that expect another convention
//! for these indices must set `stress_direction` explicitly.

use crate::anomaly::StressDirection;

// Central wavelengths (nm) of the bands used by the continuum removal in CRSWIR.
const WL_B8A: f64 = 865.0;
const WL_B11: f64 = 1610.0;
const WL_B12: f64 = 2190.0;

/// Sentinel-2 surface reflectances of one pixel at one date.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Reflectances {
    pub b4: f64,
    pub b8: f64,
    pub b8a: f64,
    pub b11: f64,
    pub b12: f64,
}

/// Built-in vegetation indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VegetationIndex {
    /// Continuum-removed SWIR: B11 against the B8A–B12 continuum. Rises when
    /// canopy water content drops.
    Crswir,
    /// Normalized difference vegetation index. Falls with chlorophyll loss.
    Ndvi,
    /// Normalized difference water index (Gao), B8A vs B11.
    Ndwi,
    /// Normalized burn ratio, B8 vs B12.
    Nbr,
}

impl VegetationIndex {
    pub const ALL: [VegetationIndex; 4] = [Self::Crswir, Self::Ndvi, Self::Ndwi, Self::Nbr];

    /// Look up an index by name, ignoring case.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|vi| vi.name().eq_ignore_ascii_case(name.trim()))
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Crswir => "CRSWIR",
            Self::Ndvi => "NDVI",
            Self::Ndwi => "NDWI",
            Self::Nbr => "NBR",
        }
    }

    /// Direction in which the index moves under stress.
    pub fn stress_direction(self) -> StressDirection {
        match self {
            Self::Crswir => StressDirection::Increase,
            Self::Ndvi | Self::Ndwi | Self::Nbr => StressDirection::Decrease,
        }
    }

    /// Compute the index. Returns NaN where the formula is undefined, which the
    /// detection core treats as a masked observation.
    pub fn compute(self, r: &Reflectances) -> f64 {
        match self {
            Self::Crswir => {
                let continuum = r.b8a + (r.b12 - r.b8a) * (WL_B11 - WL_B8A) / (WL_B12 - WL_B8A);
                safe_ratio(r.b11, continuum)
            }
            Self::Ndvi => normalized_difference(r.b8, r.b4),
            Self::Ndwi => normalized_difference(r.b8a, r.b11),
            Self::Nbr => normalized_difference(r.b8, r.b12),
        }
    }
}

impl std::fmt::Display for VegetationIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[inline]
fn safe_ratio(num: f64, den: f64) -> f64 {
    if den.abs() < f64::EPSILON {
        f64::NAN
    } else {
        num / den
    }
}

#[inline]
fn normalized_difference(a: f64, b: f64) -> f64 {
    safe_ratio(a - b, a + b)
}
