use serde::{Deserialize, Serialize};

use crate::error::{FitError, FitResult};

/// Process-unique model identifier, assigned by the store counter.
pub type ModelId = u64;

/// Identifier of a saved configuration snapshot.
pub type ConfigurationId = u64;

/// Closed wavelength interval in canonical (observed-frame µm) units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitRange {
    pub min: f64,
    pub max: f64,
}

impl FitRange {
    #[must_use]
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Builds a range from two unordered bounds.
    #[must_use]
    pub fn ordered(a: f64, b: f64) -> Self {
        if a <= b {
            Self { min: a, max: b }
        } else {
            Self { min: b, max: a }
        }
    }

    #[must_use]
    pub fn is_finite(self) -> bool {
        self.min.is_finite() && self.max.is_finite()
    }

    /// `true` when `min > max`, which is how empty intersections are represented.
    #[must_use]
    pub fn is_empty(self) -> bool {
        self.min.is_nan() || self.max.is_nan() || self.min > self.max
    }

    #[must_use]
    pub fn span(self) -> f64 {
        self.max - self.min
    }

    #[must_use]
    pub fn midpoint(self) -> f64 {
        0.5 * (self.min + self.max)
    }

    #[must_use]
    pub fn contains(self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    #[must_use]
    pub fn intersect(self, other: Self) -> Self {
        Self {
            min: self.min.max(other.min),
            max: self.max.min(other.max),
        }
    }

    pub fn validate(self) -> FitResult<Self> {
        if !self.is_finite() {
            return Err(FitError::InvalidData(
                "range bounds must be finite".to_owned(),
            ));
        }
        if self.is_empty() {
            return Err(FitError::InvalidData(
                "range min must be <= range max".to_owned(),
            ));
        }
        Ok(self)
    }
}

/// One sample of an extracted 1-D spectrum.
///
/// `wavelength` is canonical µm; samples are expected in ascending order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpectrumPoint {
    pub wavelength: f64,
    pub flux: f64,
    pub flux_minus_err: f64,
    pub flux_plus_err: f64,
}

impl SpectrumPoint {
    #[must_use]
    pub fn new(wavelength: f64, flux: f64, flux_minus_err: f64, flux_plus_err: f64) -> Self {
        Self {
            wavelength,
            flux,
            flux_minus_err,
            flux_plus_err,
        }
    }

    /// Sample without an error band.
    #[must_use]
    pub fn exact(wavelength: f64, flux: f64) -> Self {
        Self::new(wavelength, flux, flux, flux)
    }

    #[must_use]
    pub fn flux_low(self) -> f64 {
        self.flux.min(self.flux_minus_err).min(self.flux_plus_err)
    }

    #[must_use]
    pub fn flux_high(self) -> f64 {
        self.flux.max(self.flux_minus_err).max(self.flux_plus_err)
    }
}

/// One evaluated vertex of a sampled model curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurvePoint {
    pub wavelength: f64,
    pub flux: f64,
}

impl CurvePoint {
    #[must_use]
    pub fn new(wavelength: f64, flux: f64) -> Self {
        Self { wavelength, flux }
    }
}
