use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::prior::FitPrior;
use super::types::{FitRange, ModelId};

/// `FWHM = FWHM_PER_SIGMA * sigma` for a Gaussian profile.
pub const FWHM_PER_SIGMA: f64 = 2.3548;

pub const DEFAULT_MODEL_COLOR: &str = "#1f77b4";

/// Opacity used when rendering a model whose editing is frozen.
pub const INACTIVE_OPACITY: f64 = 0.6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelKind {
    Linear,
    Gaussian,
}

impl ModelKind {
    /// Parameters owned by models of this kind, in display order.
    #[must_use]
    pub fn params(self) -> [FitParam; 3] {
        match self {
            Self::Linear => [FitParam::K, FitParam::B, FitParam::X0],
            Self::Gaussian => [FitParam::Amplitude, FitParam::Mu, FitParam::Sigma],
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Linear => "Linear",
            Self::Gaussian => "Gaussian",
        }
    }
}

/// Named numeric parameter of a fit model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FitParam {
    K,
    B,
    X0,
    Amplitude,
    Mu,
    Sigma,
}

impl FitParam {
    #[must_use]
    pub fn kind(self) -> ModelKind {
        match self {
            Self::K | Self::B | Self::X0 => ModelKind::Linear,
            Self::Amplitude | Self::Mu | Self::Sigma => ModelKind::Gaussian,
        }
    }

    /// `true` for parameters stored in canonical wavelength units.
    #[must_use]
    pub fn is_wavelength(self) -> bool {
        matches!(self, Self::X0 | Self::Mu | Self::Sigma)
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::K => "k",
            Self::B => "b",
            Self::X0 => "x0",
            Self::Amplitude => "amplitude",
            Self::Mu => "mu",
            Self::Sigma => "sigma",
        }
    }
}

impl fmt::Display for FitParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearShape {
    pub k: f64,
    pub b: f64,
    pub x0: f64,
}

impl LinearShape {
    #[must_use]
    pub fn flux(self, wavelength: f64) -> f64 {
        self.k * (wavelength - self.x0) + self.b
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GaussianShape {
    pub amplitude: f64,
    pub mu: f64,
    pub sigma: f64,
}

impl GaussianShape {
    #[must_use]
    pub fn flux(self, wavelength: f64) -> f64 {
        let offset = wavelength - self.mu;
        if self.sigma == 0.0 {
            return if offset == 0.0 { self.amplitude } else { 0.0 };
        }
        self.amplitude * (-(offset * offset) / (2.0 * self.sigma * self.sigma)).exp()
    }

    #[must_use]
    pub fn fwhm(self) -> f64 {
        FWHM_PER_SIGMA * self.sigma
    }

    /// Distance from the center to either half-maximum point.
    #[must_use]
    pub fn half_width_at_half_max(self) -> f64 {
        0.5 * self.fwhm()
    }
}

/// Kind-specific parameters, serialized inline with a `kind` tag.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ModelShape {
    Linear(LinearShape),
    Gaussian(GaussianShape),
}

impl ModelShape {
    #[must_use]
    pub fn kind(self) -> ModelKind {
        match self {
            Self::Linear(_) => ModelKind::Linear,
            Self::Gaussian(_) => ModelKind::Gaussian,
        }
    }

    #[must_use]
    pub fn flux(self, wavelength: f64) -> f64 {
        match self {
            Self::Linear(shape) => shape.flux(wavelength),
            Self::Gaussian(shape) => shape.flux(wavelength),
        }
    }
}

/// A parametric model with its shared editor state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitModel {
    pub id: ModelId,
    pub name: String,
    pub active: bool,
    pub subtracted: bool,
    pub range: FitRange,
    pub color: String,
    #[serde(default)]
    pub priors: IndexMap<FitParam, FitPrior>,
    #[serde(flatten)]
    pub shape: ModelShape,
}

impl FitModel {
    /// Active, drawn model with no priors.
    #[must_use]
    pub fn new(id: ModelId, name: impl Into<String>, range: FitRange, shape: ModelShape) -> Self {
        Self {
            id,
            name: name.into(),
            active: true,
            subtracted: false,
            range,
            color: DEFAULT_MODEL_COLOR.to_owned(),
            priors: IndexMap::new(),
            shape,
        }
    }

    #[must_use]
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    #[must_use]
    pub fn kind(&self) -> ModelKind {
        self.shape.kind()
    }

    #[must_use]
    pub fn linear(&self) -> Option<LinearShape> {
        match self.shape {
            ModelShape::Linear(shape) => Some(shape),
            ModelShape::Gaussian(_) => None,
        }
    }

    #[must_use]
    pub fn gaussian(&self) -> Option<GaussianShape> {
        match self.shape {
            ModelShape::Gaussian(shape) => Some(shape),
            ModelShape::Linear(_) => None,
        }
    }

    /// Current value of `param`, or `None` when the model kind does not own it.
    #[must_use]
    pub fn param(&self, param: FitParam) -> Option<f64> {
        match (self.shape, param) {
            (ModelShape::Linear(s), FitParam::K) => Some(s.k),
            (ModelShape::Linear(s), FitParam::B) => Some(s.b),
            (ModelShape::Linear(s), FitParam::X0) => Some(s.x0),
            (ModelShape::Gaussian(s), FitParam::Amplitude) => Some(s.amplitude),
            (ModelShape::Gaussian(s), FitParam::Mu) => Some(s.mu),
            (ModelShape::Gaussian(s), FitParam::Sigma) => Some(s.sigma),
            _ => None,
        }
    }

    #[must_use]
    pub fn prior(&self, param: FitParam) -> Option<&FitPrior> {
        self.priors.get(&param)
    }

    #[must_use]
    pub fn render_opacity(&self) -> f64 {
        if self.active { 1.0 } else { INACTIVE_OPACITY }
    }
}
