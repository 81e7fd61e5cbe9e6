use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::{FWHM_PER_SIGMA, FitModel, FitParam, ModelId, ModelKind, ModelShape};

const HWHM_PER_SIGMA: f64 = 0.5 * FWHM_PER_SIGMA;

/// Draggable control point bound to one or more model parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HandleKind {
    /// Moves μ and amplitude together.
    GaussianPeak,
    /// Resizes σ from the left half-maximum point.
    GaussianLeftHalfMax,
    /// Resizes σ from the right half-maximum point.
    GaussianRightHalfMax,
    /// Moves x0 and b together.
    LinearPivot,
    /// Changes k with the right endpoint's flux held fixed.
    LinearLeftEndpoint,
    /// Changes k with the left endpoint's flux held fixed.
    LinearRightEndpoint,
}

impl HandleKind {
    pub const GAUSSIAN: [Self; 3] = [
        Self::GaussianPeak,
        Self::GaussianLeftHalfMax,
        Self::GaussianRightHalfMax,
    ];

    pub const LINEAR: [Self; 3] = [
        Self::LinearPivot,
        Self::LinearLeftEndpoint,
        Self::LinearRightEndpoint,
    ];

    #[must_use]
    pub fn model_kind(self) -> ModelKind {
        match self {
            Self::GaussianPeak | Self::GaussianLeftHalfMax | Self::GaussianRightHalfMax => {
                ModelKind::Gaussian
            }
            Self::LinearPivot | Self::LinearLeftEndpoint | Self::LinearRightEndpoint => {
                ModelKind::Linear
            }
        }
    }

    #[must_use]
    pub fn for_kind(kind: ModelKind) -> [Self; 3] {
        match kind {
            ModelKind::Linear => Self::LINEAR,
            ModelKind::Gaussian => Self::GAUSSIAN,
        }
    }
}

/// Rendered handle in slice-panel pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HandlePlacement {
    pub handle: HandleKind,
    pub model_id: ModelId,
    pub x_px: f64,
    pub y_px: f64,
    /// `false` for inactive models: drawn but not draggable.
    pub enabled: bool,
}

pub type HandlePlacements = SmallVec<[HandlePlacement; 3]>;

/// New absolute parameter value produced by a drag step.
pub type ParamUpdate = (FitParam, f64);

/// Domain-space `(wavelength, flux)` position of a handle.
#[must_use]
pub fn handle_anchor(model: &FitModel, handle: HandleKind) -> Option<(f64, f64)> {
    match (model.shape, handle) {
        (ModelShape::Gaussian(shape), HandleKind::GaussianPeak) => {
            Some((shape.mu, shape.amplitude))
        }
        (ModelShape::Gaussian(shape), HandleKind::GaussianLeftHalfMax) => Some((
            shape.mu - shape.half_width_at_half_max(),
            0.5 * shape.amplitude,
        )),
        (ModelShape::Gaussian(shape), HandleKind::GaussianRightHalfMax) => Some((
            shape.mu + shape.half_width_at_half_max(),
            0.5 * shape.amplitude,
        )),
        (ModelShape::Linear(shape), HandleKind::LinearPivot) => Some((shape.x0, shape.b)),
        (ModelShape::Linear(shape), HandleKind::LinearLeftEndpoint) => {
            Some((model.range.min, shape.flux(model.range.min)))
        }
        (ModelShape::Linear(shape), HandleKind::LinearRightEndpoint) => {
            Some((model.range.max, shape.flux(model.range.max)))
        }
        _ => None,
    }
}

/// Parameter values after moving `handle` by a domain delta.
///
/// Returns an empty list when the handle does not belong to the model, the
/// deltas are not finite, or the linear range is degenerate.
#[must_use]
pub fn drag_updates(
    model: &FitModel,
    handle: HandleKind,
    d_wavelength: f64,
    d_flux: f64,
) -> SmallVec<[ParamUpdate; 2]> {
    let mut updates = SmallVec::new();
    if !d_wavelength.is_finite() || !d_flux.is_finite() {
        return updates;
    }

    match (model.shape, handle) {
        (ModelShape::Gaussian(shape), HandleKind::GaussianPeak) => {
            updates.push((FitParam::Mu, shape.mu + d_wavelength));
            updates.push((FitParam::Amplitude, shape.amplitude + d_flux));
        }
        (ModelShape::Gaussian(shape), HandleKind::GaussianLeftHalfMax) => {
            updates.push((FitParam::Sigma, shape.sigma - d_wavelength / HWHM_PER_SIGMA));
        }
        (ModelShape::Gaussian(shape), HandleKind::GaussianRightHalfMax) => {
            updates.push((FitParam::Sigma, shape.sigma + d_wavelength / HWHM_PER_SIGMA));
        }
        (ModelShape::Linear(shape), HandleKind::LinearPivot) => {
            updates.push((FitParam::X0, shape.x0 + d_wavelength));
            updates.push((FitParam::B, shape.b + d_flux));
        }
        (
            ModelShape::Linear(shape),
            HandleKind::LinearLeftEndpoint | HandleKind::LinearRightEndpoint,
        ) => {
            let (x_left, x_right) = (model.range.min, model.range.max);
            let width = x_right - x_left;
            if width.is_nan() || width <= 0.0 {
                return updates;
            }
            let (y_left, y_right) = (shape.flux(x_left), shape.flux(x_right));
            let k = if handle == HandleKind::LinearRightEndpoint {
                (y_right + d_flux - y_left) / width
            } else {
                (y_right - (y_left + d_flux)) / width
            };
            let (x_fixed, y_fixed) = if handle == HandleKind::LinearRightEndpoint {
                (x_left, y_left)
            } else {
                (x_right, y_right)
            };
            updates.push((FitParam::K, k));
            updates.push((FitParam::B, y_fixed + k * (shape.x0 - x_fixed)));
        }
        _ => {}
    }
    updates
}
