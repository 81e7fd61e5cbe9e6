use crate::core::{FitModel, FitParam, FitPrior, FitRange, ModelShape};
use crate::error::{FitError, FitResult};

/// Parses a typed numeric field; non-finite or unparsable text yields `None`.
#[must_use]
pub fn parse_numeric_input(text: &str) -> Option<f64> {
    text.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

/// Clamps `range` into `slice`, preserving `min <= max`.
///
/// `min` is bounded by `[slice.min, min(range.max, slice.max)]`, then `max`
/// by `[max(min, slice.min), slice.max]`. Lower bounds win over upper bounds
/// so a model lying entirely outside the slice collapses onto its edge.
#[must_use]
pub fn clamp_range_to_slice(range: FitRange, slice: FitRange) -> FitRange {
    let min = range.min.min(range.max.min(slice.max)).max(slice.min);
    let max = range.max.max(min.max(slice.min)).min(slice.max);
    FitRange { min, max }
}

/// Applies the post-gesture invariants to one model in place.
pub(super) fn clamp_model(model: &mut FitModel, slice: FitRange) {
    model.range = clamp_range_to_slice(model.range, slice);
    if let ModelShape::Gaussian(shape) = &mut model.shape {
        shape.sigma = shape.sigma.abs();
    }
}

pub(super) fn validate_slice_range(slice: FitRange) -> FitResult<FitRange> {
    slice.validate().map_err(|_| {
        FitError::InvalidData("slice range must be finite with min <= max".to_owned())
    })
}

pub(super) fn validate_param_for_model(model: &FitModel, param: FitParam) -> FitResult<()> {
    if model.param(param).is_none() {
        return Err(FitError::InvalidData(format!(
            "parameter `{param}` does not belong to a {} model",
            model.kind().label().to_lowercase()
        )));
    }
    Ok(())
}

/// Returns the prior when every numeric field is finite.
pub(super) fn accept_prior(prior: Option<FitPrior>) -> Option<Option<FitPrior>> {
    match prior {
        Some(prior) if !prior.is_finite() => None,
        other => Some(other),
    }
}
