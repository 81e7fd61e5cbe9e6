use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::core::{
    ConfigurationId, DeterministicMode, DisplayContext, FWHM_PER_SIGMA, FitModel, FitParam,
    FitPrior, ModelId, ModelShape, PriorType,
};
use crate::error::{FitError, FitResult};

use super::store::FitModelStore;

pub const SPEED_OF_LIGHT_KM_S: f64 = 299_792.458;

/// Half-width of the Auto Guess window on μ, in µm (about 10 Å).
pub const AUTO_GUESS_MU_WINDOW_UM: f64 = 0.001;

/// Velocity FWHM below which Auto Guess does not let σ shrink.
pub const AUTO_GUESS_VELOCITY_FLOOR_KM_S: f64 = 150.0;

const DEFAULT_SPREAD_RATIO: f64 = 0.1;
const ZERO_CENTER_SPREAD: f64 = 1.0;

/// Multiplier taking a Gaussian σ in µm to a km/s FWHM at the model center.
///
/// Returns exactly `1.0` (no conversion) for linear models and for centers
/// that are not strictly positive.
#[must_use]
pub fn velocity_factor(model: &FitModel) -> f64 {
    match model.shape {
        ModelShape::Gaussian(shape) if shape.mu > 0.0 && shape.mu.is_finite() => {
            FWHM_PER_SIGMA * SPEED_OF_LIGHT_KM_S / shape.mu
        }
        _ => 1.0,
    }
}

/// Which model set a prior edit applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PriorTarget {
    Live,
    Configuration(ConfigurationId),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PriorChange {
    /// The stored prior after the change (`None` = Default).
    Applied(Option<FitPrior>),
    /// Deterministic requested but no other model exists to reference.
    Unavailable,
}

/// One prior produced by Auto Guess.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriorAssignment {
    pub model_id: ModelId,
    pub param: FitParam,
    pub prior: FitPrior,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AutoGuess {
    Assigned(Vec<PriorAssignment>),
    /// The set does not hold exactly two Gaussian models; nothing changed.
    Unavailable,
}

/// Prior editing state: the wavelength display preference and which models
/// show σ in the velocity domain.
///
/// Stored priors are always canonical (observed-frame µm for wavelength
/// parameters). The display preference and the velocity view only affect
/// what is shown and how edits are converted back.
#[derive(Debug, Clone, Default)]
pub struct PriorEditor {
    display: DisplayContext,
    velocity_view: HashSet<(PriorTarget, ModelId)>,
}

impl PriorEditor {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_display(display: DisplayContext) -> Self {
        Self {
            display,
            velocity_view: HashSet::new(),
        }
    }

    #[must_use]
    pub fn display(&self) -> DisplayContext {
        self.display
    }

    pub fn display_mut(&mut self) -> &mut DisplayContext {
        &mut self.display
    }

    #[must_use]
    pub fn velocity_view(&self, target: PriorTarget, model_id: ModelId) -> bool {
        self.velocity_view.contains(&(target, model_id))
    }

    pub fn set_velocity_view(&mut self, target: PriorTarget, model_id: ModelId, enabled: bool) {
        if enabled {
            self.velocity_view.insert((target, model_id));
        } else {
            self.velocity_view.remove(&(target, model_id));
        }
    }

    #[must_use]
    pub fn prior_type(model: &FitModel, param: FitParam) -> PriorType {
        PriorType::of(model.prior(param))
    }

    /// Conversion factor between stored and displayed values of `param`.
    ///
    /// σ in the velocity view is km/s FWHM. Other wavelength parameters follow
    /// the display unit and frame, using the last valid factor while the
    /// redshift is degenerate.
    #[must_use]
    pub fn display_factor(&self, target: PriorTarget, model: &FitModel, param: FitParam) -> f64 {
        if self.uses_velocity(target, model, param) {
            velocity_factor(model)
        } else if param.is_wavelength() {
            self.display.factor()
        } else {
            1.0
        }
    }

    /// Current parameter value in the displayed domain.
    #[must_use]
    pub fn effective_value(
        &self,
        target: PriorTarget,
        model: &FitModel,
        param: FitParam,
    ) -> Option<f64> {
        Some(model.param(param)? * self.display_factor(target, model, param))
    }

    /// Stored prior re-expressed in the displayed domain.
    #[must_use]
    pub fn displayed_prior(
        &self,
        target: PriorTarget,
        model: &FitModel,
        param: FitParam,
    ) -> Option<FitPrior> {
        let factor = self.display_factor(target, model, param);
        model
            .prior(param)
            .map(|prior| prior.map_values(|value| value * factor))
    }

    /// Converts a prior edited in the displayed domain back to storage units.
    ///
    /// Returns `None` for wavelength parameters while the display preference
    /// is degenerate, since the edit was made against a stale factor.
    #[must_use]
    pub fn stored_prior(
        &self,
        target: PriorTarget,
        model: &FitModel,
        param: FitParam,
        displayed: FitPrior,
    ) -> Option<FitPrior> {
        let velocity = self.uses_velocity(target, model, param);
        if param.is_wavelength() && !velocity && self.display.is_degenerate() {
            return None;
        }
        Some(to_storage(
            displayed,
            self.display_factor(target, model, param),
        ))
    }

    /// Builds the default prior of `prior_type` for a parameter.
    ///
    /// The prior is centered on the effective value with a ±10% spread
    /// (1.0 when the center is zero), computed in the displayed domain and
    /// converted back to storage units.
    pub fn prior_for_type(
        &self,
        target: PriorTarget,
        models: &[FitModel],
        model_id: ModelId,
        param: FitParam,
        prior_type: PriorType,
    ) -> FitResult<PriorChange> {
        let model = models
            .iter()
            .find(|model| model.id == model_id)
            .ok_or(FitError::UnknownModel(model_id))?;
        let factor = self.display_factor(target, model, param);
        let center = self.effective_value(target, model, param).ok_or_else(|| {
            FitError::InvalidData(format!(
                "parameter `{param}` does not belong to model {model_id}"
            ))
        })?;
        let spread = if center == 0.0 {
            ZERO_CENTER_SPREAD
        } else {
            (center * DEFAULT_SPREAD_RATIO).abs()
        };

        let displayed = match prior_type {
            PriorType::Default => return Ok(PriorChange::Applied(None)),
            PriorType::Uniform => FitPrior::Uniform {
                lower: center - spread,
                upper: center + spread,
            },
            PriorType::Normal => FitPrior::Normal {
                mu: center,
                sigma: spread,
            },
            PriorType::TruncatedNormal => FitPrior::TruncatedNormal {
                mu: center,
                sigma: spread,
                lower: Some(center - spread),
                upper: Some(center + spread),
            },
            PriorType::Fixed => FitPrior::Fixed { value: center },
            PriorType::Deterministic => {
                let Some(reference) = models.iter().find(|other| other.id != model_id) else {
                    return Ok(PriorChange::Unavailable);
                };
                FitPrior::Deterministic {
                    mode: DeterministicMode::Multiply,
                    value: 1.0,
                    ref_model_id: reference.id,
                    ref_param: reference.param(param).map(|_| param),
                }
            }
        };
        // Built from the value itself, so the factor in use cancels even when
        // it is a fallback.
        Ok(PriorChange::Applied(Some(to_storage(displayed, factor))))
    }

    /// Switches the prior type of a parameter and writes the result.
    pub fn change_prior_type(
        &self,
        store: &mut FitModelStore,
        target: PriorTarget,
        model_id: ModelId,
        param: FitParam,
        prior_type: PriorType,
    ) -> FitResult<PriorChange> {
        let models = target_models(store, target)?;
        let change = self.prior_for_type(target, models, model_id, param, prior_type)?;
        if let PriorChange::Applied(prior) = change {
            debug!(model_id, %param, prior_type = %prior_type, "change prior type");
            write_prior(store, target, model_id, param, prior)?;
        }
        Ok(change)
    }

    /// Writes a prior edited in the displayed domain.
    ///
    /// Returns `Ok(false)` without writing when the edit cannot be converted
    /// back to storage units.
    pub fn edit_prior(
        &self,
        store: &mut FitModelStore,
        target: PriorTarget,
        model_id: ModelId,
        param: FitParam,
        displayed: Option<FitPrior>,
    ) -> FitResult<bool> {
        let model = target_models(store, target)?
            .iter()
            .find(|model| model.id == model_id)
            .ok_or(FitError::UnknownModel(model_id))?;
        let stored = match displayed {
            Some(prior) => match self.stored_prior(target, model, param, prior) {
                Some(stored) => Some(stored),
                None => {
                    trace!(model_id, %param, "skipping prior edit under degenerate display factor");
                    return Ok(false);
                }
            },
            None => None,
        };
        write_prior(store, target, model_id, param, stored)
    }

    /// Applies [`auto_guess`] to the target set.
    pub fn apply_auto_guess(
        &self,
        store: &mut FitModelStore,
        target: PriorTarget,
    ) -> FitResult<AutoGuess> {
        let guess = auto_guess(target_models(store, target)?);
        if let AutoGuess::Assigned(assignments) = &guess {
            debug!(count = assignments.len(), "apply auto guess");
            for assignment in assignments {
                write_prior(
                    store,
                    target,
                    assignment.model_id,
                    assignment.param,
                    Some(assignment.prior),
                )?;
            }
        }
        Ok(guess)
    }

    fn uses_velocity(&self, target: PriorTarget, model: &FitModel, param: FitParam) -> bool {
        param == FitParam::Sigma && self.velocity_view(target, model.id)
    }
}

fn to_storage(displayed: FitPrior, factor: f64) -> FitPrior {
    if factor == 1.0 {
        displayed
    } else {
        displayed.map_values(|value| value / factor)
    }
}

/// Truncated-normal starting priors for a two-line Gaussian decomposition.
#[must_use]
pub fn auto_guess(models: &[FitModel]) -> AutoGuess {
    let gaussians: Vec<_> = models
        .iter()
        .filter_map(|model| model.gaussian().map(|shape| (model, shape)))
        .collect();
    if gaussians.len() != 2 {
        return AutoGuess::Unavailable;
    }

    let mut assignments = Vec::with_capacity(6);
    for (model, shape) in gaussians {
        let amplitude = shape.amplitude;
        let (lower, upper) = if amplitude >= 0.0 {
            (Some(amplitude / 3.0), None)
        } else {
            (None, Some(amplitude / 3.0))
        };
        assignments.push(PriorAssignment {
            model_id: model.id,
            param: FitParam::Amplitude,
            prior: FitPrior::TruncatedNormal {
                mu: amplitude,
                sigma: amplitude.abs() / 2.0,
                lower,
                upper,
            },
        });

        assignments.push(PriorAssignment {
            model_id: model.id,
            param: FitParam::Mu,
            prior: FitPrior::TruncatedNormal {
                mu: shape.mu,
                sigma: AUTO_GUESS_MU_WINDOW_UM,
                lower: Some(shape.mu - AUTO_GUESS_MU_WINDOW_UM),
                upper: Some(shape.mu + AUTO_GUESS_MU_WINDOW_UM),
            },
        });

        let sigma = shape.sigma.abs();
        let floor = AUTO_GUESS_VELOCITY_FLOOR_KM_S / velocity_factor(model);
        assignments.push(PriorAssignment {
            model_id: model.id,
            param: FitParam::Sigma,
            prior: FitPrior::TruncatedNormal {
                mu: sigma,
                sigma: sigma / 2.0,
                lower: Some((sigma - floor).max(0.0)),
                upper: Some(4.0 * sigma),
            },
        });
    }
    AutoGuess::Assigned(assignments)
}

fn target_models(store: &FitModelStore, target: PriorTarget) -> FitResult<&[FitModel]> {
    match target {
        PriorTarget::Live => Ok(store.models()),
        PriorTarget::Configuration(id) => store
            .configuration(id)
            .map(|config| config.models.as_slice())
            .ok_or(FitError::UnknownConfiguration(id)),
    }
}

fn write_prior(
    store: &mut FitModelStore,
    target: PriorTarget,
    model_id: ModelId,
    param: FitParam,
    prior: Option<FitPrior>,
) -> FitResult<bool> {
    match target {
        PriorTarget::Live => store.set_model_prior(model_id, param, prior),
        PriorTarget::Configuration(id) => {
            store.update_configuration_model_prior(id, model_id, param, prior)
        }
    }
}
