use std::fmt;

use serde::{Deserialize, Serialize};

use super::model::{FitModel, FitParam};
use super::types::ModelId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeterministicMode {
    Add,
    Multiply,
}

/// Bayesian prior attached to one model parameter.
///
/// A missing entry in a model's prior map means the default, uninformative
/// prior.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FitPrior {
    Uniform {
        lower: f64,
        upper: f64,
    },
    Normal {
        mu: f64,
        sigma: f64,
    },
    TruncatedNormal {
        mu: f64,
        sigma: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        lower: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        upper: Option<f64>,
    },
    Fixed {
        value: f64,
    },
    /// Ties the parameter to another model's parameter.
    Deterministic {
        mode: DeterministicMode,
        value: f64,
        ref_model_id: ModelId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        ref_param: Option<FitParam>,
    },
}

/// Prior type selector, including the implicit default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PriorType {
    Default,
    Uniform,
    Normal,
    TruncatedNormal,
    Fixed,
    Deterministic,
}

impl PriorType {
    pub const ALL: [Self; 6] = [
        Self::Default,
        Self::Uniform,
        Self::Normal,
        Self::TruncatedNormal,
        Self::Fixed,
        Self::Deterministic,
    ];

    #[must_use]
    pub fn of(prior: Option<&FitPrior>) -> Self {
        match prior {
            None => Self::Default,
            Some(FitPrior::Uniform { .. }) => Self::Uniform,
            Some(FitPrior::Normal { .. }) => Self::Normal,
            Some(FitPrior::TruncatedNormal { .. }) => Self::TruncatedNormal,
            Some(FitPrior::Fixed { .. }) => Self::Fixed,
            Some(FitPrior::Deterministic { .. }) => Self::Deterministic,
        }
    }
}

impl fmt::Display for PriorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Default => "Default",
            Self::Uniform => "Uniform",
            Self::Normal => "Normal",
            Self::TruncatedNormal => "Truncated Normal",
            Self::Fixed => "Fixed",
            Self::Deterministic => "Deterministic",
        })
    }
}

impl FitPrior {
    #[must_use]
    pub fn prior_type(&self) -> PriorType {
        PriorType::of(Some(self))
    }

    /// Applies `f` to every value expressed in the parameter's own units.
    ///
    /// Multiplicative deterministic factors are unit-less and left untouched.
    #[must_use]
    pub fn map_values(self, f: impl Fn(f64) -> f64) -> Self {
        match self {
            Self::Uniform { lower, upper } => Self::Uniform {
                lower: f(lower),
                upper: f(upper),
            },
            Self::Normal { mu, sigma } => Self::Normal {
                mu: f(mu),
                sigma: f(sigma),
            },
            Self::TruncatedNormal {
                mu,
                sigma,
                lower,
                upper,
            } => Self::TruncatedNormal {
                mu: f(mu),
                sigma: f(sigma),
                lower: lower.map(&f),
                upper: upper.map(&f),
            },
            Self::Fixed { value } => Self::Fixed { value: f(value) },
            Self::Deterministic {
                mode,
                value,
                ref_model_id,
                ref_param,
            } => Self::Deterministic {
                mode,
                value: match mode {
                    DeterministicMode::Add => f(value),
                    DeterministicMode::Multiply => value,
                },
                ref_model_id,
                ref_param,
            },
        }
    }

    /// `true` when every numeric field is finite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        match *self {
            Self::Uniform { lower, upper } => lower.is_finite() && upper.is_finite(),
            Self::Normal { mu, sigma } => mu.is_finite() && sigma.is_finite(),
            Self::TruncatedNormal {
                mu,
                sigma,
                lower,
                upper,
            } => {
                mu.is_finite()
                    && sigma.is_finite()
                    && lower.is_none_or(f64::is_finite)
                    && upper.is_none_or(f64::is_finite)
            }
            Self::Fixed { value } | Self::Deterministic { value, .. } => value.is_finite(),
        }
    }

    #[must_use]
    pub fn reference(&self) -> Option<(ModelId, Option<FitParam>)> {
        match *self {
            Self::Deterministic {
                ref_model_id,
                ref_param,
                ..
            } => Some((ref_model_id, ref_param)),
            _ => None,
        }
    }
}

/// Resolves a deterministic link against a model set.
///
/// Returns `None` for non-deterministic priors and for dangling references
/// (missing model, self reference, or a `ref_param` the target does not own),
/// all of which mean "no active link".
#[must_use]
pub fn resolve_link<'a>(
    owner: ModelId,
    prior: &FitPrior,
    models: &'a [FitModel],
) -> Option<&'a FitModel> {
    let (ref_model_id, ref_param) = prior.reference()?;
    if ref_model_id == owner {
        return None;
    }
    let target = models.iter().find(|model| model.id == ref_model_id)?;
    match ref_param {
        Some(param) if target.param(param).is_none() => None,
        _ => Some(target),
    }
}
