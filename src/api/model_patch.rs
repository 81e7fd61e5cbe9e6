use crate::core::{FitModel, FitParam, ModelShape};

/// Partial update applied by [`FitModelStore::update_model`](super::FitModelStore::update_model).
///
/// Unset fields are left alone. Numeric fields that are not finite, or that
/// belong to the other model kind, are ignored.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelPatch {
    pub name: Option<String>,
    pub color: Option<String>,
    pub subtracted: Option<bool>,
    pub range_min: Option<f64>,
    pub range_max: Option<f64>,
    pub k: Option<f64>,
    pub b: Option<f64>,
    pub x0: Option<f64>,
    pub amplitude: Option<f64>,
    pub mu: Option<f64>,
    pub sigma: Option<f64>,
}

impl ModelPatch {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn param(mut self, param: FitParam, value: f64) -> Self {
        let slot = match param {
            FitParam::K => &mut self.k,
            FitParam::B => &mut self.b,
            FitParam::X0 => &mut self.x0,
            FitParam::Amplitude => &mut self.amplitude,
            FitParam::Mu => &mut self.mu,
            FitParam::Sigma => &mut self.sigma,
        };
        *slot = Some(value);
        self
    }

    #[must_use]
    pub fn range(mut self, min: f64, max: f64) -> Self {
        self.range_min = Some(min);
        self.range_max = Some(max);
        self
    }

    #[must_use]
    pub fn range_min(mut self, min: f64) -> Self {
        self.range_min = Some(min);
        self
    }

    #[must_use]
    pub fn range_max(mut self, max: f64) -> Self {
        self.range_max = Some(max);
        self
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    #[must_use]
    pub fn subtracted(mut self, subtracted: bool) -> Self {
        self.subtracted = Some(subtracted);
        self
    }

    #[must_use]
    fn has_numeric(&self) -> bool {
        [
            self.range_min,
            self.range_max,
            self.k,
            self.b,
            self.x0,
            self.amplitude,
            self.mu,
            self.sigma,
        ]
        .iter()
        .any(Option::is_some)
    }

    /// Applies the patch and reports whether anything changed.
    pub(super) fn apply_to(&self, model: &mut FitModel) -> bool {
        let before = model.clone();

        if let Some(name) = &self.name {
            model.name.clone_from(name);
        }
        if let Some(color) = &self.color {
            model.color.clone_from(color);
        }
        if let Some(subtracted) = self.subtracted {
            model.subtracted = subtracted;
        }

        if model.active {
            set_finite(&mut model.range.min, self.range_min);
            set_finite(&mut model.range.max, self.range_max);
            match &mut model.shape {
                ModelShape::Linear(shape) => {
                    set_finite(&mut shape.k, self.k);
                    set_finite(&mut shape.b, self.b);
                    set_finite(&mut shape.x0, self.x0);
                }
                ModelShape::Gaussian(shape) => {
                    set_finite(&mut shape.amplitude, self.amplitude);
                    set_finite(&mut shape.mu, self.mu);
                    // A zero width has no profile; keep the previous sigma.
                    set_finite(
                        &mut shape.sigma,
                        self.sigma.map(f64::abs).filter(|sigma| *sigma > 0.0),
                    );
                }
            }
        } else if self.has_numeric() {
            tracing::trace!(id = model.id, "ignoring numeric patch on inactive model");
        }

        *model != before
    }
}

fn set_finite(slot: &mut f64, value: Option<f64>) {
    if let Some(value) = value.filter(|value| value.is_finite()) {
        *slot = value;
    }
}
