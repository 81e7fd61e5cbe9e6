use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::core::{
    ConfigurationId, FitModel, FitParam, FitPrior, FitRange, GaussianShape, LinearShape, ModelId,
    ModelKind, ModelShape,
};
use crate::error::{FitError, FitResult};
use crate::extensions::{FitEvent, FitObserver, StoreContext};

use super::model_patch::ModelPatch;
use super::validation::{accept_prior, clamp_model, validate_param_for_model, validate_slice_range};

/// Fraction of the slice width used as the initial Gaussian sigma.
const DEFAULT_SIGMA_FRACTION: f64 = 0.05;

pub const DEFAULT_PALETTE: [&str; 8] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#17becf",
];

/// Flux levels used to seed newly created models.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelDefaults {
    pub continuum_level: f64,
    pub line_amplitude: f64,
}

impl Default for ModelDefaults {
    fn default() -> Self {
        Self {
            continuum_level: 0.0,
            line_amplitude: 1.0,
        }
    }
}

/// Saved snapshot of the live model set.
///
/// Prior edits on a configuration touch only its own model copies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitConfiguration {
    pub id: ConfigurationId,
    pub name: String,
    pub selected: bool,
    pub models: Vec<FitModel>,
    pub saved_at: DateTime<Utc>,
}

impl FitConfiguration {
    #[must_use]
    pub fn model(&self, model_id: ModelId) -> Option<&FitModel> {
        self.models.iter().find(|model| model.id == model_id)
    }
}

/// Owns the live models and saved configurations of one editing session.
pub struct FitModelStore {
    models: Vec<FitModel>,
    configurations: Vec<FitConfiguration>,
    next_model_id: ModelId,
    next_configuration_id: ConfigurationId,
    version: u64,
    palette: Vec<String>,
    observers: Vec<Box<dyn FitObserver>>,
}

impl fmt::Debug for FitModelStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FitModelStore")
            .field("models", &self.models)
            .field("configurations", &self.configurations)
            .field("next_model_id", &self.next_model_id)
            .field("version", &self.version)
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl Default for FitModelStore {
    fn default() -> Self {
        Self::new()
    }
}

impl FitModelStore {
    #[must_use]
    pub fn new() -> Self {
        Self::with_palette(DEFAULT_PALETTE.iter().map(|color| (*color).to_owned()).collect())
    }

    #[must_use]
    pub fn with_palette(palette: Vec<String>) -> Self {
        Self {
            models: Vec::new(),
            configurations: Vec::new(),
            next_model_id: 1,
            next_configuration_id: 1,
            version: 0,
            palette,
            observers: Vec::new(),
        }
    }

    /// Monotonic counter bumped by every mutation.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.version
    }

    #[must_use]
    pub fn models(&self) -> &[FitModel] {
        &self.models
    }

    #[must_use]
    pub fn model(&self, id: ModelId) -> Option<&FitModel> {
        self.models.iter().find(|model| model.id == id)
    }

    /// Models rendered as overlay curves.
    pub fn drawn_models(&self) -> impl Iterator<Item = &FitModel> {
        self.models.iter().filter(|model| !model.subtracted)
    }

    /// Models removed from the spectrum before the slice view is drawn.
    pub fn subtracted_models(&self) -> impl Iterator<Item = &FitModel> {
        self.models.iter().filter(|model| model.subtracted)
    }

    #[must_use]
    pub fn configurations(&self) -> &[FitConfiguration] {
        &self.configurations
    }

    #[must_use]
    pub fn configuration(&self, id: ConfigurationId) -> Option<&FitConfiguration> {
        self.configurations.iter().find(|config| config.id == id)
    }

    pub fn selected_configurations(&self) -> impl Iterator<Item = &FitConfiguration> {
        self.configurations.iter().filter(|config| config.selected)
    }

    pub fn add_model(&mut self, kind: ModelKind, slice: FitRange) -> FitResult<ModelId> {
        self.add_model_with_defaults(kind, slice, ModelDefaults::default())
    }

    /// Creates a model centered on `slice` spanning the whole slice.
    pub fn add_model_with_defaults(
        &mut self,
        kind: ModelKind,
        slice: FitRange,
        defaults: ModelDefaults,
    ) -> FitResult<ModelId> {
        let slice = validate_slice_range(slice)?;
        let id = self.next_model_id;
        self.next_model_id += 1;

        let center = slice.midpoint();
        let shape = match kind {
            ModelKind::Linear => ModelShape::Linear(LinearShape {
                k: 0.0,
                b: finite_or(defaults.continuum_level, 0.0),
                x0: center,
            }),
            ModelKind::Gaussian => {
                let sigma = slice.span() * DEFAULT_SIGMA_FRACTION;
                ModelShape::Gaussian(GaussianShape {
                    amplitude: finite_or(defaults.line_amplitude, 1.0),
                    mu: center,
                    sigma: if sigma > 0.0 { sigma } else { 1e-4 },
                })
            }
        };

        let model = FitModel::new(id, format!("{} {id}", kind.label()), slice, shape)
            .with_color(self.color_for(id));
        debug!(id, kind = ?kind, "add model");
        self.models.push(model);
        self.commit(FitEvent::ModelAdded { id });
        Ok(id)
    }

    /// Seeds one linear and one Gaussian model when the store is empty.
    ///
    /// Returns `true` when models were created.
    pub fn ensure_initial_models(&mut self, slice: FitRange) -> FitResult<bool> {
        self.ensure_initial_models_with_defaults(slice, ModelDefaults::default())
    }

    pub fn ensure_initial_models_with_defaults(
        &mut self,
        slice: FitRange,
        defaults: ModelDefaults,
    ) -> FitResult<bool> {
        if !self.models.is_empty() {
            return Ok(false);
        }
        self.add_model_with_defaults(ModelKind::Linear, slice, defaults)?;
        self.add_model_with_defaults(ModelKind::Gaussian, slice, defaults)?;
        Ok(true)
    }

    /// Applies a partial update. Returns `true` when the model changed.
    pub fn update_model(&mut self, id: ModelId, patch: &ModelPatch) -> FitResult<bool> {
        let model = self.model_mut(id)?;
        let changed = patch.apply_to(model);
        if changed {
            trace!(id, "update model");
            self.commit(FitEvent::ModelUpdated { id });
        }
        Ok(changed)
    }

    pub fn remove_model(&mut self, id: ModelId) -> FitResult<()> {
        let position = self
            .models
            .iter()
            .position(|model| model.id == id)
            .ok_or(FitError::UnknownModel(id))?;
        self.models.remove(position);
        debug!(id, "remove model");
        self.commit(FitEvent::ModelRemoved { id });
        Ok(())
    }

    pub fn rename_model(&mut self, id: ModelId, name: impl Into<String>) -> FitResult<bool> {
        self.update_model(id, &ModelPatch::new().name(name))
    }

    pub fn toggle_active(&mut self, id: ModelId, active: bool) -> FitResult<bool> {
        let model = self.model_mut(id)?;
        if model.active == active {
            return Ok(false);
        }
        model.active = active;
        debug!(id, active, "toggle model active");
        self.commit(FitEvent::ModelUpdated { id });
        Ok(true)
    }

    /// Moves a model between the drawn and subtracted sets.
    pub fn toggle_subtracted(&mut self, id: ModelId, subtracted: bool) -> FitResult<bool> {
        self.update_model(id, &ModelPatch::new().subtracted(subtracted))
    }

    /// Clamps the model's range into `slice` and normalizes sigma.
    pub fn validate_model(&mut self, id: ModelId, slice: FitRange) -> FitResult<bool> {
        let slice = validate_slice_range(slice)?;
        let model = self.model_mut(id)?;
        let before = model.clone();
        clamp_model(model, slice);
        let changed = *model != before;
        if changed {
            trace!(id, min = model.range.min, max = model.range.max, "clamped model range");
            self.commit(FitEvent::ModelValidated { id });
        }
        Ok(changed)
    }

    pub fn validate_all(&mut self, slice: FitRange) -> FitResult<()> {
        let ids: Vec<ModelId> = self.models.iter().map(|model| model.id).collect();
        for id in ids {
            self.validate_model(id, slice)?;
        }
        Ok(())
    }

    /// Sets or clears the prior of a live model parameter.
    ///
    /// Priors with non-finite values are ignored and `Ok(false)` is returned.
    pub fn set_model_prior(
        &mut self,
        model_id: ModelId,
        param: FitParam,
        prior: Option<FitPrior>,
    ) -> FitResult<bool> {
        let model = self.model_mut(model_id)?;
        validate_param_for_model(model, param)?;
        let Some(prior) = accept_prior(prior) else {
            warn!(model_id, %param, "ignoring prior with non-finite values");
            return Ok(false);
        };
        if !write_prior(model, param, prior) {
            return Ok(false);
        }
        self.commit(FitEvent::PriorChanged { model_id, param });
        Ok(true)
    }

    /// Deep-clones the live models into a new selected configuration.
    pub fn save_current_configuration(&mut self) -> ConfigurationId {
        let id = self.next_configuration_id;
        self.next_configuration_id += 1;
        let saved_at = Utc::now();
        self.configurations.push(FitConfiguration {
            id,
            name: format!("Configuration {id}"),
            selected: true,
            models: self.models.clone(),
            saved_at,
        });
        debug!(id, models = self.models.len(), "save configuration");
        self.commit(FitEvent::ConfigurationSaved { id });
        id
    }

    pub fn rename_configuration(
        &mut self,
        id: ConfigurationId,
        name: impl Into<String>,
    ) -> FitResult<()> {
        let config = self.configuration_mut(id)?;
        config.name = name.into();
        self.commit(FitEvent::ConfigurationRenamed { id });
        Ok(())
    }

    /// Flips the inclusion of a configuration in the next submission.
    pub fn toggle_configuration_selection(&mut self, id: ConfigurationId) -> FitResult<bool> {
        let config = self.configuration_mut(id)?;
        config.selected = !config.selected;
        let selected = config.selected;
        self.commit(FitEvent::ConfigurationSelectionChanged { id, selected });
        Ok(selected)
    }

    pub fn remove_configuration(&mut self, id: ConfigurationId) -> FitResult<()> {
        let position = self
            .configurations
            .iter()
            .position(|config| config.id == id)
            .ok_or(FitError::UnknownConfiguration(id))?;
        self.configurations.remove(position);
        debug!(id, "remove configuration");
        self.commit(FitEvent::ConfigurationRemoved { id });
        Ok(())
    }

    pub fn update_configuration_model_prior(
        &mut self,
        configuration_id: ConfigurationId,
        model_id: ModelId,
        param: FitParam,
        prior: Option<FitPrior>,
    ) -> FitResult<bool> {
        let config = self.configuration_mut(configuration_id)?;
        let model = config
            .models
            .iter_mut()
            .find(|model| model.id == model_id)
            .ok_or(FitError::UnknownModel(model_id))?;
        validate_param_for_model(model, param)?;
        let Some(prior) = accept_prior(prior) else {
            warn!(
                configuration_id,
                model_id,
                %param,
                "ignoring configuration prior with non-finite values"
            );
            return Ok(false);
        };
        if !write_prior(model, param, prior) {
            return Ok(false);
        }
        self.commit(FitEvent::ConfigurationPriorChanged {
            configuration_id,
            model_id,
            param,
        });
        Ok(true)
    }

    /// Registers an observer with unique identifier.
    pub fn register_observer(&mut self, observer: Box<dyn FitObserver>) -> FitResult<()> {
        let observer_id = observer.id().to_owned();
        if observer_id.is_empty() {
            return Err(FitError::InvalidData(
                "observer id must not be empty".to_owned(),
            ));
        }
        if self.observers.iter().any(|entry| entry.id() == observer_id) {
            return Err(FitError::InvalidData(format!(
                "observer with id `{observer_id}` is already registered"
            )));
        }
        self.observers.push(observer);
        Ok(())
    }

    /// Unregisters an observer by id. Returns `true` when removed.
    pub fn unregister_observer(&mut self, observer_id: &str) -> bool {
        if let Some(position) = self
            .observers
            .iter()
            .position(|entry| entry.id() == observer_id)
        {
            self.observers.remove(position);
            return true;
        }
        false
    }

    #[must_use]
    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    fn context(&self) -> StoreContext {
        StoreContext {
            version: self.version,
            models_len: self.models.len(),
            configurations_len: self.configurations.len(),
            selected_configurations_len: self.selected_configurations().count(),
        }
    }

    fn commit(&mut self, event: FitEvent) {
        self.version += 1;
        let context = self.context();
        for observer in &mut self.observers {
            observer.on_event(event, context);
        }
    }

    fn model_mut(&mut self, id: ModelId) -> FitResult<&mut FitModel> {
        self.models
            .iter_mut()
            .find(|model| model.id == id)
            .ok_or(FitError::UnknownModel(id))
    }

    fn configuration_mut(&mut self, id: ConfigurationId) -> FitResult<&mut FitConfiguration> {
        self.configurations
            .iter_mut()
            .find(|config| config.id == id)
            .ok_or(FitError::UnknownConfiguration(id))
    }

    fn color_for(&self, id: ModelId) -> String {
        if self.palette.is_empty() {
            return DEFAULT_PALETTE[0].to_owned();
        }
        let index = usize::try_from(id.saturating_sub(1)).unwrap_or(0) % self.palette.len();
        self.palette[index].clone()
    }
}

fn write_prior(model: &mut FitModel, param: FitParam, prior: Option<FitPrior>) -> bool {
    match prior {
        Some(prior) => model.priors.insert(param, prior) != Some(prior),
        None => model.priors.shift_remove(&param).is_some(),
    }
}

fn finite_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() { value } else { fallback }
}
