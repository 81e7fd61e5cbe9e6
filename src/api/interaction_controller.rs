use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::core::{FitParam, ModelId};
use crate::error::{FitError, FitResult};
use crate::interaction::{HandlePointerEvent, PointerDisposition};

use super::fit_session::FitSession;
use super::model_patch::ModelPatch;
use super::validation::parse_numeric_input;

/// Numeric input bound to a model field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModelField {
    RangeMin,
    RangeMax,
    Param(FitParam),
}

impl ModelField {
    /// `true` for fields edited in display wavelength units.
    #[must_use]
    pub fn is_wavelength(self) -> bool {
        match self {
            Self::RangeMin | Self::RangeMax => true,
            Self::Param(param) => param.is_wavelength(),
        }
    }
}

impl FitSession {
    pub fn pointer_down(&mut self, event: HandlePointerEvent) -> PointerDisposition {
        self.drag.pointer_down(&self.store, event)
    }

    pub fn pointer_move(&mut self, event: HandlePointerEvent) -> FitResult<PointerDisposition> {
        if !self.drag.accepts(&event) {
            return Ok(PointerDisposition::Ignored);
        }
        let scales = self.scales()?;
        self.drag.pointer_move(&mut self.store, scales.slice, event)
    }

    pub fn pointer_up(&mut self, event: HandlePointerEvent) -> FitResult<Option<ModelId>> {
        let slice = self.require_slice_range()?;
        self.drag.pointer_up(&mut self.store, slice, event)
    }

    /// Current value of a field in display units.
    #[must_use]
    pub fn model_field_display(&self, model_id: ModelId, field: ModelField) -> Option<f64> {
        let model = self.store.model(model_id)?;
        let canonical = match field {
            ModelField::RangeMin => model.range.min,
            ModelField::RangeMax => model.range.max,
            ModelField::Param(param) => model.param(param)?,
        };
        Some(if field.is_wavelength() {
            self.display().to_display(canonical)
        } else {
            canonical
        })
    }

    /// Writes a typed value, interpreting wavelength fields in display units.
    ///
    /// Unparsable or non-finite input, and display conversions made under a
    /// degenerate redshift, are ignored. Range bounds are clamped into the
    /// slice immediately, as on blur.
    pub fn set_model_field_from_input(
        &mut self,
        model_id: ModelId,
        field: ModelField,
        text: &str,
    ) -> FitResult<bool> {
        let model = self
            .store
            .model(model_id)
            .ok_or(FitError::UnknownModel(model_id))?;
        if let ModelField::Param(param) = field {
            if model.param(param).is_none() {
                return Ok(false);
            }
        }
        let Some(value) = parse_numeric_input(text) else {
            trace!(model_id, input = text, "ignoring non-numeric input");
            return Ok(false);
        };
        let canonical = if field.is_wavelength() {
            match self.display().from_display(value) {
                Some(canonical) => canonical,
                None => {
                    trace!(model_id, "skipping input under degenerate display factor");
                    return Ok(false);
                }
            }
        } else {
            value
        };

        let patch = match field {
            ModelField::RangeMin => ModelPatch::new().range_min(canonical),
            ModelField::RangeMax => ModelPatch::new().range_max(canonical),
            ModelField::Param(param) => ModelPatch::new().param(param, canonical),
        };
        let changed = self.store.update_model(model_id, &patch)?;
        if matches!(field, ModelField::RangeMin | ModelField::RangeMax) {
            let slice = self.require_slice_range()?;
            return Ok(self.store.validate_model(model_id, slice)? || changed);
        }
        Ok(changed)
    }
}
