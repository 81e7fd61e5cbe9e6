use tracing::{debug, trace};

use crate::core::{FitModel, FitRange, ModelId, ScalePair};
use crate::error::FitResult;
use crate::interaction::{
    ActiveDrag, DragState, HandleKind, HandlePlacement, HandlePlacements, HandlePointerEvent,
    PointerDisposition, drag_updates, handle_anchor,
};

use super::model_patch::ModelPatch;
use super::store::FitModelStore;

/// Translates handle gestures into store updates.
///
/// Only one drag is active at a time. Range clamping is deferred to pointer-up
/// so a handle can travel past a boundary and snap back on release.
#[derive(Debug, Clone, Copy, Default)]
pub struct DragHandleController {
    state: DragState,
}

impl DragHandleController {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn active_drag(&self) -> Option<ActiveDrag> {
        self.state.active()
    }

    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.state.is_dragging()
    }

    /// `true` when `event` belongs to the active drag.
    #[must_use]
    pub fn accepts(&self, event: &HandlePointerEvent) -> bool {
        self.state.matches(event)
    }

    /// Idle -> Dragging. Captures the input session for the handle.
    pub fn pointer_down(
        &mut self,
        store: &FitModelStore,
        event: HandlePointerEvent,
    ) -> PointerDisposition {
        let Some(model) = store.model(event.model_id) else {
            return PointerDisposition::Ignored;
        };
        if !model.active
            || model.kind() != event.handle.model_kind()
            || !event.x.is_finite()
            || !event.y.is_finite()
        {
            return PointerDisposition::Ignored;
        }
        match self.state.begin(event.handle, event.model_id, event.x, event.y) {
            Some(token) => {
                debug!(
                    model_id = event.model_id,
                    handle = ?event.handle,
                    token = token.value(),
                    "drag started"
                );
                PointerDisposition::Captured(token)
            }
            None => PointerDisposition::Ignored,
        }
    }

    /// Applies the pixel delta since the last recorded position.
    pub fn pointer_move(
        &mut self,
        store: &mut FitModelStore,
        scales: ScalePair,
        event: HandlePointerEvent,
    ) -> FitResult<PointerDisposition> {
        let Some(drag) = self.state.active() else {
            return Ok(PointerDisposition::Ignored);
        };
        if !self.state.matches(&event) {
            return Ok(PointerDisposition::Ignored);
        }
        if !event.x.is_finite() || !event.y.is_finite() {
            return Ok(PointerDisposition::Captured(drag.token));
        }
        let Some((last_x, last_y)) = self.state.advance(event.x, event.y) else {
            return Ok(PointerDisposition::Ignored);
        };
        let Some(model) = store.model(drag.model_id) else {
            return Ok(PointerDisposition::Captured(drag.token));
        };

        let d_wavelength = scales.x.invert_delta(last_x, event.x);
        let d_flux = scales.y.invert_delta(last_y, event.y);
        let updates = drag_updates(model, drag.handle, d_wavelength, d_flux);
        if !updates.is_empty() {
            let patch = updates
                .iter()
                .fold(ModelPatch::new(), |patch, &(param, value)| {
                    patch.param(param, value)
                });
            trace!(model_id = drag.model_id, d_wavelength, d_flux, "drag step");
            store.update_model(drag.model_id, &patch)?;
        }
        Ok(PointerDisposition::Captured(drag.token))
    }

    /// Dragging -> Idle. Runs `validate_model` once for the released model.
    pub fn pointer_up(
        &mut self,
        store: &mut FitModelStore,
        slice: FitRange,
        event: HandlePointerEvent,
    ) -> FitResult<Option<ModelId>> {
        if !self.state.matches(&event) {
            return Ok(None);
        }
        let Some(drag) = self.state.end() else {
            return Ok(None);
        };
        debug!(model_id = drag.model_id, handle = ?drag.handle, "drag released");
        if store.model(drag.model_id).is_some() {
            store.validate_model(drag.model_id, slice)?;
        }
        Ok(Some(drag.model_id))
    }

    /// Drops the session without validating, e.g. when the host loses capture.
    pub fn cancel(&mut self) -> Option<ActiveDrag> {
        self.state.end()
    }
}

/// Handles of `model` whose anchor maps inside the slice panel.
#[must_use]
pub fn visible_handles(model: &FitModel, scales: ScalePair, slice: FitRange) -> HandlePlacements {
    HandleKind::for_kind(model.kind())
        .into_iter()
        .filter_map(|handle| {
            let (wavelength, flux) = handle_anchor(model, handle)?;
            if !slice.contains(wavelength) {
                return None;
            }
            let y_px = scales.y.scale(flux);
            if !y_px.is_finite() || !scales.y.contains_pixel(y_px) {
                return None;
            }
            Some(HandlePlacement {
                handle,
                model_id: model.id,
                x_px: scales.x.scale(wavelength),
                y_px,
                enabled: model.active,
            })
        })
        .collect()
}
