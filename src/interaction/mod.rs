//! Pointer-gesture state for on-chart handles and the overview brush.
//!
//! These types hold state and domain math only; the store-facing glue lives in
//! `api::drag_controller` and `api::fit_session`.

pub mod brush;
pub mod handles;

use serde::{Deserialize, Serialize};

use crate::core::ModelId;

pub use brush::{BrushEvent, BrushEventSource, BrushSync};
pub use handles::{
    HandleKind, HandlePlacement, HandlePlacements, ParamUpdate, drag_updates, handle_anchor,
};

/// Token proving ownership of the exclusive input session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionToken(u64);

impl SessionToken {
    #[must_use]
    pub fn value(self) -> u64 {
        self.0
    }
}

/// The drag currently holding the input session.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActiveDrag {
    pub handle: HandleKind,
    pub model_id: ModelId,
    pub token: SessionToken,
    pub last_x: f64,
    pub last_y: f64,
}

/// Pointer event delivered to a handle's hit element.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HandlePointerEvent {
    pub handle: HandleKind,
    pub model_id: ModelId,
    /// Token returned by pointer-down; `None` for hosts that only track identity.
    pub token: Option<SessionToken>,
    pub x: f64,
    pub y: f64,
}

impl HandlePointerEvent {
    #[must_use]
    pub fn new(handle: HandleKind, model_id: ModelId, x: f64, y: f64) -> Self {
        Self {
            handle,
            model_id,
            token: None,
            x,
            y,
        }
    }

    #[must_use]
    pub fn with_token(mut self, token: SessionToken) -> Self {
        self.token = Some(token);
        self
    }
}

/// Outcome of offering a pointer event to the drag state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PointerDisposition {
    /// The event was consumed; the host must stop propagation (e.g. to the brush).
    Captured(SessionToken),
    /// The event does not belong to the active drag, or no drag could start.
    Ignored,
}

impl PointerDisposition {
    #[must_use]
    pub fn is_captured(self) -> bool {
        matches!(self, Self::Captured(_))
    }
}

/// Idle (`drag == None`) or dragging.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DragState {
    drag: Option<ActiveDrag>,
    next_token: u64,
}

impl DragState {
    #[must_use]
    pub fn active(self) -> Option<ActiveDrag> {
        self.drag
    }

    #[must_use]
    pub fn is_dragging(self) -> bool {
        self.drag.is_some()
    }

    /// Acquires the session. Returns `None` while another drag is active.
    pub fn begin(
        &mut self,
        handle: HandleKind,
        model_id: ModelId,
        x: f64,
        y: f64,
    ) -> Option<SessionToken> {
        if self.drag.is_some() {
            return None;
        }
        self.next_token += 1;
        let token = SessionToken(self.next_token);
        self.drag = Some(ActiveDrag {
            handle,
            model_id,
            token,
            last_x: x,
            last_y: y,
        });
        Some(token)
    }

    /// `true` when `event` belongs to the active drag.
    #[must_use]
    pub fn matches(self, event: &HandlePointerEvent) -> bool {
        self.drag.is_some_and(|drag| {
            drag.handle == event.handle
                && drag.model_id == event.model_id
                && event.token.is_none_or(|token| token == drag.token)
        })
    }

    /// Records a new pointer position and returns the previous one.
    pub fn advance(&mut self, x: f64, y: f64) -> Option<(f64, f64)> {
        let drag = self.drag.as_mut()?;
        let previous = (drag.last_x, drag.last_y);
        drag.last_x = x;
        drag.last_y = y;
        Some(previous)
    }

    /// Releases the session and returns the finished drag.
    pub fn end(&mut self) -> Option<ActiveDrag> {
        self.drag.take()
    }
}
