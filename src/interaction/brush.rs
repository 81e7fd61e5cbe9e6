use serde::{Deserialize, Serialize};

use crate::core::{FitRange, LinearScale};

/// Who moved the overview brush.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BrushEventSource {
    User,
    /// Echo of a [`BrushSync::sync_to_slice`] move; never republished.
    Programmatic,
}

/// Brush change reported by the host, in overview pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BrushEvent {
    pub selection: Option<(f64, f64)>,
    pub source: BrushEventSource,
}

impl BrushEvent {
    #[must_use]
    pub fn user(x0: f64, x1: f64) -> Self {
        Self {
            selection: Some((x0, x1)),
            source: BrushEventSource::User,
        }
    }

    #[must_use]
    pub fn programmatic(x0: f64, x1: f64) -> Self {
        Self {
            selection: Some((x0, x1)),
            source: BrushEventSource::Programmatic,
        }
    }

    #[must_use]
    pub fn cleared() -> Self {
        Self {
            selection: None,
            source: BrushEventSource::User,
        }
    }
}

/// Keeps the overview brush extent and the slice range in step.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BrushSync {
    extent_px: Option<(f64, f64)>,
}

impl BrushSync {
    #[must_use]
    pub fn extent_px(self) -> Option<(f64, f64)> {
        self.extent_px
    }

    /// Recomputes the brush extent from a slice range set elsewhere.
    ///
    /// Returns the pixel extent the host should move the brush to, flagging
    /// the resulting brush event as [`BrushEventSource::Programmatic`].
    pub fn sync_to_slice(&mut self, slice: FitRange, brush_x: LinearScale) -> (f64, f64) {
        let a = brush_x.scale(slice.min);
        let b = brush_x.scale(slice.max);
        let extent = (a.min(b), a.max(b));
        self.extent_px = Some(extent);
        extent
    }

    /// Converts a user brush drag into a new slice range.
    ///
    /// Returns `None` for programmatic echoes, cleared selections, non-finite
    /// pixels and drags collapsed to a single point.
    pub fn handle_event(&mut self, event: BrushEvent, brush_x: LinearScale) -> Option<FitRange> {
        if event.source == BrushEventSource::Programmatic {
            return None;
        }
        let (x0, x1) = event.selection?;
        if !x0.is_finite() || !x1.is_finite() || x0 == x1 {
            return None;
        }
        let range = FitRange::ordered(brush_x.invert(x0), brush_x.invert(x1));
        if range.span() <= 0.0 {
            return None;
        }
        self.extent_px = Some((x0.min(x1), x0.max(x1)));
        Some(range)
    }
}
