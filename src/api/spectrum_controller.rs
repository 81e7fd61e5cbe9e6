use std::cmp::Ordering;
use std::sync::Arc;

use tracing::{debug, trace, warn};

use crate::core::{ChartLayout, FitRange, SpectrumPoint};
use crate::error::{FitError, FitResult};
use crate::interaction::BrushEvent;

use super::fit_session::FitSession;

impl FitSession {
    /// Replaces the spectrum.
    ///
    /// Non-finite samples are dropped, samples are sorted by wavelength and
    /// duplicate wavelengths keep the last sample. The slice range is reset
    /// to the full extent when it no longer overlaps the new spectrum.
    pub fn set_spectrum(&mut self, points: Vec<SpectrumPoint>) -> FitResult<()> {
        let original_count = points.len();
        let points = canonicalize_spectrum(points);
        let (Some(first), Some(last)) = (points.first(), points.last()) else {
            return Err(FitError::InvalidData(
                "spectrum must contain at least one finite sample".to_owned(),
            ));
        };
        let extent = FitRange::new(first.wavelength, last.wavelength);
        debug!(
            original_count,
            canonical_count = points.len(),
            "set spectrum"
        );

        self.spectrum = Arc::new(points);
        self.spectrum_generation += 1;
        self.subtracted_cache.clear();
        self.scales_cache.clear();
        self.curves_cache.clear();
        let keep_slice = self
            .slice_range
            .is_some_and(|slice| !slice.intersect(extent).is_empty());
        if !keep_slice {
            self.slice_range = Some(extent);
        }
        self.resync_brush();
        Ok(())
    }

    #[must_use]
    pub fn spectrum(&self) -> &[SpectrumPoint] {
        &self.spectrum
    }

    #[must_use]
    pub fn slice_range(&self) -> Option<FitRange> {
        self.slice_range
    }

    pub(super) fn require_slice_range(&self) -> FitResult<FitRange> {
        self.slice_range
            .ok_or_else(|| FitError::InvalidData("no spectrum loaded".to_owned()))
    }

    /// Sets the slice range from a typed input, a handle spill-over or a
    /// "sync to window" action.
    ///
    /// Bounds are ordered; a collapsed or non-finite range is rejected and the
    /// previous range retained. Returns the brush pixel extent the host should
    /// move the overview brush to without re-firing its callback.
    pub fn set_slice_range(&mut self, min: f64, max: f64) -> FitResult<Option<(f64, f64)>> {
        if !min.is_finite() || !max.is_finite() || min == max {
            warn!(min, max, "ignoring degenerate slice range");
            return Ok(self.brush.extent_px());
        }
        self.slice_range = Some(FitRange::ordered(min, max));
        Ok(self.resync_brush())
    }

    /// Applies an overview brush change reported by the host.
    ///
    /// Returns the published slice range, or `None` when the event was a
    /// programmatic echo, collapsed to a single point, or arrived while a
    /// handle drag owns the pointer. Hosts can restore the brush from
    /// [`Self::brush_extent_px`] in the latter case.
    pub fn handle_brush_event(&mut self, event: BrushEvent) -> FitResult<Option<FitRange>> {
        if self.drag.is_dragging() {
            trace!("ignoring brush event during handle drag");
            return Ok(None);
        }
        let scales = self.scales()?;
        let Some(range) = self.brush.handle_event(event, scales.brush.x) else {
            return Ok(None);
        };
        debug!(min = range.min, max = range.max, "slice range from brush");
        self.slice_range = Some(range);
        Ok(Some(range))
    }

    /// Current brush extent in overview pixels.
    #[must_use]
    pub fn brush_extent_px(&self) -> Option<(f64, f64)> {
        self.brush.extent_px()
    }

    pub fn set_layout(&mut self, layout: ChartLayout) -> FitResult<()> {
        self.config.layout = layout.validate()?;
        self.layout_generation += 1;
        self.resync_brush();
        Ok(())
    }

    fn resync_brush(&mut self) -> Option<(f64, f64)> {
        let slice = self.slice_range?;
        match self.scales() {
            Ok(scales) => Some(self.brush.sync_to_slice(slice, scales.brush.x)),
            Err(err) => {
                warn!(error = %err, "skipping brush sync");
                None
            }
        }
    }
}

fn canonicalize_spectrum(mut points: Vec<SpectrumPoint>) -> Vec<SpectrumPoint> {
    let original_len = points.len();
    points.retain(|point| point.wavelength.is_finite() && point.flux.is_finite());
    points.sort_by(|a, b| a.wavelength.total_cmp(&b.wavelength));

    let mut deduped: Vec<SpectrumPoint> = Vec::with_capacity(points.len());
    let mut duplicate_count = 0_usize;
    for point in points {
        if let Some(last) = deduped.last_mut() {
            if point.wavelength.total_cmp(&last.wavelength) == Ordering::Equal {
                *last = point;
                duplicate_count += 1;
                continue;
            }
        }
        deduped.push(point);
    }

    let filtered_count = original_len.saturating_sub(deduped.len() + duplicate_count);
    if filtered_count > 0 || duplicate_count > 0 {
        warn!(
            filtered_count,
            duplicate_count,
            canonical_count = deduped.len(),
            "canonicalized spectrum samples"
        );
    }
    deduped
}
