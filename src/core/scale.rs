use serde::{Deserialize, Serialize};

use crate::error::{FitError, FitResult};

/// Affine mapping between a data domain and a pixel range.
///
/// The range may be reversed (`range_start > range_end`), which is how flux
/// axes put larger values nearer the top of the panel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearScale {
    domain_start: f64,
    domain_end: f64,
    range_start: f64,
    range_end: f64,
}

impl LinearScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> FitResult<Self> {
        let (domain_start, domain_end) = domain;
        let (range_start, range_end) = range;
        if !domain_start.is_finite() || !domain_end.is_finite() || domain_start == domain_end {
            return Err(FitError::InvalidData(
                "scale domain must be finite and non-zero".to_owned(),
            ));
        }
        if !range_start.is_finite() || !range_end.is_finite() || range_start == range_end {
            return Err(FitError::InvalidData(
                "scale range must be finite and non-zero".to_owned(),
            ));
        }

        Ok(Self {
            domain_start,
            domain_end,
            range_start,
            range_end,
        })
    }

    #[must_use]
    pub fn domain(self) -> (f64, f64) {
        (self.domain_start, self.domain_end)
    }

    #[must_use]
    pub fn range(self) -> (f64, f64) {
        (self.range_start, self.range_end)
    }

    /// Pixel range ordered as `(low, high)` regardless of orientation.
    #[must_use]
    pub fn range_extent(self) -> (f64, f64) {
        (
            self.range_start.min(self.range_end),
            self.range_start.max(self.range_end),
        )
    }

    /// Maps a domain value to pixel space. Non-finite input yields non-finite output.
    #[must_use]
    pub fn scale(self, value: f64) -> f64 {
        let normalized = (value - self.domain_start) / (self.domain_end - self.domain_start);
        self.range_start + normalized * (self.range_end - self.range_start)
    }

    /// Maps a pixel back to the domain; exact inverse of [`LinearScale::scale`].
    #[must_use]
    pub fn invert(self, pixel: f64) -> f64 {
        let normalized = (pixel - self.range_start) / (self.range_end - self.range_start);
        self.domain_start + normalized * (self.domain_end - self.domain_start)
    }

    /// Domain delta corresponding to a move from `from_px` to `to_px`.
    #[must_use]
    pub fn invert_delta(self, from_px: f64, to_px: f64) -> f64 {
        self.invert(to_px) - self.invert(from_px)
    }

    #[must_use]
    pub fn contains_pixel(self, pixel: f64) -> bool {
        let (low, high) = self.range_extent();
        pixel >= low && pixel <= high
    }
}
