use serde::{Deserialize, Serialize};

use super::scale::LinearScale;
use super::types::{FitRange, SpectrumPoint};
use crate::error::{FitError, FitResult};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Margins {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Default for Margins {
    fn default() -> Self {
        Self {
            top: 10.0,
            right: 20.0,
            bottom: 30.0,
            left: 60.0,
        }
    }
}

/// Vertical split between the overview panel, the slice panel and the gap
/// separating them. Normalized to sum to one before use.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeightRatio {
    pub top: f64,
    pub bottom: f64,
    pub gap: f64,
}

impl Default for HeightRatio {
    fn default() -> Self {
        Self {
            top: 0.15,
            bottom: 0.80,
            gap: 0.05,
        }
    }
}

impl HeightRatio {
    pub fn normalized(self) -> FitResult<Self> {
        let parts = [self.top, self.bottom, self.gap];
        if parts.iter().any(|part| !part.is_finite() || *part < 0.0) {
            return Err(FitError::InvalidData(
                "height ratio parts must be finite and >= 0".to_owned(),
            ));
        }
        let total: f64 = parts.iter().sum();
        if total <= 0.0 || self.top <= 0.0 || self.bottom <= 0.0 {
            return Err(FitError::InvalidData(
                "height ratio top and bottom panels must be > 0".to_owned(),
            ));
        }
        Ok(Self {
            top: self.top / total,
            bottom: self.bottom / total,
            gap: self.gap / total,
        })
    }
}

/// Pixel geometry of the two-panel spectrum chart.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChartLayout {
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub margins: Margins,
    #[serde(default)]
    pub height_ratio: HeightRatio,
}

/// Pixel box of one panel: `x0..x1` left to right, `y0..y1` top to bottom.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PanelBox {
    pub x0: f64,
    pub x1: f64,
    pub y0: f64,
    pub y1: f64,
}

impl ChartLayout {
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            margins: Margins::default(),
            height_ratio: HeightRatio::default(),
        }
    }

    #[must_use]
    pub fn with_margins(mut self, margins: Margins) -> Self {
        self.margins = margins;
        self
    }

    #[must_use]
    pub fn with_height_ratio(mut self, height_ratio: HeightRatio) -> Self {
        self.height_ratio = height_ratio;
        self
    }

    pub fn validate(self) -> FitResult<Self> {
        let inner_width = self.width - self.margins.left - self.margins.right;
        let inner_height = self.height - self.margins.top - self.margins.bottom;
        if !inner_width.is_finite()
            || !inner_height.is_finite()
            || inner_width <= 0.0
            || inner_height <= 0.0
        {
            return Err(FitError::InvalidLayout {
                width: self.width,
                height: self.height,
            });
        }
        self.height_ratio.normalized()?;
        Ok(self)
    }

    /// Returns `(overview, slice)` panel boxes.
    pub fn panels(self) -> FitResult<(PanelBox, PanelBox)> {
        self.validate()?;
        let ratio = self.height_ratio.normalized()?;
        let inner_height = self.height - self.margins.top - self.margins.bottom;
        let x0 = self.margins.left;
        let x1 = self.width - self.margins.right;

        let top_y0 = self.margins.top;
        let top_y1 = top_y0 + ratio.top * inner_height;
        let bottom_y0 = top_y1 + ratio.gap * inner_height;
        let bottom_y1 = self.height - self.margins.bottom;

        Ok((
            PanelBox {
                x0,
                x1,
                y0: top_y0,
                y1: top_y1,
            },
            PanelBox {
                x0,
                x1,
                y0: bottom_y0,
                y1: bottom_y1,
            },
        ))
    }
}

/// Tuning for flux-domain autoscaling of the slice panel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FluxScaleTuning {
    pub padding_ratio: f64,
    pub min_span_absolute: f64,
}

impl Default for FluxScaleTuning {
    fn default() -> Self {
        Self {
            padding_ratio: 0.05,
            min_span_absolute: 1e-12,
        }
    }
}

impl FluxScaleTuning {
    pub fn validate(self) -> FitResult<Self> {
        if !self.padding_ratio.is_finite() || self.padding_ratio < 0.0 {
            return Err(FitError::InvalidData(
                "flux padding ratio must be finite and >= 0".to_owned(),
            ));
        }
        if !self.min_span_absolute.is_finite() || self.min_span_absolute <= 0.0 {
            return Err(FitError::InvalidData(
                "flux min span must be finite and > 0".to_owned(),
            ));
        }
        Ok(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScalePair {
    pub x: LinearScale,
    pub y: LinearScale,
}

impl ScalePair {
    /// `true` when the domain point maps inside the pair's pixel box.
    #[must_use]
    pub fn contains(self, wavelength: f64, flux: f64) -> bool {
        self.x.contains_pixel(self.x.scale(wavelength)) && self.y.contains_pixel(self.y.scale(flux))
    }
}

/// Overview ("brush") and zoomed ("slice") scale pairs for one render.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChartScales {
    pub brush: ScalePair,
    pub slice: ScalePair,
    pub slice_range: FitRange,
}

impl ChartScales {
    /// Derives both scale pairs.
    ///
    /// `overview` is the full spectrum; `slice_source` is the spectrum the
    /// slice panel displays (typically with subtracted models removed).
    pub fn build(
        overview: &[SpectrumPoint],
        slice_source: &[SpectrumPoint],
        slice_range: FitRange,
        layout: ChartLayout,
        tuning: FluxScaleTuning,
    ) -> FitResult<Self> {
        let tuning = tuning.validate()?;
        let slice_range = slice_range.validate()?;
        let (top, bottom) = layout.panels()?;

        let wavelength_extent = extent(overview.iter().map(|p| p.wavelength))
            .ok_or_else(|| FitError::InvalidData("spectrum must not be empty".to_owned()))?;
        let flux_extent = extent(overview.iter().map(|p| p.flux))
            .ok_or_else(|| FitError::InvalidData("spectrum flux must be finite".to_owned()))?;

        let brush = ScalePair {
            x: LinearScale::new(
                widen(wavelength_extent, tuning.min_span_absolute),
                (top.x0, top.x1),
            )?,
            y: LinearScale::new(
                widen(flux_extent, tuning.min_span_absolute),
                (top.y1, top.y0),
            )?,
        };

        let in_slice = slice_source
            .iter()
            .filter(|p| slice_range.contains(p.wavelength));
        let slice_flux = extent(in_slice.flat_map(|p| [p.flux_low(), p.flux_high()]))
            .unwrap_or(flux_extent);
        let padded = pad(slice_flux, tuning);

        let slice = ScalePair {
            x: LinearScale::new(
                widen((slice_range.min, slice_range.max), tuning.min_span_absolute),
                (bottom.x0, bottom.x1),
            )?,
            y: LinearScale::new(padded, (bottom.y1, bottom.y0))?,
        };

        Ok(Self {
            brush,
            slice,
            slice_range,
        })
    }
}

fn extent(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    values
        .filter(|value| value.is_finite())
        .fold(None, |acc, value| match acc {
            None => Some((value, value)),
            Some((low, high)) => Some((low.min(value), high.max(value))),
        })
}

fn widen((low, high): (f64, f64), min_span: f64) -> (f64, f64) {
    if high - low >= min_span {
        (low, high)
    } else {
        let half = 0.5 * min_span.max(low.abs().max(high.abs()) * 1e-6);
        let center = 0.5 * (low + high);
        (center - half, center + half)
    }
}

fn pad((low, high): (f64, f64), tuning: FluxScaleTuning) -> (f64, f64) {
    let span = high - low;
    if span < tuning.min_span_absolute {
        return widen((low, high), tuning.min_span_absolute);
    }
    let padding = span * tuning.padding_ratio;
    (low - padding, high + padding)
}
