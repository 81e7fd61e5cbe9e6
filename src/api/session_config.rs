use serde::{Deserialize, Serialize};

use crate::core::{
    ChartLayout, DEFAULT_SAMPLE_POINTS, DisplayContext, FluxScaleTuning, WaveFrame, WaveUnit,
};
use crate::error::{FitError, FitResult};

use super::store::DEFAULT_PALETTE;

/// Public session bootstrap configuration.
///
/// Serializable so host applications can persist/load editor setup without
/// inventing their own ad-hoc format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitSessionConfig {
    pub layout: ChartLayout,
    #[serde(default = "default_sample_points")]
    pub sample_points: usize,
    #[serde(default)]
    pub flux_scale_tuning: FluxScaleTuning,
    #[serde(default = "default_palette")]
    pub palette: Vec<String>,
    #[serde(default)]
    pub unit: WaveUnit,
    #[serde(default)]
    pub frame: WaveFrame,
    #[serde(default)]
    pub redshift: f64,
}

impl FitSessionConfig {
    /// Creates a config with default sampling, palette and display preference.
    #[must_use]
    pub fn new(layout: ChartLayout) -> Self {
        Self {
            layout,
            sample_points: default_sample_points(),
            flux_scale_tuning: FluxScaleTuning::default(),
            palette: default_palette(),
            unit: WaveUnit::default(),
            frame: WaveFrame::default(),
            redshift: 0.0,
        }
    }

    /// Sets the number of vertices used for Gaussian curves.
    #[must_use]
    pub fn with_sample_points(mut self, sample_points: usize) -> Self {
        self.sample_points = sample_points;
        self
    }

    /// Sets slice-panel flux padding.
    #[must_use]
    pub fn with_flux_scale_tuning(mut self, tuning: FluxScaleTuning) -> Self {
        self.flux_scale_tuning = tuning;
        self
    }

    #[must_use]
    pub fn with_palette(mut self, palette: Vec<String>) -> Self {
        self.palette = palette;
        self
    }

    /// Sets the initial display unit, frame and redshift.
    #[must_use]
    pub fn with_display(mut self, unit: WaveUnit, frame: WaveFrame, redshift: f64) -> Self {
        self.unit = unit;
        self.frame = frame;
        self.redshift = redshift;
        self
    }

    #[must_use]
    pub fn display_context(&self) -> DisplayContext {
        DisplayContext::new(self.unit, self.frame, self.redshift)
    }

    pub fn validate(&self) -> FitResult<()> {
        self.layout.validate()?;
        self.flux_scale_tuning.validate()?;
        if self.sample_points < 2 {
            return Err(FitError::InvalidData(
                "sample_points must be >= 2".to_owned(),
            ));
        }
        if self.palette.is_empty() || self.palette.iter().any(String::is_empty) {
            return Err(FitError::InvalidData(
                "palette must contain at least one non-empty color".to_owned(),
            ));
        }
        if !self.redshift.is_finite() {
            return Err(FitError::InvalidData(
                "redshift must be finite".to_owned(),
            ));
        }
        Ok(())
    }

    /// Serializes config to pretty JSON for debug/config files.
    pub fn to_json_pretty(&self) -> FitResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| FitError::Serialization(format!("failed to serialize config: {e}")))
    }

    /// Deserializes config from JSON.
    pub fn from_json_str(input: &str) -> FitResult<Self> {
        serde_json::from_str(input)
            .map_err(|e| FitError::InvalidData(format!("failed to parse config: {e}")))
    }
}

fn default_sample_points() -> usize {
    DEFAULT_SAMPLE_POINTS
}

fn default_palette() -> Vec<String> {
    DEFAULT_PALETTE.iter().map(|color| (*color).to_owned()).collect()
}
