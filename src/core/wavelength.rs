//! Conversion between canonical wavelengths (observed-frame micrometers) and
//! the unit/frame/redshift a user has chosen for display.
//!
//! Display values are always derived from canonical ones and never stored.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::warn;

const ANGSTROM_PER_MICROMETER: f64 = 10_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum WaveUnit {
    #[default]
    #[serde(rename = "um")]
    Micrometer,
    #[serde(rename = "AA")]
    Angstrom,
}

impl WaveUnit {
    #[must_use]
    pub fn suffix(self) -> &'static str {
        match self {
            Self::Micrometer => "µm",
            Self::Angstrom => "Å",
        }
    }

    #[must_use]
    fn scale(self) -> f64 {
        match self {
            Self::Micrometer => 1.0,
            Self::Angstrom => ANGSTROM_PER_MICROMETER,
        }
    }
}

impl fmt::Display for WaveUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.suffix())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum WaveFrame {
    #[default]
    Observe,
    Rest,
}

/// Multiplier taking canonical µm to display units.
///
/// May be non-finite or zero for degenerate redshifts (`z <= -1`).
#[must_use]
pub fn display_factor(unit: WaveUnit, frame: WaveFrame, redshift: f64) -> f64 {
    let frame_divisor = match frame {
        WaveFrame::Observe => 1.0,
        WaveFrame::Rest => 1.0 + redshift,
    };
    unit.scale() / frame_divisor
}

#[must_use]
pub fn to_display(value_obs_um: f64, unit: WaveUnit, frame: WaveFrame, redshift: f64) -> f64 {
    value_obs_um * display_factor(unit, frame, redshift)
}

#[must_use]
pub fn from_display(value_display: f64, unit: WaveUnit, frame: WaveFrame, redshift: f64) -> f64 {
    value_display / display_factor(unit, frame, redshift)
}

/// Like [`to_display`] but returns `None` for degenerate factors and
/// non-finite results.
#[must_use]
pub fn try_to_display(
    value_obs_um: f64,
    unit: WaveUnit,
    frame: WaveFrame,
    redshift: f64,
) -> Option<f64> {
    let factor = display_factor(unit, frame, redshift);
    usable_factor(factor).then(|| value_obs_um * factor).and_then(finite)
}

/// Like [`from_display`] but returns `None` for degenerate factors and
/// non-finite results.
#[must_use]
pub fn try_from_display(
    value_display: f64,
    unit: WaveUnit,
    frame: WaveFrame,
    redshift: f64,
) -> Option<f64> {
    let factor = display_factor(unit, frame, redshift);
    usable_factor(factor).then(|| value_display / factor).and_then(finite)
}

/// Formats a canonical wavelength for display, including the unit suffix.
#[must_use]
pub fn format(value_obs_um: f64, unit: WaveUnit, frame: WaveFrame, redshift: f64) -> String {
    let display = to_display(value_obs_um, unit, frame, redshift);
    format!("{} {}", format_number(display, unit), unit.suffix())
}

pub type WavelengthFormatterFn = Arc<dyn Fn(f64) -> String + Send + Sync + 'static>;

/// Unit-less formatter for axis tick labels, already in display units.
#[must_use]
pub fn formatter(unit: WaveUnit, frame: WaveFrame, redshift: f64) -> WavelengthFormatterFn {
    Arc::new(move |value_obs_um| {
        format_number(to_display(value_obs_um, unit, frame, redshift), unit)
    })
}

fn format_number(display: f64, unit: WaveUnit) -> String {
    if !display.is_finite() {
        return "–".to_owned();
    }
    match unit {
        WaveUnit::Micrometer => format!("{display:.4}"),
        WaveUnit::Angstrom => {
            let text = format!("{display:.1}");
            match text.strip_suffix(".0") {
                Some(trimmed) => trimmed.to_owned(),
                None => text,
            }
        }
    }
}

fn finite(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}

/// Display preference for one editing session.
///
/// Keeps the last usable factor so a degenerate redshift falls back to the
/// previous conversion instead of producing NaN/inf display values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DisplayContext {
    unit: WaveUnit,
    frame: WaveFrame,
    redshift: f64,
    #[serde(default = "default_factor")]
    last_valid_factor: f64,
}

fn default_factor() -> f64 {
    1.0
}

impl Default for DisplayContext {
    fn default() -> Self {
        Self::new(WaveUnit::Micrometer, WaveFrame::Observe, 0.0)
    }
}

impl DisplayContext {
    #[must_use]
    pub fn new(unit: WaveUnit, frame: WaveFrame, redshift: f64) -> Self {
        let mut context = Self {
            unit,
            frame,
            redshift,
            last_valid_factor: WaveUnit::Micrometer.scale(),
        };
        context.refresh_factor();
        context
    }

    #[must_use]
    pub fn unit(self) -> WaveUnit {
        self.unit
    }

    #[must_use]
    pub fn frame(self) -> WaveFrame {
        self.frame
    }

    #[must_use]
    pub fn redshift(self) -> f64 {
        self.redshift
    }

    pub fn set_unit(&mut self, unit: WaveUnit) {
        self.unit = unit;
        self.refresh_factor();
    }

    pub fn set_frame(&mut self, frame: WaveFrame) {
        self.frame = frame;
        self.refresh_factor();
    }

    pub fn set_redshift(&mut self, redshift: f64) {
        self.redshift = redshift;
        self.refresh_factor();
    }

    /// `true` when the current unit/frame/redshift yields a usable factor.
    #[must_use]
    pub fn is_degenerate(self) -> bool {
        !usable_factor(display_factor(self.unit, self.frame, self.redshift))
    }

    /// Factor actually used for conversions.
    #[must_use]
    pub fn factor(self) -> f64 {
        self.last_valid_factor
    }

    #[must_use]
    pub fn to_display(self, value_obs_um: f64) -> f64 {
        value_obs_um * self.factor()
    }

    /// Converts a display value back to canonical µm.
    ///
    /// Returns `None` when the current preference is degenerate, so edits made
    /// against a stale fallback factor are never written back.
    #[must_use]
    pub fn from_display(self, value_display: f64) -> Option<f64> {
        if self.is_degenerate() {
            return None;
        }
        try_from_display(value_display, self.unit, self.frame, self.redshift)
    }

    #[must_use]
    pub fn format(self, value_obs_um: f64) -> String {
        format!(
            "{} {}",
            format_number(self.to_display(value_obs_um), self.unit),
            self.unit.suffix()
        )
    }

    #[must_use]
    pub fn formatter(self) -> WavelengthFormatterFn {
        let factor = self.factor();
        let unit = self.unit;
        Arc::new(move |value_obs_um| format_number(value_obs_um * factor, unit))
    }

    fn refresh_factor(&mut self) {
        let factor = display_factor(self.unit, self.frame, self.redshift);
        if usable_factor(factor) {
            self.last_valid_factor = factor;
        } else {
            warn!(
                redshift = self.redshift,
                unit = %self.unit,
                "degenerate display factor; keeping last valid conversion"
            );
        }
    }
}

fn usable_factor(factor: f64) -> bool {
    factor.is_finite() && factor > 0.0
}
