use super::model::{FitModel, ModelShape};
use super::scale::LinearScale;
use super::types::{CurvePoint, FitRange, SpectrumPoint};

/// Default number of vertices used for curved model rendering.
pub const DEFAULT_SAMPLE_POINTS: usize = 201;

/// Evaluates a model at one wavelength, ignoring the model's own range.
#[must_use]
pub fn sample_at(model: &FitModel, wavelength: f64) -> f64 {
    model.shape.flux(wavelength)
}

/// Samples `model` across `range ∩ model.range`.
///
/// Linear models always yield the two endpoints of the intersection.
/// Gaussian models yield up to `n_points` evenly spaced vertices; when
/// `y_scale` is given, vertices whose pixel-y falls outside that scale's
/// pixel range are dropped. An empty intersection yields no points.
#[must_use]
pub fn sample(
    model: &FitModel,
    range: FitRange,
    n_points: usize,
    y_scale: Option<LinearScale>,
) -> Vec<CurvePoint> {
    let window = range.intersect(model.range);
    if window.is_empty() || !window.is_finite() {
        return Vec::new();
    }

    match model.shape {
        ModelShape::Linear(shape) => vec![
            CurvePoint::new(window.min, shape.flux(window.min)),
            CurvePoint::new(window.max, shape.flux(window.max)),
        ],
        ModelShape::Gaussian(shape) => {
            let visible = |flux: f64| {
                y_scale.is_none_or(|scale| scale.contains_pixel(scale.scale(flux)))
            };
            evenly_spaced(window, n_points)
                .map(|wavelength| CurvePoint::new(wavelength, shape.flux(wavelength)))
                .filter(|point| point.flux.is_finite() && visible(point.flux))
                .collect()
        }
    }
}

fn evenly_spaced(window: FitRange, n_points: usize) -> impl Iterator<Item = f64> {
    let count = n_points.max(2);
    let step = window.span() / (count - 1) as f64;
    (0..count).map(move |index| {
        if index == count - 1 {
            window.max
        } else {
            window.min + step * index as f64
        }
    })
}

/// Sum of all `models` evaluated at `wavelength`.
#[must_use]
pub fn total_flux_at<'a>(models: impl IntoIterator<Item = &'a FitModel>, wavelength: f64) -> f64 {
    models
        .into_iter()
        .map(|model| sample_at(model, wavelength))
        .sum()
}

/// Returns the spectrum with the summed flux of `models` removed from every
/// sample (flux and both error bounds).
#[must_use]
pub fn subtract_models(spectrum: &[SpectrumPoint], models: &[&FitModel]) -> Vec<SpectrumPoint> {
    if models.is_empty() {
        return spectrum.to_vec();
    }

    let subtract_one = |point: &SpectrumPoint| {
        let continuum = total_flux_at(models.iter().copied(), point.wavelength);
        SpectrumPoint::new(
            point.wavelength,
            point.flux - continuum,
            point.flux_minus_err - continuum,
            point.flux_plus_err - continuum,
        )
    };

    #[cfg(feature = "parallel-subtraction")]
    {
        use rayon::prelude::*;
        spectrum.par_iter().map(subtract_one).collect()
    }

    #[cfg(not(feature = "parallel-subtraction"))]
    {
        spectrum.iter().map(subtract_one).collect()
    }
}
