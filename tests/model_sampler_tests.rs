use approx::assert_relative_eq;
use specfit_rs::core::{
    CurvePoint, FitModel, FitRange, GaussianShape, LinearScale, LinearShape, ModelShape,
    SpectrumPoint, sample, sample_at, subtract_models, total_flux_at,
};

fn linear(id: u64, range: FitRange, k: f64, b: f64, x0: f64) -> FitModel {
    FitModel::new(
        id,
        format!("Linear {id}"),
        range,
        ModelShape::Linear(LinearShape { k, b, x0 }),
    )
}

fn gaussian(id: u64, range: FitRange, amplitude: f64, mu: f64, sigma: f64) -> FitModel {
    FitModel::new(
        id,
        format!("Gaussian {id}"),
        range,
        ModelShape::Gaussian(GaussianShape {
            amplitude,
            mu,
            sigma,
        }),
    )
}

#[test]
fn flat_linear_model_samples_two_endpoints() {
    let model = linear(1, FitRange::new(0.9, 1.1), 0.0, 5.0, 1.0);
    let points = sample(&model, model.range, 2, None);
    assert_eq!(
        points,
        vec![CurvePoint::new(0.9, 5.0), CurvePoint::new(1.1, 5.0)]
    );
}

#[test]
fn linear_model_ignores_point_count() {
    let model = linear(1, FitRange::new(1.0, 2.0), 2.0, 1.0, 1.5);
    let points = sample(&model, FitRange::new(0.0, 1.8), 201, None);
    assert_eq!(points.len(), 2);
    assert_eq!(points[0], CurvePoint::new(1.0, 0.0));
    assert_relative_eq!(points[1].wavelength, 1.8);
    assert_relative_eq!(points[1].flux, 1.6, epsilon = 1e-12);
}

#[test]
fn gaussian_samples_span_the_intersection() {
    let model = gaussian(2, FitRange::new(1.6, 1.7), 4.0, 1.65, 0.01);
    let points = sample(&model, FitRange::new(1.0, 2.0), 201, None);

    assert_eq!(points.len(), 201);
    assert_eq!(points[0].wavelength, 1.6);
    assert_eq!(points[200].wavelength, 1.7);
    assert!(points.windows(2).all(|pair| pair[0].wavelength < pair[1].wavelength));
    assert_relative_eq!(points[100].wavelength, 1.65, epsilon = 1e-12);
    assert_relative_eq!(points[100].flux, 4.0, epsilon = 1e-9);
}

#[test]
fn gaussian_point_count_has_a_floor_of_two() {
    let model = gaussian(2, FitRange::new(1.6, 1.7), 4.0, 1.65, 0.01);
    let points = sample(&model, model.range, 0, None);
    assert_eq!(points.len(), 2);
}

#[test]
fn gaussian_vertices_outside_y_scale_are_dropped() {
    let model = gaussian(3, FitRange::new(1.0, 2.0), 10.0, 1.5, 0.1);
    let y = LinearScale::new((0.0, 5.0), (400.0, 100.0)).expect("valid scale");

    let points = sample(&model, model.range, 201, Some(y));

    assert!(!points.is_empty());
    assert!(points.len() < 201);
    assert!(points.iter().all(|point| point.flux <= 5.0 + 1e-9));
}

#[test]
fn disjoint_range_yields_no_points() {
    let model = gaussian(4, FitRange::new(1.6, 1.7), 4.0, 1.65, 0.01);
    assert!(sample(&model, FitRange::new(2.0, 3.0), 201, None).is_empty());

    let line = linear(5, FitRange::new(1.6, 1.7), 0.0, 1.0, 1.65);
    assert!(sample(&line, FitRange::new(2.0, 3.0), 201, None).is_empty());
}

#[test]
fn sample_at_ignores_model_range() {
    let model = linear(1, FitRange::new(1.0, 2.0), 1.0, 0.0, 0.0);
    assert_relative_eq!(sample_at(&model, 10.0), 10.0);
}

#[test]
fn subtraction_removes_summed_flux_from_every_bound() {
    let continuum = linear(1, FitRange::new(1.0, 2.0), 0.0, 2.0, 1.5);
    let line = gaussian(2, FitRange::new(1.0, 2.0), 3.0, 1.5, 0.05);
    let spectrum = vec![
        SpectrumPoint::new(1.4, 4.0, 3.5, 4.5),
        SpectrumPoint::new(1.5, 6.0, 5.5, 6.5),
    ];

    let result = subtract_models(&spectrum, &[&continuum, &line]);

    for (before, after) in spectrum.iter().zip(&result) {
        let removed = total_flux_at([&continuum, &line], before.wavelength);
        assert_eq!(after.wavelength, before.wavelength);
        assert_relative_eq!(after.flux, before.flux - removed, epsilon = 1e-12);
        assert_relative_eq!(after.flux_minus_err, before.flux_minus_err - removed, epsilon = 1e-12);
        assert_relative_eq!(after.flux_plus_err, before.flux_plus_err - removed, epsilon = 1e-12);
    }
    assert_relative_eq!(result[1].flux, 1.0, epsilon = 1e-12);
}

#[test]
fn zero_width_gaussian_stays_finite() {
    let line = gaussian(1, FitRange::new(1.0, 2.0), 4.0, 1.5, 0.0);
    assert_relative_eq!(sample_at(&line, 1.5), 4.0);
    assert_relative_eq!(sample_at(&line, 1.6), 0.0);

    let spectrum = vec![SpectrumPoint::exact(1.5, 5.0), SpectrumPoint::exact(1.6, 5.0)];
    let result = subtract_models(&spectrum, &[&line]);
    assert_relative_eq!(result[0].flux, 1.0);
    assert_relative_eq!(result[1].flux, 5.0);
}

#[test]
fn subtracting_nothing_returns_the_spectrum() {
    let spectrum = vec![SpectrumPoint::exact(1.0, 2.0)];
    assert_eq!(subtract_models(&spectrum, &[]), spectrum);
}
