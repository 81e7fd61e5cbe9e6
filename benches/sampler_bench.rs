use criterion::{Criterion, criterion_group, criterion_main};
use specfit_rs::api::ModelField;
use specfit_rs::core::{
    ChartLayout, FitModel, FitParam, FitRange, GaussianShape, LinearScale, LinearShape,
    ModelShape, SpectrumPoint, sample, subtract_models,
};
use specfit_rs::{FitSession, FitSessionConfig};
use std::hint::black_box;

fn line_model() -> FitModel {
    FitModel::new(
        2,
        "line",
        FitRange::new(1.0, 2.0),
        ModelShape::Gaussian(GaussianShape {
            amplitude: 3.0,
            mu: 1.5,
            sigma: 0.01,
        }),
    )
}

fn generated_spectrum(count: usize) -> Vec<SpectrumPoint> {
    let step = 1.0 / count as f64;
    (0..count)
        .map(|i| {
            let wavelength = 1.0 + step * i as f64;
            let flux = 2.0 + (wavelength * 40.0).sin() * 0.1;
            SpectrumPoint::new(wavelength, flux, flux - 0.05, flux + 0.05)
        })
        .collect()
}

fn bench_gaussian_sampling(c: &mut Criterion) {
    let model = line_model();
    let y = LinearScale::new((0.0, 4.0), (800.0, 100.0)).expect("valid scale");

    c.bench_function("gaussian_sample_201", |b| {
        b.iter(|| {
            let _ = sample(black_box(&model), model.range, 201, Some(y));
        })
    });
}

fn bench_subtraction_100k(c: &mut Criterion) {
    let spectrum = generated_spectrum(100_000);
    let continuum = FitModel::new(
        1,
        "continuum",
        FitRange::new(1.0, 2.0),
        ModelShape::Linear(LinearShape {
            k: 0.2,
            b: 2.0,
            x0: 1.5,
        }),
    );
    let line = line_model();

    c.bench_function("subtract_two_models_100k", |b| {
        b.iter(|| {
            let _ = subtract_models(black_box(&spectrum), &[&continuum, &line]);
        })
    });
}

fn bench_session_curves(c: &mut Criterion) {
    let mut session =
        FitSession::new(FitSessionConfig::new(ChartLayout::new(1600.0, 900.0))).expect("session");
    session
        .set_spectrum(generated_spectrum(20_000))
        .expect("spectrum");
    session.ensure_initial_models().expect("seed models");

    c.bench_function("session_curves_after_store_change", |b| {
        let mut amplitude = 1.0;
        b.iter(|| {
            amplitude += 1e-3;
            session
                .set_model_field_from_input(
                    2,
                    ModelField::Param(FitParam::Amplitude),
                    &amplitude.to_string(),
                )
                .expect("edit");
            let _ = session.drawn_curves().expect("curves");
        })
    });
}

criterion_group!(
    benches,
    bench_gaussian_sampling,
    bench_subtraction_100k,
    bench_session_curves
);
criterion_main!(benches);
