use approx::assert_relative_eq;
use specfit_rs::api::ModelField;
use specfit_rs::core::{
    ChartLayout, FitParam, FitRange, Margins, ModelKind, SpectrumPoint, WaveFrame, WaveUnit,
};
use specfit_rs::interaction::{BrushEvent, HandleKind, HandlePointerEvent};
use specfit_rs::{FitError, FitSession, FitSessionConfig};

fn config() -> FitSessionConfig {
    FitSessionConfig::new(ChartLayout::new(1000.0, 500.0).with_margins(Margins {
        top: 0.0,
        right: 0.0,
        bottom: 0.0,
        left: 0.0,
    }))
}

/// Flat continuum at 2.0 with a line of height 3.0 at 1.5 µm.
fn spectrum() -> Vec<SpectrumPoint> {
    (0..=100)
        .map(|index| {
            let wavelength = 1.0 + 0.01 * f64::from(index);
            let offset = wavelength - 1.5;
            let flux = 2.0 + 3.0 * (-(offset * offset) / (2.0 * 0.01 * 0.01)).exp();
            SpectrumPoint::new(wavelength, flux, flux - 0.1, flux + 0.1)
        })
        .collect()
}

fn session() -> FitSession {
    let mut session = FitSession::new(config()).expect("session");
    session.set_spectrum(spectrum()).expect("spectrum");
    session
}

#[test]
fn loading_a_spectrum_selects_its_full_extent() {
    let session = session();
    assert_eq!(session.slice_range(), Some(FitRange::new(1.0, 2.0)));
    let (x0, x1) = session.brush_extent_px().expect("brush extent");
    assert_relative_eq!(x0, 0.0);
    assert_relative_eq!(x1, 1000.0);
}

#[test]
fn spectrum_is_canonicalized() {
    let mut session = FitSession::new(config()).expect("session");
    session
        .set_spectrum(vec![
            SpectrumPoint::exact(2.0, 1.0),
            SpectrumPoint::exact(f64::NAN, 1.0),
            SpectrumPoint::exact(1.0, 1.0),
            SpectrumPoint::exact(2.0, 3.0),
        ])
        .expect("spectrum");
    let wavelengths: Vec<f64> = session.spectrum().iter().map(|p| p.wavelength).collect();
    assert_eq!(wavelengths, vec![1.0, 2.0]);
    assert_eq!(session.spectrum()[1].flux, 3.0);

    let err = session
        .set_spectrum(vec![SpectrumPoint::exact(f64::NAN, 1.0)])
        .expect_err("no finite samples");
    assert!(matches!(err, FitError::InvalidData(_)));
}

#[test]
fn slice_range_is_ordered_and_moves_the_brush() {
    let mut session = session();
    let extent = session
        .set_slice_range(1.6, 1.4)
        .expect("slice")
        .expect("brush extent");
    assert_eq!(session.slice_range(), Some(FitRange::new(1.4, 1.6)));
    assert_relative_eq!(extent.0, 400.0, epsilon = 1e-9);
    assert_relative_eq!(extent.1, 600.0, epsilon = 1e-9);

    session.set_slice_range(1.5, 1.5).expect("collapsed input");
    assert_eq!(session.slice_range(), Some(FitRange::new(1.4, 1.6)));
}

#[test]
fn brush_events_update_slice_except_echoes() {
    let mut session = session();
    let range = session
        .handle_brush_event(BrushEvent::user(200.0, 800.0))
        .expect("brush")
        .expect("published range");
    assert_relative_eq!(range.min, 1.2, epsilon = 1e-12);
    assert_relative_eq!(range.max, 1.8, epsilon = 1e-12);

    let echo = session
        .handle_brush_event(BrushEvent::programmatic(0.0, 1000.0))
        .expect("brush");
    assert_eq!(echo, None);
    assert_eq!(session.slice_range(), Some(range));
}

#[test]
fn initial_models_are_seeded_from_visible_flux() {
    let mut session = session();
    assert!(session.ensure_initial_models().expect("seed"));
    assert!(!session.ensure_initial_models().expect("seed again"));

    let models = session.store().models();
    assert_eq!(models.len(), 2);
    let continuum = models[0].linear().expect("linear");
    let line = models[1].gaussian().expect("gaussian");
    assert_relative_eq!(continuum.b, 2.0, epsilon = 1e-9);
    assert_relative_eq!(line.amplitude, 3.0, epsilon = 1e-9);
    assert_relative_eq!(line.mu, 1.5, epsilon = 1e-12);
}

#[test]
fn subtracted_models_are_removed_from_the_slice_view() {
    let mut session = session();
    session.ensure_initial_models().expect("seed");
    assert_eq!(session.drawn_curves().expect("curves").len(), 2);

    session.store_mut().toggle_subtracted(1, true).expect("subtract");
    let curves = session.drawn_curves().expect("curves");
    assert_eq!(curves.len(), 1);
    assert_eq!(curves[0].model_id, 2);

    let subtracted = session.subtracted_spectrum();
    let peak = subtracted
        .iter()
        .find(|p| p.wavelength == 1.5)
        .expect("peak sample");
    assert_relative_eq!(peak.flux, 3.0, epsilon = 1e-9);
    assert_relative_eq!(peak.flux_plus_err, 3.1, epsilon = 1e-9);
}

#[test]
fn derived_data_is_memoized_until_inputs_change() {
    let mut session = session();
    let first = session.scales().expect("scales");
    let stats = session.cache_stats();
    let second = session.scales().expect("scales");
    assert_eq!(first, second);
    assert!(session.cache_stats().hits > stats.hits);
    assert_eq!(session.cache_stats().misses, stats.misses);

    session.add_model(ModelKind::Linear).expect("add");
    session.scales().expect("scales");
    assert!(session.cache_stats().misses > stats.misses);
}

#[test]
fn wavelength_fields_are_edited_in_display_units() {
    let config = config().with_display(WaveUnit::Angstrom, WaveFrame::Observe, 0.0);
    let mut session = FitSession::new(config).expect("session");
    session.set_spectrum(spectrum()).expect("spectrum");
    let id = session.add_model(ModelKind::Gaussian).expect("add");

    assert!(session
        .set_model_field_from_input(id, ModelField::Param(FitParam::Mu), " 15100 ")
        .expect("input"));
    let mu = session.store().model(id).and_then(|m| m.param(FitParam::Mu));
    assert_relative_eq!(mu.expect("mu"), 1.51, epsilon = 1e-12);
    assert_relative_eq!(
        session
            .model_field_display(id, ModelField::Param(FitParam::Mu))
            .expect("display"),
        15100.0,
        epsilon = 1e-6
    );

    assert!(!session
        .set_model_field_from_input(id, ModelField::Param(FitParam::Mu), "abc")
        .expect("input"));
}

#[test]
fn degenerate_redshift_skips_wavelength_input() {
    let mut session = session();
    let id = session.add_model(ModelKind::Gaussian).expect("add");
    session.display_mut().set_frame(WaveFrame::Rest);
    session.display_mut().set_redshift(-1.0);
    let before = session.store().model(id).cloned();

    assert!(!session
        .set_model_field_from_input(id, ModelField::Param(FitParam::Mu), "1.4")
        .expect("input"));
    assert_eq!(session.store().model(id).cloned(), before);

    assert!(session
        .set_model_field_from_input(id, ModelField::Param(FitParam::Amplitude), "4.5")
        .expect("input"));
}

#[test]
fn typed_range_bounds_are_clamped_to_the_slice() {
    let mut session = session();
    session.set_slice_range(1.2, 1.8).expect("slice");
    let id = session.add_model(ModelKind::Linear).expect("add");

    session
        .set_model_field_from_input(id, ModelField::RangeMin, "0.5")
        .expect("input");
    session
        .set_model_field_from_input(id, ModelField::RangeMax, "1.7")
        .expect("input");
    let range = session.store().model(id).map(|m| m.range).expect("model");
    assert_eq!(range, FitRange::new(1.2, 1.7));
}

#[test]
fn handles_drive_drag_gestures_end_to_end() {
    let mut session = session();
    session.ensure_initial_models().expect("seed");
    let peak = session
        .handles()
        .expect("handles")
        .into_iter()
        .find(|h| h.handle == HandleKind::GaussianPeak)
        .expect("peak handle");

    let down = HandlePointerEvent::new(HandleKind::GaussianPeak, 2, peak.x_px, peak.y_px);
    assert!(session.pointer_down(down).is_captured());
    let step = HandlePointerEvent::new(HandleKind::GaussianPeak, 2, peak.x_px + 10.0, peak.y_px);
    assert!(session.pointer_move(step).expect("move").is_captured());
    assert_eq!(session.pointer_up(step).expect("release"), Some(2));

    let mu = session.store().model(2).and_then(|m| m.param(FitParam::Mu));
    assert_relative_eq!(mu.expect("mu"), 1.51, epsilon = 1e-9);
    assert!(!session.drag_controller().is_dragging());
}

#[test]
fn brush_is_locked_while_a_handle_drag_runs() {
    let mut session = session();
    session.ensure_initial_models().expect("seed");
    let peak = session
        .handles()
        .expect("handles")
        .into_iter()
        .find(|h| h.handle == HandleKind::GaussianPeak)
        .expect("peak handle");
    let down = HandlePointerEvent::new(HandleKind::GaussianPeak, 2, peak.x_px, peak.y_px);
    assert!(session.pointer_down(down).is_captured());

    let before = session.slice_range();
    let brushed = session
        .handle_brush_event(BrushEvent::user(100.0, 200.0))
        .expect("brush");
    assert_eq!(brushed, None);
    assert_eq!(session.slice_range(), before);

    let step = HandlePointerEvent::new(HandleKind::GaussianPeak, 2, peak.x_px + 10.0, peak.y_px);
    session.pointer_move(step).expect("move");
    assert_eq!(session.pointer_up(step).expect("release"), Some(2));
    let mu = session.store().model(2).and_then(|m| m.param(FitParam::Mu));
    assert_relative_eq!(mu.expect("mu"), 1.51, epsilon = 1e-9);

    let brushed = session
        .handle_brush_event(BrushEvent::user(100.0, 200.0))
        .expect("brush")
        .expect("published range");
    assert_relative_eq!(brushed.min, 1.1, epsilon = 1e-12);
    assert_relative_eq!(brushed.max, 1.2, epsilon = 1e-12);
}

#[test]
fn session_config_round_trips_through_json() {
    let config = config()
        .with_sample_points(64)
        .with_display(WaveUnit::Angstrom, WaveFrame::Rest, 0.25);
    let json = config.to_json_pretty().expect("serialize");
    let parsed = FitSessionConfig::from_json_str(&json).expect("parse");
    assert_eq!(parsed, config);

    let minimal = FitSessionConfig::from_json_str(r#"{"layout":{"width":800.0,"height":600.0}}"#)
        .expect("defaults");
    assert_eq!(minimal.sample_points, 201);
    assert_eq!(minimal.unit, WaveUnit::Micrometer);
}

#[test]
fn invalid_config_is_rejected() {
    let err = FitSession::new(config().with_sample_points(1)).expect_err("too few points");
    assert!(matches!(err, FitError::InvalidData(_)));
    let err = FitSession::new(FitSessionConfig::new(ChartLayout::new(10.0, 10.0)))
        .expect_err("layout too small");
    assert!(matches!(err, FitError::InvalidLayout { .. }));
}
