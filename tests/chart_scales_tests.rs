use approx::assert_relative_eq;
use specfit_rs::FitError;
use specfit_rs::core::{
    ChartLayout, ChartScales, FitRange, FluxScaleTuning, HeightRatio, LinearScale, Margins,
    SpectrumPoint,
};

fn flat_layout() -> ChartLayout {
    ChartLayout::new(1000.0, 500.0).with_margins(Margins {
        top: 0.0,
        right: 0.0,
        bottom: 0.0,
        left: 0.0,
    })
}

fn spectrum() -> Vec<SpectrumPoint> {
    vec![
        SpectrumPoint::exact(1.0, 1.0),
        SpectrumPoint::new(1.5, 3.0, 2.0, 4.0),
        SpectrumPoint::exact(2.0, 10.0),
    ]
}

#[test]
fn height_ratio_normalizes_to_one() {
    let ratio = HeightRatio {
        top: 3.0,
        bottom: 16.0,
        gap: 1.0,
    }
    .normalized()
    .expect("valid ratio");
    assert_relative_eq!(ratio.top, 0.15, epsilon = 1e-12);
    assert_relative_eq!(ratio.bottom, 0.80, epsilon = 1e-12);
    assert_relative_eq!(ratio.gap, 0.05, epsilon = 1e-12);
}

#[test]
fn height_ratio_rejects_empty_panels() {
    let ratio = HeightRatio {
        top: 0.0,
        bottom: 1.0,
        gap: 0.0,
    };
    assert!(matches!(ratio.normalized(), Err(FitError::InvalidData(_))));
}

#[test]
fn panels_follow_height_ratio() {
    let (top, bottom) = flat_layout().panels().expect("valid layout");
    assert_relative_eq!(top.y0, 0.0);
    assert_relative_eq!(top.y1, 75.0, epsilon = 1e-9);
    assert_relative_eq!(bottom.y0, 100.0, epsilon = 1e-9);
    assert_relative_eq!(bottom.y1, 500.0);
    assert_relative_eq!(bottom.x1, 1000.0);
}

#[test]
fn layout_narrower_than_margins_is_rejected() {
    let err = ChartLayout::new(50.0, 400.0)
        .validate()
        .expect_err("margins exceed width");
    assert!(matches!(err, FitError::InvalidLayout { .. }));
}

#[test]
fn brush_scales_cover_full_extent_without_padding() {
    let data = spectrum();
    let scales = ChartScales::build(
        &data,
        &data,
        FitRange::new(1.2, 1.8),
        flat_layout(),
        FluxScaleTuning::default(),
    )
    .expect("build scales");

    assert_eq!(scales.brush.x.domain(), (1.0, 2.0));
    assert_eq!(scales.brush.y.domain(), (1.0, 10.0));
    assert_relative_eq!(scales.brush.x.scale(1.0), 0.0);
    assert_relative_eq!(scales.brush.x.scale(2.0), 1000.0);
}

#[test]
fn slice_flux_domain_includes_error_bounds_with_padding() {
    let data = spectrum();
    let scales = ChartScales::build(
        &data,
        &data,
        FitRange::new(1.2, 1.8),
        flat_layout(),
        FluxScaleTuning::default(),
    )
    .expect("build scales");

    let (low, high) = scales.slice.y.domain();
    assert_relative_eq!(low, 1.9, epsilon = 1e-12);
    assert_relative_eq!(high, 4.1, epsilon = 1e-12);
    assert_eq!(scales.slice.x.domain(), (1.2, 1.8));
    // Larger flux sits higher on screen.
    assert!(scales.slice.y.scale(high) < scales.slice.y.scale(low));
}

#[test]
fn empty_slice_falls_back_to_full_flux_extent() {
    let data = spectrum();
    let scales = ChartScales::build(
        &data,
        &data,
        FitRange::new(1.1, 1.2),
        flat_layout(),
        FluxScaleTuning::default(),
    )
    .expect("build scales");

    let (low, high) = scales.slice.y.domain();
    assert_relative_eq!(low, 0.55, epsilon = 1e-12);
    assert_relative_eq!(high, 10.45, epsilon = 1e-12);
}

#[test]
fn empty_spectrum_is_rejected() {
    let err = ChartScales::build(
        &[],
        &[],
        FitRange::new(1.0, 2.0),
        flat_layout(),
        FluxScaleTuning::default(),
    )
    .expect_err("no data");
    assert!(matches!(err, FitError::InvalidData(_)));
}

#[test]
fn inverted_scale_round_trips() {
    let scale = LinearScale::new((1.9, 4.1), (500.0, 100.0)).expect("valid scale");
    for value in [1.9, 2.5, 3.3, 4.1] {
        assert_relative_eq!(scale.invert(scale.scale(value)), value, epsilon = 1e-12);
    }
    assert_relative_eq!(scale.invert_delta(300.0, 200.0), 0.55, epsilon = 1e-12);
}

#[test]
fn zero_width_scale_is_rejected() {
    assert!(LinearScale::new((1.0, 1.0), (0.0, 100.0)).is_err());
    assert!(LinearScale::new((0.0, 1.0), (f64::NAN, 100.0)).is_err());
}
