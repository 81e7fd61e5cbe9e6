use approx::assert_relative_eq;
use specfit_rs::api::{ModelPatch, clamp_range_to_slice};
use specfit_rs::core::{
    FitParam, FitPrior, FitRange, ModelKind, SpectrumPoint, sample_at, subtract_models,
};
use specfit_rs::{FitError, FitModelStore};

fn slice() -> FitRange {
    FitRange::new(1.0, 1.2)
}

#[test]
fn new_gaussian_is_centered_on_the_slice() {
    let mut store = FitModelStore::new();
    let id = store
        .add_model(ModelKind::Gaussian, slice())
        .expect("add model");
    let model = store.model(id).expect("model exists");

    assert_eq!(model.range, slice());
    assert_eq!(model.name, "Gaussian 1");
    assert!(model.active);
    assert!(!model.subtracted);
    let shape = model.gaussian().expect("gaussian shape");
    assert_relative_eq!(shape.mu, 1.1, epsilon = 1e-12);
    assert_relative_eq!(shape.sigma, 0.01, epsilon = 1e-12);
    assert_relative_eq!(shape.amplitude, 1.0);
}

#[test]
fn new_linear_is_flat_at_the_default_level() {
    let mut store = FitModelStore::new();
    let id = store.add_model(ModelKind::Linear, slice()).expect("add model");
    let shape = store.model(id).and_then(|m| m.linear()).expect("linear");
    assert_eq!(shape.k, 0.0);
    assert_eq!(shape.b, 0.0);
    assert_relative_eq!(shape.x0, 1.1, epsilon = 1e-12);
}

#[test]
fn model_ids_are_never_reused() {
    let mut store = FitModelStore::new();
    let first = store.add_model(ModelKind::Linear, slice()).expect("add");
    let second = store.add_model(ModelKind::Gaussian, slice()).expect("add");
    store.remove_model(second).expect("remove");
    let third = store.add_model(ModelKind::Gaussian, slice()).expect("add");

    assert_eq!((first, second, third), (1, 2, 3));
    assert_eq!(store.models().len(), 2);
}

#[test]
fn ensure_initial_models_is_idempotent() {
    let mut store = FitModelStore::new();
    assert!(store.ensure_initial_models(slice()).expect("seed"));
    assert!(!store.ensure_initial_models(slice()).expect("seed again"));

    let kinds: Vec<ModelKind> = store.models().iter().map(|m| m.kind()).collect();
    assert_eq!(kinds, vec![ModelKind::Linear, ModelKind::Gaussian]);
}

#[test]
fn update_ignores_non_finite_values_and_foreign_params() {
    let mut store = FitModelStore::new();
    let id = store.add_model(ModelKind::Gaussian, slice()).expect("add");
    let before = store.model(id).cloned().expect("model");

    let patch = ModelPatch::new()
        .param(FitParam::Mu, f64::NAN)
        .param(FitParam::K, 3.0);
    assert!(!store.update_model(id, &patch).expect("update"));
    assert_eq!(store.model(id), Some(&before));
}

#[test]
fn sigma_is_stored_positive() {
    let mut store = FitModelStore::new();
    let id = store.add_model(ModelKind::Gaussian, slice()).expect("add");
    store
        .update_model(id, &ModelPatch::new().param(FitParam::Sigma, -0.02))
        .expect("update");
    let sigma = store.model(id).and_then(|m| m.param(FitParam::Sigma));
    assert_eq!(sigma, Some(0.02));
}

#[test]
fn zero_sigma_keeps_the_previous_width() {
    let mut store = FitModelStore::new();
    let id = store.add_model(ModelKind::Gaussian, slice()).expect("add");
    let before = store.model(id).and_then(|m| m.param(FitParam::Sigma));
    let version = store.version();

    let changed = store
        .update_model(id, &ModelPatch::new().param(FitParam::Sigma, 0.0))
        .expect("update");
    assert!(!changed);
    assert_eq!(store.version(), version);

    let model = store.model(id).expect("model");
    assert_eq!(model.param(FitParam::Sigma), before);
    let mu = model.param(FitParam::Mu).expect("mu");
    assert!(sample_at(model, mu).is_finite());
    let subtracted = subtract_models(&[SpectrumPoint::exact(mu, 5.0)], &[model]);
    assert!(subtracted[0].flux.is_finite());
}

#[test]
fn inactive_models_keep_numeric_fields() {
    let mut store = FitModelStore::new();
    let id = store.add_model(ModelKind::Gaussian, slice()).expect("add");
    assert!(store.toggle_active(id, false).expect("deactivate"));
    let version = store.version();

    let patch = ModelPatch::new().param(FitParam::Mu, 1.05).range(1.0, 1.1);
    assert!(!store.update_model(id, &patch).expect("frozen update"));
    assert_eq!(store.version(), version);

    assert!(store.rename_model(id, "Hα").expect("rename"));
    let model = store.model(id).expect("model");
    assert_eq!(model.name, "Hα");
    assert_eq!(model.range, slice());
    assert_relative_eq!(model.render_opacity(), 0.6);
}

#[test]
fn validate_clamps_range_into_slice() {
    let mut store = FitModelStore::new();
    let id = store
        .add_model(ModelKind::Linear, FitRange::new(1.0, 2.0))
        .expect("add");
    store
        .update_model(id, &ModelPatch::new().range(0.5, 2.5))
        .expect("widen");

    let narrowed = FitRange::new(1.2, 1.8);
    assert!(store.validate_model(id, narrowed).expect("validate"));
    assert_eq!(store.model(id).map(|m| m.range), Some(narrowed));
    assert!(!store.validate_model(id, narrowed).expect("already valid"));
}

#[test]
fn clamp_collapses_ranges_outside_the_slice() {
    let slice = FitRange::new(1.0, 2.0);
    assert_eq!(
        clamp_range_to_slice(FitRange::new(2.5, 3.0), slice),
        FitRange::new(2.0, 2.0)
    );
    assert_eq!(
        clamp_range_to_slice(FitRange::new(0.1, 0.5), slice),
        FitRange::new(1.0, 1.0)
    );
}

#[test]
fn subtracted_models_leave_the_drawn_set() {
    let mut store = FitModelStore::new();
    store.ensure_initial_models(slice()).expect("seed");
    assert!(store.toggle_subtracted(1, true).expect("subtract"));

    let drawn: Vec<u64> = store.drawn_models().map(|m| m.id).collect();
    let subtracted: Vec<u64> = store.subtracted_models().map(|m| m.id).collect();
    assert_eq!(drawn, vec![2]);
    assert_eq!(subtracted, vec![1]);
}

#[test]
fn unknown_ids_are_reported() {
    let mut store = FitModelStore::new();
    assert!(matches!(
        store.remove_model(42),
        Err(FitError::UnknownModel(42))
    ));
    assert!(matches!(
        store.toggle_configuration_selection(7),
        Err(FitError::UnknownConfiguration(7))
    ));
}

#[test]
fn priors_must_match_model_kind_and_be_finite() {
    let mut store = FitModelStore::new();
    let id = store.add_model(ModelKind::Gaussian, slice()).expect("add");

    let err = store
        .set_model_prior(id, FitParam::K, Some(FitPrior::Fixed { value: 1.0 }))
        .expect_err("k is not a gaussian parameter");
    assert!(matches!(err, FitError::InvalidData(_)));

    let nan_prior = FitPrior::Normal {
        mu: f64::NAN,
        sigma: 1.0,
    };
    assert!(!store
        .set_model_prior(id, FitParam::Mu, Some(nan_prior))
        .expect("ignored"));
    assert!(store.model(id).and_then(|m| m.prior(FitParam::Mu)).is_none());

    let fixed = FitPrior::Fixed { value: 1.1 };
    assert!(store.set_model_prior(id, FitParam::Mu, Some(fixed)).expect("set"));
    assert!(!store.set_model_prior(id, FitParam::Mu, Some(fixed)).expect("unchanged"));
    assert!(store.set_model_prior(id, FitParam::Mu, None).expect("clear"));
}

#[test]
fn saved_configuration_is_a_deep_copy() {
    let mut store = FitModelStore::new();
    store.ensure_initial_models(slice()).expect("seed");
    let config_id = store.save_current_configuration();

    store
        .update_model(2, &ModelPatch::new().param(FitParam::Amplitude, 9.0))
        .expect("edit live");
    let config = store.configuration(config_id).expect("config");
    assert_eq!(config.name, "Configuration 1");
    assert!(config.selected);
    assert_eq!(
        config.model(2).and_then(|m| m.param(FitParam::Amplitude)),
        Some(1.0)
    );
}

#[test]
fn configuration_priors_are_independent_of_live_models() {
    let mut store = FitModelStore::new();
    store.ensure_initial_models(slice()).expect("seed");
    let config_id = store.save_current_configuration();
    let prior = FitPrior::Uniform {
        lower: 0.5,
        upper: 1.5,
    };

    assert!(store
        .update_configuration_model_prior(config_id, 2, FitParam::Amplitude, Some(prior))
        .expect("config prior"));

    assert!(store.model(2).and_then(|m| m.prior(FitParam::Amplitude)).is_none());
    let config = store.configuration(config_id).expect("config");
    assert_eq!(
        config.model(2).and_then(|m| m.prior(FitParam::Amplitude)),
        Some(&prior)
    );
}

#[test]
fn configurations_can_be_renamed_toggled_and_removed() {
    let mut store = FitModelStore::new();
    store.ensure_initial_models(slice()).expect("seed");
    let first = store.save_current_configuration();
    let second = store.save_current_configuration();

    store.rename_configuration(first, "narrow lines").expect("rename");
    assert!(!store.toggle_configuration_selection(second).expect("toggle"));
    let selected: Vec<&str> = store
        .selected_configurations()
        .map(|c| c.name.as_str())
        .collect();
    assert_eq!(selected, vec!["narrow lines"]);

    store.remove_configuration(first).expect("remove");
    assert_eq!(store.configurations().len(), 1);
    assert_eq!(store.save_current_configuration(), 3);
}

#[test]
fn every_mutation_bumps_the_version() {
    let mut store = FitModelStore::new();
    assert_eq!(store.version(), 0);
    let id = store.add_model(ModelKind::Linear, slice()).expect("add");
    assert_eq!(store.version(), 1);
    store
        .update_model(id, &ModelPatch::new().param(FitParam::B, 2.0))
        .expect("update");
    assert_eq!(store.version(), 2);
    store.save_current_configuration();
    assert_eq!(store.version(), 3);
}
