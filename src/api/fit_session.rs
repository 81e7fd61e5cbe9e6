use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::core::{
    ChartScales, CurvePoint, DisplayContext, FitModel, FitRange, ModelId, ModelKind,
    SpectrumPoint, sample, subtract_models,
};
use crate::error::FitResult;
use crate::interaction::{BrushSync, HandlePlacement};

use super::derived_cache::{DerivedCacheStats, DerivedKey, MemoSlot};
use super::drag_controller::{DragHandleController, visible_handles};
use super::prior_editor::PriorEditor;
use super::session_config::FitSessionConfig;
use super::store::{FitModelStore, ModelDefaults};

/// Sampled overlay curve of one drawn model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelCurve {
    pub model_id: ModelId,
    pub color: String,
    pub opacity: f64,
    pub points: Vec<CurvePoint>,
}

/// One editing session: spectrum, slice range, display preference, model
/// store and the gesture state driving it.
///
/// Derived render data (subtracted spectrum, scales, curves) is memoized on
/// the spectrum generation, layout generation, store version and slice range.
#[derive(Debug)]
pub struct FitSession {
    pub(super) config: FitSessionConfig,
    pub(super) store: FitModelStore,
    pub(super) drag: DragHandleController,
    pub(super) brush: BrushSync,
    pub(super) prior_editor: PriorEditor,
    pub(super) spectrum: Arc<Vec<SpectrumPoint>>,
    pub(super) spectrum_generation: u64,
    pub(super) layout_generation: u64,
    pub(super) slice_range: Option<FitRange>,
    pub(super) cache_stats: DerivedCacheStats,
    pub(super) subtracted_cache: MemoSlot<(u64, u64), Arc<Vec<SpectrumPoint>>>,
    pub(super) scales_cache: MemoSlot<DerivedKey, ChartScales>,
    pub(super) curves_cache: MemoSlot<DerivedKey, Arc<Vec<ModelCurve>>>,
}

impl FitSession {
    pub fn new(config: FitSessionConfig) -> FitResult<Self> {
        config.validate()?;
        Ok(Self {
            store: FitModelStore::with_palette(config.palette.clone()),
            prior_editor: PriorEditor::with_display(config.display_context()),
            config,
            drag: DragHandleController::new(),
            brush: BrushSync::default(),
            spectrum: Arc::new(Vec::new()),
            spectrum_generation: 0,
            layout_generation: 0,
            slice_range: None,
            cache_stats: DerivedCacheStats::default(),
            subtracted_cache: MemoSlot::default(),
            scales_cache: MemoSlot::default(),
            curves_cache: MemoSlot::default(),
        })
    }

    #[must_use]
    pub fn config(&self) -> &FitSessionConfig {
        &self.config
    }

    #[must_use]
    pub fn store(&self) -> &FitModelStore {
        &self.store
    }

    /// Mutable store access; every mutation bumps the store version, which
    /// invalidates derived data.
    pub fn store_mut(&mut self) -> &mut FitModelStore {
        &mut self.store
    }

    #[must_use]
    pub fn prior_editor(&self) -> &PriorEditor {
        &self.prior_editor
    }

    /// Splits out the prior editor together with the store it writes to.
    pub fn prior_editor_and_store(&mut self) -> (&mut PriorEditor, &mut FitModelStore) {
        (&mut self.prior_editor, &mut self.store)
    }

    #[must_use]
    pub fn display(&self) -> DisplayContext {
        self.prior_editor.display()
    }

    /// Display preference shared by typed field input and the prior editor.
    pub fn display_mut(&mut self) -> &mut DisplayContext {
        self.prior_editor.display_mut()
    }

    #[must_use]
    pub fn drag_controller(&self) -> &DragHandleController {
        &self.drag
    }

    #[must_use]
    pub fn cache_stats(&self) -> DerivedCacheStats {
        self.cache_stats
    }

    pub(super) fn derived_key(&self, slice: FitRange) -> DerivedKey {
        DerivedKey::new(
            self.spectrum_generation,
            self.layout_generation,
            self.store.version(),
            slice,
        )
    }

    /// Spectrum with every subtracted model removed.
    pub fn subtracted_spectrum(&mut self) -> Arc<Vec<SpectrumPoint>> {
        let key = (self.spectrum_generation, self.store.version());
        let spectrum = &self.spectrum;
        let store = &self.store;
        let result = self
            .subtracted_cache
            .get_or_try_insert_with(key, &mut self.cache_stats, || {
                let subtracted: Vec<&FitModel> = store.subtracted_models().collect();
                Ok(Arc::new(subtract_models(spectrum, &subtracted)))
            });
        match result {
            Ok(points) => points,
            Err(_) => Arc::clone(&self.spectrum),
        }
    }

    /// Overview and slice scale pairs for the current state.
    pub fn scales(&mut self) -> FitResult<ChartScales> {
        let slice = self.require_slice_range()?;
        let key = self.derived_key(slice);
        let slice_source = self.subtracted_spectrum();
        let overview = Arc::clone(&self.spectrum);
        let layout = self.config.layout;
        let tuning = self.config.flux_scale_tuning;
        self.scales_cache
            .get_or_try_insert_with(key, &mut self.cache_stats, || {
                ChartScales::build(&overview, &slice_source, slice, layout, tuning)
            })
    }

    /// Overlay curves of drawn (non-subtracted) models within the slice.
    pub fn drawn_curves(&mut self) -> FitResult<Arc<Vec<ModelCurve>>> {
        let scales = self.scales()?;
        let key = self.derived_key(scales.slice_range);
        let store = &self.store;
        let sample_points = self.config.sample_points;
        self.curves_cache
            .get_or_try_insert_with(key, &mut self.cache_stats, || {
                Ok(Arc::new(
                    store
                        .drawn_models()
                        .map(|model| ModelCurve {
                            model_id: model.id,
                            color: model.color.clone(),
                            opacity: model.render_opacity(),
                            points: sample(
                                model,
                                scales.slice_range,
                                sample_points,
                                Some(scales.slice.y),
                            ),
                        })
                        .collect(),
                ))
            })
    }

    /// Handles of drawn models that currently fall inside the slice panel.
    pub fn handles(&mut self) -> FitResult<Vec<HandlePlacement>> {
        let scales = self.scales()?;
        Ok(self
            .store
            .drawn_models()
            .flat_map(|model| visible_handles(model, scales.slice, scales.slice_range))
            .collect())
    }

    /// Adds a model centered on the slice, seeded from the visible flux.
    pub fn add_model(&mut self, kind: ModelKind) -> FitResult<ModelId> {
        let slice = self.require_slice_range()?;
        let defaults = self.model_defaults(slice);
        self.store.add_model_with_defaults(kind, slice, defaults)
    }

    /// Seeds one linear and one Gaussian model if the store is empty.
    pub fn ensure_initial_models(&mut self) -> FitResult<bool> {
        let slice = self.require_slice_range()?;
        let defaults = self.model_defaults(slice);
        self.store.ensure_initial_models_with_defaults(slice, defaults)
    }

    fn model_defaults(&mut self, slice: FitRange) -> ModelDefaults {
        let source = self.subtracted_spectrum();
        let mut fluxes: Vec<f64> = source
            .iter()
            .filter(|point| slice.contains(point.wavelength) && point.flux.is_finite())
            .map(|point| point.flux)
            .collect();
        if fluxes.is_empty() {
            return ModelDefaults::default();
        }
        fluxes.sort_by(f64::total_cmp);
        let median = fluxes[fluxes.len() / 2];
        let peak = fluxes[fluxes.len() - 1];
        let amplitude = peak - median;
        ModelDefaults {
            continuum_level: median,
            line_amplitude: if amplitude > 0.0 {
                amplitude
            } else {
                ModelDefaults::default().line_amplitude
            },
        }
    }
}
