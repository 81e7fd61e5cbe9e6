pub mod chart_scales;
pub mod model;
pub mod prior;
pub mod sampler;
pub mod scale;
pub mod types;
pub mod wavelength;

pub use chart_scales::{
    ChartLayout, ChartScales, FluxScaleTuning, HeightRatio, Margins, PanelBox, ScalePair,
};
pub use model::{
    DEFAULT_MODEL_COLOR, FWHM_PER_SIGMA, FitModel, FitParam, GaussianShape, INACTIVE_OPACITY,
    LinearShape, ModelKind, ModelShape,
};
pub use prior::{DeterministicMode, FitPrior, PriorType, resolve_link};
pub use sampler::{DEFAULT_SAMPLE_POINTS, sample, sample_at, subtract_models, total_flux_at};
pub use scale::LinearScale;
pub use types::{ConfigurationId, CurvePoint, FitRange, ModelId, SpectrumPoint};
pub use wavelength::{DisplayContext, WaveFrame, WaveUnit};
