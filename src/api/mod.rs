mod derived_cache;
mod drag_controller;
mod fit_session;
mod interaction_controller;
mod model_patch;
mod prior_editor;
mod session_config;
mod spectrum_controller;
mod store;
mod submission;
mod validation;

pub use derived_cache::DerivedCacheStats;
pub use drag_controller::{DragHandleController, visible_handles};
pub use fit_session::{FitSession, ModelCurve};
pub use interaction_controller::ModelField;
pub use model_patch::ModelPatch;
pub use prior_editor::{
    AUTO_GUESS_MU_WINDOW_UM, AUTO_GUESS_VELOCITY_FLOOR_KM_S, AutoGuess, PriorAssignment,
    PriorChange, PriorEditor, PriorTarget, SPEED_OF_LIGHT_KM_S, auto_guess, velocity_factor,
};
pub use session_config::FitSessionConfig;
pub use store::{DEFAULT_PALETTE, FitConfiguration, FitModelStore, ModelDefaults};
pub use submission::{
    FIT_SUBMISSION_JSON_SCHEMA_V1, FitBackendConfiguration, FitSubmissionJsonContractV1,
};
pub use validation::{clamp_range_to_slice, parse_numeric_input};
