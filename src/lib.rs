//! specfit-rs: interactive spectral-line model fitting engine.
//!
//! Linear continua and Gaussian lines are positioned over a 1-D spectrum by
//! dragging chart handles, snapshotted into configurations, and decorated
//! with Bayesian priors for an external MCMC fit service. Wavelengths are
//! stored in observed-frame micrometers; display units are derived.

pub mod api;
pub mod core;
pub mod error;
pub mod extensions;
pub mod interaction;
pub mod telemetry;

pub use api::{FitModelStore, FitSession, FitSessionConfig};
pub use error::{FitError, FitResult};
