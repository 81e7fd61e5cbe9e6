//! Log output for hosts embedding `specfit-rs`.
//!
//! The crate emits `tracing` events under the `specfit_rs` target:
//! - `debug`: model and configuration lifecycle, drag start/release, slice
//!   changes from the brush, prior type switches
//! - `trace`: per-move model updates and skipped typed or prior input
//! - `warn`: dropped spectrum samples, degenerate redshifts, rejected priors
//!   and dangling deterministic links left out of a submission

/// Filter used when `RUST_LOG` is unset.
#[cfg(feature = "telemetry")]
const DEFAULT_FILTER: &str = "specfit_rs=info";

/// Installs a compact stderr subscriber honoring `RUST_LOG`.
///
/// Returns `false` without the `telemetry` feature, or when the host already
/// installed a global subscriber.
#[must_use]
pub fn init_default_tracing() -> bool {
    #[cfg(feature = "telemetry")]
    {
        use tracing_subscriber::EnvFilter;

        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .compact()
            .try_init()
            .is_ok()
    }

    #[cfg(not(feature = "telemetry"))]
    {
        false
    }
}
