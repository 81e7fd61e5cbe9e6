//! Hooks for host applications that observe the fit store.

pub mod observers;

pub use observers::{FitEvent, FitObserver, StoreContext};
