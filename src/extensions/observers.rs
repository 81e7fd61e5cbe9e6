use serde::{Deserialize, Serialize};

use crate::core::{ConfigurationId, FitParam, ModelId};

/// Read-only store snapshot passed to observer hooks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreContext {
    pub version: u64,
    pub models_len: usize,
    pub configurations_len: usize,
    pub selected_configurations_len: usize,
}

/// Event stream exposed to store observers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FitEvent {
    ModelAdded { id: ModelId },
    ModelUpdated { id: ModelId },
    ModelRemoved { id: ModelId },
    ModelValidated { id: ModelId },
    PriorChanged { model_id: ModelId, param: FitParam },
    ConfigurationSaved { id: ConfigurationId },
    ConfigurationRenamed { id: ConfigurationId },
    ConfigurationSelectionChanged { id: ConfigurationId, selected: bool },
    ConfigurationRemoved { id: ConfigurationId },
    ConfigurationPriorChanged {
        configuration_id: ConfigurationId,
        model_id: ModelId,
        param: FitParam,
    },
}

/// Subscription hook for hosts that re-render when the store changes.
///
/// Observers see events after the mutation has been applied and cannot
/// mutate the store from inside the callback.
pub trait FitObserver {
    fn id(&self) -> &str;
    fn on_event(&mut self, event: FitEvent, context: StoreContext);
}
