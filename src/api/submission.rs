use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::core::{FitModel, FitPrior, resolve_link};
use crate::error::{FitError, FitResult};

use super::store::{FitConfiguration, FitModelStore};

pub const FIT_SUBMISSION_JSON_SCHEMA_V1: u32 = 1;

/// Payload handed to the external fit service.
///
/// Models are sent exactly as stored: canonical µm, observed frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitBackendConfiguration {
    pub model_name: String,
    pub models: Vec<FitModel>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitSubmissionJsonContractV1 {
    pub schema_version: u32,
    pub configurations: Vec<FitBackendConfiguration>,
}

impl FitBackendConfiguration {
    /// Builds the payload for one configuration.
    ///
    /// Deterministic priors whose reference no longer resolves inside the
    /// configuration are dropped, leaving the parameter on its default prior.
    #[must_use]
    pub fn from_configuration(config: &FitConfiguration) -> Self {
        let models = config
            .models
            .iter()
            .map(|model| {
                let mut model = model.clone();
                let model_id = model.id;
                model.priors.retain(|param, prior| {
                    let keep = !matches!(prior, FitPrior::Deterministic { .. })
                        || resolve_link(model_id, prior, &config.models).is_some();
                    if !keep {
                        warn!(
                            configuration_id = config.id,
                            model_id,
                            %param,
                            "dropping dangling deterministic prior from submission"
                        );
                    }
                    keep
                });
                model
            })
            .collect();
        Self {
            model_name: config.name.clone(),
            models,
        }
    }

    pub fn to_json_pretty(&self) -> FitResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| {
            FitError::Serialization(format!("failed to serialize fit configuration: {e}"))
        })
    }
}

impl FitModelStore {
    /// Payloads for every selected configuration, in save order.
    #[must_use]
    pub fn submission_payloads(&self) -> Vec<FitBackendConfiguration> {
        self.selected_configurations()
            .map(FitBackendConfiguration::from_configuration)
            .collect()
    }

    pub fn submission_json_contract_v1_pretty(&self) -> FitResult<String> {
        let payload = FitSubmissionJsonContractV1 {
            schema_version: FIT_SUBMISSION_JSON_SCHEMA_V1,
            configurations: self.submission_payloads(),
        };
        serde_json::to_string_pretty(&payload).map_err(|e| {
            FitError::Serialization(format!("failed to serialize submission contract v1: {e}"))
        })
    }
}

impl FitSubmissionJsonContractV1 {
    /// Accepts either a versioned contract or a bare configuration list.
    pub fn from_json_compat_str(input: &str) -> FitResult<Vec<FitBackendConfiguration>> {
        if let Ok(configurations) = serde_json::from_str::<Vec<FitBackendConfiguration>>(input) {
            return Ok(configurations);
        }
        let payload: Self = serde_json::from_str(input).map_err(|e| {
            FitError::InvalidData(format!("failed to parse submission json payload: {e}"))
        })?;
        if payload.schema_version != FIT_SUBMISSION_JSON_SCHEMA_V1 {
            return Err(FitError::InvalidData(format!(
                "unsupported submission schema version: {}",
                payload.schema_version
            )));
        }
        Ok(payload.configurations)
    }
}
