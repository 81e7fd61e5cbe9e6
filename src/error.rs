use thiserror::Error;

use crate::core::{ConfigurationId, ModelId};

pub type FitResult<T> = Result<T, FitError>;

#[derive(Debug, Error)]
pub enum FitError {
    #[error("invalid chart layout: width={width}, height={height}")]
    InvalidLayout { width: f64, height: f64 },

    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("unknown model id: {0}")]
    UnknownModel(ModelId),

    #[error("unknown configuration id: {0}")]
    UnknownConfiguration(ConfigurationId),

    #[error("serialization failed: {0}")]
    Serialization(String),
}
