use super::config::ConfigError;
use crate::core::spatial::error::SpatialError;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum EngineError {
    #[error("Invalid configuration: {0}")]
    Configuration(#[from] ConfigError),

    #[error("Spatial index error: {source}")]
    Spatial {
        #[from]
        source: SpatialError,
    },

    #[error(
        "The maximum number of attempts ({max_attempts}) was reached and only {count} successful moves were completed. Try changing the parameters and running again."
    )]
    GenerationExhausted { count: usize, max_attempts: usize },
}

impl EngineError {
    /// True for invalid input that no amount of retrying will fix.
    pub fn is_configuration(&self) -> bool {
        match self {
            EngineError::Configuration(_) => true,
            EngineError::Spatial { source } => source.is_configuration(),
            EngineError::GenerationExhausted { .. } => false,
        }
    }

    pub fn is_not_supported(&self) -> bool {
        matches!(self, EngineError::Spatial { source } if source.is_not_supported())
    }

    /// Number of successful moves completed before the attempt budget ran out.
    pub fn partial_count(&self) -> Option<usize> {
        match self {
            EngineError::GenerationExhausted { count, .. } => Some(*count),
            _ => None,
        }
    }
}
