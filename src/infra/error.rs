use thiserror::Error;

use super::types::{AgentId, Position};

/// Construction-time failures. Movement conflicts during a step are never reported here.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EnvError {
    #[error("Configuration error: {reason}")]
    Configuration { reason: String },

    #[error("Malformed map: {reason}")]
    MalformedMap { reason: String },

    #[error("The {kind} position {position} of agent {agent} overlaps with {with}")]
    Overlap {
        agent: AgentId,
        kind: &'static str,
        position: Position,
        with: &'static str,
    },

    #[error("Unsupported rendering mode {mode}")]
    UnsupportedMode { mode: String },
}

impl EnvError {
    pub fn configuration(reason: impl Into<String>) -> Self {
        EnvError::Configuration {
            reason: reason.into(),
        }
    }

    pub fn malformed_map(reason: impl Into<String>) -> Self {
        EnvError::MalformedMap {
            reason: reason.into(),
        }
    }
}

pub type EnvResult<T> = Result<T, EnvError>;
