//! Scene orchestration: tracked objects, polylines and the tick controller

pub mod controller;
pub mod object;
pub mod polyline;

use std::fmt;

/// Errors reported synchronously to the caller. Missing-context conditions
/// (no scene position, no fix yet) are not errors; they surface as silent
/// no-ops retried on the next tick.
#[derive(Debug, Clone, PartialEq)]
pub enum SceneError {
    /// A route or polyline was rejected because no current altitude is
    /// available. Existing state is untouched.
    MissingAltitude,
    /// Invalid configuration value
    InvalidParameter {
        parameter: String,
        value: String,
        reason: String,
    },
    /// Configuration file I/O error
    Io { message: String },
    /// Configuration serialization/deserialization error
    Serialization { message: String },
}

impl fmt::Display for SceneError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SceneError::MissingAltitude => {
                write!(f, "no current altitude available for route placement")
            }
            SceneError::InvalidParameter {
                parameter,
                value,
                reason,
            } => {
                write!(f, "invalid parameter '{}' = '{}': {}", parameter, value, reason)
            }
            SceneError::Io { message } => write!(f, "I/O error: {}", message),
            SceneError::Serialization { message } => {
                write!(f, "serialization error: {}", message)
            }
        }
    }
}

impl std::error::Error for SceneError {}
