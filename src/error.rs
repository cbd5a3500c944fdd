// Typed errors with thiserror. Only the JSON boundary can fail; numeric code never does.

use thiserror::Error;

/// Engine error types.
#[derive(Error, Debug)]
pub enum MotionError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for MotionError {
    fn from(err: serde_json::Error) -> Self {
        MotionError::Serialization(err.to_string())
    }
}
