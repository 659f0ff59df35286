use mongodb::bson;
use thiserror::Error;
use testcontainers::TestcontainersError;

/// Result type for harness operations
pub type OrdsResult<T> = Result<T, OrdsError>;

/// Error types for the ORDS MongoDB API harness
#[derive(Error, Debug)]
pub enum OrdsError {
    #[error("Container error: {0}")]
    Container(#[from] TestcontainersError),

    #[error("MongoDB error: {0}")]
    Mongo(#[from] mongodb::error::Error),

    #[error("Failed to decode server response: {0}")]
    Decode(#[from] bson::de::Error),

    /// An administrative SQL step exited with a failure
    #[error("Provisioning step '{step}' failed (exit code {exit_code:?}): {output}")]
    Provisioning { step: String, exit_code: Option<i64>, output: String },

    #[error("Invalid Oracle identifier: {0:?}")]
    InvalidIdentifier(String),

    #[error("Invalid credential: {0}")]
    InvalidCredential(String),

    #[error("Invalid pool sizing: min {min} must not exceed max {max}, and max must be positive")]
    InvalidPoolSizing { min: u32, max: u32 },

    #[error("Unexpected server version: expected {expected}, got {actual}")]
    VersionMismatch { expected: String, actual: String },

    #[error("Configuration error: {0}")]
    Config(String),
}
