use posequeue_envelope::RecordKind;

/// Errors from compiling schemas or validating payloads.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("failed to compile schema: {0}")]
    CompileFailed(String),

    /// The payload does not match the schema of its record kind.
    #[error("{kind} payload failed schema validation: {message}")]
    ValidationFailed { kind: RecordKind, message: String },

    #[error("payload is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("no schema registered for {0} records")]
    NoSchema(RecordKind),
}

pub type Result<T> = std::result::Result<T, SchemaError>;
