/// A caller-supplied record does not have the required shape.
///
/// Returned before anything touches the network.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("bbox must hold 4 values, got {0}")]
    BoundingBoxLength(usize),

    #[error("keypoints must hold 17 points, got {0}")]
    KeypointCount(usize),

    #[error("keypoint_scores must hold 17 scores, got {0}")]
    ScoreCount(usize),

    #[error("keypoint {index} must be an (x, y) pair, got {len} values")]
    KeypointArity { index: usize, len: usize },

    /// JSON has no NaN or infinity.
    #[error("{field}[{index}] is not a finite number")]
    NonFinite { field: &'static str, index: usize },
}

/// A payload could not be turned back into a record.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("payload is not UTF-8: {0}")]
    NotUtf8(#[from] std::str::Utf8Error),

    #[error("payload is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("payload is a JSON {0}, expected an object")]
    NotAnObject(&'static str),

    #[error("missing field `{0}`")]
    MissingField(&'static str),

    #[error("unexpected field `{0}`")]
    UnexpectedField(String),

    #[error("field `{field}` {reason}")]
    InvalidField { field: &'static str, reason: String },

    /// Decoded fields violate the record shape.
    #[error("record shape: {0}")]
    Shape(#[from] ValidationError),
}
