use jsonschema::Validator;
use posequeue_envelope::RecordKind;

use crate::error::{Result, SchemaError};

/// Validate a payload, folding at most four errors into one message.
pub(crate) fn validate_payload(
    kind: RecordKind,
    payload: &[u8],
    validator: &Validator,
) -> Result<()> {
    let value: serde_json::Value = serde_json::from_slice(payload)?;

    let mut errors = validator.iter_errors(&value);
    if let Some(first) = errors.next() {
        let mut message = first.to_string();
        for err in errors.take(3) {
            message.push_str("; ");
            message.push_str(&err.to_string());
        }
        return Err(SchemaError::ValidationFailed { kind, message });
    }

    Ok(())
}
