//! The JSON text that sits in a queue.
//!
//! The store hands a dequeued unit back as the exact bytes of a RESP bulk
//! string; the RESP decoder has already removed the `$<len>\r\n ... \r\n`
//! framing by its declared length. What remains here is the byte-to-text
//! step (UTF-8) and JSON parsing.

use serde_json::Value;

use crate::envelope::Envelope;
use crate::error::ParseError;

/// Serialize an envelope to compact JSON, keys in envelope order.
///
/// `bbox`, `keypoints` and `keypoint_scores` always carry JSON floats, so
/// a coordinate of 289 goes out as `289.0`. Decoding accepts both forms.
///
/// `from_wire(to_wire(e))` yields an envelope equal to `e`.
pub fn to_wire(envelope: &Envelope) -> String {
    Value::Object(envelope.as_map().clone()).to_string()
}

/// Parse wire bytes back into an envelope.
///
/// Fails on non-UTF-8 bytes, invalid or empty JSON, and any JSON value that
/// is not an object. Field contents are checked later, by decoding.
pub fn from_wire(payload: impl AsRef<[u8]>) -> Result<Envelope, ParseError> {
    let text = std::str::from_utf8(payload.as_ref())?;
    match serde_json::from_str::<Value>(text)? {
        Value::Object(fields) => Ok(Envelope::from_map(fields)),
        other => Err(ParseError::NotAnObject(json_type(&other))),
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
