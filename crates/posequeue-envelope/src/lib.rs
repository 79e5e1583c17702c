//! Records, envelopes and the JSON wire format.
//!
//! Two record types travel through posequeue:
//! - [`PoseObservation`]: one tracked person in one frame (bbox, 17 keypoints,
//!   17 keypoint scores)
//! - [`LabelRecord`]: a classification result for a bounding box
//!
//! A record never goes on the wire directly. Encoding validates the shape of
//! raw caller data and produces a fresh [`Envelope`] (the canonical, ordered
//! key/value form); [`to_wire`] turns that into UTF-8 JSON. The receive path
//! runs the other way and re-validates everything, because a queued payload
//! may come from any producer.

pub mod codec;
pub mod envelope;
pub mod error;
pub mod record;
mod shape;
pub mod wire;

pub use codec::{decode_label, decode_pose, encode_label, encode_pose};
pub use envelope::Envelope;
pub use error::{ParseError, ValidationError};
pub use record::{
    BoundingBox, Keypoint, LabelRecord, PoseObservation, Record, RecordKind, BBOX_LEN,
    KEYPOINT_ARITY, KEYPOINT_COUNT,
};
pub use wire::{from_wire, to_wire};

#[cfg(test)]
pub(crate) mod testdata;
