use std::fmt;

use serde::Serialize;

use crate::envelope::{self, Envelope};
use crate::error::{ParseError, ValidationError};

/// Values in a bounding box.
pub const BBOX_LEN: usize = 4;

/// Keypoints per pose (COCO layout).
pub const KEYPOINT_COUNT: usize = 17;

/// Coordinates per keypoint.
pub const KEYPOINT_ARITY: usize = 2;

pub type BoundingBox = [f64; BBOX_LEN];
pub type Keypoint = [f64; KEYPOINT_ARITY];

/// One tracked person observed in one frame.
///
/// `keypoints[i]` and `keypoint_scores[i]` describe the same joint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PoseObservation {
    pub frame_id: u64,
    pub person_id: i64,
    #[serde(rename = "bbox")]
    pub bounding_box: BoundingBox,
    pub keypoints: [Keypoint; KEYPOINT_COUNT],
    pub keypoint_scores: [f64; KEYPOINT_COUNT],
}

/// A classification result for a bounding box.
///
/// By convention the box is the one of the pose the label was computed from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabelRecord {
    pub label: String,
    #[serde(rename = "bbox")]
    pub bounding_box: BoundingBox,
}

/// The two categories of records, each with its own queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    Pose,
    Label,
}

impl RecordKind {
    /// Lower-case name used in logs and on the command line.
    pub fn as_str(self) -> &'static str {
        match self {
            RecordKind::Pose => "pose",
            RecordKind::Label => "label",
        }
    }

    /// Wire field names in canonical order.
    pub fn fields(self) -> &'static [&'static str] {
        match self {
            RecordKind::Pose => &envelope::POSE_FIELDS,
            RecordKind::Label => &envelope::LABEL_FIELDS,
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A record type that can travel through a queue.
pub trait Record: Sized {
    /// Which queue category this record belongs to.
    const KIND: RecordKind;

    /// Validate and build a fresh envelope for this record.
    fn to_envelope(&self) -> Result<Envelope, ValidationError>;

    /// Rebuild a record from an envelope, re-validating every field.
    fn from_envelope(envelope: &Envelope) -> Result<Self, ParseError>;
}
