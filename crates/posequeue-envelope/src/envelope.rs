use serde_json::{Map, Value};

pub const FRAME_ID: &str = "frame_id";
pub const PERSON_ID: &str = "person_id";
pub const BBOX: &str = "bbox";
pub const KEYPOINTS: &str = "keypoints";
pub const KEYPOINT_SCORES: &str = "keypoint_scores";
pub const LABEL: &str = "label";

pub(crate) const POSE_FIELDS: [&str; 5] = [FRAME_ID, PERSON_ID, BBOX, KEYPOINTS, KEYPOINT_SCORES];
pub(crate) const LABEL_FIELDS: [&str; 2] = [LABEL, BBOX];

/// The canonical key/value form of a record.
///
/// Keys are unique and keep insertion order, which is also their order on
/// the wire. An envelope is a pivot between a record and its wire text; it
/// is built fresh for every encode and never shared.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Envelope {
    fields: Map<String, Value>,
}

impl Envelope {
    /// Wrap an arbitrary JSON object.
    ///
    /// Nothing is checked here; decoding re-validates.
    pub fn from_map(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    /// Value of one field.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Field names in order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Borrow the underlying JSON object.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Unwrap into the underlying JSON object.
    pub fn into_map(self) -> Map<String, Value> {
        self.fields
    }

    pub(crate) fn insert(&mut self, key: &str, value: Value) {
        self.fields.insert(key.to_string(), value);
    }
}
