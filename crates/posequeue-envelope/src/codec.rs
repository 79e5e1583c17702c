use serde_json::Value;

use crate::envelope::{Envelope, BBOX, FRAME_ID, KEYPOINTS, KEYPOINT_SCORES, LABEL, PERSON_ID};
use crate::error::{ParseError, ValidationError};
use crate::record::{LabelRecord, PoseObservation, Record, RecordKind};
use crate::shape;

/// Validate raw pose data and build its envelope.
///
/// Checks that `bounding_box` holds 4 values, that there are exactly 17
/// keypoints and 17 scores, that every keypoint is a pair, and that every
/// number is finite. The envelope's keys are, in order: `frame_id`,
/// `person_id`, `bbox`, `keypoints`, `keypoint_scores`.
pub fn encode_pose<K: AsRef<[f64]>>(
    frame_id: u64,
    person_id: i64,
    bounding_box: &[f64],
    keypoints: &[K],
    keypoint_scores: &[f64],
) -> Result<Envelope, ValidationError> {
    let bbox = shape::bounding_box(bounding_box)?;
    let points = shape::keypoints(keypoints)?;
    let scores = shape::keypoint_scores(keypoint_scores)?;

    let mut envelope = Envelope::default();
    envelope.insert(FRAME_ID, Value::from(frame_id));
    envelope.insert(PERSON_ID, Value::from(person_id));
    envelope.insert(BBOX, number_array(&bbox));
    envelope.insert(
        KEYPOINTS,
        Value::Array(points.iter().map(|point| number_array(point)).collect()),
    );
    envelope.insert(KEYPOINT_SCORES, number_array(&scores));
    Ok(envelope)
}

/// Rebuild a pose from its envelope.
pub fn decode_pose(envelope: &Envelope) -> Result<PoseObservation, ParseError> {
    reject_unknown(envelope, RecordKind::Pose)?;

    let frame_id = require(envelope, FRAME_ID)?
        .as_u64()
        .ok_or_else(|| invalid(FRAME_ID, "must be a non-negative integer"))?;
    let person_id = require(envelope, PERSON_ID)?
        .as_i64()
        .ok_or_else(|| invalid(PERSON_ID, "must be an integer"))?;
    let bounding_box = shape::bounding_box(&numbers(require(envelope, BBOX)?, BBOX)?)?;
    let keypoints = shape::keypoints(&pairs(require(envelope, KEYPOINTS)?)?)?;
    let keypoint_scores =
        shape::keypoint_scores(&numbers(require(envelope, KEYPOINT_SCORES)?, KEYPOINT_SCORES)?)?;

    Ok(PoseObservation {
        frame_id,
        person_id,
        bounding_box,
        keypoints,
        keypoint_scores,
    })
}

/// Validate raw label data and build its envelope (`label`, `bbox`).
pub fn encode_label(label: &str, bounding_box: &[f64]) -> Result<Envelope, ValidationError> {
    let bbox = shape::bounding_box(bounding_box)?;

    let mut envelope = Envelope::default();
    envelope.insert(LABEL, Value::from(label));
    envelope.insert(BBOX, number_array(&bbox));
    Ok(envelope)
}

/// Rebuild a label from its envelope.
pub fn decode_label(envelope: &Envelope) -> Result<LabelRecord, ParseError> {
    reject_unknown(envelope, RecordKind::Label)?;

    let label = require(envelope, LABEL)?
        .as_str()
        .ok_or_else(|| invalid(LABEL, "must be a string"))?
        .to_string();
    let bounding_box = shape::bounding_box(&numbers(require(envelope, BBOX)?, BBOX)?)?;

    Ok(LabelRecord {
        label,
        bounding_box,
    })
}

impl Record for PoseObservation {
    const KIND: RecordKind = RecordKind::Pose;

    fn to_envelope(&self) -> Result<Envelope, ValidationError> {
        encode_pose(
            self.frame_id,
            self.person_id,
            &self.bounding_box,
            &self.keypoints,
            &self.keypoint_scores,
        )
    }

    fn from_envelope(envelope: &Envelope) -> Result<Self, ParseError> {
        decode_pose(envelope)
    }
}

impl Record for LabelRecord {
    const KIND: RecordKind = RecordKind::Label;

    fn to_envelope(&self) -> Result<Envelope, ValidationError> {
        encode_label(&self.label, &self.bounding_box)
    }

    fn from_envelope(envelope: &Envelope) -> Result<Self, ParseError> {
        decode_label(envelope)
    }
}

fn number_array(values: &[f64]) -> Value {
    Value::Array(values.iter().map(|&v| Value::from(v)).collect())
}

fn reject_unknown(envelope: &Envelope, kind: RecordKind) -> Result<(), ParseError> {
    let allowed = kind.fields();
    match envelope.keys().find(|key| !allowed.contains(key)) {
        Some(key) => Err(ParseError::UnexpectedField(key.to_string())),
        None => Ok(()),
    }
}

fn require<'a>(envelope: &'a Envelope, field: &'static str) -> Result<&'a Value, ParseError> {
    envelope.get(field).ok_or(ParseError::MissingField(field))
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ParseError {
    ParseError::InvalidField {
        field,
        reason: reason.into(),
    }
}

fn numbers(value: &Value, field: &'static str) -> Result<Vec<f64>, ParseError> {
    let items = value
        .as_array()
        .ok_or_else(|| invalid(field, "must be an array of numbers"))?;
    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            item.as_f64()
                .ok_or_else(|| invalid(field, format!("element {index} is not a number")))
        })
        .collect()
}

fn pairs(value: &Value) -> Result<Vec<Vec<f64>>, ParseError> {
    let items = value
        .as_array()
        .ok_or_else(|| invalid(KEYPOINTS, "must be an array of [x, y] pairs"))?;
    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            let coords = item
                .as_array()
                .ok_or_else(|| invalid(KEYPOINTS, format!("element {index} is not an array")))?;
            coords
                .iter()
                .map(|coord| {
                    coord.as_f64().ok_or_else(|| {
                        invalid(KEYPOINTS, format!("element {index} holds a non-number"))
                    })
                })
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Map};

    use super::*;
    use crate::testdata::{sample_keypoints, sample_pose, sample_scores, SAMPLE_BBOX};
    use crate::wire::{from_wire, to_wire};

    fn envelope_from(value: Value) -> Envelope {
        match value {
            Value::Object(map) => Envelope::from_map(map),
            other => panic!("test fixture must be an object, got {other}"),
        }
    }

    #[test]
    fn pose_round_trip_through_wire() {
        let pose = sample_pose();
        let wire = to_wire(&pose.to_envelope().unwrap());
        let decoded = decode_pose(&from_wire(wire.as_bytes()).unwrap()).unwrap();
        assert_eq!(decoded, pose);
        assert_eq!(decoded.keypoints[16], [1069.0, 788.0]);
    }

    #[test]
    fn label_round_trip_through_wire() {
        let envelope = encode_label("Falling", &SAMPLE_BBOX).unwrap();
        let decoded = decode_label(&from_wire(to_wire(&envelope)).unwrap()).unwrap();
        assert_eq!(decoded.label, "Falling");
        assert_eq!(decoded.bounding_box, [289.0, 1035.0, 174.0, 540.0]);
    }

    #[test]
    fn pose_envelope_keys_in_canonical_order() {
        let envelope =
            encode_pose(3, 0, &SAMPLE_BBOX, &sample_keypoints(), &sample_scores()).unwrap();
        let keys: Vec<&str> = envelope.keys().collect();
        assert_eq!(
            keys,
            ["frame_id", "person_id", "bbox", "keypoints", "keypoint_scores"]
        );

        let label = encode_label("Walking", &SAMPLE_BBOX).unwrap();
        assert_eq!(label.keys().collect::<Vec<_>>(), ["label", "bbox"]);
    }

    #[test]
    fn encode_rejects_bad_bbox_length() {
        let err = encode_pose(
            3,
            0,
            &[1.0, 2.0, 3.0],
            &sample_keypoints(),
            &sample_scores(),
        )
        .unwrap_err();
        assert_eq!(err, ValidationError::BoundingBoxLength(3));

        let err = encode_label("Falling", &[1.0, 2.0, 3.0, 4.0, 5.0]).unwrap_err();
        assert_eq!(err, ValidationError::BoundingBoxLength(5));
    }

    #[test]
    fn encode_rejects_bad_keypoint_and_score_counts() {
        let mut points = sample_keypoints().to_vec();
        points.pop();
        let err = encode_pose(3, 0, &SAMPLE_BBOX, &points, &sample_scores()).unwrap_err();
        assert_eq!(err, ValidationError::KeypointCount(16));

        let scores = [0.5; 18];
        let err = encode_pose(3, 0, &SAMPLE_BBOX, &sample_keypoints(), &scores).unwrap_err();
        assert_eq!(err, ValidationError::ScoreCount(18));
    }

    #[test]
    fn encode_rejects_malformed_pair_anywhere() {
        let mut points: Vec<Vec<f64>> = sample_keypoints().iter().map(|p| p.to_vec()).collect();
        points[9] = vec![1.0, 2.0, 3.0];
        let err = encode_pose(3, 0, &SAMPLE_BBOX, &points, &sample_scores()).unwrap_err();
        assert_eq!(err, ValidationError::KeypointArity { index: 9, len: 3 });
    }

    #[test]
    fn encode_rejects_non_finite_numbers() {
        let mut scores = sample_scores();
        scores[4] = f64::NAN;
        let err = encode_pose(3, 0, &SAMPLE_BBOX, &sample_keypoints(), &scores).unwrap_err();
        assert_eq!(
            err,
            ValidationError::NonFinite {
                field: "keypoint_scores",
                index: 4
            }
        );

        let err = encode_label("x", &[0.0, f64::INFINITY, 0.0, 0.0]).unwrap_err();
        assert_eq!(
            err,
            ValidationError::NonFinite {
                field: "bbox",
                index: 1
            }
        );
    }

    #[test]
    fn every_encode_builds_a_fresh_envelope() {
        let first = encode_label("Falling", &SAMPLE_BBOX).unwrap();
        let second = encode_label("Standing", &[0.0, 0.0, 1.0, 1.0]).unwrap();
        assert_eq!(first.get("label"), Some(&json!("Falling")));
        assert_eq!(second.get("label"), Some(&json!("Standing")));
    }

    #[test]
    fn decode_accepts_integer_coordinates_from_other_producers() {
        let points: Vec<[i64; 2]> = (0..17).map(|i| [1000 + i, 300 + i]).collect();
        let envelope = envelope_from(json!({
            "frame_id": 7,
            "person_id": 2,
            "bbox": [289, 1035, 174, 540],
            "keypoints": points,
            "keypoint_scores": vec![1; 17],
        }));
        let pose = decode_pose(&envelope).unwrap();
        assert_eq!(pose.frame_id, 7);
        assert_eq!(pose.keypoints[0], [1000.0, 300.0]);
        assert_eq!(pose.keypoint_scores[16], 1.0);
    }

    #[test]
    fn decode_reports_missing_field() {
        let mut map = encode_pose(3, 0, &SAMPLE_BBOX, &sample_keypoints(), &sample_scores())
            .unwrap()
            .into_map();
        map.remove("keypoint_scores");
        let err = decode_pose(&Envelope::from_map(map)).unwrap_err();
        assert!(matches!(err, ParseError::MissingField("keypoint_scores")));

        let err = decode_label(&envelope_from(json!({ "bbox": [0, 0, 1, 1] }))).unwrap_err();
        assert!(matches!(err, ParseError::MissingField("label")));
    }

    #[test]
    fn decode_rejects_extra_fields() {
        let mut map = encode_label("Falling", &SAMPLE_BBOX).unwrap().into_map();
        map.insert("confidence".to_string(), json!(0.9));
        let err = decode_label(&Envelope::from_map(map)).unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedField(ref f) if f == "confidence"));

        // A label envelope is not a pose.
        let label = encode_label("Falling", &SAMPLE_BBOX).unwrap();
        assert!(matches!(
            decode_pose(&label),
            Err(ParseError::UnexpectedField(ref f)) if f == "label"
        ));
    }

    #[test]
    fn decode_revalidates_shape() {
        let envelope = envelope_from(json!({
            "label": "Falling",
            "bbox": [1, 2, 3],
        }));
        assert!(matches!(
            decode_label(&envelope),
            Err(ParseError::Shape(ValidationError::BoundingBoxLength(3)))
        ));

        let mut points: Vec<Value> = sample_keypoints().iter().map(|p| json!(p)).collect();
        points[0] = json!([1.0]);
        let envelope = envelope_from(json!({
            "frame_id": 1,
            "person_id": 1,
            "bbox": SAMPLE_BBOX,
            "keypoints": points,
            "keypoint_scores": sample_scores(),
        }));
        assert!(matches!(
            decode_pose(&envelope),
            Err(ParseError::Shape(ValidationError::KeypointArity { index: 0, len: 1 }))
        ));
    }

    #[test]
    fn decode_rejects_wrong_json_types() {
        let envelope = envelope_from(json!({
            "frame_id": -1,
            "person_id": 0,
            "bbox": SAMPLE_BBOX,
            "keypoints": sample_keypoints(),
            "keypoint_scores": sample_scores(),
        }));
        assert!(matches!(
            decode_pose(&envelope),
            Err(ParseError::InvalidField { field: "frame_id", .. })
        ));

        let envelope = envelope_from(json!({ "label": 12, "bbox": SAMPLE_BBOX }));
        assert!(matches!(
            decode_label(&envelope),
            Err(ParseError::InvalidField { field: "label", .. })
        ));

        let envelope = envelope_from(json!({ "label": "x", "bbox": [0, "1", 2, 3] }));
        assert!(matches!(
            decode_label(&envelope),
            Err(ParseError::InvalidField { field: "bbox", .. })
        ));
    }

    #[test]
    fn decode_of_empty_envelope_fails() {
        let err = decode_pose(&Envelope::from_map(Map::new())).unwrap_err();
        assert!(matches!(err, ParseError::MissingField("frame_id")));
    }
}
