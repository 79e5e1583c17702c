use crate::envelope::{BBOX, KEYPOINTS, KEYPOINT_SCORES};
use crate::error::ValidationError;
use crate::record::{BoundingBox, Keypoint, KEYPOINT_COUNT};

pub(crate) fn bounding_box(values: &[f64]) -> Result<BoundingBox, ValidationError> {
    let bbox = BoundingBox::try_from(values)
        .map_err(|_| ValidationError::BoundingBoxLength(values.len()))?;
    ensure_finite(BBOX, &bbox)?;
    Ok(bbox)
}

pub(crate) fn keypoints<K: AsRef<[f64]>>(
    points: &[K],
) -> Result<[Keypoint; KEYPOINT_COUNT], ValidationError> {
    if points.len() != KEYPOINT_COUNT {
        return Err(ValidationError::KeypointCount(points.len()));
    }

    let mut out = [[0.0; 2]; KEYPOINT_COUNT];
    for (index, (slot, point)) in out.iter_mut().zip(points).enumerate() {
        let point = point.as_ref();
        *slot = Keypoint::try_from(point).map_err(|_| ValidationError::KeypointArity {
            index,
            len: point.len(),
        })?;
        if slot.iter().any(|v| !v.is_finite()) {
            return Err(ValidationError::NonFinite {
                field: KEYPOINTS,
                index,
            });
        }
    }
    Ok(out)
}

pub(crate) fn keypoint_scores(scores: &[f64]) -> Result<[f64; KEYPOINT_COUNT], ValidationError> {
    let out = <[f64; KEYPOINT_COUNT]>::try_from(scores)
        .map_err(|_| ValidationError::ScoreCount(scores.len()))?;
    ensure_finite(KEYPOINT_SCORES, &out)?;
    Ok(out)
}

fn ensure_finite(field: &'static str, values: &[f64]) -> Result<(), ValidationError> {
    match values.iter().position(|v| !v.is_finite()) {
        Some(index) => Err(ValidationError::NonFinite { field, index }),
        None => Ok(()),
    }
}
