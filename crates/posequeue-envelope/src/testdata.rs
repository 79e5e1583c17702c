use crate::record::{Keypoint, PoseObservation, KEYPOINT_COUNT};

pub(crate) const SAMPLE_BBOX: [f64; 4] = [289.0, 1035.0, 174.0, 540.0];

pub(crate) fn sample_keypoints() -> [Keypoint; KEYPOINT_COUNT] {
    [
        [1130.0, 341.0],
        [1142.0, 333.0],
        [1120.0, 332.0],
        [1158.0, 343.0],
        [1103.0, 342.0],
        [1172.0, 408.0],
        [1080.0, 406.0],
        [1185.0, 488.0],
        [1055.0, 483.0],
        [1176.0, 569.0],
        [1066.0, 561.0],
        [1153.0, 563.0],
        [1088.0, 562.0],
        [1163.0, 671.0],
        [1076.0, 676.0],
        [1171.0, 780.0],
        [1069.0, 788.0],
    ]
}

pub(crate) fn sample_scores() -> [f64; KEYPOINT_COUNT] {
    [
        0.98420066, 0.96603984, 0.9417951, 0.8331674, 0.70378006, 0.99427146, 0.9919647,
        0.974518, 0.95928633, 0.95761883, 0.9389115, 0.9959512, 0.99517405, 0.98887664,
        0.9855843, 0.9634876, 0.95550233,
    ]
}

pub(crate) fn sample_pose() -> PoseObservation {
    PoseObservation {
        frame_id: 3,
        person_id: 0,
        bounding_box: SAMPLE_BBOX,
        keypoints: sample_keypoints(),
        keypoint_scores: sample_scores(),
    }
}
