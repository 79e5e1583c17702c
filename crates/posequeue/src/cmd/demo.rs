use std::sync::Arc;

use posequeue::schema::SchemaRegistry;
use posequeue::PoseTransport;

use crate::cmd::{DemoArgs, StoreArgs};
use crate::exit::{transport_error, CliError, CliResult, EMPTY, SUCCESS};
use crate::output::{print_label, print_pose, OutputFormat};

const SAMPLE_FRAME: u64 = 3;
const SAMPLE_PERSON: i64 = 0;
const SAMPLE_BBOX: [f64; 4] = [289.0, 1035.0, 174.0, 540.0];
const SAMPLE_LABEL: &str = "Falling";

const SAMPLE_KEYPOINTS: [[f64; 2]; 17] = [
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
];

const SAMPLE_SCORES: [f64; 17] = [
    0.98420066, 0.96603984, 0.9417951, 0.8331674, 0.70378006, 0.99427146, 0.9919647, 0.974518,
    0.95928633, 0.95761883, 0.9389115, 0.9959512, 0.99517405, 0.98887664, 0.9855843, 0.9634876,
    0.95550233,
];

/// Send one skeleton, read it back, then label its box and read that back.
pub fn run(
    _args: DemoArgs,
    store: &StoreArgs,
    schemas: Arc<SchemaRegistry>,
    format: OutputFormat,
) -> CliResult<i32> {
    let mut transport = PoseTransport::open_with_config(store.transport_config()?)
        .map_err(|err| transport_error("connect failed", err))?
        .with_schema_registry(schemas);

    transport
        .send_pose(
            SAMPLE_FRAME,
            SAMPLE_PERSON,
            &SAMPLE_BBOX,
            &SAMPLE_KEYPOINTS,
            &SAMPLE_SCORES,
        )
        .map_err(|err| transport_error("send pose failed", err))?;
    let pose = transport
        .receive_pose()
        .map_err(|err| transport_error("receive pose failed", err))?
        .ok_or_else(|| CliError::new(EMPTY, format!("queue {:?} is empty", store.pose_queue)))?;
    print_pose(&pose, &store.pose_queue, format);

    transport
        .send_label(SAMPLE_LABEL, &pose.bounding_box)
        .map_err(|err| transport_error("send label failed", err))?;
    let label = transport
        .receive_label()
        .map_err(|err| transport_error("receive label failed", err))?
        .ok_or_else(|| CliError::new(EMPTY, format!("queue {:?} is empty", store.label_queue)))?;
    print_label(&label, &store.label_queue, format);

    Ok(SUCCESS)
}
