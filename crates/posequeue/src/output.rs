use std::io::IsTerminal;
use std::time::{SystemTime, UNIX_EPOCH};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use posequeue::{LabelRecord, PoseObservation, RecordKind};
use serde::Serialize;

/// COCO keypoint order.
const JOINTS: [&str; 17] = [
    "nose",
    "left_eye",
    "right_eye",
    "left_ear",
    "right_ear",
    "left_shoulder",
    "right_shoulder",
    "left_elbow",
    "right_elbow",
    "left_wrist",
    "right_wrist",
    "left_hip",
    "right_hip",
    "left_knee",
    "right_knee",
    "left_ankle",
    "right_ankle",
];

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct RecordOutput<'a, T> {
    kind: RecordKind,
    queue: &'a str,
    record: &'a T,
    timestamp: String,
}

#[derive(Serialize)]
struct SentOutput<'a> {
    kind: RecordKind,
    queue: &'a str,
    depth: u64,
}

pub fn print_pose(pose: &PoseObservation, queue: &str, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(&RecordOutput {
            kind: RecordKind::Pose,
            queue,
            record: pose,
            timestamp: now_unix_seconds(),
        }),
        OutputFormat::Table => {
            println!(
                "frame {} person {} bbox {} ({queue})",
                pose.frame_id,
                pose.person_id,
                format_numbers(&pose.bounding_box)
            );
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["#", "JOINT", "X", "Y", "SCORE"]);
            for (index, (point, score)) in pose
                .keypoints
                .iter()
                .zip(pose.keypoint_scores.iter())
                .enumerate()
            {
                table.add_row(vec![
                    index.to_string(),
                    JOINTS[index].to_string(),
                    point[0].to_string(),
                    point[1].to_string(),
                    format!("{score:.3}"),
                ]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!(
                "pose queue={queue} frame={} person={} bbox={} keypoints={}",
                pose.frame_id,
                pose.person_id,
                format_numbers(&pose.bounding_box),
                pose.keypoints
                    .iter()
                    .map(|point| format_numbers(point))
                    .collect::<Vec<_>>()
                    .join(" ")
            );
        }
    }
}

pub fn print_label(label: &LabelRecord, queue: &str, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(&RecordOutput {
            kind: RecordKind::Label,
            queue,
            record: label,
            timestamp: now_unix_seconds(),
        }),
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["QUEUE", "LABEL", "BBOX"])
                .add_row(vec![
                    queue.to_string(),
                    label.label.clone(),
                    format_numbers(&label.bounding_box),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!(
                "label queue={queue} label={:?} bbox={}",
                label.label,
                format_numbers(&label.bounding_box)
            );
        }
    }
}

pub fn print_sent(kind: RecordKind, queue: &str, depth: u64, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(&SentOutput { kind, queue, depth }),
        OutputFormat::Table | OutputFormat::Pretty => {
            println!("sent {kind} to {queue} (depth {depth})");
        }
    }
}

pub fn print_json<T: Serialize>(value: &T) {
    println!(
        "{}",
        serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string())
    );
}

pub fn format_numbers(values: &[f64]) -> String {
    let parts: Vec<String> = values.iter().map(f64::to_string).collect();
    format!("[{}]", parts.join(", "))
}

fn now_unix_seconds() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs().to_string())
        .unwrap_or_else(|_| "0".to_string())
}
