use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use posequeue::{PoseTransport, RecordKind};
use serde::Serialize;

use crate::cmd::{StatusArgs, StoreArgs};
use crate::exit::{transport_error, CliResult, SUCCESS};
use crate::output::{print_json, OutputFormat};

#[derive(Serialize)]
struct QueueStatus<'a> {
    kind: RecordKind,
    queue: &'a str,
    depth: u64,
}

#[derive(Serialize)]
struct StatusOutput<'a> {
    host: &'a str,
    port: u16,
    database: u32,
    reachable: bool,
    queues: Vec<QueueStatus<'a>>,
}

pub fn run(_args: StatusArgs, store: &StoreArgs, format: OutputFormat) -> CliResult<i32> {
    let mut transport = PoseTransport::open_with_config(store.transport_config()?)
        .map_err(|err| transport_error("connect failed", err))?;
    transport
        .ping()
        .map_err(|err| transport_error("ping failed", err))?;
    let depths = transport
        .queue_depths()
        .map_err(|err| transport_error("queue depth failed", err))?;

    let out = StatusOutput {
        host: &store.host,
        port: store.port,
        database: store.db,
        reachable: true,
        queues: vec![
            QueueStatus {
                kind: RecordKind::Pose,
                queue: &store.pose_queue,
                depth: depths.pose,
            },
            QueueStatus {
                kind: RecordKind::Label,
                queue: &store.label_queue,
                depth: depths.label,
            },
        ],
    };

    print_status(&out, format);
    Ok(SUCCESS)
}

fn print_status(out: &StatusOutput<'_>, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(out),
        OutputFormat::Table => {
            println!("store {}:{} db {}", out.host, out.port, out.database);
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["KIND", "QUEUE", "DEPTH"]);
            for queue in &out.queues {
                table.add_row(vec![
                    queue.kind.to_string(),
                    queue.queue.to_string(),
                    queue.depth.to_string(),
                ]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!(
                "store={}:{} db={} reachable={}",
                out.host, out.port, out.database, out.reachable
            );
            for queue in &out.queues {
                println!("  {} queue={} depth={}", queue.kind, queue.queue, queue.depth);
            }
        }
    }
}
