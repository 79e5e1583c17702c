use std::fs;

use posequeue::envelope::{from_wire, Envelope};
use posequeue::{ChannelConfig, LabelRecord, Lane, PoseObservation, Record, RecordKind};

use crate::cmd::{SendArgs, StoreArgs};
use crate::exit::{io_error, transport_error, CliError, CliResult, DATA_INVALID, SUCCESS, USAGE};
use crate::output::{print_sent, OutputFormat};

pub fn run(args: SendArgs, store: &StoreArgs, format: OutputFormat) -> CliResult<i32> {
    let text = resolve_payload(&args)?;
    let envelope = from_wire(text.as_bytes())
        .map_err(|err| CliError::new(DATA_INVALID, format!("invalid record: {err}")))?;

    let kind = RecordKind::from(args.kind);
    let queue = store.queue(kind);
    let config = store.channel_config()?;
    let depth = match kind {
        RecordKind::Pose => send_record::<PoseObservation>(&envelope, queue, config)?,
        RecordKind::Label => send_record::<LabelRecord>(&envelope, queue, config)?,
    };

    print_sent(kind, queue, depth, format);
    Ok(SUCCESS)
}

fn resolve_payload(args: &SendArgs) -> CliResult<String> {
    if let Some(json) = &args.json {
        return Ok(json.clone());
    }
    if let Some(path) = &args.file {
        return fs::read_to_string(path)
            .map_err(|err| io_error(&format!("failed reading {}", path.display()), err));
    }
    Err(CliError::new(USAGE, "one of --json or --file is required"))
}

/// Decode with full validation, then push the re-encoded record.
fn send_record<R: Record>(envelope: &Envelope, queue: &str, config: ChannelConfig) -> CliResult<u64> {
    let record = R::from_envelope(envelope)
        .map_err(|err| CliError::new(DATA_INVALID, format!("invalid {} record: {err}", R::KIND)))?;
    let mut lane = Lane::<R>::open(queue, config)
        .map_err(|err| transport_error("connect failed", err))?;
    lane.send(&record)
        .map_err(|err| transport_error("send failed", err))
}
