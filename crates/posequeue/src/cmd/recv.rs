use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use posequeue::schema::SchemaRegistry;
use posequeue::{ChannelConfig, LabelRecord, Lane, PoseObservation, Record, RecordKind};

use crate::cmd::{parse_duration, RecvArgs, StoreArgs};
use crate::exit::{transport_error, CliError, CliResult, EMPTY, INTERNAL, SUCCESS, USAGE};
use crate::output::{print_label, print_pose, OutputFormat};

struct Poll {
    limit: Option<usize>,
    follow: bool,
    interval: Duration,
    running: Arc<AtomicBool>,
    schemas: Arc<SchemaRegistry>,
}

pub fn run(
    args: RecvArgs,
    store: &StoreArgs,
    schemas: Arc<SchemaRegistry>,
    format: OutputFormat,
) -> CliResult<i32> {
    let interval = parse_duration(&args.interval)?;
    let limit = match (args.count, args.follow) {
        (Some(0), _) => return Err(CliError::new(USAGE, "--count must be greater than zero")),
        (Some(count), _) => Some(count),
        (None, true) => None,
        (None, false) => Some(1),
    };

    let running = Arc::new(AtomicBool::new(true));
    if args.follow {
        install_ctrlc_handler(running.clone())?;
    }
    let poll = Poll {
        limit,
        follow: args.follow,
        interval,
        running,
        schemas,
    };

    let kind = RecordKind::from(args.kind);
    let queue = store.queue(kind);
    let config = store.channel_config()?;
    let received = match kind {
        RecordKind::Pose => drain::<PoseObservation>(queue, config, &poll, |pose| {
            print_pose(pose, queue, format)
        })?,
        RecordKind::Label => drain::<LabelRecord>(queue, config, &poll, |label| {
            print_label(label, queue, format)
        })?,
    };

    if received == 0 {
        eprintln!("queue {queue:?} is empty");
        return Ok(EMPTY);
    }
    Ok(SUCCESS)
}

fn drain<R: Record>(
    queue: &str,
    config: ChannelConfig,
    poll: &Poll,
    mut print: impl FnMut(&R),
) -> CliResult<usize> {
    let mut lane = Lane::<R>::open(queue, config)
        .map_err(|err| transport_error("connect failed", err))?
        .with_schema_registry(Arc::clone(&poll.schemas));

    let mut received = 0usize;
    while poll.running.load(Ordering::SeqCst) {
        if poll.limit.is_some_and(|limit| received >= limit) {
            break;
        }

        match lane
            .receive()
            .map_err(|err| transport_error("receive failed", err))?
        {
            Some(record) => {
                print(&record);
                received = received.saturating_add(1);
            }
            None if poll.follow => thread::sleep(poll.interval),
            None => break,
        }
    }

    Ok(received)
}

fn install_ctrlc_handler(running: Arc<AtomicBool>) -> CliResult<()> {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .map_err(|err| CliError::new(INTERNAL, format!("signal handler setup failed: {err}")))
}
