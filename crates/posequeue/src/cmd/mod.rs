use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Args, Subcommand, ValueEnum};
use posequeue::channel::DEFAULT_HOST;
use posequeue::schema::SchemaRegistry;
use posequeue::transport::DEFAULT_PORT;
use posequeue::{
    ChannelConfig, RecordKind, TransportConfig, DEFAULT_LABEL_QUEUE, DEFAULT_POSE_QUEUE,
};

use crate::exit::{CliError, CliResult, INTERNAL, USAGE};
use crate::output::OutputFormat;

pub mod demo;
pub mod recv;
pub mod send;
pub mod status;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Validate a wire JSON record and push it onto its queue.
    Send(SendArgs),
    /// Pop and print records.
    Recv(RecvArgs),
    /// Send and receive one sample skeleton and one label.
    Demo(DemoArgs),
    /// Ping the store and show queue depths.
    Status(StatusArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, store: &StoreArgs, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Send(args) => send::run(args, store, format),
        Command::Recv(args) => recv::run(args, store, builtin_schemas()?, format),
        Command::Demo(args) => demo::run(args, store, builtin_schemas()?, format),
        Command::Status(args) => status::run(args, store, format),
        Command::Version(args) => version::run(args),
    }
}

/// Schemas checked on every received payload.
fn builtin_schemas() -> CliResult<Arc<SchemaRegistry>> {
    SchemaRegistry::builtin()
        .map(Arc::new)
        .map_err(|err| CliError::new(INTERNAL, format!("built-in schemas failed to load: {err}")))
}

/// Where the store is and which queues to use.
#[derive(Args, Debug)]
pub struct StoreArgs {
    /// Store host.
    #[arg(long, env = "POSEQUEUE_HOST", default_value = DEFAULT_HOST, global = true)]
    pub host: String,
    /// Store port.
    #[arg(long, env = "POSEQUEUE_PORT", default_value_t = DEFAULT_PORT, global = true)]
    pub port: u16,
    /// Logical database index.
    #[arg(long, env = "POSEQUEUE_DB", default_value_t = 0, global = true)]
    pub db: u32,
    /// Queue carrying pose observations.
    #[arg(long, env = "POSEQUEUE_POSE_QUEUE", default_value = DEFAULT_POSE_QUEUE, global = true)]
    pub pose_queue: String,
    /// Queue carrying labels.
    #[arg(long, env = "POSEQUEUE_LABEL_QUEUE", default_value = DEFAULT_LABEL_QUEUE, global = true)]
    pub label_queue: String,
    /// Connect and per-request timeout (e.g. 5s, 500ms).
    #[arg(long, default_value = "5s", global = true)]
    pub timeout: String,
}

impl StoreArgs {
    pub fn channel_config(&self) -> CliResult<ChannelConfig> {
        let timeout = parse_duration(&self.timeout)?;
        Ok(ChannelConfig::new(self.host.clone(), self.port)
            .with_database(self.db)
            .with_timeout(Some(timeout)))
    }

    pub fn transport_config(&self) -> CliResult<TransportConfig> {
        Ok(TransportConfig {
            channel: self.channel_config()?,
            pose_queue: self.pose_queue.clone(),
            label_queue: self.label_queue.clone(),
        })
    }

    pub fn queue(&self, kind: RecordKind) -> &str {
        match kind {
            RecordKind::Pose => &self.pose_queue,
            RecordKind::Label => &self.label_queue,
        }
    }
}

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum KindArg {
    Pose,
    Label,
}

impl From<KindArg> for RecordKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Pose => RecordKind::Pose,
            KindArg::Label => RecordKind::Label,
        }
    }
}

#[derive(Args, Debug)]
pub struct SendArgs {
    /// Record kind.
    pub kind: KindArg,
    /// Wire JSON of the record.
    #[arg(long, conflicts_with = "file")]
    pub json: Option<String>,
    /// Read the wire JSON from a file.
    #[arg(long, conflicts_with = "json")]
    pub file: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct RecvArgs {
    /// Record kind.
    pub kind: KindArg,
    /// Stop after N records. Default: 1, or unlimited with --follow.
    #[arg(long)]
    pub count: Option<usize>,
    /// Keep polling an empty queue until interrupted.
    #[arg(long)]
    pub follow: bool,
    /// Poll interval for --follow (e.g. 250ms, 1s).
    #[arg(long, default_value = "250ms")]
    pub interval: String,
}

#[derive(Args, Debug, Default)]
pub struct DemoArgs {}

#[derive(Args, Debug, Default)]
pub struct StatusArgs {}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

pub fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    let (number, millis) = match input.strip_suffix("ms") {
        Some(number) => (number, true),
        None => (input.strip_suffix('s').unwrap_or(input), false),
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration: {input:?}")))?;
    if value == 0 {
        return Err(CliError::new(USAGE, "duration must be greater than zero"));
    }

    Ok(if millis {
        Duration::from_millis(value)
    } else {
        Duration::from_secs(value)
    })
}
