//! Store commands used by posequeue.
//!
//! Only the list and connection commands the queue channel needs are named
//! here; [`Command::new`] accepts any other name as well.

use bytes::{Bytes, BytesMut};

use crate::codec::encode_command;

/// Connection liveness check.
pub const PING: &str = "PING";

/// Switch the logical database of a connection.
pub const SELECT: &str = "SELECT";

/// Prepend to a list (producer side).
pub const LPUSH: &str = "LPUSH";

/// Remove from the tail of a list (consumer side).
pub const RPOP: &str = "RPOP";

/// Length of a list.
pub const LLEN: &str = "LLEN";

/// Delete keys.
pub const DEL: &str = "DEL";

/// A command with its arguments, ready to encode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    args: Vec<Bytes>,
}

impl Command {
    /// Start a command with the given name.
    pub fn new(name: &str) -> Self {
        Self {
            args: vec![Bytes::copy_from_slice(name.as_bytes())],
        }
    }

    /// Append one argument.
    pub fn arg(mut self, value: impl AsRef<[u8]>) -> Self {
        self.args.push(Bytes::copy_from_slice(value.as_ref()));
        self
    }

    /// Command name as sent (upper case for the built-in constants).
    pub fn name(&self) -> String {
        self.args
            .first()
            .map(|name| String::from_utf8_lossy(name).into_owned())
            .unwrap_or_default()
    }

    /// All arguments, name included.
    pub fn args(&self) -> &[Bytes] {
        &self.args
    }

    /// Size of the largest argument in bytes.
    pub fn largest_arg(&self) -> usize {
        self.args.iter().map(Bytes::len).max().unwrap_or(0)
    }

    /// Encode into `dst` as a RESP array of bulk strings.
    pub fn encode_into(&self, dst: &mut BytesMut) {
        let args: Vec<&[u8]> = self.args.iter().map(|arg| arg.as_ref()).collect();
        encode_command(&args, dst);
    }
}

/// `LPUSH <queue> <payload>`
pub fn lpush(queue: &str, payload: &[u8]) -> Command {
    Command::new(LPUSH).arg(queue).arg(payload)
}

/// `RPOP <queue>`
pub fn rpop(queue: &str) -> Command {
    Command::new(RPOP).arg(queue)
}

/// `LLEN <queue>`
pub fn llen(queue: &str) -> Command {
    Command::new(LLEN).arg(queue)
}

/// `SELECT <index>`
pub fn select(database: u32) -> Command {
    Command::new(SELECT).arg(database.to_string())
}

/// `PING`
pub fn ping() -> Command {
    Command::new(PING)
}
