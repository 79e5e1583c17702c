use std::fmt;
use std::io;

use posequeue::{ChannelError, Error};

// Process exit codes.
pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const EMPTY: i32 = 2;
pub const TRANSPORT_ERROR: i32 = 3;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const TIMEOUT: i32 = 124;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn io_error(context: &str, err: io::Error) -> CliError {
    let code = match err.kind() {
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => TIMEOUT,
        io::ErrorKind::NotFound | io::ErrorKind::PermissionDenied => USAGE,
        _ => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn channel_error(context: &str, err: ChannelError) -> CliError {
    let code = if err.is_timeout() {
        TIMEOUT
    } else if matches!(err, ChannelError::InvalidQueue(_)) {
        USAGE
    } else {
        TRANSPORT_ERROR
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn transport_error(context: &str, err: Error) -> CliError {
    match err {
        Error::Channel(err) => channel_error(context, err),
        Error::QueueConflict(_) => CliError::new(USAGE, format!("{context}: {err}")),
        other if other.is_data_error() => {
            CliError::new(DATA_INVALID, format!("{context}: {other}"))
        }
        other => CliError::new(FAILURE, format!("{context}: {other}")),
    }
}

#[cfg(test)]
mod tests {
    use posequeue::transport::TransportError;
    use posequeue::ValidationError;

    use super::*;

    #[test]
    fn maps_errors_to_exit_codes() {
        let refused = Error::Channel(ChannelError::Connect(TransportError::Io(io::Error::from(
            io::ErrorKind::ConnectionRefused,
        ))));
        assert_eq!(transport_error("connect", refused).code, TRANSPORT_ERROR);

        let timed_out = Error::Channel(ChannelError::Resp(posequeue::resp::RespError::Io(
            io::Error::from(io::ErrorKind::WouldBlock),
        )));
        assert_eq!(transport_error("recv", timed_out).code, TIMEOUT);

        let invalid = Error::Validation(ValidationError::BoundingBoxLength(2));
        assert_eq!(transport_error("send", invalid).code, DATA_INVALID);

        let conflict = Error::QueueConflict("q".into());
        assert_eq!(transport_error("open", conflict).code, USAGE);
    }
}
