use std::io::ErrorKind;

use posequeue_resp::RespError;
use posequeue_transport::TransportError;

/// Errors from queue channel operations.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    /// The store could not be reached.
    #[error("cannot connect to store: {0}")]
    Connect(#[from] TransportError),

    /// The conversation with the store failed: I/O, timeout, closed
    /// connection or a reply that does not parse.
    #[error("store protocol error: {0}")]
    Resp(#[from] RespError),

    /// The store answered with an error reply.
    #[error("store error: {0}")]
    Store(String),

    /// The store answered with a well-formed reply of the wrong type.
    #[error("unexpected {got} reply to {command}")]
    UnexpectedReply { command: String, got: &'static str },

    #[error("invalid queue name {0:?}")]
    InvalidQueue(String),
}

impl ChannelError {
    /// True when the store could not be reached at all.
    pub fn is_connect(&self) -> bool {
        matches!(self, ChannelError::Connect(_))
    }

    /// True when a connect or a round trip ran out of time.
    pub fn is_timeout(&self) -> bool {
        let kind = match self {
            ChannelError::Connect(err) => err.io_kind(),
            ChannelError::Resp(RespError::Io(err)) => Some(err.kind()),
            _ => None,
        };
        matches!(kind, Some(ErrorKind::TimedOut | ErrorKind::WouldBlock))
    }

    /// True when the connection must be dropped and re-established.
    pub fn breaks_connection(&self) -> bool {
        match self {
            ChannelError::Connect(_) => true,
            ChannelError::Resp(err) => err.breaks_connection(),
            ChannelError::Store(_)
            | ChannelError::UnexpectedReply { .. }
            | ChannelError::InvalidQueue(_) => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, ChannelError>;
