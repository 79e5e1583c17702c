use bytes::Bytes;
use posequeue_channel::ChannelError;
use posequeue_envelope::{ParseError, ValidationError};

/// Errors from the typed transport.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A record handed to a send operation has the wrong shape. Nothing was
    /// pushed.
    #[error("invalid record: {0}")]
    Validation(#[from] ValidationError),

    /// A dequeued payload could not be decoded. The payload has been
    /// consumed from the queue and is returned here as received.
    #[error("undecodable payload on queue {queue:?}: {source}")]
    Parse {
        queue: String,
        payload: Bytes,
        source: ParseError,
    },

    /// A dequeued payload does not match the schema of its record kind.
    #[cfg(feature = "schema")]
    #[error("payload on queue {queue:?} rejected by schema: {source}")]
    Schema {
        queue: String,
        payload: Bytes,
        source: posequeue_schema::SchemaError,
    },

    /// Connecting to or talking to the store failed.
    #[error(transparent)]
    Channel(#[from] ChannelError),

    /// Pose and label traffic must not share a queue.
    #[error("pose and label queues must differ, both are {0:?}")]
    QueueConflict(String),
}

impl Error {
    /// True when the store could not be reached.
    pub fn is_connect(&self) -> bool {
        matches!(self, Error::Channel(err) if err.is_connect())
    }

    /// True for store failures that may clear up on a later call.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Error::Channel(err) if !matches!(err, ChannelError::InvalidQueue(_))
        )
    }

    /// True when a record or payload was rejected for its content.
    pub fn is_data_error(&self) -> bool {
        match self {
            Error::Validation(_) | Error::Parse { .. } => true,
            #[cfg(feature = "schema")]
            Error::Schema { .. } => true,
            Error::Channel(_) | Error::QueueConflict(_) => false,
        }
    }

    /// The consumed payload, for errors raised after a pop.
    pub fn payload(&self) -> Option<&Bytes> {
        match self {
            Error::Parse { payload, .. } => Some(payload),
            #[cfg(feature = "schema")]
            Error::Schema { payload, .. } => Some(payload),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use std::io;

    use posequeue_transport::TransportError;

    use super::*;

    #[test]
    fn classification() {
        let refused = Error::Channel(ChannelError::Connect(TransportError::Io(
            io::Error::from(io::ErrorKind::ConnectionRefused),
        )));
        assert!(refused.is_connect());
        assert!(refused.is_transient());
        assert!(!refused.is_data_error());

        let invalid = Error::Validation(ValidationError::KeypointCount(3));
        assert!(invalid.is_data_error());
        assert!(!invalid.is_transient());
        assert!(invalid.payload().is_none());

        let parse = Error::Parse {
            queue: "labels".into(),
            payload: Bytes::from_static(b"nope"),
            source: ParseError::MissingField("label"),
        };
        assert!(parse.is_data_error());
        assert_eq!(parse.payload().map(|p| p.as_ref()), Some(&b"nope"[..]));

        assert!(!Error::Channel(ChannelError::InvalidQueue(String::new())).is_transient());
    }

    #[test]
    fn display_names_the_queue() {
        let err = Error::Parse {
            queue: "labels".into(),
            payload: Bytes::new(),
            source: ParseError::MissingField("bbox"),
        };
        assert_eq!(
            err.to_string(),
            "undecodable payload on queue \"labels\": missing field `bbox`"
        );
    }
}
