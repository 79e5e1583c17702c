use std::fmt;
use std::marker::PhantomData;
#[cfg(feature = "schema")]
use std::sync::Arc;

use bytes::Bytes;
use posequeue_channel::{ChannelConfig, QueueChannel};
use posequeue_envelope::{from_wire, to_wire, Envelope, ParseError, Record};

use crate::error::{Error, Result};

/// One queue carrying one record type.
///
/// A lane owns its [`QueueChannel`], so the two lanes of a
/// [`PoseTransport`](crate::PoseTransport) can be driven from different
/// threads after [`split`](crate::PoseTransport::split).
pub struct Lane<R> {
    channel: QueueChannel,
    #[cfg(feature = "schema")]
    schema: Option<Arc<posequeue_schema::SchemaRegistry>>,
    _record: PhantomData<fn() -> R>,
}

impl<R: Record> Lane<R> {
    /// Open a channel on `queue` and bind it to `R`.
    pub fn open(queue: impl Into<String>, config: ChannelConfig) -> Result<Self> {
        Ok(Self::from_channel(QueueChannel::open_with_config(
            queue, config,
        )?))
    }

    /// Bind an already open channel to `R`.
    pub fn from_channel(channel: QueueChannel) -> Self {
        Self {
            channel,
            #[cfg(feature = "schema")]
            schema: None,
            _record: PhantomData,
        }
    }

    /// Check dequeued payloads against `registry` before decoding.
    #[cfg(feature = "schema")]
    pub fn with_schema_registry(mut self, registry: Arc<posequeue_schema::SchemaRegistry>) -> Self {
        self.schema = Some(registry);
        self
    }

    /// Validate, encode and push a record. Returns the queue depth.
    pub fn send(&mut self, record: &R) -> Result<u64> {
        let envelope = record.to_envelope()?;
        self.push_envelope(&envelope)
    }

    /// Push an envelope that has already been validated by encoding.
    pub(crate) fn push_envelope(&mut self, envelope: &Envelope) -> Result<u64> {
        let wire = to_wire(envelope);
        Ok(self.channel.push(wire.as_bytes())?)
    }

    /// Pop and decode the next record, or `None` when the queue is empty.
    ///
    /// A payload that fails to decode is still consumed; it comes back
    /// inside the error.
    pub fn receive(&mut self) -> Result<Option<R>> {
        let Some(payload) = self.channel.pop()? else {
            return Ok(None);
        };

        match self.decode(&payload) {
            Ok(record) => Ok(Some(record)),
            Err(err) => {
                tracing::warn!(
                    queue = self.channel.queue(),
                    kind = %R::KIND,
                    bytes = payload.len(),
                    error = %err,
                    "dropping undecodable payload"
                );
                Err(self.decode_error(payload, err))
            }
        }
    }

    /// Number of records waiting in the queue.
    pub fn depth(&mut self) -> Result<u64> {
        Ok(self.channel.len()?)
    }

    /// Check that the store answers.
    pub fn ping(&mut self) -> Result<()> {
        Ok(self.channel.ping()?)
    }

    pub fn queue(&self) -> &str {
        self.channel.queue()
    }

    pub fn channel(&self) -> &QueueChannel {
        &self.channel
    }

    pub fn channel_mut(&mut self) -> &mut QueueChannel {
        &mut self.channel
    }

    pub fn into_channel(self) -> QueueChannel {
        self.channel
    }

    fn decode(&self, payload: &Bytes) -> std::result::Result<R, DecodeError> {
        let envelope = from_wire(payload)?;
        self.check_schema(payload)?;
        Ok(R::from_envelope(&envelope)?)
    }

    #[cfg(feature = "schema")]
    fn check_schema(&self, payload: &[u8]) -> std::result::Result<(), DecodeError> {
        match &self.schema {
            Some(registry) => registry
                .validate(R::KIND, payload)
                .map_err(DecodeError::Schema),
            None => Ok(()),
        }
    }

    #[cfg(not(feature = "schema"))]
    fn check_schema(&self, _payload: &[u8]) -> std::result::Result<(), DecodeError> {
        Ok(())
    }

    fn decode_error(&self, payload: Bytes, err: DecodeError) -> Error {
        let queue = self.channel.queue().to_string();
        match err {
            DecodeError::Parse(source) => Error::Parse {
                queue,
                payload,
                source,
            },
            #[cfg(feature = "schema")]
            DecodeError::Schema(source) => Error::Schema {
                queue,
                payload,
                source,
            },
        }
    }
}

impl<R: Record> fmt::Debug for Lane<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lane")
            .field("kind", &R::KIND)
            .field("channel", &self.channel)
            .finish()
    }
}

#[derive(Debug, thiserror::Error)]
enum DecodeError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[cfg(feature = "schema")]
    #[error(transparent)]
    Schema(posequeue_schema::SchemaError),
}
