use std::io::{ErrorKind, Read};

use bytes::BytesMut;
use posequeue_transport::StoreStream;

use crate::codec::{decode_reply, Reply, RespConfig};
use crate::error::{RespError, Result};

const INITIAL_BUFFER_CAPACITY: usize = 8 * 1024;
const READ_CHUNK_SIZE: usize = 8 * 1024;

/// Reads complete RESP replies from any `Read` stream.
///
/// Partial reads are buffered internally; callers only see complete replies.
pub struct ReplyReader<T> {
    inner: T,
    buf: BytesMut,
    config: RespConfig,
}

impl<T: Read> ReplyReader<T> {
    /// Create a new reply reader with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, RespConfig::default())
    }

    /// Create a new reply reader with explicit configuration.
    pub fn with_config(inner: T, config: RespConfig) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            config,
        }
    }

    /// Read the next complete reply (blocking).
    ///
    /// Returns `Err(RespError::ConnectionClosed)` when EOF is reached, and
    /// `Err(RespError::Io)` with kind `WouldBlock`/`TimedOut` when the
    /// configured read timeout expires.
    pub fn read_reply(&mut self) -> Result<Reply> {
        loop {
            if let Some(reply) = decode_reply(&mut self.buf, self.config.max_bulk_size)? {
                return Ok(reply);
            }

            let mut chunk = [0u8; READ_CHUNK_SIZE];
            let read = match self.inner.read(&mut chunk) {
                Ok(n) => n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(RespError::Io(err)),
            };

            if read == 0 {
                return Err(RespError::ConnectionClosed);
            }

            self.buf.extend_from_slice(&chunk[..read]);
        }
    }

    /// Whether bytes of a not-yet-complete reply are buffered.
    pub fn has_buffered(&self) -> bool {
        !self.buf.is_empty()
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Consume the reader and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Current reader configuration.
    pub fn config(&self) -> &RespConfig {
        &self.config
    }
}

impl ReplyReader<StoreStream> {
    /// Create a reply reader for a store connection and apply the read timeout.
    pub fn with_config_store(inner: StoreStream, config: RespConfig) -> Result<Self> {
        inner
            .set_read_timeout(config.read_timeout)
            .map_err(transport_to_resp_error)?;
        Ok(Self::with_config(inner, config))
    }
}

pub(crate) fn transport_to_resp_error(err: posequeue_transport::TransportError) -> RespError {
    match err {
        posequeue_transport::TransportError::Io(io)
        | posequeue_transport::TransportError::Connect { source: io, .. }
        | posequeue_transport::TransportError::Resolve { source: io, .. } => RespError::Io(io),
        other => RespError::Io(std::io::Error::other(other.to_string())),
    }
}
