use std::io::{ErrorKind, Write};

use bytes::BytesMut;
use posequeue_transport::StoreStream;

use crate::codec::{Reply, RespConfig};
use crate::command::Command;
use crate::error::{RespError, Result};
use crate::reader::transport_to_resp_error;

const INITIAL_BUFFER_CAPACITY: usize = 8 * 1024;

/// Writes complete RESP commands (and, for test servers, replies) to any
/// `Write` stream.
pub struct CommandWriter<T> {
    inner: T,
    buf: BytesMut,
    config: RespConfig,
}

impl<T: Write> CommandWriter<T> {
    /// Create a new command writer with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, RespConfig::default())
    }

    /// Create a new command writer with explicit configuration.
    pub fn with_config(inner: T, config: RespConfig) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            config,
        }
    }

    /// Encode and send one command (blocking).
    ///
    /// Argument sizes are checked before anything is written, so an
    /// oversized payload never leaves a partial command on the wire.
    pub fn send(&mut self, command: &Command) -> Result<()> {
        let largest = command.largest_arg();
        if largest > self.config.max_bulk_size {
            return Err(RespError::ArgumentTooLarge {
                size: largest,
                max: self.config.max_bulk_size,
            });
        }

        self.buf.clear();
        command.encode_into(&mut self.buf);
        self.write_buffered()
    }

    /// Encode and send one reply (blocking).
    pub fn write_reply(&mut self, reply: &Reply) -> Result<()> {
        self.buf.clear();
        reply.encode_into(&mut self.buf);
        self.write_buffered()
    }

    fn write_buffered(&mut self) -> Result<()> {
        let mut offset = 0usize;
        while offset < self.buf.len() {
            match self.inner.write(&self.buf[offset..]) {
                Ok(0) => return Err(RespError::ConnectionClosed),
                Ok(n) => offset += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                // WouldBlock here means the write timeout expired.
                Err(err) => return Err(RespError::Io(err)),
            }
        }

        self.flush()
    }

    /// Flush the underlying stream.
    pub fn flush(&mut self) -> Result<()> {
        loop {
            match self.inner.flush() {
                Ok(()) => return Ok(()),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(RespError::Io(err)),
            }
        }
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Consume the writer and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Current writer configuration.
    pub fn config(&self) -> &RespConfig {
        &self.config
    }
}

impl CommandWriter<StoreStream> {
    /// Create a command writer for a store connection and apply the write timeout.
    pub fn with_config_store(inner: StoreStream, config: RespConfig) -> Result<Self> {
        inner
            .set_write_timeout(config.write_timeout)
            .map_err(transport_to_resp_error)?;
        Ok(Self::with_config(inner, config))
    }
}
