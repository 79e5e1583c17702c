use bytes::Bytes;
use posequeue_resp::command::{self, Command};
use posequeue_resp::Reply;

use crate::config::ChannelConfig;
use crate::connector::{unexpected, StoreConnection};
use crate::error::{ChannelError, Result};

/// A named FIFO queue on the backing store.
///
/// Each channel owns its connection. After a connection level failure the
/// connection is dropped and the failing call returns its error; the next
/// call connects again. Nothing is retried.
#[derive(Debug)]
pub struct QueueChannel {
    queue: String,
    config: ChannelConfig,
    connection: Option<StoreConnection>,
}

impl QueueChannel {
    /// Open a channel on `queue` at `host:port`, database `database`.
    ///
    /// Connects immediately; an unreachable store is reported here as
    /// [`ChannelError::Connect`].
    pub fn open(host: &str, port: u16, database: u32, queue: &str) -> Result<Self> {
        let config = ChannelConfig::new(host, port).with_database(database);
        Self::open_with_config(queue, config)
    }

    /// Open a channel with explicit configuration.
    ///
    /// With `lazy_connect` set nothing touches the network until the first
    /// operation.
    pub fn open_with_config(queue: impl Into<String>, config: ChannelConfig) -> Result<Self> {
        let queue = queue.into();
        if queue.is_empty() {
            return Err(ChannelError::InvalidQueue(queue));
        }

        let connection = if config.lazy_connect {
            None
        } else {
            Some(StoreConnection::establish(&config)?)
        };

        tracing::info!(
            queue = %queue,
            host = %config.host,
            port = config.port,
            database = config.database,
            lazy = config.lazy_connect,
            "queue channel open"
        );
        Ok(Self {
            queue,
            config,
            connection,
        })
    }

    /// Append `payload` at the tail of the queue.
    ///
    /// Returns the queue depth after the push.
    pub fn push(&mut self, payload: &[u8]) -> Result<u64> {
        let reply = self.round_trip(&command::lpush(&self.queue, payload))?;
        let depth = non_negative(command::LPUSH, &reply)?;
        tracing::debug!(queue = %self.queue, bytes = payload.len(), depth, "pushed");
        Ok(depth)
    }

    /// Remove and return the head of the queue, or `None` when it is empty.
    ///
    /// The returned bytes are exactly what the producer pushed.
    pub fn pop(&mut self) -> Result<Option<Bytes>> {
        match self.round_trip(&command::rpop(&self.queue))? {
            Reply::Bulk(payload) => {
                match &payload {
                    Some(bytes) => {
                        tracing::debug!(queue = %self.queue, bytes = bytes.len(), "popped")
                    }
                    None => tracing::trace!(queue = %self.queue, "queue empty"),
                }
                Ok(payload)
            }
            other => Err(unexpected(command::RPOP, &other)),
        }
    }

    /// Number of payloads waiting in the queue.
    pub fn len(&mut self) -> Result<u64> {
        let reply = self.round_trip(&command::llen(&self.queue))?;
        non_negative(command::LLEN, &reply)
    }

    /// Drop every payload in the queue. Returns whether anything was queued.
    pub fn clear(&mut self) -> Result<bool> {
        let reply = self.round_trip(&Command::new(command::DEL).arg(&self.queue))?;
        Ok(non_negative(command::DEL, &reply)? > 0)
    }

    /// Check that the store answers.
    pub fn ping(&mut self) -> Result<()> {
        match self.round_trip(&command::ping())? {
            Reply::Status(line) if line == "PONG" => Ok(()),
            other => Err(unexpected(command::PING, &other)),
        }
    }

    /// Queue name this channel is bound to.
    pub fn queue(&self) -> &str {
        &self.queue
    }

    pub fn config(&self) -> &ChannelConfig {
        &self.config
    }

    /// Whether a connection is currently held.
    pub fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    /// Close the connection; the next operation reconnects.
    pub fn disconnect(&mut self) {
        if self.connection.take().is_some() {
            tracing::debug!(queue = %self.queue, "disconnected");
        }
    }

    fn connection(&mut self) -> Result<&mut StoreConnection> {
        let connection = match self.connection.take() {
            Some(connection) => connection,
            None => {
                tracing::debug!(queue = %self.queue, "connecting");
                StoreConnection::establish(&self.config)?
            }
        };
        Ok(self.connection.insert(connection))
    }

    fn round_trip(&mut self, command: &Command) -> Result<Reply> {
        let result = self.connection()?.call(command);
        if let Err(err) = &result {
            if err.breaks_connection() {
                tracing::warn!(queue = %self.queue, error = %err, "dropping store connection");
                self.connection = None;
            }
        }
        result
    }
}

fn non_negative(command: &str, reply: &Reply) -> Result<u64> {
    reply
        .as_integer()
        .and_then(|value| u64::try_from(value).ok())
        .ok_or_else(|| unexpected(command, reply))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use posequeue_resp::RespError;

    use super::*;
    use crate::mock::MockStore;

    #[test]
    fn push_then_pop_is_fifo() {
        let store = MockStore::start().unwrap();
        let mut channel = QueueChannel::open(&store.host(), store.port(), 0, "q").unwrap();

        assert_eq!(channel.push(b"first").unwrap(), 1);
        assert_eq!(channel.push(b"second").unwrap(), 2);
        assert_eq!(channel.len().unwrap(), 2);

        assert_eq!(channel.pop().unwrap().as_deref(), Some(&b"first"[..]));
        assert_eq!(channel.pop().unwrap().as_deref(), Some(&b"second"[..]));
        assert_eq!(channel.pop().unwrap(), None);
    }

    #[test]
    fn empty_queue_is_not_an_error() {
        let store = MockStore::start().unwrap();
        let mut channel = QueueChannel::open(&store.host(), store.port(), 0, "never-used").unwrap();
        assert!(matches!(channel.pop(), Ok(None)));
        assert!(channel.is_connected());
    }

    #[test]
    fn empty_queue_name_is_rejected() {
        let err = QueueChannel::open_with_config("", ChannelConfig::default()).unwrap_err();
        assert!(matches!(err, ChannelError::InvalidQueue(_)));
    }

    #[test]
    fn lazy_channel_connects_on_first_use() {
        let store = MockStore::start().unwrap();
        let config = store.channel_config().with_lazy_connect(true);
        let mut channel = QueueChannel::open_with_config("q", config).unwrap();
        assert!(!channel.is_connected());
        assert_eq!(store.connections_accepted(), 0);

        channel.ping().unwrap();
        assert!(channel.is_connected());
        assert_eq!(store.connections_accepted(), 1);
    }

    #[test]
    fn oversized_payload_keeps_connection() {
        let store = MockStore::start().unwrap();
        let mut config = store.channel_config();
        config.resp.max_bulk_size = 8;
        let mut channel = QueueChannel::open_with_config("q", config).unwrap();

        let err = channel.push(b"far too large").unwrap_err();
        assert!(matches!(
            err,
            ChannelError::Resp(RespError::ArgumentTooLarge { size: 13, max: 8 })
        ));
        assert!(channel.is_connected());
        assert_eq!(store.len(0, "q"), 0);
        assert_eq!(channel.push(b"small").unwrap(), 1);
    }

    #[test]
    fn store_error_keeps_connection() {
        let store = MockStore::start().unwrap();
        let mut channel = QueueChannel::open(&store.host(), store.port(), 0, "q").unwrap();

        store.fail_next("WRONGTYPE Operation against a key holding the wrong kind of value");
        let err = channel.pop().unwrap_err();
        assert!(matches!(err, ChannelError::Store(ref message) if message.starts_with("WRONGTYPE")));
        assert!(channel.is_connected());
        assert_eq!(channel.pop().unwrap(), None);
    }

    #[test]
    fn reconnects_after_connection_drop() {
        let store = MockStore::start().unwrap();
        let mut channel = QueueChannel::open_with_config(
            "q",
            store
                .channel_config()
                .with_timeout(Some(Duration::from_secs(2))),
        )
        .unwrap();
        channel.push(b"kept").unwrap();

        store.drop_connections();
        let err = channel.pop().unwrap_err();
        assert!(matches!(err, ChannelError::Resp(_)));
        assert!(!channel.is_connected());

        // Nothing was consumed by the failed call.
        assert_eq!(channel.pop().unwrap().as_deref(), Some(&b"kept"[..]));
        assert_eq!(store.connections_accepted(), 2);
    }

    #[test]
    fn clear_and_disconnect() {
        let store = MockStore::start().unwrap();
        let mut channel = QueueChannel::open(&store.host(), store.port(), 0, "q").unwrap();
        channel.push(b"a").unwrap();

        assert!(channel.clear().unwrap());
        assert!(!channel.clear().unwrap());

        channel.disconnect();
        assert!(!channel.is_connected());
        assert_eq!(channel.len().unwrap(), 0);
        assert_eq!(channel.queue(), "q");
    }
}
