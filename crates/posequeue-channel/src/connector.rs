use std::fmt;
use std::net::SocketAddr;

use posequeue_resp::command::{self, Command};
use posequeue_resp::{CommandWriter, Reply, ReplyReader};
use posequeue_transport::{StoreEndpoint, StoreStream};

use crate::config::ChannelConfig;
use crate::error::{ChannelError, Result};

/// One request/reply connection to the store.
pub struct StoreConnection {
    reader: ReplyReader<StoreStream>,
    writer: CommandWriter<StoreStream>,
    peer: SocketAddr,
}

impl StoreConnection {
    /// Connect, apply timeouts and select the configured database.
    pub fn establish(config: &ChannelConfig) -> Result<Self> {
        let endpoint = StoreEndpoint::new(config.host.clone(), config.port)?;
        let stream = endpoint.connect(config.connect_timeout)?;
        let peer = stream.peer_addr();
        let reader_stream = stream.try_clone()?;

        let reader = ReplyReader::with_config_store(reader_stream, config.resp.clone())?;
        let writer = CommandWriter::with_config_store(stream, config.resp.clone())?;
        let mut connection = Self {
            reader,
            writer,
            peer,
        };

        if config.database != 0 {
            let reply = connection.call(&command::select(config.database))?;
            if !reply.is_ok() {
                return Err(unexpected(command::SELECT, &reply));
            }
        }

        tracing::debug!(%peer, database = config.database, "store connection established");
        Ok(connection)
    }

    /// Send one command and wait for its reply.
    ///
    /// An error reply from the store becomes [`ChannelError::Store`]; every
    /// other reply type is returned for the caller to interpret.
    pub fn call(&mut self, command: &Command) -> Result<Reply> {
        self.writer.send(command)?;
        match self.reader.read_reply()? {
            Reply::Error(message) => Err(ChannelError::Store(message)),
            reply => Ok(reply),
        }
    }

    /// Address of the store this connection talks to.
    pub fn peer_addr(&self) -> SocketAddr {
        self.peer
    }
}

impl fmt::Debug for StoreConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreConnection")
            .field("peer", &self.peer)
            .finish_non_exhaustive()
    }
}

pub(crate) fn unexpected(command: &str, reply: &Reply) -> ChannelError {
    ChannelError::UnexpectedReply {
        command: command.to_string(),
        got: reply.kind(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockStore;

    #[test]
    fn call_returns_typed_replies() {
        let store = MockStore::start().unwrap();
        let mut connection = StoreConnection::establish(&store.channel_config()).unwrap();

        assert_eq!(
            connection.call(&command::ping()).unwrap(),
            Reply::Status("PONG".into())
        );
        assert_eq!(
            connection.call(&command::lpush("q", b"a")).unwrap(),
            Reply::Integer(1)
        );
        assert_eq!(connection.peer_addr(), store.addr());
    }

    #[test]
    fn error_reply_becomes_store_error() {
        let store = MockStore::start().unwrap();
        let mut connection = StoreConnection::establish(&store.channel_config()).unwrap();

        let err = connection.call(&Command::new("FLUSHALL")).unwrap_err();
        assert!(matches!(err, ChannelError::Store(ref message) if message.starts_with("ERR unknown command")));
        // The connection is still usable afterwards.
        assert!(connection.call(&command::ping()).is_ok());
    }

    #[test]
    fn database_is_selected_on_connect() {
        let store = MockStore::start().unwrap();
        let mut connection =
            StoreConnection::establish(&store.channel_config().with_database(2)).unwrap();
        connection.call(&command::lpush("q", b"x")).unwrap();

        assert_eq!(store.len(2, "q"), 1);
        assert_eq!(store.len(0, "q"), 0);
    }

    #[test]
    fn out_of_range_database_is_rejected() {
        let store = MockStore::start().unwrap();
        let err = StoreConnection::establish(&store.channel_config().with_database(99)).unwrap_err();
        assert!(matches!(err, ChannelError::Store(_)));
    }

    #[test]
    fn invalid_endpoint_is_a_connect_error() {
        let config = ChannelConfig::new("", 6379);
        let err = StoreConnection::establish(&config).unwrap_err();
        assert!(err.is_connect());
    }
}
