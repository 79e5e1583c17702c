use std::time::Duration;

use posequeue_resp::RespConfig;
use posequeue_transport::DEFAULT_PORT;

/// Host used when none is given.
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default bound on connecting and on each round trip.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Where the store lives and how to talk to it.
#[derive(Debug, Clone)]
pub struct ChannelConfig {
    pub host: String,
    pub port: u16,
    /// Logical database index, selected right after connecting.
    pub database: u32,
    /// Bound on each TCP connect attempt. `None` waits for the OS.
    pub connect_timeout: Option<Duration>,
    /// Payload size limit and per round trip timeouts.
    pub resp: RespConfig,
    /// Defer connecting until the first operation.
    pub lazy_connect: bool,
}

impl ChannelConfig {
    /// Default settings for `host:port`, database 0.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Self::default()
        }
    }

    pub fn with_database(mut self, database: u32) -> Self {
        self.database = database;
        self
    }

    /// Apply one timeout to connecting, reading and writing.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.connect_timeout = timeout;
        self.resp.read_timeout = timeout;
        self.resp.write_timeout = timeout;
        self
    }

    pub fn with_lazy_connect(mut self, lazy: bool) -> Self {
        self.lazy_connect = lazy;
        self
    }
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            database: 0,
            connect_timeout: Some(DEFAULT_TIMEOUT),
            resp: RespConfig {
                read_timeout: Some(DEFAULT_TIMEOUT),
                write_timeout: Some(DEFAULT_TIMEOUT),
                ..RespConfig::default()
            },
            lazy_connect: false,
        }
    }
}
