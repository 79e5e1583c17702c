use std::fmt;
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use tracing::{debug, warn};

use crate::error::{Result, TransportError};
use crate::stream::StoreStream;

/// Default port of a RESP store.
pub const DEFAULT_PORT: u16 = 6379;

/// Network address of the backing store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreEndpoint {
    host: String,
    port: u16,
}

impl StoreEndpoint {
    /// Create an endpoint, rejecting an empty host or port 0.
    pub fn new(host: impl Into<String>, port: u16) -> Result<Self> {
        let host = host.into();
        if host.trim().is_empty() {
            return Err(TransportError::InvalidEndpoint(
                "host must not be empty".to_string(),
            ));
        }
        if port == 0 {
            return Err(TransportError::InvalidEndpoint(format!(
                "port must be non-zero (host {host})"
            )));
        }
        Ok(Self { host, port })
    }

    /// Host name or IP literal.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// TCP port.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Resolve the endpoint to one or more socket addresses.
    pub fn resolve(&self) -> Result<Vec<SocketAddr>> {
        let addrs: Vec<SocketAddr> = (self.host.as_str(), self.port)
            .to_socket_addrs()
            .map_err(|source| TransportError::Resolve {
                addr: self.to_string(),
                source,
            })?
            .collect();

        if addrs.is_empty() {
            return Err(TransportError::Resolve {
                addr: self.to_string(),
                source: std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "host resolved to no addresses",
                ),
            });
        }
        Ok(addrs)
    }

    /// Connect to the store (blocking).
    ///
    /// Each resolved address is tried in order. `timeout` bounds every
    /// individual attempt; `None` (or a zero duration) leaves it to the OS.
    pub fn connect(&self, timeout: Option<Duration>) -> Result<StoreStream> {
        let timeout = timeout.filter(|t| !t.is_zero());
        let mut last_err = None;

        for addr in self.resolve()? {
            let attempt = match timeout {
                Some(limit) => TcpStream::connect_timeout(&addr, limit),
                None => TcpStream::connect(addr),
            };
            match attempt {
                Ok(stream) => {
                    if let Err(err) = stream.set_nodelay(true) {
                        warn!(%addr, error = %err, "failed to disable nagle");
                    }
                    debug!(%addr, "connected to store");
                    return Ok(StoreStream::from_tcp(stream, addr));
                }
                Err(err) => {
                    debug!(%addr, error = %err, "connect attempt failed");
                    last_err = Some(err);
                }
            }
        }

        Err(TransportError::Connect {
            addr: self.to_string(),
            source: last_err.unwrap_or_else(|| {
                std::io::Error::new(std::io::ErrorKind::NotConnected, "no address attempted")
            }),
        })
    }
}

impl fmt::Display for StoreEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}
