/// Errors that can occur while reaching the backing store over TCP.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The host name could not be resolved to any socket address.
    #[error("failed to resolve {addr}: {source}")]
    Resolve {
        addr: String,
        source: std::io::Error,
    },

    /// Every resolved address refused or timed out.
    #[error("failed to connect to {addr}: {source}")]
    Connect {
        addr: String,
        source: std::io::Error,
    },

    /// An I/O error occurred on an established stream.
    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The endpoint is not usable (empty host, port 0).
    #[error("invalid store endpoint: {0}")]
    InvalidEndpoint(String),
}

impl TransportError {
    /// The underlying I/O error kind, when there is one.
    pub fn io_kind(&self) -> Option<std::io::ErrorKind> {
        match self {
            TransportError::Resolve { source, .. } | TransportError::Connect { source, .. } => {
                Some(source.kind())
            }
            TransportError::Io(err) => Some(err.kind()),
            TransportError::InvalidEndpoint(_) => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, TransportError>;
