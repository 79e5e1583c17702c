/// Errors that can occur during RESP encoding/decoding.
#[derive(Debug, thiserror::Error)]
pub enum RespError {
    /// The reply starts with a byte that is not a RESP2 type marker.
    #[error("invalid reply type byte 0x{0:02x}")]
    InvalidType(u8),

    /// The reply is structurally broken (bad length, missing CRLF, bad integer).
    #[error("malformed reply: {0}")]
    Malformed(String),

    /// A bulk string exceeds the configured maximum size.
    #[error("bulk string too large ({size} bytes, max {max})")]
    BulkTooLarge { size: usize, max: usize },

    /// An outgoing command argument exceeds the configured maximum size.
    /// Nothing has been written when this is returned.
    #[error("command argument too large ({size} bytes, max {max})")]
    ArgumentTooLarge { size: usize, max: usize },

    /// An I/O error occurred while reading replies or writing commands.
    #[error("RESP I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The connection was closed before a complete reply was received.
    #[error("connection closed (incomplete reply)")]
    ConnectionClosed,
}

impl RespError {
    /// True when the connection can no longer be trusted to be in sync.
    ///
    /// Every variant except an oversized outgoing argument qualifies: after a
    /// decode failure the read buffer position is unknown.
    pub fn breaks_connection(&self) -> bool {
        !matches!(self, RespError::ArgumentTooLarge { .. })
    }
}

pub type Result<T> = std::result::Result<T, RespError>;
