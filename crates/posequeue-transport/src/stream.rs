use std::io::{Read, Write};
use std::net::{Shutdown, SocketAddr, TcpStream};
use std::time::Duration;

use crate::error::Result;

/// A connected stream to the backing store.
///
/// This is the I/O type the RESP reader and writer wrap. Reader and writer
/// halves are obtained with [`StoreStream::try_clone`].
pub struct StoreStream {
    inner: TcpStream,
    peer: SocketAddr,
}

impl Read for StoreStream {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.inner.read(buf)
    }
}

impl Write for StoreStream {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.inner.write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}

impl StoreStream {
    pub(crate) fn from_tcp(inner: TcpStream, peer: SocketAddr) -> Self {
        Self { inner, peer }
    }

    /// Set read timeout on the underlying socket.
    pub fn set_read_timeout(&self, timeout: Option<Duration>) -> Result<()> {
        self.inner.set_read_timeout(timeout).map_err(Into::into)
    }

    /// Set write timeout on the underlying socket.
    pub fn set_write_timeout(&self, timeout: Option<Duration>) -> Result<()> {
        self.inner.set_write_timeout(timeout).map_err(Into::into)
    }

    /// Try to clone this stream (creates a new file descriptor).
    pub fn try_clone(&self) -> Result<Self> {
        let cloned = self.inner.try_clone()?;
        Ok(Self::from_tcp(cloned, self.peer))
    }

    /// Address of the store this stream is connected to.
    pub fn peer_addr(&self) -> SocketAddr {
        self.peer
    }

    /// Shut down both directions of the connection.
    ///
    /// Errors are ignored; the peer may already be gone.
    pub fn shutdown(&self) {
        let _ = self.inner.shutdown(Shutdown::Both);
    }
}

impl std::fmt::Debug for StoreStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreStream")
            .field("type", &"tcp")
            .field("peer", &self.peer)
            .finish()
    }
}
