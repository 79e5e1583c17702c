//! TCP transport to the backing queue store.
//!
//! This is the lowest layer of posequeue. It resolves a `host:port` pair,
//! connects with a bounded timeout and hands back a [`StoreStream`] that the
//! RESP codec reads from and writes to. Nothing here knows about queues or
//! records.

pub mod error;
pub mod stream;
pub mod tcp;

pub use error::{Result, TransportError};
pub use stream::StoreStream;
pub use tcp::{StoreEndpoint, DEFAULT_PORT};
