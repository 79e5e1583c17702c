//! Named FIFO queues on the backing store.
//!
//! A [`QueueChannel`] is bound to one queue name on one store connection.
//! `push` appends to the queue tail (`LPUSH`), `pop` takes from the head
//! (`RPOP`) and never blocks: an empty queue is `Ok(None)`, which is a
//! normal outcome and not an error.
//!
//! ```no_run
//! use posequeue_channel::QueueChannel;
//!
//! let mut channel = QueueChannel::open("127.0.0.1", 6379, 0, "skeletons")?;
//! channel.push(br#"{"label":"Falling","bbox":[1,2,3,4]}"#)?;
//! while let Some(payload) = channel.pop()? {
//!     println!("{} bytes", payload.len());
//! }
//! # Ok::<(), posequeue_channel::ChannelError>(())
//! ```

pub mod config;
pub mod connector;
pub mod error;
#[cfg(any(test, feature = "test-util"))]
pub mod mock;
pub mod queue;

pub use config::{ChannelConfig, DEFAULT_HOST, DEFAULT_TIMEOUT};
pub use connector::StoreConnection;
pub use error::{ChannelError, Result};
pub use queue::QueueChannel;
