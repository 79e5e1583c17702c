//! Typed pose and label transport over named queues.
//!
//! posequeue moves two record types between processes through a shared
//! RESP (Redis protocol) list store: [`PoseObservation`]s from a pose
//! estimator on one queue and [`LabelRecord`]s from a classifier on
//! another. Every record is validated on send, travels as compact JSON and
//! is validated again on receive.
//!
//! ```no_run
//! use posequeue::PoseTransport;
//!
//! let mut transport = PoseTransport::open("127.0.0.1", 6379, 0, "skeletons", "labels")?;
//! transport.send_label("Falling", &[289.0, 1035.0, 174.0, 540.0])?;
//! if let Some(label) = transport.receive_label()? {
//!     println!("{} at {:?}", label.label, label.bounding_box);
//! }
//! # Ok::<(), posequeue::Error>(())
//! ```
//!
//! # Crate Structure
//!
//! - [`transport`]: TCP connection to the store
//! - [`resp`]: RESP2 command and reply codec
//! - [`envelope`]: records, envelopes and the JSON wire format
//! - [`schema`]: optional JSON Schema checks on received payloads (`schema` feature)
//! - [`channel`]: named FIFO queue channels
//! - [`PoseTransport`] and [`Lane`]: the typed layer on top

/// Re-export transport types.
pub mod transport {
    pub use posequeue_transport::*;
}

/// Re-export RESP codec types.
pub mod resp {
    pub use posequeue_resp::*;
}

/// Re-export record and wire format types.
pub mod envelope {
    pub use posequeue_envelope::*;
}

/// Re-export schema types (requires `schema` feature).
#[cfg(feature = "schema")]
pub mod schema {
    pub use posequeue_schema::*;
}

/// Re-export queue channel types.
pub mod channel {
    pub use posequeue_channel::*;
}

mod error;
mod facade;
mod lane;

pub use error::{Error, Result};
pub use facade::{
    PoseTransport, QueueDepths, TransportConfig, DEFAULT_LABEL_QUEUE, DEFAULT_POSE_QUEUE,
};
pub use lane::Lane;
pub use posequeue_channel::{ChannelConfig, ChannelError};
pub use posequeue_envelope::{
    LabelRecord, ParseError, PoseObservation, Record, RecordKind, ValidationError,
};
