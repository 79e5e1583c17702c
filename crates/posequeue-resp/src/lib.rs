//! RESP2 (REdis Serialization Protocol) framing for the backing store.
//!
//! Commands go out as arrays of bulk strings; replies come back as one of
//! five typed values:
//! - `+` status line
//! - `-` error line
//! - `:` signed 64-bit integer
//! - `$` length-prefixed bulk string (`$-1` is null)
//! - `*` array of replies (`*-1` is null)
//!
//! Decoding is incremental: callers of [`ReplyReader`] always get complete
//! replies, and a dequeued payload is the exact byte range announced by its
//! bulk length prefix.

pub mod codec;
pub mod command;
pub mod error;
pub mod reader;
pub mod writer;

pub use codec::{decode_reply, encode_command, Reply, RespConfig, DEFAULT_MAX_BULK};
pub use command::Command;
pub use error::{RespError, Result};
pub use reader::ReplyReader;
pub use writer::CommandWriter;
