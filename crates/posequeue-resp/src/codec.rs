use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{RespError, Result};

/// Default maximum bulk string size: 16 MiB.
pub const DEFAULT_MAX_BULK: usize = 16 * 1024 * 1024;

/// Longest status/error/integer line accepted before the CRLF shows up.
const MAX_LINE_LEN: usize = 64 * 1024;

/// Deepest array nesting accepted in a reply.
const MAX_DEPTH: usize = 32;

const CRLF: &[u8] = b"\r\n";

/// A decoded RESP2 reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// `+OK`, `+PONG`.
    Status(String),
    /// `-ERR ...`, `-WRONGTYPE ...`.
    Error(String),
    /// `:42`.
    Integer(i64),
    /// `$5\r\nhello`; `None` for `$-1`.
    Bulk(Option<Bytes>),
    /// `*2\r\n...`; `None` for `*-1`.
    Array(Option<Vec<Reply>>),
}

impl Reply {
    /// Encode this reply into `dst`.
    pub fn encode_into(&self, dst: &mut BytesMut) {
        match self {
            Reply::Status(line) => put_line(dst, b'+', line.as_bytes()),
            Reply::Error(line) => put_line(dst, b'-', line.as_bytes()),
            Reply::Integer(value) => put_line(dst, b':', value.to_string().as_bytes()),
            Reply::Bulk(Some(data)) => put_bulk(dst, data),
            Reply::Bulk(None) => dst.put_slice(b"$-1\r\n"),
            Reply::Array(Some(items)) => {
                put_line(dst, b'*', items.len().to_string().as_bytes());
                for item in items {
                    item.encode_into(dst);
                }
            }
            Reply::Array(None) => dst.put_slice(b"*-1\r\n"),
        }
    }

    /// Bulk payload, if this is a non-null bulk string.
    pub fn as_bytes(&self) -> Option<&Bytes> {
        match self {
            Reply::Bulk(Some(data)) => Some(data),
            _ => None,
        }
    }

    /// Integer value, if this is an integer reply.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Reply::Integer(value) => Some(*value),
            _ => None,
        }
    }

    /// True for `+OK`.
    pub fn is_ok(&self) -> bool {
        matches!(self, Reply::Status(line) if line == "OK")
    }

    /// True for `$-1` and `*-1`.
    pub fn is_null(&self) -> bool {
        matches!(self, Reply::Bulk(None) | Reply::Array(None))
    }

    /// Short type name for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Reply::Status(_) => "status",
            Reply::Error(_) => "error",
            Reply::Integer(_) => "integer",
            Reply::Bulk(Some(_)) => "bulk",
            Reply::Bulk(None) => "null bulk",
            Reply::Array(Some(_)) => "array",
            Reply::Array(None) => "null array",
        }
    }
}

/// Encode a command as a RESP array of bulk strings.
///
/// Wire format for `LPUSH skeletons {..}`:
/// ```text
/// *3\r\n
/// $5\r\nLPUSH\r\n
/// $9\r\nskeletons\r\n
/// $<n>\r\n{..}\r\n
/// ```
pub fn encode_command(args: &[&[u8]], dst: &mut BytesMut) {
    let payload: usize = args.iter().map(|arg| arg.len() + 16).sum();
    dst.reserve(16 + payload);
    put_line(dst, b'*', args.len().to_string().as_bytes());
    for arg in args {
        put_bulk(dst, arg);
    }
}

/// Decode one reply from a buffer.
///
/// Returns `Ok(None)` if the buffer doesn't contain a complete reply yet.
/// On success, consumes the reply bytes from the buffer.
pub fn decode_reply(src: &mut BytesMut, max_bulk: usize) -> Result<Option<Reply>> {
    match parse(&src[..], 0, 0, max_bulk)? {
        Some((reply, consumed)) => {
            src.advance(consumed);
            Ok(Some(reply))
        }
        None => Ok(None),
    }
}

/// Configuration for the RESP reader and writer.
#[derive(Debug, Clone)]
pub struct RespConfig {
    /// Maximum bulk string size in bytes, both directions. Default: 16 MiB.
    pub max_bulk_size: usize,
    /// Read timeout for blocking operations.
    pub read_timeout: Option<std::time::Duration>,
    /// Write timeout for blocking operations.
    pub write_timeout: Option<std::time::Duration>,
}

impl Default for RespConfig {
    fn default() -> Self {
        Self {
            max_bulk_size: DEFAULT_MAX_BULK,
            read_timeout: None,
            write_timeout: None,
        }
    }
}

fn put_line(dst: &mut BytesMut, marker: u8, body: &[u8]) {
    dst.put_u8(marker);
    dst.put_slice(body);
    dst.put_slice(CRLF);
}

fn put_bulk(dst: &mut BytesMut, data: &[u8]) {
    put_line(dst, b'$', data.len().to_string().as_bytes());
    dst.put_slice(data);
    dst.put_slice(CRLF);
}

/// Parse one reply starting at `pos`. Returns the reply and the absolute
/// offset just past it, or `None` when more bytes are needed.
fn parse(buf: &[u8], pos: usize, depth: usize, max_bulk: usize) -> Result<Option<(Reply, usize)>> {
    if depth > MAX_DEPTH {
        return Err(RespError::Malformed(format!(
            "array nesting deeper than {MAX_DEPTH}"
        )));
    }
    let Some(&marker) = buf.get(pos) else {
        return Ok(None);
    };
    let Some((line, after_line)) = read_line(buf, pos + 1)? else {
        return Ok(None);
    };

    match marker {
        b'+' => Ok(Some((Reply::Status(line_to_string(line)?), after_line))),
        b'-' => Ok(Some((Reply::Error(line_to_string(line)?), after_line))),
        b':' => Ok(Some((Reply::Integer(parse_int(line)?), after_line))),
        b'$' => {
            let len = parse_int(line)?;
            if len == -1 {
                return Ok(Some((Reply::Bulk(None), after_line)));
            }
            let len = usize::try_from(len)
                .map_err(|_| RespError::Malformed(format!("negative bulk length {len}")))?;
            if len > max_bulk {
                return Err(RespError::BulkTooLarge {
                    size: len,
                    max: max_bulk,
                });
            }
            let end = after_line + len;
            if buf.len() < end + CRLF.len() {
                return Ok(None);
            }
            if &buf[end..end + CRLF.len()] != CRLF {
                return Err(RespError::Malformed(
                    "bulk string not terminated by CRLF".to_string(),
                ));
            }
            let data = Bytes::copy_from_slice(&buf[after_line..end]);
            Ok(Some((Reply::Bulk(Some(data)), end + CRLF.len())))
        }
        b'*' => {
            let count = parse_int(line)?;
            if count == -1 {
                return Ok(Some((Reply::Array(None), after_line)));
            }
            let count = usize::try_from(count)
                .map_err(|_| RespError::Malformed(format!("negative array length {count}")))?;
            // Every element needs at least three bytes, so a count larger than
            // the remaining budget cannot be satisfied by a sane peer.
            if count > max_bulk / 3 + 1 {
                return Err(RespError::Malformed(format!("array length {count} too large")));
            }
            let mut items = Vec::with_capacity(count.min(1024));
            let mut cursor = after_line;
            for _ in 0..count {
                match parse(buf, cursor, depth + 1, max_bulk)? {
                    Some((item, next)) => {
                        items.push(item);
                        cursor = next;
                    }
                    None => return Ok(None),
                }
            }
            Ok(Some((Reply::Array(Some(items)), cursor)))
        }
        other => Err(RespError::InvalidType(other)),
    }
}

/// Find the CRLF-terminated line starting at `start`.
fn read_line(buf: &[u8], start: usize) -> Result<Option<(&[u8], usize)>> {
    let window = buf.get(start..).unwrap_or_default();
    match window.windows(2).position(|pair| pair == CRLF) {
        Some(offset) => Ok(Some((&window[..offset], start + offset + CRLF.len()))),
        None if window.len() > MAX_LINE_LEN => Err(RespError::Malformed(format!(
            "line exceeds {MAX_LINE_LEN} bytes without CRLF"
        ))),
        None => Ok(None),
    }
}

fn line_to_string(line: &[u8]) -> Result<String> {
    std::str::from_utf8(line)
        .map(str::to_string)
        .map_err(|err| RespError::Malformed(format!("line is not UTF-8: {err}")))
}

fn parse_int(line: &[u8]) -> Result<i64> {
    std::str::from_utf8(line)
        .ok()
        .and_then(|text| text.parse::<i64>().ok())
        .ok_or_else(|| {
            RespError::Malformed(format!(
                "invalid integer {:?}",
                String::from_utf8_lossy(line)
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode_all(wire: &[u8]) -> Result<Option<Reply>> {
        let mut buf = BytesMut::from(wire);
        decode_reply(&mut buf, DEFAULT_MAX_BULK)
    }

    #[test]
    fn test_encode_command_layout() {
        let mut buf = BytesMut::new();
        encode_command(&[b"LPUSH", b"skeletons", b"{}"], &mut buf);
        assert_eq!(
            buf.as_ref(),
            b"*3\r\n$5\r\nLPUSH\r\n$9\r\nskeletons\r\n$2\r\n{}\r\n"
        );
    }

    #[test]
    fn test_decode_scalar_replies() {
        assert_eq!(
            decode_all(b"+OK\r\n").unwrap(),
            Some(Reply::Status("OK".to_string()))
        );
        assert_eq!(
            decode_all(b"-ERR unknown command\r\n").unwrap(),
            Some(Reply::Error("ERR unknown command".to_string()))
        );
        assert_eq!(decode_all(b":-7\r\n").unwrap(), Some(Reply::Integer(-7)));
        assert_eq!(decode_all(b"$-1\r\n").unwrap(), Some(Reply::Bulk(None)));
        assert_eq!(decode_all(b"*-1\r\n").unwrap(), Some(Reply::Array(None)));
    }

    #[test]
    fn test_bulk_payload_is_exact_inner_bytes() {
        // The payload itself contains CRLF; only the length prefix decides.
        let mut buf = BytesMut::from(&b"$11\r\n{\"a\":\r\n\"b\"}\r\n"[..]);
        let reply = decode_reply(&mut buf, DEFAULT_MAX_BULK).unwrap().unwrap();
        assert_eq!(reply.as_bytes().unwrap().as_ref(), b"{\"a\":\r\n\"b\"}");
        assert!(buf.is_empty());
    }

    #[test]
    fn test_decode_incomplete_returns_none_and_keeps_buffer() {
        let mut buf = BytesMut::from(&b"$5\r\nhel"[..]);
        assert!(decode_reply(&mut buf, DEFAULT_MAX_BULK).unwrap().is_none());
        assert_eq!(buf.len(), 7);

        let mut header_only = BytesMut::from(&b":12"[..]);
        assert!(decode_reply(&mut header_only, DEFAULT_MAX_BULK)
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_decode_nested_array() {
        let wire = b"*2\r\n$4\r\nRPOP\r\n*1\r\n:3\r\n";
        let reply = decode_all(wire).unwrap().unwrap();
        assert_eq!(
            reply,
            Reply::Array(Some(vec![
                Reply::Bulk(Some(Bytes::from_static(b"RPOP"))),
                Reply::Array(Some(vec![Reply::Integer(3)])),
            ]))
        );
    }

    #[test]
    fn test_decode_incomplete_array_element() {
        let mut buf = BytesMut::from(&b"*2\r\n:1\r\n"[..]);
        assert!(decode_reply(&mut buf, DEFAULT_MAX_BULK).unwrap().is_none());
        assert_eq!(buf.len(), 8);
    }

    #[test]
    fn test_decode_invalid_type_byte() {
        assert!(matches!(
            decode_all(b"?what\r\n"),
            Err(RespError::InvalidType(b'?'))
        ));
    }

    #[test]
    fn test_decode_bad_lengths() {
        assert!(matches!(decode_all(b"$abc\r\n"), Err(RespError::Malformed(_))));
        assert!(matches!(decode_all(b"$-5\r\n"), Err(RespError::Malformed(_))));
        assert!(matches!(
            decode_all(b"$3\r\nabcXY"),
            Err(RespError::Malformed(_))
        ));
    }

    #[test]
    fn test_decode_bulk_too_large() {
        let mut buf = BytesMut::from(&b"$1024\r\n"[..]);
        let result = decode_reply(&mut buf, 16);
        assert!(matches!(
            result,
            Err(RespError::BulkTooLarge { size: 1024, max: 16 })
        ));
    }

    #[test]
    fn test_multiple_replies_in_one_buffer() {
        let mut buf = BytesMut::new();
        Reply::Integer(1).encode_into(&mut buf);
        Reply::Bulk(Some(Bytes::from_static(b"first"))).encode_into(&mut buf);
        Reply::Bulk(None).encode_into(&mut buf);

        let r1 = decode_reply(&mut buf, DEFAULT_MAX_BULK).unwrap().unwrap();
        let r2 = decode_reply(&mut buf, DEFAULT_MAX_BULK).unwrap().unwrap();
        let r3 = decode_reply(&mut buf, DEFAULT_MAX_BULK).unwrap().unwrap();

        assert_eq!(r1.as_integer(), Some(1));
        assert_eq!(r2.as_bytes().map(|b| b.as_ref()), Some(&b"first"[..]));
        assert!(r3.is_null());
        assert!(buf.is_empty());
    }

    #[test]
    fn test_reply_helpers() {
        assert!(Reply::Status("OK".to_string()).is_ok());
        assert!(!Reply::Status("PONG".to_string()).is_ok());
        assert_eq!(Reply::Bulk(None).kind(), "null bulk");
        assert_eq!(Reply::Integer(0).as_bytes(), None);
    }
}
