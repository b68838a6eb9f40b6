use atoi::FromRadix10SignedChecked;
use bytes::{Buf, BufMut, Bytes, BytesMut};
use std::io::Cursor;

const STRING: u8 = b'+';
const ERROR: u8 = b'-';
const INTEGER: u8 = b':';
const BULK: u8 = b'$';
const ARRAY: u8 = b'*';

/// Largest bulk string payload accepted.
pub const MAX_BULK_LEN: usize = 16 * 1024 * 1024;
/// Most elements accepted in one array.
pub const MAX_ARRAY_LEN: usize = 1024;
/// Longest header, simple string or inline command line, CRLF excluded.
pub const MAX_LINE_LEN: usize = 64 * 1024;
/// Arrays nested deeper than this are rejected.
pub const MAX_DEPTH: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RESPType {
    String(String),
    Error(String),
    Integer(i64),
    Bulk(Bytes),
    Array(Vec<RESPType>),
    Null,
}

pub struct RESPParser {}

// public functions
impl RESPParser {
    /// Parses one frame from the front of `src`.
    ///
    /// Returns `Ok(None)` when `src` does not yet hold a whole frame; the
    /// cursor position is meaningless in that case and the caller should
    /// retry from the start once more bytes arrived. On success the cursor
    /// sits right after the frame.
    ///
    /// A line that does not start with a type marker is read as an inline
    /// command (terminated by LF or CRLF) and comes back as an array of bulk
    /// strings.
    ///
    /// Frames breaking [`MAX_BULK_LEN`], [`MAX_ARRAY_LEN`], [`MAX_LINE_LEN`]
    /// or [`MAX_DEPTH`] are errors, even when still incomplete.
    pub fn parse(src: &mut Cursor<&[u8]>) -> crate::Result<Option<RESPType>> {
        Self::parse_frame(src, 0)
    }
}

// private helper functions
impl RESPParser {
    /// Everything up to the next CRLF, advancing past it.
    fn get_line<'a>(src: &mut Cursor<&'a [u8]>) -> crate::Result<Option<&'a [u8]>> {
        let buf: &'a [u8] = *src.get_ref();
        let start = src.position() as usize;
        let rest = &buf[start..];
        let scan = &rest[..rest.len().min(MAX_LINE_LEN + 2)];

        match scan.windows(2).position(|w| w == b"\r\n") {
            Some(len) => {
                src.set_position((start + len + 2) as u64);
                Ok(Some(&rest[..len]))
            }
            None if rest.len() >= MAX_LINE_LEN + 2 => Err("line too long".into()),
            None => Ok(None),
        }
    }

    /// Like `get_line` but a bare LF also ends the line.
    fn get_inline_line<'a>(src: &mut Cursor<&'a [u8]>) -> crate::Result<Option<&'a [u8]>> {
        let buf: &'a [u8] = *src.get_ref();
        let start = src.position() as usize;
        let rest = &buf[start..];
        let scan = &rest[..rest.len().min(MAX_LINE_LEN + 2)];

        match scan.iter().position(|&c| c == b'\n') {
            Some(end) => {
                let line = &rest[..end];
                let line = line.strip_suffix(&b"\r"[..]).unwrap_or(line);
                if line.len() > MAX_LINE_LEN {
                    return Err("inline command too long".into());
                }
                src.set_position((start + end + 1) as u64);
                Ok(Some(line))
            }
            None if rest.len() >= MAX_LINE_LEN + 2 => Err("inline command too long".into()),
            None => Ok(None),
        }
    }

    /// Reads a length header, `-1` meaning null.
    fn get_len(src: &mut Cursor<&[u8]>, max: usize) -> crate::Result<Option<Option<usize>>> {
        let len = match Self::get_line(src)? {
            None => return Ok(None),
            Some(line) => Self::parse_integer(line)?,
        };
        if len == -1 {
            return Ok(Some(None));
        }
        match usize::try_from(len) {
            Ok(len) if len <= max => Ok(Some(Some(len))),
            Ok(len) => Err(format!("length {} exceeds limit of {}", len, max).into()),
            Err(_) => Err(format!("invalid length {}", len).into()),
        }
    }
}

// private parsing functions
impl RESPParser {
    fn parse_frame(src: &mut Cursor<&[u8]>, depth: usize) -> crate::Result<Option<RESPType>> {
        if !src.has_remaining() {
            return Ok(None);
        }

        match src.get_u8() {
            STRING => match Self::get_line(src)? {
                None => Ok(None),
                Some(line) => Ok(Some(RESPType::String(Self::parse_simple(line)?))),
            },
            ERROR => match Self::get_line(src)? {
                None => Ok(None),
                Some(line) => Ok(Some(RESPType::Error(Self::parse_simple(line)?))),
            },
            INTEGER => match Self::get_line(src)? {
                None => Ok(None),
                Some(line) => Ok(Some(RESPType::Integer(Self::parse_integer(line)?))),
            },
            BULK => Self::parse_bulk(src),
            ARRAY => Self::parse_array(src, depth),
            _ => {
                src.set_position(src.position() - 1);
                Self::parse_inline(src)
            }
        }
    }

    fn parse_simple(line: &[u8]) -> crate::Result<String> {
        if line.iter().any(|&c| c == b'\r' || c == b'\n') {
            return Err("CR or LF not allowed in simple strings and errors".into());
        }
        Ok(String::from_utf8(line.to_vec())?)
    }

    fn parse_integer(line: &[u8]) -> crate::Result<i64> {
        let (value, used) = i64::from_radix_10_signed_checked(line);
        match value {
            Some(n) if used == line.len() && line.iter().any(u8::is_ascii_digit) => Ok(n),
            _ => Err(format!("invalid integer {:?}", String::from_utf8_lossy(line)).into()),
        }
    }

    fn parse_bulk(src: &mut Cursor<&[u8]>) -> crate::Result<Option<RESPType>> {
        let len = match Self::get_len(src, MAX_BULK_LEN)? {
            None => return Ok(None),
            Some(None) => return Ok(Some(RESPType::Null)),
            Some(Some(len)) => len,
        };

        if src.remaining() < len + 2 {
            return Ok(None);
        }
        let start = src.position() as usize;
        let data = Bytes::copy_from_slice(&src.get_ref()[start..start + len]);
        src.advance(len);

        if src.get_u8() != b'\r' || src.get_u8() != b'\n' {
            return Err("bulk string not terminated by CRLF".into());
        }
        Ok(Some(RESPType::Bulk(data)))
    }

    fn parse_array(src: &mut Cursor<&[u8]>, depth: usize) -> crate::Result<Option<RESPType>> {
        if depth >= MAX_DEPTH {
            return Err("nested arrays too deep".into());
        }
        let len = match Self::get_len(src, MAX_ARRAY_LEN)? {
            None => return Ok(None),
            Some(None) => return Ok(Some(RESPType::Null)),
            Some(Some(len)) => len,
        };

        let mut result = Vec::with_capacity(len);
        for _ in 0..len {
            match Self::parse_frame(src, depth + 1)? {
                None => return Ok(None),
                Some(val) => result.push(val),
            }
        }
        Ok(Some(RESPType::Array(result)))
    }

    fn parse_inline(src: &mut Cursor<&[u8]>) -> crate::Result<Option<RESPType>> {
        let line = match Self::get_inline_line(src)? {
            None => return Ok(None),
            Some(line) => std::str::from_utf8(line)?,
        };
        let args = line
            .split_whitespace()
            .map(|arg| RESPType::Bulk(Bytes::copy_from_slice(arg.as_bytes())))
            .collect();
        Ok(Some(RESPType::Array(args)))
    }
}

pub struct RESPSerializer {}

// public functions
impl RESPSerializer {
    pub fn serialize(msg: &RESPType) -> crate::Result<Bytes> {
        let mut dst = BytesMut::new();
        Self::write(msg, &mut dst)?;
        Ok(dst.freeze())
    }
}

// private serialization functions
impl RESPSerializer {
    fn write(msg: &RESPType, dst: &mut BytesMut) -> crate::Result<()> {
        match msg {
            RESPType::String(s) => Self::write_simple(STRING, s, dst)?,
            RESPType::Error(s) => Self::write_simple(ERROR, s, dst)?,
            RESPType::Integer(n) => {
                dst.put_u8(INTEGER);
                dst.put_slice(n.to_string().as_bytes());
                dst.put_slice(b"\r\n");
            }
            RESPType::Bulk(b) => {
                dst.put_u8(BULK);
                dst.put_slice(b.len().to_string().as_bytes());
                dst.put_slice(b"\r\n");
                dst.put_slice(b);
                dst.put_slice(b"\r\n");
            }
            RESPType::Array(arr) => {
                dst.put_u8(ARRAY);
                dst.put_slice(arr.len().to_string().as_bytes());
                dst.put_slice(b"\r\n");
                for item in arr {
                    Self::write(item, dst)?;
                }
            }
            RESPType::Null => dst.put_slice(b"$-1\r\n"),
        }
        Ok(())
    }

    fn write_simple(marker: u8, s: &str, dst: &mut BytesMut) -> crate::Result<()> {
        if s.bytes().any(|c| c == b'\r' || c == b'\n') {
            return Err("CR or LF is not allowed in strings and errors".into());
        }
        dst.put_u8(marker);
        dst.put_slice(s.as_bytes());
        dst.put_slice(b"\r\n");
        Ok(())
    }
}

// unit tests
#[cfg(test)]
mod tests {
    use super::*;

    fn parse(src: &str) -> crate::Result<Option<RESPType>> {
        RESPParser::parse(&mut Cursor::new(src.as_bytes()))
    }

    fn bulks(items: &[&str]) -> RESPType {
        RESPType::Array(
            items
                .iter()
                .map(|s| RESPType::Bulk(Bytes::copy_from_slice(s.as_bytes())))
                .collect(),
        )
    }

    #[test]
    fn test_parse_string() {
        assert!(matches!(
            parse("+OK\r\n"),
            Ok(Some(RESPType::String(ref s))) if s == "OK"
        ));
        assert!(matches!(parse("+hello\rworld\r\n"), Err(_)));
        assert!(matches!(parse("+hello\nworld\r\n"), Err(_)));
        assert!(matches!(parse("+hello world\r"), Ok(None)));
    }

    #[test]
    fn test_parse_error() {
        assert!(matches!(
            parse("-ERR wrong number of arguments for 'get' command\r\n"),
            Ok(Some(RESPType::Error(ref s))) if s == "ERR wrong number of arguments for 'get' command"
        ));
        assert!(matches!(parse("-ERR\nbad\r\n"), Err(_)));
    }

    #[test]
    fn test_parse_integer() {
        assert!(matches!(parse(":123\r\n"), Ok(Some(RESPType::Integer(123)))));
        assert!(matches!(parse(":+123\r\n"), Ok(Some(RESPType::Integer(123)))));
        assert!(matches!(parse(":-123\r\n"), Ok(Some(RESPType::Integer(-123)))));
        assert!(matches!(parse(":1a23\r\n"), Err(_)));
        assert!(matches!(parse(":\r\n"), Err(_)));
    }

    #[test]
    fn test_parse_bulk() {
        assert!(matches!(parse("$-1\r\n"), Ok(Some(RESPType::Null))));
        assert!(matches!(
            parse("$3\r\nbar\r\n"),
            Ok(Some(RESPType::Bulk(ref b))) if b[..] == b"bar"[..]
        ));
        assert!(matches!(
            parse("$0\r\n\r\n"),
            Ok(Some(RESPType::Bulk(ref b))) if b.is_empty()
        ));
        assert!(matches!(
            parse("$12\r\nhello\r\nworld\r\n"),
            Ok(Some(RESPType::Bulk(ref b))) if b[..] == b"hello\r\nworld"[..]
        ));
        assert!(matches!(parse("$3\r\nba"), Ok(None)));
        assert!(matches!(parse("$3\r\nbar\r"), Ok(None)));
        assert!(matches!(parse("$3\r\nbarxx"), Err(_)));
        assert!(matches!(parse("$-5\r\n"), Err(_)));
    }

    #[test]
    fn test_parse_array() {
        assert_eq!(
            parse("*2\r\n$3\r\nget\r\n$3\r\nfoo\r\n").unwrap(),
            Some(bulks(&["get", "foo"]))
        );
        assert_eq!(parse("*0\r\n").unwrap(), Some(RESPType::Array(vec![])));
        assert!(matches!(parse("*-1\r\n"), Ok(Some(RESPType::Null))));
        assert!(matches!(parse("*2\r\n$3\r\nget\r\n$3\r\nfoo"), Ok(None)));
        assert!(matches!(parse("*2\r\n$3\r\nget\r\n"), Ok(None)));
    }

    #[test]
    fn test_parse_inline() {
        assert_eq!(parse("SET foo bar\r\n").unwrap(), Some(bulks(&["SET", "foo", "bar"])));
        assert_eq!(parse("\r\n").unwrap(), Some(RESPType::Array(vec![])));
        assert!(matches!(parse("GET foo"), Ok(None)));
        assert_eq!(parse("GET foo\n").unwrap(), Some(bulks(&["GET", "foo"])));
        assert_eq!(parse("get  foo \r\n").unwrap(), Some(bulks(&["get", "foo"])));
    }

    #[test]
    fn test_parse_inline_bare_lf_advances_cursor() {
        let input = b"SET a 1\nGET a\n";
        let mut cursor = Cursor::new(&input[..]);
        assert_eq!(
            RESPParser::parse(&mut cursor).unwrap(),
            Some(bulks(&["SET", "a", "1"]))
        );
        assert_eq!(cursor.position(), 8);
        assert_eq!(
            RESPParser::parse(&mut cursor).unwrap(),
            Some(bulks(&["GET", "a"]))
        );
    }

    #[test]
    fn test_nesting_limit() {
        let within = format!("{}$1\r\nx\r\n", "*1\r\n".repeat(MAX_DEPTH));
        assert!(matches!(parse(&within), Ok(Some(RESPType::Array(_)))));

        let beyond = format!("{}$1\r\nx\r\n", "*1\r\n".repeat(MAX_DEPTH + 1));
        assert!(matches!(parse(&beyond), Err(_)));

        // rejected without waiting for the rest of the frame
        assert!(matches!(parse(&"*1\r\n".repeat(200_000)), Err(_)));
    }

    #[test]
    fn test_bulk_length_limit() {
        assert!(matches!(parse("$9223372036854775807\r\n"), Err(_)));
        assert!(matches!(parse(&format!("${}\r\n", MAX_BULK_LEN + 1)), Err(_)));
        assert!(matches!(parse(&format!("${}\r\n", MAX_BULK_LEN)), Ok(None)));
    }

    #[test]
    fn test_array_length_limit() {
        assert!(matches!(parse(&format!("*{}\r\n", MAX_ARRAY_LEN + 1)), Err(_)));
        assert!(matches!(parse(&format!("*{}\r\n", MAX_ARRAY_LEN)), Ok(None)));
        assert!(matches!(parse("*9223372036854775807\r\n"), Err(_)));
    }

    #[test]
    fn test_line_length_limit() {
        let long = "a".repeat(MAX_LINE_LEN + 2);
        assert!(matches!(parse(&long), Err(_)));
        assert!(matches!(parse(&format!("+{}", long)), Err(_)));
        assert!(matches!(parse(&format!("${}", "1".repeat(MAX_LINE_LEN + 2))), Err(_)));
        assert!(matches!(parse(&format!("{}\n", "a".repeat(MAX_LINE_LEN + 1))), Err(_)));

        let fits = "a".repeat(MAX_LINE_LEN);
        assert!(matches!(parse(&fits), Ok(None)));
        assert_eq!(parse(&format!("{}\r\n", fits)).unwrap(), Some(bulks(&[fits.as_str()])));
    }

    #[test]
    fn test_parse_leaves_trailing_bytes() {
        let input = b"+OK\r\n$3\r\nbar\r\n";
        let mut cursor = Cursor::new(&input[..]);
        assert_eq!(
            RESPParser::parse(&mut cursor).unwrap(),
            Some(RESPType::String("OK".to_string()))
        );
        assert_eq!(cursor.position(), 5);
        assert_eq!(
            RESPParser::parse(&mut cursor).unwrap(),
            Some(RESPType::Bulk(Bytes::from("bar")))
        );
        assert!(!cursor.has_remaining());
    }

    #[test]
    fn test_serialize_replies() {
        assert_eq!(
            RESPSerializer::serialize(&RESPType::String("OK".to_string())).unwrap(),
            Bytes::from("+OK\r\n")
        );
        assert_eq!(
            RESPSerializer::serialize(&RESPType::Error("ERR something wrong".to_string())).unwrap(),
            Bytes::from("-ERR something wrong\r\n")
        );
        assert_eq!(
            RESPSerializer::serialize(&RESPType::Integer(-123)).unwrap(),
            Bytes::from(":-123\r\n")
        );
        assert_eq!(
            RESPSerializer::serialize(&RESPType::Bulk(Bytes::from("a\r\nb"))).unwrap(),
            Bytes::from("$4\r\na\r\nb\r\n")
        );
        assert_eq!(
            RESPSerializer::serialize(&RESPType::Bulk(Bytes::new())).unwrap(),
            Bytes::from("$0\r\n\r\n")
        );
        assert_eq!(
            RESPSerializer::serialize(&RESPType::Null).unwrap(),
            Bytes::from("$-1\r\n")
        );
    }

    #[test]
    fn test_serialize_rejects_crlf_in_simple() {
        assert!(RESPSerializer::serialize(&RESPType::String("a\rb".to_string())).is_err());
        assert!(RESPSerializer::serialize(&RESPType::Error("a\nb".to_string())).is_err());
        assert!(RESPSerializer::serialize(&RESPType::Array(vec![
            RESPType::Bulk(Bytes::from("ok")),
            RESPType::String("a\r\nb".to_string()),
        ]))
        .is_err());
    }

    #[test]
    fn test_serialize_request() {
        let bytes = RESPSerializer::serialize(&bulks(&["set", "foo", "bar"])).unwrap();
        assert_eq!(bytes, Bytes::from("*3\r\n$3\r\nset\r\n$3\r\nfoo\r\n$3\r\nbar\r\n"));
        let mut cursor = Cursor::new(&bytes[..]);
        assert_eq!(
            RESPParser::parse(&mut cursor).unwrap(),
            Some(bulks(&["set", "foo", "bar"]))
        );
    }
}
