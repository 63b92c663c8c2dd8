// https://redis.io/docs/reference/protocol-spec

use std::fmt;
use std::io::Cursor;

use bytes::{Buf, BufMut, Bytes, BytesMut};
use thiserror::Error as ThisError;

use crate::error::{ParseError, ParseErrorKind};

static CRLF: &[u8; 2] = b"\r\n";

/// Longest simple string, error or length line accepted before its CRLF shows up.
pub const MAX_LINE_LEN: usize = 64 * 1024;

/// Default `proto-max-bulk-len` of a Redis server.
pub const DEFAULT_MAX_BULK_LEN: usize = 512 * 1024 * 1024;

pub const DEFAULT_MAX_DEPTH: usize = 128;

#[derive(Debug, ThisError)]
pub enum Error {
    #[error("not enough data is available to parse an entire frame")]
    Incomplete,
    #[error(transparent)]
    Invalid(#[from] ParseError),
}

#[derive(Clone, Debug, PartialEq)]
pub enum Frame {
    Simple(String),
    Error(String),
    Integer(i64),
    Bulk(Bytes),
    /// Both the null bulk string (`$-1`) and the null array (`*-1`).
    Null,
    Array(Vec<Frame>),
}

/// Bounds applied while parsing untrusted input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Limits {
    /// Deepest array nesting accepted, the outermost array being depth 1.
    pub max_depth: usize,
    pub max_bulk_len: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Limits {
            max_depth: DEFAULT_MAX_DEPTH,
            max_bulk_len: DEFAULT_MAX_BULK_LEN,
        }
    }
}

// Protocol specification: https://redis.io/docs/reference/protocol-spec/
impl Frame {
    /// Parses one frame starting at the cursor position. On success the cursor sits right after
    /// the frame. Offsets in errors are relative to the start of the slice.
    pub fn parse(src: &mut Cursor<&[u8]>, limits: &Limits) -> Result<Self, Error> {
        Self::parse_nested(src, limits, 1)
    }

    fn parse_nested(src: &mut Cursor<&[u8]>, limits: &Limits, depth: usize) -> Result<Self, Error> {
        let start = src.position() as usize;

        // The first byte in an RESP-serialized payload always identifies its type.
        // Subsequent bytes constitute the type's contents.
        let first_byte = get_byte(src)?;
        let data_type = DataType::try_from(first_byte)
            .map_err(|kind| ParseError::new(start, kind))?;

        match data_type {
            DataType::SimpleString => {
                let line = get_line(src)?;
                Ok(Frame::Simple(to_string(line, start + 1)?))
            }
            DataType::SimpleError => {
                let line = get_line(src)?;
                Ok(Frame::Error(to_string(line, start + 1)?))
            }
            DataType::Integer => {
                let line = get_line(src)?;
                Ok(Frame::Integer(to_integer(line, start + 1)?))
            }
            // $<length>\r\n<data>\r\n
            DataType::BulkString => {
                let length = to_integer(get_line(src)?, start + 1)?;
                if length == -1 {
                    return Ok(Frame::Null);
                }
                let length = to_length(length, start + 1)?;

                if length > limits.max_bulk_len {
                    let kind = ParseErrorKind::BulkTooLong {
                        len: length,
                        max: limits.max_bulk_len,
                    };
                    return Err(ParseError::new(start, kind).into());
                }

                // Read by length: the payload is binary safe and may itself contain CRLF.
                if src.remaining() < length + CRLF.len() {
                    return Err(Error::Incomplete);
                }

                let data_start = src.position() as usize;
                let data = Bytes::copy_from_slice(&src.get_ref()[data_start..data_start + length]);
                src.advance(length);

                if &src.chunk()[..CRLF.len()] != CRLF {
                    let kind = ParseErrorKind::MissingCrlf;
                    return Err(ParseError::new(data_start + length, kind).into());
                }
                src.advance(CRLF.len());

                Ok(Frame::Bulk(data))
            }
            // *<number-of-elements>\r\n<element-1>...<element-n>
            DataType::Array => {
                if depth > limits.max_depth {
                    let kind = ParseErrorKind::NestingTooDeep(limits.max_depth);
                    return Err(ParseError::new(start, kind).into());
                }

                let length = to_integer(get_line(src)?, start + 1)?;
                if length == -1 {
                    return Ok(Frame::Null);
                }
                let length = to_length(length, start + 1)?;

                // Each element takes at least three bytes, which bounds what a hostile length
                // can make us allocate up front.
                let mut frames = Vec::with_capacity(length.min(src.remaining() / 3));
                for _ in 0..length {
                    let frame = Self::parse_nested(src, limits, depth + 1)?;
                    frames.push(frame);
                }

                Ok(Frame::Array(frames))
            }
        }
    }

    /// Appends the wire representation of the frame to `dst`.
    pub fn write_to(&self, dst: &mut BytesMut) {
        match self {
            Frame::Simple(s) => {
                dst.put_u8(u8::from(DataType::SimpleString));
                dst.extend_from_slice(s.as_bytes());
                dst.extend_from_slice(CRLF);
            }
            Frame::Error(s) => {
                dst.put_u8(u8::from(DataType::SimpleError));
                dst.extend_from_slice(s.as_bytes());
                dst.extend_from_slice(CRLF);
            }
            Frame::Integer(i) => {
                dst.put_u8(u8::from(DataType::Integer));
                dst.extend_from_slice(i.to_string().as_bytes());
                dst.extend_from_slice(CRLF);
            }
            Frame::Bulk(bytes) => {
                write_header(dst, DataType::BulkString, bytes.len());
                dst.extend_from_slice(bytes);
                dst.extend_from_slice(CRLF);
            }
            Frame::Null => dst.extend_from_slice(b"$-1\r\n"),
            Frame::Array(arr) => {
                write_header(dst, DataType::Array, arr.len());
                for frame in arr {
                    frame.write_to(dst);
                }
            }
        }
    }

    pub fn serialize(&self) -> Vec<u8> {
        let mut bytes = BytesMut::new();
        self.write_to(&mut bytes);
        bytes.to_vec()
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Frame::Null)
    }
}

impl From<Frame> for Vec<u8> {
    fn from(frame: Frame) -> Self {
        frame.serialize()
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Frame::Simple(s) => write!(f, "+{}", s),
            Frame::Error(s) => write!(f, "-{}", s),
            Frame::Integer(i) => write!(f, ":{}", i),
            Frame::Bulk(bytes) => write!(f, "${}", String::from_utf8_lossy(bytes)),
            Frame::Null => write!(f, "(nil)"),
            Frame::Array(arr) => {
                write!(f, "[")?;
                for (i, frame) in arr.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", frame)?;
                }
                write!(f, "]")
            }
        }
    }
}

/// Writes `<type><len>\r\n`, the header shared by bulk strings and arrays.
pub(crate) fn write_header(dst: &mut BytesMut, data_type: DataType, len: usize) {
    dst.put_u8(u8::from(data_type));
    dst.extend_from_slice(len.to_string().as_bytes());
    dst.extend_from_slice(CRLF);
}

fn get_line<'a>(src: &mut Cursor<&'a [u8]>) -> Result<&'a [u8], Error> {
    let start = src.position() as usize;
    let buf: &'a [u8] = *src.get_ref();
    let remaining = &buf[start..];

    let line_end = match remaining.windows(2).position(|window| window == CRLF) {
        Some(index) => start + index,
        None if remaining.len() > MAX_LINE_LEN => {
            let kind = ParseErrorKind::LineTooLong(MAX_LINE_LEN);
            return Err(ParseError::new(start, kind).into());
        }
        None => return Err(Error::Incomplete),
    };

    src.set_position((line_end + CRLF.len()) as u64);

    Ok(&buf[start..line_end])
}

fn get_byte(src: &mut Cursor<&[u8]>) -> Result<u8, Error> {
    if !src.has_remaining() {
        return Err(Error::Incomplete);
    }
    Ok(src.get_u8())
}

fn to_string(line: &[u8], offset: usize) -> Result<String, Error> {
    String::from_utf8(line.to_vec())
        .map_err(|_| ParseError::new(offset, ParseErrorKind::InvalidUtf8).into())
}

fn to_integer(line: &[u8], offset: usize) -> Result<i64, Error> {
    std::str::from_utf8(line)
        .ok()
        .and_then(|s| s.parse::<i64>().ok())
        .ok_or_else(|| ParseError::new(offset, ParseErrorKind::InvalidInteger).into())
}

fn to_length(length: i64, offset: usize) -> Result<usize, Error> {
    usize::try_from(length)
        .map_err(|_| ParseError::new(offset, ParseErrorKind::InvalidLength(length)).into())
}

#[derive(Debug)]
pub(crate) enum DataType {
    SimpleString, // '+'
    SimpleError,  // '-'
    Integer,      // ':'
    BulkString,   // '$'
    Array,        // '*'
}

impl TryFrom<u8> for DataType {
    type Error = ParseErrorKind;

    fn try_from(byte: u8) -> Result<Self, Self::Error> {
        match byte {
            b'+' => Ok(Self::SimpleString),
            b'-' => Ok(Self::SimpleError),
            b':' => Ok(Self::Integer),
            b'$' => Ok(Self::BulkString),
            b'*' => Ok(Self::Array),
            _ => Err(ParseErrorKind::InvalidDataType(byte)),
        }
    }
}

impl From<DataType> for u8 {
    fn from(value: DataType) -> Self {
        match value {
            DataType::SimpleString => b'+',
            DataType::SimpleError => b'-',
            DataType::Integer => b':',
            DataType::BulkString => b'$',
            DataType::Array => b'*',
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(data: &[u8]) -> Result<Frame, Error> {
        let mut cursor = Cursor::new(data);
        Frame::parse(&mut cursor, &Limits::default())
    }

    fn parse_error(data: &[u8]) -> ParseError {
        match parse(data) {
            Err(Error::Invalid(err)) => err,
            other => panic!("expected a parse error, got {:?}", other),
        }
    }

    #[test]
    fn parse_simple_string_frame() {
        let frame = parse(b"+OK\r\n");

        assert!(matches!(frame, Ok(Frame::Simple(ref s)) if s == "OK"));
    }

    #[test]
    fn parse_simple_error_frame() {
        let frame = parse(b"-Error message\r\n");

        assert!(matches!(
            frame,
            Ok(Frame::Error(ref s)) if s == "Error message"
        ));
    }

    fn parse_integer_frame(data: &[u8], expected: i64) {
        let frame = parse(data);

        assert!(matches!(frame, Ok(Frame::Integer(i)) if i == expected));
    }

    #[test]
    fn parse_integer_frame_positive() {
        parse_integer_frame(b":1000\r\n", 1000);
    }

    #[test]
    fn parse_integer_frame_negative() {
        parse_integer_frame(b":-1000\r\n", -1000);
    }

    #[test]
    fn parse_integer_frame_zero() {
        parse_integer_frame(b":0\r\n", 0);
    }

    #[test]
    fn parse_integer_frame_positive_singned() {
        parse_integer_frame(b":+1000\r\n", 1000);
    }

    #[test]
    fn parse_bulk_string_frame() {
        let frame = parse(b"$6\r\nfoobar\r\n");

        assert!(matches!(
            frame,
            Ok(Frame::Bulk(ref b)) if b == &Bytes::from("foobar")
        ));
    }

    #[test]
    fn parse_bulk_string_frame_with_crlf_inside() {
        let frame = parse(b"$8\r\nfoo\r\nbar\r\n");

        assert!(matches!(
            frame,
            Ok(Frame::Bulk(ref b)) if b == &Bytes::from("foo\r\nbar")
        ));
    }

    #[test]
    fn parse_bulk_string_frame_empty() {
        let frame = parse(b"$0\r\n\r\n");

        assert!(matches!(
            frame,
            Ok(Frame::Bulk(ref b)) if b == &Bytes::from("")
        ));
    }

    #[test]
    fn parse_bulk_string_frame_null() {
        let frame = parse(b"$-1\r\n");

        assert!(matches!(frame, Ok(Frame::Null)));
    }

    #[test]
    fn parse_array_frame_empty() {
        let frame = parse(b"*0\r\n");

        assert!(matches!(frame, Ok(Frame::Array(ref a)) if a.is_empty()));
    }

    #[test]
    fn parse_array_frame() {
        let frame = parse(b"*2\r\n$5\r\nhello\r\n$5\r\nworld\r\n").unwrap();

        assert_eq!(
            frame,
            Frame::Array(vec![
                Frame::Bulk(Bytes::from("hello")),
                Frame::Bulk(Bytes::from("world")),
            ])
        );
    }

    #[test]
    fn parse_array_frame_nested() {
        let frame = parse(b"*2\r\n*3\r\n:1\r\n:2\r\n:3\r\n*2\r\n+Hello\r\n-World\r\n").unwrap();

        assert_eq!(
            frame,
            Frame::Array(vec![
                Frame::Array(vec![
                    Frame::Integer(1),
                    Frame::Integer(2),
                    Frame::Integer(3)
                ]),
                Frame::Array(vec![
                    Frame::Simple("Hello".to_string()),
                    Frame::Error("World".to_string())
                ]),
            ])
        );
    }

    #[test]
    fn parse_array_frame_null() {
        let frame = parse(b"*-1\r\n");

        assert!(matches!(frame, Ok(Frame::Null)));
    }

    #[test]
    fn parse_array_frame_null_in_the_middle() {
        let frame = parse(b"*3\r\n$5\r\nhello\r\n$-1\r\n$5\r\nworld\r\n").unwrap();

        assert_eq!(
            frame,
            Frame::Array(vec![
                Frame::Bulk(Bytes::from("hello")),
                Frame::Null,
                Frame::Bulk(Bytes::from("world")),
            ])
        );
    }

    #[test]
    fn parse_advances_cursor_past_one_frame() {
        let data = b"+OK\r\n:1\r\n";
        let mut cursor = Cursor::new(&data[..]);

        let frame = Frame::parse(&mut cursor, &Limits::default()).unwrap();

        assert_eq!(frame, Frame::Simple("OK".to_string()));
        assert_eq!(cursor.position(), 5);
    }

    #[test]
    fn parse_incomplete_frames() {
        for data in [
            &b""[..],
            b"+OK",
            b"+OK\r",
            b":12",
            b"$5\r\nhel",
            b"$5\r\nhello",
            b"$5\r\nhello\r",
            b"*2\r\n:1\r\n",
            b"*2\r\n*1\r\n",
        ] {
            assert!(
                matches!(parse(data), Err(Error::Incomplete)),
                "expected incomplete for {:?}",
                data
            );
        }
    }

    #[test]
    fn parse_invalid_data_type() {
        let err = parse_error(b"?oops\r\n");

        assert_eq!(err, ParseError::new(0, ParseErrorKind::InvalidDataType(b'?')));
    }

    #[test]
    fn parse_invalid_data_type_reports_offset_inside_array() {
        let err = parse_error(b"*2\r\n:1\r\n?\r\n");

        assert_eq!(err, ParseError::new(8, ParseErrorKind::InvalidDataType(b'?')));
    }

    #[test]
    fn parse_non_numeric_length() {
        let err = parse_error(b"$abc\r\nfoo\r\n");

        assert_eq!(err.kind, ParseErrorKind::InvalidInteger);
        assert_eq!(err.offset, 1);
    }

    #[test]
    fn parse_negative_length() {
        let err = parse_error(b"*-2\r\n");

        assert_eq!(err.kind, ParseErrorKind::InvalidLength(-2));
    }

    #[test]
    fn parse_bulk_string_missing_crlf() {
        let err = parse_error(b"$3\r\nfooXY");

        assert_eq!(err, ParseError::new(7, ParseErrorKind::MissingCrlf));
    }

    #[test]
    fn parse_bulk_string_too_long() {
        let data = b"$10\r\n0123456789\r\n";
        let limits = Limits {
            max_bulk_len: 4,
            ..Limits::default()
        };
        let mut cursor = Cursor::new(&data[..]);

        let frame = Frame::parse(&mut cursor, &limits);

        assert!(matches!(
            frame,
            Err(Error::Invalid(ParseError {
                kind: ParseErrorKind::BulkTooLong { len: 10, max: 4 },
                ..
            }))
        ));
    }

    #[test]
    fn parse_line_without_crlf_is_bounded() {
        let mut data = vec![b'+'];
        data.extend(std::iter::repeat(b'a').take(MAX_LINE_LEN + 1));

        let err = parse_error(&data);

        assert_eq!(err.kind, ParseErrorKind::LineTooLong(MAX_LINE_LEN));
    }

    #[test]
    fn parse_nesting_limit() {
        let limits = Limits {
            max_depth: 2,
            ..Limits::default()
        };

        let data = b"*1\r\n*1\r\n:1\r\n";
        let mut cursor = Cursor::new(&data[..]);
        assert!(Frame::parse(&mut cursor, &limits).is_ok());

        let data = b"*1\r\n*1\r\n*1\r\n:1\r\n";
        let mut cursor = Cursor::new(&data[..]);
        assert!(matches!(
            Frame::parse(&mut cursor, &limits),
            Err(Error::Invalid(ParseError {
                offset: 8,
                kind: ParseErrorKind::NestingTooDeep(2),
            }))
        ));
    }

    #[test]
    fn parse_hostile_array_length_does_not_preallocate() {
        let frame = parse(b"*9223372036854775807\r\n:1\r\n");

        assert!(matches!(frame, Err(Error::Incomplete)));
    }

    #[test]
    fn serialize_frames() {
        assert_eq!(Frame::Simple("OK".to_string()).serialize(), b"+OK\r\n");
        assert_eq!(Frame::Error("ERR no".to_string()).serialize(), b"-ERR no\r\n");
        assert_eq!(Frame::Integer(-3).serialize(), b":-3\r\n");
        assert_eq!(Frame::Bulk(Bytes::from("hi")).serialize(), b"$2\r\nhi\r\n");
        assert_eq!(Frame::Null.serialize(), b"$-1\r\n");
        assert_eq!(
            Frame::Array(vec![Frame::Integer(1), Frame::Null]).serialize(),
            b"*2\r\n:1\r\n$-1\r\n"
        );
    }
}
