use std::io::Cursor;

use bytes::{Buf, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::command::Command;
use crate::error::{EncodingError, ParseError};
use crate::frame::{self, DataType, Frame, Limits};
use crate::Error;

/// RESP codec: commands go out as arrays of bulk strings, any frame comes back in.
#[derive(Clone, Copy, Debug, Default)]
pub struct RespCodec {
    limits: Limits,
}

impl RespCodec {
    pub fn new(limits: Limits) -> RespCodec {
        RespCodec { limits }
    }

    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    /// Appends `*<argc>\r\n` followed by `$<len>\r\n<arg>\r\n` for every argument. Nothing is
    /// written when the command is rejected.
    pub fn encode_command(&self, command: &Command, dst: &mut BytesMut) -> Result<(), EncodingError> {
        let args = command.args();
        if args.is_empty() {
            return Err(EncodingError::Empty);
        }

        let max = self.limits.max_bulk_len;
        if let Some((index, arg)) = args.iter().enumerate().find(|(_, arg)| arg.len() > max) {
            return Err(EncodingError::ArgumentTooLong {
                index,
                len: arg.len(),
                max,
            });
        }

        let size: usize = args.iter().map(|arg| arg.len() + 16).sum();
        dst.reserve(size + 16);

        frame::write_header(dst, DataType::Array, args.len());
        for arg in args {
            frame::write_header(dst, DataType::BulkString, arg.len());
            dst.extend_from_slice(arg);
            dst.extend_from_slice(b"\r\n");
        }

        Ok(())
    }

    /// Tries to parse one frame from the front of `src` without consuming it.
    ///
    /// Returns the frame and the number of bytes it spans, or `None` when `src` does not hold a
    /// complete frame yet, in which case the caller reads more and retries.
    pub fn decode_frame(&self, src: &[u8]) -> Result<Option<(Frame, usize)>, ParseError> {
        let mut cursor = Cursor::new(src);
        match Frame::parse(&mut cursor, &self.limits) {
            Ok(frame) => Ok(Some((frame, cursor.position() as usize))),
            Err(frame::Error::Incomplete) => Ok(None), // Not enough data to parse a frame.
            Err(frame::Error::Invalid(err)) => Err(err),
        }
    }
}

impl Decoder for RespCodec {
    type Item = Frame;
    type Error = Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        match self.decode_frame(&src[..])? {
            Some((frame, consumed)) => {
                // Remove the parsed frame from the buffer.
                src.advance(consumed);
                Ok(Some(frame))
            }
            None => Ok(None),
        }
    }
}

impl Encoder<&Command> for RespCodec {
    type Error = Error;

    fn encode(&mut self, command: &Command, dst: &mut BytesMut) -> Result<(), Self::Error> {
        Ok(self.encode_command(command, dst)?)
    }
}

impl Encoder<Frame> for RespCodec {
    type Error = Error;

    fn encode(&mut self, frame: Frame, dst: &mut BytesMut) -> Result<(), Self::Error> {
        frame.write_to(dst);
        Ok(())
    }
}

/// Encodes `command` with the default limits.
pub fn encode(command: &Command) -> Result<BytesMut, EncodingError> {
    let mut dst = BytesMut::new();
    RespCodec::default().encode_command(command, &mut dst)?;
    Ok(dst)
}

/// Decodes one frame from the front of `src` with the default limits.
pub fn decode(src: &[u8]) -> Result<Option<(Frame, usize)>, ParseError> {
    RespCodec::default().decode_frame(src)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ParseErrorKind;
    use bytes::Bytes;
    use rand::Rng;

    #[test]
    fn encode_set_command() {
        let command = Command::new("SET").arg("a").arg("1");

        let bytes = encode(&command).unwrap();

        assert_eq!(&bytes[..], b"*3\r\n$3\r\nSET\r\n$1\r\na\r\n$1\r\n1\r\n");
    }

    #[test]
    fn encode_binary_argument() {
        let command = Command::new("SET").arg("k").arg(&b"\x00\r\n\xff"[..]);

        let bytes = encode(&command).unwrap();

        assert_eq!(&bytes[..], b"*3\r\n$3\r\nSET\r\n$1\r\nk\r\n$4\r\n\x00\r\n\xff\r\n");
    }

    #[test]
    fn encode_empty_command() {
        let command = Command::from_args(Vec::<Bytes>::new());

        assert_eq!(encode(&command), Err(EncodingError::Empty));
    }

    #[test]
    fn encode_argument_too_long_leaves_buffer_untouched() {
        let codec = RespCodec::new(Limits {
            max_bulk_len: 3,
            ..Limits::default()
        });
        let command = Command::new("SET").arg("key").arg("value");
        let mut dst = BytesMut::from(&b"+prefix"[..]);

        let result = codec.encode_command(&command, &mut dst);

        assert_eq!(
            result,
            Err(EncodingError::ArgumentTooLong {
                index: 2,
                len: 5,
                max: 3
            })
        );
        assert_eq!(&dst[..], b"+prefix");
    }

    #[test]
    fn decode_simple_string_reports_consumed_bytes() {
        let decoded = decode(b"+OK\r\n").unwrap();

        assert_eq!(decoded, Some((Frame::Simple("OK".to_string()), 5)));
    }

    #[test]
    fn decode_does_not_consume_trailing_bytes() {
        let decoded = decode(b":1\r\n:2\r\n").unwrap();

        assert_eq!(decoded, Some((Frame::Integer(1), 4)));
    }

    #[test]
    fn decode_null_is_distinct_from_empty() {
        assert_eq!(decode(b"$-1\r\n").unwrap(), Some((Frame::Null, 5)));
        assert_eq!(decode(b"*-1\r\n").unwrap(), Some((Frame::Null, 5)));
        assert_eq!(
            decode(b"$0\r\n\r\n").unwrap(),
            Some((Frame::Bulk(Bytes::new()), 6))
        );
        assert_eq!(decode(b"*0\r\n").unwrap(), Some((Frame::Array(vec![]), 4)));
    }

    #[test]
    fn decode_malformed_input() {
        let err = decode(b"!oops\r\n").unwrap_err();

        assert_eq!(err.kind, ParseErrorKind::InvalidDataType(b'!'));
        assert_eq!(err.offset, 0);
    }

    #[test]
    fn decode_deep_nesting_is_rejected_without_overflowing() {
        let mut data = Vec::new();
        for _ in 0..100_000 {
            data.extend_from_slice(b"*1\r\n");
        }
        data.extend_from_slice(b":1\r\n");

        let err = decode(&data).unwrap_err();

        assert_eq!(err.kind, ParseErrorKind::NestingTooDeep(frame::DEFAULT_MAX_DEPTH));
    }

    #[test]
    fn command_round_trips_as_array_frame() {
        let command = Command::new("MSET")
            .arg("key:1")
            .arg("")
            .arg(&b"bin\r\nary"[..])
            .arg(42);

        let bytes = encode(&command).unwrap();
        let (frame, consumed) = decode(&bytes).unwrap().unwrap();

        assert_eq!(consumed, bytes.len());
        assert_eq!(
            frame,
            Frame::Array(command.args().iter().cloned().map(Frame::Bulk).collect())
        );
    }

    #[test]
    fn decoder_yields_frames_one_byte_at_a_time() {
        let stream = b"+OK\r\n$5\r\nhello\r\n*2\r\n:1\r\n$-1\r\n-ERR bad\r\n";
        let mut codec = RespCodec::default();
        let mut buffer = BytesMut::new();
        let mut frames = vec![];

        for byte in stream {
            buffer.extend_from_slice(&[*byte]);
            while let Some(frame) = codec.decode(&mut buffer).unwrap() {
                frames.push(frame);
            }
        }

        assert!(buffer.is_empty());
        assert_eq!(
            frames,
            vec![
                Frame::Simple("OK".to_string()),
                Frame::Bulk(Bytes::from("hello")),
                Frame::Array(vec![Frame::Integer(1), Frame::Null]),
                Frame::Error("ERR bad".to_string()),
            ]
        );
    }

    #[test]
    fn decoder_handles_random_chunking() {
        let mut stream = BytesMut::new();
        let mut expected = vec![];
        for i in 0..50 {
            let frame = Frame::Array(vec![
                Frame::Bulk(Bytes::from(format!("value-{}\r\n", i))),
                Frame::Integer(i),
                Frame::Array(vec![Frame::Simple("nested".to_string()), Frame::Null]),
            ]);
            frame.write_to(&mut stream);
            expected.push(frame);
        }

        let mut rng = rand::thread_rng();
        let mut codec = RespCodec::default();
        let mut buffer = BytesMut::new();
        let mut frames = vec![];
        let mut rest = &stream[..];

        while !rest.is_empty() {
            let n = rng.gen_range(1..=rest.len().min(17));
            buffer.extend_from_slice(&rest[..n]);
            rest = &rest[n..];
            while let Some(frame) = codec.decode(&mut buffer).unwrap() {
                frames.push(frame);
            }
        }

        assert_eq!(frames, expected);
    }
}
