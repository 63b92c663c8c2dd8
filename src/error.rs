use std::io;
use std::time::Duration;

use thiserror::Error as ThisError;

use crate::frame::Frame;

/// Every failure a caller of this crate can observe.
#[derive(Debug, ThisError)]
pub enum Error {
    #[error(transparent)]
    Encoding(#[from] EncodingError),
    /// The server sent bytes that do not form a valid RESP frame. The stream that produced
    /// this error is torn down.
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Connect(#[from] ConnectError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    /// The connection or client was closed by its owner.
    #[error("connection closed")]
    Closed,
    /// The transport died while the request was pending, or before it could be sent.
    #[error("connection lost")]
    ConnectionLost,
    /// The caller stopped waiting. The command may still run on the server.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
    /// The server answered with an error reply.
    #[error("server error: {0}")]
    Server(String),
    #[error("unexpected reply, expected {expected}, got {actual}")]
    UnexpectedReply { expected: &'static str, actual: Frame },
}

impl Error {
    /// Whether the client may recover from this error by reconnecting.
    pub fn is_connection_error(&self) -> bool {
        matches!(self, Error::ConnectionLost | Error::Connect(_))
    }
}

/// A malformed byte stream, with the offset of the offending byte from the start of the frame
/// being decoded.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
#[error("protocol error at byte {offset}: {kind}")]
pub struct ParseError {
    pub offset: usize,
    pub kind: ParseErrorKind,
}

impl ParseError {
    pub fn new(offset: usize, kind: ParseErrorKind) -> ParseError {
        ParseError { offset, kind }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum ParseErrorKind {
    #[error("invalid frame data type: {0:#04x}")]
    InvalidDataType(u8),
    #[error("invalid integer")]
    InvalidInteger,
    #[error("invalid length {0}")]
    InvalidLength(i64),
    #[error("missing CRLF terminator")]
    MissingCrlf,
    #[error("invalid UTF-8 string")]
    InvalidUtf8,
    #[error("line exceeds {0} bytes without a CRLF terminator")]
    LineTooLong(usize),
    #[error("bulk string of {len} bytes exceeds {max} byte limit")]
    BulkTooLong { len: usize, max: usize },
    #[error("nesting exceeds the maximum depth of {0}")]
    NestingTooDeep(usize),
    #[error("reply received with no request pending")]
    UnsolicitedReply,
}

#[derive(Debug, PartialEq, Eq, ThisError)]
pub enum EncodingError {
    #[error("command has no arguments")]
    Empty,
    #[error("argument {index} is {len} bytes, exceeding the {max} byte limit")]
    ArgumentTooLong { index: usize, len: usize, max: usize },
}

#[derive(Debug, ThisError)]
pub enum ConnectError {
    #[error("connect timed out after {0:?}")]
    TimedOut(Duration),
    #[error("connection refused: {0}")]
    Refused(#[source] io::Error),
    #[error("authentication failed: {0}")]
    AuthFailed(String),
    #[error("{command} failed during handshake: {reason}")]
    Handshake {
        command: &'static str,
        reason: String,
    },
    #[error("invalid server name for TLS: {0}")]
    InvalidServerName(String),
    #[error(transparent)]
    Protocol(#[from] ParseError),
    #[error("transport error: {0}")]
    Transport(#[source] io::Error),
}

impl From<io::Error> for ConnectError {
    fn from(err: io::Error) -> ConnectError {
        match err.kind() {
            io::ErrorKind::ConnectionRefused => ConnectError::Refused(err),
            _ => ConnectError::Transport(err),
        }
    }
}

// Failures of the handshake round trips, which run over an established connection.
impl From<Error> for ConnectError {
    fn from(err: Error) -> ConnectError {
        match err {
            Error::Io(err) => ConnectError::Transport(err),
            Error::Parse(err) => ConnectError::Protocol(err),
            Error::Connect(err) => err,
            Error::Closed | Error::ConnectionLost => ConnectError::Transport(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "connection closed during handshake",
            )),
            err => ConnectError::Transport(io::Error::other(err.to_string())),
        }
    }
}

#[derive(Debug, PartialEq, Eq, ThisError)]
pub enum ConfigError {
    #[error("host must not be empty")]
    EmptyHost,
    #[error("port must not be 0")]
    InvalidPort,
    #[error("TLS is not supported over a Unix domain socket")]
    TlsOverUnixSocket,
    #[error("a username requires a password")]
    UsernameWithoutPassword,
    #[error("database index must not be negative, got {0}")]
    NegativeDatabase(i64),
    #[error("{0} must be greater than zero")]
    ZeroLimit(&'static str),
    #[error("cannot authenticate immediately without a password")]
    AuthWithoutPassword,
}
