pub mod append;
pub mod auth;
pub mod client;
pub mod dbsize;
pub mod decr;
pub mod decrby;
pub mod del;
pub mod echo;
pub mod eval;
pub mod executable;
pub mod exists;
pub mod expire;
pub mod get;
pub mod getdel;
pub mod incr;
pub mod incrby;
pub mod info;
pub mod mget;
pub mod mset;
pub mod ping;
pub mod pttl;
pub mod script;
pub mod select;
pub mod set;
pub mod stream;
pub mod strlen;
pub mod ttl;
pub mod xack;
pub mod xadd;
pub mod xclaim;
pub mod xgroup;
pub mod xlen;
pub mod xpending;
pub mod xrange;
pub mod xread;
pub mod xreadgroup;

use std::time::Duration;

use bytes::Bytes;

use crate::frame::Frame;
use crate::Error;

pub use append::Append;
pub use auth::Auth;
pub use client::ClientSetName;
pub use dbsize::DBSize;
pub use decr::Decr;
pub use decrby::DecrBy;
pub use del::Del;
pub use echo::Echo;
pub use eval::{Eval, EvalSha};
pub use executable::Executable;
pub use exists::Exists;
pub use expire::{Expire, ExpireCondition};
pub use get::Get;
pub use getdel::Getdel;
pub use incr::Incr;
pub use incrby::IncrBy;
pub use info::Info;
pub use mget::Mget;
pub use mset::Mset;
pub use ping::Ping;
pub use pttl::Pttl;
pub use script::Script;
pub use select::Select;
pub use set::{Expiry, Set, SetCondition};
pub use stream::{
    PendingEntry, PendingSummary, StreamClaimOptions, StreamEntry, StreamGroupOptions,
    StreamPendingOptions, StreamRangeBound, StreamRead, StreamReadGroupOptions, StreamReadOptions,
    StreamTrim, TrimStrategy,
};
pub use strlen::Strlen;
pub use ttl::Ttl;
pub use xack::Xack;
pub use xadd::Xadd;
pub use xclaim::Xclaim;
pub use xgroup::XgroupCreate;
pub use xlen::Xlen;
pub use xpending::{Xpending, XpendingRange};
pub use xrange::Xrange;
pub use xread::Xread;
pub use xreadgroup::Xreadgroup;

// Reply conversions shared by the typed commands. An error reply always becomes
// `Error::Server`, whatever shape was expected.

pub(crate) fn expect_ok(frame: Frame) -> Result<(), Error> {
    match frame {
        Frame::Simple(s) if s == "OK" => Ok(()),
        frame => Err(unexpected("OK", frame)),
    }
}

pub(crate) fn integer(frame: Frame) -> Result<i64, Error> {
    match frame {
        Frame::Integer(i) => Ok(i),
        frame => Err(unexpected("integer", frame)),
    }
}

pub(crate) fn boolean(frame: Frame) -> Result<bool, Error> {
    match integer(frame)? {
        0 => Ok(false),
        1 => Ok(true),
        i => Err(unexpected("0 or 1", Frame::Integer(i))),
    }
}

pub(crate) fn bytes(frame: Frame) -> Result<Bytes, Error> {
    match frame {
        // Both `Simple` and `Bulk` representation may carry a value.
        Frame::Bulk(bytes) => Ok(bytes),
        Frame::Simple(s) => Ok(Bytes::from(s)),
        frame => Err(unexpected("simple or bulk string", frame)),
    }
}

pub(crate) fn optional_bytes(frame: Frame) -> Result<Option<Bytes>, Error> {
    match frame {
        Frame::Null => Ok(None),
        frame => bytes(frame).map(Some),
    }
}

pub(crate) fn string(frame: Frame) -> Result<String, Error> {
    let bytes = bytes(frame)?;
    String::from_utf8(bytes.to_vec())
        .map_err(|e| unexpected("UTF-8 string", Frame::Bulk(Bytes::from(e.into_bytes()))))
}

pub(crate) fn array(frame: Frame) -> Result<Vec<Frame>, Error> {
    match frame {
        Frame::Array(frames) => Ok(frames),
        frame => Err(unexpected("array", frame)),
    }
}

// Time arguments round up, so a sub-unit duration never turns into `0`, which the server
// reads as "already expired" or "block forever".

pub(crate) fn ceil_secs(duration: Duration) -> u64 {
    let secs = duration.as_secs();
    if duration.subsec_nanos() > 0 {
        secs.saturating_add(1)
    } else {
        secs
    }
}

pub(crate) fn ceil_millis(duration: Duration) -> u64 {
    let millis = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
    if duration.subsec_nanos() % 1_000_000 > 0 {
        millis.saturating_add(1)
    } else {
        millis
    }
}

fn unexpected(expected: &'static str, actual: Frame) -> Error {
    match actual {
        Frame::Error(msg) => Error::Server(msg),
        actual => Error::UnexpectedReply { expected, actual },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_reply_becomes_server_error() {
        let err = integer(Frame::Error("WRONGTYPE Operation".to_string())).unwrap_err();

        assert!(matches!(err, Error::Server(ref msg) if msg == "WRONGTYPE Operation"));
    }

    #[test]
    fn mismatched_reply_is_unexpected() {
        let err = expect_ok(Frame::Integer(1)).unwrap_err();

        assert!(matches!(
            err,
            Error::UnexpectedReply {
                expected: "OK",
                actual: Frame::Integer(1)
            }
        ));
    }

    #[test]
    fn optional_bytes_distinguishes_null_from_empty() {
        assert_eq!(optional_bytes(Frame::Null).unwrap(), None);
        assert_eq!(
            optional_bytes(Frame::Bulk(Bytes::new())).unwrap(),
            Some(Bytes::new())
        );
    }

    #[test]
    fn string_rejects_invalid_utf8() {
        let err = string(Frame::Bulk(Bytes::from_static(b"\xff\xfe"))).unwrap_err();

        assert!(matches!(err, Error::UnexpectedReply { expected: "UTF-8 string", .. }));
    }

    #[test]
    fn durations_round_up() {
        assert_eq!(ceil_secs(Duration::from_millis(500)), 1);
        assert_eq!(ceil_secs(Duration::from_secs(10)), 10);
        assert_eq!(ceil_secs(Duration::from_millis(10_001)), 11);
        assert_eq!(ceil_millis(Duration::from_micros(1)), 1);
        assert_eq!(ceil_millis(Duration::from_millis(1500)), 1500);
        assert_eq!(ceil_millis(Duration::MAX), u64::MAX);
    }

    #[test]
    fn boolean_accepts_only_zero_or_one() {
        assert!(!boolean(Frame::Integer(0)).unwrap());
        assert!(boolean(Frame::Integer(1)).unwrap());
        assert!(boolean(Frame::Integer(2)).is_err());
    }
}
