use bytes::Bytes;

use crate::command::{Command, ToArg};
use crate::commands::{integer, Executable};
use crate::frame::Frame;
use crate::Error;

/// Returns the remaining time to live of a key, in seconds. `-1` when the key exists without an
/// expiry, `-2` when it does not exist.
///
/// Ref: <https://redis.io/docs/latest/commands/ttl/>
#[derive(Debug, PartialEq)]
pub struct Ttl {
    pub key: Bytes,
}

impl Ttl {
    pub fn new(key: impl ToArg) -> Ttl {
        Ttl { key: key.to_arg() }
    }
}

impl Executable for Ttl {
    type Output = i64;

    fn into_command(self) -> Command {
        Command::new("TTL").arg(self.key)
    }

    fn parse_reply(frame: Frame) -> Result<i64, Error> {
        integer(frame)
    }
}
