use bytes::Bytes;

use crate::command::{Command, ToArg};
use crate::commands::{integer, Executable};
use crate::frame::Frame;
use crate::Error;

/// Decrements the number stored at `key` by one.
///
/// Ref: <https://redis.io/docs/latest/commands/decr/>
#[derive(Debug, PartialEq)]
pub struct Decr {
    pub key: Bytes,
}

impl Decr {
    pub fn new(key: impl ToArg) -> Decr {
        Decr { key: key.to_arg() }
    }
}

impl Executable for Decr {
    type Output = i64;

    fn into_command(self) -> Command {
        Command::new("DECR").arg(self.key)
    }

    fn parse_reply(frame: Frame) -> Result<i64, Error> {
        integer(frame)
    }
}
