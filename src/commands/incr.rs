use bytes::Bytes;

use crate::command::{Command, ToArg};
use crate::commands::{integer, Executable};
use crate::frame::Frame;
use crate::Error;

/// Increments the number stored at `key` by one and replies with the new value. A missing key
/// is set to 0 first.
///
/// Ref: <https://redis.io/docs/latest/commands/incr/>
#[derive(Debug, PartialEq)]
pub struct Incr {
    pub key: Bytes,
}

impl Incr {
    pub fn new(key: impl ToArg) -> Incr {
        Incr { key: key.to_arg() }
    }
}

impl Executable for Incr {
    type Output = i64;

    fn into_command(self) -> Command {
        Command::new("INCR").arg(self.key)
    }

    fn parse_reply(frame: Frame) -> Result<i64, Error> {
        integer(frame)
    }
}
