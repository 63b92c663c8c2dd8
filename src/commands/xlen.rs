use bytes::Bytes;

use crate::command::{Command, ToArg};
use crate::commands::{integer, Executable};
use crate::frame::Frame;
use crate::Error;

/// Returns the number of entries inside a stream, 0 when the key does not exist.
///
/// Ref: <https://redis.io/docs/latest/commands/xlen/>
#[derive(Debug, PartialEq)]
pub struct Xlen {
    pub key: Bytes,
}

impl Xlen {
    pub fn new(key: impl ToArg) -> Xlen {
        Xlen { key: key.to_arg() }
    }
}

impl Executable for Xlen {
    type Output = i64;

    fn into_command(self) -> Command {
        Command::new("XLEN").arg(self.key)
    }

    fn parse_reply(frame: Frame) -> Result<i64, Error> {
        integer(frame)
    }
}
