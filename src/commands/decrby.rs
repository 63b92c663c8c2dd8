use bytes::Bytes;

use crate::command::{Command, ToArg};
use crate::commands::{integer, Executable};
use crate::frame::Frame;
use crate::Error;

/// Decrements the number stored at `key` by `decrement`.
///
/// Ref: <https://redis.io/docs/latest/commands/decrby/>
#[derive(Debug, PartialEq)]
pub struct DecrBy {
    pub key: Bytes,
    pub decrement: i64,
}

impl DecrBy {
    pub fn new(key: impl ToArg, decrement: i64) -> DecrBy {
        DecrBy {
            key: key.to_arg(),
            decrement,
        }
    }
}

impl Executable for DecrBy {
    type Output = i64;

    fn into_command(self) -> Command {
        Command::new("DECRBY").arg(self.key).arg(self.decrement)
    }

    fn parse_reply(frame: Frame) -> Result<i64, Error> {
        integer(frame)
    }
}
