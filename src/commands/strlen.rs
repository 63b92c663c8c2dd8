use bytes::Bytes;

use crate::command::{Command, ToArg};
use crate::commands::{integer, Executable};
use crate::frame::Frame;
use crate::Error;

/// Returns the length of the string value stored at `key`, 0 when the key does not exist.
///
/// Ref: <https://redis.io/docs/latest/commands/strlen/>
#[derive(Debug, PartialEq)]
pub struct Strlen {
    pub key: Bytes,
}

impl Strlen {
    pub fn new(key: impl ToArg) -> Strlen {
        Strlen { key: key.to_arg() }
    }
}

impl Executable for Strlen {
    type Output = i64;

    fn into_command(self) -> Command {
        Command::new("STRLEN").arg(self.key)
    }

    fn parse_reply(frame: Frame) -> Result<i64, Error> {
        integer(frame)
    }
}
