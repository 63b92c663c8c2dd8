use bytes::Bytes;

use crate::command::{Command, ToArg};
use crate::commands::{optional_bytes, Executable};
use crate::frame::Frame;
use crate::Error;

/// Get the value of `key` and delete the key. `nil` when the key does not exist.
///
/// Ref: <https://redis.io/docs/latest/commands/getdel/>
#[derive(Debug, PartialEq)]
pub struct Getdel {
    pub key: Bytes,
}

impl Getdel {
    pub fn new(key: impl ToArg) -> Getdel {
        Getdel { key: key.to_arg() }
    }
}

impl Executable for Getdel {
    type Output = Option<Bytes>;

    fn into_command(self) -> Command {
        Command::new("GETDEL").arg(self.key)
    }

    fn parse_reply(frame: Frame) -> Result<Self::Output, Error> {
        optional_bytes(frame)
    }
}
