use bytes::Bytes;

use crate::command::{Command, ToArg};
use crate::commands::{bytes, Executable};
use crate::frame::Frame;
use crate::Error;

/// Ref: <https://redis.io/docs/latest/commands/echo/>
#[derive(Debug, PartialEq)]
pub struct Echo {
    pub message: Bytes,
}

impl Echo {
    pub fn new(message: impl ToArg) -> Echo {
        Echo {
            message: message.to_arg(),
        }
    }
}

impl Executable for Echo {
    type Output = Bytes;

    fn into_command(self) -> Command {
        Command::new("ECHO").arg(self.message)
    }

    fn parse_reply(frame: Frame) -> Result<Bytes, Error> {
        bytes(frame)
    }
}
