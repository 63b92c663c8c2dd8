use bytes::Bytes;

use crate::command::{Command, ToArg};
use crate::commands::{bytes, Executable};
use crate::frame::Frame;
use crate::Error;

/// Returns PONG if no argument is provided, otherwise a copy of the argument.
///
/// Ref: <https://redis.io/docs/latest/commands/ping/>
#[derive(Debug, Default, PartialEq)]
pub struct Ping {
    pub payload: Option<Bytes>,
}

impl Ping {
    pub fn new() -> Ping {
        Ping::default()
    }

    pub fn with_payload(payload: impl ToArg) -> Ping {
        Ping {
            payload: Some(payload.to_arg()),
        }
    }
}

impl Executable for Ping {
    type Output = Bytes;

    fn into_command(self) -> Command {
        let cmd = Command::new("PING");
        match self.payload {
            Some(payload) => cmd.arg(payload),
            None => cmd,
        }
    }

    fn parse_reply(frame: Frame) -> Result<Bytes, Error> {
        bytes(frame)
    }
}
