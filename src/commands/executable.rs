use crate::command::Command;
use crate::frame::Frame;
use crate::Error;

/// A request whose reply converts into a typed value.
pub trait Executable {
    type Output;

    fn into_command(self) -> Command;

    fn parse_reply(frame: Frame) -> Result<Self::Output, Error>;
}

/// Raw commands hand back the reply untouched, error replies included.
impl Executable for Command {
    type Output = Frame;

    fn into_command(self) -> Command {
        self
    }

    fn parse_reply(frame: Frame) -> Result<Frame, Error> {
        Ok(frame)
    }
}
