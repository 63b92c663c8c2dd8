use crate::command::Command;
use crate::commands::{integer, Executable};
use crate::frame::Frame;
use crate::Error;

/// Return the number of keys in the currently-selected database.
///
/// Ref: <https://redis.io/docs/latest/commands/dbsize/>
#[derive(Debug, PartialEq)]
pub struct DBSize;

impl Executable for DBSize {
    type Output = i64;

    fn into_command(self) -> Command {
        Command::new("DBSIZE")
    }

    fn parse_reply(frame: Frame) -> Result<i64, Error> {
        integer(frame)
    }
}
