use crate::command::Command;
use crate::commands::{expect_ok, Executable};
use crate::frame::Frame;
use crate::Error;

/// Select the logical database having the specified zero-based numeric index. New connections
/// always use the database 0.
///
/// Ref: <https://redis.io/docs/latest/commands/select/>
#[derive(Debug, PartialEq)]
pub struct Select {
    pub index: i64,
}

impl Executable for Select {
    type Output = ();

    fn into_command(self) -> Command {
        Command::new("SELECT").arg(self.index)
    }

    fn parse_reply(frame: Frame) -> Result<(), Error> {
        expect_ok(frame)
    }
}
