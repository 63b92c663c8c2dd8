use bytes::Bytes;

use crate::command::{Command, ToArg};
use crate::commands::{integer, Executable};
use crate::frame::Frame;
use crate::Error;

/// Increments the number stored at `key` by `increment`.
///
/// Ref: <https://redis.io/docs/latest/commands/incrby/>
#[derive(Debug, PartialEq)]
pub struct IncrBy {
    pub key: Bytes,
    pub increment: i64,
}

impl IncrBy {
    pub fn new(key: impl ToArg, increment: i64) -> IncrBy {
        IncrBy {
            key: key.to_arg(),
            increment,
        }
    }
}

impl Executable for IncrBy {
    type Output = i64;

    fn into_command(self) -> Command {
        Command::new("INCRBY").arg(self.key).arg(self.increment)
    }

    fn parse_reply(frame: Frame) -> Result<i64, Error> {
        integer(frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command() {
        assert_eq!(
            IncrBy::new("counter", -5).into_command(),
            Command::from_args(["INCRBY", "counter", "-5"])
        );
        assert_eq!(IncrBy::parse_reply(Frame::Integer(5)).unwrap(), 5);
    }
}
