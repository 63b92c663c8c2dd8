use bytes::Bytes;

use crate::command::{Command, ToArg};
use crate::commands::{integer, Executable};
use crate::frame::Frame;
use crate::Error;

/// Appends `value` at the end of the string stored at `key`, creating the key when missing.
/// Replies with the length of the string after the append.
///
/// Ref: <https://redis.io/docs/latest/commands/append/>
#[derive(Debug, PartialEq)]
pub struct Append {
    pub key: Bytes,
    pub value: Bytes,
}

impl Append {
    pub fn new(key: impl ToArg, value: impl ToArg) -> Append {
        Append {
            key: key.to_arg(),
            value: value.to_arg(),
        }
    }
}

impl Executable for Append {
    type Output = i64;

    fn into_command(self) -> Command {
        Command::new("APPEND").arg(self.key).arg(self.value)
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
        let cmd = Append::new("key1", " World").into_command();

        assert_eq!(cmd, Command::from_args(["APPEND", "key1", " World"]));
        assert_eq!(Append::parse_reply(Frame::Integer(11)).unwrap(), 11);
    }
}
