use bytes::Bytes;

use crate::command::{Command, ToArg};
use crate::commands::{integer, Executable};
use crate::frame::Frame;
use crate::Error;

/// Removes entries from the pending entries list of a consumer group. Replies with the number
/// of entries acknowledged.
///
/// Ref: <https://redis.io/docs/latest/commands/xack/>
#[derive(Debug, PartialEq)]
pub struct Xack {
    pub key: Bytes,
    pub group: Bytes,
    pub ids: Vec<String>,
}

impl Xack {
    pub fn new<I, D>(key: impl ToArg, group: impl ToArg, ids: I) -> Xack
    where
        I: IntoIterator<Item = D>,
        D: Into<String>,
    {
        Xack {
            key: key.to_arg(),
            group: group.to_arg(),
            ids: ids.into_iter().map(Into::into).collect(),
        }
    }
}

impl Executable for Xack {
    type Output = i64;

    fn into_command(self) -> Command {
        Command::new("XACK")
            .arg(self.key)
            .arg(self.group)
            .args_from(self.ids)
    }

    fn parse_reply(frame: Frame) -> Result<i64, Error> {
        integer(frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ack_two() {
        let cmd = Xack::new("mystream", "mygroup", ["1-0", "2-0"]).into_command();

        assert_eq!(
            cmd,
            Command::from_args(["XACK", "mystream", "mygroup", "1-0", "2-0"])
        );
        assert_eq!(Xack::parse_reply(Frame::Integer(2)).unwrap(), 2);
    }
}
