use bytes::Bytes;

use crate::command::{Command, ToArg};
use crate::commands::{integer, Executable};
use crate::frame::Frame;
use crate::Error;

/// Removes the specified keys. A key is ignored if it does not exist. Replies with the number of
/// keys that were removed.
///
/// Ref: <https://redis.io/docs/latest/commands/del/>
#[derive(Debug, PartialEq)]
pub struct Del {
    pub keys: Vec<Bytes>,
}

impl Del {
    pub fn new<I, K>(keys: I) -> Del
    where
        I: IntoIterator<Item = K>,
        K: ToArg,
    {
        Del {
            keys: keys.into_iter().map(|key| key.to_arg()).collect(),
        }
    }
}

impl Executable for Del {
    type Output = i64;

    fn into_command(self) -> Command {
        Command::new("DEL").args_from(self.keys)
    }

    fn parse_reply(frame: Frame) -> Result<i64, Error> {
        integer(frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_key() {
        assert_eq!(
            Del::new(["key1"]).into_command(),
            Command::from_args(["DEL", "key1"])
        );
    }

    #[test]
    fn multiple_keys() {
        let cmd = Del::new(["key1", "key2", "key3"]).into_command();

        assert_eq!(cmd, Command::from_args(["DEL", "key1", "key2", "key3"]));
        assert_eq!(Del::parse_reply(Frame::Integer(2)).unwrap(), 2);
    }
}
