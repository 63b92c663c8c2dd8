use bytes::Bytes;

use crate::command::{Command, ToArg};
use crate::commands::{integer, Executable};
use crate::frame::Frame;
use crate::Error;

/// Counts how many of the given keys exist. A key mentioned twice is counted twice.
///
/// Ref: <https://redis.io/docs/latest/commands/exists/>
#[derive(Debug, PartialEq)]
pub struct Exists {
    pub keys: Vec<Bytes>,
}

impl Exists {
    pub fn new<I, K>(keys: I) -> Exists
    where
        I: IntoIterator<Item = K>,
        K: ToArg,
    {
        Exists {
            keys: keys.into_iter().map(|key| key.to_arg()).collect(),
        }
    }
}

impl Executable for Exists {
    type Output = i64;

    fn into_command(self) -> Command {
        Command::new("EXISTS").args_from(self.keys)
    }

    fn parse_reply(frame: Frame) -> Result<i64, Error> {
        integer(frame)
    }
}
