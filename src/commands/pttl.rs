use bytes::Bytes;

use crate::command::{Command, ToArg};
use crate::commands::{integer, Executable};
use crate::frame::Frame;
use crate::Error;

/// Like TTL, in milliseconds.
///
/// Ref: <https://redis.io/docs/latest/commands/pttl/>
#[derive(Debug, PartialEq)]
pub struct Pttl {
    pub key: Bytes,
}

impl Pttl {
    pub fn new(key: impl ToArg) -> Pttl {
        Pttl { key: key.to_arg() }
    }
}

impl Executable for Pttl {
    type Output = i64;

    fn into_command(self) -> Command {
        Command::new("PTTL").arg(self.key)
    }

    fn parse_reply(frame: Frame) -> Result<i64, Error> {
        integer(frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_key() {
        assert_eq!(
            Pttl::new("nope").into_command(),
            Command::from_args(["PTTL", "nope"])
        );
        assert_eq!(Pttl::parse_reply(Frame::Integer(-2)).unwrap(), -2);
    }
}
