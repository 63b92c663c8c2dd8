use bytes::Bytes;

use crate::command::{Command, ToArg};
use crate::commands::{optional_bytes, Executable};
use crate::frame::Frame;
use crate::Error;

/// Get the value of `key`. If the key does not exist the special value `nil` is returned.
///
/// Ref: <https://redis.io/docs/latest/commands/get/>
#[derive(Debug, PartialEq)]
pub struct Get {
    pub key: Bytes,
}

impl Get {
    pub fn new(key: impl ToArg) -> Get {
        Get { key: key.to_arg() }
    }
}

impl Executable for Get {
    type Output = Option<Bytes>;

    fn into_command(self) -> Command {
        Command::new("GET").arg(self.key)
    }

    fn parse_reply(frame: Frame) -> Result<Self::Output, Error> {
        optional_bytes(frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command() {
        let cmd = Get::new("key1").into_command();

        assert_eq!(cmd, Command::from_args(["GET", "key1"]));
    }

    #[test]
    fn existing_key() {
        let result = Get::parse_reply(Frame::Bulk(Bytes::from("1"))).unwrap();

        assert_eq!(result, Some(Bytes::from("1")));
    }

    #[test]
    fn missing_key() {
        let result = Get::parse_reply(Frame::Null).unwrap();

        assert_eq!(result, None);
    }

    #[test]
    fn wrong_type() {
        let frame = Frame::Error(
            "WRONGTYPE Operation against a key holding the wrong kind of value".to_string(),
        );

        let result = Get::parse_reply(frame);

        assert!(matches!(result, Err(Error::Server(_))));
    }
}
