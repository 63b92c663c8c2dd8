use bytes::Bytes;

use crate::command::{Command, ToArg};
use crate::commands::{array, optional_bytes, Executable};
use crate::frame::Frame;
use crate::Error;

/// Returns the values of all specified keys, `None` for every key that does not hold a string.
///
/// Ref: <https://redis.io/docs/latest/commands/mget/>
#[derive(Debug, PartialEq)]
pub struct Mget {
    pub keys: Vec<Bytes>,
}

impl Mget {
    pub fn new<I, K>(keys: I) -> Mget
    where
        I: IntoIterator<Item = K>,
        K: ToArg,
    {
        Mget {
            keys: keys.into_iter().map(|key| key.to_arg()).collect(),
        }
    }
}

impl Executable for Mget {
    type Output = Vec<Option<Bytes>>;

    fn into_command(self) -> Command {
        Command::new("MGET").args_from(self.keys)
    }

    fn parse_reply(frame: Frame) -> Result<Self::Output, Error> {
        array(frame)?.into_iter().map(optional_bytes).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command() {
        let cmd = Mget::new(["key1", "key2"]).into_command();

        assert_eq!(cmd, Command::from_args(["MGET", "key1", "key2"]));
    }

    #[test]
    fn existing_and_missing_keys() {
        let frame = Frame::Array(vec![
            Frame::Bulk(Bytes::from("1")),
            Frame::Null,
            Frame::Bulk(Bytes::from("3")),
        ]);

        let values = Mget::parse_reply(frame).unwrap();

        assert_eq!(
            values,
            vec![Some(Bytes::from("1")), None, Some(Bytes::from("3"))]
        );
    }

    #[test]
    fn wrong_number_of_arguments() {
        let frame = Frame::Error("ERR wrong number of arguments for 'mget' command".to_string());

        assert!(matches!(Mget::parse_reply(frame), Err(Error::Server(_))));
    }
}
