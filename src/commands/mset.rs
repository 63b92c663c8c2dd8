use bytes::Bytes;

use crate::command::{Command, ToArg};
use crate::commands::{expect_ok, Executable};
use crate::frame::Frame;
use crate::Error;

/// Sets the given keys to their respective values, replacing existing values.
///
/// Ref: <https://redis.io/docs/latest/commands/mset/>
#[derive(Debug, PartialEq)]
pub struct Mset {
    pub pairs: Vec<(Bytes, Bytes)>,
}

impl Mset {
    pub fn new<I, K, V>(pairs: I) -> Mset
    where
        I: IntoIterator<Item = (K, V)>,
        K: ToArg,
        V: ToArg,
    {
        Mset {
            pairs: pairs
                .into_iter()
                .map(|(key, value)| (key.to_arg(), value.to_arg()))
                .collect(),
        }
    }
}

impl Executable for Mset {
    type Output = ();

    fn into_command(self) -> Command {
        let mut cmd = Command::new("MSET");
        for (key, value) in self.pairs {
            cmd.push_arg(key);
            cmd.push_arg(value);
        }
        cmd
    }

    fn parse_reply(frame: Frame) -> Result<(), Error> {
        expect_ok(frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command() {
        let cmd = Mset::new([("key1", "1"), ("key2", "2")]).into_command();

        assert_eq!(cmd, Command::from_args(["MSET", "key1", "1", "key2", "2"]));
        assert!(Mset::parse_reply(Frame::Simple("OK".to_string())).is_ok());
    }
}
