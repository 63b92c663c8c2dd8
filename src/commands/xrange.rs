use bytes::Bytes;

use crate::command::{Command, ToArg};
use crate::commands::{array, Executable, StreamEntry, StreamRangeBound};
use crate::frame::Frame;
use crate::Error;

/// Returns the stream entries with ids between `start` and `end`, oldest first.
///
/// Ref: <https://redis.io/docs/latest/commands/xrange/>
#[derive(Debug, PartialEq)]
pub struct Xrange {
    pub key: Bytes,
    pub start: StreamRangeBound,
    pub end: StreamRangeBound,
    pub count: Option<u64>,
}

impl Xrange {
    pub fn new(key: impl ToArg, start: StreamRangeBound, end: StreamRangeBound) -> Xrange {
        Xrange {
            key: key.to_arg(),
            start,
            end,
            count: None,
        }
    }

    /// The whole stream, `-` to `+`.
    pub fn all(key: impl ToArg) -> Xrange {
        Xrange::new(key, StreamRangeBound::Min, StreamRangeBound::Max)
    }

    pub fn count(mut self, count: u64) -> Xrange {
        self.count = Some(count);
        self
    }
}

impl Executable for Xrange {
    type Output = Vec<StreamEntry>;

    fn into_command(self) -> Command {
        let cmd = Command::new("XRANGE")
            .arg(self.key)
            .arg(self.start.to_arg())
            .arg(self.end.to_arg());
        match self.count {
            Some(count) => cmd.arg("COUNT").arg(count),
            None => cmd,
        }
    }

    fn parse_reply(frame: Frame) -> Result<Self::Output, Error> {
        array(frame)?
            .into_iter()
            .map(StreamEntry::from_frame)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whole_stream() {
        let cmd = Xrange::all("mystream").into_command();

        assert_eq!(cmd, Command::from_args(["XRANGE", "mystream", "-", "+"]));
    }

    #[test]
    fn exclusive_start_with_count() {
        let cmd = Xrange::new(
            "mystream",
            StreamRangeBound::Exclusive("1526985054069-0".to_string()),
            StreamRangeBound::Max,
        )
        .count(2)
        .into_command();

        assert_eq!(
            cmd,
            Command::from_args(["XRANGE", "mystream", "(1526985054069-0", "+", "COUNT", "2"])
        );
    }

    #[test]
    fn reply() {
        let frame = Frame::Array(vec![
            Frame::Array(vec![
                Frame::Bulk(Bytes::from("1-0")),
                Frame::Array(vec![Frame::Bulk(Bytes::from("a")), Frame::Bulk(Bytes::from("1"))]),
            ]),
            Frame::Array(vec![
                Frame::Bulk(Bytes::from("2-0")),
                Frame::Array(vec![]),
            ]),
        ]);

        let entries = Xrange::parse_reply(frame).unwrap();

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].id, "1-0");
        assert_eq!(entries[0].fields, vec![(Bytes::from("a"), Bytes::from("1"))]);
        assert!(entries[1].fields.is_empty());
        assert!(Xrange::parse_reply(Frame::Array(vec![])).unwrap().is_empty());
    }
}
