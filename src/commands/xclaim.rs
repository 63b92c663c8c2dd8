use std::time::Duration;

use bytes::Bytes;

use crate::command::{Command, ToArg};
use crate::commands::{array, ceil_millis, Executable, StreamClaimOptions, StreamEntry};
use crate::frame::Frame;
use crate::Error;

/// Transfers pending entries idle for at least `min_idle_time` to `consumer`. Replies with the
/// claimed entries.
///
/// Ref: <https://redis.io/docs/latest/commands/xclaim/>
#[derive(Debug, PartialEq)]
pub struct Xclaim {
    pub key: Bytes,
    pub group: Bytes,
    pub consumer: Bytes,
    pub min_idle_time: Duration,
    pub ids: Vec<String>,
    pub options: StreamClaimOptions,
}

impl Xclaim {
    pub fn new<I, D>(
        key: impl ToArg,
        group: impl ToArg,
        consumer: impl ToArg,
        min_idle_time: Duration,
        ids: I,
    ) -> Xclaim
    where
        I: IntoIterator<Item = D>,
        D: Into<String>,
    {
        Xclaim {
            key: key.to_arg(),
            group: group.to_arg(),
            consumer: consumer.to_arg(),
            min_idle_time,
            ids: ids.into_iter().map(Into::into).collect(),
            options: StreamClaimOptions::default(),
        }
    }

    pub fn options(mut self, options: StreamClaimOptions) -> Xclaim {
        self.options = options;
        self
    }
}

impl Executable for Xclaim {
    type Output = Vec<StreamEntry>;

    fn into_command(self) -> Command {
        let mut cmd = Command::new("XCLAIM")
            .arg(self.key)
            .arg(self.group)
            .arg(self.consumer)
            .arg(ceil_millis(self.min_idle_time))
            .args_from(self.ids);
        self.options.push_args(&mut cmd);
        cmd
    }

    fn parse_reply(frame: Frame) -> Result<Self::Output, Error> {
        array(frame)?
            .into_iter()
            // Entries deleted in the meantime come back as nulls on older servers.
            .filter(|entry| !entry.is_null())
            .map(StreamEntry::from_frame)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn claim_with_options() {
        let cmd = Xclaim::new(
            "mystream",
            "mygroup",
            "alice",
            Duration::from_millis(3600000),
            ["1526569498055-0"],
        )
        .options(StreamClaimOptions::default().retry_count(2))
        .into_command();

        assert_eq!(
            cmd,
            Command::from_args([
                "XCLAIM",
                "mystream",
                "mygroup",
                "alice",
                "3600000",
                "1526569498055-0",
                "RETRYCOUNT",
                "2"
            ])
        );
    }

    #[test]
    fn skips_deleted_entries() {
        let frame = Frame::Array(vec![
            Frame::Null,
            Frame::Array(vec![
                Frame::Bulk(Bytes::from("1-0")),
                Frame::Array(vec![Frame::Bulk(Bytes::from("a")), Frame::Bulk(Bytes::from("1"))]),
            ]),
        ]);

        let entries = Xclaim::parse_reply(frame).unwrap();

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].id, "1-0");
    }
}
