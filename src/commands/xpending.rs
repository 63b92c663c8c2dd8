use bytes::Bytes;

use crate::command::{Command, ToArg};
use crate::commands::{
    array, ceil_millis, Executable, PendingEntry, PendingSummary, StreamPendingOptions,
    StreamRangeBound,
};
use crate::frame::Frame;
use crate::Error;

/// Summarizes the entries delivered to a consumer group but not acknowledged yet.
///
/// Ref: <https://redis.io/docs/latest/commands/xpending/>
#[derive(Debug, PartialEq)]
pub struct Xpending {
    pub key: Bytes,
    pub group: Bytes,
}

impl Xpending {
    pub fn new(key: impl ToArg, group: impl ToArg) -> Xpending {
        Xpending {
            key: key.to_arg(),
            group: group.to_arg(),
        }
    }

    /// The extended form, listing up to `count` pending entries between `start` and `end`.
    pub fn range(
        self,
        start: StreamRangeBound,
        end: StreamRangeBound,
        count: u64,
    ) -> XpendingRange {
        XpendingRange {
            key: self.key,
            group: self.group,
            start,
            end,
            count,
            options: StreamPendingOptions::default(),
        }
    }
}

impl Executable for Xpending {
    type Output = PendingSummary;

    fn into_command(self) -> Command {
        Command::new("XPENDING").arg(self.key).arg(self.group)
    }

    fn parse_reply(frame: Frame) -> Result<PendingSummary, Error> {
        PendingSummary::from_frame(frame)
    }
}

#[derive(Debug, PartialEq)]
pub struct XpendingRange {
    pub key: Bytes,
    pub group: Bytes,
    pub start: StreamRangeBound,
    pub end: StreamRangeBound,
    pub count: u64,
    pub options: StreamPendingOptions,
}

impl XpendingRange {
    pub fn options(mut self, options: StreamPendingOptions) -> XpendingRange {
        self.options = options;
        self
    }
}

impl Executable for XpendingRange {
    type Output = Vec<PendingEntry>;

    fn into_command(self) -> Command {
        let mut cmd = Command::new("XPENDING").arg(self.key).arg(self.group);
        if let Some(idle) = self.options.min_idle_time {
            cmd.push_arg("IDLE");
            cmd.push_arg(ceil_millis(idle));
        }
        cmd.push_arg(self.start.to_arg());
        cmd.push_arg(self.end.to_arg());
        cmd.push_arg(self.count);
        if let Some(consumer) = self.options.consumer {
            cmd.push_arg(consumer);
        }
        cmd
    }

    fn parse_reply(frame: Frame) -> Result<Self::Output, Error> {
        array(frame)?
            .into_iter()
            .map(PendingEntry::from_frame)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn summary() {
        let cmd = Xpending::new("mystream", "group55").into_command();

        assert_eq!(cmd, Command::from_args(["XPENDING", "mystream", "group55"]));
    }

    #[test]
    fn extended_with_filters() {
        let cmd = Xpending::new("mystream", "group55")
            .range(StreamRangeBound::Min, StreamRangeBound::Max, 10)
            .options(
                StreamPendingOptions::default()
                    .min_idle_time(Duration::from_secs(9))
                    .consumer("consumer-123"),
            )
            .into_command();

        assert_eq!(
            cmd,
            Command::from_args([
                "XPENDING",
                "mystream",
                "group55",
                "IDLE",
                "9000",
                "-",
                "+",
                "10",
                "consumer-123"
            ])
        );
    }

    #[test]
    fn extended_reply() {
        let frame = Frame::Array(vec![Frame::Array(vec![
            Frame::Bulk(Bytes::from("1526984818136-0")),
            Frame::Bulk(Bytes::from("consumer-123")),
            Frame::Integer(196415),
            Frame::Integer(1),
        ])]);

        let entries = XpendingRange::parse_reply(frame).unwrap();

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].consumer, "consumer-123");
        assert_eq!(entries[0].idle, Duration::from_millis(196415));
    }
}
