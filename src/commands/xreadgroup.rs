use bytes::Bytes;

use crate::command::{Command, ToArg};
use crate::commands::xread::push_streams;
use crate::commands::{Executable, StreamRead, StreamReadGroupOptions};
use crate::frame::Frame;
use crate::Error;

/// XREAD on behalf of `consumer` in a consumer group. The id `>` asks for entries never
/// delivered to any consumer of the group. Any other id replays the consumer's own pending
/// entries.
///
/// Ref: <https://redis.io/docs/latest/commands/xreadgroup/>
#[derive(Debug, PartialEq)]
pub struct Xreadgroup {
    pub group: Bytes,
    pub consumer: Bytes,
    pub streams: Vec<(Bytes, String)>,
    pub options: StreamReadGroupOptions,
}

impl Xreadgroup {
    pub fn new<I, K, D>(group: impl ToArg, consumer: impl ToArg, streams: I) -> Xreadgroup
    where
        I: IntoIterator<Item = (K, D)>,
        K: ToArg,
        D: Into<String>,
    {
        Xreadgroup {
            group: group.to_arg(),
            consumer: consumer.to_arg(),
            streams: streams
                .into_iter()
                .map(|(key, id)| (key.to_arg(), id.into()))
                .collect(),
            options: StreamReadGroupOptions::default(),
        }
    }

    pub fn options(mut self, options: StreamReadGroupOptions) -> Xreadgroup {
        self.options = options;
        self
    }
}

impl Executable for Xreadgroup {
    type Output = Vec<StreamRead>;

    fn into_command(self) -> Command {
        let mut cmd = Command::new("XREADGROUP")
            .arg("GROUP")
            .arg(self.group)
            .arg(self.consumer);
        self.options.push_args(&mut cmd);
        push_streams(&mut cmd, self.streams);
        cmd
    }

    fn parse_reply(frame: Frame) -> Result<Self::Output, Error> {
        StreamRead::from_reply(frame)
    }
}
