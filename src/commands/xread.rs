use bytes::Bytes;

use crate::command::{Command, ToArg};
use crate::commands::{Executable, StreamRead, StreamReadOptions};
use crate::frame::Frame;
use crate::Error;

/// Reads entries with an id greater than the given one from one or more streams. `$` reads
/// only what arrives after the call, which makes sense together with `BLOCK`.
///
/// Replies with the streams that had entries, or nothing when a blocking read timed out.
///
/// Ref: <https://redis.io/docs/latest/commands/xread/>
#[derive(Debug, PartialEq)]
pub struct Xread {
    pub streams: Vec<(Bytes, String)>,
    pub options: StreamReadOptions,
}

impl Xread {
    pub fn new<I, K, D>(streams: I) -> Xread
    where
        I: IntoIterator<Item = (K, D)>,
        K: ToArg,
        D: Into<String>,
    {
        Xread {
            streams: streams
                .into_iter()
                .map(|(key, id)| (key.to_arg(), id.into()))
                .collect(),
            options: StreamReadOptions::default(),
        }
    }

    pub fn options(mut self, options: StreamReadOptions) -> Xread {
        self.options = options;
        self
    }
}

impl Executable for Xread {
    type Output = Vec<StreamRead>;

    fn into_command(self) -> Command {
        let mut cmd = Command::new("XREAD");
        self.options.push_args(&mut cmd);
        push_streams(&mut cmd, self.streams);
        cmd
    }

    fn parse_reply(frame: Frame) -> Result<Self::Output, Error> {
        StreamRead::from_reply(frame)
    }
}

/// `STREAMS key [key ...] id [id ...]`
pub(crate) fn push_streams(cmd: &mut Command, streams: Vec<(Bytes, String)>) {
    cmd.push_arg("STREAMS");
    let (keys, ids): (Vec<_>, Vec<_>) = streams.into_iter().unzip();
    for key in keys {
        cmd.push_arg(key);
    }
    for id in ids {
        cmd.push_arg(id);
    }
}
