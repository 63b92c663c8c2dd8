use bytes::Bytes;

use crate::command::{Command, ToArg};
use crate::commands::{expect_ok, Executable, StreamGroupOptions};
use crate::frame::Frame;
use crate::Error;

/// Creates consumer group `group` on the stream at `key`, delivering entries after `id`. `$`
/// starts at the end of the stream and `0` at its beginning.
///
/// Ref: <https://redis.io/docs/latest/commands/xgroup-create/>
#[derive(Debug, PartialEq)]
pub struct XgroupCreate {
    pub key: Bytes,
    pub group: Bytes,
    pub id: String,
    pub options: StreamGroupOptions,
}

impl XgroupCreate {
    pub fn new(key: impl ToArg, group: impl ToArg, id: impl Into<String>) -> XgroupCreate {
        XgroupCreate {
            key: key.to_arg(),
            group: group.to_arg(),
            id: id.into(),
            options: StreamGroupOptions::default(),
        }
    }

    pub fn options(mut self, options: StreamGroupOptions) -> XgroupCreate {
        self.options = options;
        self
    }
}

impl Executable for XgroupCreate {
    type Output = ();

    fn into_command(self) -> Command {
        let mut cmd = Command::new("XGROUP")
            .arg("CREATE")
            .arg(self.key)
            .arg(self.group)
            .arg(self.id);
        self.options.push_args(&mut cmd);
        cmd
    }

    fn parse_reply(frame: Frame) -> Result<(), Error> {
        expect_ok(frame)
    }
}
