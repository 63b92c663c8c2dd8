use std::time::Duration;

use bytes::Bytes;
use strum_macros::AsRefStr;

use crate::command::{Command, ToArg};
use crate::commands::{boolean, ceil_secs, Executable};
use crate::frame::Frame;
use crate::Error;

/// Set a timeout on `key`. After the timeout has expired, the key will automatically be deleted.
/// Replies `true` if the timeout was set, `false` if the key does not exist or the condition
/// was not met.
///
/// Ref: <https://redis.io/docs/latest/commands/expire/>
#[derive(Debug, PartialEq)]
pub struct Expire {
    pub key: Bytes,
    pub seconds: Duration,
    pub condition: Option<ExpireCondition>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, AsRefStr)]
#[strum(serialize_all = "UPPERCASE")]
pub enum ExpireCondition {
    /// Set expiry only when the key has no expiry.
    Nx,
    /// Set expiry only when the key has an existing expiry.
    Xx,
    /// Set expiry only when the new expiry is greater than the current one.
    Gt,
    /// Set expiry only when the new expiry is less than the current one.
    Lt,
}

impl Expire {
    pub fn new(key: impl ToArg, seconds: Duration) -> Expire {
        Expire {
            key: key.to_arg(),
            seconds,
            condition: None,
        }
    }

    pub fn condition(mut self, condition: ExpireCondition) -> Expire {
        self.condition = Some(condition);
        self
    }
}

impl Executable for Expire {
    type Output = bool;

    fn into_command(self) -> Command {
        let mut cmd = Command::new("EXPIRE")
            .arg(self.key)
            .arg(ceil_secs(self.seconds));
        if let Some(condition) = self.condition {
            let condition: &str = condition.as_ref();
            cmd.push_arg(condition);
        }
        cmd
    }

    fn parse_reply(frame: Frame) -> Result<bool, Error> {
        boolean(frame)
    }
}
