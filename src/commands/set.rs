use std::time::Duration;

use bytes::Bytes;
use strum_macros::AsRefStr;

use crate::command::{Command, ToArg};
use crate::commands::{ceil_millis, ceil_secs, optional_bytes, Executable};
use crate::frame::Frame;
use crate::Error;

/// Set `key` to hold the string `value`. If `key` already holds a value, it is overwritten,
/// regardless of its type. Any previous time to live associated with the key is discarded on
/// successful SET operation, unless `KEEPTTL` is given.
///
/// Options:
/// - `EX` / `PX`: set the expiry in seconds or milliseconds.
/// - `KEEPTTL`: retain the time to live associated with the key.
/// - `NX` / `XX`: only set the key if it does not / does already exist.
/// - `GET`: return the old string stored at key, or nil if key did not exist.
///
/// The reply is `None` both when the condition was not met and when `GET` found no previous
/// value, `Some(b"OK")` on a plain successful write.
///
/// Ref: <https://redis.io/docs/latest/commands/set/>
#[derive(Debug, PartialEq)]
pub struct Set {
    pub key: Bytes,
    pub value: Bytes,
    pub condition: Option<SetCondition>,
    pub expiry: Option<Expiry>,
    pub get: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, AsRefStr)]
#[strum(serialize_all = "UPPERCASE")]
pub enum SetCondition {
    Nx,
    Xx,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Expiry {
    Ex(Duration),
    Px(Duration),
    KeepTtl,
}

impl Set {
    pub fn new(key: impl ToArg, value: impl ToArg) -> Set {
        Set {
            key: key.to_arg(),
            value: value.to_arg(),
            condition: None,
            expiry: None,
            get: false,
        }
    }

    pub fn condition(mut self, condition: SetCondition) -> Set {
        self.condition = Some(condition);
        self
    }

    pub fn expiry(mut self, expiry: Expiry) -> Set {
        self.expiry = Some(expiry);
        self
    }

    pub fn get(mut self) -> Set {
        self.get = true;
        self
    }
}

impl Executable for Set {
    type Output = Option<Bytes>;

    fn into_command(self) -> Command {
        let mut cmd = Command::new("SET").arg(self.key).arg(self.value);

        if let Some(condition) = self.condition {
            let condition: &str = condition.as_ref();
            cmd.push_arg(condition);
        }

        match self.expiry {
            Some(Expiry::Ex(duration)) => {
                cmd.push_arg("EX");
                cmd.push_arg(ceil_secs(duration));
            }
            Some(Expiry::Px(duration)) => {
                cmd.push_arg("PX");
                cmd.push_arg(ceil_millis(duration));
            }
            Some(Expiry::KeepTtl) => cmd.push_arg("KEEPTTL"),
            None => {}
        }

        if self.get {
            cmd.push_arg("GET");
        }

        cmd
    }

    fn parse_reply(frame: Frame) -> Result<Self::Output, Error> {
        optional_bytes(frame)
    }
}
