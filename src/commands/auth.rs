use crate::command::Command;
use crate::commands::{expect_ok, Executable};
use crate::frame::Frame;
use crate::Error;

/// Authenticates the current connection, with an ACL user when `username` is set and against
/// the `default` user otherwise.
///
/// Ref: <https://redis.io/docs/latest/commands/auth/>
#[derive(PartialEq)]
pub struct Auth {
    pub username: Option<String>,
    pub password: String,
}

// Keep the password out of debug output.
impl std::fmt::Debug for Auth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Auth")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl Executable for Auth {
    type Output = ();

    fn into_command(self) -> Command {
        let cmd = Command::new("AUTH");
        match self.username {
            Some(username) => cmd.arg(username).arg(self.password),
            None => cmd.arg(self.password),
        }
    }

    fn parse_reply(frame: Frame) -> Result<(), Error> {
        expect_ok(frame)
    }
}
