use crate::command::Command;
use crate::commands::{expect_ok, Executable};
use crate::frame::Frame;
use crate::Error;

/// Assigns a name to the current connection, shown in `CLIENT LIST`.
///
/// Ref: <https://redis.io/docs/latest/commands/client-setname/>
#[derive(Debug, PartialEq)]
pub struct ClientSetName {
    pub name: String,
}

impl Executable for ClientSetName {
    type Output = ();

    fn into_command(self) -> Command {
        Command::new("CLIENT").arg("SETNAME").arg(self.name)
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
        let cmd = ClientSetName {
            name: "worker-1".to_string(),
        }
        .into_command();

        assert_eq!(cmd, Command::from_args(["CLIENT", "SETNAME", "worker-1"]));
    }
}
