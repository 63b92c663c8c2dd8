use bytes::Bytes;

use crate::command::{Command, ToArg};
use crate::commands::Executable;
use crate::frame::Frame;
use crate::Error;

/// Invoke the execution of a server-side Lua script. The script's reply is handed back as is,
/// error replies included, so the caller decides how to read it.
///
/// Ref: <https://redis.io/docs/latest/commands/eval/>
#[derive(Debug, PartialEq)]
pub struct Eval {
    pub script: Bytes,
    pub keys: Vec<Bytes>,
    pub args: Vec<Bytes>,
}

impl Eval {
    pub fn new(script: impl ToArg) -> Eval {
        Eval {
            script: script.to_arg(),
            keys: vec![],
            args: vec![],
        }
    }

    pub fn key(mut self, key: impl ToArg) -> Eval {
        self.keys.push(key.to_arg());
        self
    }

    pub fn arg(mut self, arg: impl ToArg) -> Eval {
        self.args.push(arg.to_arg());
        self
    }
}

impl Executable for Eval {
    type Output = Frame;

    fn into_command(self) -> Command {
        Command::new("EVAL")
            .arg(self.script)
            .arg(self.keys.len())
            .args_from(self.keys)
            .args_from(self.args)
    }

    fn parse_reply(frame: Frame) -> Result<Frame, Error> {
        Ok(frame)
    }
}

/// Like EVAL, with a script previously cached on the server and referenced by its SHA1 digest.
///
/// Ref: <https://redis.io/docs/latest/commands/evalsha/>
#[derive(Debug, PartialEq)]
pub struct EvalSha {
    pub sha1: String,
    pub keys: Vec<Bytes>,
    pub args: Vec<Bytes>,
}

impl EvalSha {
    pub fn new(sha1: impl Into<String>) -> EvalSha {
        EvalSha {
            sha1: sha1.into(),
            keys: vec![],
            args: vec![],
        }
    }

    pub fn key(mut self, key: impl ToArg) -> EvalSha {
        self.keys.push(key.to_arg());
        self
    }

    pub fn arg(mut self, arg: impl ToArg) -> EvalSha {
        self.args.push(arg.to_arg());
        self
    }
}

impl Executable for EvalSha {
    type Output = Frame;

    fn into_command(self) -> Command {
        Command::new("EVALSHA")
            .arg(self.sha1)
            .arg(self.keys.len())
            .args_from(self.keys)
            .args_from(self.args)
    }

    fn parse_reply(frame: Frame) -> Result<Frame, Error> {
        Ok(frame)
    }
}
