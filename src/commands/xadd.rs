use bytes::Bytes;

use crate::command::{Command, ToArg};
use crate::commands::{optional_bytes, string, Executable, StreamTrim};
use crate::frame::Frame;
use crate::Error;

/// Appends the specified stream entry to the stream at `key`, creating the stream unless
/// `NOMKSTREAM` is set. Replies with the id of the added entry, or `None` when the stream does
/// not exist and `NOMKSTREAM` was set.
///
/// Ref: <https://redis.io/docs/latest/commands/xadd/>
#[derive(Debug, PartialEq)]
pub struct Xadd {
    pub key: Bytes,
    /// `None` lets the server generate the id (`*`).
    pub id: Option<String>,
    pub no_mkstream: bool,
    pub trim: Option<StreamTrim>,
    pub fields: Vec<(Bytes, Bytes)>,
}

impl Xadd {
    pub fn new<I, F, V>(key: impl ToArg, fields: I) -> Xadd
    where
        I: IntoIterator<Item = (F, V)>,
        F: ToArg,
        V: ToArg,
    {
        Xadd {
            key: key.to_arg(),
            id: None,
            no_mkstream: false,
            trim: None,
            fields: fields
                .into_iter()
                .map(|(field, value)| (field.to_arg(), value.to_arg()))
                .collect(),
        }
    }

    pub fn id(mut self, id: impl Into<String>) -> Xadd {
        self.id = Some(id.into());
        self
    }

    pub fn no_mkstream(mut self) -> Xadd {
        self.no_mkstream = true;
        self
    }

    pub fn trim(mut self, trim: StreamTrim) -> Xadd {
        self.trim = Some(trim);
        self
    }
}

impl Executable for Xadd {
    type Output = Option<String>;

    fn into_command(self) -> Command {
        let mut cmd = Command::new("XADD").arg(self.key);

        if self.no_mkstream {
            cmd.push_arg("NOMKSTREAM");
        }
        if let Some(trim) = &self.trim {
            trim.push_args(&mut cmd);
        }
        cmd.push_arg(self.id.as_deref().unwrap_or("*"));
        for (field, value) in self.fields {
            cmd.push_arg(field);
            cmd.push_arg(value);
        }

        cmd
    }

    fn parse_reply(frame: Frame) -> Result<Self::Output, Error> {
        match optional_bytes(frame)? {
            Some(id) => string(Frame::Bulk(id)).map(Some),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_id() {
        let cmd = Xadd::new("mystream", [("name", "Sara"), ("surname", "OConnor")]).into_command();

        assert_eq!(
            cmd,
            Command::from_args(["XADD", "mystream", "*", "name", "Sara", "surname", "OConnor"])
        );
    }

    #[test]
    fn all_options() {
        let cmd = Xadd::new("mystream", [("field", "value")])
            .id("1526919030474-55")
            .no_mkstream()
            .trim(StreamTrim::max_len(1000).approximate().limit(100))
            .into_command();

        assert_eq!(
            cmd,
            Command::from_args([
                "XADD",
                "mystream",
                "NOMKSTREAM",
                "MAXLEN",
                "~",
                "1000",
                "LIMIT",
                "100",
                "1526919030474-55",
                "field",
                "value"
            ])
        );
    }

    #[test]
    fn limit_without_approximate() {
        let cmd = Xadd::new("s", [("f", "v")])
            .trim(StreamTrim::max_len(10).limit(5))
            .into_command();

        assert_eq!(
            cmd,
            Command::from_args(["XADD", "s", "MAXLEN", "~", "10", "LIMIT", "5", "*", "f", "v"])
        );
    }

    #[test]
    fn reply() {
        let id = Xadd::parse_reply(Frame::Bulk(Bytes::from("1526919030474-55"))).unwrap();

        assert_eq!(id.as_deref(), Some("1526919030474-55"));
        assert_eq!(Xadd::parse_reply(Frame::Null).unwrap(), None);
    }
}
