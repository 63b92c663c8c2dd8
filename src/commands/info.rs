use std::collections::HashMap;

use itertools::Itertools;

use crate::command::Command;
use crate::commands::{string, Executable};
use crate::frame::Frame;
use crate::Error;

/// Returns information and statistics about the server, as `field:value` pairs. Section headers
/// (`# Server`) and blank lines are dropped; when a field shows up in several sections the last
/// one wins.
///
/// Ref: <https://redis.io/docs/latest/commands/info/>
#[derive(Debug, Default, PartialEq)]
pub struct Info {
    pub sections: Vec<String>,
}

impl Info {
    pub fn new() -> Info {
        Info::default()
    }

    pub fn sections<I, S>(sections: I) -> Info
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Info {
            sections: sections.into_iter().map(Into::into).collect(),
        }
    }
}

impl Executable for Info {
    type Output = HashMap<String, String>;

    fn into_command(self) -> Command {
        Command::new("INFO").args_from(self.sections)
    }

    fn parse_reply(frame: Frame) -> Result<Self::Output, Error> {
        Ok(parse_info(&string(frame)?))
    }
}

fn parse_info(text: &str) -> HashMap<String, String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_once(':'))
        .map(|(field, value)| (field.to_string(), value.to_string()))
        .collect()
}

/// Renders the requested section names for logs.
pub(crate) fn describe(info: &Info) -> String {
    if info.sections.is_empty() {
        "default".to_string()
    } else {
        info.sections.iter().join(",")
    }
}
