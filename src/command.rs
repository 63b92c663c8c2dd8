use std::fmt;

use bytes::Bytes;

/// An ordered list of binary-safe arguments, the first one being the command name.
///
/// ```
/// use bushka::Command;
///
/// let command = Command::new("SET").arg("key").arg(42);
/// assert_eq!(command.to_string(), "SET key 42");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Command {
    args: Vec<Bytes>,
}

impl Command {
    pub fn new(name: impl ToArg) -> Command {
        Command {
            args: vec![name.to_arg()],
        }
    }

    pub fn from_args<I, A>(args: I) -> Command
    where
        I: IntoIterator<Item = A>,
        A: ToArg,
    {
        Command {
            args: args.into_iter().map(|arg| arg.to_arg()).collect(),
        }
    }

    pub fn arg(mut self, arg: impl ToArg) -> Command {
        self.args.push(arg.to_arg());
        self
    }

    pub fn args_from<I, A>(mut self, args: I) -> Command
    where
        I: IntoIterator<Item = A>,
        A: ToArg,
    {
        self.args.extend(args.into_iter().map(|arg| arg.to_arg()));
        self
    }

    pub fn push_arg(&mut self, arg: impl ToArg) {
        self.args.push(arg.to_arg());
    }

    pub fn name(&self) -> Option<&[u8]> {
        self.args.first().map(|name| &name[..])
    }

    pub fn args(&self) -> &[Bytes] {
        &self.args
    }

    fn is_auth(&self) -> bool {
        self.name()
            .map_or(false, |name| name.eq_ignore_ascii_case(b"AUTH"))
    }
}

// Rendered for logs. Credentials never leave through here.
impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_auth() {
            return write!(f, "AUTH <redacted>");
        }

        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{}", String::from_utf8_lossy(arg))?;
        }
        Ok(())
    }
}

/// Conversion into a single command argument.
pub trait ToArg {
    fn to_arg(&self) -> Bytes;
}

impl<T: ToArg + ?Sized> ToArg for &T {
    fn to_arg(&self) -> Bytes {
        (**self).to_arg()
    }
}

impl ToArg for str {
    fn to_arg(&self) -> Bytes {
        Bytes::copy_from_slice(self.as_bytes())
    }
}

impl ToArg for String {
    fn to_arg(&self) -> Bytes {
        Bytes::copy_from_slice(self.as_bytes())
    }
}

impl ToArg for [u8] {
    fn to_arg(&self) -> Bytes {
        Bytes::copy_from_slice(self)
    }
}

impl ToArg for Vec<u8> {
    fn to_arg(&self) -> Bytes {
        Bytes::copy_from_slice(self)
    }
}

impl ToArg for Bytes {
    fn to_arg(&self) -> Bytes {
        self.clone()
    }
}

macro_rules! to_arg_via_display {
    ($($t:ty),*) => {
        $(
            impl ToArg for $t {
                fn to_arg(&self) -> Bytes {
                    Bytes::from(self.to_string())
                }
            }
        )*
    };
}

to_arg_via_display!(i32, i64, u32, u64, usize, f64);
