pub mod client;
pub mod codec;
pub mod command;
pub mod commands;
pub mod config;
pub mod connection;
pub mod dispatcher;
pub mod error;
pub mod frame;
pub mod logger;
mod tls;
pub mod transport;

pub use client::{AdapterClient, Client, SocketClient};
pub use command::{Command, ToArg};
pub use config::{Address, Backoff, ClientConfig};
pub use error::{ConfigError, ConnectError, EncodingError, Error, ParseError, ParseErrorKind};
pub use frame::Frame;

pub type Result<T> = std::result::Result<T, Error>;
