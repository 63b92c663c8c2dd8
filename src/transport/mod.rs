//! The two ways a [`Client`](crate::Client) can reach the server. Both expose the same
//! contract, so callers and tests can swap one for the other.

mod adapter;
mod socket;

use std::future::Future;

pub use adapter::AdapterTransport;
pub use socket::SocketTransport;

use crate::command::Command;
use crate::config::ClientConfig;
use crate::connection::ConnectionState;
use crate::dispatcher::ResponseFuture;
use crate::error::ConnectError;
use crate::Error;

pub trait Transport: Send + Sync + Sized + 'static {
    /// Opens a connection, runs the handshake and starts dispatching.
    fn connect(config: &ClientConfig) -> impl Future<Output = Result<Self, ConnectError>> + Send;

    /// Queues `command`. See [`Dispatcher::submit`](crate::dispatcher::Dispatcher::submit).
    fn submit(&self, command: &Command) -> Result<ResponseFuture, Error>;

    /// Replaces a failed connection with a fresh one.
    fn reconnect(&self, config: &ClientConfig)
        -> impl Future<Output = Result<(), ConnectError>> + Send;

    fn is_connected(&self) -> bool;

    fn state(&self) -> ConnectionState;

    /// Idempotent. Pending requests fail with [`Error::Closed`].
    fn close(&self);
}
