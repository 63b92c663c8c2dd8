use tracing::debug;

use crate::command::Command;
use crate::config::ClientConfig;
use crate::connection::{Connection, ConnectionState};
use crate::dispatcher::{Dispatcher, ResponseFuture};
use crate::error::ConnectError;
use crate::transport::Transport;
use crate::Error;

/// Drives the socket from the caller's own Tokio runtime.
pub struct SocketTransport {
    dispatcher: Dispatcher,
}

impl Transport for SocketTransport {
    async fn connect(config: &ClientConfig) -> Result<SocketTransport, ConnectError> {
        let connection = Connection::connect(config).await?;
        Ok(SocketTransport {
            dispatcher: Dispatcher::new(connection),
        })
    }

    fn submit(&self, command: &Command) -> Result<ResponseFuture, Error> {
        self.dispatcher.submit(command)
    }

    async fn reconnect(&self, config: &ClientConfig) -> Result<(), ConnectError> {
        let connection = Connection::connect(config).await?;
        debug!(connection_id = %connection.id(), "Reconnected");
        Ok(self.dispatcher.reset(connection)?)
    }

    fn is_connected(&self) -> bool {
        self.dispatcher.is_connected()
    }

    fn state(&self) -> ConnectionState {
        self.dispatcher.state()
    }

    fn close(&self) {
        self.dispatcher.close();
    }
}
