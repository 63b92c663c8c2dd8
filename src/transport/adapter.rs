use std::io;

use tokio::runtime::{Builder, Handle, Runtime};
use tracing::debug;

use crate::command::Command;
use crate::config::ClientConfig;
use crate::connection::{Connection, ConnectionState};
use crate::dispatcher::{Dispatcher, ResponseFuture};
use crate::error::ConnectError;
use crate::transport::Transport;
use crate::Error;

const THREAD_NAME: &str = "bushka-adapter";

/// Delegates all socket I/O to a runtime of its own, with a single worker thread.
///
/// Callers only exchange encoded requests and replies with that runtime, so the transport works
/// the same from any executor, including one that is not Tokio.
pub struct AdapterTransport {
    // Declared first so the connection is closed before its runtime goes away.
    dispatcher: Dispatcher,
    runtime: AdapterRuntime,
}

impl AdapterTransport {
    fn handle(&self) -> &Handle {
        self.runtime.handle()
    }
}

impl Transport for AdapterTransport {
    async fn connect(config: &ClientConfig) -> Result<AdapterTransport, ConnectError> {
        let runtime = AdapterRuntime::new().map_err(ConnectError::Transport)?;

        let config = config.clone();
        let dispatcher = runtime
            .handle()
            .spawn(async move {
                let connection = Connection::connect(&config).await?;
                // Spawns the dispatcher tasks on the adapter runtime.
                Ok::<_, ConnectError>(Dispatcher::new(connection))
            })
            .await
            .map_err(join_error)??;

        debug!(thread_name = THREAD_NAME, "Adapter runtime started");
        Ok(AdapterTransport {
            dispatcher,
            runtime,
        })
    }

    fn submit(&self, command: &Command) -> Result<ResponseFuture, Error> {
        self.dispatcher.submit(command)
    }

    async fn reconnect(&self, config: &ClientConfig) -> Result<(), ConnectError> {
        let config = config.clone();
        let connection = self
            .handle()
            .spawn(async move { Connection::connect(&config).await })
            .await
            .map_err(join_error)??;

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

fn join_error(err: tokio::task::JoinError) -> ConnectError {
    ConnectError::Transport(io::Error::other(err))
}

/// Owns the adapter's runtime. Dropping a runtime blocks on its tasks, which panics when done
/// from async context, so it is shut down in the background instead.
struct AdapterRuntime {
    runtime: Option<Runtime>,
    handle: Handle,
}

impl AdapterRuntime {
    fn new() -> io::Result<AdapterRuntime> {
        let runtime = Builder::new_multi_thread()
            .enable_all()
            .worker_threads(1)
            .thread_name(THREAD_NAME)
            .build()?;
        let handle = runtime.handle().clone();

        Ok(AdapterRuntime {
            runtime: Some(runtime),
            handle,
        })
    }

    fn handle(&self) -> &Handle {
        &self.handle
    }
}

impl Drop for AdapterRuntime {
    fn drop(&mut self) {
        if let Some(runtime) = self.runtime.take() {
            runtime.shutdown_background();
        }
    }
}
