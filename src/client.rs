use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use bytes::Bytes;
use tokio::sync::Mutex;
use tokio::time::{sleep, timeout};
use tracing::{debug, info, instrument, warn};

use crate::command::{Command, ToArg};
use crate::commands::info::describe;
use crate::commands::{Auth, Del, Eval, EvalSha, Executable, Get, Incr, Info, Ping, Script, Set};
use crate::config::ClientConfig;
use crate::connection::ConnectionState;
use crate::dispatcher::ResponseFuture;
use crate::error::{ConfigError, ConnectError};
use crate::frame::Frame;
use crate::transport::{AdapterTransport, SocketTransport, Transport};
use crate::Error;

/// Client driving the socket from the caller's runtime.
pub type SocketClient = Client<SocketTransport>;

/// Client delegating socket I/O to a dedicated runtime.
pub type AdapterClient = Client<AdapterTransport>;

/// A handle to one server connection. Cheap to clone; clones share the connection and requests
/// from all of them are pipelined.
///
/// A dead connection is replaced by a reconnect, bounded by
/// [`ClientConfig::max_reconnect_attempts`]. A request that never reached the wire is sent on the
/// new connection. A request that was already in flight fails with [`Error::ConnectionLost`],
/// since the server may have applied it.
pub struct Client<T = SocketTransport> {
    inner: Arc<Inner<T>>,
}

struct Inner<T> {
    config: ClientConfig,
    // Replayed by every reconnect. Rotated through `update_password`.
    password: RwLock<Option<String>>,
    transport: T,
    // Serializes reconnects. Callers that lost the race find the transport connected again.
    reconnect: Mutex<()>,
    closed: AtomicBool,
}

impl<T> Clone for Client<T> {
    fn clone(&self) -> Self {
        Client {
            inner: self.inner.clone(),
        }
    }
}

impl<T: Transport> Client<T> {
    /// Validates `config` and connects. A failed first connect is not retried.
    #[instrument(name = "client", skip(config), fields(address = %config.address()))]
    pub async fn create(config: ClientConfig) -> Result<Client<T>, Error> {
        config.validate()?;
        let transport = T::connect(&config).await?;
        info!("Client ready");

        Ok(Client {
            inner: Arc::new(Inner {
                password: RwLock::new(config.password.clone()),
                config,
                transport,
                reconnect: Mutex::new(()),
                closed: AtomicBool::new(false),
            }),
        })
    }

    /// Sends a raw command. Error replies come back as [`Frame::Error`].
    pub async fn execute(&self, command: Command) -> Result<Frame, Error> {
        self.run(command).await
    }

    /// Sends a typed command and converts its reply.
    pub async fn run<E: Executable>(&self, executable: E) -> Result<E::Output, Error> {
        let command = executable.into_command();
        let frame = self.send(&command).await?;
        E::parse_reply(frame)
    }

    /// Stops accepting commands and closes the connection. Pending requests fail with
    /// [`Error::Closed`]. Idempotent.
    pub fn close(&self) {
        if self.inner.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        self.inner.transport.close();
        info!("Client closed");
    }

    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::SeqCst)
    }

    pub fn is_connected(&self) -> bool {
        !self.is_closed() && self.inner.transport.is_connected()
    }

    pub fn state(&self) -> ConnectionState {
        self.inner.transport.state()
    }

    /// The configuration the next reconnect will use, current password included.
    pub fn config(&self) -> ClientConfig {
        ClientConfig {
            password: self.password(),
            ..self.inner.config.clone()
        }
    }

    /// Replaces the password replayed on reconnect. With `immediate_auth`, the current
    /// connection is re-authenticated first and the password is only stored once the server
    /// accepted it.
    #[instrument(skip(self, password))]
    pub async fn update_password(
        &self,
        password: Option<String>,
        immediate_auth: bool,
    ) -> Result<(), Error> {
        if self.is_closed() {
            return Err(Error::Closed);
        }
        if password.is_none() && self.inner.config.username.is_some() {
            return Err(ConfigError::UsernameWithoutPassword.into());
        }

        if immediate_auth {
            let Some(password) = password.clone() else {
                return Err(ConfigError::AuthWithoutPassword.into());
            };
            self.run(Auth {
                username: self.inner.config.username.clone(),
                password,
            })
            .await?;
        }

        *self
            .inner
            .password
            .write()
            .unwrap_or_else(PoisonError::into_inner) = password;
        info!("Password updated");
        Ok(())
    }

    fn password(&self) -> Option<String> {
        self.inner
            .password
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub async fn ping(&self) -> Result<Bytes, Error> {
        self.run(Ping::new()).await
    }

    pub async fn get(&self, key: impl ToArg) -> Result<Option<Bytes>, Error> {
        self.run(Get::new(key)).await
    }

    pub async fn set(&self, key: impl ToArg, value: impl ToArg) -> Result<(), Error> {
        self.run(Set::new(key, value)).await.map(|_| ())
    }

    pub async fn del(&self, key: impl ToArg) -> Result<bool, Error> {
        self.run(Del::new([key])).await.map(|removed| removed > 0)
    }

    pub async fn incr(&self, key: impl ToArg) -> Result<i64, Error> {
        self.run(Incr::new(key)).await
    }

    pub async fn info(&self, sections: Info) -> Result<HashMap<String, String>, Error> {
        debug!(sections = %describe(&sections), "Requesting server info");
        self.run(sections).await
    }

    /// Runs `script` by its digest with EVALSHA, sending the source with EVAL when the server
    /// has not cached it yet. Script errors come back as [`Frame::Error`].
    pub async fn invoke_script<K, A>(
        &self,
        script: &Script,
        keys: K,
        args: A,
    ) -> Result<Frame, Error>
    where
        K: IntoIterator,
        K::Item: ToArg,
        A: IntoIterator,
        A::Item: ToArg,
    {
        let keys: Vec<Bytes> = keys.into_iter().map(|key| key.to_arg()).collect();
        let args: Vec<Bytes> = args.into_iter().map(|arg| arg.to_arg()).collect();

        let evalsha = EvalSha {
            sha1: script.hash().to_string(),
            keys: keys.clone(),
            args: args.clone(),
        };
        match self.run(evalsha).await? {
            Frame::Error(msg) if msg.starts_with("NOSCRIPT") => {
                debug!(hash = script.hash(), "Script not cached, sending its source");
                self.run(Eval {
                    script: script.code().clone(),
                    keys,
                    args,
                })
                .await
            }
            reply => Ok(reply),
        }
    }

    async fn send(&self, command: &Command) -> Result<Frame, Error> {
        if self.is_closed() {
            return Err(Error::Closed);
        }

        let response = match self.inner.transport.submit(command) {
            // Refused before anything was written, so the command can go out on the new
            // connection.
            Err(Error::ConnectionLost) => {
                self.recover().await?;
                debug!(command = %command, "Submitting after reconnect");
                self.inner.transport.submit(command)?
            }
            response => response?,
        };

        match self.wait(response).await {
            // The command was on the wire and may have been applied. Reconnect for later
            // requests, but leave resending to the caller.
            Err(Error::ConnectionLost) => {
                self.recover().await?;
                Err(Error::ConnectionLost)
            }
            result => result,
        }
    }

    async fn wait(&self, response: ResponseFuture) -> Result<Frame, Error> {
        match self.inner.config.request_timeout {
            Some(duration) => timeout(duration, response)
                .await
                .map_err(|_| Error::Timeout(duration))?,
            None => response.await,
        }
    }

    #[instrument(skip(self))]
    async fn recover(&self) -> Result<(), Error> {
        let _guard = self.inner.reconnect.lock().await;
        if self.is_closed() {
            return Err(Error::Closed);
        }
        if self.inner.transport.is_connected() {
            return Ok(());
        }

        let config = self.config();
        let mut last: Option<ConnectError> = None;

        for attempt in 0..config.max_reconnect_attempts {
            sleep(config.reconnect_backoff.delay(attempt)).await;
            if self.is_closed() {
                return Err(Error::Closed);
            }

            match self.inner.transport.reconnect(&config).await {
                Ok(()) => {
                    info!(attempt, "Reconnected");
                    return Ok(());
                }
                Err(err) => {
                    warn!(attempt, "Reconnect failed: {}", err);
                    last = Some(err);
                }
            }
        }

        Err(last.map_or(Error::ConnectionLost, Error::Connect))
    }
}
