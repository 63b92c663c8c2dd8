use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::task::{Context, Poll};
use std::time::Instant;

use bytes::{Buf, BytesMut};
use futures::ready;
use tokio::runtime::Handle;
use tokio::sync::{oneshot, Notify};
use tracing::{debug, error, instrument, trace, warn};

use crate::codec::RespCodec;
use crate::command::Command;
use crate::connection::{Connection, ConnectionHandle, ConnectionReader, ConnectionState, ConnectionWriter};
use crate::error::{ParseError, ParseErrorKind};
use crate::frame::Frame;
use crate::Error;

const READ_CHUNK: usize = 16 * 1024;

/// Multiplexes concurrent requests over one connection.
///
/// Every submitted command is encoded into a shared outbound buffer and gets a slot at the tail
/// of the pending queue, both under the same lock, so the order bytes hit the wire is the order
/// slots are queued. A writer task drains the outbound buffer and a reader task resolves the
/// head of the pending queue with each decoded reply.
///
/// Once the connection fails, every pending request fails and so does every later `submit`,
/// until [`Dispatcher::reset`] wires a new connection in.
pub struct Dispatcher {
    shared: Arc<Shared>,
}

struct Shared {
    state: Mutex<State>,
    codec: RespCodec,
    runtime: Handle,
}

struct State {
    // Bumped on every reset. Loops of an older generation stop touching the state.
    generation: u64,
    status: Status,
    pending: VecDeque<Request>,
    outbound: BytesMut,
    connection: Option<ConnectionHandle>,
    wake: Arc<Notify>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Status {
    Running,
    Failed,
    Closed,
}

struct Request {
    tx: oneshot::Sender<Result<Frame, Error>>,
    submitted_at: Instant,
}

/// Why the current connection was given up.
#[derive(Debug)]
enum Failure {
    Lost,
    Parse(ParseError),
}

impl Failure {
    fn to_error(&self) -> Error {
        match self {
            Failure::Lost => Error::ConnectionLost,
            Failure::Parse(err) => Error::Parse(err.clone()),
        }
    }
}

impl Dispatcher {
    /// Takes over `connection` and spawns its reader and writer tasks on the current runtime.
    ///
    /// # Panics
    ///
    /// Panics when called outside of a Tokio runtime.
    pub fn new(connection: Connection) -> Dispatcher {
        let codec = connection.codec();
        let shared = Arc::new(Shared {
            state: Mutex::new(State {
                generation: 0,
                status: Status::Running,
                pending: VecDeque::new(),
                outbound: BytesMut::new(),
                connection: None,
                wake: Arc::new(Notify::new()),
            }),
            codec,
            runtime: Handle::current(),
        });

        let (generation, wake) = {
            let mut state = shared.lock();
            state.connection = Some(connection.handle());
            (state.generation, state.wake.clone())
        };
        shared.spawn_loops(generation, wake, connection);

        Dispatcher { shared }
    }

    /// Queues `command` and returns a future resolving with its reply.
    ///
    /// Fails immediately with [`Error::ConnectionLost`] once the connection failed and with
    /// [`Error::Closed`] once the dispatcher was closed. An encoding error leaves nothing queued.
    pub fn submit(&self, command: &Command) -> Result<ResponseFuture, Error> {
        let mut state = self.shared.lock();
        match state.status {
            Status::Running => {}
            Status::Failed => return Err(Error::ConnectionLost),
            Status::Closed => return Err(Error::Closed),
        }

        self.shared.codec.encode_command(command, &mut state.outbound)?;

        let (tx, rx) = oneshot::channel();
        state.pending.push_back(Request {
            tx,
            submitted_at: Instant::now(),
        });
        state.wake.notify_one();

        trace!(command = %command, pending = state.pending.len(), "Request queued");
        Ok(ResponseFuture { rx })
    }

    /// Replaces the connection. Requests still pending on the old one fail with
    /// [`Error::ConnectionLost`].
    #[instrument(skip_all, fields(connection_id = %connection.id()))]
    pub fn reset(&self, mut connection: Connection) -> Result<(), Error> {
        let (generation, wake, stale, old) = {
            let mut state = self.shared.lock();
            if state.status == Status::Closed {
                drop(state);
                connection.close();
                return Err(Error::Closed);
            }

            state.generation += 1;
            state.status = Status::Running;
            state.outbound.clear();
            state.wake = Arc::new(Notify::new());
            let old = state.connection.replace(connection.handle());
            let stale: Vec<_> = state.pending.drain(..).collect();
            (state.generation, state.wake.clone(), stale, old)
        };

        if let Some(old) = old {
            old.close();
        }
        for request in stale {
            let _ = request.tx.send(Err(Error::ConnectionLost));
        }

        debug!(generation, "Dispatcher reset");
        self.shared.spawn_loops(generation, wake, connection);
        Ok(())
    }

    /// Closes the connection and fails every pending request with [`Error::Closed`]. Idempotent.
    pub fn close(&self) {
        let (pending, connection) = {
            let mut state = self.shared.lock();
            if state.status == Status::Closed {
                return;
            }
            state.status = Status::Closed;
            state.outbound.clear();
            state.wake.notify_one();
            (
                state.pending.drain(..).collect::<Vec<_>>(),
                state.connection.take(),
            )
        };

        if let Some(connection) = connection {
            connection.close();
        }
        for request in pending {
            let _ = request.tx.send(Err(Error::Closed));
        }
        debug!("Dispatcher closed");
    }

    pub fn is_connected(&self) -> bool {
        let state = self.shared.lock();
        state.status == Status::Running
            && state
                .connection
                .as_ref()
                .map_or(false, |connection| !connection.is_closed())
    }

    pub fn state(&self) -> ConnectionState {
        let state = self.shared.lock();
        match (&state.status, &state.connection) {
            (Status::Closed, _) | (_, None) => ConnectionState::Closed,
            (Status::Failed, _) => ConnectionState::Disconnected,
            (Status::Running, Some(connection)) => connection.state(),
        }
    }

    /// Number of requests waiting for a reply.
    pub fn pending_len(&self) -> usize {
        self.shared.lock().pending.len()
    }
}

impl Drop for Dispatcher {
    fn drop(&mut self) {
        self.close();
    }
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn spawn_loops(self: &Arc<Self>, generation: u64, wake: Arc<Notify>, connection: Connection) {
        let (reader, writer) = connection.into_split();
        self.runtime
            .spawn(write_loop(self.clone(), generation, wake, writer));
        self.runtime.spawn(read_loop(self.clone(), generation, reader));
    }

    fn is_current(&self, generation: u64) -> bool {
        let state = self.lock();
        state.generation == generation && state.status == Status::Running
    }

    /// Hands `frame` to the oldest pending request. Returns `false` when this generation is
    /// stale and the reader should stop.
    fn resolve(&self, generation: u64, frame: Frame) -> Result<bool, ParseError> {
        let request = {
            let mut state = self.lock();
            if state.generation != generation || state.status != Status::Running {
                return Ok(false);
            }
            match state.pending.pop_front() {
                Some(request) => request,
                None => return Err(ParseError::new(0, ParseErrorKind::UnsolicitedReply)),
            }
        };

        let elapsed = request.submitted_at.elapsed();
        if request.tx.send(Ok(frame)).is_err() {
            // The caller stopped waiting, the reply is dropped.
            trace!(?elapsed, "Discarded reply of an abandoned request");
        } else {
            trace!(?elapsed, "Request resolved");
        }
        Ok(true)
    }

    /// Gives up on the connection of `generation`: closes it and fails everything pending.
    fn fail(&self, generation: u64, failure: Failure) {
        let (pending, connection) = {
            let mut state = self.lock();
            if state.generation != generation || state.status != Status::Running {
                return;
            }
            state.status = Status::Failed;
            state.outbound.clear();
            (
                state.pending.drain(..).collect::<Vec<_>>(),
                state.connection.clone(),
            )
        };

        match &failure {
            Failure::Lost => warn!(pending = pending.len(), "Connection lost"),
            Failure::Parse(err) => error!(pending = pending.len(), "Protocol error: {}", err),
        }

        if let Some(connection) = connection {
            connection.close();
        }
        for request in pending {
            let _ = request.tx.send(Err(failure.to_error()));
        }
    }
}

async fn write_loop(
    shared: Arc<Shared>,
    generation: u64,
    wake: Arc<Notify>,
    mut writer: ConnectionWriter,
) {
    let connection = writer.handle().clone();

    loop {
        let bytes = {
            let mut state = shared.lock();
            if state.generation != generation || state.status != Status::Running {
                return;
            }
            state.outbound.split().freeze()
        };

        if bytes.is_empty() {
            tokio::select! {
                _ = wake.notified() => continue,
                _ = connection.closed() => {
                    shared.fail(generation, Failure::Lost);
                    return;
                }
            }
        }

        trace!(len = bytes.len(), "Writing outbound buffer");
        if let Err(err) = writer.write(&bytes).await {
            debug!("Write failed: {}", err);
            shared.fail(generation, Failure::Lost);
            return;
        }
    }
}

async fn read_loop(shared: Arc<Shared>, generation: u64, mut reader: ConnectionReader) {
    let mut buffer = reader.take_buffer();

    loop {
        loop {
            match shared.codec.decode_frame(&buffer) {
                Ok(Some((frame, consumed))) => {
                    buffer.advance(consumed);
                    match shared.resolve(generation, frame) {
                        Ok(true) => {}
                        Ok(false) => return,
                        Err(err) => {
                            shared.fail(generation, Failure::Parse(err));
                            return;
                        }
                    }
                }
                Ok(None) => break,
                Err(err) => {
                    shared.fail(generation, Failure::Parse(err));
                    return;
                }
            }
        }

        if !shared.is_current(generation) {
            return;
        }

        match reader.read_some(READ_CHUNK).await {
            Ok(Some(bytes)) => buffer.extend_from_slice(&bytes),
            Ok(None) => {
                debug!("Server closed the connection");
                shared.fail(generation, Failure::Lost);
                return;
            }
            Err(err) => {
                debug!("Read failed: {}", err);
                shared.fail(generation, Failure::Lost);
                return;
            }
        }
    }
}

/// Resolves with the reply to one submitted command.
///
/// Dropping it does not withdraw the command: it was already queued for the wire, so its reply
/// is still read and then discarded.
#[must_use = "futures do nothing unless you `.await` or poll them"]
pub struct ResponseFuture {
    rx: oneshot::Receiver<Result<Frame, Error>>,
}

impl Future for ResponseFuture {
    type Output = Result<Frame, Error>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match ready!(Pin::new(&mut self.rx).poll(cx)) {
            Ok(result) => Poll::Ready(result),
            // Every request is resolved before its sender goes away, unless the dispatcher's
            // tasks died with the runtime.
            Err(_) => Poll::Ready(Err(Error::ConnectionLost)),
        }
    }
}
