use std::io;
use std::sync::{Arc, Mutex, PoisonError};

use bytes::{Bytes, BytesMut};
use strum_macros::Display;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, ReadHalf, WriteHalf};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_util::codec::Decoder;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, trace};
use uuid::Uuid;

use crate::codec::RespCodec;
use crate::command::Command;
use crate::commands::{Auth, ClientSetName, Executable, Select};
use crate::config::{Address, ClientConfig};
use crate::error::ConnectError;
use crate::frame::Frame;
use crate::tls;
use crate::Error;

/// Anything a connection can run over: TCP, TLS over TCP, a Unix socket or, in tests, an
/// in-memory duplex pipe.
pub trait Stream: AsyncRead + AsyncWrite + Send + Unpin {}

impl<T: AsyncRead + AsyncWrite + Send + Unpin> Stream for T {}

type BoxedStream = Box<dyn Stream>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Display)]
pub enum ConnectionState {
    /// The connection was lost and has not been replaced yet.
    Disconnected,
    Connecting,
    Ready,
    Closing,
    Closed,
}

/// One duplex byte stream to the server.
///
/// The connection can be split into a reader and a writer owned by different tasks. All parts
/// share a [`ConnectionHandle`]; closing through any of them fails every outstanding and future
/// read or write with [`Error::Closed`].
pub struct Connection {
    reader: ConnectionReader,
    writer: ConnectionWriter,
}

impl Connection {
    /// Wraps an established stream. The connection starts out `Ready`.
    pub fn new<S>(stream: S, codec: RespCodec) -> Connection
    where
        S: Stream + 'static,
    {
        let stream: BoxedStream = Box::new(stream);
        let (reader, writer) = tokio::io::split(stream);
        let handle = ConnectionHandle::new(Uuid::new_v4());

        Connection {
            reader: ConnectionReader {
                stream: reader,
                // Allocate the buffer with 4kb of capacity.
                buffer: BytesMut::with_capacity(4096),
                codec,
                handle: handle.clone(),
            },
            writer: ConnectionWriter {
                stream: writer,
                handle,
            },
        }
    }

    /// Opens the transport described by `config`, negotiates TLS when enabled and runs the
    /// handshake (`AUTH`, `SELECT`, `CLIENT SETNAME`). `connect_timeout` bounds all of it.
    #[instrument(name = "connect", skip(config), fields(address = %config.address()))]
    pub async fn connect(config: &ClientConfig) -> Result<Connection, ConnectError> {
        let establish = async {
            let stream = open(config).await?;
            let mut conn = Connection::new(stream, RespCodec::new(config.limits()));
            conn.handle().set_state(ConnectionState::Connecting);
            conn.handshake(config).await?;
            conn.handle().set_state(ConnectionState::Ready);
            Ok::<_, ConnectError>(conn)
        };

        let conn = match config.connect_timeout {
            Some(duration) => timeout(duration, establish)
                .await
                .map_err(|_| ConnectError::TimedOut(duration))??,
            None => establish.await?,
        };

        info!(connection_id = %conn.id(), "Connection established");
        Ok(conn)
    }

    async fn handshake(&mut self, config: &ClientConfig) -> Result<(), ConnectError> {
        if let Some(password) = &config.password {
            let auth = Auth {
                username: config.username.clone(),
                password: password.clone(),
            };
            match self.round_trip(auth.into_command()).await? {
                Frame::Error(msg) => return Err(ConnectError::AuthFailed(msg)),
                frame => debug!("AUTH replied {}", frame),
            }
        }

        if config.database != 0 {
            let select = Select {
                index: config.database,
            };
            if let Frame::Error(reason) = self.round_trip(select.into_command()).await? {
                return Err(ConnectError::Handshake {
                    command: "SELECT",
                    reason,
                });
            }
        }

        if let Some(name) = &config.client_name {
            let set_name = ClientSetName { name: name.clone() };
            if let Frame::Error(reason) = self.round_trip(set_name.into_command()).await? {
                return Err(ConnectError::Handshake {
                    command: "CLIENT SETNAME",
                    reason,
                });
            }
        }

        Ok(())
    }

    /// Sends one command and waits for its reply. Only valid while nothing else is in flight.
    async fn round_trip(&mut self, command: Command) -> Result<Frame, Error> {
        let mut bytes = BytesMut::new();
        self.reader.codec.encode_command(&command, &mut bytes)?;
        self.write(&bytes).await?;

        match self.read_frame().await? {
            Some(frame) => Ok(frame),
            None => Err(Error::ConnectionLost),
        }
    }

    pub fn id(&self) -> Uuid {
        self.writer.handle.id
    }

    pub fn handle(&self) -> ConnectionHandle {
        self.writer.handle.clone()
    }

    pub fn state(&self) -> ConnectionState {
        self.writer.handle.state()
    }

    pub fn codec(&self) -> RespCodec {
        self.reader.codec
    }

    pub async fn write(&mut self, bytes: &[u8]) -> Result<(), Error> {
        self.writer.write(bytes).await
    }

    pub async fn read_some(&mut self, max: usize) -> Result<Option<Bytes>, Error> {
        self.reader.read_some(max).await
    }

    pub async fn read_frame(&mut self) -> Result<Option<Frame>, Error> {
        self.reader.read_frame().await
    }

    /// Closes the connection and shuts down the write side of the stream, so the peer sees
    /// EOF. Idempotent. A split connection is closed through [`ConnectionHandle::close`]
    /// instead, and the stream goes away with its two halves.
    pub async fn close(&mut self) {
        self.writer.handle.close();
        if let Err(err) = self.writer.stream.shutdown().await {
            debug!(connection_id = %self.id(), "Shutdown failed: {}", err);
        }
    }

    pub fn into_split(self) -> (ConnectionReader, ConnectionWriter) {
        (self.reader, self.writer)
    }
}

async fn open(config: &ClientConfig) -> Result<BoxedStream, ConnectError> {
    match config.address() {
        Address::Tcp { host, port } => {
            let stream = TcpStream::connect((host.as_str(), port)).await?;
            stream.set_nodelay(true)?;

            if config.use_tls {
                Ok(Box::new(tls::connect(stream, &host).await?))
            } else {
                Ok(Box::new(stream))
            }
        }
        #[cfg(unix)]
        Address::Unix(path) => {
            let stream = tokio::net::UnixStream::connect(path).await?;
            Ok(Box::new(stream))
        }
        #[cfg(not(unix))]
        Address::Unix(_) => Err(ConnectError::Transport(io::Error::new(
            io::ErrorKind::Unsupported,
            "Unix domain sockets are not supported on this platform",
        ))),
    }
}

/// Shared view on a connection's lifecycle.
#[derive(Clone, Debug)]
pub struct ConnectionHandle {
    id: Uuid,
    state: Arc<Mutex<ConnectionState>>,
    closed: CancellationToken,
}

impl ConnectionHandle {
    fn new(id: Uuid) -> ConnectionHandle {
        ConnectionHandle {
            id,
            state: Arc::new(Mutex::new(ConnectionState::Ready)),
            closed: CancellationToken::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn state(&self) -> ConnectionState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_state(&self, state: ConnectionState) {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = state;
        trace!(connection_id = %self.id, %state, "Connection state changed");
    }

    /// Moves the connection to `Closed` and wakes every pending read or write, which then fail
    /// with [`Error::Closed`]. The stream itself is released once both halves are dropped.
    pub fn close(&self) {
        {
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            if *state == ConnectionState::Closed {
                return;
            }
            *state = ConnectionState::Closing;
        }

        self.closed.cancel();
        self.set_state(ConnectionState::Closed);
        debug!(connection_id = %self.id, "Connection closed");
    }

    pub fn is_closed(&self) -> bool {
        self.closed.is_cancelled()
    }

    /// Resolves once the connection has been closed.
    pub async fn closed(&self) {
        self.closed.cancelled().await
    }
}

pub struct ConnectionReader {
    stream: ReadHalf<BoxedStream>,
    // Data is read from the socket into the read buffer. When a frame is parsed, the corresponding
    // data is removed from the buffer.
    buffer: BytesMut,
    codec: RespCodec,
    handle: ConnectionHandle,
}

impl ConnectionReader {
    /// Reads whatever is available, up to `max` bytes. `None` means the peer closed the stream.
    /// A `max` of zero reads nothing and returns empty bytes.
    pub async fn read_some(&mut self, max: usize) -> Result<Option<Bytes>, Error> {
        if self.handle.is_closed() {
            return Err(Error::Closed);
        }
        if max == 0 {
            return Ok(Some(Bytes::new()));
        }

        let mut chunk = BytesMut::zeroed(max);

        let n = tokio::select! {
            biased;
            _ = self.handle.closed.cancelled() => return Err(Error::Closed),
            res = self.stream.read(&mut chunk) => res?,
        };

        if n == 0 {
            return Ok(None);
        }
        chunk.truncate(n);
        Ok(Some(chunk.freeze()))
    }

    /// Reads until one complete frame is buffered. `None` means the peer closed the stream
    /// cleanly between frames.
    pub async fn read_frame(&mut self) -> Result<Option<Frame>, Error> {
        loop {
            if let Some(frame) = self.codec.decode(&mut self.buffer)? {
                return Ok(Some(frame));
            }

            match self.read_some(4096).await? {
                Some(bytes) => self.buffer.extend_from_slice(&bytes),
                None if self.buffer.is_empty() => return Ok(None),
                None => {
                    return Err(Error::Io(io::Error::new(
                        io::ErrorKind::ConnectionReset,
                        "connection reset by peer",
                    )))
                }
            }
        }
    }

    /// Hands over bytes read past the last frame returned by `read_frame`.
    pub fn take_buffer(&mut self) -> BytesMut {
        self.buffer.split()
    }

    pub fn handle(&self) -> &ConnectionHandle {
        &self.handle
    }
}

pub struct ConnectionWriter {
    stream: WriteHalf<BoxedStream>,
    handle: ConnectionHandle,
}

impl ConnectionWriter {
    /// Writes all of `bytes`, retrying partial writes, then flushes.
    pub async fn write(&mut self, bytes: &[u8]) -> Result<(), Error> {
        let stream = &mut self.stream;
        let write = async move {
            stream.write_all(bytes).await?;
            stream.flush().await
        };

        tokio::select! {
            biased;
            _ = self.handle.closed.cancelled() => Err(Error::Closed),
            res = write => Ok(res?),
        }
    }

    pub fn handle(&self) -> &ConnectionHandle {
        &self.handle
    }
}
