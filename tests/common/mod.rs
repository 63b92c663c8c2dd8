#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use bytes::Bytes;
use futures::StreamExt;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpListener;
use tokio_util::codec::FramedRead;

use bushka::codec::RespCodec;
use bushka::frame::Frame;

/// What the mock server does with one request.
pub enum Reply {
    Frame(Frame),
    /// Bytes written as is, valid RESP or not.
    Raw(&'static [u8]),
    /// Answer, then drop the connection.
    FrameThenClose(Frame),
    /// Swallow the request.
    Nothing,
    /// Drop the connection without answering.
    Close,
}

/// Answers with `Reply` for `(connection index, request arguments)`.
pub type Handler = dyn Fn(usize, &[Bytes]) -> Reply + Send + Sync;

/// A scripted RESP server on an ephemeral port.
pub struct MockServer {
    pub addr: SocketAddr,
    requests: Arc<Mutex<Vec<Vec<Bytes>>>>,
    connections: Arc<AtomicUsize>,
}

impl MockServer {
    pub async fn start<F>(handler: F) -> MockServer
    where
        F: Fn(usize, &[Bytes]) -> Reply + Send + Sync + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let requests = Arc::new(Mutex::new(vec![]));
        let connections = Arc::new(AtomicUsize::new(0));
        let handler: Arc<Handler> = Arc::new(handler);

        {
            let requests = requests.clone();
            let connections = connections.clone();
            tokio::spawn(async move {
                while let Ok((socket, _)) = listener.accept().await {
                    let index = connections.fetch_add(1, Ordering::SeqCst);
                    let handler = handler.clone();
                    let requests = requests.clone();

                    tokio::spawn(async move {
                        let (reader, mut writer) = socket.into_split();
                        let mut frames = FramedRead::new(reader, RespCodec::default());

                        while let Some(Ok(frame)) = frames.next().await {
                            let args = request_args(frame);
                            requests.lock().unwrap().push(args.clone());

                            let bytes = match handler(index, &args) {
                                Reply::Frame(frame) => frame.serialize(),
                                Reply::Raw(raw) => raw.to_vec(),
                                Reply::FrameThenClose(frame) => {
                                    let _ = writer.write_all(&frame.serialize()).await;
                                    return;
                                }
                                Reply::Nothing => continue,
                                Reply::Close => return,
                            };
                            if writer.write_all(&bytes).await.is_err() {
                                return;
                            }
                        }
                    });
                }
            });
        }

        MockServer {
            addr,
            requests,
            connections,
        }
    }

    /// A server answering like Redis for the handshake and PING, ECHO, GET, SET, INCR and DEL,
    /// keeping no state.
    pub async fn simple() -> MockServer {
        MockServer::start(|_, args| respond(args)).await
    }

    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    /// Every request received so far, across connections, as UTF-8 strings.
    pub fn requests(&self) -> Vec<Vec<String>> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|args| {
                args.iter()
                    .map(|arg| String::from_utf8_lossy(arg).into_owned())
                    .collect()
            })
            .collect()
    }

    pub fn connections(&self) -> usize {
        self.connections.load(Ordering::SeqCst)
    }
}

pub fn respond(args: &[Bytes]) -> Reply {
    let name = String::from_utf8_lossy(&args[0]).to_uppercase();
    let frame = match name.as_str() {
        "PING" => match args.get(1) {
            Some(payload) => Frame::Bulk(payload.clone()),
            None => Frame::Simple("PONG".to_string()),
        },
        "ECHO" => Frame::Bulk(args[1].clone()),
        "GET" => Frame::Null,
        "INCR" | "DEL" => Frame::Integer(1),
        "AUTH" | "SELECT" | "CLIENT" | "SET" => Frame::Simple("OK".to_string()),
        _ => Frame::Error(format!("ERR unknown command '{}'", name)),
    };
    Reply::Frame(frame)
}

pub fn arg(args: &[Bytes], index: usize) -> String {
    String::from_utf8_lossy(&args[index]).into_owned()
}

fn request_args(frame: Frame) -> Vec<Bytes> {
    match frame {
        Frame::Array(frames) => frames
            .into_iter()
            .map(|frame| match frame {
                Frame::Bulk(bytes) => bytes,
                other => panic!("request argument is not a bulk string: {:?}", other),
            })
            .collect(),
        other => panic!("request is not an array: {:?}", other),
    }
}
