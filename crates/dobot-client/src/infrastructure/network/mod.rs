//! Network infrastructure for the client application.
//!
//! [`TransportSession`] owns the single TCP connection to the control
//! server.
//!
//! Architecture:
//! - The stream is split into a read half and a write half.
//! - Only the receive task reads; [`TransportSession::receive`] decodes one
//!   frame at a time with [`dobot_core::read_message`].
//! - The router and the executor both write.  The write half sits behind an
//!   async mutex so concurrent frames never interleave.
//! - Any write failure marks the session disconnected; the receive loop does
//!   the same when the server closes the stream or breaks the protocol.
//!   There is no reconnect.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use dobot_core::{encode_message, read_message, Message, ReadError};
use thiserror::Error;
use tokio::{
    io::{AsyncRead, AsyncWrite, AsyncWriteExt},
    net::TcpStream,
    sync::Mutex,
    time,
};
use tracing::{debug, error, info, warn};

use crate::application::outbound::MessageSink;

/// Errors that can occur while connecting to the server.
#[derive(Debug, Error)]
pub enum ConnectError {
    /// Nothing is listening at the server address.
    #[error("connection to {addr} refused; is the control server running?")]
    Refused {
        addr: String,
        #[source]
        source: std::io::Error,
    },
    /// The server did not accept the connection in time.
    #[error("connection to {addr} timed out after {timeout:?}")]
    TimedOut { addr: String, timeout: Duration },
    /// Any other failure (name resolution, unreachable network, …).
    #[error("failed to connect to {addr}: {source}")]
    Io {
        addr: String,
        #[source]
        source: std::io::Error,
    },
}

type BoxedReader = Box<dyn AsyncRead + Send + Unpin>;
type BoxedWriter = Box<dyn AsyncWrite + Send + Unpin>;

/// The one live connection to the control server.
pub struct TransportSession {
    connected: AtomicBool,
    reader: Mutex<Option<BoxedReader>>,
    writer: Mutex<Option<BoxedWriter>>,
}

impl Default for TransportSession {
    fn default() -> Self {
        Self::new()
    }
}

impl TransportSession {
    /// Creates a session in the disconnected state.
    pub fn new() -> Self {
        Self {
            connected: AtomicBool::new(false),
            reader: Mutex::new(None),
            writer: Mutex::new(None),
        }
    }

    /// Connects to `host:port` and identifies as `client_name`.
    ///
    /// `timeout` bounds only the TCP connect; once established, reads and
    /// writes wait as long as the server takes.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectError`]; the session stays disconnected.
    pub async fn connect(
        &self,
        host: &str,
        port: u16,
        timeout: Duration,
        client_name: &str,
    ) -> Result<(), ConnectError> {
        let addr = format!("{host}:{port}");
        info!("connecting to control server at {addr}");

        let stream = match bounded_connect(&addr, timeout, TcpStream::connect((host, port))).await {
            Ok(stream) => stream,
            Err(e) => {
                self.mark_disconnected();
                return Err(e);
            }
        };

        if let Err(e) = stream.set_nodelay(true) {
            debug!("could not set TCP_NODELAY: {e}");
        }

        let (read_half, write_half) = stream.into_split();
        self.attach(read_half, write_half).await;
        info!("connected to control server at {addr}");

        if self.send(&Message::client_identify(client_name)).await {
            info!(client_name, "client identification sent");
        } else {
            warn!(client_name, "client identification could not be sent");
        }
        Ok(())
    }

    /// Installs an already-open stream and marks the session connected.
    pub async fn attach<R, W>(&self, reader: R, writer: W)
    where
        R: AsyncRead + Send + Unpin + 'static,
        W: AsyncWrite + Send + Unpin + 'static,
    {
        *self.reader.lock().await = Some(Box::new(reader));
        *self.writer.lock().await = Some(Box::new(writer));
        self.connected.store(true, Ordering::SeqCst);
    }

    /// Whether the session is currently usable.
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    /// Flags the session as disconnected without closing the stream.
    pub fn mark_disconnected(&self) {
        self.connected.store(false, Ordering::SeqCst);
    }

    /// Encodes and writes one frame.
    ///
    /// Returns `false` without writing if the session is not connected, and
    /// `false` after marking the session disconnected if the write fails.
    pub async fn send(&self, msg: &Message) -> bool {
        if !self.is_connected() {
            warn!(msg = msg.msg_type(), "send skipped: not connected to server");
            return false;
        }

        let frame = match encode_message(msg) {
            Ok(frame) => frame,
            Err(e) => {
                error!(msg = msg.msg_type(), "failed to encode message: {e}");
                return false;
            }
        };

        let mut guard = self.writer.lock().await;
        let Some(writer) = guard.as_mut() else {
            warn!(msg = msg.msg_type(), "send skipped: stream already closed");
            return false;
        };

        let result = async {
            writer.write_all(&frame).await?;
            writer.flush().await
        }
        .await;

        match result {
            Ok(()) => {
                debug!(msg = msg.msg_type(), bytes = frame.len(), "message sent");
                true
            }
            Err(e) => {
                error!(msg = msg.msg_type(), "send failed: {e}");
                self.mark_disconnected();
                false
            }
        }
    }

    /// Reads the next message from the server.
    ///
    /// Returns `None` when not connected, when the server closed the stream,
    /// when it sent an invalid frame, or on an I/O error.  In every case the
    /// caller should stop receiving.
    pub async fn receive(&self) -> Option<Message> {
        if !self.is_connected() {
            return None;
        }

        let mut guard = self.reader.lock().await;
        let reader = guard.as_mut()?;

        match read_message(reader).await {
            Ok(msg) => {
                debug!(msg = msg.msg_type(), "message received");
                Some(msg)
            }
            Err(ReadError::EndOfStream) => {
                info!("server closed the connection");
                None
            }
            Err(ReadError::Protocol(e)) => {
                error!("protocol violation from server: {e}");
                None
            }
            Err(ReadError::Io(e)) => {
                error!("receive failed: {e}");
                None
            }
        }
    }

    /// Closes the connection.  Safe to call any number of times.
    ///
    /// Close errors are ignored; the session always ends disconnected.
    pub async fn disconnect(&self) {
        self.mark_disconnected();

        if let Some(mut writer) = self.writer.lock().await.take() {
            if let Err(e) = writer.shutdown().await {
                debug!("error while closing stream (ignored): {e}");
            }
        }

        // The receive task may still hold the read half; it is dropped with
        // the task in that case.
        match self.reader.try_lock() {
            Ok(mut guard) => {
                guard.take();
            }
            Err(_) => debug!("read half still in use; left to the receive task"),
        }
    }
}

/// Awaits `connecting` for at most `timeout`, classifying the failure.
async fn bounded_connect<T, F>(addr: &str, timeout: Duration, connecting: F) -> Result<T, ConnectError>
where
    F: Future<Output = std::io::Result<T>>,
{
    match time::timeout(timeout, connecting).await {
        Ok(Ok(stream)) => Ok(stream),
        Ok(Err(source)) if source.kind() == std::io::ErrorKind::ConnectionRefused => {
            Err(ConnectError::Refused {
                addr: addr.to_string(),
                source,
            })
        }
        Ok(Err(source)) => Err(ConnectError::Io {
            addr: addr.to_string(),
            source,
        }),
        Err(_) => Err(ConnectError::TimedOut {
            addr: addr.to_string(),
            timeout,
        }),
    }
}

#[async_trait]
impl MessageSink for TransportSession {
    async fn send(&self, msg: &Message) -> bool {
        TransportSession::send(self, msg).await
    }

    fn is_connected(&self) -> bool {
        TransportSession::is_connected(self)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
