//! Reads whole frames from an async byte stream.
//!
//! TCP delivers a byte stream, not messages: one `read` may return half a
//! length prefix, or the tail of one frame and the start of the next.
//! [`read_message`] uses `read_exact` for both the prefix and the payload, so
//! partial reads are accumulated until the frame is complete.
//!
//! Outcomes map onto three cases:
//!
//! - `Ok(message)` – a complete, valid frame.
//! - [`ReadError::EndOfStream`] – the peer closed the stream before the
//!   prefix or the declared payload was complete.
//! - [`ReadError::Protocol`] – bad length, bad UTF-8, or bad JSON.  The
//!   stream is no longer in a known position and must not be read again.

use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::protocol::codec::{decode_payload, parse_length_prefix, ProtocolError};
use crate::protocol::messages::{Message, LENGTH_PREFIX_SIZE};

/// Why [`read_message`] did not produce a message.
#[derive(Debug, Error)]
pub enum ReadError {
    /// The stream closed before a complete frame arrived.
    #[error("stream closed")]
    EndOfStream,

    /// The frame violated the protocol.
    #[error("protocol violation: {0}")]
    Protocol(#[from] ProtocolError),

    /// The underlying stream failed.
    #[error("stream I/O error: {0}")]
    Io(std::io::Error),
}

impl From<std::io::Error> for ReadError {
    fn from(e: std::io::Error) -> Self {
        if e.kind() == std::io::ErrorKind::UnexpectedEof {
            ReadError::EndOfStream
        } else {
            ReadError::Io(e)
        }
    }
}

/// Reads exactly one frame from `reader` and decodes it.
///
/// Blocks (asynchronously) until the whole frame has arrived; no timeout is
/// applied.
///
/// # Errors
///
/// See [`ReadError`].
pub async fn read_message<R>(reader: &mut R) -> Result<Message, ReadError>
where
    R: AsyncRead + Unpin + ?Sized,
{
    let mut prefix = [0u8; LENGTH_PREFIX_SIZE];
    reader.read_exact(&mut prefix).await?;

    let payload_len = parse_length_prefix(prefix)?;

    let mut payload = vec![0u8; payload_len];
    reader.read_exact(&mut payload).await?;

    Ok(decode_payload(&payload)?)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
