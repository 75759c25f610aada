//! Length-prefixed JSON codec for Dobot Link frames.
//!
//! Wire format:
//! ```text
//! [payload_len:4][payload:N]
//! ```
//! `payload_len` is a little-endian `u32` counting only the payload bytes
//! (the 4-byte prefix is excluded).  The payload is UTF-8 JSON text holding a
//! single object.  Valid lengths are `1..=MAX_PAYLOAD_LEN`.

use serde_json::Value;
use thiserror::Error;

use crate::protocol::messages::{Message, LENGTH_PREFIX_SIZE, MAX_PAYLOAD_LEN};

/// Errors that can occur during frame encoding or decoding.
#[derive(Debug, Error, PartialEq)]
pub enum ProtocolError {
    /// The byte slice is shorter than the frame it claims to hold.
    #[error("insufficient data: need at least {needed} bytes, got {available}")]
    InsufficientData { needed: usize, available: usize },

    /// The declared payload length is zero or above [`MAX_PAYLOAD_LEN`].
    #[error("invalid payload length {declared} (allowed 1..={})", MAX_PAYLOAD_LEN)]
    InvalidLength { declared: usize },

    /// The payload bytes are not valid UTF-8.
    #[error("payload is not valid UTF-8: {0}")]
    InvalidUtf8(String),

    /// The payload is UTF-8 but not parseable JSON.
    #[error("malformed JSON payload: {0}")]
    MalformedJson(String),

    /// The payload is JSON but not an object.
    #[error("payload must be a JSON object, got {0}")]
    NotAnObject(&'static str),

    /// The message could not be serialized.
    #[error("failed to serialize message: {0}")]
    Serialize(String),
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Encodes a [`Message`] into a complete frame (length prefix + JSON).
///
/// Non-ASCII text is written as raw UTF-8, not `\u` escapes.
///
/// # Errors
///
/// Returns [`ProtocolError::Serialize`] if serialization fails, which does
/// not happen for messages built from JSON values.
///
/// # Examples
///
/// ```rust
/// use dobot_core::protocol::{decode_message, encode_message, Message};
///
/// let msg = Message::start_response(true);
/// let bytes = encode_message(&msg).unwrap();
/// let (decoded, consumed) = decode_message(&bytes).unwrap();
/// assert_eq!(decoded, msg);
/// assert_eq!(consumed, bytes.len());
/// ```
pub fn encode_message(msg: &Message) -> Result<Vec<u8>, ProtocolError> {
    let payload = serde_json::to_vec(msg).map_err(|e| ProtocolError::Serialize(e.to_string()))?;
    let payload_len = payload.len() as u32;

    let mut buf = Vec::with_capacity(LENGTH_PREFIX_SIZE + payload.len());
    buf.extend_from_slice(&payload_len.to_le_bytes());
    buf.extend_from_slice(&payload);
    Ok(buf)
}

/// Parses and validates a 4-byte length prefix.
///
/// # Errors
///
/// Returns [`ProtocolError::InvalidLength`] for `0` or anything above
/// [`MAX_PAYLOAD_LEN`].
pub fn parse_length_prefix(prefix: [u8; LENGTH_PREFIX_SIZE]) -> Result<usize, ProtocolError> {
    let declared = u32::from_le_bytes(prefix) as usize;
    if declared == 0 || declared > MAX_PAYLOAD_LEN {
        return Err(ProtocolError::InvalidLength { declared });
    }
    Ok(declared)
}

/// Decodes a payload (without its prefix) into a [`Message`].
///
/// # Errors
///
/// Returns [`ProtocolError::InvalidUtf8`], [`ProtocolError::MalformedJson`]
/// or [`ProtocolError::NotAnObject`].
pub fn decode_payload(payload: &[u8]) -> Result<Message, ProtocolError> {
    let text =
        std::str::from_utf8(payload).map_err(|e| ProtocolError::InvalidUtf8(e.to_string()))?;
    let value: Value =
        serde_json::from_str(text).map_err(|e| ProtocolError::MalformedJson(e.to_string()))?;

    match value {
        Value::Object(fields) => Ok(Message::from(fields)),
        other => Err(ProtocolError::NotAnObject(json_kind(&other))),
    }
}

/// Decodes one frame from the beginning of `bytes`.
///
/// Returns the message and the number of bytes consumed (prefix + payload),
/// so the caller can advance a read cursor over a buffer holding several
/// frames.
///
/// # Errors
///
/// Returns [`ProtocolError::InsufficientData`] when the buffer ends before
/// the frame does, or any error from [`parse_length_prefix`] and
/// [`decode_payload`].
pub fn decode_message(bytes: &[u8]) -> Result<(Message, usize), ProtocolError> {
    if bytes.len() < LENGTH_PREFIX_SIZE {
        return Err(ProtocolError::InsufficientData {
            needed: LENGTH_PREFIX_SIZE,
            available: bytes.len(),
        });
    }

    let payload_len = parse_length_prefix([bytes[0], bytes[1], bytes[2], bytes[3]])?;

    let total_needed = LENGTH_PREFIX_SIZE + payload_len;
    if bytes.len() < total_needed {
        return Err(ProtocolError::InsufficientData {
            needed: total_needed,
            available: bytes.len(),
        });
    }

    let msg = decode_payload(&bytes[LENGTH_PREFIX_SIZE..total_needed])?;
    Ok((msg, total_needed))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
