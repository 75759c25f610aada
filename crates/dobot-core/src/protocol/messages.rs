//! Dobot Link protocol message model.
//!
//! Every frame on the wire carries one JSON object.  The only field the
//! protocol requires is `msg`, the message type tag; everything else depends
//! on the type and is optional.  Unknown fields are kept as-is so a message
//! survives a decode/encode cycle unchanged.
//!
//! # Message vocabulary (client perspective)
//!
//! | Direction       | Type                  | Fields                          |
//! |-----------------|-----------------------|---------------------------------|
//! | server → client | `START_REQ`           | `active`, `reason?`             |
//! | server → client | `CONTROL_REQ`         | `control`                       |
//! | server → client | `STATUS_REQ`          | –                               |
//! | client → server | `CLIENT_IDENTIFY_REQ` | `client_name`                   |
//! | client → server | `START_RES`           | `active_status`                 |
//! | client → server | `CONTROL_RES`         | `reason?`, `control_status`     |
//! | client → server | `STATUS_RES`          | `battery`                       |

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ── Protocol constants ────────────────────────────────────────────────────────

/// Size of the little-endian length prefix in front of every payload.
pub const LENGTH_PREFIX_SIZE: usize = 4;

/// Largest payload (in bytes) a peer may declare: 100 KiB.
pub const MAX_PAYLOAD_LEN: usize = 100 * 1024;

// ── Message type tags ─────────────────────────────────────────────────────────

/// Values carried in the `msg` field.
pub mod msg_type {
    pub const CLIENT_IDENTIFY_REQ: &str = "CLIENT_IDENTIFY_REQ";
    pub const START_REQ: &str = "START_REQ";
    pub const START_RES: &str = "START_RES";
    pub const CONTROL_REQ: &str = "CONTROL_REQ";
    pub const CONTROL_RES: &str = "CONTROL_RES";
    pub const STATUS_REQ: &str = "STATUS_REQ";
    pub const STATUS_RES: &str = "STATUS_RES";
}

/// Field names used by the vocabulary.
pub mod field {
    pub const MSG: &str = "msg";
    pub const REASON: &str = "reason";
    pub const CLIENT_NAME: &str = "client_name";
    pub const ACTIVE: &str = "active";
    pub const ACTIVE_STATUS: &str = "active_status";
    pub const CONTROL: &str = "control";
    pub const CONTROL_STATUS: &str = "control_status";
    pub const BATTERY: &str = "battery";
}

// ── Message ───────────────────────────────────────────────────────────────────

/// One protocol event: a JSON object with a `msg` type tag.
///
/// Serializes transparently as the underlying object, so
/// `serde_json::to_vec(&message)` produces exactly the wire payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Message(Map<String, Value>);

impl Message {
    /// Creates a message containing only the `msg` tag.
    pub fn new(msg_type: &str) -> Self {
        let mut fields = Map::new();
        fields.insert(field::MSG.to_string(), Value::String(msg_type.to_string()));
        Self(fields)
    }

    /// Adds or replaces a field, builder style.
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.0.insert(key.to_string(), value.into());
        self
    }

    /// `CLIENT_IDENTIFY_REQ{client_name}` – first message after connecting.
    pub fn client_identify(client_name: &str) -> Self {
        Self::new(msg_type::CLIENT_IDENTIFY_REQ).with(field::CLIENT_NAME, client_name)
    }

    /// `START_RES{active_status}` – acknowledgement of a start request.
    pub fn start_response(active_status: bool) -> Self {
        Self::new(msg_type::START_RES).with(field::ACTIVE_STATUS, active_status)
    }

    /// `CONTROL_RES{reason?, control_status}` – park/drive progress or result.
    pub fn control_response(reason: Option<&str>, control_status: bool) -> Self {
        let msg = Self::new(msg_type::CONTROL_RES);
        let msg = match reason {
            Some(reason) => msg.with(field::REASON, reason),
            None => msg,
        };
        msg.with(field::CONTROL_STATUS, control_status)
    }

    /// `STATUS_RES{battery}` – battery level in `[0.0, 1.0]`.
    pub fn status_response(battery: f64) -> Self {
        Self::new(msg_type::STATUS_RES).with(field::BATTERY, battery)
    }

    /// The `msg` tag, or `""` when the field is missing or not a string.
    pub fn msg_type(&self) -> &str {
        self.0.get(field::MSG).and_then(Value::as_str).unwrap_or("")
    }

    /// Returns a field by name.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// The optional `reason` text; empty strings count as absent.
    pub fn reason(&self) -> Option<&str> {
        self.0
            .get(field::REASON)
            .and_then(Value::as_str)
            .filter(|r| !r.is_empty())
    }

    /// Evaluates a field for truthiness; absent fields are falsy.
    ///
    /// See [`is_truthy`] for the rules.
    pub fn flag(&self, key: &str) -> bool {
        self.0.get(key).map(is_truthy).unwrap_or(false)
    }

    /// Returns a field as a boolean only when it is a JSON boolean.
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.0.get(key).and_then(Value::as_bool)
    }

    /// Returns a field as a float only when it is a JSON number.
    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.0.get(key).and_then(Value::as_f64)
    }

    /// Borrows the underlying JSON object.
    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Consumes the message, returning the underlying JSON object.
    pub fn into_fields(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for Message {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

/// JSON truthiness used for request flags such as `active` and `control`.
///
/// `false`, `null`, `0`, `""`, `[]` and `{}` are falsy; everything else is
/// truthy, so a flag sent as `1` or `"yes"` counts as set.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

// ── Inbound request view ──────────────────────────────────────────────────────

/// Typed classification of a message received from the server.
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    /// `START_REQ`: begin the start-up motion when `active` is truthy.
    Start {
        active: bool,
        reason: Option<String>,
    },
    /// `CONTROL_REQ`: park when `control` is truthy, drive out otherwise.
    Control { control: bool },
    /// `STATUS_REQ`: report the battery level.
    Status,
    /// Any other `msg` value, including a missing tag.
    Unrecognized {
        msg_type: String,
        reason: Option<String>,
    },
}

impl From<&Message> for Request {
    fn from(msg: &Message) -> Self {
        match msg.msg_type() {
            msg_type::START_REQ => Request::Start {
                active: msg.flag(field::ACTIVE),
                reason: msg.reason().map(str::to_string),
            },
            msg_type::CONTROL_REQ => Request::Control {
                control: msg.flag(field::CONTROL),
            },
            msg_type::STATUS_REQ => Request::Status,
            other => Request::Unrecognized {
                msg_type: other.to_string(),
                reason: msg.reason().map(str::to_string),
            },
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
