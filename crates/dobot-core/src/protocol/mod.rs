//! Protocol module containing the message model, the frame codec and the
//! async frame reader.

pub mod codec;
pub mod messages;
pub mod reader;

pub use codec::{decode_message, decode_payload, encode_message, ProtocolError};
pub use messages::*;
pub use reader::{read_message, ReadError};
