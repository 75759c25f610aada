//! Outbound message port.
//!
//! The router and the executor both reply to the server, from different
//! tasks.  They see the connection only through [`MessageSink`], which the
//! infrastructure `TransportSession` implements.

use async_trait::async_trait;
use dobot_core::Message;

/// Somewhere protocol messages can be sent.
///
/// Implementations must accept concurrent `send` calls and keep each frame
/// intact on the wire.
#[async_trait]
pub trait MessageSink: Send + Sync {
    /// Sends one message; returns `false` if it could not be delivered.
    ///
    /// A failed send is never fatal to the caller: the sink records the
    /// disconnection and later [`is_connected`](Self::is_connected) calls
    /// report it.
    async fn send(&self, msg: &Message) -> bool;

    /// Whether the underlying connection is still usable.
    fn is_connected(&self) -> bool;
}
