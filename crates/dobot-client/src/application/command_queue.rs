//! Hand-off queue between the receive task and the actuation executor.
//!
//! The receive task must never wait on the robot, so it pushes [`Command`]s
//! here and goes back to reading the socket.  The executor drains the queue
//! at its own pace.
//!
//! The queue is an unbounded Tokio `mpsc` channel split into a cloneable
//! [`CommandSender`] and a single [`CommandReceiver`].  Pushing never blocks;
//! popping never waits.

use dobot_core::Command;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Creates a connected sender/receiver pair.
pub fn command_queue() -> (CommandSender, CommandReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (CommandSender { tx }, CommandReceiver { rx })
}

/// Producer half, held by the message router.
#[derive(Clone)]
pub struct CommandSender {
    tx: mpsc::UnboundedSender<Command>,
}

impl CommandSender {
    /// Appends `command` to the queue.
    ///
    /// If the executor has already shut down the command is dropped with a
    /// warning; the caller is never blocked or failed.
    pub fn push(&self, command: Command) {
        debug!(sequence = %command.kind, "command queued");
        if let Err(mpsc::error::SendError(dropped)) = self.tx.send(command) {
            warn!(sequence = %dropped.kind, "executor is gone; command dropped");
        }
    }
}

/// Consumer half, owned by the actuation executor.
pub struct CommandReceiver {
    rx: mpsc::UnboundedReceiver<Command>,
}

impl CommandReceiver {
    /// Removes the oldest queued command, or returns `None` immediately if
    /// the queue is empty.
    pub fn try_pop(&mut self) -> Option<Command> {
        self.rx.try_recv().ok()
    }
}
