//! Session supervisor: owns one server session from connect to teardown.
//!
//! ```text
//! run()
//!  └─ TransportSession::connect()      -- connect + CLIENT_IDENTIFY_REQ
//!  └─ tokio::spawn(receive_loop)       -- read → MessageRouter → queue
//!  └─ ActuationExecutor::run()         -- on this task, until disconnect
//!  └─ teardown                         -- mark disconnected, grace sleep,
//!                                         abort receiver, disconnect
//! ```
//!
//! The session ends when the server closes the connection (the receive loop
//! marks the session disconnected and the executor notices at its next
//! poll), when a send fails, or when the `running` flag is cleared.  A
//! sequence already in progress always runs to completion first.
//!
//! The session is marked disconnected before the grace sleep, so requests
//! arriving during teardown are neither acknowledged nor answered.
//! Clearing `running` while still connecting abandons the connect attempt.
//!
//! There is no reconnect: one supervisor run is one session.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::time;
use tracing::{debug, info};

use crate::application::command_queue::command_queue;
use crate::application::dispatch_message::MessageRouter;
use crate::application::execute_sequence::{ActuationExecutor, Actuator, ExecutorConfig};
use crate::application::read_battery::{BatteryGauge, VoltageSensor};
use crate::infrastructure::network::{ConnectError, TransportSession};
use crate::infrastructure::storage::config::ClientConfig;

/// Errors that end a session before it starts.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("could not reach control server: {0}")]
    Connect(#[from] ConnectError),
    /// `running` was cleared before the connection was established.
    #[error("interrupted while connecting")]
    Interrupted,
}

/// Session parameters, usually derived from [`ClientConfig`].
#[derive(Debug, Clone)]
pub struct SupervisorConfig {
    pub host: String,
    pub port: u16,
    pub connect_timeout: Duration,
    pub client_name: String,
    pub executor: ExecutorConfig,
    /// Pause before the connection is closed at teardown.
    pub shutdown_grace: Duration,
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self::from(&ClientConfig::default())
    }
}

impl From<&ClientConfig> for SupervisorConfig {
    fn from(config: &ClientConfig) -> Self {
        Self {
            host: config.server.host.clone(),
            port: config.server.port,
            connect_timeout: config.server.connect_timeout(),
            client_name: config.client.name.clone(),
            executor: ExecutorConfig {
                poll_interval: config.executor.poll_interval(),
            },
            shutdown_grace: config.executor.shutdown_grace(),
        }
    }
}

/// What happened during one session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionSummary {
    pub messages_received: usize,
    pub commands_executed: usize,
}

/// Runs client sessions with a fixed set of robot capabilities.
pub struct SessionSupervisor {
    config: SupervisorConfig,
    actuator: Option<Arc<dyn Actuator>>,
    sensor: Option<Arc<dyn VoltageSensor>>,
}

impl SessionSupervisor {
    /// `None` capabilities mean no robot is attached: sequences are not run
    /// and battery levels are simulated.
    pub fn new(
        config: SupervisorConfig,
        actuator: Option<Arc<dyn Actuator>>,
        sensor: Option<Arc<dyn VoltageSensor>>,
    ) -> Self {
        Self {
            config,
            actuator,
            sensor,
        }
    }

    /// Connects, identifies and runs the session until it ends.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Connect`] if the server cannot be reached and
    /// [`SessionError::Interrupted`] if `running` is cleared first; nothing
    /// else is attempted in either case.
    pub async fn run(&self, running: Arc<AtomicBool>) -> Result<SessionSummary, SessionError> {
        let session = Arc::new(TransportSession::new());
        let connecting = session.connect(
            &self.config.host,
            self.config.port,
            self.config.connect_timeout,
            &self.config.client_name,
        );

        tokio::select! {
            biased;
            _ = wait_for_shutdown(&running, self.config.executor.poll_interval) => {
                info!("shutdown requested while connecting");
                session.disconnect().await;
                return Err(SessionError::Interrupted);
            }
            result = connecting => result?,
        }

        Ok(self.run_connected(session, running).await)
    }

    /// Runs the receive and execute loops on an already-connected session,
    /// then tears it down.
    pub async fn run_connected(
        &self,
        session: Arc<TransportSession>,
        running: Arc<AtomicBool>,
    ) -> SessionSummary {
        let (queue_tx, mut queue_rx) = command_queue();
        let received = Arc::new(AtomicUsize::new(0));

        let router = MessageRouter::new(
            session.clone(),
            queue_tx,
            BatteryGauge::new(self.sensor.clone()),
        );
        let receive_task = tokio::spawn(receive_loop(session.clone(), router, received.clone()));

        let executor = ActuationExecutor::new(
            self.actuator.clone(),
            session.clone(),
            self.config.executor.clone(),
        );
        info!("session running");
        let commands_executed = executor.run(&mut queue_rx, &running).await;

        // Teardown
        session.mark_disconnected();
        time::sleep(self.config.shutdown_grace).await;
        receive_task.abort();
        session.disconnect().await;

        let summary = SessionSummary {
            messages_received: received.load(Ordering::Relaxed),
            commands_executed,
        };
        info!(
            messages_received = summary.messages_received,
            commands_executed = summary.commands_executed,
            "session closed"
        );
        summary
    }
}

/// Resolves once `running` is cleared, checking every `poll_interval`.
async fn wait_for_shutdown(running: &AtomicBool, poll_interval: Duration) {
    while running.load(Ordering::Relaxed) {
        time::sleep(poll_interval).await;
    }
}

/// Reads and routes messages until the stream ends, then marks the session
/// disconnected so the executor stops.
async fn receive_loop(
    session: Arc<TransportSession>,
    router: MessageRouter,
    received: Arc<AtomicUsize>,
) {
    while let Some(msg) = session.receive().await {
        received.fetch_add(1, Ordering::Relaxed);
        let dispatch = router.handle(&msg).await;
        debug!(?dispatch, "message dispatched");
    }
    session.mark_disconnected();
    info!("receive loop ended");
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::actuator::mock::MockActuator;
    use dobot_core::{encode_message, read_message, Message};
    use tokio::io::{duplex, split, AsyncWriteExt};

    fn fast_config() -> SupervisorConfig {
        SupervisorConfig {
            executor: ExecutorConfig {
                poll_interval: Duration::from_millis(5),
            },
            shutdown_grace: Duration::from_millis(10),
            ..SupervisorConfig::default()
        }
    }

    #[test]
    fn test_supervisor_config_from_client_config() {
        // Arrange
        let mut client = ClientConfig::default();
        client.server.host = "10.0.0.5".into();
        client.executor.poll_interval_ms = 20;

        // Act
        let cfg = SupervisorConfig::from(&client);

        // Assert
        assert_eq!(cfg.host, "10.0.0.5");
        assert_eq!(cfg.port, 7000);
        assert_eq!(cfg.client_name, "DOBOT");
        assert_eq!(cfg.executor.poll_interval, Duration::from_millis(20));
        assert_eq!(cfg.shutdown_grace, Duration::from_millis(500));
    }

    #[tokio::test]
    async fn test_session_ends_when_server_closes() {
        // Arrange
        let (client, mut server) = duplex(4096);
        let (r, w) = split(client);
        let session = Arc::new(TransportSession::new());
        session.attach(r, w).await;
        let actuator = Arc::new(MockActuator::new());
        let supervisor = SessionSupervisor::new(fast_config(), Some(actuator.clone()), None);

        // Act – one park request, wait for its result, then hang up
        let server_task = tokio::spawn(async move {
            let frame = encode_message(&Message::new("CONTROL_REQ").with("control", true)).unwrap();
            server.write_all(&frame).await.unwrap();
            let announce = read_message(&mut server).await.unwrap();
            let result = read_message(&mut server).await.unwrap();
            drop(server);
            (announce, result)
        });
        let summary = supervisor
            .run_connected(session.clone(), Arc::new(AtomicBool::new(true)))
            .await;

        // Assert
        let (announce, result) = server_task.await.unwrap();
        assert_eq!(announce, Message::control_response(Some("parking"), false));
        assert_eq!(result, Message::control_response(None, true));
        assert_eq!(summary.messages_received, 1);
        assert_eq!(summary.commands_executed, 1);
        assert_eq!(actuator.call_names(), vec!["move_to", "rotate", "reset_odometry", "move_to"]);
        assert!(!session.is_connected());
    }

    #[tokio::test]
    async fn test_cleared_running_flag_stops_session() {
        // Arrange – the server stays silent
        let (client, _server) = duplex(4096);
        let (r, w) = split(client);
        let session = Arc::new(TransportSession::new());
        session.attach(r, w).await;
        let supervisor = SessionSupervisor::new(fast_config(), None, None);
        let running = Arc::new(AtomicBool::new(true));

        // Act
        let flag = running.clone();
        tokio::spawn(async move {
            time::sleep(Duration::from_millis(30)).await;
            flag.store(false, Ordering::Relaxed);
        });
        let summary = time::timeout(
            Duration::from_secs(5),
            supervisor.run_connected(session.clone(), running),
        )
        .await
        .expect("supervisor must stop after the flag is cleared");

        // Assert
        assert_eq!(summary, SessionSummary::default());
        assert!(!session.is_connected());
    }

    #[tokio::test]
    async fn test_requests_during_shutdown_grace_are_not_answered() {
        // Arrange – a long grace window with the server still connected
        let (client, mut server) = duplex(4096);
        let (r, w) = split(client);
        let session = Arc::new(TransportSession::new());
        session.attach(r, w).await;
        let actuator = Arc::new(MockActuator::new());
        let supervisor = SessionSupervisor::new(
            SupervisorConfig {
                shutdown_grace: Duration::from_millis(300),
                ..fast_config()
            },
            Some(actuator.clone()),
            None,
        );
        let running = Arc::new(AtomicBool::new(false));

        // Act – a start request lands inside the grace window
        let server_task = tokio::spawn(async move {
            time::sleep(Duration::from_millis(50)).await;
            let frame = encode_message(&Message::new("START_REQ").with("active", true)).unwrap();
            server.write_all(&frame).await.unwrap();
            time::timeout(Duration::from_secs(5), read_message(&mut server)).await
        });
        let summary = supervisor.run_connected(session.clone(), running).await;

        // Assert – the stream closes without any reply
        let reply = server_task.await.unwrap().expect("stream must close before timeout");
        assert!(reply.is_err(), "no reply expected during teardown, got {reply:?}");
        assert_eq!(summary.commands_executed, 0);
        assert!(actuator.calls().is_empty());
    }

    #[tokio::test]
    async fn test_cleared_running_flag_abandons_connect() {
        // Arrange – a live listener that would accept the connection
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let supervisor = SessionSupervisor::new(
            SupervisorConfig {
                host: "127.0.0.1".into(),
                port,
                ..fast_config()
            },
            None,
            None,
        );

        // Act
        let result = supervisor.run(Arc::new(AtomicBool::new(false))).await;

        // Assert
        assert!(matches!(result, Err(SessionError::Interrupted)), "got {result:?}");
    }

    #[tokio::test]
    async fn test_run_returns_connect_error_when_nothing_listens() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);
        let supervisor = SessionSupervisor::new(
            SupervisorConfig {
                host: "127.0.0.1".into(),
                port,
                ..fast_config()
            },
            None,
            None,
        );

        let result = supervisor.run(Arc::new(AtomicBool::new(true))).await;

        assert!(matches!(result, Err(SessionError::Connect(_))));
    }
}
