//! Integration tests for a full client session over real TCP.
//!
//! # Purpose
//!
//! These tests run `SessionSupervisor::run` against a fake control server
//! bound to an ephemeral localhost port, the same way the binary runs it.
//! They verify:
//!
//! - The client identifies itself before anything else.
//! - Each request type produces the documented replies, in order.
//! - Motion sequences reach the actuator with the exact calls expected.
//! - The session ends cleanly when the server hangs up.
//! - An unreachable server is reported as a connect error.
//!
//! ```text
//! Fake server                          Client
//! ───────────                          ──────
//! accept()                       ←──   connect
//!                                ←──   CLIENT_IDENTIFY_REQ{client_name}
//! START_REQ{active: true}        ──→
//!                                ←──   START_RES{active_status: true}
//! CONTROL_REQ{control: true}     ──→
//!                                ←──   CONTROL_RES{reason: "parking", control_status: false}
//!                                ←──   CONTROL_RES{control_status: true}
//! close                          ──→   session ends
//! ```

use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;

use dobot_client::application::execute_sequence::ExecutorConfig;
use dobot_client::infrastructure::actuator::mock::MockActuator;
use dobot_client::infrastructure::sensor::fixed::FixedVoltageSensor;
use dobot_client::supervisor::{SessionError, SessionSupervisor, SupervisorConfig};
use dobot_core::{encode_message, read_message, Message};
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};

const TEST_TIMEOUT: Duration = Duration::from_secs(10);

fn config_for(port: u16) -> SupervisorConfig {
    SupervisorConfig {
        host: "127.0.0.1".to_string(),
        port,
        connect_timeout: Duration::from_secs(2),
        client_name: "DOBOT".to_string(),
        executor: ExecutorConfig {
            poll_interval: Duration::from_millis(5),
        },
        shutdown_grace: Duration::from_millis(10),
    }
}

async fn send(stream: &mut TcpStream, msg: Message) {
    let frame = encode_message(&msg).expect("encode");
    stream.write_all(&frame).await.expect("write");
}

async fn recv(stream: &mut TcpStream) -> Message {
    tokio::time::timeout(TEST_TIMEOUT, read_message(stream))
        .await
        .expect("reply within timeout")
        .expect("valid frame")
}

/// Binds a fake server and returns it with its port.
async fn fake_server() -> (TcpListener, u16) {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let port = listener.local_addr().expect("addr").port();
    (listener, port)
}

// ── Session lifecycle tests ───────────────────────────────────────────────────

/// Drives a start request, a park request and a status request through one
/// session, then hangs up.
#[tokio::test]
async fn test_full_session_start_park_status_then_server_close() {
    // Arrange
    let (listener, port) = fake_server().await;
    let actuator = Arc::new(MockActuator::new());
    let sensor = Arc::new(FixedVoltageSensor::new(12.0));
    let supervisor = SessionSupervisor::new(
        config_for(port),
        Some(actuator.clone()),
        Some(sensor.clone()),
    );

    let server = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.expect("accept");
        let mut replies = Vec::new();

        // Identification comes first, before any request.
        replies.push(recv(&mut stream).await);

        send(&mut stream, Message::new("START_REQ").with("active", true)).await;
        replies.push(recv(&mut stream).await);

        send(&mut stream, Message::new("CONTROL_REQ").with("control", true)).await;
        replies.push(recv(&mut stream).await);
        replies.push(recv(&mut stream).await);

        send(&mut stream, Message::new("STATUS_REQ")).await;
        replies.push(recv(&mut stream).await);

        replies
    });

    // Act
    let summary = tokio::time::timeout(
        TEST_TIMEOUT,
        supervisor.run(Arc::new(AtomicBool::new(true))),
    )
    .await
    .expect("session must end once the server closes")
    .expect("connect must succeed");

    // Assert
    let replies = server.await.expect("server task");
    assert_eq!(replies[0], Message::client_identify("DOBOT"));
    assert_eq!(replies[1], Message::start_response(true));
    assert_eq!(replies[2], Message::control_response(Some("parking"), false));
    assert_eq!(replies[3], Message::control_response(None, true));
    assert_eq!(replies[4], Message::status_response(0.5));

    assert_eq!(summary.messages_received, 3);
    assert_eq!(summary.commands_executed, 2, "start and park sequences");
    assert_eq!(
        actuator.call_names(),
        vec![
            // start
            "reset_odometry",
            "move_to",
            "rotate",
            "reset_odometry",
            "move_to",
            // park
            "move_to",
            "rotate",
            "reset_odometry",
            "move_to",
        ]
    );
}

/// Replies to requests arriving mid-sequence do not wait for the robot.
#[tokio::test]
async fn test_requests_answered_while_park_sequence_runs() {
    // Arrange – each actuator call takes 200 ms; the sensor is broken
    let (listener, port) = fake_server().await;
    let actuator = Arc::new(MockActuator::with_step_delay(Duration::from_millis(200)));
    let sensor = Arc::new(FixedVoltageSensor::failing("no answer from robot"));
    let supervisor = SessionSupervisor::new(
        config_for(port),
        Some(actuator.clone()),
        Some(sensor),
    );

    let server = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.expect("accept");
        let _identify = recv(&mut stream).await;

        send(&mut stream, Message::new("CONTROL_REQ").with("control", true)).await;
        let mut replies = vec![recv(&mut stream).await];

        // The park sequence is now moving; ask for status and a start.
        send(&mut stream, Message::new("STATUS_REQ")).await;
        send(&mut stream, Message::new("START_REQ").with("active", true)).await;
        for _ in 0..3 {
            replies.push(recv(&mut stream).await);
        }
        replies
    });

    // Act
    tokio::time::timeout(TEST_TIMEOUT, supervisor.run(Arc::new(AtomicBool::new(true))))
        .await
        .expect("session must end")
        .expect("connect");

    // Assert – both replies overtake the park result
    let replies = server.await.expect("server task");
    assert_eq!(replies[0], Message::control_response(Some("parking"), false));
    assert_eq!(replies[1], Message::status_response(0.8), "failed read reports fallback");
    assert_eq!(replies[2], Message::start_response(true));
    assert_eq!(replies[3], Message::control_response(None, true));
}

/// A drive-out request announces itself and sends nothing afterwards.
#[tokio::test]
async fn test_drive_out_sends_only_announcement() {
    // Arrange
    let (listener, port) = fake_server().await;
    let actuator = Arc::new(MockActuator::new());
    let supervisor = SessionSupervisor::new(config_for(port), Some(actuator.clone()), None);

    let server = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.expect("accept");
        let _identify = recv(&mut stream).await;
        send(&mut stream, Message::new("CONTROL_REQ").with("control", false)).await;
        let announce = recv(&mut stream).await;

        // A status round-trip proves nothing else was queued on the wire.
        send(&mut stream, Message::new("STATUS_REQ")).await;
        let next = recv(&mut stream).await;
        (announce, next)
    });

    // Act
    tokio::time::timeout(TEST_TIMEOUT, supervisor.run(Arc::new(AtomicBool::new(true))))
        .await
        .expect("session must end")
        .expect("connect");

    // Assert
    let (announce, next) = server.await.expect("server task");
    assert_eq!(announce, Message::control_response(Some("driving out"), true));
    assert_eq!(next.msg_type(), "STATUS_RES");
    assert_eq!(
        actuator.call_names(),
        vec!["move_to", "rotate", "reset_odometry", "set_auto_trace"]
    );
}

/// Without an actuator a park request is refused with a single failure report.
#[tokio::test]
async fn test_park_without_actuator_reports_failure() {
    let (listener, port) = fake_server().await;
    let supervisor = SessionSupervisor::new(config_for(port), None, None);

    let server = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.expect("accept");
        let _identify = recv(&mut stream).await;
        send(&mut stream, Message::new("CONTROL_REQ").with("control", 1)).await;
        recv(&mut stream).await
    });

    let summary = tokio::time::timeout(TEST_TIMEOUT, supervisor.run(Arc::new(AtomicBool::new(true))))
        .await
        .expect("session must end")
        .expect("connect");

    assert_eq!(server.await.expect("server task"), Message::control_response(None, false));
    assert_eq!(summary.commands_executed, 1);
}

/// A frame with an out-of-range length ends the session.
#[tokio::test]
async fn test_invalid_frame_ends_session() {
    let (listener, port) = fake_server().await;
    let supervisor = SessionSupervisor::new(config_for(port), None, None);

    let server = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.expect("accept");
        let _identify = recv(&mut stream).await;
        stream
            .write_all(&(200 * 1024u32).to_le_bytes())
            .await
            .expect("write");
        // Keep the socket open; the client must leave on its own.
        tokio::time::sleep(TEST_TIMEOUT).await;
    });

    let summary = tokio::time::timeout(TEST_TIMEOUT, supervisor.run(Arc::new(AtomicBool::new(true))))
        .await
        .expect("protocol violation must end the session")
        .expect("connect");

    assert_eq!(summary.messages_received, 0);
    server.abort();
}

// ── Connection error tests ────────────────────────────────────────────────────

#[tokio::test]
async fn test_unreachable_server_is_connect_error() {
    // Arrange: bind then release a port so nothing listens on it.
    let (listener, port) = fake_server().await;
    drop(listener);
    let supervisor = SessionSupervisor::new(config_for(port), None, None);

    // Act
    let result = supervisor.run(Arc::new(AtomicBool::new(true))).await;

    // Assert
    let err = result.expect_err("connect must fail");
    assert!(matches!(err, SessionError::Connect(_)));
    assert!(err.to_string().contains("refused"), "got: {err}");
}
