//! Dobot Link Client entry point.
//!
//! Loads configuration, initialises logging, selects the robot capabilities
//! and runs one server session.
//!
//! ```text
//! main()
//!  └─ load_config()               -- TOML file or defaults
//!  └─ tracing_subscriber          -- RUST_LOG, else [client] log_level
//!  └─ Ctrl-C listener             -- clears the running flag
//!  └─ SessionSupervisor::run()    -- until the server disconnects or Ctrl-C
//! ```
//!
//! With `[robot] simulate = true` the simulated actuator and voltage sensor
//! are injected; otherwise no robot is attached, motion requests are
//! refused and battery levels are simulated.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::Duration;

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use dobot_client::application::{execute_sequence::Actuator, read_battery::VoltageSensor};
use dobot_client::infrastructure::{
    actuator::mock::MockActuator,
    sensor::fixed::FixedVoltageSensor,
    storage::config::{config_file_path, load_config},
};
use dobot_client::supervisor::{SessionError, SessionSupervisor, SupervisorConfig};

/// Time each simulated motion step takes.
const SIMULATED_STEP_DELAY: Duration = Duration::from_millis(200);

/// Supply voltage reported by the simulated sensor.
const SIMULATED_VOLTAGE: f64 = 12.3;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = load_config().context("failed to load configuration")?;

    // Initialise structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.client.log_level)),
        )
        .init();

    info!("Dobot Link Client starting");
    match config_file_path() {
        Some(path) => info!("configuration: {}", path.display()),
        None => info!("configuration: built-in defaults"),
    }

    // ── Robot capabilities ────────────────────────────────────────────────────
    let (actuator, sensor): (Option<Arc<dyn Actuator>>, Option<Arc<dyn VoltageSensor>>) =
        if config.robot.simulate {
            info!("simulation mode: using simulated actuator and voltage sensor");
            (
                Some(Arc::new(MockActuator::with_step_delay(SIMULATED_STEP_DELAY))),
                Some(Arc::new(FixedVoltageSensor::new(SIMULATED_VOLTAGE))),
            )
        } else {
            warn!("no robot driver attached; motion sequences will not run");
            (None, None)
        };

    // ── Ctrl-C handler ────────────────────────────────────────────────────────
    let running = Arc::new(AtomicBool::new(true));
    let running_clone = Arc::clone(&running);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("shutdown signal received");
            running_clone.store(false, Ordering::Relaxed);
        }
    });

    let supervisor = SessionSupervisor::new(SupervisorConfig::from(&config), actuator, sensor);
    let summary = match supervisor.run(running).await {
        Ok(summary) => summary,
        Err(SessionError::Interrupted) => {
            info!("Dobot Link Client stopped before connecting");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    info!(
        messages_received = summary.messages_received,
        commands_executed = summary.commands_executed,
        "Dobot Link Client stopped"
    );
    Ok(())
}
