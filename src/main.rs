//! Daemon supervisor.
//!
//! Starts the status daemon, waits for SIGINT, SIGQUIT, SIGTERM or for the
//! daemon to stop itself, then shuts it down and exits.
//!
//! ```text
//! setup_logging (best effort)
//!     → Supervisor::new(Daemon::new())
//!     → init → start → wait for first of {signal, death} → stop
//!     → exit 0, or `error: <message>` on stderr and exit 1
//! ```

use std::process::ExitCode;

use daemon_supervisor::daemon::DaemonError;
use daemon_supervisor::lifecycle::{Exit, OsSignals, Supervisor, SupervisorError, Termination};
use daemon_supervisor::observability::{setup_logging, LoggingConfig};
use daemon_supervisor::Daemon;

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(e) = LoggingConfig::from_env().and_then(|config| setup_logging(&config)) {
        eprintln!("WARNING: failed to activate logging: {}", e);
    }

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "daemon-supervisor starting");

    Exit::from_outcome(&run().await).report()
}

async fn run() -> Result<Termination, SupervisorError<DaemonError>> {
    let signals = OsSignals::register().map_err(SupervisorError::Signals)?;
    Supervisor::new(Daemon::new()).run(signals).await
}
