//! Reference daemon supervised by the binary.
//!
//! # Responsibilities
//! - Resolve configuration and bind the listening socket (Initialize)
//! - Run the accept loop in a background task (Start)
//! - Fire the death notification when the accept loop fails
//! - Tear down the loop and drain connections (Stop)
//!
//! # Design Decisions
//! - One `Shutdown` trigger serves as both the death notification and the
//!   stop request; whichever fires first ends the accept loop
//! - Running out of descriptors or memory is retried with a capped backoff;
//!   only other accept errors kill the daemon
//! - The accept loop's error is held by its task and surfaced by Stop
//! - If Stop fails nothing beyond dropping the listener is cleaned up

pub mod status;

use std::net::SocketAddr;
use std::time::Instant;

use thiserror::Error;
use tokio::task::JoinHandle;

use crate::config::{load_from_env, validate_config, ConfigError, DaemonConfig};
use crate::daemon::status::StatusLine;
use crate::lifecycle::{DeathWatch, Service, Shutdown};
use crate::net::{AcceptBackoff, Acceptor, ConnectionTracker, Listener, ListenerError};

/// Errors raised by the daemon.
#[derive(Debug, Error)]
pub enum DaemonError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Listener(#[from] ListenerError),

    #[error("daemon started before it was initialized")]
    NotInitialized,

    #[error("daemon task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// A small TCP status daemon.
///
/// Every accepted connection receives one status line and is closed.
/// `A` is what Initialize binds; the binary uses a TCP [`Listener`].
pub struct Daemon<A = Listener> {
    config: Option<DaemonConfig>,
    listener: Option<A>,
    local_addr: Option<SocketAddr>,
    shutdown: Shutdown,
    tracker: ConnectionTracker,
    task: Option<JoinHandle<Result<(), DaemonError>>>,
}

impl Daemon {
    /// Create a daemon that reads its configuration during `init`.
    pub fn new() -> Self {
        Self::configured(None)
    }

    /// Create a daemon with an explicit configuration.
    pub fn with_config(config: DaemonConfig) -> Self {
        Self::configured(Some(config))
    }
}

impl<A: Acceptor> Daemon<A> {
    /// Create a daemon accepting through `A`.
    ///
    /// With `None` the configuration is read from the environment in `init`.
    pub fn configured(config: Option<DaemonConfig>) -> Self {
        Self {
            config,
            listener: None,
            local_addr: None,
            shutdown: Shutdown::new(),
            tracker: ConnectionTracker::new(),
            task: None,
        }
    }

    /// Address the listener is bound to, once initialized.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }

    /// Number of connections currently being served.
    pub fn active_connections(&self) -> u64 {
        self.tracker.active_count()
    }

    /// Whether the daemon has died or been told to stop.
    pub fn is_dying(&self) -> bool {
        self.shutdown.is_triggered()
    }
}

impl Default for Daemon {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: Acceptor> Service for Daemon<A> {
    type Error = DaemonError;

    async fn init(&mut self) -> Result<(), DaemonError> {
        let config = match self.config.take() {
            Some(config) => {
                validate_config(&config).map_err(ConfigError::Validation)?;
                config
            }
            None => load_from_env()?,
        };

        let listener = A::bind(&config.listener).await?;
        self.local_addr = listener.local_addr().ok();
        self.listener = Some(listener);

        tracing::info!(
            name = %config.service.name,
            address = ?self.local_addr,
            "Daemon initialized"
        );
        self.config = Some(config);
        Ok(())
    }

    fn start(&mut self) {
        if self.task.is_some() {
            tracing::warn!("Daemon already started");
            return;
        }

        let (listener, config) = match (self.listener.take(), self.config.as_ref()) {
            (Some(listener), Some(config)) => (listener, config),
            _ => {
                tracing::error!("Daemon started before it was initialized");
                self.shutdown.trigger();
                self.task = Some(tokio::spawn(async { Err(DaemonError::NotInitialized) }));
                return;
            }
        };

        let status_line = StatusLine::new(&config.service.name, Instant::now());
        let shutdown = self.shutdown.clone();
        let tracker = self.tracker.clone();
        self.task = Some(tokio::spawn(accept_loop(listener, shutdown, tracker, status_line)));
    }

    fn dying(&self) -> DeathWatch {
        self.shutdown.watch()
    }

    async fn stop(&mut self) -> Result<(), DaemonError> {
        if self.shutdown.trigger() {
            tracing::debug!("Stop requested");
        }

        let Some(task) = self.task.take() else {
            tracing::debug!("Daemon was never started");
            return Ok(());
        };

        let served = task.await?;
        self.tracker.wait_idle().await;
        tracing::info!("Daemon stopped");
        served
    }
}

async fn accept_loop<A: Acceptor>(
    listener: A,
    shutdown: Shutdown,
    tracker: ConnectionTracker,
    status_line: StatusLine,
) -> Result<(), DaemonError> {
    let stopped = shutdown.watch().wait();
    tokio::pin!(stopped);
    let mut backoff = AcceptBackoff::new();

    loop {
        let accepted = tokio::select! {
            () = &mut stopped => {
                tracing::debug!("Accept loop received shutdown");
                return Ok(());
            }
            accepted = listener.accept() => accepted,
        };

        match accepted {
            Ok((stream, peer, permit)) => {
                backoff.reset();
                let guard = tracker.track();
                let line = status_line.render();
                tokio::spawn(async move {
                    let _permit = permit;
                    if let Err(e) = status::write_line(stream, &line).await {
                        tracing::debug!(
                            connection_id = %guard.id(),
                            peer = %peer,
                            error = %e,
                            "Status write failed"
                        );
                    }
                    drop(guard);
                });
            }
            Err(e) if e.is_transient() => {
                tracing::warn!(error = %e, "Transient accept error");
            }
            Err(e) if e.is_resource_exhaustion() => {
                let delay = backoff.next_delay();
                tracing::warn!(error = %e, retry_in = ?delay, "Accept starved of resources");
                tokio::select! {
                    () = &mut stopped => {
                        tracing::debug!("Accept loop received shutdown during backoff");
                        return Ok(());
                    }
                    () = tokio::time::sleep(delay) => {}
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "Accept loop failed, daemon dying");
                shutdown.trigger();
                return Err(e.into());
            }
        }
    }
}
