//! Supervision of a single service from construction to exit.

use std::fmt;

use thiserror::Error;

use crate::lifecycle::service::Service;
use crate::lifecycle::shutdown::DeathWatch;
use crate::lifecycle::signals::{SignalSource, TerminationSignal};

/// Terminal errors of a supervised run.
#[derive(Debug, Error)]
pub enum SupervisorError<E>
where
    E: std::error::Error + 'static,
{
    /// The service could not acquire its resources.
    #[error("{0}")]
    Init(#[source] E),

    /// The service did not shut down cleanly.
    #[error("{0}")]
    Stop(#[source] E),

    /// Termination signal handlers could not be installed.
    #[error("failed to install signal handlers: {0}")]
    Signals(#[source] std::io::Error),
}

/// What ended the running phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// The process received a termination signal.
    Signal(TerminationSignal),
    /// The service fired its own death notification.
    Died,
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Termination::Signal(sig) => write!(f, "{} signal", sig),
            Termination::Died => f.write_str("service death"),
        }
    }
}

/// Combined supervisor/service lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Constructed,
    Initialized,
    InitFailed,
    Running,
    Stopping,
    Stopped,
}

impl LifecycleState {
    /// Whether `next` directly follows `self`.
    pub fn can_transition_to(self, next: LifecycleState) -> bool {
        use LifecycleState::*;
        matches!(
            (self, next),
            (Constructed, Initialized)
                | (Constructed, InitFailed)
                | (Initialized, Running)
                | (Running, Stopping)
                | (Stopping, Stopped)
        )
    }

    /// Whether no further transitions are possible.
    pub fn is_terminal(self) -> bool {
        matches!(self, LifecycleState::Stopped | LifecycleState::InitFailed)
    }
}

/// Owns one service for the life of the process.
pub struct Supervisor<S> {
    service: S,
    state: LifecycleState,
}

impl<S: Service> Supervisor<S> {
    /// Take ownership of a freshly constructed service.
    pub fn new(service: S) -> Self {
        Self {
            service,
            state: LifecycleState::Constructed,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> LifecycleState {
        self.state
    }

    /// Drive the service through its whole lifecycle.
    ///
    /// Blocks between Start and Stop until either `signals` yields a
    /// termination request or the service fires its death notification.
    /// Stop runs exactly once whenever Initialize succeeded; its error, if
    /// any, is the result of the run.
    pub async fn run<Sig>(
        mut self,
        mut signals: Sig,
    ) -> Result<Termination, SupervisorError<S::Error>>
    where
        Sig: SignalSource,
    {
        if let Err(e) = self.service.init().await {
            self.advance(LifecycleState::InitFailed);
            tracing::error!(error = %e, "Service initialization failed");
            return Err(SupervisorError::Init(e));
        }
        self.advance(LifecycleState::Initialized);

        let dying = self.service.dying();
        self.service.start();
        self.advance(LifecycleState::Running);
        tracing::info!("Service running");

        let termination = await_termination(&mut signals, dying).await;
        match termination {
            Termination::Signal(sig) => tracing::info!(signal = %sig, "Exiting on {} signal.", sig),
            Termination::Died => tracing::info!("Service stopped itself"),
        }

        self.advance(LifecycleState::Stopping);
        let stopped = self.service.stop().await;
        self.advance(LifecycleState::Stopped);

        match stopped {
            Ok(()) => {
                tracing::info!(cause = %termination, "Service stopped");
                Ok(termination)
            }
            Err(e) => {
                tracing::error!(cause = %termination, error = %e, "Service stop failed");
                Err(SupervisorError::Stop(e))
            }
        }
    }

    fn advance(&mut self, next: LifecycleState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "invalid lifecycle transition {:?} -> {:?}",
            self.state,
            next
        );
        tracing::debug!(from = ?self.state, to = ?next, "Lifecycle transition");
        self.state = next;
    }
}

/// Wait for the first of a termination signal or a service death.
///
/// The losing branch is dropped. A signal source that closes without
/// firing leaves the death notification as the only trigger; if neither
/// ever fires this never returns.
pub async fn await_termination<Sig>(signals: &mut Sig, dying: DeathWatch) -> Termination
where
    Sig: SignalSource,
{
    let next_signal = async {
        match signals.recv().await {
            Some(sig) => sig,
            None => std::future::pending().await,
        }
    };

    tokio::select! {
        sig = next_signal => Termination::Signal(sig),
        () = dying.wait() => Termination::Died,
    }
}
