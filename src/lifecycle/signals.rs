//! OS signal handling.
//!
//! # Responsibilities
//! - Register handlers for SIGINT, SIGQUIT and SIGTERM
//! - Translate delivered signals into [`TerminationSignal`]
//!
//! # Design Decisions
//! - Uses Tokio's signal handling (async-safe)
//! - Handlers are registered up front; a signal delivered before anyone
//!   waits is buffered by Tokio and observed by the next `recv`
//! - All other signals keep their default disposition

use std::fmt;
use tokio::sync::mpsc;

/// A process-level request to terminate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TerminationSignal {
    /// SIGINT (Ctrl-C).
    Interrupt,
    /// SIGQUIT.
    Quit,
    /// SIGTERM.
    Terminate,
}

impl fmt::Display for TerminationSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TerminationSignal::Interrupt => "interrupt",
            TerminationSignal::Quit => "quit",
            TerminationSignal::Terminate => "terminated",
        };
        f.write_str(name)
    }
}

/// A source of termination requests.
pub trait SignalSource: Send {
    /// Wait for the next termination request.
    ///
    /// `None` means this source will never produce another one.
    fn recv(&mut self) -> impl std::future::Future<Output = Option<TerminationSignal>> + Send;
}

impl SignalSource for mpsc::Receiver<TerminationSignal> {
    async fn recv(&mut self) -> Option<TerminationSignal> {
        mpsc::Receiver::recv(self).await
    }
}

/// Termination signals delivered by the operating system.
#[cfg(unix)]
#[derive(Debug)]
pub struct OsSignals {
    sigint: tokio::signal::unix::Signal,
    sigquit: tokio::signal::unix::Signal,
    sigterm: tokio::signal::unix::Signal,
}

#[cfg(unix)]
impl OsSignals {
    /// Install handlers for SIGINT, SIGQUIT and SIGTERM.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn register() -> std::io::Result<Self> {
        use tokio::signal::unix::{signal, SignalKind};

        let sigint = signal(SignalKind::interrupt())?;
        let sigquit = signal(SignalKind::quit())?;
        let sigterm = signal(SignalKind::terminate())?;

        tracing::debug!("Signal handlers installed for SIGINT, SIGQUIT, SIGTERM");
        Ok(Self {
            sigint,
            sigquit,
            sigterm,
        })
    }
}

#[cfg(unix)]
impl SignalSource for OsSignals {
    async fn recv(&mut self) -> Option<TerminationSignal> {
        tokio::select! {
            Some(()) = self.sigint.recv() => Some(TerminationSignal::Interrupt),
            Some(()) = self.sigquit.recv() => Some(TerminationSignal::Quit),
            Some(()) = self.sigterm.recv() => Some(TerminationSignal::Terminate),
            else => None,
        }
    }
}

/// Termination signals delivered by the operating system.
///
/// Only Ctrl-C is observable on this platform.
#[cfg(not(unix))]
#[derive(Debug)]
pub struct OsSignals {
    _private: (),
}

#[cfg(not(unix))]
impl OsSignals {
    /// Prepare to listen for Ctrl-C.
    pub fn register() -> std::io::Result<Self> {
        Ok(Self { _private: () })
    }
}

#[cfg(not(unix))]
impl SignalSource for OsSignals {
    async fn recv(&mut self) -> Option<TerminationSignal> {
        match tokio::signal::ctrl_c().await {
            Ok(()) => Some(TerminationSignal::Interrupt),
            Err(e) => {
                tracing::error!(error = %e, "Ctrl-C listener failed");
                None
            }
        }
    }
}
