//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Supervisor (supervisor.rs):
//!     Construct → Initialize → Start → AwaitTermination → Stop
//!
//! AwaitTermination:
//!     signals.rs  (SIGINT/SIGQUIT/SIGTERM) ──┐
//!                                            ├─ first event wins → Stop
//!     shutdown.rs (service death notice)  ───┘
//!
//! Exit (exit.rs):
//!     terminal outcome → exit status + `error: <message>` on stderr
//! ```
//!
//! # Design Decisions
//! - The supervisor is consumed by `run`, so Stop cannot be reached twice
//! - Initialize failure skips Start and Stop entirely
//! - Death notices are latched; a death before the wait is not missed
//! - No retries: every failure is terminal and left to the process manager

pub mod exit;
pub mod service;
pub mod shutdown;
pub mod signals;
pub mod supervisor;

pub use exit::Exit;
pub use service::Service;
pub use shutdown::{DeathWatch, Shutdown};
pub use signals::{OsSignals, SignalSource, TerminationSignal};
pub use supervisor::{await_termination, LifecycleState, Supervisor, SupervisorError, Termination};
