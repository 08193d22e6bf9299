//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming TCP connection
//!     → listener.rs (accept, connection limit)
//!     → connection.rs (lifecycle tracking)
//!     → handed to the daemon's connection handler
//!
//! Accept failure:
//!     per-connection       → log, accept again
//!     resource exhaustion  → backoff.rs (5ms doubling to 1s), accept again
//!     anything else        → fatal, daemon dies
//! ```
//!
//! # Design Decisions
//! - Bounded accept prevents resource exhaustion
//! - Each connection is tracked so Stop can wait for in-flight work

pub mod backoff;
pub mod connection;
pub mod listener;

pub use backoff::AcceptBackoff;
pub use connection::{ConnectionGuard, ConnectionId, ConnectionTracker};
pub use listener::{Accepted, Acceptor, ConnectionPermit, Listener, ListenerError};
