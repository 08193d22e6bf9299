//! Daemon lifecycle supervisor library.

pub mod config;
pub mod daemon;
pub mod lifecycle;
pub mod net;
pub mod observability;

pub use config::schema::DaemonConfig;
pub use daemon::Daemon;
pub use lifecycle::{Service, Supervisor};
