//! The contract between the supervisor and the service it runs.

use std::future::Future;

use crate::lifecycle::shutdown::DeathWatch;

/// A long-running background service driven by a [`Supervisor`].
///
/// The supervisor calls `init`, `start` and `stop` in that order, each at
/// most once. The service may stop itself at any time after `start` by
/// firing the notification returned from `dying`.
///
/// [`Supervisor`]: crate::lifecycle::Supervisor
pub trait Service: Send {
    /// Error returned from `init` and `stop`.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Acquire the resources the service needs (sockets, storage handles).
    fn init(&mut self) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Begin background work. Must not block.
    ///
    /// Startup failures are reported through the death notification.
    fn start(&mut self);

    /// Notification that fires once the service decides to stop on its own.
    fn dying(&self) -> DeathWatch;

    /// Shut the service down and report whether it stopped cleanly.
    fn stop(&mut self) -> impl Future<Output = Result<(), Self::Error>> + Send;
}
