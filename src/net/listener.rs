//! TCP listener implementation with backpressure.
//!
//! # Responsibilities
//! - Bind to the configured address
//! - Accept incoming TCP connections
//! - Enforce max_connections limit via semaphore
//! - Classify accept errors (per-connection, resource exhaustion, fatal)

use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use thiserror::Error;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Semaphore;

use crate::config::ListenerConfig;

/// Error type for listener operations.
#[derive(Debug, Error)]
pub enum ListenerError {
    /// Failed to bind to address.
    #[error("cannot listen on {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: io::Error,
    },

    /// Failed to accept connection.
    #[error("cannot accept connection: {0}")]
    Accept(#[source] io::Error),
}

impl ListenerError {
    /// Whether the error only affects a single connection attempt.
    pub fn is_transient(&self) -> bool {
        match self {
            ListenerError::Accept(e) => matches!(
                e.kind(),
                io::ErrorKind::ConnectionAborted
                    | io::ErrorKind::ConnectionReset
                    | io::ErrorKind::Interrupted
                    | io::ErrorKind::WouldBlock
            ),
            _ => false,
        }
    }

    /// Whether accept failed because the process or system ran out of
    /// descriptors, buffers or memory. Retrying later may succeed.
    pub fn is_resource_exhaustion(&self) -> bool {
        match self {
            ListenerError::Accept(e) => is_exhausted(e),
            _ => false,
        }
    }
}

#[cfg(unix)]
fn is_exhausted(e: &io::Error) -> bool {
    e.kind() == io::ErrorKind::OutOfMemory
        || matches!(
            e.raw_os_error(),
            Some(libc::EMFILE) | Some(libc::ENFILE) | Some(libc::ENOBUFS) | Some(libc::ENOMEM)
        )
}

#[cfg(not(unix))]
fn is_exhausted(e: &io::Error) -> bool {
    e.kind() == io::ErrorKind::OutOfMemory
}

/// An accepted connection: the stream, the peer address and its slot.
pub type Accepted = (TcpStream, SocketAddr, ConnectionPermit);

/// Something the daemon can bind during Initialize and accept from.
pub trait Acceptor: Sized + Send + Sync + 'static {
    /// Bind according to the listener configuration.
    fn bind(config: &ListenerConfig) -> impl Future<Output = Result<Self, ListenerError>> + Send;

    /// Wait for the next connection.
    fn accept(&self) -> impl Future<Output = Result<Accepted, ListenerError>> + Send;

    /// Address the acceptor is bound to.
    fn local_addr(&self) -> io::Result<SocketAddr>;
}

/// A bounded TCP listener that limits concurrent connections.
///
/// Uses a semaphore to enforce `max_connections`. When the limit is reached,
/// new connections will wait until a slot becomes available.
#[derive(Debug)]
pub struct Listener {
    /// The underlying TCP listener.
    inner: TcpListener,
    /// Semaphore to limit concurrent connections.
    connection_limit: Arc<Semaphore>,
    /// Configured maximum connections.
    max_connections: usize,
}

impl Listener {
    /// Bind to the configured address with connection limits.
    pub async fn bind(config: &ListenerConfig) -> Result<Self, ListenerError> {
        let bind_error = |source: io::Error| ListenerError::Bind {
            address: config.bind_address.clone(),
            source,
        };

        let addr: SocketAddr = config
            .bind_address
            .parse()
            .map_err(|e| bind_error(io::Error::new(io::ErrorKind::InvalidInput, e)))?;

        let listener = TcpListener::bind(addr).await.map_err(bind_error)?;
        let local_addr = listener.local_addr().map_err(bind_error)?;

        tracing::info!(
            address = %local_addr,
            max_connections = config.max_connections,
            "Listener bound"
        );

        Ok(Self {
            inner: listener,
            connection_limit: Arc::new(Semaphore::new(config.max_connections)),
            max_connections: config.max_connections,
        })
    }

    /// Accept a new connection, respecting the connection limit.
    ///
    /// This will wait if the connection limit has been reached.
    /// Returns the stream and a permit that must be held for the connection's lifetime.
    pub async fn accept(&self) -> Result<Accepted, ListenerError> {
        // Acquire permit first (backpressure)
        let permit = self
            .connection_limit
            .clone()
            .acquire_owned()
            .await
            .expect("connection semaphore is never closed");

        // Then accept the connection
        let (stream, addr) = self.inner.accept().await.map_err(ListenerError::Accept)?;

        tracing::debug!(
            peer_addr = %addr,
            available_permits = self.connection_limit.available_permits(),
            "Connection accepted"
        );

        Ok((stream, addr, ConnectionPermit { _permit: permit }))
    }

    /// Get the local address this listener is bound to.
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.inner.local_addr()
    }

    /// Get current available connection slots.
    pub fn available_permits(&self) -> usize {
        self.connection_limit.available_permits()
    }

    /// Get configured maximum connections.
    pub fn max_connections(&self) -> usize {
        self.max_connections
    }
}

impl Acceptor for Listener {
    async fn bind(config: &ListenerConfig) -> Result<Self, ListenerError> {
        Listener::bind(config).await
    }

    async fn accept(&self) -> Result<Accepted, ListenerError> {
        Listener::accept(self).await
    }

    fn local_addr(&self) -> io::Result<SocketAddr> {
        Listener::local_addr(self)
    }
}

/// A permit representing a connection slot.
///
/// When dropped, the connection slot is released back to the listener.
/// This keeps backpressure intact even if the connection handler panics.
#[derive(Debug)]
pub struct ConnectionPermit {
    _permit: tokio::sync::OwnedSemaphorePermit,
}
