//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use daemon_supervisor::lifecycle::{DeathWatch, Service, Shutdown};
use thiserror::Error;

/// A lifecycle call observed by [`MockService`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Call {
    Init,
    Start,
    Stop,
}

#[derive(Debug, Error)]
#[error("{0}")]
pub struct MockError(pub String);

/// Shared record of lifecycle calls.
#[derive(Debug, Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<Call>>>);

impl CallLog {
    fn push(&self, call: Call) {
        self.0.lock().unwrap().push(call);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.0.lock().unwrap().clone()
    }

    pub fn count(&self, call: Call) -> usize {
        self.calls().iter().filter(|c| **c == call).count()
    }
}

/// A scriptable service that records every lifecycle call.
pub struct MockService {
    log: CallLog,
    shutdown: Shutdown,
    init_error: Option<String>,
    stop_error: Option<String>,
    die_on_start: bool,
    die_after: Option<Duration>,
}

impl MockService {
    pub fn new() -> Self {
        Self {
            log: CallLog::default(),
            shutdown: Shutdown::new(),
            init_error: None,
            stop_error: None,
            die_on_start: false,
            die_after: None,
        }
    }

    pub fn failing_init(mut self, message: &str) -> Self {
        self.init_error = Some(message.to_string());
        self
    }

    pub fn failing_stop(mut self, message: &str) -> Self {
        self.stop_error = Some(message.to_string());
        self
    }

    /// Fire the death notification synchronously inside `start`.
    pub fn dying_on_start(mut self) -> Self {
        self.die_on_start = true;
        self
    }

    /// Fire the death notification from a background task after `delay`.
    pub fn dying_after(mut self, delay: Duration) -> Self {
        self.die_after = Some(delay);
        self
    }

    pub fn log(&self) -> CallLog {
        self.log.clone()
    }
}

impl Service for MockService {
    type Error = MockError;

    async fn init(&mut self) -> Result<(), MockError> {
        self.log.push(Call::Init);
        match &self.init_error {
            Some(message) => Err(MockError(message.clone())),
            None => Ok(()),
        }
    }

    fn start(&mut self) {
        self.log.push(Call::Start);
        if self.die_on_start {
            self.shutdown.trigger();
        }
        if let Some(delay) = self.die_after {
            let shutdown = self.shutdown.clone();
            tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                shutdown.trigger();
            });
        }
    }

    fn dying(&self) -> DeathWatch {
        self.shutdown.watch()
    }

    async fn stop(&mut self) -> Result<(), MockError> {
        self.log.push(Call::Stop);
        self.shutdown.trigger();
        match &self.stop_error {
            Some(message) => Err(MockError(message.clone())),
            None => Ok(()),
        }
    }
}

/// Wraps a real service and records the lifecycle calls made on it.
pub struct Recorded<S> {
    inner: S,
    log: CallLog,
}

impl<S: Service> Recorded<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            log: CallLog::default(),
        }
    }

    pub fn log(&self) -> CallLog {
        self.log.clone()
    }
}

impl<S: Service> Service for Recorded<S> {
    type Error = S::Error;

    async fn init(&mut self) -> Result<(), S::Error> {
        self.log.push(Call::Init);
        self.inner.init().await
    }

    fn start(&mut self) {
        self.log.push(Call::Start);
        self.inner.start();
    }

    fn dying(&self) -> DeathWatch {
        self.inner.dying()
    }

    async fn stop(&mut self) -> Result<(), S::Error> {
        self.log.push(Call::Stop);
        self.inner.stop().await
    }
}

/// Reserve a loopback address that is free right now.
pub fn free_addr() -> SocketAddr {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap()
}

/// Connect to `addr`, retrying until it accepts or `deadline` passes.
pub async fn connect_with_retry(addr: SocketAddr, deadline: Duration) -> tokio::net::TcpStream {
    let start = std::time::Instant::now();
    loop {
        match tokio::net::TcpStream::connect(addr).await {
            Ok(stream) => return stream,
            Err(e) if start.elapsed() > deadline => panic!("{} never accepted: {}", addr, e),
            Err(_) => tokio::time::sleep(Duration::from_millis(20)).await,
        }
    }
}
