//! The status daemon running under the supervisor.

use std::io;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use daemon_supervisor::config::{DaemonConfig, ListenerConfig};
use daemon_supervisor::daemon::DaemonError;
use daemon_supervisor::lifecycle::{
    Exit, Supervisor, SupervisorError, Termination, TerminationSignal,
};
use daemon_supervisor::net::{Accepted, Acceptor, ListenerError};
use daemon_supervisor::Daemon;
use tokio::io::AsyncReadExt;
use tokio::sync::mpsc;

mod common;

use common::{Call, Recorded};

fn config_on(addr: SocketAddr) -> DaemonConfig {
    let mut config = DaemonConfig::default();
    config.listener.bind_address = addr.to_string();
    config.listener.max_connections = 4;
    config.service.name = "statusd".into();
    config
}

/// Acceptor whose every accept fails with a permission error.
struct RevokedListener;

impl Acceptor for RevokedListener {
    async fn bind(_config: &ListenerConfig) -> Result<Self, ListenerError> {
        Ok(RevokedListener)
    }

    async fn accept(&self) -> Result<Accepted, ListenerError> {
        Err(ListenerError::Accept(io::Error::from(
            io::ErrorKind::PermissionDenied,
        )))
    }

    fn local_addr(&self) -> io::Result<SocketAddr> {
        Err(io::Error::from(io::ErrorKind::NotConnected))
    }
}

/// Accept calls made on any `StarvedListener`.
static STARVED_ACCEPTS: AtomicUsize = AtomicUsize::new(0);

/// Acceptor that runs out of file descriptors a few times, then idles.
struct StarvedListener;

impl Acceptor for StarvedListener {
    async fn bind(_config: &ListenerConfig) -> Result<Self, ListenerError> {
        Ok(StarvedListener)
    }

    async fn accept(&self) -> Result<Accepted, ListenerError> {
        if STARVED_ACCEPTS.fetch_add(1, Ordering::SeqCst) < 3 {
            Err(ListenerError::Accept(too_many_open_files()))
        } else {
            std::future::pending().await
        }
    }

    fn local_addr(&self) -> io::Result<SocketAddr> {
        Err(io::Error::from(io::ErrorKind::NotConnected))
    }
}

#[cfg(unix)]
fn too_many_open_files() -> io::Error {
    io::Error::from_raw_os_error(libc::EMFILE)
}

#[cfg(not(unix))]
fn too_many_open_files() -> io::Error {
    io::Error::from(io::ErrorKind::OutOfMemory)
}

#[tokio::test]
async fn serves_until_terminated() {
    let addr = common::free_addr();
    let (tx, rx) = mpsc::channel(1);
    let run = tokio::spawn(Supervisor::new(Daemon::with_config(config_on(addr))).run(rx));

    let mut stream = common::connect_with_retry(addr, Duration::from_secs(2)).await;
    let mut line = String::new();
    stream.read_to_string(&mut line).await.unwrap();
    assert!(line.starts_with("statusd "), "unexpected status {:?}", line);

    tx.send(TerminationSignal::Terminate).await.unwrap();
    let outcome = tokio::time::timeout(Duration::from_secs(2), run)
        .await
        .expect("daemon should stop after SIGTERM")
        .unwrap();

    assert_eq!(
        outcome.unwrap(),
        Termination::Signal(TerminationSignal::Terminate)
    );
    assert!(tokio::net::TcpStream::connect(addr).await.is_err());
}

#[tokio::test]
async fn bind_failure_is_init_error() {
    let taken = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = taken.local_addr().unwrap();
    let (_tx, rx) = mpsc::channel::<TerminationSignal>(1);

    let outcome = Supervisor::new(Daemon::with_config(config_on(addr))).run(rx).await;

    assert!(matches!(
        outcome,
        Err(SupervisorError::Init(DaemonError::Listener(_)))
    ));
    let exit = Exit::from_outcome(&outcome);
    assert_eq!(exit.code, 1);
    let message = exit.message.unwrap();
    assert!(message.starts_with("error: cannot listen on"), "{}", message);
}

#[tokio::test]
async fn fatal_accept_error_kills_daemon_and_fails_stop() {
    let addr = common::free_addr();
    let daemon = Recorded::new(Daemon::<RevokedListener>::configured(Some(config_on(addr))));
    let log = daemon.log();
    // The signal sender stays open: only the daemon's own death can end the wait.
    let (_tx, rx) = mpsc::channel::<TerminationSignal>(1);

    let outcome = tokio::time::timeout(Duration::from_secs(2), Supervisor::new(daemon).run(rx))
        .await
        .expect("daemon death should end the run");

    assert!(
        matches!(
            outcome,
            Err(SupervisorError::Stop(DaemonError::Listener(ListenerError::Accept(_))))
        ),
        "unexpected outcome {:?}",
        outcome
    );
    assert_eq!(log.calls(), vec![Call::Init, Call::Start, Call::Stop]);

    let exit = Exit::from_outcome(&outcome);
    assert_eq!(exit.code, 1);
    let message = exit.message.unwrap();
    assert!(message.starts_with("error: cannot accept connection"), "{}", message);
}

#[tokio::test]
async fn descriptor_exhaustion_is_retried_not_fatal() {
    let addr = common::free_addr();
    let daemon = Recorded::new(Daemon::<StarvedListener>::configured(Some(config_on(addr))));
    let log = daemon.log();
    let (tx, rx) = mpsc::channel(1);
    let run = tokio::spawn(Supervisor::new(daemon).run(rx));

    // Three exhausted accepts (5 + 10 + 20ms of backoff), then an idle one.
    let deadline = std::time::Instant::now() + Duration::from_secs(2);
    while STARVED_ACCEPTS.load(Ordering::SeqCst) < 4 {
        assert!(std::time::Instant::now() < deadline, "accept was not retried");
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(log.calls(), vec![Call::Init, Call::Start]);

    tx.send(TerminationSignal::Interrupt).await.unwrap();
    let outcome = tokio::time::timeout(Duration::from_secs(2), run)
        .await
        .expect("daemon should stop after SIGINT")
        .unwrap();

    assert_eq!(
        outcome.unwrap(),
        Termination::Signal(TerminationSignal::Interrupt)
    );
    assert_eq!(log.count(Call::Stop), 1);
}
