//! Contains the code that configures, builds and runs a [`Server`].

pub mod error;

use crate::auth::{Authenticator, InMemoryAuthenticator};
use crate::fs::PathResolver;
use crate::server::controlchan::{self, ControlParams};
use crate::server::shutdown;
use error::ServerError;

use slog::Drain;
use std::future::Future;
use std::ops::RangeInclusive;
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Semaphore;

const DEFAULT_GREETING: &str = "Welcome to the sandftp FTP server";
const DEFAULT_IDLE_SESSION_TIMEOUT_SECS: u64 = 60;
const DEFAULT_PASSIVE_PORTS: RangeInclusive<u16> = 49152..=65535;

/// An instance of an FTP server. It aggregates an
/// [`Authenticator`](crate::auth::Authenticator) implementation that will be
/// used for authentication and a sandbox root directory that all sessions
/// operate under.
///
/// The server can be started with the [`listen`](Server::listen) method.
///
/// # Example
///
/// ```no_run
/// use sandftp::Server;
///
/// #[tokio::main]
/// async fn main() {
///     let server = Server::with_root("/srv/ftp").build().unwrap();
///     server.listen("127.0.0.1:2121").await.unwrap();
/// }
/// ```
pub struct Server {
    greeting: &'static str,
    authenticator: Arc<dyn Authenticator>,
    resolver: Arc<PathResolver>,
    passive_ports: RangeInclusive<u16>,
    idle_session_timeout: Duration,
    max_sessions: usize,
    logger: slog::Logger,
    shutdown: Pin<Box<dyn Future<Output = ()> + Send + Sync>>,
}

/// Used to create [`Server`]s.
pub struct ServerBuilder {
    root: PathBuf,
    greeting: &'static str,
    authenticator: Arc<dyn Authenticator>,
    passive_ports: RangeInclusive<u16>,
    idle_session_timeout: Duration,
    max_sessions: usize,
    logger: Option<slog::Logger>,
    shutdown: Pin<Box<dyn Future<Output = ()> + Send + Sync>>,
}

impl Server {
    /// Construct a new [`ServerBuilder`] for a server that sandboxes all
    /// filesystem access to the given root directory.
    pub fn with_root<P: Into<PathBuf>>(root: P) -> ServerBuilder {
        ServerBuilder {
            root: root.into(),
            greeting: DEFAULT_GREETING,
            // No users yet: every login fails until an authenticator with
            // actual credentials is supplied.
            authenticator: Arc::new(InMemoryAuthenticator::new()),
            passive_ports: DEFAULT_PASSIVE_PORTS,
            idle_session_timeout: Duration::from_secs(DEFAULT_IDLE_SESSION_TIMEOUT_SECS),
            max_sessions: 0,
            logger: None,
            shutdown: Box::pin(std::future::pending()),
        }
    }

    /// Starts listening on the given address, accepting control connections
    /// until the shutdown indicator resolves.
    ///
    /// A bind failure is fatal; accept failures are logged and the loop
    /// continues. On shutdown, running sessions are asked to wind down and
    /// awaited before this method returns.
    pub async fn listen<S: AsRef<str>>(mut self, bind_address: S) -> Result<(), ServerError> {
        let bind_address = bind_address.as_ref();
        let listener = TcpListener::bind(bind_address).await.map_err(ServerError::Bind)?;
        slog::info!(self.logger, "Listening on {}", bind_address; "root" => self.resolver.root().display().to_string());

        let notifier = Arc::new(shutdown::Notifier::new());
        let session_limit = match self.max_sessions {
            0 => None,
            n => Some(Arc::new(Semaphore::new(n))),
        };

        loop {
            tokio::select! {
                _ = &mut self.shutdown => {
                    slog::info!(self.logger, "Shutting down");
                    notifier.notify().await;
                    notifier.linger().await;
                    return Ok(());
                }
                accepted = listener.accept() => match accepted {
                    Ok((tcp_stream, peer_addr)) => {
                        slog::info!(self.logger, "Incoming control connection from {}", peer_addr);
                        let permit = match &session_limit {
                            Some(semaphore) => match semaphore.clone().try_acquire_owned() {
                                Ok(permit) => Some(permit),
                                Err(_) => {
                                    slog::warn!(self.logger, "Refusing connection from {}: session limit reached", peer_addr);
                                    refuse(tcp_stream).await;
                                    continue;
                                }
                            },
                            None => None,
                        };
                        let params = ControlParams {
                            greeting: self.greeting,
                            authenticator: self.authenticator.clone(),
                            resolver: self.resolver.clone(),
                            passive_ports: self.passive_ports.clone(),
                            idle_timeout: self.idle_session_timeout,
                            logger: self.logger.clone(),
                        };
                        let watcher = notifier.subscribe().await;
                        if let Err(err) = controlchan::spawn_loop(params, tcp_stream, watcher, permit).await {
                            slog::error!(self.logger, "Could not spawn control channel loop for {}: {}", peer_addr, err);
                        }
                    }
                    Err(err) => {
                        slog::error!(self.logger, "Error accepting incoming control connection: {}", err);
                    }
                }
            }
        }
    }
}

// Best effort: the client gets a 421 telling it why, then the socket closes.
async fn refuse(mut tcp_stream: TcpStream) {
    let _ = tcp_stream.write_all(b"421 Too many connections, closing control connection\r\n").await;
    let _ = tcp_stream.shutdown().await;
}

impl ServerBuilder {
    /// Sets the greeting sent in the `220` welcome banner.
    pub fn greeting(mut self, greeting: &'static str) -> Self {
        self.greeting = greeting;
        self
    }

    /// Sets the [`Authenticator`] that will authenticate `USER`/`PASS` pairs.
    pub fn authenticator(mut self, authenticator: Arc<dyn Authenticator>) -> Self {
        self.authenticator = authenticator;
        self
    }

    /// Sets the port range from which `PASV` picks its data ports.
    pub fn passive_ports(mut self, passive_ports: RangeInclusive<u16>) -> Self {
        self.passive_ports = passive_ports;
        self
    }

    /// Sets the idle timeout after which a silent session is closed.
    /// Defaults to 60 seconds.
    pub fn idle_session_timeout(mut self, timeout: Duration) -> Self {
        self.idle_session_timeout = timeout;
        self
    }

    /// Limits the number of concurrent sessions. Connections over the limit
    /// are greeted with a `421` and closed. `0` means unlimited, which is the
    /// default.
    pub fn max_sessions(mut self, max_sessions: usize) -> Self {
        self.max_sessions = max_sessions;
        self
    }

    /// Sets the structured logger all session events go to. When absent,
    /// everything is forwarded to the `log` facade.
    pub fn logger(mut self, logger: Option<slog::Logger>) -> Self {
        self.logger = logger;
        self
    }

    /// Sets a future whose resolution makes [`Server::listen`] stop accepting
    /// connections, wind down running sessions and return.
    pub fn shutdown_indicator<F>(mut self, indicator: F) -> Self
    where
        F: Future<Output = ()> + Send + Sync + 'static,
    {
        self.shutdown = Box::pin(indicator);
        self
    }

    /// Validates the configuration and produces a runnable [`Server`].
    ///
    /// Fails when the sandbox root does not exist or is not a directory. The
    /// root is opened here, once, and every session performs its filesystem
    /// operations relative to that handle.
    pub fn build(self) -> Result<Server, ServerError> {
        let resolver = PathResolver::new(self.root).map_err(ServerError::Root)?;
        let logger = self
            .logger
            .unwrap_or_else(|| slog::Logger::root(slog_stdlog::StdLog.fuse(), slog::o!()));
        Ok(Server {
            greeting: self.greeting,
            authenticator: self.authenticator,
            resolver: Arc::new(resolver),
            passive_ports: self.passive_ports,
            idle_session_timeout: self.idle_session_timeout,
            max_sessions: self.max_sessions,
            logger,
            shutdown: self.shutdown,
        })
    }
}
