//! TCP accept loop.
//!
//! Every accepted connection is served by its own task through [`HttpConnection`]; tasks
//! share nothing but the handler. Cancelling the shutdown token stops accepting new
//! connections, after which [`BoundServer::serve`] waits for the in-flight ones to finish.
//!
//! ```no_run
//! # use std::sync::Arc;
//! # use futures::future::BoxFuture;
//! # use h1_wire::connection::ResponseWriter;
//! # use h1_wire::handler::make_handler;
//! # use h1_wire::protocol::{HandlerError, Request};
//! # use h1_wire::server::Server;
//! # use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
//! # use tokio_util::sync::CancellationToken;
//! # fn handle(_: Request<OwnedReadHalf>, _: &mut ResponseWriter<OwnedWriteHalf>) -> BoxFuture<'_, Result<(), HandlerError>> {
//! #     Box::pin(async { Ok(()) })
//! # }
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let server = Server::builder().address("127.0.0.1:42069").build()?.bind().await?;
//! server.serve(Arc::new(make_handler(handle)), CancellationToken::new()).await;
//! # Ok(())
//! # }
//! ```

use std::io;
use std::net::{SocketAddr, ToSocketAddrs};
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::net::TcpListener;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::select;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{error, info, warn};

use crate::connection::{ConnectionConfig, HttpConnection};
use crate::ensure;
use crate::handler::Handler;

const ACCEPT_BACKOFF_MIN: Duration = Duration::from_millis(10);
const ACCEPT_BACKOFF_MAX: Duration = Duration::from_secs(1);

#[derive(Debug)]
pub struct ServerBuilder {
    address: Option<io::Result<Vec<SocketAddr>>>,
    config: ConnectionConfig,
}

impl ServerBuilder {
    fn new() -> Self {
        Self { address: None, config: ConnectionConfig::default() }
    }

    pub fn address<A: ToSocketAddrs>(mut self, address: A) -> Self {
        self.address = Some(address.to_socket_addrs().map(|addrs| addrs.collect()));
        self
    }

    pub fn config(mut self, config: ConnectionConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> Result<Server, ServerBuildError> {
        let address = self.address.ok_or(ServerBuildError::MissingAddress)?.map_err(|source| ServerBuildError::InvalidAddress { source })?;
        ensure!(!address.is_empty(), ServerBuildError::MissingAddress);
        Ok(Server { address, config: self.config })
    }
}

#[derive(Error, Debug)]
pub enum ServerBuildError {
    #[error("address must be set")]
    MissingAddress,
    #[error("invalid address: {source}")]
    InvalidAddress { source: io::Error },
}

#[derive(Debug)]
pub struct Server {
    address: Vec<SocketAddr>,
    config: ConnectionConfig,
}

impl Server {
    pub fn builder() -> ServerBuilder {
        ServerBuilder::new()
    }

    /// Binds the listening socket, trying each resolved address in turn.
    pub async fn bind(self) -> io::Result<BoundServer> {
        let tcp_listener = match TcpListener::bind(self.address.as_slice()).await {
            Ok(tcp_listener) => tcp_listener,
            Err(e) => {
                error!(cause = %e, address = ?self.address, "bind server error");
                return Err(e);
            }
        };

        info!(address = ?tcp_listener.local_addr()?, "start listening");
        Ok(BoundServer { tcp_listener, config: self.config })
    }
}

/// A server whose listening socket is bound and ready to accept.
#[derive(Debug)]
pub struct BoundServer {
    tcp_listener: TcpListener,
    config: ConnectionConfig,
}

impl BoundServer {
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.tcp_listener.local_addr()
    }

    /// Accepts connections until `shutdown` is cancelled, then waits for every in-flight
    /// connection to finish. In-flight connections are never interrupted.
    pub async fn serve<H>(self, handler: Arc<H>, shutdown: CancellationToken)
    where
        H: Handler<OwnedReadHalf, OwnedWriteHalf> + 'static,
    {
        let tracker = TaskTracker::new();
        let mut backoff = AcceptBackoff::new();

        loop {
            let (tcp_stream, remote_addr) = select! {
                () = shutdown.cancelled() => {
                    info!("received shutdown signal, stop accepting");
                    break;
                }
                accepted = self.tcp_listener.accept() => match accepted {
                    Ok(stream_and_addr) => {
                        backoff.reset();
                        stream_and_addr
                    }
                    Err(e) => {
                        let delay = backoff.next_delay();
                        warn!(cause = %e, ?delay, "failed to accept, retrying");
                        tokio::time::sleep(delay).await;
                        continue;
                    }
                }
            };

            let handler = Arc::clone(&handler);
            let config = self.config;

            tracker.spawn(async move {
                let (reader, writer) = tcp_stream.into_split();
                let connection = HttpConnection::with_config(reader, writer, config);
                match connection.process(handler).await {
                    Ok(()) => info!(%remote_addr, "finished process, connection shutdown"),
                    Err(e) => error!(%remote_addr, cause = %e, "service has error, connection shutdown"),
                }
            });
        }

        tracker.close();
        info!(in_flight = tracker.len(), "waiting for connections to finish");
        tracker.wait().await;
        info!("server stopped");
    }
}

/// Delay between retries after failed accepts, e.g. while the process is out of file
/// descriptors. Doubles up to [`ACCEPT_BACKOFF_MAX`] and resets after a successful accept.
#[derive(Debug)]
struct AcceptBackoff {
    next: Duration,
}

impl AcceptBackoff {
    fn new() -> Self {
        Self { next: ACCEPT_BACKOFF_MIN }
    }

    fn reset(&mut self) {
        self.next = ACCEPT_BACKOFF_MIN;
    }

    fn next_delay(&mut self) -> Duration {
        let delay = self.next;
        self.next = (delay * 2).min(ACCEPT_BACKOFF_MAX);
        delay
    }
}
