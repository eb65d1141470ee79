use std::io;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncWrite};
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

use crate::codec::{DEFAULT_CAPACITY, read_request};
use crate::connection::ResponseWriter;
use crate::handler::Handler;
use crate::protocol::{Headers, HttpError, ParseError, Request, StatusCode, WriteError, WriteState};

/// Limits applied while reading a request head.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionConfig {
    /// Upper bound for the request-line plus header section, in bytes.
    pub max_header_bytes: usize,
    /// Upper bound for receiving the request head. `None` waits forever.
    pub header_read_timeout: Option<Duration>,
}

impl ConnectionConfig {
    pub fn max_header_bytes(mut self, max_header_bytes: usize) -> Self {
        self.max_header_bytes = max_header_bytes;
        self
    }

    pub fn header_read_timeout(mut self, header_read_timeout: Duration) -> Self {
        self.header_read_timeout = Some(header_read_timeout);
        self
    }
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self { max_header_bytes: DEFAULT_CAPACITY, header_read_timeout: None }
    }
}

/// Serves exactly one request/response exchange over a byte stream
///
/// The request is parsed from `reader`. A request that fails to parse is answered with
/// `400 Bad Request` carrying the error text; otherwise the handler is called with the
/// request and a [`ResponseWriter`] bound to `writer`. Once the handler returns, the write
/// half is shut down. Connections are never reused.
///
/// # Type Parameters
///
/// * `R`: The async readable stream type
/// * `W`: The async writable stream type
#[derive(Debug)]
pub struct HttpConnection<R, W> {
    reader: R,
    writer: ResponseWriter<W>,
    config: ConnectionConfig,
}

impl<R, W> HttpConnection<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(reader: R, writer: W) -> Self {
        Self::with_config(reader, writer, ConnectionConfig::default())
    }

    pub fn with_config(reader: R, writer: W, config: ConnectionConfig) -> Self {
        Self { reader, writer: ResponseWriter::new(writer), config }
    }

    pub async fn process<H>(self, handler: Arc<H>) -> Result<(), HttpError>
    where
        H: Handler<R, W> + ?Sized,
    {
        let Self { reader, mut writer, config } = self;

        let request = match read_head(reader, config).await {
            Ok(request) => request,
            Err(ParseError::Io { source }) if source.kind() == io::ErrorKind::TimedOut => {
                warn!(timeout = ?config.header_read_timeout, "timed out reading request head");
                return Err(ParseError::io(source).into());
            }
            Err(e) => {
                warn!(cause = %e, "can't parse request, respond bad request");
                if let Err(send_error) = write_error_response(&mut writer, StatusCode::BadRequest, &format!("{e}\n")).await
                {
                    error!(cause = %send_error, "failed to send bad request response");
                }
                close(&mut writer).await;
                return Err(e.into());
            }
        };

        info!(request_line = %request.request_line(), "received request");

        if let Err(e) = handler.call(request, &mut writer).await {
            error!(cause = %e, state = %writer.state(), "handler failed");
            if writer.state() == WriteState::AwaitingStatusLine {
                let message = format!("{}\n", StatusCode::InternalServerError.reason_phrase());
                if let Err(send_error) = write_error_response(&mut writer, StatusCode::InternalServerError, &message).await {
                    error!(cause = %send_error, "failed to send internal server error response");
                }
            }
            close(&mut writer).await;
            return Err(HttpError::handler(e));
        }

        if writer.state() != WriteState::Complete {
            warn!(state = %writer.state(), "handler returned without completing the response");
        }

        writer.shutdown().await?;
        debug!("connection finished");
        Ok(())
    }
}

async fn read_head<R>(reader: R, config: ConnectionConfig) -> Result<Request<R>, ParseError>
where
    R: AsyncRead + Unpin,
{
    let read = read_request(reader, config.max_header_bytes);
    match config.header_read_timeout {
        Some(limit) => timeout(limit, read).await.map_err(|elapsed| ParseError::io(io::Error::new(io::ErrorKind::TimedOut, elapsed)))?,
        None => read.await,
    }
}

async fn write_error_response<W>(writer: &mut ResponseWriter<W>, status: StatusCode, message: &str) -> Result<(), WriteError>
where
    W: AsyncWrite + Unpin,
{
    let mut headers = Headers::new();
    headers.insert("Content-Type", mime::TEXT_PLAIN_UTF_8.as_ref())?;

    writer.write_status_line(status).await?;
    writer.write_headers(&headers)?;
    writer.write_body(message.as_bytes()).await
}

async fn close<W>(writer: &mut ResponseWriter<W>)
where
    W: AsyncWrite + Unpin,
{
    if let Err(e) = writer.shutdown().await {
        debug!(cause = %e, "failed to shutdown connection");
    }
}
